use rand::rngs::StdRng;
use std::fmt;
use std::sync::Arc;

pub type Transform<S> = Arc<dyn Fn(S, &mut StdRng) -> S + Send + Sync>;

/// A named perturbation eligible for random sampling by an engine.
///
/// The transform receives an owned copy of the state, so whatever it does is invisible
/// to the state it was copied from.
pub struct Action<S> {
    name: String,
    transform: Transform<S>,
}

impl<S> Action<S> {
    pub fn new<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(S, &mut StdRng) -> S + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            transform: Arc::new(transform),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn apply(&self, state: S, rng: &mut StdRng) -> S {
        (self.transform)(state, rng)
    }
}

impl<S> Clone for Action<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            transform: Arc::clone(&self.transform),
        }
    }
}

impl<S> fmt::Debug for Action<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").field("name", &self.name).finish()
    }
}

/// Ordered table of actions. Registering a name twice replaces the earlier entry.
pub struct ActionRegistry<S> {
    actions: Vec<Action<S>>,
}

impl<S> Default for ActionRegistry<S> {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
        }
    }
}

impl<S> Clone for ActionRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
        }
    }
}

impl<S> fmt::Debug for ActionRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<S> ActionRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(S, &mut StdRng) -> S + Send + Sync + 'static,
    {
        self.register(Action::new(name, transform));
        self
    }

    pub fn register(&mut self, action: Action<S>) {
        match self.actions.iter_mut().find(|a| a.name == action.name) {
            Some(existing) => *existing = action,
            None => self.actions.push(action),
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Action<S>> {
        self.actions.get(index)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(Action::name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn registry_keeps_registration_order() {
        let registry = ActionRegistry::<i64>::new()
            .with("increment", |x, _| x + 1)
            .with("double", |x, _| x * 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), ["increment", "double"]);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(registry.get(1).unwrap().apply(5, &mut rng), 10);
    }

    #[test]
    fn registering_a_name_twice_replaces_the_action() {
        let registry = ActionRegistry::<i64>::new()
            .with("step", |x, _| x + 1)
            .with("step", |x, _| x - 1);
        assert_eq!(registry.len(), 1);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(registry.get(0).unwrap().apply(0, &mut rng), -1);
    }

    #[test]
    fn empty_registry_has_no_actions() {
        let registry = ActionRegistry::<i64>::new();
        assert!(registry.is_empty());
        assert!(registry.get(0).is_none());
    }
}
