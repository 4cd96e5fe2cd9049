use super::actions::ActionRegistry;
use crate::engine::error::EngineError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Generic Markov-chain search.
///
/// Implementors provide the action table and the random generator; every hook is a
/// no-op by default. The default acceptance is a fair coin flip, which is only useful
/// as a scaffold for engines that override [`MarkovChain::accept`].
pub trait MarkovChain<S: Clone> {
    fn registry(&self) -> &ActionRegistry<S>;

    fn rng_mut(&mut self) -> &mut StdRng;

    fn accept(&mut self, _candidate: &S, _current: &S) -> bool {
        self.rng_mut().r#gen::<f64>() >= 0.5
    }

    fn on_start(&mut self, _state: &mut S) {}

    fn on_trial_start(&mut self, _step: usize) {}

    fn on_trial_end(&mut self, _step: usize) {}

    fn on_end(&mut self, _state: &S) {}

    /// Applies one uniformly sampled action to a copy of `state`.
    fn propose(&mut self, state: &S) -> Result<S, EngineError> {
        let count = self.registry().len();
        if count == 0 {
            return Err(EngineError::NoActionsRegistered);
        }
        let index = self.rng_mut().gen_range(0..count);
        let action = self
            .registry()
            .get(index)
            .cloned()
            .ok_or_else(|| EngineError::Internal(format!("action index {index} out of range")))?;
        trace!(action = action.name(), "Proposing move.");
        Ok(action.apply(state.clone(), self.rng_mut()))
    }

    fn trial(&mut self, state: S) -> Result<S, EngineError> {
        let candidate = self.propose(&state)?;
        if self.accept(&candidate, &state) {
            Ok(candidate)
        } else {
            Ok(state)
        }
    }

    fn run(&mut self, mut state: S, num_steps: usize) -> Result<S, EngineError> {
        self.on_start(&mut state);
        for step in 0..num_steps {
            self.on_trial_start(step);
            state = self.trial(state)?;
            self.on_trial_end(step);
        }
        self.on_end(&state);
        Ok(state)
    }
}

/// Plain engine with the coin-flip acceptance.
#[derive(Debug, Clone)]
pub struct MarkovChainMc<S> {
    registry: ActionRegistry<S>,
    rng: StdRng,
}

impl<S> MarkovChainMc<S> {
    pub fn new(registry: ActionRegistry<S>, seed: Option<u64>) -> Self {
        Self {
            registry,
            rng: seeded_rng(seed),
        }
    }
}

impl<S: Clone> MarkovChain<S> for MarkovChainMc<S> {
    fn registry(&self) -> &ActionRegistry<S> {
        &self.registry
    }

    fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
