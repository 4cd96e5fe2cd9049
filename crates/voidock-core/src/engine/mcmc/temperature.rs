use std::fmt;
use std::sync::Arc;

/// Temperature as a function of the trial index.
#[derive(Clone)]
pub enum TemperatureProfile {
    Constant(f64),
    /// Linear interpolation from `start` to `end` over `steps` trials, then held at `end`.
    Linear { start: f64, end: f64, steps: usize },
    /// `start * decay^step`.
    Exponential { start: f64, decay: f64 },
    Custom(Arc<dyn Fn(usize) -> f64 + Send + Sync>),
}

impl TemperatureProfile {
    pub fn custom<F>(profile: F) -> Self
    where
        F: Fn(usize) -> f64 + Send + Sync + 'static,
    {
        TemperatureProfile::Custom(Arc::new(profile))
    }

    pub fn at(&self, step: usize) -> f64 {
        match self {
            TemperatureProfile::Constant(t) => *t,
            TemperatureProfile::Linear { start, end, steps } => {
                if *steps == 0 {
                    return *end;
                }
                let progress = step.min(*steps) as f64 / *steps as f64;
                start + (end - start) * progress
            }
            TemperatureProfile::Exponential { start, decay } => start * decay.powi(step as i32),
            TemperatureProfile::Custom(f) => f(step),
        }
    }
}

impl fmt::Debug for TemperatureProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureProfile::Constant(t) => f.debug_tuple("Constant").field(t).finish(),
            TemperatureProfile::Linear { start, end, steps } => f
                .debug_struct("Linear")
                .field("start", start)
                .field("end", end)
                .field("steps", steps)
                .finish(),
            TemperatureProfile::Exponential { start, decay } => f
                .debug_struct("Exponential")
                .field("start", start)
                .field("decay", decay)
                .finish(),
            TemperatureProfile::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
