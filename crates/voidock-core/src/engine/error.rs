use thiserror::Error;

use super::config::ConfigError;
use crate::core::fitness::FitnessError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No actions are registered with the Markov-chain engine")]
    NoActionsRegistered,

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Fitness evaluation failed: {source}")]
    Fitness {
        #[from]
        source: FitnessError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
