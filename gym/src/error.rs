use gymcoin::GymError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Gym(#[from] GymError),

    #[error("{var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("invalid argument: {0}")]
    Argument(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
