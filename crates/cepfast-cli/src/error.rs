use cepfast_core::RaceError;
use thiserror::Error;

pub const EXIT_RACE_FAILED: u8 = 3;
pub const EXIT_RACE_TIMED_OUT: u8 = 4;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] cepfast_core::ValidationError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Serialization(_) => 10,
            Self::Io(_) => 10,
        }
    }
}

/// Exit code for a race that ended without a winner. The error itself has
/// already been rendered to stdout.
pub const fn race_exit_code(error: &RaceError) -> u8 {
    if error.is_timeout() {
        EXIT_RACE_TIMED_OUT
    } else {
        EXIT_RACE_FAILED
    }
}
