use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewireError {
    #[error("no rule matched predicate: {0}")]
    RuleNotFound(String),

    #[error("failed to resolve transform step '{name}': {reason}")]
    Resolve { name: String, reason: String },
}

pub type RewireResult<T> = Result<T, RewireError>;
