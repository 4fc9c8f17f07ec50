//! Error types shared by the composition engine

use thiserror::Error;

/// Errors raised by class composition, instantiation and dispatch
#[derive(Debug, Error)]
pub enum ClassError {
    /// A diamond-conflicted member was invoked before the child overrode it
    #[error("method '{member}' is ambiguous and must be overridden")]
    Ambiguous { member: String },

    #[error("member '{member}' is not defined")]
    UndefinedMember { member: String },

    #[error("member '{member}' is not callable")]
    NotCallable { member: String },

    /// `__new` produced something other than an instance
    #[error("class '{class}' did not produce an instance")]
    NotAnInstance { class: String },

    #[error("definition record must be a JSON object, got {0}")]
    InvalidRecord(String),

    #[error("composition settings were already installed or are in use")]
    AlreadyConfigured,

    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Failure raised by user code (methods, `init`, hooks)
    #[error(transparent)]
    Hook(#[from] anyhow::Error),
}

impl ClassError {
    /// Build a user-level error from a message
    pub fn msg(message: impl std::fmt::Display) -> Self {
        ClassError::Hook(anyhow::anyhow!("{}", message))
    }

    /// True when this is the lazy diamond-conflict error
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, ClassError::Ambiguous { .. })
    }
}

impl From<figment::Error> for ClassError {
    fn from(err: figment::Error) -> Self {
        ClassError::Config(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, ClassError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_message() {
        let err = ClassError::Ambiguous {
            member: "speak".to_string(),
        };
        assert!(err.is_ambiguous());
        assert_eq!(
            err.to_string(),
            "method 'speak' is ambiguous and must be overridden"
        );
    }

    #[test]
    fn test_msg_is_transparent() {
        let err = ClassError::msg("boom");
        assert!(!err.is_ambiguous());
        assert_eq!(err.to_string(), "boom");
    }
}
