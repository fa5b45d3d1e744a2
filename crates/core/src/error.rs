use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid argument `{field}`: {reason}")]
    Validation { field: String, reason: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Auth(String),

    #[error("No employee record found for current user. Please create an employee record first.")]
    NoEmployee,

    #[error("unexpected response: {0}")]
    Protocol(String),
}

impl Error {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_field() {
        let err = Error::validation("commentary", "must be at most 3000 characters");
        assert_eq!(
            err.to_string(),
            "invalid argument `commentary`: must be at most 3000 characters"
        );
    }

    #[test]
    fn no_employee_is_distinct_from_transport() {
        let msg = Error::NoEmployee.to_string();
        assert!(msg.starts_with("No employee record"));
        assert_ne!(msg, Error::transport("No employee").to_string());
    }
}
