/// Result code of a successful command.
pub const SUCCESS: i32 = 0;

/// Error kinds reported on the command surface. Codes are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("movement fault")]
    GenericMovement,
    #[error("invalid parameters")]
    InvalidParameters,
    #[error("invalid command")]
    InvalidCommand,
    #[error("axis backend unavailable")]
    BackendUnavailable,
}

impl CommandError {
    pub const fn code(self) -> i32 {
        match self {
            CommandError::GenericMovement => -1,
            CommandError::InvalidParameters => -2,
            CommandError::InvalidCommand => -3,
            CommandError::BackendUnavailable => -4,
        }
    }
}

/// `Ok` carries `SUCCESS` or a measurement (e.g. the homed height).
pub type ExecutionResult = Result<i32, CommandError>;

pub fn result_code(result: &ExecutionResult) -> i32 {
    match result {
        Ok(value) => *value,
        Err(err) => err.code(),
    }
}

/// A request line without both a request id and a verb.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid request line {line:?}")]
pub struct InvalidCommand {
    pub line: String,
    /// Whatever stood in the id position, so the reply can still be correlated.
    pub request_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_and_negative() {
        let errors = [
            CommandError::GenericMovement,
            CommandError::InvalidParameters,
            CommandError::InvalidCommand,
            CommandError::BackendUnavailable,
        ];
        for (i, a) in errors.iter().enumerate() {
            assert!(a.code() < 0);
            for b in &errors[i + 1..] {
                assert_ne!(a.code(), b.code());
            }
        }
        assert_eq!(CommandError::InvalidParameters.code(), -2);
        assert_eq!(CommandError::InvalidCommand.code(), -3);
    }

    #[test]
    fn test_result_code_flattens() {
        assert_eq!(result_code(&Ok(SUCCESS)), 0);
        assert_eq!(result_code(&Ok(15)), 15);
        assert_eq!(result_code(&Err(CommandError::BackendUnavailable)), -4);
    }
}
