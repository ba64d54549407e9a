/// Failure categories surfaced by the pipeline.
///
/// Each kind maps to a process exit code so scripts can tell a bad input file
/// apart from a dataset that is simply too small or numerically degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid flags or configuration values.
    Config,
    /// Reading or writing files failed.
    Io,
    /// The target column is absent after preprocessing.
    MissingTargetColumn,
    /// No rows remain after preprocessing.
    EmptyDataset,
    /// More folds were requested than there are samples.
    InsufficientSamples,
    /// The design matrix is rank deficient (collinear columns).
    SingularMatrix,
    /// There were no candidate features to select from.
    NoFeatureSelected,
    /// A computation produced an unusable value.
    Numeric,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Config | ErrorKind::Io | ErrorKind::MissingTargetColumn => 2,
            ErrorKind::EmptyDataset | ErrorKind::InsufficientSamples | ErrorKind::NoFeatureSelected => 3,
            ErrorKind::SingularMatrix | ErrorKind::Numeric => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_group_by_category() {
        assert_eq!(AppError::config("x").exit_code(), 2);
        assert_eq!(AppError::new(ErrorKind::MissingTargetColumn, "x").exit_code(), 2);
        assert_eq!(AppError::new(ErrorKind::EmptyDataset, "x").exit_code(), 3);
        assert_eq!(AppError::new(ErrorKind::InsufficientSamples, "x").exit_code(), 3);
        assert_eq!(AppError::new(ErrorKind::SingularMatrix, "x").exit_code(), 4);
    }

    #[test]
    fn display_is_message_only() {
        let err = AppError::new(ErrorKind::EmptyDataset, "No rows remain.");
        assert_eq!(err.to_string(), "No rows remain.");
        assert_eq!(err.kind(), ErrorKind::EmptyDataset);
    }
}
