/// Broad failure category; each maps to a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad command-line input.
    Usage,
    /// A required field is missing or malformed in the dataset.
    DataFormat,
    /// The dataset resource could not be fetched or read.
    SourceUnavailable,
    /// Export files could not be written.
    Io,
    /// Terminal setup or drawing failed.
    Terminal,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Usage | ErrorKind::Io => 2,
            ErrorKind::DataFormat => 3,
            ErrorKind::SourceUnavailable => 4,
            ErrorKind::Terminal => 5,
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

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, message)
    }

    pub fn data_format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataFormat, message)
    }

    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SourceUnavailable, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Terminal, message)
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
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_kind() {
        assert_eq!(AppError::usage("x").exit_code(), 2);
        assert_eq!(AppError::data_format("x").exit_code(), 3);
        assert_eq!(AppError::source_unavailable("x").exit_code(), 4);
        assert_eq!(AppError::terminal("x").exit_code(), 5);
        assert_eq!(AppError::io("boom").to_string(), "boom");
    }
}
