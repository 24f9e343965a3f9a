use thiserror::Error;

#[derive(Debug, Error)]
pub enum BasinGraphError {
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("schema error: {0}")]
    SchemaError(String),
    #[error("query error: {0}")]
    QueryError(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("missing input file: {0}")]
    MissingInput(String),
    #[error("parse error in {file}:{line}: {message}")]
    ParseError {
        file: String,
        line: usize,
        message: String,
    },
}

impl BasinGraphError {
    pub fn connection<T: Into<String>>(msg: T) -> Self {
        BasinGraphError::ConnectionError(msg.into())
    }

    pub fn schema<T: Into<String>>(msg: T) -> Self {
        BasinGraphError::SchemaError(msg.into())
    }

    pub fn query<T: Into<String>>(msg: T) -> Self {
        BasinGraphError::QueryError(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        BasinGraphError::NotFound(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        BasinGraphError::InvalidInput(msg.into())
    }

    pub fn missing_input<T: Into<String>>(msg: T) -> Self {
        BasinGraphError::MissingInput(msg.into())
    }

    pub fn parse<F: Into<String>, M: Into<String>>(file: F, line: usize, message: M) -> Self {
        BasinGraphError::ParseError {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}
