use std::fmt;

/// Repository layer errors
#[derive(Debug)]
pub enum RepositoryError {
    ConnectionError(String),
    InvalidDocument(String),
    DatabaseError(String),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::ConnectionError(msg) => write!(f, "Database unreachable: {msg}"),
            RepositoryError::InvalidDocument(msg) => write!(f, "Invalid document: {msg}"),
            RepositoryError::DatabaseError(msg) => write!(f, "Database error: {msg}"),
        }
    }
}

impl std::error::Error for RepositoryError {}

impl From<mongodb::error::Error> for RepositoryError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::ConnectionPoolCleared { .. } => {
                RepositoryError::ConnectionError(err.to_string())
            }
            ErrorKind::BsonDeserialization(_) | ErrorKind::BsonSerialization(_) => {
                RepositoryError::InvalidDocument(err.to_string())
            }
            _ => RepositoryError::DatabaseError(err.to_string()),
        }
    }
}
