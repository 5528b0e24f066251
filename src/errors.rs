use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Collection not found: {0}")]
    NoSuchCollection(String),

    #[error("Document not found: {0}")]
    NoSuchDocument(String),

    #[error("Invalid document ID: {0}")]
    InvalidDocumentId(String),

    #[error("Duplicate key on field: {0}")]
    DuplicateKey(String),

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Unknown relation: {0}")]
    UnknownRelation(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Errors surfaced by the API layer.
///
/// `ClientInput` covers anything the caller can fix by changing the request.
/// Store failures are carried unchanged and classified only when a response is built.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    ClientInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] DbError),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ClientInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(e) => match e {
                DbError::InvalidDocumentId(_) | DbError::NoSuchDocument(_) => {
                    StatusCode::NOT_FOUND
                }
                DbError::DuplicateKey(_)
                | DbError::Validation(_)
                | DbError::QueryError(_)
                | DbError::InvalidDocument(_)
                | DbError::Json(_) => StatusCode::BAD_REQUEST,
                DbError::Io(_)
                | DbError::NoSuchCollection(_)
                | DbError::UnknownRelation(_)
                | DbError::Pattern(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message shown to the client. Internal failures never leak their detail.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::ClientInput(m) | Self::NotFound(m) => m.clone(),
            Self::Store(e) => match e {
                DbError::InvalidDocumentId(_) | DbError::NoSuchDocument(_) => {
                    "Resource not found".to_string()
                }
                DbError::DuplicateKey(_) => "Duplicate Field value entered".to_string(),
                DbError::Validation(msgs) => msgs.join(", "),
                DbError::QueryError(m) | DbError::InvalidDocument(m) => m.clone(),
                DbError::Json(e) => e.to_string(),
                DbError::Io(_)
                | DbError::NoSuchCollection(_)
                | DbError::UnknownRelation(_)
                | DbError::Pattern(_) => "Server Error".to_string(),
            },
        }
    }
}
