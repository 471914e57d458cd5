pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("duplicate person id: {id}")]
    DuplicateId { id: String },

    #[error("malformed record at line {line}: {message}")]
    MalformedRecord { line: usize, message: String },
}
