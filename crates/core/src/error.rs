use thiserror::Error;

#[derive(Error, Debug)]
pub enum PitchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for PitchError {
    fn from(e: serde_json::Error) -> Self {
        PitchError::Serialize(e.to_string())
    }
}
