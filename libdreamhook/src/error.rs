use std::path::PathBuf;

use thiserror;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serde_json `{0}`")]
    SerdeJSON(serde_json::Error),
    #[error("could not locate deployment config file {}", .0.display())]
    ConfigNotFound(PathBuf),
    #[error("reading deployment config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing deployment config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("provider rejected {cmd}: {reason}")]
    Rejected { cmd: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::SerdeJSON(err)
    }
}
