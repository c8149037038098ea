use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unable to locate the provider API key, set DREAMHOST_API_KEY")]
    MissingApiKey,
    #[error("http client error {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed provider response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    #[error("resolver error {0}")]
    Resolve(#[from] trust_dns_resolver::error::ResolveError),
    #[error("invalid settings: {0}")]
    Settings(#[from] config::ConfigError),
    #[error("error in library {0}")]
    Lib(#[from] libdreamhook::Error),
    #[error("IO error on {}: {source}", .path.display())]
    IO { path: PathBuf, source: io::Error },
    #[error("could not locate {kind} file {}", .path.display())]
    MissingFile { kind: String, path: PathBuf },
    #[error("record {record} did not propagate within {elapsed:?}")]
    PropagationTimeout { record: String, elapsed: Duration },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Wraps an IO error with the path it happened on
pub fn io_error<P: Into<PathBuf>>(path: P) -> impl FnOnce(io::Error) -> Error {
    let path = path.into();
    move |source| Error::IO { path, source }
}
