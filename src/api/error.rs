use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("malformed path list: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("could not decode sprite sheet: {0}")]
    Image(#[from] image::ImageError),
}
