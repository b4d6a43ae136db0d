use thiserror::Error;

/// Failures while obtaining the neighbourhood boundary geometry.
#[derive(Error, Debug)]
pub enum BoundaryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Boundary server answered with HTTP {0}")]
    Status(u16),
    #[error("Boundary file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid boundary JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Boundary JSON has no top-level \"features\" array")]
    MissingFeatures,
}
