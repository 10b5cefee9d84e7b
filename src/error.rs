use thiserror::Error;

/// Errors surfaced while loading configuration, scenes or driving the terminal.
///
/// Rendering itself never fails; everything here happens at startup or I/O time.
#[derive(Debug, Error)]
pub enum GlobeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse scene: {0}")]
    Json(#[from] serde_json::Error),

    #[error("grid shape {n_lat}x{n_lon} needs {expected} samples, got {lons} lons, {lats} lats, {values} values")]
    InvalidGrid {
        n_lat: usize,
        n_lon: usize,
        expected: usize,
        lons: usize,
        lats: usize,
        values: usize,
    },

    #[error("unknown palette '{0}'")]
    UnknownPalette(String),

    #[error("invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, GlobeError>;
