use std::path::PathBuf;

use thiserror::Error;

/// Library error type for kiosk operations.
///
/// Every variant names the resource that failed so an operator can correct
/// the configuration without reading a backtrace.
#[derive(Debug, Error)]
pub enum Error {
    /// The display enumeration command could not be run or exited unsuccessfully.
    #[error("display query `{command}` failed: {reason}")]
    QueryExecution { command: String, reason: String },

    /// A connected output advertised a geometry token that does not decode.
    #[error("invalid geometry `{token}` for output {output}: {reason}")]
    GeometryParse {
        output: String,
        token: String,
        reason: String,
    },

    /// The configured output is absent from the enumeration.
    #[error("display output '{name}' not found (connected: {})", format_names(.available))]
    OutputNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("image not found: {}", .path.display())]
    ImageNotFound { path: PathBuf },

    #[error("failed to decode image {}", .path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to resize image {}: {reason}", .path.display())]
    Resize { path: PathBuf, reason: String },

    #[error("failed to request line {offset} on {}", .chip.display())]
    LineRequest {
        chip: PathBuf,
        offset: u32,
        #[source]
        source: gpiocdev::Error,
    },

    #[error("failed to read line {offset} on {}", .chip.display())]
    LineRead {
        chip: PathBuf,
        offset: u32,
        #[source]
        source: gpiocdev::Error,
    },

    #[error("line {offset} on {} was already released", .chip.display())]
    LineReleased { chip: PathBuf, offset: u32 },

    /// Rendering surface failure from the windowing collaborator.
    #[error("render surface error: {0}")]
    Surface(String),
}

fn format_names(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}
