use std::path::PathBuf;
use thiserror::Error;

/// Conditions that abort the run. Join mismatches are never errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV from {origin}: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read shapefile {}: {source}", .path.display())]
    Shapefile {
        path: PathBuf,
        #[source]
        source: shapefile::Error,
    },

    #[error("joining tables: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    #[error("invalid date {0:?}")]
    Date(String),
}

pub type Result<T> = std::result::Result<T, Error>;
