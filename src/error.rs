/*
 * Error Module
 *
 * Configuration errors raised while building grids, flocks and crystals or
 * while loading a sketch configuration file. Every constructor fails fast
 * with one of these instead of producing a degraded index.
 */

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Domain extents must be positive and finite.
    #[error("invalid domain size {width}x{height}: both extents must be positive")]
    InvalidDomain { width: f32, height: f32 },

    /// The grid needs at least one cell along each axis.
    #[error("invalid grid resolution {cells_x}x{cells_y}: cell counts must be non-zero")]
    ZeroCells { cells_x: usize, cells_y: usize },

    /// Repositioning annulus is empty at the minimum crystal radius.
    #[error("invalid crystal annulus: inner radius {inner} is not below outer radius {outer}")]
    InvalidAnnulus { inner: f32, outer: f32 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}
