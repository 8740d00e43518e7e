/// Core data types for the Argo profile ingest service.
///
/// This module defines the shared domain model imported by all other modules:
/// coordinates, basin results, and the error enums raised by the I/O layers.
/// The geolocation core itself never produces errors; everything here that
/// can fail belongs to grid loading, configuration, or profile parsing.

use std::fmt;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A geographic position in degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.longitude, self.latitude)
    }
}

/// Coordinate substituted for any position that cannot be trusted.
pub const SENTINEL_COORDINATE: Coordinate = Coordinate::new(0.0, -90.0);

// ---------------------------------------------------------------------------
// Basin results
// ---------------------------------------------------------------------------

/// Spacing of the basin classification grid, in degrees, on both axes.
pub const GRID_SPACING_DEG: f64 = 0.5;

/// Basin value stored for a point whose cell and all four surrounding
/// cells are land / no data.
pub const NO_BASIN: i32 = -1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while loading a basin grid file.
#[derive(Debug)]
pub enum GridError {
    Io(std::io::Error),
    /// A row could not be parsed. `line` is 1-based.
    Parse { line: usize, message: String },
    /// The file contained no grid points.
    Empty,
    /// Adjacent axis values are not one grid step apart.
    IrregularSpacing { axis: &'static str, expected: f64, found: f64 },
    /// Grid step differs from the 0.5° step neighbor candidates are built on.
    UnsupportedSpacing { found: f64 },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::Io(e) => write!(f, "Grid I/O error: {}", e),
            GridError::Parse { line, message } => {
                write!(f, "Grid parse error on line {}: {}", line, message)
            }
            GridError::Empty => write!(f, "Grid file contains no points"),
            GridError::IrregularSpacing { axis, expected, found } => write!(
                f,
                "Irregular {} spacing: expected {} degrees, found {}",
                axis, expected, found
            ),
            GridError::UnsupportedSpacing { found } => write!(
                f,
                "Unsupported grid spacing {} degrees, expected {}",
                found, GRID_SPACING_DEG
            ),
        }
    }
}

impl std::error::Error for GridError {}

impl From<std::io::Error> for GridError {
    fn from(e: std::io::Error) -> Self {
        GridError::Io(e)
    }
}

/// Errors raised while loading service configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    /// Neither the config file nor `DATABASE_URL` provided a connection string.
    MissingDatabaseUrl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Config I/O error: {}", e),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::MissingDatabaseUrl => {
                write!(f, "No database url: set [database] url or DATABASE_URL")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors raised while reading or assembling float profiles.
#[derive(Debug)]
pub enum ProfileError {
    Io(std::io::Error),
    /// The profile export could not be deserialized.
    Parse(String),
    /// The profile carries no pressure axis and cannot be stored.
    MissingPressureAxis { id: String },
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::Io(e) => write!(f, "Profile I/O error: {}", e),
            ProfileError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ProfileError::MissingPressureAxis { id } => {
                write!(f, "No pressure axis found for profile {}", id)
            }
        }
    }
}

impl std::error::Error for ProfileError {}

impl ProfileError {
    /// Id of the profile the error belongs to, when it is known.
    pub fn record_id(&self) -> Option<&str> {
        match self {
            ProfileError::MissingPressureAxis { id } => Some(id),
            ProfileError::Io(_) | ProfileError::Parse(_) => None,
        }
    }
}
