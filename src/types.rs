use serde::{Deserialize, Serialize};

/// Timestamp type (ticks; microseconds since epoch in practice).
pub type Timestamp = i64;

/// Packed geo cell identifying a datapoint location.
pub type Location = u64;

/// Elevation type (signed altitude in the platform unit).
pub type Elevation = i64;

/// Sentinel location meaning "no location recorded".
pub const NO_LOCATION: Location = u64::MAX;

/// Sentinel elevation meaning "no elevation recorded".
pub const NO_ELEVATION: Elevation = i64::MIN;

/// A measurement value. The store routes values without inspecting them;
/// the discriminant only matters to the wire codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Long(i64),
    Double(f64),
    Boolean(bool),
    Utf8(String),
}

/// Represents a single geo time series datapoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: Timestamp,
    pub location: Location,
    pub elevation: Elevation,
    pub value: Value,
}

impl DataPoint {
    /// Builds a datapoint carrying location and elevation.
    pub fn new(
        timestamp: Timestamp,
        location: Location,
        elevation: Elevation,
        value: Value,
    ) -> Self {
        Self {
            timestamp,
            location,
            elevation,
            value,
        }
    }

    /// Builds a datapoint with neither location nor elevation.
    pub fn unlocated(timestamp: Timestamp, value: Value) -> Self {
        Self {
            timestamp,
            location: NO_LOCATION,
            elevation: NO_ELEVATION,
            value,
        }
    }

    /// Returns true if the datapoint carries a real location.
    pub fn has_location(&self) -> bool {
        self.location != NO_LOCATION
    }

    /// Returns true if the datapoint carries a real elevation.
    pub fn has_elevation(&self) -> bool {
        self.elevation != NO_ELEVATION
    }
}
