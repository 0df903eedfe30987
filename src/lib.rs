#![doc = r#"
gyre: In-Memory Rolling Chunk Store for Geo Time Series

This crate provides the hot-path storage core for a single geo time series: a
fixed-capacity ring of encoded datapoint chunks covering a rolling time
window. It is designed for continuous ingestion of timestamped measurements
with bounded memory horizons, with support for:
- Time-based bucketing of datapoints into per-window chunks
- Whole-chunk eviction of data older than the ring's horizon
- Bounded retrieval by timespan and by newest-count
- Chronological fast paths that avoid sorting for in-order chunks
- Thread-safe ingestion and retrieval over one shared ring

See the README for usage examples and more details.
"#]
// Declare modules
pub mod encoding;
pub mod error;
pub mod storage;
pub mod telemetry;
pub mod time;
pub mod types;

/// Main entry point: the rolling chunk ring for one geo time series.
pub use crate::storage::ChunkSet;
/// Configuration options for the chunk ring.
pub use crate::storage::ChunkSetConfig;
/// Per-ingest accounting of accepted and discarded datapoints.
pub use crate::storage::StoreReport;
/// Error type for store operations.
pub use crate::error::StoreError;
/// Append-only datapoint encoder.
pub use crate::encoding::GtsEncoder;
/// Forward cursor over an encoded datapoint buffer.
pub use crate::encoding::GtsDecoder;
/// Structured event hook for observability.
pub use crate::telemetry::{StoreEvent, StoreEventListener};
/// Wall-clock seam; inject a manual source for deterministic behavior.
pub use crate::time::{ManualTimeSource, SystemTimeSource, TimeSource};
/// Represents a single geo time series datapoint.
pub use crate::types::DataPoint;
/// Scalar types and the missing-location/elevation sentinels.
pub use crate::types::{Elevation, Location, Timestamp, Value, NO_ELEVATION, NO_LOCATION};

// Default ring geometry if not specified
/// The default number of ring slots (one day of hourly chunks).
pub const DEFAULT_CHUNK_COUNT: u32 = 24;
/// The default chunk window length (one hour in microsecond ticks).
pub const DEFAULT_CHUNK_LENGTH: i64 = 3_600_000_000;
