//! Geo time series wire codec: append-only record packing with a flags byte,
//! delta-varint timestamps, optional location/elevation, and a discriminated
//! value payload.

use crate::error::StoreError;
use crate::types::{DataPoint, Elevation, Location, Timestamp, Value, NO_ELEVATION, NO_LOCATION};

use bytes::{BufMut, Bytes, BytesMut};
use std::io::Read;

// --- Record layout ---
//
// One record per datapoint:
//   flags      u8
//   timestamp  zigzag varint, delta against the previous record (or the base)
//   location   u64 LE, only when FLAG_HAS_LOCATION
//   elevation  zigzag varint, only when FLAG_HAS_ELEVATION
//   value      kind-specific payload (booleans ride in the flags byte)

const VALUE_KIND_MASK: u8 = 0x03;
const VALUE_KIND_LONG: u8 = 0x00;
const VALUE_KIND_DOUBLE: u8 = 0x01;
const VALUE_KIND_BOOLEAN: u8 = 0x02;
const VALUE_KIND_UTF8: u8 = 0x03;

const FLAG_HAS_LOCATION: u8 = 0x04;
const FLAG_HAS_ELEVATION: u8 = 0x08;
const FLAG_BOOLEAN_VALUE: u8 = 0x10;

/// Append-only encoder for a stream of geo time series datapoints.
///
/// Timestamps are stored as deltas against the previous record, so appends in
/// near-chronological order pack tightly; arbitrary order is still valid.
#[derive(Debug)]
pub struct GtsEncoder {
    buf: BytesMut,
    base: Timestamp,
    prev_ts: Timestamp,
    count: u64,
}

impl GtsEncoder {
    /// Constructs an empty encoder whose first record is delta-encoded
    /// against `base_timestamp`.
    pub fn new(base_timestamp: Timestamp) -> Self {
        Self {
            buf: BytesMut::new(),
            base: base_timestamp,
            prev_ts: base_timestamp,
            count: 0,
        }
    }

    /// Appends one datapoint record.
    pub fn add_value(
        &mut self,
        timestamp: Timestamp,
        location: Location,
        elevation: Elevation,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut flags: u8 = match &value {
            Value::Long(_) => VALUE_KIND_LONG,
            Value::Double(_) => VALUE_KIND_DOUBLE,
            Value::Boolean(b) => {
                if *b {
                    VALUE_KIND_BOOLEAN | FLAG_BOOLEAN_VALUE
                } else {
                    VALUE_KIND_BOOLEAN
                }
            }
            Value::Utf8(_) => VALUE_KIND_UTF8,
        };
        if location != NO_LOCATION {
            flags |= FLAG_HAS_LOCATION;
        }
        if elevation != NO_ELEVATION {
            flags |= FLAG_HAS_ELEVATION;
        }

        self.buf.put_u8(flags);
        write_var_u64(
            &mut self.buf,
            zigzag_encode(timestamp.wrapping_sub(self.prev_ts)),
        );
        if location != NO_LOCATION {
            self.buf.put_u64_le(location);
        }
        if elevation != NO_ELEVATION {
            write_var_u64(&mut self.buf, zigzag_encode(elevation));
        }
        match value {
            Value::Long(v) => write_var_u64(&mut self.buf, zigzag_encode(v)),
            Value::Double(v) => self.buf.put_f64_le(v),
            Value::Boolean(_) => {}
            Value::Utf8(s) => {
                let b = s.as_bytes();
                let n: u32 = b
                    .len()
                    .try_into()
                    .map_err(|_| StoreError::Codec("String value too large".to_string()))?;
                write_var_u64(&mut self.buf, n as u64);
                self.buf.put_slice(b);
            }
        }

        self.prev_ts = timestamp;
        self.count += 1;
        Ok(())
    }

    /// Appends one datapoint record from a [`DataPoint`].
    pub fn add_point(&mut self, point: &DataPoint) -> Result<(), StoreError> {
        self.add_value(
            point.timestamp,
            point.location,
            point.elevation,
            point.value.clone(),
        )
    }

    /// Number of appended records.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Current buffer length in bytes.
    pub fn size(&self) -> u64 {
        self.buf.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Obtains a decoder over a snapshot of the current contents.
    ///
    /// The filled prefix is copied into an immutable buffer, so the decoder
    /// stays valid and consistent regardless of later appends.
    pub fn decoder(&self) -> GtsDecoder {
        GtsDecoder {
            cur: std::io::Cursor::new(Bytes::copy_from_slice(&self.buf)),
            prev_ts: self.base,
            total: self.count,
            current: None,
        }
    }
}

/// Forward cursor over an encoded record buffer.
#[derive(Debug)]
pub struct GtsDecoder {
    cur: std::io::Cursor<Bytes>,
    prev_ts: Timestamp,
    total: u64,
    current: Option<DataPoint>,
}

impl GtsDecoder {
    /// Moves to the next record. Returns `false` past the end of the buffer.
    pub fn advance(&mut self) -> Result<bool, StoreError> {
        if self.cur.position() as usize >= self.cur.get_ref().len() {
            self.current = None;
            return Ok(false);
        }

        let flags = read_u8(&mut self.cur)?;
        let delta = zigzag_decode(read_var_u64(&mut self.cur)?);
        let timestamp = self.prev_ts.wrapping_add(delta);

        let location = if flags & FLAG_HAS_LOCATION != 0 {
            read_u64_le(&mut self.cur)?
        } else {
            NO_LOCATION
        };
        let elevation = if flags & FLAG_HAS_ELEVATION != 0 {
            zigzag_decode(read_var_u64(&mut self.cur)?)
        } else {
            NO_ELEVATION
        };

        let value = match flags & VALUE_KIND_MASK {
            VALUE_KIND_LONG => Value::Long(zigzag_decode(read_var_u64(&mut self.cur)?)),
            VALUE_KIND_DOUBLE => Value::Double(read_f64_le(&mut self.cur)?),
            VALUE_KIND_BOOLEAN => Value::Boolean(flags & FLAG_BOOLEAN_VALUE != 0),
            _ => {
                let len = read_var_u64(&mut self.cur)? as usize;
                let remaining = self.cur.get_ref().len() - self.cur.position() as usize;
                if len > remaining {
                    return Err(StoreError::Codec("Truncated string value".to_string()));
                }
                let mut b = vec![0u8; len];
                self.cur
                    .read_exact(&mut b)
                    .map_err(|e| StoreError::Codec(format!("Truncated string value: {}", e)))?;
                Value::Utf8(
                    String::from_utf8(b)
                        .map_err(|e| StoreError::Codec(format!("Invalid UTF-8 value: {}", e)))?,
                )
            }
        };

        self.prev_ts = timestamp;
        self.current = Some(DataPoint {
            timestamp,
            location,
            elevation,
            value,
        });
        Ok(true)
    }

    /// Total number of records in the underlying buffer, independent of the
    /// cursor position.
    pub fn count(&self) -> u64 {
        self.total
    }

    pub fn timestamp(&self) -> Timestamp {
        self.current().timestamp
    }

    pub fn location(&self) -> Location {
        self.current().location
    }

    pub fn elevation(&self) -> Elevation {
        self.current().elevation
    }

    pub fn value(&self) -> &Value {
        &self.current().value
    }

    /// The current record as a whole.
    pub fn point(&self) -> &DataPoint {
        self.current()
    }

    fn current(&self) -> &DataPoint {
        self.current
            .as_ref()
            .expect("advance() must return true before the cursor is read")
    }
}

// --- Primitive readers/writers ---

#[inline]
fn zigzag_encode(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

#[inline]
fn zigzag_decode(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}

fn write_var_u64(buf: &mut BytesMut, mut v: u64) {
    while v >= 0x80 {
        buf.put_u8((v as u8) | 0x80);
        v >>= 7;
    }
    buf.put_u8(v as u8);
}

fn read_var_u64<R: Read>(r: &mut R) -> Result<u64, StoreError> {
    let mut out: u64 = 0;
    let mut shift: u32 = 0;
    for _ in 0..10 {
        let mut b = [0u8; 1];
        r.read_exact(&mut b)
            .map_err(|e| StoreError::Codec(format!("Truncated varint: {}", e)))?;
        let byte = b[0];
        out |= ((byte & 0x7F) as u64) << shift;
        if (byte & 0x80) == 0 {
            return Ok(out);
        }
        shift = shift.saturating_add(7);
    }
    Err(StoreError::Codec("Varint too long".to_string()))
}

fn read_u8<R: Read>(r: &mut R) -> Result<u8, StoreError> {
    let mut b = [0u8; 1];
    r.read_exact(&mut b)
        .map_err(|e| StoreError::Codec(format!("Truncated record: {}", e)))?;
    Ok(b[0])
}

fn read_u64_le<R: Read>(r: &mut R) -> Result<u64, StoreError> {
    let mut b = [0u8; 8];
    r.read_exact(&mut b)
        .map_err(|e| StoreError::Codec(format!("Truncated record: {}", e)))?;
    Ok(u64::from_le_bytes(b))
}

fn read_f64_le<R: Read>(r: &mut R) -> Result<f64, StoreError> {
    let mut b = [0u8; 8];
    r.read_exact(&mut b)
        .map_err(|e| StoreError::Codec(format!("Truncated record: {}", e)))?;
    Ok(f64::from_le_bytes(b))
}
