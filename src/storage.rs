//! The rolling chunk ring for a single geo time series: ingestion with
//! time-based bucketing, bounded retrieval by timespan or by count, and
//! whole-chunk eviction past the live window.

use crate::encoding::{GtsDecoder, GtsEncoder};
use crate::error::StoreError;
use crate::telemetry::{store_metrics, StoreEvent, StoreEventListener};
use crate::time::TimeSource;
use crate::types::Timestamp;

use std::sync::{Arc, Mutex};

// Appends on one chunk serialise on the chunk's own lock, so ingest and
// retrieval hold the ring lock only for metadata.
type ChunkEncoder = Arc<Mutex<GtsEncoder>>;

/// Configuration for a [`ChunkSet`].
#[derive(Debug, Clone)]
pub struct ChunkSetConfig {
    /// Number of ring slots. Immutable after construction.
    pub chunk_count: u32,
    /// Length of one chunk window in ticks. Immutable after construction.
    pub chunk_length: i64,
    /// Clock used to place the live window on ingest and span fetches.
    pub time_source: Arc<dyn TimeSource>,
    /// Structured event hook for observability (no-op by default).
    pub event_listener: Arc<dyn StoreEventListener>,
}

impl Default for ChunkSetConfig {
    fn default() -> Self {
        ChunkSetConfig {
            chunk_count: crate::DEFAULT_CHUNK_COUNT,
            chunk_length: crate::DEFAULT_CHUNK_LENGTH,
            time_source: crate::time::system_time_source(),
            event_listener: crate::telemetry::noop_event_listener(),
        }
    }
}

/// Outcome of one ingest call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreReport {
    /// Datapoints appended to a chunk.
    pub stored: u64,
    /// Datapoints discarded for falling outside the live window.
    pub discarded: u64,
}

/// One ring slot: the encoded chunk plus the metadata needed to place and
/// scan it.
#[derive(Debug)]
struct Slot {
    encoder: Option<ChunkEncoder>,
    /// Inclusive end timestamp of the window this slot currently represents.
    /// Meaningful only while `encoder` is populated.
    end: Timestamp,
    /// Most recent timestamp appended to the slot.
    last_ts: Timestamp,
    /// True while timestamps have arrived in non-decreasing order since the
    /// slot was last (re)initialised.
    chronological: bool,
}

impl Slot {
    fn empty() -> Self {
        Slot {
            encoder: None,
            end: 0,
            last_ts: 0,
            chronological: true,
        }
    }
}

/// A fixed-capacity ring of encoded datapoint chunks covering a rolling
/// window of `chunk_count * chunk_length` ticks.
///
/// Each slot owns an append-only encoder for one `chunk_length`-tick window
/// of the timeline. Ingest buckets datapoints to slots by timestamp, slots
/// whose window has aged out of the ring are lazily replaced in place, and
/// eviction drops whole slots only.
#[derive(Debug)]
pub struct ChunkSet {
    /// Ring metadata. The lock is held only for slot rebinding and handle
    /// reads; encoder work runs outside it.
    slots: Mutex<Vec<Slot>>,
    chunk_count: usize,
    chunk_len: i64,
    /// Width of the whole ring in ticks (`chunk_count * chunk_len`).
    window: i64,
    clock: Arc<dyn TimeSource>,
    events: Arc<dyn StoreEventListener>,
}

impl ChunkSet {
    /// Creates a ring of `chunk_count` slots of `chunk_length` ticks each,
    /// with the system clock and a no-op event listener.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidConfig`] when `chunk_count` is zero,
    /// `chunk_length` is not positive, or the total window width overflows.
    pub fn new(chunk_count: u32, chunk_length: i64) -> Result<Self, StoreError> {
        Self::with_config(ChunkSetConfig {
            chunk_count,
            chunk_length,
            ..ChunkSetConfig::default()
        })
    }

    /// Creates a ring from a full configuration, including injected clock
    /// and event listener.
    pub fn with_config(config: ChunkSetConfig) -> Result<Self, StoreError> {
        let invalid = || StoreError::InvalidConfig {
            count: config.chunk_count,
            length: config.chunk_length,
        };
        if config.chunk_count == 0 || config.chunk_length <= 0 {
            return Err(invalid());
        }
        let window = (config.chunk_count as i64)
            .checked_mul(config.chunk_length)
            .ok_or_else(invalid)?;

        let mut slots = Vec::with_capacity(config.chunk_count as usize);
        for _ in 0..config.chunk_count {
            slots.push(Slot::empty());
        }

        Ok(ChunkSet {
            slots: Mutex::new(slots),
            chunk_count: config.chunk_count as usize,
            chunk_len: config.chunk_length,
            window,
            clock: config.time_source,
            events: config.event_listener,
        })
    }

    /// Number of ring slots.
    pub fn chunk_count(&self) -> u32 {
        self.chunk_count as u32
    }

    /// Length of one chunk window in ticks.
    pub fn chunk_length(&self) -> i64 {
        self.chunk_len
    }

    /// Stores the content of an encoder into the chunks of this ring.
    ///
    /// The live window is placed from the injected clock, read once per
    /// call. Datapoints outside the window are silently discarded (and
    /// counted in the report); the rest are appended to the chunk covering
    /// their timestamp, replacing any chunk whose window has aged out of
    /// the ring.
    ///
    /// # Errors
    /// Propagates codec failures; the target chunk may then hold a prefix
    /// of the input.
    pub fn store(&self, input: &GtsEncoder) -> Result<StoreReport, StoreError> {
        let now = self.clock.now();
        let last_end = self.chunk_end(now);
        let first_start = last_end - self.window + 1;

        let mut report = StoreReport::default();
        let mut decoder = input.decoder();

        while decoder.advance()? {
            let ts = decoder.timestamp();

            // Ignore the datapoint if it is not in the live window.
            if ts < first_start || ts > last_end {
                report.discarded += 1;
                continue;
            }

            let id = self.slot(ts);

            let encoder = {
                let mut slots = self.slots.lock()?;
                let slot = &mut slots[id];

                // Nonexistent chunk, or one left over from a previous
                // revolution of the ring: replace it in place.
                if slot.encoder.is_none() || slot.end < first_start {
                    let end = self.chunk_end(ts);
                    slot.encoder = Some(Arc::new(Mutex::new(GtsEncoder::new(0))));
                    slot.end = end;
                    // One tick before the window, so the first append can
                    // never compare below it and clear the flag.
                    slot.last_ts = end - self.chunk_len;
                    slot.chronological = true;
                }

                if ts < slot.last_ts {
                    slot.chronological = false;
                }
                slot.last_ts = ts;

                Arc::clone(slot.encoder.as_ref().expect("slot was just initialised"))
            };

            encoder.lock()?.add_value(
                ts,
                decoder.location(),
                decoder.elevation(),
                decoder.value().clone(),
            )?;
            report.stored += 1;
        }

        self.events.on_event(StoreEvent::DatapointsStored {
            stored: report.stored,
            discarded: report.discarded,
        });
        store_metrics::record_store(report.stored, report.discarded);
        Ok(report)
    }

    /// Fetches every stored datapoint with `now - span + 1 <= ts <= now`,
    /// in slot-visit order (newest slot first; append order within a slot).
    ///
    /// Aged-out chunks are cleaned first. A negative `span` is a count
    /// request: the call delegates to [`ChunkSet::fetch_count`] for the
    /// negated value.
    pub fn fetch_span(&self, now: Timestamp, span: i64) -> Result<GtsEncoder, StoreError> {
        // Clean up first
        self.clean(self.clock.now())?;

        if span < 0 {
            return self.fetch_count(now, -span);
        }

        // Offset by the slot count so the index stays positive while
        // walking the ring backwards.
        let now_slot = self.slot(now) + self.chunk_count;
        let first_ts = now - span + 1;

        let mut out = GtsEncoder::new(0);

        for i in 0..self.chunk_count {
            let s = (now_slot - i) % self.chunk_count;

            // Take the chunk handle under the ring lock; decode after it
            // is released.
            let encoder = {
                let slots = self.slots.lock()?;
                let slot = &slots[s];
                match &slot.encoder {
                    // Ignore the chunk if it does not intersect the range.
                    Some(encoder)
                        if slot.end >= first_ts && slot.end - self.chunk_len < now =>
                    {
                        Some(Arc::clone(encoder))
                    }
                    _ => None,
                }
            };
            let Some(encoder) = encoder else {
                continue;
            };
            let mut decoder = encoder.lock()?.decoder();

            while decoder.advance()? {
                let ts = decoder.timestamp();
                if ts > now || ts < first_ts {
                    continue;
                }
                out.add_value(
                    ts,
                    decoder.location(),
                    decoder.elevation(),
                    decoder.value().clone(),
                )?;
            }
        }

        Ok(out)
    }

    /// Fetches the `min(count, available)` newest datapoints with
    /// `ts <= now`, newest defined by timestamp.
    ///
    /// Chronological chunks are harvested without materialising or sorting;
    /// out-of-order chunks fall back to staging the eligible datapoints and
    /// sorting their timestamps, which bounds the extra memory to one
    /// chunk's worth. When timestamps tie at the cut, the whole tie group
    /// is kept, so the result may exceed `count` by the tie width.
    pub fn fetch_count(&self, now: Timestamp, count: i64) -> Result<GtsEncoder, StoreError> {
        let now_slot = self.slot(now) + self.chunk_count;

        let mut out = GtsEncoder::new(0);
        let mut remaining = count;

        for i in 0..self.chunk_count {
            if remaining <= 0 {
                break;
            }
            let s = (now_slot - i) % self.chunk_count;

            // Take the chunk handle and its metadata under the ring lock;
            // decode after it is released.
            let snapshot = {
                let slots = self.slots.lock()?;
                let slot = &slots[s];
                match &slot.encoder {
                    // Ignore the chunk if its window lies entirely after `now`.
                    Some(encoder) if slot.end - self.chunk_len < now => {
                        Some((Arc::clone(encoder), slot.chronological, slot.end))
                    }
                    _ => None,
                }
            };
            let Some((encoder, in_order, end)) = snapshot else {
                continue;
            };
            let mut decoder = encoder.lock()?.decoder();

            let k = decoder.count() as i64;
            let chunk_after_now = end > now;

            let emitted = if in_order {
                if !chunk_after_now && k <= remaining {
                    // Whole chunk is eligible and fits the budget.
                    transfer_all(&mut decoder, &mut out)?
                } else if k <= remaining {
                    // Fits the budget but the window extends past `now`;
                    // order lets us stop at the first late timestamp.
                    transfer_until_after(&mut decoder, &mut out, now)?
                } else if !chunk_after_now {
                    // Order makes the newest datapoints the last ones.
                    transfer_tail(&mut decoder, &mut out, k - remaining)?
                } else {
                    // Stage the eligible prefix, then keep its tail.
                    let mut staged = GtsEncoder::new(0);
                    transfer_until_after(&mut decoder, &mut staged, now)?;
                    let staged_count = staged.count() as i64;
                    let mut staged_decoder = staged.decoder();
                    if staged_count <= remaining {
                        transfer_all(&mut staged_decoder, &mut out)?
                    } else {
                        transfer_tail(&mut staged_decoder, &mut out, staged_count - remaining)?
                    }
                }
            } else if !chunk_after_now && k <= remaining {
                transfer_all(&mut decoder, &mut out)?
            } else if k <= remaining {
                // No order to lean on: scan everything, filter on `now`.
                transfer_at_or_before(&mut decoder, &mut out, now)?
            } else {
                // Newest-by-timestamp needs the actual ticks: stage the
                // eligible datapoints, sort their timestamps, and keep
                // everything at or above the cut.
                let mut staged = GtsEncoder::new(0);
                transfer_at_or_before(&mut decoder, &mut staged, now)?;
                let staged_count = staged.count() as i64;
                if staged_count <= remaining {
                    let mut staged_decoder = staged.decoder();
                    transfer_all(&mut staged_decoder, &mut out)?
                } else {
                    let mut ticks = Vec::with_capacity(staged_count as usize);
                    let mut staged_decoder = staged.decoder();
                    while staged_decoder.advance()? {
                        ticks.push(staged_decoder.timestamp());
                    }
                    ticks.sort_unstable();
                    let cutoff = ticks[(staged_count - remaining) as usize];

                    let mut staged_decoder = staged.decoder();
                    let mut emitted = 0u64;
                    while staged_decoder.advance()? {
                        if staged_decoder.timestamp() < cutoff {
                            continue;
                        }
                        out.add_value(
                            staged_decoder.timestamp(),
                            staged_decoder.location(),
                            staged_decoder.elevation(),
                            staged_decoder.value().clone(),
                        )?;
                        emitted += 1;
                    }
                    emitted
                }
            };

            remaining -= emitted as i64;
        }

        Ok(out)
    }

    /// Evicts every chunk whose window has aged out of the ring at `now`,
    /// returning how many were dropped.
    ///
    /// The drop count is reported through the event listener and the
    /// metrics counters on every call, zero included. Slot metadata is left
    /// in place; the next write to the slot re-initialises it.
    pub fn clean(&self, now: Timestamp) -> Result<usize, StoreError> {
        let cutoff = self.chunk_end(now) - self.window;
        let mut dropped = 0;
        {
            let mut slots = self.slots.lock()?;
            for slot in slots.iter_mut() {
                if slot.encoder.is_some() && slot.end <= cutoff {
                    slot.encoder = None;
                    dropped += 1;
                }
            }
        }

        self.events.on_event(StoreEvent::ChunksDropped { dropped });
        store_metrics::record_chunks_dropped(dropped as u64);
        Ok(dropped)
    }

    /// Total number of datapoints across all populated chunks.
    ///
    /// Point-in-time approximation: the ring lock is held only to collect
    /// the chunk handles, not for the whole sum.
    pub fn count(&self) -> Result<u64, StoreError> {
        let mut total = 0;
        for encoder in self.populated_encoders()? {
            total += encoder.lock()?.count();
        }
        Ok(total)
    }

    /// Total byte size across all populated chunks. Point-in-time
    /// approximation, as [`ChunkSet::count`].
    pub fn size(&self) -> Result<u64, StoreError> {
        let mut total = 0;
        for encoder in self.populated_encoders()? {
            total += encoder.lock()?.size();
        }
        Ok(total)
    }

    /// Snapshot decoders over every populated chunk, newest data included
    /// as of the moment each snapshot is taken.
    pub fn decoders(&self) -> Result<Vec<GtsDecoder>, StoreError> {
        let encoders = self.populated_encoders()?;
        let mut out = Vec::with_capacity(encoders.len());
        for encoder in encoders {
            out.push(encoder.lock()?.decoder());
        }
        Ok(out)
    }

    fn populated_encoders(&self) -> Result<Vec<ChunkEncoder>, StoreError> {
        let slots = self.slots.lock()?;
        Ok(slots.iter().filter_map(|s| s.encoder.clone()).collect())
    }

    /// Computes the inclusive end timestamp of the window containing `t`.
    ///
    /// The non-positive branch is shifted by one so windows tile the
    /// timeline with exact `chunk_len` width across the zero boundary.
    fn chunk_end(&self, t: Timestamp) -> Timestamp {
        if t > 0 {
            (t / self.chunk_len) * self.chunk_len + self.chunk_len - 1
        } else {
            ((t + 1) / self.chunk_len - 1) * self.chunk_len + self.chunk_len - 1
        }
    }

    /// Computes the ring index of the window containing `t`.
    fn slot(&self, t: Timestamp) -> usize {
        let c = self.chunk_count as i64;
        if t >= 0 {
            ((t / self.chunk_len) % c) as usize
        } else {
            // Truncating division leaves the remainder in (-c, 0]; the
            // shift lands it in [0, c).
            (c + ((t + 1) / self.chunk_len) % c - 1) as usize
        }
    }
}

fn transfer_all(decoder: &mut GtsDecoder, out: &mut GtsEncoder) -> Result<u64, StoreError> {
    let mut emitted = 0;
    while decoder.advance()? {
        out.add_value(
            decoder.timestamp(),
            decoder.location(),
            decoder.elevation(),
            decoder.value().clone(),
        )?;
        emitted += 1;
    }
    Ok(emitted)
}

/// Chronological sources only: stops at the first timestamp after `now`.
fn transfer_until_after(
    decoder: &mut GtsDecoder,
    out: &mut GtsEncoder,
    now: Timestamp,
) -> Result<u64, StoreError> {
    let mut emitted = 0;
    while decoder.advance()? {
        let ts = decoder.timestamp();
        if ts > now {
            break;
        }
        out.add_value(
            ts,
            decoder.location(),
            decoder.elevation(),
            decoder.value().clone(),
        )?;
        emitted += 1;
    }
    Ok(emitted)
}

/// Full scan keeping every record with `ts <= now`, in source order.
fn transfer_at_or_before(
    decoder: &mut GtsDecoder,
    out: &mut GtsEncoder,
    now: Timestamp,
) -> Result<u64, StoreError> {
    let mut emitted = 0;
    while decoder.advance()? {
        let ts = decoder.timestamp();
        if ts > now {
            continue;
        }
        out.add_value(
            ts,
            decoder.location(),
            decoder.elevation(),
            decoder.value().clone(),
        )?;
        emitted += 1;
    }
    Ok(emitted)
}

/// Skips `skip` records, then transfers the rest.
fn transfer_tail(
    decoder: &mut GtsDecoder,
    out: &mut GtsEncoder,
    skip: i64,
) -> Result<u64, StoreError> {
    let mut skip = skip;
    while skip > 0 && decoder.advance()? {
        skip -= 1;
    }
    transfer_all(decoder, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualTimeSource;
    use crate::types::{Value, NO_ELEVATION, NO_LOCATION};

    fn ring(chunk_count: u32, chunk_length: i64, start: Timestamp) -> (ChunkSet, Arc<ManualTimeSource>) {
        let clock = ManualTimeSource::new(start);
        let set = ChunkSet::with_config(ChunkSetConfig {
            chunk_count,
            chunk_length,
            time_source: clock.clone(),
            ..ChunkSetConfig::default()
        })
        .unwrap();
        (set, clock)
    }

    fn encoder_of(ticks: &[Timestamp]) -> GtsEncoder {
        let mut enc = GtsEncoder::new(0);
        for &ts in ticks {
            enc.add_value(ts, NO_LOCATION, NO_ELEVATION, Value::Long(ts))
                .unwrap();
        }
        enc
    }

    fn ticks_of(enc: &GtsEncoder) -> Vec<Timestamp> {
        let mut dec = enc.decoder();
        let mut out = Vec::new();
        while dec.advance().unwrap() {
            out.push(dec.timestamp());
        }
        out
    }

    #[test]
    fn chunk_end_tiles_across_zero() {
        let (set, _) = ring(4, 1000, 0);
        assert_eq!(set.chunk_end(0), 999);
        assert_eq!(set.chunk_end(999), 999);
        assert_eq!(set.chunk_end(1000), 1999);
        assert_eq!(set.chunk_end(-1), -1);
        assert_eq!(set.chunk_end(-1000), -1);
        assert_eq!(set.chunk_end(-1001), -1001);
        assert_eq!(set.chunk_end(1), 999);
    }

    #[test]
    fn chunk_end_shifts_by_whole_windows() {
        let (set, _) = ring(4, 1000, 0);
        for t in [-2500i64, -1000, -1, 0, 1, 999, 1000, 123_456] {
            assert_eq!(set.chunk_end(t + 1000), set.chunk_end(t) + 1000, "t={}", t);
        }
    }

    #[test]
    fn slot_is_periodic_in_the_window_width() {
        let (set, _) = ring(4, 1000, 0);
        for t in [-9000i64, -4001, -4000, -1, 0, 1, 999, 1000, 3999, 7321] {
            assert_eq!(set.slot(t), set.slot(t + 4000), "t={}", t);
            assert_eq!(set.slot(set.chunk_end(t)), set.slot(t), "t={}", t);
            assert!(set.slot(t) < 4, "t={}", t);
        }
    }

    #[test]
    fn chunk_end_survives_extreme_negative_multiples() {
        let (set, _) = ring(4, 1000, 0);
        // The most negative whole multiple of the chunk length.
        let t = (i64::MIN / 1000) * 1000;
        let end = set.chunk_end(t);
        assert!(end > t);
        assert!(end - 1000 < t);
        assert_eq!(set.chunk_end(end), end);
    }

    #[test]
    fn adjacent_windows_get_distinct_slots() {
        let (set, _) = ring(4, 1000, 0);
        assert_ne!(set.slot(-1), set.slot(0));
        assert_ne!(set.slot(999), set.slot(1000));
        assert_eq!(set.slot(0), set.slot(999));
    }

    #[test]
    fn rejects_degenerate_geometry() {
        assert!(matches!(
            ChunkSet::new(0, 1000),
            Err(StoreError::InvalidConfig { .. })
        ));
        assert!(matches!(
            ChunkSet::new(4, 0),
            Err(StoreError::InvalidConfig { .. })
        ));
        assert!(matches!(
            ChunkSet::new(4, -5),
            Err(StoreError::InvalidConfig { .. })
        ));
        assert!(matches!(
            ChunkSet::new(u32::MAX, i64::MAX / 2),
            Err(StoreError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn store_reports_discarded_out_of_window_points() {
        let (set, _) = ring(4, 1000, 3999);
        // Live window is [0, 3999]: 4500 is ahead of it, -100 behind it.
        let report = set.store(&encoder_of(&[100, 4500, -100, 3999])).unwrap();
        assert_eq!(
            report,
            StoreReport {
                stored: 2,
                discarded: 2
            }
        );
        assert_eq!(set.count().unwrap(), 2);
    }

    #[test]
    fn out_of_order_batch_clears_the_chronological_flag() {
        let (set, _) = ring(4, 1000, 1999);
        set.store(&encoder_of(&[1500, 1200, 1700])).unwrap();
        let slots = set.slots.lock().unwrap();
        let slot = &slots[1];
        assert!(slot.encoder.is_some());
        assert!(!slot.chronological);
        assert_eq!(slot.last_ts, 1700);
        assert_eq!(slot.end, 1999);
    }

    #[test]
    fn first_append_keeps_the_chronological_flag() {
        let (set, _) = ring(4, 1000, 1999);
        // 1000 is the lowest in-window timestamp of slot 1; the sentinel
        // sits one tick below it.
        set.store(&encoder_of(&[1000, 1000, 1500])).unwrap();
        let slots = set.slots.lock().unwrap();
        assert!(slots[1].chronological);
        assert_eq!(slots[1].last_ts, 1500);
    }

    #[test]
    fn stale_slot_is_replaced_on_write() {
        let (set, clock) = ring(4, 1000, 500);
        set.store(&encoder_of(&[400])).unwrap();
        assert_eq!(set.count().unwrap(), 1);

        // One full revolution later, ts 4400 maps to the same slot.
        clock.set(4500);
        set.store(&encoder_of(&[4400])).unwrap();

        let slots = set.slots.lock().unwrap();
        let slot = &slots[0];
        assert_eq!(slot.end, 4999);
        assert_eq!(slot.encoder.as_ref().unwrap().lock().unwrap().count(), 1);
    }

    #[test]
    fn clean_is_idempotent() {
        let (set, clock) = ring(2, 1000, 500);
        set.store(&encoder_of(&[500])).unwrap();
        clock.set(3500);
        assert_eq!(set.clean(3500).unwrap(), 1);
        assert_eq!(set.clean(3500).unwrap(), 0);
    }

    #[test]
    fn span_zero_fetches_nothing() {
        let (set, _) = ring(4, 1000, 3999);
        set.store(&encoder_of(&[100, 200])).unwrap();
        let out = set.fetch_span(3999, 0).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn span_one_fetches_only_now() {
        let (set, _) = ring(4, 1000, 3999);
        set.store(&encoder_of(&[3998, 3999])).unwrap();
        let out = set.fetch_span(3999, 1).unwrap();
        assert_eq!(ticks_of(&out), vec![3999]);
    }

    #[test]
    fn negative_span_is_a_count_request() {
        let (set, _) = ring(4, 1000, 3999);
        set.store(&encoder_of(&[100, 200, 300, 400])).unwrap();
        let out = set.fetch_span(3999, -2).unwrap();
        assert_eq!(ticks_of(&out), vec![300, 400]);
    }

    #[test]
    fn fetch_count_zero_is_empty() {
        let (set, _) = ring(4, 1000, 3999);
        set.store(&encoder_of(&[100, 200])).unwrap();
        let out = set.fetch_count(3999, 0).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn single_slot_ring_collapses_correctly() {
        let (set, _) = ring(1, 1000, 999);
        set.store(&encoder_of(&[100, 500, 900])).unwrap();
        assert_eq!(ticks_of(&set.fetch_span(999, 1000).unwrap()), vec![100, 500, 900]);
        assert_eq!(ticks_of(&set.fetch_count(999, 2).unwrap()), vec![500, 900]);
        // A write from the next revolution replaces the only slot.
        let (set, clock) = ring(1, 1000, 999);
        set.store(&encoder_of(&[500])).unwrap();
        clock.set(1999);
        set.store(&encoder_of(&[1500])).unwrap();
        assert_eq!(ticks_of(&set.fetch_span(1999, 1000).unwrap()), vec![1500]);
    }

    #[test]
    fn decoders_cover_every_populated_slot() {
        let (set, _) = ring(4, 1000, 3999);
        set.store(&encoder_of(&[100, 1100, 3100])).unwrap();
        let decoders = set.decoders().unwrap();
        assert_eq!(decoders.len(), 3);
        let total: u64 = decoders.iter().map(|d| d.count()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn size_tracks_encoder_bytes() {
        let (set, _) = ring(4, 1000, 3999);
        assert_eq!(set.size().unwrap(), 0);
        set.store(&encoder_of(&[100, 1100])).unwrap();
        let size = set.size().unwrap();
        assert!(size > 0);
        set.store(&encoder_of(&[200])).unwrap();
        assert!(set.size().unwrap() > size);
    }
}
