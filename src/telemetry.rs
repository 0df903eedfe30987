use std::sync::Arc;

#[cfg(feature = "prometheus")]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "prometheus")]
use std::sync::Mutex;
#[cfg(feature = "prometheus")]
use std::thread::JoinHandle;
#[cfg(feature = "prometheus")]
use std::time::Duration;

/// Structured, in-process event hook for observability.
///
/// This crate is a library; emitting logs directly (e.g. `println!`) is not
/// acceptable for production. Callers provide an implementation that forwards
/// these events to `tracing`, `log`, metrics, or custom sinks. The listener
/// doubles as the injected metric sink for chunk eviction accounting.
pub trait StoreEventListener: std::fmt::Debug + Send + Sync + 'static {
    fn on_event(&self, event: StoreEvent);
}

/// Structured events emitted by the chunk store.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// Chunks evicted by a clean pass. Emitted on every pass, zero included.
    ChunksDropped { dropped: usize },
    /// Outcome of one ingest call: accepted datapoints and datapoints
    /// discarded for falling outside the live window.
    DatapointsStored { stored: u64, discarded: u64 },
}

#[derive(Debug)]
pub struct NoopEventListener;

impl StoreEventListener for NoopEventListener {
    #[inline]
    fn on_event(&self, _event: StoreEvent) {}
}

pub fn noop_event_listener() -> Arc<dyn StoreEventListener> {
    Arc::new(NoopEventListener)
}

/// Production-grade metrics instrumentation and in-process scraping.
///
/// ## Key properties
/// - Library-safe: emitting metrics is effectively a no-op until a recorder is installed.
/// - Serverless scraping: callers can render Prometheus exposition text in-process.
/// - Low operational overhead: a lightweight upkeep thread keeps histograms bounded.
pub mod store_metrics {
    use super::*;

    use ::metrics::{describe_counter, Unit};

    #[cfg(feature = "prometheus")]
    use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

    // --- metric names ---
    //
    // Counters are exposed as `<name>_total` by the Prometheus exporter.

    pub const INMEMORY_CHUNKS_DROPPED: &str = "gyre_inmemory_chunks_dropped";
    pub const STORE_DATAPOINTS: &str = "gyre_store_datapoints";
    pub const STORE_DATAPOINTS_DISCARDED: &str = "gyre_store_datapoints_discarded";

    /// Handle to the in-process Prometheus recorder/scrape renderer.
    ///
    /// This does **not** start an HTTP server. Call [`InProcessPrometheus::render`] to scrape.
    #[cfg(feature = "prometheus")]
    pub struct InProcessPrometheus {
        handle: PrometheusHandle,
        stop: Arc<AtomicBool>,
        upkeep_thread: Mutex<Option<JoinHandle<()>>>,
    }

    #[cfg(feature = "prometheus")]
    impl InProcessPrometheus {
        /// Installs a global Prometheus recorder (once per process) and starts a small upkeep thread.
        ///
        /// The upkeep thread periodically calls `run_upkeep()` to keep exporter internals healthy.
        /// This is required when using `install_recorder`.
        pub fn install(upkeep_interval: Duration) -> Result<Self, MetricsInitError> {
            describe_all();

            let builder = PrometheusBuilder::new();
            let handle = builder
                .install_recorder()
                .map_err(MetricsInitError::from_build_error)?;

            let stop = Arc::new(AtomicBool::new(false));
            let stop_clone = stop.clone();
            let handle_clone = handle.clone();
            let upkeep_thread = std::thread::Builder::new()
                .name("gyre-metrics-upkeep".to_string())
                .spawn(move || {
                    while !stop_clone.load(Ordering::Relaxed) {
                        std::thread::sleep(upkeep_interval);
                        handle_clone.run_upkeep();
                    }
                })
                .map_err(|e| MetricsInitError::ThreadSpawn(e.to_string()))?;

            Ok(Self {
                handle,
                stop,
                upkeep_thread: Mutex::new(Some(upkeep_thread)),
            })
        }

        /// Renders the current metrics in the Prometheus text exposition format.
        pub fn render(&self) -> String {
            self.handle.render()
        }
    }

    #[cfg(feature = "prometheus")]
    impl Drop for InProcessPrometheus {
        fn drop(&mut self) {
            self.stop.store(true, Ordering::Relaxed);
            if let Ok(mut guard) = self.upkeep_thread.lock() {
                if let Some(t) = guard.take() {
                    let _ = t.join();
                }
            }
        }
    }

    #[cfg(feature = "prometheus")]
    #[derive(Debug, thiserror::Error)]
    pub enum MetricsInitError {
        #[error("metrics recorder already installed")]
        AlreadyInstalled,
        #[error("failed to install prometheus recorder: {0}")]
        Install(String),
        #[error("failed to spawn upkeep thread: {0}")]
        ThreadSpawn(String),
    }

    #[cfg(feature = "prometheus")]
    impl MetricsInitError {
        fn from_build_error(e: BuildError) -> Self {
            match e {
                BuildError::FailedToSetGlobalRecorder(_) => MetricsInitError::AlreadyInstalled,
                other => MetricsInitError::Install(other.to_string()),
            }
        }
    }

    #[inline]
    pub fn record_chunks_dropped(dropped: u64) {
        if dropped > 0 {
            ::metrics::counter!(INMEMORY_CHUNKS_DROPPED).increment(dropped);
        }
    }

    #[inline]
    pub fn record_store(stored: u64, discarded: u64) {
        if stored > 0 {
            ::metrics::counter!(STORE_DATAPOINTS).increment(stored);
        }
        if discarded > 0 {
            ::metrics::counter!(STORE_DATAPOINTS_DISCARDED).increment(discarded);
        }
    }

    fn describe_all() {
        describe_counter!(
            INMEMORY_CHUNKS_DROPPED,
            Unit::Count,
            "Total number of chunks evicted by clean passes."
        );
        describe_counter!(
            STORE_DATAPOINTS,
            Unit::Count,
            "Total number of datapoints accepted into the chunk ring."
        );
        describe_counter!(
            STORE_DATAPOINTS_DISCARDED,
            Unit::Count,
            "Total number of datapoints discarded for falling outside the live window."
        );
    }
}
