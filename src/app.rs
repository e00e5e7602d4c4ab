use chrono::Utc;
use log::debug;
use serde::{Serialize, Serializer};

use crate::config::DeviceConfig;
use crate::error::{ConfigError, SampleError};
use crate::state::StateStore;
use crate::system::collector::{Connector, CounterSource};
use crate::system::network::{RateSample, Snapshot};
use crate::system::rate;

/// Source of "now" in fractional seconds since the Unix epoch
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Outcome of one cycle, serialized as the record the widget reads
#[derive(Debug)]
pub enum SamplingResult {
    Sample(RateSample),
    Failed(SampleError),
}

impl SamplingResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, SamplingResult::Sample(_))
    }
}

#[derive(Serialize)]
struct FailureRecord<'a> {
    upload: &'a str,
    download: &'a str,
    error: String,
}

impl Serialize for SamplingResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SamplingResult::Sample(sample) => sample.serialize(serializer),
            SamplingResult::Failed(err) => FailureRecord {
                upload: err.tag(),
                download: err.tag(),
                error: err.to_string(),
            }
            .serialize(serializer),
        }
    }
}

/// Runs sampling cycles against one state store
pub struct Sampler<C: Clock> {
    store: StateStore,
    clock: C,
}

impl<C: Clock> Sampler<C> {
    pub fn new(store: StateStore, clock: C) -> Self {
        Self { store, clock }
    }

    /// Full invocation: settings, device session, then one cycle.
    /// Nothing touches the state file unless counters were fetched.
    pub fn run(
        &self,
        config: Result<DeviceConfig, ConfigError>,
        connector: &dyn Connector,
    ) -> SamplingResult {
        let config = match config {
            Ok(c) => c,
            Err(e) => return SamplingResult::Failed(e.into()),
        };
        let mut source = match connector.connect(&config) {
            Ok(s) => s,
            Err(e) => return SamplingResult::Failed(e),
        };
        self.run_cycle(source.as_mut())
    }

    /// One cycle: fetch, load baseline, compute, persist, report
    pub fn run_cycle(&self, source: &mut dyn CounterSource) -> SamplingResult {
        let current = match source.fetch_counters() {
            Ok(c) => c,
            Err(e) => return SamplingResult::Failed(e.into()),
        };

        let prev = self.store.load();
        let now = self.clock.now();
        let sample = rate::compute(&prev, &current, now);
        debug!("prev={:?} curr={:?} -> {}", prev, current, sample);

        self.store.save(&Snapshot::new(current, now));
        SamplingResult::Sample(sample)
    }
}
