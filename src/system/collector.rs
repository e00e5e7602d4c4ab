use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use log::debug;
use sysinfo::Networks;

use crate::config::DeviceConfig;
use crate::error::{SampleError, SourceError};
use crate::system::network::Counters;

/// Anything that can report the device's current cumulative byte counters.
///
/// Implementations are expected to bound their own I/O (see
/// [`DeviceConfig::timeout`]) and fail rather than hang.
pub trait CounterSource {
    fn fetch_counters(&mut self) -> Result<Counters, SourceError>;
}

/// Establishes a session with the device and hands back a counter source
pub trait Connector {
    fn connect(&self, config: &DeviceConfig) -> Result<Box<dyn CounterSource>, SampleError>;
}

/// Per-interface totals: name -> (received, transmitted)
type InterfaceTotals = HashMap<String, (u64, u64)>;

/// Counter source over the local host's interfaces via the `sysinfo` crate.
///
/// Meant for running directly on the router (or any gateway box), where the
/// WAN counters are the machine's own interface counters. Each read runs on a
/// worker thread and is abandoned once `timeout` passes.
pub struct InterfaceCounters {
    /// Interfaces to sum; empty means all except loopback
    interfaces: HashSet<String>,
    timeout: Duration,
}

impl InterfaceCounters {
    pub fn new(interfaces: &[String], timeout: Duration) -> Self {
        Self {
            interfaces: interfaces.iter().cloned().collect(),
            timeout,
        }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(&config.interfaces, config.timeout)
    }

    fn is_selected(&self, name: &str) -> bool {
        if self.interfaces.is_empty() {
            !is_loopback(name)
        } else {
            self.interfaces.contains(name)
        }
    }

    fn read_totals(&self) -> Result<InterfaceTotals, SourceError> {
        with_timeout(self.timeout, || {
            Networks::new_with_refreshed_list()
                .iter()
                .map(|(name, data)| {
                    (name.clone(), (data.total_received(), data.total_transmitted()))
                })
                .collect()
        })
    }

    fn missing_interfaces(&self, totals: &InterfaceTotals) -> Vec<String> {
        let mut missing: Vec<String> = self
            .interfaces
            .iter()
            .filter(|name| !totals.contains_key(name.as_str()))
            .cloned()
            .collect();
        missing.sort();
        missing
    }

    fn sum_selected(&self, totals: &InterfaceTotals) -> Result<Counters, SourceError> {
        let mut total_rx: u64 = 0;
        let mut total_tx: u64 = 0;
        let mut seen = 0usize;
        for (name, (rx, tx)) in totals {
            if !self.is_selected(name) {
                continue;
            }
            total_rx = total_rx.saturating_add(*rx);
            total_tx = total_tx.saturating_add(*tx);
            seen += 1;
        }

        if seen == 0 {
            return Err(SourceError::new("no network interface reported byte counters"));
        }
        debug!("{} interface(s): tx={} rx={}", seen, total_tx, total_rx);

        Ok(Counters::new(total_tx as f64, total_rx as f64))
    }
}

impl CounterSource for InterfaceCounters {
    fn fetch_counters(&mut self) -> Result<Counters, SourceError> {
        let totals = self.read_totals()?;
        self.sum_selected(&totals)
    }
}

/// Run `read` on a worker thread, giving up after `timeout`.
///
/// A read that overruns keeps its thread until it finishes; its result is
/// dropped.
fn with_timeout<T, F>(timeout: Duration, read: F) -> Result<T, SourceError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("counter-read".into())
        .spawn(move || {
            let _ = tx.send(read());
        })
        .map_err(|e| SourceError::new(format!("failed to start counter read: {e}")))?;

    match rx.recv_timeout(timeout) {
        Ok(value) => Ok(value),
        Err(RecvTimeoutError::Timeout) => Err(SourceError::new(format!(
            "counter read timed out after {:?}",
            timeout
        ))),
        Err(RecvTimeoutError::Disconnected) => {
            Err(SourceError::new("counter read aborted"))
        }
    }
}

/// Connector for [`InterfaceCounters`]. The handshake is one bounded read
/// that checks every configured interface exists.
pub struct LocalConnector;

impl Connector for LocalConnector {
    fn connect(&self, config: &DeviceConfig) -> Result<Box<dyn CounterSource>, SampleError> {
        let source = InterfaceCounters::from_config(config);
        let totals = source
            .read_totals()
            .map_err(|e| SampleError::Connection(format!("{}: {}", config.host, e)))?;
        let missing = source.missing_interfaces(&totals);
        if !missing.is_empty() {
            return Err(SampleError::Connection(format!(
                "interface(s) not found on {}: {}",
                config.host,
                missing.join(", ")
            )));
        }
        debug!(
            "reading local interface counters for {} (timeout {:?})",
            config.host, config.timeout
        );
        Ok(Box::new(source))
    }
}

fn is_loopback(name: &str) -> bool {
    name == "lo" || name.starts_with("lo0") || name.starts_with("Loopback")
}
