//! fbtraffic: upload/download rates from a router's cumulative byte counters.
//!
//! Each invocation runs one sampling cycle and prints a single JSON record:
//!   - `{"upload": 1.0, "download": 12.05, "timestamp": 1700000001.0}`
//!   - `{"upload": "ConErr", "download": "ConErr", "error": "..."}`
//!
//! The previous reading is kept in `~/.cache/fritz_traffic_state.json`; the
//! widget that calls this is expected to do so on a fixed interval.
//! Set `RUST_LOG=debug` for diagnostics on stderr.

mod app;
mod config;
mod error;
mod state;
mod system;

use std::io::{self, Write};

use anyhow::Result;
use log::debug;

use app::{Sampler, SamplingResult, SystemClock};
use config::DeviceConfig;
use state::StateStore;
use system::collector::LocalConnector;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let sampler = Sampler::new(StateStore::new(state::default_state_path()), SystemClock);
    let result = sampler.run(DeviceConfig::load(), &LocalConnector);
    if let SamplingResult::Sample(sample) = &result {
        debug!("{}", sample);
    }

    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &result)?;
    writeln!(stdout)?;
    stdout.flush()?;

    if !result.is_ok() {
        std::process::exit(1);
    }
    Ok(())
}
