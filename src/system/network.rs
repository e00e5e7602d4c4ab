use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

/// Cumulative byte counters as reported by the monitored device
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Counters {
    /// Total bytes transmitted (upload direction)
    pub sent: f64,
    /// Total bytes received (download direction)
    pub recv: f64,
}

impl Counters {
    pub fn new(sent: f64, recv: f64) -> Self {
        Self { sent, recv }
    }
}

/// Last observed counters plus the wall-clock second they were read at.
///
/// Persisted as `{"sent": .., "recv": .., "time": ..}`. Every field is read
/// leniently: absent, null, non-numeric or non-finite values become `0.0`
/// without discarding the rest of the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sent: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub recv: f64,
    #[serde(rename = "time", default, deserialize_with = "lenient_f64")]
    pub timestamp: f64,
}

impl Snapshot {
    pub fn new(counters: Counters, timestamp: f64) -> Self {
        Self {
            sent: counters.sent,
            recv: counters.recv,
            timestamp,
        }
    }

    /// All-zero baseline used when no usable state exists
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Upload/download rates in kB/s (1 kB = 1024 bytes) for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateSample {
    #[serde(rename = "upload")]
    pub upload_kbps: f64,
    #[serde(rename = "download")]
    pub download_kbps: f64,
    pub timestamp: f64,
}

impl fmt::Display for RateSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "up {:.2} kB/s, down {:.2} kB/s",
            self.upload_kbps, self.download_kbps
        )
    }
}

/// Accepts numbers and numeric strings; anything else collapses to 0.0.
///
/// Reads the raw token so an out-of-range number (`1e400`) only voids its
/// own field instead of failing the whole record.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Box::<RawValue>::deserialize(deserializer)?;
    let text = raw.get().trim();
    let parsed = if text.starts_with('"') {
        serde_json::from_str::<String>(text)
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok())
    } else {
        text.parse::<f64>().ok()
    };
    Ok(parsed.filter(|v| v.is_finite()).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_uses_time_key_on_disk() {
        let snap = Snapshot::new(Counters::new(10.0, 20.0), 1700000000.5);
        let json = serde_json::to_value(snap).unwrap();
        assert_eq!(json["sent"], 10.0);
        assert_eq!(json["recv"], 20.0);
        assert_eq!(json["time"], 1700000000.5);
    }

    #[test]
    fn invalid_fields_default_individually() {
        let snap: Snapshot =
            serde_json::from_str(r#"{"sent":"abc","recv":"512","time":null,"extra":true}"#)
                .unwrap();
        assert_eq!(snap.sent, 0.0);
        assert_eq!(snap.recv, 512.0);
        assert_eq!(snap.timestamp, 0.0);
    }

    #[test]
    fn out_of_range_number_voids_only_its_field() {
        let snap: Snapshot =
            serde_json::from_str(r#"{"sent": 1e400, "recv": 2048, "time": 99.5}"#).unwrap();
        assert_eq!(snap, Snapshot { sent: 0.0, recv: 2048.0, timestamp: 99.5 });

        let snap: Snapshot =
            serde_json::from_str(r#"{"sent": [1], "recv": {"a": 1}, "time": -1e999}"#).unwrap();
        assert_eq!(snap, Snapshot::zero());
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let snap: Snapshot = serde_json::from_str(r#"{"recv":7}"#).unwrap();
        assert_eq!(snap, Snapshot { sent: 0.0, recv: 7.0, timestamp: 0.0 });
    }

    #[test]
    fn rate_sample_output_shape() {
        let sample = RateSample {
            upload_kbps: 1.0,
            download_kbps: 12.05,
            timestamp: 42.0,
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(json, r#"{"upload":1.0,"download":12.05,"timestamp":42.0}"#);
        assert_eq!(sample.to_string(), "up 1.00 kB/s, down 12.05 kB/s");
    }
}
