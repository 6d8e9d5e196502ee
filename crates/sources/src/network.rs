//! Network throughput data source implementation

use crate::counters::{CounterError, NetworkCounters, SysinfoCounters};
use anyhow::Result;
use jsens_core::{
    DataSource, SourceConfig, SourceMetadata, BYTES_PER_KB, BYTES_PER_MB, MIN_POLL_INTERVAL_MS,
    NETWORK_POLL_INTERVAL,
};
use jsens_types::{
    InterfaceCounterSnapshot, InterfaceInfo, NetworkSourceConfig, ThroughputRate,
    ThroughputSample,
};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Name fragments preferred when picking a default interface, highest first
const PRIORITY_PATTERNS: [&str; 3] = ["wi-fi", "wlan", "ethernet"];

/// Label shown while the first snapshot of an interface is being taken
const BASELINE_PLACEHOLDER: &str = "0.0 KB/s";

/// Pick the interface to monitor when the user has not chosen one.
///
/// Only up, non-loopback, non-virtual interfaces qualify. Among those a name
/// containing "wi-fi", then "wlan", then "ethernet" wins; otherwise the first
/// candidate in enumeration order is used. That order comes straight from the
/// OS and may differ between calls.
pub fn select_default_interface(available: &[InterfaceInfo]) -> Option<String> {
    let candidates: Vec<&InterfaceInfo> = available.iter().filter(|i| i.is_candidate()).collect();

    for pattern in PRIORITY_PATTERNS {
        if let Some(found) = candidates
            .iter()
            .find(|i| i.name.to_lowercase().contains(pattern))
        {
            return Some(found.name.clone());
        }
    }

    candidates.first().map(|i| i.name.clone())
}

/// Format a byte rate for display
pub fn format_rate(bytes_per_sec: f64) -> String {
    if bytes_per_sec < BYTES_PER_KB {
        format!("{:.1} B/s", bytes_per_sec)
    } else if bytes_per_sec < BYTES_PER_MB {
        format!("{:.1} KB/s", bytes_per_sec / BYTES_PER_KB)
    } else {
        format!("{:.2} MB/s", bytes_per_sec / BYTES_PER_MB)
    }
}

fn direction_text(sample: &ThroughputSample, pick: fn(&ThroughputRate) -> f64) -> String {
    match sample {
        ThroughputSample::NoInterface => "--".to_string(),
        ThroughputSample::Unavailable => "N/A".to_string(),
        ThroughputSample::Baseline => BASELINE_PLACEHOLDER.to_string(),
        ThroughputSample::Rate(rate) => format_rate(pick(rate)),
    }
}

/// Download line of the network panel, e.g. `↓ 2.0 KB/s`
pub fn download_label(sample: &ThroughputSample) -> String {
    format!("↓ {}", direction_text(sample, |r| r.download_bytes_per_sec))
}

/// Upload line of the network panel, e.g. `↑ 512.0 B/s`
pub fn upload_label(sample: &ThroughputSample) -> String {
    format!("↑ {}", direction_text(sample, |r| r.upload_bytes_per_sec))
}

/// Rate of one counter, `None` when the counter went backwards
fn counter_rate(previous: u64, current: u64, elapsed_secs: f64) -> Option<f64> {
    current
        .checked_sub(previous)
        .map(|delta| delta as f64 / elapsed_secs)
}

/// Derives throughput from consecutive counter snapshots of one interface
#[derive(Debug, Default)]
pub struct ThroughputSampler {
    selected_interface: Option<String>,
    /// Baseline for the next delta
    previous: Option<InterfaceCounterSnapshot>,
    last_sample: ThroughputSample,
}

impl ThroughputSampler {
    pub fn new(interface: Option<String>) -> Self {
        let mut sampler = Self::default();
        sampler.set_interface(interface);
        sampler
    }

    pub fn selected_interface(&self) -> Option<&str> {
        self.selected_interface.as_deref()
    }

    pub fn last_sample(&self) -> ThroughputSample {
        self.last_sample
    }

    /// Switch interfaces; the next sample re-establishes the baseline
    pub fn set_interface(&mut self, interface: Option<String>) {
        self.last_sample = match interface {
            Some(_) => ThroughputSample::Baseline,
            None => ThroughputSample::NoInterface,
        };
        self.selected_interface = interface;
        self.previous = None;
    }

    /// Feed the latest snapshot of the selected interface.
    ///
    /// `None` means the interface could not be read this tick.
    pub fn sample_throughput(
        &mut self,
        current: Option<InterfaceCounterSnapshot>,
    ) -> ThroughputSample {
        let sample = self.compute(current);
        self.last_sample = sample;
        sample
    }

    fn compute(&mut self, current: Option<InterfaceCounterSnapshot>) -> ThroughputSample {
        let Some(selected) = self.selected_interface.as_deref() else {
            return ThroughputSample::NoInterface;
        };
        let current = match current {
            Some(snapshot) if snapshot.interface_name == selected => snapshot,
            _ => return ThroughputSample::Unavailable,
        };
        let Some(previous) = self.previous.as_ref() else {
            self.previous = Some(current);
            return ThroughputSample::Baseline;
        };

        let elapsed = match current.timestamp.checked_duration_since(previous.timestamp) {
            Some(elapsed) if !elapsed.is_zero() => elapsed.as_secs_f64(),
            _ => return self.last_sample,
        };

        let download = counter_rate(previous.bytes_received, current.bytes_received, elapsed);
        let upload = counter_rate(previous.bytes_sent, current.bytes_sent, elapsed);
        if download.is_none() || upload.is_none() {
            log::debug!(
                "Counter reset on {}, using new values as baseline",
                current.interface_name
            );
        }

        self.previous = Some(current);
        ThroughputSample::Rate(ThroughputRate {
            download_bytes_per_sec: download.unwrap_or(0.0),
            upload_bytes_per_sec: upload.unwrap_or(0.0),
        })
    }
}

/// Network throughput data source
///
/// Reads counters through a [`NetworkCounters`] collaborator and feeds them to
/// a [`ThroughputSampler`]. Collaborator failures never escape `update`; they
/// show up as [`ThroughputSample::Unavailable`].
pub struct NetworkSource {
    metadata: SourceMetadata,
    config: NetworkSourceConfig,
    counters: Box<dyn NetworkCounters>,
    sampler: ThroughputSampler,
    /// Set while reads are failing, so the failure is only warned about once
    read_failing: bool,
    values: HashMap<String, Value>,
}

impl NetworkSource {
    pub fn new(counters: Box<dyn NetworkCounters>) -> Self {
        let metadata = SourceMetadata {
            id: "network".to_string(),
            default_interval: NETWORK_POLL_INTERVAL,
        };

        let mut source = Self {
            metadata,
            config: NetworkSourceConfig::default(),
            counters,
            sampler: ThroughputSampler::default(),
            read_failing: false,
            values: HashMap::with_capacity(8),
        };
        source.refresh_values();
        source
    }

    /// Source reading the OS counters via sysinfo
    pub fn with_system_counters() -> Self {
        Self::new(Box::new(SysinfoCounters::new()))
    }

    /// Set configuration
    pub fn set_config(&mut self, config: NetworkSourceConfig) {
        let interface_changed = config.interface != self.config.interface;
        self.config = config;
        self.set_polling_interval(self.config.update_interval_ms);
        if interface_changed {
            self.sampler.set_interface(self.config.interface.clone());
            self.refresh_values();
        }
    }

    pub fn get_config(&self) -> &NetworkSourceConfig {
        &self.config
    }

    /// Switch the monitored interface and drop the stored baseline
    pub fn set_interface(&mut self, interface: Option<String>) {
        log::info!("Monitoring network interface {:?}", interface);
        self.config.interface = interface.clone();
        self.sampler.set_interface(interface);
        self.read_failing = false;
        self.refresh_values();
    }

    /// Change the polling cadence; returns the interval actually applied
    pub fn set_polling_interval(&mut self, interval_ms: u64) -> u64 {
        let applied = interval_ms.max(MIN_POLL_INTERVAL_MS);
        if applied != interval_ms {
            log::warn!(
                "Polling interval {} ms is too short, using {} ms",
                interval_ms,
                applied
            );
        }
        self.config.update_interval_ms = applied;
        applied
    }

    /// Enumerate interfaces, empty on failure
    pub fn available_interfaces(&mut self) -> Vec<InterfaceInfo> {
        match self.counters.interfaces() {
            Ok(interfaces) => interfaces,
            Err(e) => {
                log::warn!("{}", e);
                Vec::new()
            }
        }
    }

    /// Select the preferred interface of the current enumeration
    pub fn select_default_interface(&mut self) -> Option<String> {
        let available = self.available_interfaces();
        let chosen = select_default_interface(&available);
        if chosen.is_none() {
            log::warn!("No active network interface found");
        }
        self.set_interface(chosen.clone());
        chosen
    }

    pub fn last_sample(&self) -> ThroughputSample {
        self.sampler.last_sample()
    }

    fn read_current(&mut self) -> Option<InterfaceCounterSnapshot> {
        let interface = self.sampler.selected_interface()?;
        let result: Result<Option<InterfaceCounterSnapshot>, CounterError> =
            self.counters.read_counters(interface);

        match result {
            Ok(Some(snapshot)) => {
                if self.read_failing {
                    log::info!("Counters for {} are readable again", interface);
                    self.read_failing = false;
                }
                Some(snapshot)
            }
            Ok(None) => {
                if !self.read_failing {
                    log::warn!("Network interface {} not found", interface);
                    self.read_failing = true;
                }
                None
            }
            Err(e) => {
                if self.read_failing {
                    log::debug!("{}", e);
                } else {
                    log::warn!("{}", e);
                    self.read_failing = true;
                }
                None
            }
        }
    }

    fn refresh_values(&mut self) {
        let sample = self.sampler.last_sample();
        let rate = sample.rate().unwrap_or_default();

        self.values.clear();
        self.values.insert(
            "interface_name".to_string(),
            Value::from(self.sampler.selected_interface().unwrap_or("")),
        );
        self.values
            .insert("status".to_string(), Value::from(sample.status()));
        self.values.insert(
            "raw_download_speed".to_string(),
            Value::from(rate.download_bytes_per_sec),
        );
        self.values.insert(
            "raw_upload_speed".to_string(),
            Value::from(rate.upload_bytes_per_sec),
        );
        self.values
            .insert("download_text".to_string(), Value::from(download_label(&sample)));
        self.values
            .insert("upload_text".to_string(), Value::from(upload_label(&sample)));
    }

    /// Read the counters and derive a new sample
    pub fn sample(&mut self) -> ThroughputSample {
        let current = self.read_current();
        let sample = self.sampler.sample_throughput(current);
        self.refresh_values();
        sample
    }
}

impl DataSource for NetworkSource {
    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    fn update(&mut self) -> Result<()> {
        self.sample();
        Ok(())
    }

    fn values_ref(&self) -> &HashMap<String, Value> {
        &self.values
    }

    fn update_interval(&self) -> Duration {
        Duration::from_millis(self.config.update_interval_ms)
    }

    fn configure_typed(&mut self, config: &SourceConfig) -> Result<()> {
        if let SourceConfig::Network(network_config) = config {
            self.set_config(network_config.clone());
        }
        Ok(())
    }

    fn get_typed_config(&self) -> Option<SourceConfig> {
        Some(SourceConfig::Network(self.config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Instant;

    fn snap(name: &str, sent: u64, recv: u64, at: Instant) -> InterfaceCounterSnapshot {
        InterfaceCounterSnapshot::new(name, sent, recv, at)
    }

    fn rate_of(sample: ThroughputSample) -> ThroughputRate {
        sample.rate().expect("expected a rate")
    }

    /// Counters that replay a fixed script of read results
    struct ScriptedCounters {
        interfaces: Vec<InterfaceInfo>,
        reads: VecDeque<Result<Option<(u64, u64)>, CounterError>>,
        clock: Instant,
    }

    impl ScriptedCounters {
        fn new(reads: Vec<Result<Option<(u64, u64)>, CounterError>>) -> Self {
            Self {
                interfaces: vec![
                    InterfaceInfo::new("lo", true, true, false),
                    InterfaceInfo::new("eth0", true, false, false),
                ],
                reads: reads.into(),
                clock: Instant::now(),
            }
        }
    }

    impl NetworkCounters for ScriptedCounters {
        fn interfaces(&mut self) -> Result<Vec<InterfaceInfo>, CounterError> {
            Ok(self.interfaces.clone())
        }

        fn read_counters(
            &mut self,
            interface: &str,
        ) -> Result<Option<InterfaceCounterSnapshot>, CounterError> {
            self.clock += Duration::from_secs(1);
            match self.reads.pop_front() {
                Some(Ok(Some((sent, recv)))) => Ok(Some(snap(interface, sent, recv, self.clock))),
                Some(Ok(None)) | None => Ok(None),
                Some(Err(e)) => Err(e),
            }
        }
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.0), "0.0 B/s");
        assert_eq!(format_rate(1023.0), "1023.0 B/s");
        assert!(format_rate(1023.0).ends_with("B/s"));
        assert_eq!(format_rate(1024.0), "1.0 KB/s");
        assert_eq!(format_rate(2048.0), "2.0 KB/s");
        assert_eq!(format_rate(1024.0 * 1024.0), "1.00 MB/s");
        assert_eq!(format_rate(1.5 * 1024.0 * 1024.0), "1.50 MB/s");
    }

    #[test]
    fn test_select_prefers_wifi() {
        let available = vec![
            InterfaceInfo::new("eth0", true, false, false),
            InterfaceInfo::new("lo", true, true, false),
            InterfaceInfo::new("Wi-Fi", true, false, false),
        ];
        assert_eq!(select_default_interface(&available), Some("Wi-Fi".to_string()));

        let mut reversed = available.clone();
        reversed.reverse();
        assert_eq!(select_default_interface(&reversed), Some("Wi-Fi".to_string()));
    }

    #[test]
    fn test_select_priority_order() {
        let available = vec![
            InterfaceInfo::new("Ethernet 2", true, false, false),
            InterfaceInfo::new("wlan0", true, false, false),
        ];
        assert_eq!(select_default_interface(&available), Some("wlan0".to_string()));

        let available = vec![
            InterfaceInfo::new("enp3s0", true, false, false),
            InterfaceInfo::new("Ethernet", true, false, false),
        ];
        assert_eq!(select_default_interface(&available), Some("Ethernet".to_string()));
    }

    #[test]
    fn test_select_falls_back_to_first_candidate() {
        let available = vec![
            InterfaceInfo::new("docker0", true, false, true),
            InterfaceInfo::new("enp3s0", true, false, false),
            InterfaceInfo::new("enp4s0", true, false, false),
        ];
        assert_eq!(select_default_interface(&available), Some("enp3s0".to_string()));
    }

    #[test]
    fn test_select_with_no_candidates() {
        let available = vec![
            InterfaceInfo::new("lo", true, true, false),
            InterfaceInfo::new("wlan0", false, false, false),
            InterfaceInfo::new("Wi-Fi virtual", true, false, true),
        ];
        assert_eq!(select_default_interface(&available), None);
        assert_eq!(select_default_interface(&[]), None);
    }

    #[test]
    fn test_rate_from_two_snapshots() {
        let t0 = Instant::now();
        let mut sampler = ThroughputSampler::new(Some("eth0".to_string()));

        let first = sampler.sample_throughput(Some(snap("eth0", 500, 10_000, t0)));
        assert_eq!(first, ThroughputSample::Baseline);

        let second = sampler.sample_throughput(Some(snap(
            "eth0",
            1012,
            12_048,
            t0 + Duration::from_secs(1),
        )));
        let rate = rate_of(second);
        assert_eq!(rate.download_bytes_per_sec, 2048.0);
        assert_eq!(rate.upload_bytes_per_sec, 512.0);
        assert_eq!(download_label(&second), "↓ 2.0 KB/s");
        assert_eq!(upload_label(&second), "↑ 512.0 B/s");
    }

    #[test]
    fn test_counter_reset_reports_zero_and_rebaselines() {
        let t0 = Instant::now();
        let mut sampler = ThroughputSampler::new(Some("eth0".to_string()));
        sampler.sample_throughput(Some(snap("eth0", 5_000, 50_000, t0)));

        // Receive counter reset, send counter kept growing
        let reset = sampler.sample_throughput(Some(snap(
            "eth0",
            6_000,
            100,
            t0 + Duration::from_secs(1),
        )));
        let rate = rate_of(reset);
        assert_eq!(rate.download_bytes_per_sec, 0.0);
        assert_eq!(rate.upload_bytes_per_sec, 1000.0);

        // Next tick measures from the reset value
        let after = sampler.sample_throughput(Some(snap(
            "eth0",
            6_000,
            1_124,
            t0 + Duration::from_secs(2),
        )));
        assert_eq!(rate_of(after).download_bytes_per_sec, 1024.0);
    }

    #[test]
    fn test_zero_elapsed_returns_previous_sample() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(2);
        let mut sampler = ThroughputSampler::new(Some("eth0".to_string()));
        sampler.sample_throughput(Some(snap("eth0", 0, 0, t0)));
        let rated = sampler.sample_throughput(Some(snap("eth0", 0, 4096, t1)));

        // Same instant again, with bigger counters that must not be stored
        let repeat = sampler.sample_throughput(Some(snap("eth0", 0, 999_999, t1)));
        assert_eq!(repeat, rated);

        let next = sampler.sample_throughput(Some(snap(
            "eth0",
            0,
            6144,
            t1 + Duration::from_secs(1),
        )));
        assert_eq!(rate_of(next).download_bytes_per_sec, 2048.0);
    }

    #[test]
    fn test_no_interface_and_missing_snapshot() {
        let mut sampler = ThroughputSampler::new(None);
        let t0 = Instant::now();
        assert_eq!(
            sampler.sample_throughput(Some(snap("eth0", 1, 1, t0))),
            ThroughputSample::NoInterface
        );
        assert_eq!(download_label(&ThroughputSample::NoInterface), "↓ --");

        sampler.set_interface(Some("eth0".to_string()));
        assert_eq!(sampler.sample_throughput(None), ThroughputSample::Unavailable);
        assert_eq!(
            sampler.sample_throughput(Some(snap("wlan0", 1, 1, t0))),
            ThroughputSample::Unavailable
        );
        assert_eq!(upload_label(&ThroughputSample::Unavailable), "↑ N/A");
    }

    #[test]
    fn test_set_interface_discards_baseline() {
        let t0 = Instant::now();
        let mut sampler = ThroughputSampler::new(Some("eth0".to_string()));
        sampler.sample_throughput(Some(snap("eth0", 0, 0, t0)));
        sampler.sample_throughput(Some(snap("eth0", 0, 1024, t0 + Duration::from_secs(1))));

        sampler.set_interface(Some("wlan0".to_string()));
        assert_eq!(sampler.selected_interface(), Some("wlan0"));
        assert_eq!(
            sampler.sample_throughput(Some(snap("wlan0", 7, 7, t0 + Duration::from_secs(2)))),
            ThroughputSample::Baseline
        );
    }

    #[test]
    fn test_source_maps_read_errors_to_unavailable() {
        let counters = ScriptedCounters::new(vec![
            Ok(Some((0, 0))),
            Ok(Some((100, 2048))),
            Err(CounterError::Read {
                interface: "eth0".to_string(),
                reason: "permission denied".to_string(),
            }),
            Ok(None),
            Ok(Some((100, 4096))),
        ]);
        let mut source = NetworkSource::new(Box::new(counters));
        assert_eq!(source.select_default_interface(), Some("eth0".to_string()));

        assert_eq!(source.sample(), ThroughputSample::Baseline);
        assert_eq!(source.get_text("download_text"), "↓ 0.0 KB/s");

        assert!(source.update().is_ok());
        assert_eq!(source.get_text("status"), "rate");
        assert_eq!(source.get_text("download_text"), "↓ 2.0 KB/s");
        assert_eq!(source.get_text("upload_text"), "↑ 100.0 B/s");

        assert_eq!(source.sample(), ThroughputSample::Unavailable);
        assert_eq!(source.get_text("download_text"), "↓ N/A");
        assert_eq!(source.sample(), ThroughputSample::Unavailable);

        // Recovered: the delta spans the outage (3 seconds)
        let recovered = source.sample();
        assert_eq!(rate_of(recovered).download_bytes_per_sec, 2048.0 / 3.0);
    }

    #[test]
    fn test_polling_interval_does_not_touch_sampling() {
        let mut source = NetworkSource::new(Box::new(ScriptedCounters::new(vec![
            Ok(Some((0, 0))),
            Ok(Some((0, 1024))),
        ])));
        source.set_interface(Some("eth0".to_string()));
        source.sample();

        assert_eq!(source.set_polling_interval(2500), 2500);
        assert_eq!(source.update_interval(), Duration::from_millis(2500));
        assert_eq!(source.set_polling_interval(5), MIN_POLL_INTERVAL_MS);

        assert_eq!(rate_of(source.sample()).download_bytes_per_sec, 1024.0);
    }

    #[test]
    fn test_configure_typed_switches_interface() {
        let mut source = NetworkSource::new(Box::new(ScriptedCounters::new(vec![])));
        assert_eq!(source.get_text("download_text"), "↓ --");

        let config = SourceConfig::Network(NetworkSourceConfig {
            interface: Some("eth0".to_string()),
            update_interval_ms: 3000,
        });
        source.configure_typed(&config).unwrap();
        assert_eq!(source.get_text("interface_name"), "eth0");
        assert_eq!(source.get_typed_config(), Some(config));
    }
}
