//! Telemetry payloads sent by machine reporters.
//!
//! `StaticData` describes hardware and OS and changes rarely. `DynamicData`
//! is sampled continuously and is summarised into a `MachineSnapshot` before
//! being relayed to dashboards.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::MachineId;

/// Hardware and operating system description of a machine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticData {
    pub hostname: Option<String>,
    pub public_ip: Option<String>,
    pub kernel_version: Option<String>,
    pub os_name: Option<String>,
    pub os_arch: Option<String>,
    pub os_version: Option<String>,
    pub cpu_model: Option<String>,
    pub cpu_base_frequency: Option<u64>,
    pub cpu_cores: Option<u32>,
    pub cpu_threads: Option<u32>,
    pub total_memory: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuStats {
    /// Per-core usage in percent.
    pub usage: Vec<f32>,
    /// Per-core frequency in MHz.
    pub freq: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RamStats {
    pub total: u64,
    pub used: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkInterfaceStats {
    pub name: String,
    /// Transmit rate.
    pub tx: f32,
    /// Receive rate.
    pub rx: f32,
    pub speed: Option<f32>,
}

/// One live sample from a reporter.
///
/// Fields this service does not interpret (gpu, disks, temps, ...) are kept
/// in `extra` and passed through to dashboards untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicData {
    pub cpu: CpuStats,
    pub ram: RamStats,
    pub network: Vec<NetworkInterfaceStats>,
    pub process_count: u64,
    pub host_uptime: u64,
    pub reporter_uptime: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DynamicData {
    /// Mean usage across cores, 0 when no cores are reported.
    pub fn cpu_average_usage(&self) -> f32 {
        average(&self.cpu.usage)
    }

    pub fn cpu_average_speed(&self) -> f32 {
        average(&self.cpu.freq)
    }

    /// Sum of `(tx, rx)` over all interfaces.
    pub fn total_traffic(&self) -> (f32, f32) {
        self.network
            .iter()
            .fold((0.0, 0.0), |(tx, rx), nic| (tx + nic.tx, rx + nic.rx))
    }
}

fn average(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// A dynamic sample tagged with its machine and derived totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub uuid: MachineId,
    #[serde(flatten)]
    pub data: DynamicData,
    /// CPU average usage.
    pub cau: f32,
    /// CPU average speed.
    pub cas: f32,
    /// Total traffic up.
    pub tu: f32,
    /// Total traffic down.
    pub td: f32,
}

impl MachineSnapshot {
    pub fn summarise(uuid: MachineId, data: DynamicData) -> Self {
        let (tu, td) = data.total_traffic();
        Self {
            uuid,
            cau: data.cpu_average_usage(),
            cas: data.cpu_average_speed(),
            tu,
            td,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn averages_are_zero_without_cores() {
        let data = DynamicData::default();
        assert_eq!(data.cpu_average_usage(), 0.0);
        assert_eq!(data.cpu_average_speed(), 0.0);
    }

    #[test]
    fn averages_cover_all_cores() {
        let data = DynamicData {
            cpu: CpuStats {
                usage: vec![10.0, 30.0],
                freq: vec![2000.0, 4000.0],
            },
            ..Default::default()
        };
        assert_eq!(data.cpu_average_usage(), 20.0);
        assert_eq!(data.cpu_average_speed(), 3000.0);
    }

    #[test]
    fn total_traffic_sums_interfaces() {
        let data: DynamicData = serde_json::from_value(json!({
            "network": [
                {"name": "eth0", "tx": 1.5, "rx": 2.0},
                {"name": "wlan0", "tx": 0.5, "rx": 1.0}
            ]
        }))
        .unwrap();
        assert_eq!(data.total_traffic(), (2.0, 3.0));
    }

    #[test]
    fn unknown_fields_pass_through_to_snapshot() {
        let data: DynamicData = serde_json::from_value(json!({
            "cpu": {"usage": [50.0], "freq": [3000.0]},
            "gpu": {"brand": "acme"}
        }))
        .unwrap();
        let id = MachineId::new();
        let snapshot = serde_json::to_value(MachineSnapshot::summarise(id, data)).unwrap();

        assert_eq!(snapshot["uuid"], json!(id.to_string()));
        assert_eq!(snapshot["gpu"]["brand"], "acme");
        assert_eq!(snapshot["cau"], 50.0);
    }

    #[test]
    fn static_data_tolerates_partial_payloads() {
        let data: StaticData = serde_json::from_value(json!({"hostname": "box1"})).unwrap();
        assert_eq!(data.hostname.as_deref(), Some("box1"));
        assert!(data.cpu_cores.is_none());
    }
}
