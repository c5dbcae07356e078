//! Configuration loading and parsing.
//!
//! Settings are read from a TOML file; every field has a default so a
//! partial (or absent) file still yields a runnable simulation.

use serde::Deserialize;

use crate::bpu::PolicyKind;

const CYCLE_LIMIT: u64 = 10;
const PORT_LATENCY: u64 = 1;
const PORT_BANDWIDTH: u32 = 1;
const PORT_FANOUT: u32 = 1;
const DATA_LIMIT: i64 = 5;

const BPU_SIZE_IN_ENTRIES: u32 = 128;
const BPU_WAYS: u32 = 16;
const BPU_ADDRESS_BITS: u32 = 32;

/// Top-level simulator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ports: PortsConfig,
    #[serde(default)]
    pub predictor: PredictorConfig,
}

/// General run settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Hard bound on the number of cycles the driver advances.
    #[serde(default = "default_cycle_limit")]
    pub cycle_limit: u64,

    /// Print a per-cycle trace of port reads to stderr.
    #[serde(default)]
    pub trace_cycles: bool,
}

/// Channel parameters for the demo pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct PortsConfig {
    #[serde(default = "default_latency")]
    pub latency: u64,

    #[serde(default = "default_bandwidth")]
    pub bandwidth: u32,

    #[serde(default = "default_fanout")]
    pub fanout: u32,

    /// Largest value unit A forwards before asserting stop.
    #[serde(default = "default_data_limit")]
    pub data_limit: i64,
}

/// Branch prediction unit parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictorConfig {
    #[serde(default = "default_policy")]
    pub policy: PolicyKind,

    #[serde(default = "default_size_in_entries")]
    pub size_in_entries: u32,

    #[serde(default = "default_ways")]
    pub ways: u32,

    #[serde(default = "default_address_bits")]
    pub address_bits: u32,
}

impl Config {
    /// Reads and parses a TOML configuration file.
    pub fn load(path: &str) -> Result<Config, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config '{path}': {e}"))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config '{path}': {e}"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            ports: PortsConfig::default(),
            predictor: PredictorConfig::default(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cycle_limit: CYCLE_LIMIT,
            trace_cycles: false,
        }
    }
}

impl Default for PortsConfig {
    fn default() -> Self {
        Self {
            latency: PORT_LATENCY,
            bandwidth: PORT_BANDWIDTH,
            fanout: PORT_FANOUT,
            data_limit: DATA_LIMIT,
        }
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            size_in_entries: BPU_SIZE_IN_ENTRIES,
            ways: BPU_WAYS,
            address_bits: BPU_ADDRESS_BITS,
        }
    }
}

fn default_cycle_limit() -> u64 {
    CYCLE_LIMIT
}

fn default_latency() -> u64 {
    PORT_LATENCY
}

fn default_bandwidth() -> u32 {
    PORT_BANDWIDTH
}

fn default_fanout() -> u32 {
    PORT_FANOUT
}

fn default_data_limit() -> i64 {
    DATA_LIMIT
}

fn default_policy() -> PolicyKind {
    PolicyKind::DynamicTwoBit
}

fn default_size_in_entries() -> u32 {
    BPU_SIZE_IN_ENTRIES
}

fn default_ways() -> u32 {
    BPU_WAYS
}

fn default_address_bits() -> u32 {
    BPU_ADDRESS_BITS
}
