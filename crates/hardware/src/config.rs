//! Configuration system for the simulator.
//!
//! This module defines all configuration structures and enums used to
//! parameterize the simulator. It provides:
//! 1. **Defaults:** Baseline hardware constants (DRAM, caches, predictors).
//! 2. **Structures:** Hierarchical config for general, memory, and pipeline.
//! 3. **Enums:** Branch predictor selection.
//!
//! Configuration is supplied as JSON (`--config`) or use `Config::default()`.

use serde::Deserialize;

use crate::common::constants::DRAM_SIZE;

/// Default configuration constants for the simulator.
mod defaults {
    /// Saturating-counter predictor table entries.
    pub const BIT_COUNTER_ENTRIES: usize = 4;

    /// Saturating-counter width in bits.
    pub const BIT_COUNTER_BITS: u32 = 2;

    /// Perceptron global history length.
    pub const PERCEPTRON_HISTORY: usize = 16;

    /// Perceptron weight width in bits.
    pub const PERCEPTRON_BITS: u32 = 8;

    /// Perceptron table entries.
    pub const PERCEPTRON_ENTRIES: usize = 16;

    /// Perceptron training threshold on the dot-product magnitude.
    pub const PERCEPTRON_THRESHOLD: i32 = 44;

    /// Perceptron weight step per training event.
    pub const PERCEPTRON_LEARNING_RATE: i32 = 1;
}

/// Branch prediction algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum BranchPredictor {
    /// Table of saturating bit counters (default).
    #[default]
    BitCounter,
    /// Perceptron predictor with global history.
    Perceptron,
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use rv32_core::config::Config;
///
/// let config = Config::default();
/// assert!(config.memory.icache);
/// assert_eq!(config.pipeline.bit_counter.entries, 4);
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use rv32_core::config::{BranchPredictor, Config};
///
/// let json = r#"{
///     "general": { "trace_instructions": true },
///     "memory": { "icache": false, "dcache": false },
///     "pipeline": {
///         "branch_predictor": "Perceptron",
///         "perceptron": { "history": 8, "entries": 32 }
///     }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert!(config.general.trace_instructions);
/// assert!(!config.memory.dcache);
/// assert_eq!(config.pipeline.branch_predictor, BranchPredictor::Perceptron);
/// assert_eq!(config.pipeline.perceptron.history, 8);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Memory system configuration.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Pipeline and branch predictor configuration.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// General simulation settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralConfig {
    /// Echo the per-cycle trace to stderr in addition to the trace file.
    #[serde(default)]
    pub trace_instructions: bool,
}

/// Memory system configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// DRAM size in bytes (rounded up to a power of two).
    #[serde(default = "MemoryConfig::default_dram_size")]
    pub dram_size: usize,

    /// Put the instruction side behind a cache.
    #[serde(default = "MemoryConfig::default_cache_enabled")]
    pub icache: bool,

    /// Put the data side behind a cache.
    #[serde(default = "MemoryConfig::default_cache_enabled")]
    pub dcache: bool,
}

impl MemoryConfig {
    /// Returns the default DRAM size in bytes.
    fn default_dram_size() -> usize {
        DRAM_SIZE
    }

    /// Caches are part of the modelled machine; enabled unless turned off.
    fn default_cache_enabled() -> bool {
        true
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            dram_size: DRAM_SIZE,
            icache: true,
            dcache: true,
        }
    }
}

/// Pipeline and branch predictor configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    /// Branch predictor type.
    #[serde(default)]
    pub branch_predictor: BranchPredictor,

    /// Bit-counter predictor configuration.
    #[serde(default)]
    pub bit_counter: BitCounterConfig,

    /// Perceptron predictor configuration.
    #[serde(default)]
    pub perceptron: PerceptronConfig,
}

/// Saturating bit-counter predictor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BitCounterConfig {
    /// Table entries (rounded up to a power of two).
    #[serde(default = "BitCounterConfig::default_entries")]
    pub entries: usize,

    /// Counter width in bits.
    #[serde(default = "BitCounterConfig::default_bits")]
    pub bits: u32,
}

impl BitCounterConfig {
    /// Returns the default table entry count.
    fn default_entries() -> usize {
        defaults::BIT_COUNTER_ENTRIES
    }

    /// Returns the default counter width.
    fn default_bits() -> u32 {
        defaults::BIT_COUNTER_BITS
    }
}

impl Default for BitCounterConfig {
    fn default() -> Self {
        Self {
            entries: defaults::BIT_COUNTER_ENTRIES,
            bits: defaults::BIT_COUNTER_BITS,
        }
    }
}

/// Perceptron predictor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PerceptronConfig {
    /// Global history length.
    #[serde(default = "PerceptronConfig::default_history")]
    pub history: usize,

    /// Weight width in bits.
    #[serde(default = "PerceptronConfig::default_bits")]
    pub bits: u32,

    /// Table entries (rounded up to a power of two).
    #[serde(default = "PerceptronConfig::default_entries")]
    pub entries: usize,

    /// Training threshold on the dot-product magnitude.
    #[serde(default = "PerceptronConfig::default_threshold")]
    pub threshold: i32,

    /// Weight step per training event.
    #[serde(default = "PerceptronConfig::default_learning_rate")]
    pub learning_rate: i32,
}

impl PerceptronConfig {
    /// Returns the default global history length.
    fn default_history() -> usize {
        defaults::PERCEPTRON_HISTORY
    }

    /// Returns the default weight width.
    fn default_bits() -> u32 {
        defaults::PERCEPTRON_BITS
    }

    /// Returns the default table entry count.
    fn default_entries() -> usize {
        defaults::PERCEPTRON_ENTRIES
    }

    /// Returns the default training threshold.
    fn default_threshold() -> i32 {
        defaults::PERCEPTRON_THRESHOLD
    }

    /// Returns the default learning rate.
    fn default_learning_rate() -> i32 {
        defaults::PERCEPTRON_LEARNING_RATE
    }
}

impl Default for PerceptronConfig {
    fn default() -> Self {
        Self {
            history: defaults::PERCEPTRON_HISTORY,
            bits: defaults::PERCEPTRON_BITS,
            entries: defaults::PERCEPTRON_ENTRIES,
            threshold: defaults::PERCEPTRON_THRESHOLD,
            learning_rate: defaults::PERCEPTRON_LEARNING_RATE,
        }
    }
}
