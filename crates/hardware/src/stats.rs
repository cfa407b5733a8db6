//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the simulator:
//! 1. **Cycle and CPI:** Total cycles, retired instructions, derived CPI.
//! 2. **Branch prediction:** Resolutions, mispredictions, and accuracy.
//! 3. **Stalls:** Memory back-pressure and load-use stall cycles.
//! 4. **Caches:** Access and miss counts for both sides.

/// Simulation statistics structure tracking all performance metrics.
#[derive(Debug, Clone, Default)]
pub struct SimStats {
    /// Total simulated cycles.
    pub cycles: u64,
    /// Number of instructions that left the Memory stage.
    pub instructions_retired: u64,

    /// Conditional branches resolved in Execute.
    pub branch_predictions: u64,
    /// Resolutions that disagreed with the fetch-time prediction.
    pub branch_mispredictions: u64,

    /// Cycles lost to memory back-pressure (either side).
    pub stalls_mem: u64,
    /// Cycles lost to load-use bubbles.
    pub stalls_data: u64,

    /// Instruction-cache accesses.
    pub icache_accesses: u64,
    /// Instruction-cache misses.
    pub icache_misses: u64,
    /// Data-cache accesses.
    pub dcache_accesses: u64,
    /// Data-cache misses.
    pub dcache_misses: u64,
}

impl SimStats {
    /// Prints a summary report to stderr.
    pub fn print(&self) {
        eprintln!("Simulation statistics");
        eprintln!("  cycles:                {}", self.cycles);
        eprintln!("  instructions retired:  {}", self.instructions_retired);
        if self.instructions_retired > 0 {
            eprintln!(
                "  CPI:                   {:.3}",
                self.cycles as f64 / self.instructions_retired as f64
            );
        }
        eprintln!("  load-use stalls:       {}", self.stalls_data);
        eprintln!("  memory stalls:         {}", self.stalls_mem);
        if self.branch_predictions > 0 {
            eprintln!(
                "  branches:              {} ({} mispredicted, {:.2}% accuracy)",
                self.branch_predictions,
                self.branch_mispredictions,
                100.0 * (self.branch_predictions - self.branch_mispredictions) as f64
                    / self.branch_predictions as f64
            );
        }
        if self.icache_accesses > 0 {
            eprintln!(
                "  I-cache:               {} accesses, {} misses ({:.2}% miss)",
                self.icache_accesses,
                self.icache_misses,
                100.0 * self.icache_misses as f64 / self.icache_accesses as f64
            );
        }
        if self.dcache_accesses > 0 {
            eprintln!(
                "  D-cache:               {} accesses, {} misses ({:.2}% miss)",
                self.dcache_accesses,
                self.dcache_misses,
                100.0 * self.dcache_misses as f64 / self.dcache_accesses as f64
            );
        }
    }
}
