//! Branch prediction unit implementations.
//!
//! This module contains the direction-predictor contract and its two
//! implementations: a table of saturating bit counters and a perceptron
//! predictor with global history.

pub use self::branch_predictor::DirectionPredictor;

/// Direction-predictor trait and contract documentation.
pub mod branch_predictor;

/// Saturating bit-counter predictor.
pub mod bit_counter;

/// Perceptron predictor with global branch history.
pub mod perceptron;

use self::bit_counter::BitCounterPredictor;
use self::perceptron::PerceptronPredictor;
use crate::config::{BranchPredictor as BpType, PipelineConfig};

/// Enum wrapper for static dispatch of direction predictors.
/// This avoids vtable lookups in the critical fetch loop.
#[derive(Debug)]
pub enum PredictorKind {
    BitCounter(BitCounterPredictor),
    Perceptron(PerceptronPredictor),
}

impl PredictorKind {
    /// Creates the configured predictor variant.
    pub fn new(config: &PipelineConfig) -> Self {
        match config.branch_predictor {
            BpType::BitCounter => Self::BitCounter(BitCounterPredictor::new(&config.bit_counter)),
            BpType::Perceptron => Self::Perceptron(PerceptronPredictor::new(&config.perceptron)),
        }
    }

    /// Number of predictions made but neither retired nor squashed yet.
    ///
    /// Bounded by the pipeline depth; exposed for invariant checks.
    pub fn in_flight(&self) -> usize {
        match self {
            Self::BitCounter(bp) => bp.in_flight(),
            Self::Perceptron(bp) => bp.in_flight(),
        }
    }
}

impl DirectionPredictor for PredictorKind {
    /// Predicts whether the branch at `pc` is taken.
    #[inline(always)]
    fn predict(&mut self, pc: u32) -> bool {
        match self {
            Self::BitCounter(bp) => bp.predict(pc),
            Self::Perceptron(bp) => bp.predict(pc),
        }
    }

    /// Trains the predictor with the architectural outcome of a retired branch.
    #[inline(always)]
    fn update(&mut self, pc: u32, taken: bool) {
        match self {
            Self::BitCounter(bp) => bp.update(pc, taken),
            Self::Perceptron(bp) => bp.update(pc, taken),
        }
    }

    /// Reverses the bookkeeping of the most recent unmatched prediction.
    #[inline(always)]
    fn undo(&mut self) {
        match self {
            Self::BitCounter(bp) => bp.undo(),
            Self::Perceptron(bp) => bp.undo(),
        }
    }
}
