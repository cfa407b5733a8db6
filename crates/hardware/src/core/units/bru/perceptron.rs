//! Perceptron branch predictor.
//!
//! A table of weight vectors instead of saturating counters: the prediction
//! is the sign of the dot product of the weights with a ±1 encoding of the
//! global history, plus a bias. Training only happens on a misprediction or
//! when the confidence (the magnitude of the dot product) falls below a
//! threshold, and weights saturate into a fixed signed range.

use std::collections::VecDeque;

use super::DirectionPredictor;
use crate::config::PerceptronConfig;

/// Perceptron predictor state.
#[derive(Debug)]
pub struct PerceptronPredictor {
    /// Flattened weight table; each row is `history + 1` weights, bias last.
    weights: Vec<i32>,
    /// Global history of branch outcomes, oldest first.
    history: Vec<bool>,
    /// Row length (`history.len() + 1`).
    row_size: usize,
    /// Index mask over the raw PC.
    index_mask: u32,
    /// Training threshold on the dot-product magnitude.
    threshold: i32,
    /// Weight step per training event.
    learning_rate: i32,
    /// Inclusive weight saturation bounds.
    weight_min: i32,
    weight_max: i32,
    /// Per-prediction captures `(|dp|, prediction)`, oldest first.
    ///
    /// `update` consumes from the front in program order; `undo` discards
    /// from the back. The values used for the training decision are the ones
    /// captured at prediction time, never recomputed.
    pending: VecDeque<(i32, bool)>,
}

impl PerceptronPredictor {
    /// Creates a predictor with zeroed weights and history.
    pub fn new(config: &PerceptronConfig) -> Self {
        let entries = config.entries.next_power_of_two();
        let row_size = config.history + 1;
        let weight_max = (1i32 << (config.bits - 1)) - 1;
        Self {
            weights: vec![0; entries * row_size],
            history: vec![false; config.history],
            row_size,
            index_mask: (entries - 1) as u32,
            threshold: config.threshold,
            learning_rate: config.learning_rate,
            weight_min: -(weight_max + 1),
            weight_max,
            pending: VecDeque::new(),
        }
    }

    /// Table row of `pc`, taken from its low bits.
    #[inline]
    fn index(&self, pc: u32) -> usize {
        (pc & self.index_mask) as usize
    }

    /// Dot product of the row's weights with the ±1 history, bias included.
    fn output(&self, row: usize) -> i32 {
        let base = row * self.row_size;
        let mut dp = self.weights[base + self.row_size - 1];
        for (i, &outcome) in self.history.iter().enumerate() {
            if outcome {
                dp += self.weights[base + i];
            } else {
                dp -= self.weights[base + i];
            }
        }
        dp
    }

    /// Moves one weight by the learning rate toward `agree`, saturating.
    fn adjust(&mut self, idx: usize, agree: bool) {
        let w = self.weights[idx];
        if agree {
            if w <= self.weight_max - self.learning_rate {
                self.weights[idx] = w + self.learning_rate;
            }
        } else if w >= self.weight_min + self.learning_rate {
            self.weights[idx] = w - self.learning_rate;
        }
    }

    /// Predictions currently in flight.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }
}

impl DirectionPredictor for PerceptronPredictor {
    /// Predicts taken when the dot product is non-negative.
    fn predict(&mut self, pc: u32) -> bool {
        let dp = self.output(self.index(pc));
        let taken = dp >= 0;
        self.pending.push_back((dp.abs(), taken));
        taken
    }

    /// Trains weights unless the captured prediction was confidently correct.
    fn update(&mut self, pc: u32, taken: bool) {
        let (dp_abs, predicted) = self.pending.pop_front().unwrap_or((0, true));
        if predicted == taken && dp_abs > self.threshold {
            return;
        }

        let base = self.index(pc) * self.row_size;
        self.adjust(base + self.row_size - 1, taken);
        for i in 0..self.row_size - 1 {
            let agree = self.history[i] == taken;
            self.adjust(base + i, agree);
        }

        self.history.rotate_left(1);
        let last = self.history.len() - 1;
        self.history[last] = taken;
    }

    /// Discards the newest capture; weights and history are untouched
    /// because a squashed prediction never trained them.
    fn undo(&mut self) {
        self.pending.pop_back();
    }
}
