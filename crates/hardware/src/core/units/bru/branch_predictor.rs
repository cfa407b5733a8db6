//! Direction-predictor contract.
//!
//! Predictors see every conditional branch twice: once speculatively at fetch
//! (`predict`) and once architecturally at resolution (`update`). A fetched
//! branch that is squashed before resolving is withdrawn with `undo` instead.
//! A predictor must therefore tolerate more `predict` calls than `update`
//! calls; the difference is bounded by the pipeline depth.

/// Contract implemented by every branch direction predictor.
pub trait DirectionPredictor {
    /// Predicts whether the branch at `pc` is taken.
    ///
    /// Deterministic in the predictor state; does not change the outcome of
    /// later predictions for the same PC within the same cycle. May record
    /// per-prediction bookkeeping consumed by `update` or `undo`.
    fn predict(&mut self, pc: u32) -> bool;

    /// Trains the predictor with the architectural outcome of a branch.
    ///
    /// Called exactly once per retired branch, in program order.
    fn update(&mut self, pc: u32, taken: bool);

    /// Withdraws the most recent prediction that has not been retired.
    ///
    /// Called when the corresponding fetch is squashed.
    fn undo(&mut self);
}
