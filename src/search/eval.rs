use crate::board::{Board, Color};
use crate::features::{FeatureSet, ENEMY_PIECES, OWN_PIECES};
use crate::model::LinearModel;

// Outcome scores, from the evaluating side's perspective.
pub const WIN_SCORE: f64 = 1.0;
pub const LOSS_SCORE: f64 = -1.0;
pub const TIE_SCORE: f64 = 0.0;

/// Outcome score for a feature vector whose piece counts show a decided game.
pub fn terminal_score(features: &[f64]) -> Option<f64> {
    if features.get(OWN_PIECES) == Some(&0.0) { return Some(LOSS_SCORE); }
    if features.get(ENEMY_PIECES) == Some(&0.0) { return Some(WIN_SCORE); }
    None
}

/// Leaf evaluation used by the searcher: one color's features fed to its model.
pub struct Evaluator<'a> {
    features: &'a FeatureSet,
    model: &'a LinearModel,
}

impl<'a> Evaluator<'a> {
    pub fn new(features: &'a FeatureSet, model: &'a LinearModel) -> Self {
        debug_assert_eq!(features.len(), model.feature_count());
        Self { features, model }
    }

    pub fn perspective(&self) -> Color { self.features.perspective() }

    pub fn features(&self, board: &Board) -> Vec<f64> { self.features.compute(board) }

    pub fn leaf(&self, board: &Board) -> (f64, Vec<f64>) {
        let x = self.features.compute(board);
        (self.model.evaluate(&x), x)
    }
}
