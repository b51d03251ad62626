use crate::board::{Board, Color, Move};
use crate::search::eval::{Evaluator, LOSS_SCORE, WIN_SCORE};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Earliest generated move among equal scores.
    #[default]
    First,
    /// Uniform choice among equal scores.
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Turns of lookahead; capture chains do not count. Values below 1 act as 1.
    pub depth: u32,
    /// Probability of playing a uniformly random legal move instead of searching.
    pub epsilon: f64,
    pub tie_break: TieBreak,
}

impl Default for SearchParams {
    fn default() -> Self { Self { depth: 1, epsilon: 0.0, tie_break: TieBreak::First } }
}

#[derive(Default, Debug, Clone)]
pub struct SearchResult {
    pub best: Option<Move>,
    pub score: f64,
    /// Features of the principal-variation leaf.
    pub features: Vec<f64>,
    pub nodes: u64,
    /// The move was an exploration draw, not a search result.
    pub explored: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Max,
    Min,
}

impl Role {
    fn flip(self) -> Role {
        match self { Role::Max => Role::Min, Role::Min => Role::Max }
    }

    fn prefers(self, score: f64, best: f64) -> bool {
        match self { Role::Max => score > best, Role::Min => score < best }
    }
}

#[derive(Debug, Default)]
pub struct Searcher {
    params: SearchParams,
    nodes: u64,
}

impl Searcher {
    pub fn new(params: SearchParams) -> Self { Self { params, nodes: 0 } }

    /// Picks a move for `color`, or none if it has no legal move. The board is
    /// left exactly as it was given.
    pub fn make_move<R: Rng + ?Sized>(&mut self, board: &mut Board, color: Color, eval: &Evaluator<'_>, rng: &mut R) -> SearchResult {
        debug_assert_eq!(eval.perspective(), color);
        self.nodes = 0;
        let moves = board.playable_moves(color);
        if moves.is_empty() { return SearchResult::default(); }

        if self.params.epsilon > 0.0 && rng.gen::<f64>() < self.params.epsilon {
            let mv = moves[rng.gen_range(0..moves.len())];
            let (score, features) = board.explore(&mv, |b| eval.leaf(b));
            return SearchResult { best: Some(mv), score, features, nodes: 1, explored: true };
        }

        let mut best: Vec<(Move, f64, Vec<f64>)> = Vec::new();
        for mv in &moves {
            let (score, features) = self.minimax(board, mv, color, Role::Max, 0, eval);
            let top = best.first().map(|b| b.1);
            match top {
                Some(t) if score < t => {}
                Some(t) if score == t => best.push((*mv, score, features)),
                _ => best = vec![(*mv, score, features)],
            }
        }
        let pick = match self.params.tie_break {
            TieBreak::Random if best.len() > 1 => rng.gen_range(0..best.len()),
            _ => 0,
        };
        let (mv, score, features) = best.swap_remove(pick);
        debug!("{} searched {} root moves, {} nodes, best {} ({:.4})", color, moves.len(), self.nodes, mv, score);
        SearchResult { best: Some(mv), score, features, nodes: self.nodes, explored: false }
    }

    /// Value of `mv` played by `mover`, whose role is `role`. Turns pass (and
    /// `ply` grows) only when no capture chain continues.
    fn minimax(&mut self, board: &mut Board, mv: &Move, mover: Color, role: Role, ply: u32, eval: &Evaluator<'_>) -> (f64, Vec<f64>) {
        self.nodes += 1;
        let depth = self.params.depth.max(1);
        board.explore(mv, |board| {
            let turn = board.next_turn(mover, mv);
            let (role, ply) = if turn.continued { (role, ply) } else { (role.flip(), ply + 1) };

            // Side to move is stuck: it loses.
            if turn.moves.is_empty() {
                let score = if turn.color == eval.perspective() { LOSS_SCORE } else { WIN_SCORE };
                return (score, eval.features(board));
            }
            if ply >= depth { return eval.leaf(board); }

            let mut best: Option<(f64, Vec<f64>)> = None;
            for next in &turn.moves {
                let (score, features) = self.minimax(board, next, turn.color, role, ply, eval);
                let take = match &best { None => true, Some((b, _)) => role.prefers(score, *b) };
                if take { best = Some((score, features)); }
            }
            match best { Some(b) => b, None => eval.leaf(board) }
        })
    }
}
