//! Evaluation matches between two fixed models.

use crate::board::{Board, Color, GameOver};
use crate::model::LinearModel;
use crate::player::SearchAgent;
use crate::search::minimax::{SearchParams, TieBreak};
use anyhow::{Context, Result};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchParams {
    pub games: usize,
    pub max_turns: usize,
    pub search: SearchParams,
    pub seed: u64,
    pub positional: bool,
}

impl Default for MatchParams {
    fn default() -> Self {
        // Without some randomness every game of a match is the same game.
        let search = SearchParams { depth: 1, epsilon: 0.05, tie_break: TieBreak::Random };
        Self { games: 20, max_turns: 1000, search, seed: 7, positional: false }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub games: usize,
    pub black_wins: usize,
    pub white_wins: usize,
    pub ties: usize,
}

impl MatchSummary {
    fn add(mut self, outcome: GameOver) -> Self {
        self.games += 1;
        match outcome.winner() {
            Some(Color::Black) => self.black_wins += 1,
            Some(Color::White) => self.white_wins += 1,
            None => self.ties += 1,
        }
        self
    }

    pub fn black_score(&self) -> f64 {
        if self.games == 0 { return 0.0; }
        (self.black_wins as f64 + 0.5 * self.ties as f64) / self.games as f64
    }
}

/// Plays one game to the end or to `max_turns` (a tie). Returns the outcome and
/// the number of turns taken.
pub fn play_game(black: &mut SearchAgent, white: &mut SearchAgent, max_turns: usize) -> Result<(GameOver, usize)> {
    let mut board = Board::new();
    let mut turns = 0usize;
    while !board.check_no_moves() {
        if turns >= max_turns { board.declare_tie(); break; }
        turns += 1;
        let mover = board.player_in_turn();
        let agent = if mover == Color::Black { &mut *black } else { &mut *white };
        let Some(mv) = agent.search(&mut board).best else { break };
        board.update(&mv).with_context(|| format!("{} played {}", mover, mv))?;
    }
    Ok((board.game_over(), turns))
}

/// Game `i` seeds its agents from `seed` and `i` alone, so the summary does not
/// depend on the thread count.
pub fn play_match(black_model: &LinearModel, white_model: &LinearModel, params: &MatchParams) -> Result<MatchSummary> {
    let outcomes: Vec<GameOver> = (0..params.games).into_par_iter().map(|i| {
        let s = params.seed.wrapping_add((i as u64).wrapping_mul(2));
        let mut black = SearchAgent::new(Color::Black, black_model.clone(), params.search, s, params.positional);
        let mut white = SearchAgent::new(Color::White, white_model.clone(), params.search, s.wrapping_add(1), params.positional);
        let (outcome, turns) = play_game(&mut black, &mut white, params.max_turns)?;
        debug!("game {}: {:?} after {} turns", i, outcome, turns);
        Ok::<_, anyhow::Error>(outcome)
    }).collect::<Result<_>>()?;
    let summary = outcomes.into_iter().fold(MatchSummary::default(), MatchSummary::add);
    info!("match: {} games, black {} white {} ties {}", summary.games, summary.black_wins, summary.white_wins, summary.ties);
    Ok(summary)
}
