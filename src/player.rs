use crate::board::{Board, Color, Move};
use crate::features::FeatureSet;
use crate::model::{Hyperparams, LinearModel};
use crate::protocol::{Command, Reply};
use crate::search::eval::Evaluator;
use crate::search::minimax::{SearchParams, SearchResult, Searcher};
use anyhow::{bail, Context, Result};
use log::warn;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// The two kinds of participant a game driver deals with.
pub enum Player {
    Human(HumanInput),
    Agent(SearchAgent),
}

impl Player {
    pub fn color(&self) -> Color {
        match self { Player::Human(h) => h.color, Player::Agent(a) => a.color }
    }

    /// Next move for this player's color, or none when it cannot move.
    pub fn choose_move(&mut self, board: &mut Board) -> Result<Option<Move>> {
        match self {
            Player::Human(h) => h.choose_move(board),
            Player::Agent(a) => Ok(a.search(board).best),
        }
    }

    pub fn as_agent(&self) -> Option<&SearchAgent> {
        match self { Player::Agent(a) => Some(a), Player::Human(_) => None }
    }
}

/// A person at the display process: asks with `get_move`, reads `SELECTED_MOVE`.
pub struct HumanInput {
    color: Color,
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
}

impl HumanInput {
    pub fn new(color: Color, input: Box<dyn BufRead + Send>, output: Box<dyn Write + Send>) -> Self {
        Self { color, input, output }
    }

    pub fn stdio(color: Color) -> Self {
        // Stdin is already buffered and shared with the other readers of the process.
        let input = std::io::BufReader::with_capacity(1, std::io::stdin());
        Self::new(color, Box::new(input), Box::new(std::io::stdout()))
    }

    pub fn color(&self) -> Color { self.color }

    /// The returned move carries no flags; `Board::update` resolves them.
    pub fn choose_move(&mut self, board: &mut Board) -> Result<Option<Move>> {
        if board.playable_moves(self.color).is_empty() { return Ok(None); }
        writeln!(self.output, "{}", Command::GetMove(self.color)).context("write get_move")?;
        self.output.flush()?;
        let mut line = String::new();
        loop {
            line.clear();
            if self.input.read_line(&mut line).context("read move reply")? == 0 { bail!("move input closed"); }
            if line.trim().is_empty() { continue; }
            match line.parse::<Reply>() {
                Ok(Reply::SelectedMove(mv)) => return Ok(Some(mv)),
                Ok(other) => warn!("ignoring {:?} while waiting for a move", other),
                Err(e) => warn!("{}", e),
            }
        }
    }
}

/// Plays by minimax over its own linear value function.
pub struct SearchAgent {
    color: Color,
    features: FeatureSet,
    model: LinearModel,
    searcher: Searcher,
    rng: SmallRng,
    model_path: Option<PathBuf>,
}

impl SearchAgent {
    pub fn new(color: Color, model: LinearModel, params: SearchParams, seed: u64, positional: bool) -> Self {
        let features = FeatureSet::new(color, positional);
        debug_assert_eq!(features.len(), model.feature_count());
        Self { color, features, model, searcher: Searcher::new(params), rng: SmallRng::seed_from_u64(seed), model_path: None }
    }

    /// Fresh zero model for this color's feature set.
    pub fn fresh(color: Color, hyper: Hyperparams, params: SearchParams, seed: u64, positional: bool) -> Self {
        let n = FeatureSet::new(color, positional).len();
        Self::new(color, LinearModel::new(n, hyper), params, seed, positional)
    }

    /// Model from `path` (fresh if missing or unreadable); saves go back to `path`.
    pub fn from_file<P: AsRef<Path>>(color: Color, path: P, hyper: Hyperparams, params: SearchParams, seed: u64, positional: bool) -> Self {
        let n = FeatureSet::new(color, positional).len();
        let model = LinearModel::load_or_fresh(path.as_ref(), n, hyper);
        let mut agent = Self::new(color, model, params, seed, positional);
        agent.model_path = Some(path.as_ref().to_path_buf());
        agent
    }

    pub fn color(&self) -> Color { self.color }

    pub fn features(&self) -> &FeatureSet { &self.features }

    pub fn model(&self) -> &LinearModel { &self.model }

    pub fn model_mut(&mut self) -> &mut LinearModel { &mut self.model }

    pub fn model_path(&self) -> Option<&Path> { self.model_path.as_deref() }

    pub fn compute_features(&self, board: &Board) -> Vec<f64> { self.features.compute(board) }

    pub fn evaluate(&self, board: &Board) -> f64 { self.model.evaluate(&self.features.compute(board)) }

    pub fn search(&mut self, board: &mut Board) -> SearchResult {
        let eval = Evaluator::new(&self.features, &self.model);
        self.searcher.make_move(board, self.color, &eval, &mut self.rng)
    }

    /// Writes the model to its path; a no-op for agents without one.
    pub fn save_model(&self) -> Result<()> {
        match &self.model_path {
            Some(p) => self.model.save(p),
            None => Ok(()),
        }
    }
}
