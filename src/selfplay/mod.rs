use crate::board::{Board, Color, GameOver};
use crate::model::{Hyperparams, Transition};
use crate::player::SearchAgent;
use crate::records::{append_records, RecordBuffer};
use crate::search::eval::{LOSS_SCORE, TIE_SCORE, WIN_SCORE};
use crate::search::minimax::SearchParams;
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const OPPONENT_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Learning {
    /// One SGD pass over the episode's records after the game.
    #[default]
    Batch,
    /// A TD(lambda) step after every trainee turn.
    TdLambda,
    /// Play and record only.
    Off,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfPlayParams {
    pub games: usize,
    /// A game reaching this many turns is a tie.
    pub max_turns: usize,
    pub depth: u32,
    pub epsilon: f64,
    pub seed: u64,
    pub learning: Learning,
    pub hyper: Hyperparams,
    pub positional: bool,
    /// Copy the trainee's coefficients to the opponent every N cycles (0 = never).
    pub refresh: usize,
    pub trainee_model: Option<PathBuf>,
    pub opponent_model: Option<PathBuf>,
    pub records_dir: Option<PathBuf>,
}

impl Default for SelfPlayParams {
    fn default() -> Self {
        Self {
            games: 100,
            max_turns: 1000,
            depth: 1,
            epsilon: 0.1,
            seed: 42,
            learning: Learning::Batch,
            hyper: Hyperparams::default(),
            positional: false,
            refresh: 0,
            trainee_model: None,
            opponent_model: None,
            records_dir: None,
        }
    }
}

impl SelfPlayParams {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse config: {}", path.display()))
    }

    fn search(&self) -> SearchParams { SearchParams { depth: self.depth, epsilon: self.epsilon, ..SearchParams::default() } }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrainingSummary {
    pub cycles: usize,
    pub trainee_wins: usize,
    pub opponent_wins: usize,
    pub ties: usize,
    pub total_turns: usize,
}

impl TrainingSummary {
    fn record(&mut self, outcome: GameOver, trainee: Color, turns: usize) {
        self.cycles += 1;
        self.total_turns += turns;
        match outcome.winner() {
            Some(c) if c == trainee => self.trainee_wins += 1,
            Some(_) => self.opponent_wins += 1,
            None => self.ties += 1,
        }
    }

    pub fn win_rate(&self) -> f64 { if self.cycles == 0 { 0.0 } else { self.trainee_wins as f64 / self.cycles as f64 } }

    pub fn average_turns(&self) -> f64 { if self.cycles == 0 { 0.0 } else { self.total_turns as f64 / self.cycles as f64 } }
}

#[derive(Clone, Debug)]
pub struct EpisodeResult {
    pub outcome: GameOver,
    pub turns: usize,
    pub records: RecordBuffer,
}

/// Outcome score for `color`.
pub fn outcome_score(outcome: GameOver, color: Color) -> f64 {
    match outcome.winner() {
        Some(c) if c == color => WIN_SCORE,
        Some(_) => LOSS_SCORE,
        None => TIE_SCORE,
    }
}

/// Trainee (black) against an opponent (white), learning from its own games.
pub struct Trainer {
    params: SelfPlayParams,
    trainee: SearchAgent,
    opponent: SearchAgent,
    summary: TrainingSummary,
}

impl Trainer {
    pub fn new(params: SelfPlayParams) -> Self {
        let search = params.search();
        let agent = |color: Color, path: &Option<PathBuf>, seed: u64| {
            let mut a = match path {
                Some(p) => SearchAgent::from_file(color, p, params.hyper, search, seed, params.positional),
                None => SearchAgent::fresh(color, params.hyper, search, seed, params.positional),
            };
            let h = params.hyper;
            a.model_mut().retune(h.learning_rate, h.regularization, h.lambda);
            a
        };
        let trainee = agent(Color::Black, &params.trainee_model, params.seed);
        let opponent = agent(Color::White, &params.opponent_model, params.seed ^ OPPONENT_SEED_SALT);
        Self::with_agents(params, trainee, opponent)
    }

    pub fn with_agents(params: SelfPlayParams, trainee: SearchAgent, opponent: SearchAgent) -> Self {
        debug_assert_ne!(trainee.color(), opponent.color());
        Self { params, trainee, opponent, summary: TrainingSummary::default() }
    }

    pub fn trainee(&self) -> &SearchAgent { &self.trainee }

    pub fn opponent(&self) -> &SearchAgent { &self.opponent }

    pub fn summary(&self) -> &TrainingSummary { &self.summary }

    /// Plays one game. A record pairs the trainee's position after its turn with
    /// its evaluation once the turn comes back; the last trainee position gets the
    /// game outcome instead.
    pub fn play_episode(&mut self) -> Result<EpisodeResult> {
        let me = self.trainee.color();
        let td = self.params.learning == Learning::TdLambda;
        let mut board = Board::new();
        let mut records = RecordBuffer::new(self.trainee.features().len());
        let mut held: Option<Vec<f64>> = None;
        let mut last: Option<Transition> = None;
        let mut turns = 0usize;
        self.trainee.model_mut().reset();

        loop {
            if board.check_no_moves() { break; }
            if turns >= self.params.max_turns { board.declare_tie(); break; }
            turns += 1;
            let mover = board.player_in_turn();
            let agent = if mover == me { &mut self.trainee } else { &mut self.opponent };
            let Some(mv) = agent.search(&mut board).best else { break };
            board.update(&mv).with_context(|| format!("{} played {}", mover, mv))?;
            if board.game_over().is_over() { break; }

            let to_move = board.player_in_turn();
            if mover == me && to_move != me {
                let x = self.trainee.compute_features(&board);
                if td {
                    let next = Transition { score: self.trainee.model().evaluate(&x), features: x.clone() };
                    self.trainee.model_mut().td_lambda(last.as_ref(), &next)?;
                    last = Some(next);
                }
                held = Some(x);
            } else if mover != me && to_move == me {
                if let Some(x) = held.take() {
                    let target = self.trainee.evaluate(&board);
                    records.push(x, target)?;
                }
            }
        }

        let outcome = board.game_over();
        let target = outcome_score(outcome, me);
        if let Some(x) = held.take().or_else(|| records.pop().map(|r| r.features)) {
            if td {
                let terminal = Transition { score: target, features: x.clone() };
                self.trainee.model_mut().td_lambda(last.as_ref(), &terminal)?;
            }
            records.push(x, target)?;
        }
        Ok(EpisodeResult { outcome, turns, records })
    }

    /// One game plus learning, record output, opponent refresh and model save.
    pub fn run_cycle(&mut self, cycle: usize) -> Result<EpisodeResult> {
        let episode = self.play_episode()?;
        if self.params.learning == Learning::Batch {
            let (xs, ys) = episode.records.to_batch();
            self.trainee.model_mut().partial_fit(&xs, &ys)?;
        }
        self.summary.record(episode.outcome, self.trainee.color(), episode.turns);

        if let Some(dir) = &self.params.records_dir {
            append_records(episode.records.records(), dir.join(format!("match_data{}.csv", cycle)))?;
        }
        if self.params.refresh > 0 && cycle % self.params.refresh == 0 {
            let coefs = self.trainee.model().coefficients().to_vec();
            self.opponent.model_mut().set_coefficients(&coefs).context("refresh opponent")?;
            self.opponent.save_model()?;
            info!("Opponent refreshed with trainee parameters at cycle {}", cycle);
        }
        self.trainee.save_model()?;
        self.log_cycle(cycle, &episode);
        Ok(episode)
    }

    pub fn run<F: FnMut(&TrainingSummary)>(&mut self, mut on_cycle: F) -> Result<TrainingSummary> {
        for cycle in 1..=self.params.games {
            self.run_cycle(cycle)?;
            on_cycle(&self.summary);
        }
        info!("Final trainee win rate: {:.2}%", 100.0 * self.summary.win_rate());
        Ok(self.summary.clone())
    }

    fn log_cycle(&self, cycle: usize, episode: &EpisodeResult) {
        info!("---------------------------------------------");
        info!("Current cycle: {}", cycle);
        info!("Total turns: {}", episode.turns);
        info!("Average turns per match: {:.2}", self.summary.average_turns());
        info!("Trainee parameters:");
        for line in self.trainee.model().coefficient_report(&self.trainee.features().names()) { info!("   {}", line); }
        info!("Trainee win rate: {:.2}%", 100.0 * self.summary.win_rate());
    }
}
