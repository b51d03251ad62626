use anyhow::Result;
use checkerbot::arena::{play_match, MatchParams};
use checkerbot::board::Color;
use checkerbot::features::FeatureSet;
use checkerbot::model::LinearModel;
use checkerbot::search::minimax::SearchParams;
use checkerbot::selfplay::{Learning, SelfPlayParams, Trainer};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LearningArg {
    Batch,
    Td,
    Off,
}

#[derive(Parser, Debug)]
#[command(name = "checkerbot-selfplay", about = "Train the evaluator by playing against itself")]
struct Args {
    /// JSON file with SelfPlayParams; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    games: Option<usize>,
    #[arg(long)]
    max_turns: Option<usize>,
    #[arg(long)]
    depth: Option<u32>,
    #[arg(long)]
    epsilon: Option<f64>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum)]
    learning: Option<LearningArg>,
    #[arg(long)]
    learning_rate: Option<f64>,
    #[arg(long)]
    regularization: Option<f64>,
    #[arg(long)]
    lambda: Option<f64>,
    /// Add the per-square position features
    #[arg(long, default_value_t = false)]
    positional: bool,
    /// Copy trainee weights to the opponent every N cycles
    #[arg(long)]
    refresh: Option<usize>,
    #[arg(long)]
    trainee_model: Option<PathBuf>,
    #[arg(long)]
    opponent_model: Option<PathBuf>,
    /// Append per-cycle CSV records here
    #[arg(long)]
    records_dir: Option<PathBuf>,
    /// After training, play this many games of trainee (black) vs opponent (white)
    #[arg(long, default_value_t = 0)]
    eval_games: usize,
}

impl Args {
    fn params(&self) -> Result<SelfPlayParams> {
        let mut p = match &self.config {
            Some(path) => SelfPlayParams::from_json_file(path)?,
            None => SelfPlayParams::default(),
        };
        if let Some(v) = self.games { p.games = v; }
        if let Some(v) = self.max_turns { p.max_turns = v; }
        if let Some(v) = self.depth { p.depth = v; }
        if let Some(v) = self.epsilon { p.epsilon = v; }
        if let Some(v) = self.seed { p.seed = v; }
        if let Some(v) = self.learning {
            p.learning = match v { LearningArg::Batch => Learning::Batch, LearningArg::Td => Learning::TdLambda, LearningArg::Off => Learning::Off };
        }
        if let Some(v) = self.learning_rate { p.hyper.learning_rate = v; }
        if let Some(v) = self.regularization { p.hyper.regularization = v; }
        if let Some(v) = self.lambda { p.hyper.lambda = v; }
        if self.positional { p.positional = true; }
        if let Some(v) = self.refresh { p.refresh = v; }
        if self.trainee_model.is_some() { p.trainee_model = self.trainee_model.clone(); }
        if self.opponent_model.is_some() { p.opponent_model = self.opponent_model.clone(); }
        if self.records_dir.is_some() { p.records_dir = self.records_dir.clone(); }
        Ok(p)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let params = args.params()?;
    info!("self-play: {} games, depth {}, epsilon {}, {:?} learning", params.games, params.depth, params.epsilon, params.learning);

    let pb = ProgressBar::new(params.games as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    let mut trainer = Trainer::new(params.clone());
    let summary = trainer.run(|s| {
        pb.inc(1);
        pb.set_message(format!("win rate {:.1}%", 100.0 * s.win_rate()));
    })?;
    pb.finish_with_message(format!("{} games, trainee won {}, lost {}, tied {}", summary.cycles, summary.trainee_wins, summary.opponent_wins, summary.ties));

    if args.eval_games > 0 {
        let defaults = MatchParams::default();
        let search = SearchParams { depth: params.depth, ..defaults.search };
        let match_params = MatchParams { games: args.eval_games, max_turns: params.max_turns, search, seed: params.seed, positional: params.positional };
        let trainee: &LinearModel = trainer.trainee().model();
        let opponent: &LinearModel = trainer.opponent().model();
        let result = play_match(trainee, opponent, &match_params)?;
        println!("eval: black {} white {} ties {} (black score {:.3})", result.black_wins, result.white_wins, result.ties, result.black_score());
        let names = FeatureSet::new(Color::Black, params.positional).names();
        for line in trainee.coefficient_report(&names) { println!("  {}", line); }
    }
    Ok(())
}
