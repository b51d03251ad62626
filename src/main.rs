use anyhow::{bail, Result};
use checkerbot::board::{Board, Color, GameOver};
use checkerbot::model::Hyperparams;
use checkerbot::player::{HumanInput, Player, SearchAgent};
use checkerbot::protocol::{Command, Reply};
use checkerbot::search::minimax::{SearchParams, TieBreak};
use clap::Parser;
use log::{info, warn};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Play draughts over the display line protocol", long_about = None)]
struct Args {
    /// Number of human players (0, 1 or 2)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    humans: u8,

    /// Color of the human when there is exactly one
    #[arg(long, default_value = "black")]
    human_color: Color,

    /// Model file for the black agent
    #[arg(long)]
    black_model: Option<PathBuf>,

    /// Model file for the white agent
    #[arg(long)]
    white_model: Option<PathBuf>,

    /// Search depth in turns
    #[arg(long, default_value_t = 3)]
    depth: u32,

    /// Exploration rate for the agents
    #[arg(long, default_value_t = 0.0)]
    epsilon: f64,

    /// Pick randomly among equally scored moves
    #[arg(long)]
    random_ties: bool,

    /// Add the per-square position features
    #[arg(long)]
    positional: bool,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Turns before the game is called a tie
    #[arg(long, default_value_t = 1000)]
    max_turns: usize,

    /// Games to play when no human is present
    #[arg(long, default_value_t = 1)]
    games: usize,
}

fn send(cmd: Command) -> Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", cmd)?;
    out.flush()?;
    Ok(())
}

fn make_player(args: &Args, color: Color, human: bool) -> Player {
    if human { return Player::Human(HumanInput::stdio(color)); }
    let params = SearchParams {
        depth: args.depth,
        epsilon: args.epsilon,
        tie_break: if args.random_ties { TieBreak::Random } else { TieBreak::First },
    };
    let seed = args.seed.wrapping_add(color as u64);
    let path = match color { Color::Black => &args.black_model, Color::White => &args.white_model };
    let agent = match path {
        Some(p) => SearchAgent::from_file(color, p, Hyperparams::default(), params, seed, args.positional),
        None => SearchAgent::fresh(color, Hyperparams::default(), params, seed, args.positional),
    };
    Player::Agent(agent)
}

fn play_game(players: &mut [Player; 2], max_turns: usize) -> Result<GameOver> {
    let mut board = Board::new();
    send(Command::display(&board))?;
    let mut turns = 0usize;
    loop {
        if board.check_no_moves() { break; }
        if turns >= max_turns { board.declare_tie(); break; }
        let color = board.player_in_turn();
        send(Command::SetStatus(format!("{} to move", color.name())))?;
        let player = &mut players[color as usize];
        let Some(mv) = player.choose_move(&mut board)? else { break };
        match board.update(&mv) {
            Ok(()) => {
                turns += 1;
                send(Command::display(&board))?;
            }
            Err(e) if matches!(player, Player::Human(_)) => send(Command::Popup(e.to_string()))?,
            Err(e) => bail!("agent for {} chose an illegal move {}: {}", color, mv, e),
        }
    }
    Ok(board.game_over())
}

/// Waits for the display's answer to `game_over`; EOF means stop.
fn play_again() -> Result<bool> {
    let mut line = String::new();
    loop {
        line.clear();
        if io::stdin().read_line(&mut line)? == 0 { return Ok(false); }
        match line.parse::<Reply>() {
            Ok(Reply::Response(again)) => return Ok(again),
            Ok(other) => warn!("ignoring {:?} after game over", other),
            Err(e) => warn!("{}", e),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let human = |c: Color| args.humans == 2 || (args.humans == 1 && c == args.human_color);
    let mut players = [make_player(&args, Color::Black, human(Color::Black)), make_player(&args, Color::White, human(Color::White))];

    let mut played = 0usize;
    loop {
        let outcome = play_game(&mut players, args.max_turns)?;
        played += 1;
        info!("game {} finished: {:?}", played, outcome);
        send(Command::GameOver(outcome.winner()))?;
        let again = if args.humans == 0 { played < args.games } else { play_again()? };
        if !again { break; }
    }
    Ok(())
}
