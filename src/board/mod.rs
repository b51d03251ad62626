//! English draughts rules: the 8x8 grid, turn tracking, forced capture chains
//! and reversible move application for search.

pub mod movegen;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self { Color::Black => Color::White, Color::White => Color::Black }
    }

    pub fn name(self) -> &'static str {
        match self { Color::Black => "black", Color::White => "white" }
    }

    /// Row delta of a pawn step. Black starts on rows 0-2 and moves down the grid.
    pub fn forward(self) -> i8 {
        match self { Color::Black => 1, Color::White => -1 }
    }

    pub fn promotion_row(self) -> u8 {
        match self { Color::Black => 7, Color::White => 0 }
    }

    pub fn pawn(self) -> Tile {
        match self { Color::Black => Tile::BlackPawn, Color::White => Tile::WhitePawn }
    }

    pub fn king(self) -> Tile {
        match self { Color::Black => Tile::BlackKing, Color::White => Tile::WhiteKing }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Color {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "b" | "black" => Ok(Color::Black),
            "w" | "white" => Ok(Color::White),
            other => anyhow::bail!("invalid color: {other} (use 'black' or 'white')"),
        }
    }
}

/// Square contents. The discriminants are the integers used on the wire; a king
/// is its pawn value times three.
#[repr(i8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tile {
    #[default]
    Empty = 0,
    BlackPawn = 1,
    BlackKing = 3,
    WhitePawn = -1,
    WhiteKing = -3,
}

impl Tile {
    pub fn value(self) -> i8 { self as i8 }

    pub fn from_value(v: i8) -> Option<Tile> {
        match v {
            0 => Some(Tile::Empty),
            1 => Some(Tile::BlackPawn),
            3 => Some(Tile::BlackKing),
            -1 => Some(Tile::WhitePawn),
            -3 => Some(Tile::WhiteKing),
            _ => None,
        }
    }

    pub fn color(self) -> Option<Color> {
        match self.value() {
            v if v > 0 => Some(Color::Black),
            v if v < 0 => Some(Color::White),
            _ => None,
        }
    }

    pub fn is_empty(self) -> bool { self == Tile::Empty }

    pub fn is_king(self) -> bool { matches!(self, Tile::BlackKing | Tile::WhiteKing) }

    /// Opposite-sign test used for captures.
    pub fn is_enemy_of(self, other: Tile) -> bool { (self.value() as i16) * (other.value() as i16) < 0 }

    pub fn promoted(self) -> Tile {
        match self { Tile::BlackPawn => Tile::BlackKing, Tile::WhitePawn => Tile::WhiteKing, t => t }
    }

    pub fn demoted(self) -> Tile {
        match self { Tile::BlackKing => Tile::BlackPawn, Tile::WhiteKing => Tile::WhitePawn, t => t }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub x: u8,
    pub y: u8,
}

impl Square {
    pub fn new(x: u8, y: u8) -> Option<Square> {
        if x < 8 && y < 8 { Some(Square { x, y }) } else { None }
    }

    pub fn offset(self, dx: i8, dy: i8) -> Option<Square> {
        let x = self.x as i8 + dx;
        let y = self.y as i8 + dy;
        if (0..=7).contains(&x) && (0..=7).contains(&y) { Some(Square { x: x as u8, y: y as u8 }) } else { None }
    }

    /// Dark squares hold pieces.
    pub fn is_playable(self) -> bool { (self.x + self.y) % 2 == 0 }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|y| (0..8u8).map(move |x| Square { x, y }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "({}, {})", self.x, self.y) }
}

/// A single step or single jump. Identity is (from, to); the flags are attached
/// by the move generator.
#[derive(Clone, Copy, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub capture: bool,
    pub promote: bool,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self { Self { from, to, capture: false, promote: false } }

    pub fn from_coords(x1: u8, y1: u8, x2: u8, y2: u8) -> Option<Move> {
        Some(Move::new(Square::new(x1, y1)?, Square::new(x2, y2)?))
    }

    pub fn captured_square(&self) -> Option<Square> {
        if !self.capture { return None; }
        Square::new((self.from.x + self.to.x) / 2, (self.from.y + self.to.y) / 2)
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool { self.from == other.from && self.to == other.to }
}

impl Eq for Move {}

impl std::hash::Hash for Move {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.from.x, self.from.y, self.to.x, self.to.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GameOver {
    #[default]
    None,
    /// The loser has no pieces left.
    Decisive { winner: Color },
    /// The loser had no legal move on its turn.
    Stalemate { loser: Color },
    Tie,
}

impl GameOver {
    pub fn is_over(self) -> bool { self != GameOver::None }

    pub fn winner(self) -> Option<Color> {
        match self {
            GameOver::Decisive { winner } => Some(winner),
            GameOver::Stalemate { loser } => Some(loser.opponent()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("illegal move: continue jumping with the piece on {required}")]
    MustContinueCapture { required: Square },
    #[error("illegal move: a capture is available and must be taken")]
    CaptureMandatory,
    #[error("illegal move: {0} is not allowed")]
    NotAMove(Move),
    #[error("illegal move: the game is already over")]
    GameFinished,
}

/// Restores a position after `Board::temporary_update`.
#[derive(Debug)]
pub struct UndoRecord {
    mv: Move,
    captured: Option<(Square, Tile)>,
    prev_game_over: GameOver,
}

/// Who moves after a move has been applied, and with what.
#[derive(Clone, Debug)]
pub struct Turn {
    pub color: Color,
    pub moves: Vec<Move>,
    /// Same side keeps moving to finish a capture chain.
    pub continued: bool,
}

#[derive(Clone, Debug)]
pub struct Board {
    tiles: [[Tile; 8]; 8], // [y][x]
    player_in_turn: Color,
    required_origin: Option<Square>,
    game_over: GameOver,
    cache: HashMap<Square, Vec<Move>>,
}

// The move cache is memoization only and takes no part in equality.
impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.tiles == other.tiles
            && self.player_in_turn == other.player_in_turn
            && self.required_origin == other.required_origin
            && self.game_over == other.game_over
    }
}

impl Eq for Board {}

impl Default for Board {
    fn default() -> Self { Self::new() }
}

impl Board {
    pub fn new() -> Self {
        let mut tiles = [[Tile::Empty; 8]; 8];
        for sq in Square::all().filter(|s| s.is_playable()) {
            if sq.y <= 2 { tiles[sq.y as usize][sq.x as usize] = Tile::BlackPawn; }
            if sq.y >= 5 { tiles[sq.y as usize][sq.x as usize] = Tile::WhitePawn; }
        }
        Self::from_tiles(tiles, Color::Black)
    }

    pub fn from_tiles(tiles: [[Tile; 8]; 8], to_move: Color) -> Self {
        Self { tiles, player_in_turn: to_move, required_origin: None, game_over: GameOver::None, cache: HashMap::new() }
    }

    /// Position with only the given pieces on it.
    pub fn with_pieces(pieces: &[(Square, Tile)], to_move: Color) -> Self {
        let mut tiles = [[Tile::Empty; 8]; 8];
        for &(sq, t) in pieces { tiles[sq.y as usize][sq.x as usize] = t; }
        Self::from_tiles(tiles, to_move)
    }

    pub fn tile(&self, sq: Square) -> Tile { self.tiles[sq.y as usize][sq.x as usize] }

    pub fn tiles(&self) -> &[[Tile; 8]; 8] { &self.tiles }

    pub fn player_in_turn(&self) -> Color { self.player_in_turn }

    pub fn required_origin(&self) -> Option<Square> { self.required_origin }

    pub fn game_over(&self) -> GameOver { self.game_over }

    pub fn pieces(&self, color: Color) -> impl Iterator<Item = Square> + '_ {
        Square::all().filter(move |&s| self.tile(s).color() == Some(color))
    }

    pub fn piece_count(&self, color: Color) -> usize { self.pieces(color).count() }

    pub fn king_count(&self, color: Color) -> usize {
        let king = color.king();
        Square::all().filter(|&s| self.tile(s) == king).count()
    }

    /// Moves for the piece on `origin`, memoized until the next state change.
    pub fn legal_moves(&mut self, origin: Square) -> Vec<Move> {
        if let Some(cached) = self.cache.get(&origin) { return cached.clone(); }
        let moves = movegen::moves_from(self, origin);
        self.cache.insert(origin, moves.clone());
        moves
    }

    /// All moves for `color`, reduced to captures whenever any capture exists.
    pub fn all_legal_moves(&mut self, color: Color) -> Vec<Move> {
        let origins: Vec<Square> = self.pieces(color).collect();
        let mut moves = Vec::new();
        for origin in origins { moves.extend(self.legal_moves(origin)); }
        if moves.iter().any(|m| m.capture) { moves.retain(|m| m.capture); }
        moves
    }

    /// Moves `color` may actually play now, honouring a pending capture chain.
    pub fn playable_moves(&mut self, color: Color) -> Vec<Move> {
        if let Some(origin) = self.required_origin {
            if color == self.player_in_turn {
                return self.legal_moves(origin).into_iter().filter(|m| m.capture).collect();
            }
        }
        self.all_legal_moves(color)
    }

    pub fn update(&mut self, mv: &Move) -> Result<(), IllegalMove> {
        if self.game_over.is_over() { return Err(IllegalMove::GameFinished); }
        if let Some(required) = self.required_origin {
            if mv.from != required { return Err(IllegalMove::MustContinueCapture { required }); }
        }
        let mover = self.player_in_turn;
        if self.tile(mv.from).color() != Some(mover) { return Err(IllegalMove::NotAMove(*mv)); }

        let jumps: Vec<Move> = self.all_legal_moves(mover).into_iter().filter(|m| m.capture).collect();
        let plain = self.legal_moves(mv.from);
        let legal = if jumps.is_empty() { &plain } else { &jumps };
        let mv = match legal.iter().find(|m| *m == mv) {
            Some(full) => *full,
            None if !jumps.is_empty() && plain.contains(mv) => return Err(IllegalMove::CaptureMandatory),
            None => return Err(IllegalMove::NotAMove(*mv)),
        };

        self.apply(&mv);
        self.cache.clear();
        if self.piece_count(mover.opponent()) == 0 {
            self.game_over = GameOver::Decisive { winner: mover };
            self.required_origin = None;
            return Ok(());
        }

        let chain = mv.capture && self.legal_moves(mv.to).iter().any(|m| m.capture);
        if chain {
            self.required_origin = Some(mv.to);
        } else {
            self.required_origin = None;
            self.player_in_turn = mover.opponent();
        }
        Ok(())
    }

    /// Applies a move known to be legal without validation or turn handling.
    pub fn temporary_update(&mut self, mv: &Move) -> UndoRecord {
        let mover = self.tile(mv.from).color();
        debug_assert!(mover.is_some(), "temporary move from empty square {}", mv.from);
        let prev_game_over = self.game_over;
        let captured = self.apply(mv);
        self.cache.clear();
        if let Some(mover) = mover {
            if self.piece_count(mover.opponent()) == 0 { self.game_over = GameOver::Decisive { winner: mover }; }
        }
        UndoRecord { mv: *mv, captured, prev_game_over }
    }

    pub fn undo_temporary_update(&mut self, undo: UndoRecord) {
        let UndoRecord { mv, captured, prev_game_over } = undo;
        let mut piece = self.tile(mv.to);
        if mv.promote { piece = piece.demoted(); }
        self.set(mv.from, piece);
        self.set(mv.to, Tile::Empty);
        if let Some((sq, t)) = captured { self.set(sq, t); }
        self.game_over = prev_game_over;
        self.cache.clear();
    }

    /// Runs `f` on the position after `mv` and restores the board afterwards.
    pub fn explore<R>(&mut self, mv: &Move, f: impl FnOnce(&mut Board) -> R) -> R {
        let undo = self.temporary_update(mv);
        let out = f(self);
        self.undo_temporary_update(undo);
        out
    }

    /// Continuation after `mover` played `last`: the capture chain if one is
    /// open from the landing square, otherwise the opponent's full move list.
    pub fn next_turn(&mut self, mover: Color, last: &Move) -> Turn {
        if last.capture {
            let chain: Vec<Move> = self.legal_moves(last.to).into_iter().filter(|m| m.capture).collect();
            if !chain.is_empty() { return Turn { color: mover, moves: chain, continued: true }; }
        }
        let color = mover.opponent();
        Turn { color, moves: self.all_legal_moves(color), continued: false }
    }

    pub fn pass_turn(&mut self) {
        self.required_origin = None;
        self.player_in_turn = self.player_in_turn.opponent();
    }

    /// Ends the game if the side to move cannot move. Returns whether it did.
    pub fn check_no_moves(&mut self) -> bool {
        if self.game_over.is_over() { return true; }
        let color = self.player_in_turn;
        if self.playable_moves(color).is_empty() {
            self.game_over = GameOver::Stalemate { loser: color };
            return true;
        }
        false
    }

    pub fn declare_tie(&mut self) {
        if !self.game_over.is_over() { self.game_over = GameOver::Tie; }
    }

    fn set(&mut self, sq: Square, t: Tile) { self.tiles[sq.y as usize][sq.x as usize] = t; }

    fn apply(&mut self, mv: &Move) -> Option<(Square, Tile)> {
        let mut piece = self.tile(mv.from);
        if mv.promote { piece = piece.promoted(); }
        self.set(mv.to, piece);
        self.set(mv.from, Tile::Empty);
        mv.captured_square().map(|sq| {
            let t = self.tile(sq);
            self.set(sq, Tile::Empty);
            (sq, t)
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = Square::all().map(|s| self.tile(s).value().to_string()).collect();
        f.write_str(&cells.join(" "))
    }
}

impl FromStr for Board {
    type Err = anyhow::Error;

    /// Parses the 64-integer row-major rendering; black moves first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values: Vec<&str> = s.split_whitespace().collect();
        if values.len() != 64 { anyhow::bail!("expected 64 tiles, got {}", values.len()); }
        let mut tiles = [[Tile::Empty; 8]; 8];
        for (i, raw) in values.iter().enumerate() {
            let v: i8 = raw.parse().map_err(|_| anyhow::anyhow!("bad tile value: {raw}"))?;
            tiles[i / 8][i % 8] = Tile::from_value(v).ok_or_else(|| anyhow::anyhow!("bad tile value: {v}"))?;
        }
        Ok(Board::from_tiles(tiles, Color::Black))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_is_a_tag_transition() {
        assert_eq!(Tile::BlackPawn.promoted().value(), 3);
        assert_eq!(Tile::WhitePawn.promoted().value(), -3);
        assert_eq!(Tile::WhiteKing.promoted(), Tile::WhiteKing);
        assert_eq!(Tile::BlackKing.demoted(), Tile::BlackPawn);
    }

    #[test]
    fn sign_test_for_enemies() {
        assert!(Tile::BlackPawn.is_enemy_of(Tile::WhiteKing));
        assert!(!Tile::BlackPawn.is_enemy_of(Tile::BlackKing));
        assert!(!Tile::Empty.is_enemy_of(Tile::WhitePawn));
    }

    #[test]
    fn offsets_stay_on_the_grid() {
        let corner = Square::new(0, 0).unwrap();
        assert_eq!(corner.offset(-1, 1), None);
        assert_eq!(corner.offset(1, 1), Square::new(1, 1));
        assert_eq!(Square::new(7, 7).unwrap().offset(1, 0), None);
    }

    #[test]
    fn render_and_parse_round_trip() {
        let b = Board::new();
        let text = b.to_string();
        assert_eq!(text.split_whitespace().count(), 64);
        assert!(text.starts_with("1 0 1 0"));
        let parsed: Board = text.parse().unwrap();
        assert_eq!(parsed, b);
    }

    #[test]
    fn move_identity_ignores_flags() {
        let a = Move::from_coords(1, 1, 3, 3).unwrap();
        let b = Move { capture: true, ..a };
        assert_eq!(a, b);
        assert_eq!(b.captured_square(), Square::new(2, 2));
        assert_eq!(a.captured_square(), None);
    }
}
