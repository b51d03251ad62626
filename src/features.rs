use crate::board::{movegen, Board, Color, Square, Tile};
use std::collections::HashSet;

/// Piece counts are scaled by the starting army size.
const ARMY: f64 = 12.0;

pub const OWN_PIECES: usize = 0;
pub const ENEMY_PIECES: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feature {
    Pieces(Color),
    Kings(Color),
    /// Pieces of this color the opponent could capture right now.
    Threatened(Color),
    /// Occupancy of one square, graded from `perspective`'s point of view.
    PositionValue { square: Square, perspective: Color },
}

impl Feature {
    pub fn name(&self) -> String {
        match *self {
            Feature::Pieces(c) => format!("{} Pieces", title(c)),
            Feature::Kings(c) => format!("{} Kings", title(c)),
            Feature::Threatened(c) => format!("{} Threatened Pieces", title(c)),
            Feature::PositionValue { square, .. } => format!("Position Value [{}, {}]", square.x + 1, square.y + 1),
        }
    }

    pub fn value(&self, board: &Board) -> f64 {
        match *self {
            Feature::Pieces(c) => board.piece_count(c) as f64 / ARMY,
            Feature::Kings(c) => board.king_count(c) as f64 / ARMY,
            Feature::Threatened(c) => threatened(board, c) as f64 / ARMY,
            Feature::PositionValue { square, perspective } => position_value(board.tile(square), perspective),
        }
    }
}

fn title(c: Color) -> &'static str {
    match c { Color::Black => "Black", Color::White => "White" }
}

fn threatened(board: &Board, color: Color) -> usize {
    let victims: HashSet<Square> = movegen::captures(board, color.opponent())
        .iter()
        .filter_map(|m| m.captured_square())
        .collect();
    victims.len()
}

fn position_value(tile: Tile, perspective: Color) -> f64 {
    let v = match tile {
        Tile::Empty => return 0.5,
        t if t.is_king() => 1.0,
        _ => 0.75,
    };
    if tile.color() == Some(perspective) { v } else { 1.0 - v }
}

/// Features in the fixed order for one color: own before enemy, so index 0 and 1
/// are always the two piece counts.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureSet {
    perspective: Color,
    features: Vec<Feature>,
}

impl FeatureSet {
    pub fn new(perspective: Color, positional: bool) -> Self {
        let own = perspective;
        let enemy = perspective.opponent();
        let mut features = vec![
            Feature::Pieces(own),
            Feature::Pieces(enemy),
            Feature::Kings(own),
            Feature::Kings(enemy),
            Feature::Threatened(own),
            Feature::Threatened(enemy),
        ];
        if positional {
            features.extend(Square::all().filter(|s| s.is_playable()).map(|square| Feature::PositionValue { square, perspective }));
        }
        Self { perspective, features }
    }

    pub fn perspective(&self) -> Color { self.perspective }

    pub fn len(&self) -> usize { self.features.len() }

    pub fn is_empty(&self) -> bool { self.features.is_empty() }

    pub fn features(&self) -> &[Feature] { &self.features }

    pub fn names(&self) -> Vec<String> { self.features.iter().map(Feature::name).collect() }

    pub fn compute(&self, board: &Board) -> Vec<f64> { self.features.iter().map(|f| f.value(board)).collect() }
}
