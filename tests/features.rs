use checkerbot::board::{Board, Color, Square, Tile};
use checkerbot::features::{Feature, FeatureSet};
use pretty_assertions::assert_eq;

fn sq(x: u8, y: u8) -> Square { Square::new(x, y).expect("on board") }

#[test]
fn start_position_counts() {
    let b = Board::new();
    let fs = FeatureSet::new(Color::Black, false);
    assert_eq!(fs.compute(&b), vec![1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn order_is_own_side_first() {
    let b = Board::with_pieces(&[(sq(1, 1), Tile::BlackKing), (sq(3, 3), Tile::WhitePawn), (sq(5, 5), Tile::WhitePawn)], Color::Black);
    let black = FeatureSet::new(Color::Black, false).compute(&b);
    let white = FeatureSet::new(Color::White, false).compute(&b);
    assert_eq!(black[..4], [1.0 / 12.0, 2.0 / 12.0, 1.0 / 12.0, 0.0]);
    assert_eq!(white[..4], [2.0 / 12.0, 1.0 / 12.0, 0.0, 1.0 / 12.0]);
}

#[test]
fn threatened_counts_distinct_victims() {
    // Two black pawns can both jump the white pawn on (3,3); it is counted once.
    // The pawns behind them block the white jumps back.
    let b = Board::with_pieces(
        &[
            (sq(1, 1), Tile::BlackPawn),
            (sq(5, 1), Tile::BlackPawn),
            (sq(2, 2), Tile::BlackPawn),
            (sq(4, 2), Tile::BlackPawn),
            (sq(3, 3), Tile::WhitePawn),
            (sq(7, 7), Tile::WhitePawn),
        ],
        Color::Black,
    );
    assert_eq!(Feature::Threatened(Color::White).value(&b), 1.0 / 12.0);
    assert_eq!(Feature::Threatened(Color::Black).value(&b), 0.0);
    let white = FeatureSet::new(Color::White, false).compute(&b);
    assert_eq!(white[4], 1.0 / 12.0, "own threatened comes before enemy threatened");
}

#[test]
fn positional_values_follow_the_perspective() {
    let b = Board::with_pieces(&[(sq(0, 0), Tile::BlackKing), (sq(2, 0), Tile::WhitePawn)], Color::Black);
    let own = Feature::PositionValue { square: sq(0, 0), perspective: Color::Black };
    let enemy = Feature::PositionValue { square: sq(2, 0), perspective: Color::Black };
    let empty = Feature::PositionValue { square: sq(4, 0), perspective: Color::Black };
    assert_eq!(own.value(&b), 1.0);
    assert_eq!(enemy.value(&b), 0.25);
    assert_eq!(empty.value(&b), 0.5);
    let flipped = Feature::PositionValue { square: sq(0, 0), perspective: Color::White };
    assert_eq!(flipped.value(&b), 0.0);
}

#[test]
fn positional_set_covers_playable_squares() {
    let fs = FeatureSet::new(Color::White, true);
    assert_eq!(fs.len(), 6 + 32);
    let names = fs.names();
    assert_eq!(names[0], "White Pieces");
    assert_eq!(names[5], "Black Threatened Pieces");
    assert_eq!(names[6], "Position Value [1, 1]");
    assert_eq!(fs.compute(&Board::new()).len(), 38);
}
