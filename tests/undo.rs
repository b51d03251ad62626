use checkerbot::board::{Board, Color, GameOver, Move, Square, Tile};
use pretty_assertions::assert_eq;
use quickcheck_macros::quickcheck;

fn sq(x: u8, y: u8) -> Square { Square::new(x, y).expect("on board") }

#[test]
fn capture_with_promotion_is_undone() {
    let mut b = Board::with_pieces(&[(sq(1, 5), Tile::BlackPawn), (sq(2, 6), Tile::WhitePawn), (sq(6, 6), Tile::WhitePawn)], Color::Black);
    let before = b.clone();
    let mv = b.playable_moves(Color::Black)[0];
    assert!(mv.capture && mv.promote, "expected a crowning jump, got {:?}", mv);

    let undo = b.temporary_update(&mv);
    assert_eq!(b.tile(sq(3, 7)), Tile::BlackKing);
    assert_eq!(b.tile(sq(2, 6)), Tile::Empty);
    b.undo_temporary_update(undo);
    assert_eq!(b, before);
    assert_eq!(b.tile(sq(1, 5)), Tile::BlackPawn, "demoted on undo");
}

#[test]
fn decisive_flag_is_restored() {
    let mut b = Board::with_pieces(&[(sq(1, 1), Tile::BlackPawn), (sq(2, 2), Tile::WhitePawn)], Color::Black);
    let mv = b.playable_moves(Color::Black)[0];
    let seen = b.explore(&mv, |inner| inner.game_over());
    assert_eq!(seen, GameOver::Decisive { winner: Color::Black });
    assert_eq!(b.game_over(), GameOver::None);
}

#[test]
fn moves_are_fresh_after_undo() {
    let mut b = Board::new();
    let start = b.playable_moves(Color::Black);
    let mv = start[0];
    b.explore(&mv, |inner| {
        assert_ne!(inner.playable_moves(Color::Black), start);
    });
    assert_eq!(b.playable_moves(Color::Black), start);
}

/// Walks a seeded random game; at every position each legal move must apply
/// and undo back to the same board.
#[quickcheck]
fn every_move_undoes_exactly(picks: Vec<u8>) -> bool {
    let mut b = Board::new();
    for p in picks.into_iter().take(80) {
        let color = b.player_in_turn();
        let moves: Vec<Move> = b.playable_moves(color);
        if moves.is_empty() { break; }
        for m in &moves {
            let before = b.clone();
            let undo = b.temporary_update(m);
            b.undo_temporary_update(undo);
            if b != before || *b.tiles() != *before.tiles() { return false; }
        }
        let chosen = moves[p as usize % moves.len()];
        if b.update(&chosen).is_err() { return false; }
        if b.game_over().is_over() { break; }
    }
    true
}
