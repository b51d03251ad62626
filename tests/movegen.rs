use checkerbot::board::{Board, Color, Move, Square, Tile};
use pretty_assertions::assert_eq;
use quickcheck_macros::quickcheck;

fn sq(x: u8, y: u8) -> Square { Square::new(x, y).expect("on board") }

#[test]
fn corner_pawn_has_one_step_at_start() {
    let mut b = Board::new();
    let moves = b.legal_moves(sq(0, 2));
    assert_eq!(moves.len(), 1, "moves: {:?}", moves);
    assert_eq!(moves[0].to, sq(1, 3));
    assert!(!moves[0].capture);
    assert!(!moves[0].promote);
}

#[test]
fn start_position_has_seven_moves_each_side() {
    let mut b = Board::new();
    assert_eq!(b.all_legal_moves(Color::Black).len(), 7);
    assert_eq!(b.all_legal_moves(Color::White).len(), 7);
}

#[test]
fn lone_jump_is_the_only_move() {
    let mut b = Board::with_pieces(&[(sq(5, 2), Tile::BlackPawn), (sq(4, 3), Tile::WhitePawn)], Color::Black);
    let moves = b.all_legal_moves(Color::Black);
    assert_eq!(moves.len(), 1, "moves: {:?}", moves);
    assert_eq!((moves[0].from, moves[0].to), (sq(5, 2), sq(3, 4)));
    assert!(moves[0].capture);
}

#[test]
fn capture_prunes_quiet_moves_across_the_board() {
    let mut b = Board::with_pieces(
        &[(sq(1, 1), Tile::BlackPawn), (sq(2, 2), Tile::WhitePawn), (sq(6, 2), Tile::BlackPawn)],
        Color::Black,
    );
    let moves = b.all_legal_moves(Color::Black);
    assert!(moves.iter().all(|m| m.capture), "moves: {:?}", moves);
    assert_eq!(moves, vec![Move::new(sq(1, 1), sq(3, 3))]);
}

#[test]
fn pawns_only_move_forward() {
    let mut b = Board::with_pieces(&[(sq(3, 3), Tile::BlackPawn), (sq(5, 5), Tile::WhitePawn)], Color::Black);
    assert!(b.legal_moves(sq(3, 3)).iter().all(|m| m.to.y == 4));
    assert!(b.legal_moves(sq(5, 5)).iter().all(|m| m.to.y == 4));
}

#[test]
fn king_moves_in_four_directions() {
    let mut b = Board::with_pieces(&[(sq(3, 3), Tile::WhiteKing)], Color::White);
    let mut to: Vec<Square> = b.legal_moves(sq(3, 3)).iter().map(|m| m.to).collect();
    to.sort_by_key(|s| (s.y, s.x));
    assert_eq!(to, vec![sq(2, 2), sq(4, 2), sq(2, 4), sq(4, 4)]);
    assert!(b.legal_moves(sq(3, 3)).iter().all(|m| !m.promote));
}

#[test]
fn king_captures_backwards() {
    let mut b = Board::with_pieces(&[(sq(3, 3), Tile::BlackKing), (sq(2, 2), Tile::WhitePawn)], Color::Black);
    let moves = b.all_legal_moves(Color::Black);
    assert_eq!(moves, vec![Move::new(sq(3, 3), sq(1, 1))]);
    assert!(moves[0].capture);
}

#[test]
fn promotion_flag_on_far_row_only() {
    let mut b = Board::with_pieces(&[(sq(2, 6), Tile::BlackPawn), (sq(5, 1), Tile::WhitePawn)], Color::Black);
    assert!(b.legal_moves(sq(2, 6)).iter().all(|m| m.promote && m.to.y == 7));
    assert!(b.legal_moves(sq(5, 1)).iter().all(|m| m.promote && m.to.y == 0));
    let mut quiet = Board::with_pieces(&[(sq(2, 4), Tile::BlackPawn)], Color::Black);
    assert!(quiet.legal_moves(sq(2, 4)).iter().all(|m| !m.promote));
}

#[test]
fn edge_pieces_stay_on_the_grid() {
    let mut b = Board::with_pieces(&[(sq(0, 0), Tile::BlackKing), (sq(7, 7), Tile::WhiteKing)], Color::Black);
    assert_eq!(b.legal_moves(sq(0, 0)), vec![Move::new(sq(0, 0), sq(1, 1))]);
    assert_eq!(b.legal_moves(sq(7, 7)), vec![Move::new(sq(7, 7), sq(6, 6))]);
}

#[test]
fn no_jump_off_the_edge() {
    let mut b = Board::with_pieces(&[(sq(6, 6), Tile::BlackPawn), (sq(7, 7), Tile::WhitePawn)], Color::Black);
    assert!(b.legal_moves(sq(6, 6)).iter().all(|m| !m.capture));
}

#[test]
fn empty_square_has_no_moves() {
    let mut b = Board::new();
    assert!(b.legal_moves(sq(3, 3)).is_empty());
}

/// Plays a seeded sequence of legal moves and compares cached generation with a
/// freshly built board of the same tiles at every step.
#[quickcheck]
fn cached_and_cold_generation_agree(picks: Vec<u8>) -> bool {
    let mut b = Board::new();
    for p in picks.into_iter().take(60) {
        let color = b.player_in_turn();
        let warm = b.playable_moves(color);
        let again = b.playable_moves(color);
        let mut cold = Board::from_tiles(*b.tiles(), color);
        let cold_moves = cold.all_legal_moves(color);
        if warm != again { return false; }
        if b.required_origin().is_none() && warm != cold_moves { return false; }
        if warm.is_empty() { break; }
        let mv = warm[p as usize % warm.len()];
        if b.update(&mv).is_err() { return false; }
        if b.game_over().is_over() { break; }
    }
    true
}
