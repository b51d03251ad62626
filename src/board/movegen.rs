//! Pure move generation. Everything here reads the grid only; the memoized
//! wrappers live on `Board`.

use super::{Board, Color, Move, Square, Tile};

const FORWARD_LEFT: i8 = -1;
const FORWARD_RIGHT: i8 = 1;

// Kings: down-left, down-right, up-left, up-right.
const KING_DIRECTIONS: [(i8, i8); 4] = [(-1, 1), (1, 1), (-1, -1), (1, -1)];

/// Steps and single jumps for the piece on `origin`. Empty for an empty square.
pub fn moves_from(board: &Board, origin: Square) -> Vec<Move> {
    let piece = board.tile(origin);
    let color = match piece.color() { Some(c) => c, None => return Vec::new() };
    let mut out = Vec::with_capacity(4);
    if piece.is_king() {
        for &(dx, dy) in &KING_DIRECTIONS { push_direction(board, origin, piece, dx, dy, None, &mut out); }
    } else {
        let dy = color.forward();
        for dx in [FORWARD_LEFT, FORWARD_RIGHT] {
            push_direction(board, origin, piece, dx, dy, Some(color.promotion_row()), &mut out);
        }
    }
    out
}

// A step onto an empty neighbour, or else a jump over an enemy onto an empty square.
fn push_direction(board: &Board, origin: Square, piece: Tile, dx: i8, dy: i8, promotion_row: Option<u8>, out: &mut Vec<Move>) {
    let promotes = |to: Square| promotion_row == Some(to.y);
    let Some(near) = origin.offset(dx, dy) else { return };
    let near_tile = board.tile(near);
    if near_tile.is_empty() {
        out.push(Move { from: origin, to: near, capture: false, promote: promotes(near) });
        return;
    }
    if !near_tile.is_enemy_of(piece) { return; }
    let Some(far) = origin.offset(2 * dx, 2 * dy) else { return };
    if board.tile(far).is_empty() {
        out.push(Move { from: origin, to: far, capture: true, promote: promotes(far) });
    }
}

/// Every move for `color`, pruned to captures when any capture exists.
pub fn all_moves(board: &Board, color: Color) -> Vec<Move> {
    let mut moves: Vec<Move> = board.pieces(color).flat_map(|sq| moves_from(board, sq)).collect();
    if moves.iter().any(|m| m.capture) { moves.retain(|m| m.capture); }
    moves
}

/// Captures available to `color` anywhere on the board.
pub fn captures(board: &Board, color: Color) -> Vec<Move> {
    board.pieces(color).flat_map(|sq| moves_from(board, sq)).filter(|m| m.capture).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(x: u8, y: u8) -> Square { Square::new(x, y).unwrap() }

    #[test]
    fn blocked_pawn_has_no_moves() {
        let b = Board::new();
        assert!(moves_from(&b, sq(1, 1)).is_empty());
        assert!(moves_from(&b, sq(1, 0)).is_empty(), "empty square");
    }

    #[test]
    fn friendly_piece_is_not_jumped() {
        let b = Board::with_pieces(&[(sq(2, 2), Tile::BlackPawn), (sq(3, 3), Tile::BlackPawn)], Color::Black);
        let moves = moves_from(&b, sq(2, 2));
        assert_eq!(moves, vec![Move::new(sq(2, 2), sq(1, 3))]);
    }

    #[test]
    fn jump_needs_empty_landing() {
        let b = Board::with_pieces(
            &[(sq(2, 2), Tile::BlackPawn), (sq(3, 3), Tile::WhitePawn), (sq(4, 4), Tile::WhitePawn)],
            Color::Black,
        );
        assert!(captures(&b, Color::Black).is_empty());
    }
}
