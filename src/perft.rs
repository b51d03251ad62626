use crate::board::{Board, Color, Move};

// Move-path counting with apply/undo (no cloning). A capture chain counts as
// one move, so depth is measured in turns.
pub fn perft(board: &mut Board, color: Color, depth: u32) -> u64 {
    if depth == 0 { return 1; }
    let moves = board.playable_moves(color);
    moves.iter().map(|mv| walk(board, mv, color, depth)).sum()
}

fn walk(board: &mut Board, mv: &Move, mover: Color, depth: u32) -> u64 {
    board.explore(mv, |b| {
        let turn = b.next_turn(mover, mv);
        if turn.continued { return turn.moves.iter().map(|m| walk(b, m, mover, depth)).sum(); }
        if depth <= 1 { return 1; }
        turn.moves.iter().map(|m| walk(b, m, turn.color, depth - 1)).sum()
    })
}

/// Per-root-move counts, in generation order.
pub fn divide(board: &mut Board, color: Color, depth: u32) -> Vec<(Move, u64)> {
    let moves = board.playable_moves(color);
    moves.into_iter().map(|mv| (mv, if depth == 0 { 1 } else { walk(board, &mv, color, depth) })).collect()
}
