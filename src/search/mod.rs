pub mod eval;
pub mod minimax;
