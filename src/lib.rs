//! English draughts: rules, minimax search and a self-trained linear evaluator
pub mod arena;
pub mod board;
pub mod features;
pub mod model;
pub mod perft;
pub mod player;
pub mod protocol;
pub mod records;
pub mod search;
pub mod selfplay;
