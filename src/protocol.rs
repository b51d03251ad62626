//! Text lines exchanged with the board display process.

use crate::board::{Board, Color, Move};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Display(String),
    GetMove(Color),
    SetStatus(String),
    Popup(String),
    /// Winner, or none for a tie.
    GameOver(Option<Color>),
}

impl Command {
    pub fn display(board: &Board) -> Self { Command::Display(board.to_string()) }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Display(tiles) => write!(f, "display {}", tiles),
            Command::GetMove(c) => write!(f, "get_move {}", c),
            Command::SetStatus(s) => write!(f, "set_status {}", s),
            Command::Popup(s) => write!(f, "popup {}", s),
            Command::GameOver(Some(c)) => write!(f, "game_over {}", c),
            Command::GameOver(None) => write!(f, "game_over tie"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    SelectedMove(Move),
    /// Answer to `game_over`: true to play again.
    Response(bool),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unknown reply: {0}")]
    Unknown(String),
    #[error("malformed move reply: {0}")]
    BadMove(String),
    #[error("malformed response: {0}")]
    BadResponse(String),
}

impl FromStr for Reply {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        if let Some(rest) = line.strip_prefix("SELECTED_MOVE") {
            let coords: Vec<u8> = rest.split_whitespace().map(|t| t.parse::<u8>()).collect::<Result<_, _>>()
                .map_err(|_| ProtocolError::BadMove(line.to_string()))?;
            return match coords[..] {
                [x1, y1, x2, y2] => Move::from_coords(x1, y1, x2, y2).map(Reply::SelectedMove).ok_or_else(|| ProtocolError::BadMove(line.to_string())),
                _ => Err(ProtocolError::BadMove(line.to_string())),
            };
        }
        if let Some(rest) = line.strip_prefix("RESPONSE:") {
            return match rest.trim() {
                "1" => Ok(Reply::Response(true)),
                "0" => Ok(Reply::Response(false)),
                _ => Err(ProtocolError::BadResponse(line.to_string())),
            };
        }
        Err(ProtocolError::Unknown(line.to_string()))
    }
}
