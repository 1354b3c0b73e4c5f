//! 局面表示
//!
//! [`Position`] 是对序列化棋盘状态（FEN）的不可变封装，
//! 规则由 shakmaty 提供，本库只消费不实现。
//! 应用一步走法会产出新的 `Position`，绝不原地修改。

use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position as _};

use crate::error::ChessError;

/// 标准开局 FEN
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// 走子方
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// 获取对方阵营
    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::White => write!(f, "white"),
            Side::Black => write!(f, "black"),
        }
    }
}

/// 终局状态
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GameStatus {
    /// 对局进行中
    Ongoing,
    /// 将杀
    Checkmate { winner: Side },
    /// 逼和（无子可动且未被将军）
    Stalemate,
    /// 和棋（子力不足）
    Draw,
}

impl GameStatus {
    /// 是否终局
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }
}

/// 不可变局面
#[derive(Clone, Debug)]
pub struct Position {
    chess: Chess,
}

impl Position {
    /// 标准开局局面
    pub fn initial() -> Self {
        Self {
            chess: Chess::default(),
        }
    }

    /// 从 FEN 字符串解析局面
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let setup: Fen = fen.parse().map_err(|e: shakmaty::fen::ParseFenError| {
            ChessError::InvalidFen {
                reason: e.to_string(),
            }
        })?;
        let chess = setup
            .into_position(CastlingMode::Standard)
            .map_err(|e: shakmaty::PositionError<Chess>| ChessError::InvalidFen {
                reason: e.to_string(),
            })?;
        Ok(Self { chess })
    }

    /// 序列化为 FEN 字符串
    pub fn fen(&self) -> String {
        Fen::from_position(self.chess.clone(), EnPassantMode::Legal).to_string()
    }

    /// 当前走子方（从局面推导，不硬编码）
    pub fn turn(&self) -> Side {
        Side::from(self.chess.turn())
    }

    /// 终局状态
    pub fn status(&self) -> GameStatus {
        if self.chess.legal_moves().is_empty() {
            if self.chess.is_checkmate() {
                GameStatus::Checkmate {
                    winner: self.turn().opponent(),
                }
            } else {
                GameStatus::Stalemate
            }
        } else if self.chess.is_insufficient_material() {
            GameStatus::Draw
        } else {
            GameStatus::Ongoing
        }
    }

    pub(crate) fn chess(&self) -> &Chess {
        &self.chess
    }

    pub(crate) fn from_chess(chess: Chess) -> Self {
        Self { chess }
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.fen() == other.fen()
    }
}

impl Eq for Position {}
