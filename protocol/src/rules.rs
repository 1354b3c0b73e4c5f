//! 规则能力抽象
//!
//! 提供 [`Rules`] trait 使上层（对局会话、走法回退）与具体规则引擎解耦。
//! [`StandardRules`] 是基于 shakmaty 的标准国际象棋实现。

use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Position as _};

use crate::error::ChessError;
use crate::moves::{MoveCode, VerboseMove};
use crate::position::{GameStatus, Position};

/// 规则能力接口
///
/// 合法走法枚举、走法应用、终局判定。
pub trait Rules: Send + Sync {
    /// 枚举局面的所有合法走法
    fn legal_moves(&self, position: &Position) -> Vec<VerboseMove>;

    /// 应用一步走法，返回新局面和结构化走法
    ///
    /// 局面不可变：原 `position` 保持不变。
    fn apply(&self, position: &Position, code: &MoveCode)
        -> Result<(Position, VerboseMove), ChessError>;

    /// 终局判定
    fn status(&self, position: &Position) -> GameStatus;
}

/// 标准国际象棋规则（shakmaty 实现）
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardRules;

impl StandardRules {
    fn verbose(chess: &Chess, m: &shakmaty::Move) -> VerboseMove {
        // UCI 编码同时给出规范化的起点/终点（王车易位规范为王的移动）
        let uci = m.to_uci(CastlingMode::Standard).to_string();
        let san = SanPlus::from_move(chess.clone(), m).to_string();
        VerboseMove {
            from: uci[..2].to_string(),
            to: uci[2..4].to_string(),
            promotion: uci.chars().nth(4),
            san,
        }
    }
}

impl Rules for StandardRules {
    fn legal_moves(&self, position: &Position) -> Vec<VerboseMove> {
        let chess = position.chess();
        chess
            .legal_moves()
            .iter()
            .map(|m| Self::verbose(chess, m))
            .collect()
    }

    fn apply(
        &self,
        position: &Position,
        code: &MoveCode,
    ) -> Result<(Position, VerboseMove), ChessError> {
        let chess = position.chess();
        let uci: UciMove = code.as_str().parse().map_err(|_| ChessError::InvalidMoveCode {
            input: code.as_str().to_string(),
        })?;
        let m = uci.to_move(chess).map_err(|_| ChessError::IllegalMove {
            mv: code.as_str().to_string(),
        })?;
        let verbose = Self::verbose(chess, &m);
        let next = chess.clone().play(&m).map_err(|_| ChessError::IllegalMove {
            mv: code.as_str().to_string(),
        })?;
        Ok((Position::from_chess(next), verbose))
    }

    fn status(&self, position: &Position) -> GameStatus {
        position.status()
    }
}
