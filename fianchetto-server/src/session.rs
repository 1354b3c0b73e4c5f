//! 对局会话
//!
//! 轮转状态机：人类走法应用 → 评估刷新 → 引擎走法获取 →
//! 引擎走法应用 → 评估刷新 → 等待下一次人类输入。
//! 会话由 [`SessionManager`] 按 ID 持有，没有任何全局状态。

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use protocol::{
    Evaluate, EvaluationResult, MoveCode, MoveError, Position, ProvideMove, Rules, Side,
    VerboseMove,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

/// 会话 ID
pub type SessionId = u64;

/// 会话状态
///
/// `HumanTurn` 以外的非终局状态都视为"一轮进行中"（busy），
/// 期间拒绝新的走法提交。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    HumanTurn,
    EvaluatingAfterHuman,
    EngineTurn,
    EvaluatingAfterEngine,
    Terminal,
}

/// 会话操作错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// 会话不存在
    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    /// 规则拒绝了走法，会话保持原状，调用方可重新提交
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    /// 一轮进行中，提交被直接拒绝（不排队）
    #[error("A turn is already in flight")]
    TurnInFlight,

    /// 对局已结束，只接受 reset
    #[error("Game is already over")]
    GameOver,

    /// 会话状态在一轮进行中被并发改变（如 reset），该轮中止
    #[error("Session state changed during turn")]
    StateConflict,

    /// 基础设施故障（引擎回复不可用），会话终止
    #[error("Engine fault: {0}")]
    EngineFault(String),
}

/// 会话视图（对外快照）
#[derive(Clone, Debug, Serialize)]
pub struct SessionView {
    pub id: SessionId,
    pub fen: String,
    pub turn: Side,
    pub state: SessionState,
    pub orientation: Side,
    pub history: Vec<String>,
    pub evaluation: Option<EvaluationResult>,
    pub fault: Option<String>,
}

/// 一轮的执行报告
#[derive(Clone, Debug, Serialize)]
pub struct TurnReport {
    /// 本轮引擎的回复走法（人类走法直接终局时为 None）
    pub engine_move: Option<VerboseMove>,
    #[serde(flatten)]
    pub session: SessionView,
}

/// 对局会话
///
/// 不变式：history 每接受一步恰好增长一条；position 始终等于
/// 从初始局面重放 history 的结果；只有状态转移这一条路径修改会话。
pub struct GameSession {
    id: SessionId,
    position: Position,
    history: Vec<String>,
    evaluation: Option<EvaluationResult>,
    orientation: Side,
    state: SessionState,
    fault: Option<String>,
}

impl GameSession {
    fn new(id: SessionId) -> Self {
        Self::with_position(id, Position::initial())
    }

    fn with_position(id: SessionId, position: Position) -> Self {
        Self {
            id,
            position,
            history: Vec::new(),
            evaluation: None,
            orientation: Side::White,
            state: SessionState::HumanTurn,
            fault: None,
        }
    }

    /// 是否有一轮在进行中
    pub fn busy(&self) -> bool {
        matches!(
            self.state,
            SessionState::EvaluatingAfterHuman
                | SessionState::EngineTurn
                | SessionState::EvaluatingAfterEngine
        )
    }

    /// 对外快照
    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            fen: self.position.fen(),
            turn: self.position.turn(),
            state: self.state,
            orientation: self.orientation,
            history: self.history.clone(),
            evaluation: self.evaluation.clone(),
            fault: self.fault.clone(),
        }
    }

    /// 回到初始局面，清空历史与评估（整体重置，绝不部分重置）
    pub fn reset(&mut self) {
        self.position = Position::initial();
        self.history.clear();
        self.evaluation = None;
        self.state = SessionState::HumanTurn;
        self.fault = None;
    }

    /// 翻转棋盘视角
    pub fn flip(&mut self) {
        self.orientation = self.orientation.opponent();
    }

    /// 应用人类走法并进入评估阶段
    ///
    /// 状态校验和应用在同一个临界区内完成（check-and-set），
    /// 两个并发提交不可能都观察到空闲状态。
    fn apply_human_move(
        &mut self,
        rules: &dyn Rules,
        code: &MoveCode,
    ) -> Result<Position, SessionError> {
        match self.state {
            SessionState::HumanTurn => {}
            SessionState::Terminal => return Err(SessionError::GameOver),
            _ => return Err(SessionError::TurnInFlight),
        }

        let (next, verbose) = rules
            .apply(&self.position, code)
            .map_err(|e| SessionError::IllegalMove(e.to_string()))?;

        self.history.push(verbose.san);
        self.position = next.clone();
        self.state = SessionState::EvaluatingAfterHuman;
        Ok(next)
    }

    /// 应用引擎回复（与人类走法同一条合法性路径）
    ///
    /// 非法或无法应用的回复是配置/基础设施故障而非用户错误：
    /// 会话转入 Terminal 并记录故障。
    fn apply_engine_reply(
        &mut self,
        rules: &dyn Rules,
        code: &MoveCode,
    ) -> Result<(Position, VerboseMove), SessionError> {
        if self.state != SessionState::EngineTurn {
            return Err(SessionError::StateConflict);
        }

        match rules.apply(&self.position, code) {
            Ok((next, verbose)) => {
                self.history.push(verbose.san.clone());
                self.position = next.clone();
                self.state = SessionState::EvaluatingAfterEngine;
                Ok((next, verbose))
            }
            Err(e) => {
                let reason = format!("engine replied with unusable move {}: {}", code, e);
                self.fail(reason.clone());
                Err(SessionError::EngineFault(reason))
            }
        }
    }

    /// 评估完成，按当前局面决定下一个状态
    ///
    /// `evaluation` 为 None 表示本次评估失败：记录已有缓存不变，
    /// 轮转照常继续（对局不因解释服务宕机而停滞）。
    fn evaluation_received(&mut self, rules: &dyn Rules, evaluation: Option<EvaluationResult>) {
        // 并发 reset 等已经改变了状态：本轮作废，不写入任何结果
        if !matches!(
            self.state,
            SessionState::EvaluatingAfterHuman | SessionState::EvaluatingAfterEngine
        ) {
            return;
        }

        if let Some(eval) = evaluation {
            self.evaluation = Some(eval);
        }

        let terminal = rules.status(&self.position).is_terminal();
        self.state = match self.state {
            SessionState::EvaluatingAfterHuman if terminal => SessionState::Terminal,
            SessionState::EvaluatingAfterHuman => SessionState::EngineTurn,
            SessionState::EvaluatingAfterEngine if terminal => SessionState::Terminal,
            _ => SessionState::HumanTurn,
        };
    }

    fn fail(&mut self, reason: String) {
        self.state = SessionState::Terminal;
        self.fault = Some(reason);
    }
}

/// 会话管理器
///
/// 按 ID 持有所有会话；锁只保护状态转移本身，
/// 上游调用期间不持锁。
pub struct SessionManager {
    rules: Arc<dyn Rules>,
    sessions: Mutex<HashMap<SessionId, GameSession>>,
    next_id: AtomicU64,
}

impl SessionManager {
    pub fn new(rules: Arc<dyn Rules>) -> Self {
        Self {
            rules,
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// 创建新会话（初始局面）
    pub fn create(&self) -> SessionView {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let session = GameSession::new(id);
        let view = session.view();
        self.sessions.lock().unwrap().insert(id, session);
        info!("session {} created", id);
        view
    }

    /// 获取会话快照
    pub fn view(&self, id: SessionId) -> Result<SessionView, SessionError> {
        self.with_session(id, |s| Ok(s.view()))
    }

    /// 重置会话
    pub fn reset(&self, id: SessionId) -> Result<SessionView, SessionError> {
        self.with_session(id, |s| {
            s.reset();
            Ok(s.view())
        })
    }

    /// 翻转会话棋盘视角
    pub fn flip(&self, id: SessionId) -> Result<SessionView, SessionError> {
        self.with_session(id, |s| {
            s.flip();
            Ok(s.view())
        })
    }

    /// 执行完整的一轮
    ///
    /// 顺序：应用人类走法 → 评估 → 引擎回复 → 应用回复 → 评估。
    /// 每次被接受的走法都对"走后"的局面恰好评估一次。
    pub async fn play_turn(
        &self,
        id: SessionId,
        code: &MoveCode,
        depth: u8,
        evaluator: &dyn Evaluate,
        engine: &dyn ProvideMove,
    ) -> Result<TurnReport, SessionError> {
        // 阶段 1：原子地校验状态并应用人类走法
        let after_human = self.with_session(id, |s| s.apply_human_move(self.rules.as_ref(), code))?;

        // 阶段 2：评估人类走法之后的局面
        let eval = Self::try_evaluate(evaluator, &after_human).await;
        let state = self.with_session(id, |s| {
            s.evaluation_received(self.rules.as_ref(), eval);
            Ok(s.state)
        })?;
        match state {
            SessionState::EngineTurn => {}
            SessionState::Terminal => return self.report(id, None),
            // 评估期间状态被并发改变（如 reset），该轮中止
            _ => return Err(SessionError::StateConflict),
        }

        // 阶段 3：获取引擎回复
        let engine_code = match engine.next_move(&after_human, depth).await {
            Ok(code) => code,
            Err(MoveError::NoLegalMoves) => {
                // 终局已在阶段 2 排除，走到这里说明不变式被破坏
                let reason =
                    "engine reported no legal moves on a non-terminal position".to_string();
                error!("session {}: {}", id, reason);
                self.with_session(id, |s| {
                    s.fail(reason.clone());
                    Ok(())
                })?;
                return Err(SessionError::EngineFault(reason));
            }
        };
        let (after_engine, verbose) =
            self.with_session(id, |s| s.apply_engine_reply(self.rules.as_ref(), &engine_code))?;

        // 阶段 4：评估引擎走法之后的局面
        let eval = Self::try_evaluate(evaluator, &after_engine).await;
        self.with_session(id, |s| {
            s.evaluation_received(self.rules.as_ref(), eval);
            Ok(())
        })?;

        self.report(id, Some(verbose))
    }

    async fn try_evaluate(
        evaluator: &dyn Evaluate,
        position: &Position,
    ) -> Option<EvaluationResult> {
        match evaluator.evaluate(position).await {
            Ok(eval) => Some(eval),
            Err(e) => {
                warn!("evaluation failed, keeping cached result: {}", e);
                None
            }
        }
    }

    fn report(
        &self,
        id: SessionId,
        engine_move: Option<VerboseMove>,
    ) -> Result<TurnReport, SessionError> {
        Ok(TurnReport {
            engine_move,
            session: self.view(id)?,
        })
    }

    fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut GameSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(&id)
            .ok_or(SessionError::UnknownSession(id))?;
        f(session)
    }

    #[cfg(test)]
    fn insert_for_test(&self, position: Position) -> SessionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.sessions
            .lock()
            .unwrap()
            .insert(id, GameSession::with_position(id, position));
        id
    }
}
