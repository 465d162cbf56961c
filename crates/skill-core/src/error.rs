//! # error 模块说明
//!
//! 属性存储与持久化协作方的细粒度错误。二者都通过 `From` 归一为 [`SkillError`]，
//! 错误码分别落在 `attributes.*` 与 `persistence.*` 命名空间。

use skill_runtime::{ErrorCause, SkillError, codes};
use thiserror::Error;

/// 属性层前置条件被破坏。
///
/// # 教案式说明
/// - **意图 (Why)**：把“这次事件本就没有会话”与“技能没配置持久化”区分开，
///   前者通常是处理器逻辑错误，后者是装配错误。
/// - **契约 (What)**：两者都属于无效状态错误（[`SkillError::is_invalid_state`] 为真），但错误码不同。
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AttributesError {
    #[error("attempting to read session attributes from an out-of-session request")]
    SessionUnavailable,
    #[error("attempting to use persistent attributes without a configured persistence adapter")]
    PersistenceUnavailable,
}

impl From<AttributesError> for SkillError {
    fn from(error: AttributesError) -> Self {
        let code = match error {
            AttributesError::SessionUnavailable => codes::ATTRIBUTES_SESSION_UNAVAILABLE,
            AttributesError::PersistenceUnavailable => codes::ATTRIBUTES_PERSISTENCE_UNAVAILABLE,
        };
        SkillError::new(code, error.to_string()).with_cause(error)
    }
}

/// 持久化协作方的失败。从不重试，也从不吞掉。
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistenceError {
    /// 无法从信封推导分区键（例如缺少设备 ID）。
    #[error("cannot derive a partition key: {reason}")]
    KeyUnavailable { reason: String },
    /// 后端读写失败。
    #[error("persistence backend failed: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<ErrorCause>,
    },
    /// 存储的值无法还原为属性表。
    #[error("stored attributes are malformed")]
    Malformed(#[from] serde_json::Error),
}

impl PersistenceError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }
}

impl From<PersistenceError> for SkillError {
    fn from(error: PersistenceError) -> Self {
        let code = match error {
            PersistenceError::KeyUnavailable { .. } => codes::PERSISTENCE_KEY_UNAVAILABLE,
            PersistenceError::Backend { .. } | PersistenceError::Malformed(_) => {
                codes::PERSISTENCE_FAILURE
            }
        };
        SkillError::new(code, error.to_string()).with_cause(error)
    }
}
