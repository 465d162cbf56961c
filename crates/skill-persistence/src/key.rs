//! 分区键推导。

use skill_core::{PersistenceError, RequestEnvelope};

/// 从请求信封推导持久化分区键的策略。
///
/// # 教案式说明
/// - **意图 (Why)**：同一份持久属性可以按用户、设备或识别出的说话人隔离，策略决定“谁的数据”。
/// - **契约 (What)**：
///   - [`UserId`](Self::UserId)：取上下文用户，缺失时退回会话用户；
///   - [`DeviceId`](Self::DeviceId)：取上下文设备，缺失即失败；
///   - [`PersonId`](Self::PersonId)：优先取识别出的说话人，缺失时退回用户 ID；
///   - 推导失败返回 [`PersistenceError::KeyUnavailable`]，不产生空键。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartitionKeyGenerator {
    #[default]
    UserId,
    DeviceId,
    PersonId,
}

impl PartitionKeyGenerator {
    pub fn generate(self, envelope: &RequestEnvelope) -> Result<String, PersistenceError> {
        match self {
            Self::UserId => user_id(envelope),
            Self::DeviceId => envelope
                .context
                .system
                .device
                .as_ref()
                .map(|device| device.device_id.clone())
                .ok_or_else(|| PersistenceError::KeyUnavailable {
                    reason: "request envelope carries no device id".to_owned(),
                }),
            Self::PersonId => match envelope.context.system.person.as_ref() {
                Some(person) => Ok(person.person_id.clone()),
                None => user_id(envelope),
            },
        }
    }
}

fn user_id(envelope: &RequestEnvelope) -> Result<String, PersistenceError> {
    envelope
        .user()
        .map(|user| user.user_id.clone())
        .ok_or_else(|| PersistenceError::KeyUnavailable {
            reason: "request envelope carries no user id".to_owned(),
        })
}
