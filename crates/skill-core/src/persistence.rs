//! 持久化协作方契约。

use crate::error::PersistenceError;
use crate::model::{AttributeMap, RequestEnvelope};

/// 持久属性的外部存储。
///
/// # 教案式说明
/// - **意图 (Why)**：属性存储只负责“何时读写”，“存到哪里、按什么键”交给协作方；
///   分区键通常由信封中的用户或设备 ID 推导。
/// - **契约 (What)**：
///   - `get_attributes` 返回 `None` 表示尚无存储值，属性层会以空表起步；
///   - 任何错误都原样上抛，进入分发器的异常路径；
///   - 实现需为 `Send + Sync`，同一实例服务所有并发请求。
pub trait PersistenceAdapter: Send + Sync {
    fn get_attributes(
        &self,
        envelope: &RequestEnvelope,
    ) -> Result<Option<AttributeMap>, PersistenceError>;

    fn save_attributes(
        &self,
        envelope: &RequestEnvelope,
        attributes: &AttributeMap,
    ) -> Result<(), PersistenceError>;

    fn delete_attributes(&self, envelope: &RequestEnvelope) -> Result<(), PersistenceError>;
}
