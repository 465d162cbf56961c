//! 进程内持久化适配器。

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use skill_core::{AttributeMap, PersistenceAdapter, PersistenceError, RequestEnvelope};
use tracing::trace;

use crate::key::PartitionKeyGenerator;

/// 以 `DashMap` 保存属性的持久化适配器。
///
/// # 教案式说明
/// - **意图 (Why)**：本地开发与测试不应依赖外部存储，但仍要走与真实后端相同的
///   “推导分区键 → 序列化 → 存取”路径，让分区键错误与数据损坏在本地就能暴露。
/// - **契约 (What)**：
///   - 值以 JSON 文档形式保存，读取时还原为 [`AttributeMap`]，文档不是对象时返回
///     [`PersistenceError::Malformed`]；
///   - 克隆共享同一张表，可在多个技能实例之间复用；
///   - 删除不存在的键不是错误。
#[derive(Debug, Clone, Default)]
pub struct InMemoryPersistenceAdapter {
    key_generator: PartitionKeyGenerator,
    table: Arc<DashMap<String, Value>>,
}

impl InMemoryPersistenceAdapter {
    #[must_use]
    pub fn new(key_generator: PartitionKeyGenerator) -> Self {
        Self {
            key_generator,
            table: Arc::new(DashMap::new()),
        }
    }

    pub fn key_generator(&self) -> PartitionKeyGenerator {
        self.key_generator
    }

    /// 直接按分区键读取原始文档，便于排障与断言。
    pub fn raw(&self, partition_key: &str) -> Option<Value> {
        self.table.get(partition_key).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl PersistenceAdapter for InMemoryPersistenceAdapter {
    fn get_attributes(
        &self,
        envelope: &RequestEnvelope,
    ) -> Result<Option<AttributeMap>, PersistenceError> {
        let key = self.key_generator.generate(envelope)?;
        let Some(document) = self.raw(&key) else {
            trace!(partition_key = %key, "no stored attributes");
            return Ok(None);
        };
        let attributes: AttributeMap = serde_json::from_value(document)?;
        Ok(Some(attributes))
    }

    fn save_attributes(
        &self,
        envelope: &RequestEnvelope,
        attributes: &AttributeMap,
    ) -> Result<(), PersistenceError> {
        let key = self.key_generator.generate(envelope)?;
        let document = serde_json::to_value(attributes)?;
        trace!(partition_key = %key, keys = attributes.len(), "storing attributes");
        self.table.insert(key, document);
        Ok(())
    }

    fn delete_attributes(&self, envelope: &RequestEnvelope) -> Result<(), PersistenceError> {
        let key = self.key_generator.generate(envelope)?;
        self.table.remove(&key);
        Ok(())
    }
}
