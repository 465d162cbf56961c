//! 分层属性存储。
//!
//! | 层 | 存在条件 | 生命周期 | 落盘 |
//! |----|----------|----------|------|
//! | request | 总是 | 单次分发 | 否 |
//! | session | 事件带会话 | 随会话由传输层回写 | 否 |
//! | persistent | 配置了持久化适配器 | 跨会话 | 显式保存 |

use std::sync::Arc;

use skill_runtime::SkillError;
use tracing::debug;

use crate::error::AttributesError;
use crate::model::{AttributeMap, RequestEnvelope};
use crate::persistence::PersistenceAdapter;

/// 单次事件的属性存储。
///
/// # 教案式说明
/// - **意图 (Why)**：处理器与拦截器通过同一入口读写三层状态，持久层的 I/O 时机由存储统一把控。
/// - **契约 (What)**：
///   - 无会话事件上读写会话层返回 [`AttributesError::SessionUnavailable`]；
///   - 未配置适配器时访问持久层返回 [`AttributesError::PersistenceUnavailable`]；
///   - 持久层首次读取触发恰好一次拉取，之后复用内存值；整体设置不触发拉取；
///   - 保存只在本次分发中读取或设置过持久层时才写回，未使用的持久层不产生任何 I/O；
///   - 删除会请求协作方移除存储值，并清空内存值与已加载标记。
/// - **执行逻辑 (How)**：持久层以 `persistent_loaded` 布尔值与缓存的表并存，
///   而不是用“空表”隐式表示未加载。
pub struct AttributesManager {
    envelope: Arc<RequestEnvelope>,
    request: AttributeMap,
    session: Option<AttributeMap>,
    persistence: Option<Arc<dyn PersistenceAdapter>>,
    persistent: AttributeMap,
    persistent_loaded: bool,
}

impl AttributesManager {
    pub fn new(
        envelope: Arc<RequestEnvelope>,
        persistence: Option<Arc<dyn PersistenceAdapter>>,
    ) -> Self {
        let session = envelope
            .session
            .as_ref()
            .map(|session| session.attributes.clone().unwrap_or_default());
        Self {
            envelope,
            request: AttributeMap::new(),
            session,
            persistence,
            persistent: AttributeMap::new(),
            persistent_loaded: false,
        }
    }

    pub fn request_attributes(&self) -> &AttributeMap {
        &self.request
    }

    pub fn request_attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.request
    }

    pub fn set_request_attributes(&mut self, attributes: AttributeMap) {
        self.request = attributes;
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_attributes(&self) -> Result<&AttributeMap, SkillError> {
        self.session
            .as_ref()
            .ok_or_else(|| AttributesError::SessionUnavailable.into())
    }

    pub fn session_attributes_mut(&mut self) -> Result<&mut AttributeMap, SkillError> {
        self.session
            .as_mut()
            .ok_or_else(|| AttributesError::SessionUnavailable.into())
    }

    pub fn set_session_attributes(&mut self, attributes: AttributeMap) -> Result<(), SkillError> {
        let session = self.session_attributes_mut()?;
        *session = attributes;
        Ok(())
    }

    /// 读取持久层，首次调用时向协作方拉取。
    pub fn persistent_attributes(&mut self) -> Result<&AttributeMap, SkillError> {
        self.load_persistent()?;
        Ok(&self.persistent)
    }

    /// 可变访问持久层。与读取共享同一次拉取。
    pub fn persistent_attributes_mut(&mut self) -> Result<&mut AttributeMap, SkillError> {
        self.load_persistent()?;
        Ok(&mut self.persistent)
    }

    /// 整体替换持久层并标记为已加载，不触发拉取。
    pub fn set_persistent_attributes(
        &mut self,
        attributes: AttributeMap,
    ) -> Result<(), SkillError> {
        self.adapter()?;
        self.persistent = attributes;
        self.persistent_loaded = true;
        Ok(())
    }

    /// 本次分发中持久层是否已被读取或设置。
    pub fn is_persistent_loaded(&self) -> bool {
        self.persistent_loaded
    }

    /// 写回持久层。未读取也未设置时直接返回，不产生 I/O。
    pub fn save_persistent_attributes(&mut self) -> Result<(), SkillError> {
        let adapter = self.adapter()?;
        if !self.persistent_loaded {
            debug!(
                request_id = %self.envelope.request.request_id,
                "persistent attributes untouched, skipping save"
            );
            return Ok(());
        }
        adapter.save_attributes(&self.envelope, &self.persistent)?;
        debug!(
            request_id = %self.envelope.request.request_id,
            keys = self.persistent.len(),
            "persistent attributes saved"
        );
        Ok(())
    }

    /// 请求协作方删除存储值，并重置内存中的持久层。
    pub fn delete_persistent_attributes(&mut self) -> Result<(), SkillError> {
        let adapter = self.adapter()?;
        adapter.delete_attributes(&self.envelope)?;
        self.persistent.clear();
        self.persistent_loaded = false;
        debug!(request_id = %self.envelope.request.request_id, "persistent attributes deleted");
        Ok(())
    }

    /// 取出会话层供传输层回写；无会话时为 `None`。
    pub fn into_session_attributes(self) -> Option<AttributeMap> {
        self.session
    }

    fn adapter(&self) -> Result<Arc<dyn PersistenceAdapter>, SkillError> {
        self.persistence
            .clone()
            .ok_or_else(|| AttributesError::PersistenceUnavailable.into())
    }

    fn load_persistent(&mut self) -> Result<(), SkillError> {
        let adapter = self.adapter()?;
        if self.persistent_loaded {
            return Ok(());
        }
        self.persistent = adapter.get_attributes(&self.envelope)?.unwrap_or_default();
        self.persistent_loaded = true;
        debug!(
            request_id = %self.envelope.request.request_id,
            keys = self.persistent.len(),
            "persistent attributes fetched"
        );
        Ok(())
    }
}

impl std::fmt::Debug for AttributesManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributesManager")
            .field("request", &self.request)
            .field("session", &self.session)
            .field("has_persistence", &self.persistence.is_some())
            .field("persistent_loaded", &self.persistent_loaded)
            .finish_non_exhaustive()
    }
}
