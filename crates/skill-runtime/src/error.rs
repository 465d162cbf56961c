//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 分发路径上只流动一种错误：[`SkillError`]。处理器、拦截器、持久化协作方与模板子系统的失败
//!   都会在进入分发器之前归一为它，异常解析器据此做统一匹配；
//! - 构建期失败与请求期失败严格分离：前者是 [`ConfigurationError`]，只会出现在
//!   `DispatcherBuilder::build` 等装配入口，绝不会在单次请求中冒出。
//!
//! ## 设计要求（What）
//! - 错误码为 `'static` 字符串，遵循 `<域>.<语义>` 命名，集中登记在 [`codes`]；
//! - 下游 crate 的细粒度错误枚举通过 `From` 转换为 [`SkillError`]，并保留原始错误作为 `cause`，
//!   异常处理器可以用 [`SkillError::cause_as`] 精确识别根因。

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// 底层原因的统一装箱形态。
pub type ErrorCause = Box<dyn StdError + Send + Sync + 'static>;

/// 稳定错误码表。
///
/// 新增码值时保持 `<域>.<语义>` 形式，并确认 [`SkillError::is_invalid_state`] 的分类仍然正确。
pub mod codes {
    /// 处理器或拦截器的业务失败（无更具体分类时使用）。
    pub const HANDLER_FAILED: &str = "handler.failed";
    /// 分发时发现处理器形态与适配器不匹配。构建期校验通过后不应出现。
    pub const DISPATCH_ADAPTER_UNAVAILABLE: &str = "dispatch.adapter_unavailable";
    /// 请求信封中的技能 ID 与配置不一致。
    pub const DISPATCH_SKILL_ID_MISMATCH: &str = "dispatch.skill_id_mismatch";
    /// 在无会话的事件上访问会话属性。
    pub const ATTRIBUTES_SESSION_UNAVAILABLE: &str = "attributes.session_unavailable";
    /// 未配置持久化适配器时访问持久属性。
    pub const ATTRIBUTES_PERSISTENCE_UNAVAILABLE: &str = "attributes.persistence_unavailable";
    /// 持久化协作方读写失败。
    pub const PERSISTENCE_FAILURE: &str = "persistence.failure";
    /// 无法从请求信封推导分区键。
    pub const PERSISTENCE_KEY_UNAVAILABLE: &str = "persistence.key_unavailable";
    /// 未配置 API 客户端时访问服务客户端工厂。
    pub const SERVICE_CLIENT_UNAVAILABLE: &str = "service.client_unavailable";
    /// 服务调用失败。
    pub const SERVICE_CALL_FAILED: &str = "service.call_failed";
    /// 未配置模板工厂时请求模板响应。
    pub const TEMPLATE_FACTORY_UNAVAILABLE: &str = "template.factory_unavailable";
    /// 所有模板加载器都没有找到模板。
    pub const TEMPLATE_NOT_FOUND: &str = "template.not_found";
    /// 模板读取失败（I/O）。
    pub const TEMPLATE_LOAD_FAILED: &str = "template.load_failed";
    /// 模板渲染失败。
    pub const TEMPLATE_RENDER_FAILED: &str = "template.render_failed";
    /// 模板工厂装配不完整或 locale 非法。
    pub const TEMPLATE_INVALID: &str = "template.invalid";
}

/// 分发路径上的统一错误。
///
/// # 教案式说明
/// - **意图 (Why)**：异常解析器需要对“任意来源的失败”做匹配，统一结构让匹配条件只依赖错误码
///   与可选的根因类型，而不是字符串解析。
/// - **契约 (What)**：
///   - `code` 为稳定码值，`message` 面向排障人员；
///   - `cause` 保留下游原始错误，经 [`StdError::source`] 暴露；
///   - 满足 `Send + Sync + 'static`，可跨线程传播。
/// - **风险 (Trade-offs)**：消息使用 `Cow`，静态文案零分配，动态文案付出一次堆分配。
#[derive(Debug)]
pub struct SkillError {
    code: &'static str,
    message: Cow<'static, str>,
    cause: Option<ErrorCause>,
}

impl SkillError {
    /// 以稳定错误码与描述构造错误。
    ///
    /// ```rust
    /// use skill_runtime::{SkillError, codes};
    ///
    /// let err = SkillError::new(codes::HANDLER_FAILED, "weather backend timed out");
    /// assert_eq!(err.code(), codes::HANDLER_FAILED);
    /// assert!(err.cause().is_none());
    /// ```
    pub fn new(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    /// 处理器业务失败的便捷构造，错误码为 [`codes::HANDLER_FAILED`]。
    pub fn handler(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(codes::HANDLER_FAILED, message)
    }

    /// 附带底层原因。
    pub fn with_cause(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// 获取底层原因。
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// 将底层原因向下转型为具体错误类型。
    ///
    /// # 契约说明（What）
    /// - 仅检查直接原因，不遍历 `source()` 链；
    /// - 原因缺失或类型不符时返回 `None`。
    pub fn cause_as<T>(&self) -> Option<&T>
    where
        T: StdError + 'static,
    {
        self.cause.as_deref()?.downcast_ref::<T>()
    }

    /// 是否属于“前置条件被破坏”的无效状态错误。
    ///
    /// 无会话访问会话属性、无适配器访问持久属性、无 API 客户端访问服务工厂，三者共享这一分类，
    /// 但各自错误码不同，调用方可进一步区分。
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self.code,
            codes::ATTRIBUTES_SESSION_UNAVAILABLE
                | codes::ATTRIBUTES_PERSISTENCE_UNAVAILABLE
                | codes::SERVICE_CLIENT_UNAVAILABLE
                | codes::TEMPLATE_FACTORY_UNAVAILABLE
        )
    }
}

impl fmt::Display for SkillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl StdError for SkillError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// 装配期错误。
///
/// # 教案式说明
/// - **意图 (Why)**：配置问题（处理器无适配器、未注册任何处理器、配置文件非法）必须在启动阶段
///   暴露，而不是等到第一条线上请求。
/// - **契约 (What)**：只由构建器返回；分发路径从不产生该类型。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// 没有任何已配置的适配器支持该处理器形态。
    #[error("no handler adapter supports request handler `{handler}`")]
    UnsupportedHandler { handler: String },
    /// 技能至少需要一个请求处理器。
    #[error("at least one request handler must be registered")]
    NoRequestHandlers,
    /// 配置文本无法解析或取值越界。
    #[error("invalid settings: {reason}")]
    InvalidSettings { reason: String },
}
