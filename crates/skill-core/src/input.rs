//! 单次分发的处理器输入。

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use skill_runtime::{SkillError, codes};
use skill_template::{LocaleSource, TemplateData, TemplateFactory};

use crate::attributes::AttributesManager;
use crate::model::{AttributeMap, Request, RequestEnvelope, Response};
use crate::persistence::PersistenceAdapter;
use crate::response_builder::ResponseBuilder;
use crate::service::ServiceClientFactory;

/// 技能使用的模板工厂类型。
pub type SkillTemplateFactory = dyn TemplateFactory<HandlerInput, Response>;

/// 处理器、拦截器与异常处理器共享的单次输入。
///
/// # 教案式说明
/// - **意图 (Why)**：一次事件的全部上下文（信封、宿主上下文、属性存储、服务工厂、响应构建器）
///   收拢在一个值里，以 `&mut` 依次借给流水线上的每个环节。
/// - **契约 (What)**：
///   - 每次分发新建一个，不复用，不在并发调用之间共享；
///   - 服务客户端工厂缺失时访问返回 [`codes::SERVICE_CLIENT_UNAVAILABLE`]；
///   - 模板工厂缺失时生成模板响应返回 [`codes::TEMPLATE_FACTORY_UNAVAILABLE`]。
pub struct HandlerInput {
    envelope: Arc<RequestEnvelope>,
    context: Option<Arc<dyn Any + Send + Sync>>,
    attributes: AttributesManager,
    service_client_factory: Option<ServiceClientFactory>,
    template_factory: Option<Arc<SkillTemplateFactory>>,
    response_builder: ResponseBuilder,
}

impl HandlerInput {
    pub fn builder(envelope: RequestEnvelope) -> HandlerInputBuilder {
        HandlerInputBuilder {
            envelope,
            context: None,
            persistence: None,
            service_client_factory: None,
            template_factory: None,
        }
    }

    pub fn request_envelope(&self) -> &RequestEnvelope {
        &self.envelope
    }

    pub fn request(&self) -> &Request {
        &self.envelope.request
    }

    /// 宿主传入的上下文，按具体类型取回。
    pub fn context<T: Any>(&self) -> Option<&T> {
        self.context.as_deref()?.downcast_ref::<T>()
    }

    pub fn attributes(&self) -> &AttributesManager {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributesManager {
        &mut self.attributes
    }

    pub fn service_client_factory(&self) -> Result<&ServiceClientFactory, SkillError> {
        self.service_client_factory.as_ref().ok_or_else(|| {
            SkillError::new(
                codes::SERVICE_CLIENT_UNAVAILABLE,
                "attempting to use service client factory with no configured API client",
            )
        })
    }

    pub fn response_builder(&mut self) -> &mut ResponseBuilder {
        &mut self.response_builder
    }

    /// 用配置的模板工厂生成响应。
    pub fn generate_template_response(
        &self,
        template_name: &str,
        data: &TemplateData,
    ) -> Result<Option<Response>, SkillError> {
        let factory = self.template_factory.as_ref().ok_or_else(|| {
            SkillError::new(
                codes::TEMPLATE_FACTORY_UNAVAILABLE,
                "attempting to generate a template response with no configured template factory",
            )
        })?;
        let response = factory.process_template(template_name, data, self)?;
        Ok(Some(response))
    }

    /// 分发结束后取出会话层，交还传输层回写。
    pub fn into_session_attributes(self) -> Option<AttributeMap> {
        self.attributes.into_session_attributes()
    }
}

impl LocaleSource for HandlerInput {
    fn locale(&self) -> Option<&str> {
        self.envelope.request.locale.as_deref()
    }
}

impl fmt::Debug for HandlerInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerInput")
            .field("request_id", &self.envelope.request.request_id)
            .field("request_type", &self.envelope.request.request_type)
            .field("attributes", &self.attributes)
            .field("has_service_client_factory", &self.service_client_factory.is_some())
            .finish_non_exhaustive()
    }
}

pub struct HandlerInputBuilder {
    envelope: RequestEnvelope,
    context: Option<Arc<dyn Any + Send + Sync>>,
    persistence: Option<Arc<dyn PersistenceAdapter>>,
    service_client_factory: Option<ServiceClientFactory>,
    template_factory: Option<Arc<SkillTemplateFactory>>,
}

impl HandlerInputBuilder {
    pub fn with_context(mut self, context: Option<Arc<dyn Any + Send + Sync>>) -> Self {
        self.context = context;
        self
    }

    pub fn with_persistence_adapter(
        mut self,
        adapter: Option<Arc<dyn PersistenceAdapter>>,
    ) -> Self {
        self.persistence = adapter;
        self
    }

    pub fn with_service_client_factory(mut self, factory: Option<ServiceClientFactory>) -> Self {
        self.service_client_factory = factory;
        self
    }

    pub fn with_template_factory(mut self, factory: Option<Arc<SkillTemplateFactory>>) -> Self {
        self.template_factory = factory;
        self
    }

    pub fn build(self) -> HandlerInput {
        let envelope = Arc::new(self.envelope);
        HandlerInput {
            attributes: AttributesManager::new(Arc::clone(&envelope), self.persistence),
            envelope,
            context: self.context,
            service_client_factory: self.service_client_factory,
            template_factory: self.template_factory,
            response_builder: ResponseBuilder::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct HostContext {
        deadline_ms: u64,
    }

    #[test]
    fn context_is_downcast_to_its_concrete_type() {
        let context: Arc<dyn Any + Send + Sync> = Arc::new(HostContext { deadline_ms: 800 });
        let envelope = RequestEnvelope::new(Request::new("LaunchRequest", "r-1"));
        let input = HandlerInput::builder(envelope)
            .with_context(Some(context))
            .build();
        assert_eq!(input.context::<HostContext>(), Some(&HostContext { deadline_ms: 800 }));
        assert!(input.context::<String>().is_none(), "类型不符时返回 None");
    }

    #[test]
    fn missing_collaborators_are_invalid_state() {
        let envelope = RequestEnvelope::new(Request::new("LaunchRequest", "r-1"));
        let input = HandlerInput::builder(envelope).build();
        let err = input.service_client_factory().expect_err("未配置 API 客户端");
        assert_eq!(err.code(), codes::SERVICE_CLIENT_UNAVAILABLE);
        assert!(err.is_invalid_state());
        let err = input
            .generate_template_response("welcome", &TemplateData::new())
            .expect_err("未配置模板工厂");
        assert_eq!(err.code(), codes::TEMPLATE_FACTORY_UNAVAILABLE);
    }
}
