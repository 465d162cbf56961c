//! 技能门面：一次事件从信封进、信封出。

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use skill_runtime::{Dispatcher, SkillError, codes};
use tracing::{debug, warn};

use crate::builder::SkillBuilder;
use crate::input::{HandlerInput, SkillTemplateFactory};
use crate::model::{RequestEnvelope, Response, ResponseEnvelope};
use crate::persistence::PersistenceAdapter;
use crate::service::{ApiClient, ServiceClientFactory};

/// 出站信封的协议版本。
pub const RESPONSE_VERSION: &str = "1.0";

/// 框架自身的 User-Agent 前缀。
pub fn user_agent(custom: Option<&str>) -> String {
    let base = format!("skill-sdk-rust/{}", env!("CARGO_PKG_VERSION"));
    match custom {
        Some(custom) => format!("{base} {custom}"),
        None => base,
    }
}

/// 已装配完成的技能。
///
/// # 教案式说明
/// - **意图 (Why)**：传输层只需要“给信封，拿信封”；输入构建、分发与会话回写都在这里完成。
/// - **契约 (What)**：
///   - 只读，可在线程间共享并发调用 [`invoke`](Self::invoke)；
///   - 配置了技能 ID 时，信封中的技能 ID 必须一致，否则返回
///     [`codes::DISPATCH_SKILL_ID_MISMATCH`] 且不进行分发；
///   - 出站信封只在入站事件带会话时携带会话属性。
/// - **执行逻辑 (How)**：
///   1. 校验技能 ID；
///   2. 若配置了 API 客户端且信封带有 API 端点，为本次事件构建服务客户端工厂；
///   3. 新建 [`HandlerInput`] 并分发；
///   4. 取回会话层，组装 [`ResponseEnvelope`]。
pub struct Skill {
    dispatcher: Dispatcher<HandlerInput, Response>,
    persistence: Option<Arc<dyn PersistenceAdapter>>,
    api_client: Option<Arc<dyn ApiClient>>,
    template_factory: Option<Arc<SkillTemplateFactory>>,
    skill_id: Option<String>,
    user_agent: String,
}

impl Skill {
    pub fn builder() -> SkillBuilder {
        SkillBuilder::new()
    }

    pub(crate) fn from_parts(
        dispatcher: Dispatcher<HandlerInput, Response>,
        persistence: Option<Arc<dyn PersistenceAdapter>>,
        api_client: Option<Arc<dyn ApiClient>>,
        template_factory: Option<Arc<SkillTemplateFactory>>,
        skill_id: Option<String>,
        custom_user_agent: Option<&str>,
    ) -> Self {
        Self {
            dispatcher,
            persistence,
            api_client,
            template_factory,
            skill_id,
            user_agent: user_agent(custom_user_agent),
        }
    }

    pub fn skill_id(&self) -> Option<&str> {
        self.skill_id.as_deref()
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn invoke(
        &self,
        envelope: RequestEnvelope,
        context: Option<Arc<dyn Any + Send + Sync>>,
    ) -> Result<ResponseEnvelope, SkillError> {
        if let Some(expected) = self.skill_id.as_deref() {
            let actual = envelope.application_id();
            if actual != Some(expected) {
                warn!(expected, actual = ?actual, "skill id mismatch, rejecting request");
                return Err(SkillError::new(
                    codes::DISPATCH_SKILL_ID_MISMATCH,
                    format!(
                        "request targets skill `{}`, expected `{expected}`",
                        actual.unwrap_or("<none>")
                    ),
                ));
            }
        }

        debug!(
            request_id = %envelope.request.request_id,
            request_type = %envelope.request.request_type,
            "invoking skill"
        );
        let service_client_factory = self.service_client_factory(&envelope);
        let mut input = HandlerInput::builder(envelope)
            .with_context(context)
            .with_persistence_adapter(self.persistence.clone())
            .with_service_client_factory(service_client_factory)
            .with_template_factory(self.template_factory.clone())
            .build();

        let response = self.dispatcher.dispatch(&mut input)?;

        Ok(ResponseEnvelope {
            version: RESPONSE_VERSION.to_owned(),
            session_attributes: input.into_session_attributes(),
            user_agent: self.user_agent.clone(),
            response,
        })
    }

    fn service_client_factory(&self, envelope: &RequestEnvelope) -> Option<ServiceClientFactory> {
        let client = self.api_client.as_ref()?;
        let system = &envelope.context.system;
        let endpoint = system.api_endpoint.as_deref()?;
        Some(ServiceClientFactory::new(
            endpoint,
            system.api_access_token.clone().unwrap_or_default(),
            Arc::clone(client),
        ))
    }
}

impl fmt::Debug for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Skill")
            .field("skill_id", &self.skill_id)
            .field("user_agent", &self.user_agent)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_appends_custom_suffix() {
        assert!(user_agent(None).starts_with("skill-sdk-rust/"));
        assert!(user_agent(Some("demo/1.0")).ends_with(" demo/1.0"));
    }
}
