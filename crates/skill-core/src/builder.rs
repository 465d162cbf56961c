//! 技能装配。

use std::borrow::Cow;
use std::sync::Arc;

use skill_runtime::{
    ConfigurationError, DefaultExceptionMapper, DefaultRequestMapper, Dispatcher, DispatcherBuilder,
    ExceptionHandler, FunctionalHandler, HandlerAdapter, HandlerShape, RequestHandler,
    RequestHandlerChain, RequestInterceptor, ResponseInterceptor, SkillError,
};
use skill_template::{
    BaseTemplateFactory, BoundedTemplateCache, JsonTemplateRenderer, LocalTemplateFileLoader,
    TemplateCache,
};
use tracing::debug;

use crate::config::SkillSettings;
use crate::input::{HandlerInput, SkillTemplateFactory};
use crate::model::Response;
use crate::persistence::PersistenceAdapter;
use crate::predicates::Predicate;
use crate::service::ApiClient;
use crate::skill::Skill;

/// 技能构建器。
///
/// # 教案式说明
/// - **意图 (Why)**：把处理器、拦截器、协作方与设置收集起来，一次性生成只读的 [`Skill`]。
/// - **契约 (What)**：
///   - 请求处理器按注册顺序组成一个默认映射器，首个命中者胜出；
///   - 异常处理器按注册顺序组成一个默认异常映射器；
///   - 至少需要一个请求处理器，否则返回 [`ConfigurationError::NoRequestHandlers`]；
///   - 设置中提供了模板目录且未显式设置模板工厂时，自动装配本地文件加载器
///     （缓存按设置中的容量与存活时间构建）与 JSON 渲染器。
pub struct SkillBuilder {
    chains: Vec<RequestHandlerChain<HandlerInput, Response>>,
    exception_mapper: DefaultExceptionMapper<HandlerInput, Response>,
    dispatcher: DispatcherBuilder<HandlerInput, Response>,
    persistence: Option<Arc<dyn PersistenceAdapter>>,
    api_client: Option<Arc<dyn ApiClient>>,
    template_factory: Option<Arc<SkillTemplateFactory>>,
    settings: SkillSettings,
}

impl SkillBuilder {
    pub fn new() -> Self {
        Self {
            chains: Vec::new(),
            exception_mapper: DefaultExceptionMapper::default(),
            dispatcher: Dispatcher::builder(),
            persistence: None,
            api_client: None,
            template_factory: None,
            settings: SkillSettings::default(),
        }
    }

    pub fn add_request_handler(
        mut self,
        handler: impl RequestHandler<HandlerInput, Response> + 'static,
    ) -> Self {
        self.chains.push(RequestHandlerChain::new(HandlerShape::typed(handler)));
        self
    }

    /// 以谓词和闭包注册处理器。
    pub fn add_request_handler_fn<H>(
        mut self,
        name: impl Into<Cow<'static, str>>,
        predicate: Predicate,
        handle: H,
    ) -> Self
    where
        H: Fn(&mut HandlerInput) -> Result<Option<Response>, SkillError> + Send + Sync + 'static,
    {
        let handler = FunctionalHandler::new(
            name,
            move |input: &mut HandlerInput| predicate.test(input),
            handle,
        );
        self.chains.push(RequestHandlerChain::new(HandlerShape::functional(handler)));
        self
    }

    /// 注册带局部拦截器或异常处理器的完整处理链。
    pub fn add_request_handler_chain(
        mut self,
        chain: RequestHandlerChain<HandlerInput, Response>,
    ) -> Self {
        self.chains.push(chain);
        self
    }

    pub fn add_exception_handler(
        mut self,
        handler: impl ExceptionHandler<HandlerInput, Response> + 'static,
    ) -> Self {
        self.exception_mapper = self.exception_mapper.with_handler(handler);
        self
    }

    pub fn add_request_interceptor(
        mut self,
        interceptor: impl RequestInterceptor<HandlerInput> + 'static,
    ) -> Self {
        self.dispatcher = self.dispatcher.with_request_interceptor(interceptor);
        self
    }

    pub fn add_response_interceptor(
        mut self,
        interceptor: impl ResponseInterceptor<HandlerInput, Response> + 'static,
    ) -> Self {
        self.dispatcher = self.dispatcher.with_response_interceptor(interceptor);
        self
    }

    /// 限定可用的适配器及其顺序；不调用时使用全部适配器。
    pub fn with_handler_adapter(mut self, adapter: HandlerAdapter) -> Self {
        self.dispatcher = self.dispatcher.with_handler_adapter(adapter);
        self
    }

    pub fn with_persistence_adapter(mut self, adapter: Arc<dyn PersistenceAdapter>) -> Self {
        self.persistence = Some(adapter);
        self
    }

    pub fn with_api_client(mut self, client: Arc<dyn ApiClient>) -> Self {
        self.api_client = Some(client);
        self
    }

    pub fn with_template_factory(mut self, factory: Arc<SkillTemplateFactory>) -> Self {
        self.template_factory = Some(factory);
        self
    }

    pub fn with_skill_id(mut self, skill_id: impl Into<String>) -> Self {
        self.settings.skill_id = Some(skill_id.into());
        self
    }

    pub fn with_custom_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.settings.custom_user_agent = Some(user_agent.into());
        self
    }

    /// 整体应用设置，覆盖此前的技能 ID 与 User-Agent。
    pub fn with_settings(mut self, settings: SkillSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Result<Skill, ConfigurationError> {
        if self.chains.is_empty() {
            return Err(ConfigurationError::NoRequestHandlers);
        }

        let template_factory = match self.template_factory {
            Some(factory) => Some(factory),
            None => template_factory_from(&self.settings)?,
        };

        let handler_count = self.chains.len();
        let dispatcher = self
            .dispatcher
            .with_request_mapper(DefaultRequestMapper::new(self.chains))
            .with_exception_mapper(self.exception_mapper)
            .build()?;
        debug!(handlers = handler_count, "skill assembled");

        Ok(Skill::from_parts(
            dispatcher,
            self.persistence,
            self.api_client,
            template_factory,
            self.settings.skill_id,
            self.settings.custom_user_agent.as_deref(),
        ))
    }
}

impl Default for SkillBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn template_factory_from(
    settings: &SkillSettings,
) -> Result<Option<Arc<SkillTemplateFactory>>, ConfigurationError> {
    let Some(directory) = settings.template_directory.as_ref() else {
        return Ok(None);
    };
    let cache: Arc<dyn TemplateCache> =
        Arc::new(BoundedTemplateCache::new(settings.template_cache));
    let factory = BaseTemplateFactory::<HandlerInput, Response>::builder()
        .with_loader(
            LocalTemplateFileLoader::new(directory, settings.template_extension.clone())
                .with_cache(cache),
        )
        .with_renderer(JsonTemplateRenderer::new())
        .build()
        .map_err(|error| ConfigurationError::InvalidSettings {
            reason: error.to_string(),
        })?;
    let factory: Arc<SkillTemplateFactory> = Arc::new(factory);
    Ok(Some(factory))
}
