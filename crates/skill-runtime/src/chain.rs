//! 请求处理链：一个处理器加上只对它生效的拦截器与异常处理器。

use std::fmt;
use std::sync::Arc;

use crate::error::SkillError;
use crate::exception::{ExceptionHandler, first_claiming};
use crate::handler::HandlerShape;
use crate::interceptor::{RequestInterceptor, ResponseInterceptor};

/// 不可变的请求处理链。
///
/// # 教案式说明
/// - **意图 (Why)**：某些横切逻辑只对单个处理器有意义（如某个意图专用的槽位校验），
///   放在链上可以避免全局拦截器里堆满条件分支。
/// - **契约 (What)**：
///   - 构建后只读，所有并发分发共享同一实例；
///   - 链内任意环节失败时，先由链上的异常处理器尝试认领，未认领再交给全局解析器。
pub struct RequestHandlerChain<I, O> {
    handler: HandlerShape<I, O>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor<I>>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor<I, O>>>,
    exception_handlers: Vec<Arc<dyn ExceptionHandler<I, O>>>,
}

impl<I, O> RequestHandlerChain<I, O> {
    /// 只含处理器的链。
    pub fn new(handler: HandlerShape<I, O>) -> Self {
        Self::builder(handler).build()
    }

    pub fn builder(handler: HandlerShape<I, O>) -> RequestHandlerChainBuilder<I, O> {
        RequestHandlerChainBuilder {
            chain: Self {
                handler,
                request_interceptors: Vec::new(),
                response_interceptors: Vec::new(),
                exception_handlers: Vec::new(),
            },
        }
    }

    pub fn handler(&self) -> &HandlerShape<I, O> {
        &self.handler
    }

    pub fn request_interceptors(&self) -> &[Arc<dyn RequestInterceptor<I>>] {
        &self.request_interceptors
    }

    pub fn response_interceptors(&self) -> &[Arc<dyn ResponseInterceptor<I, O>>] {
        &self.response_interceptors
    }

    pub fn exception_handlers(&self) -> &[Arc<dyn ExceptionHandler<I, O>>] {
        &self.exception_handlers
    }

    /// 在链上的异常处理器中寻找首个认领者。
    pub fn resolve_exception(
        &self,
        input: &mut I,
        error: &SkillError,
    ) -> Option<&Arc<dyn ExceptionHandler<I, O>>> {
        first_claiming(&self.exception_handlers, input, error)
    }
}

impl<I, O> fmt::Debug for RequestHandlerChain<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandlerChain")
            .field("handler", &self.handler)
            .field("request_interceptors", &self.request_interceptors.len())
            .field("response_interceptors", &self.response_interceptors.len())
            .field("exception_handlers", &self.exception_handlers.len())
            .finish()
    }
}

/// [`RequestHandlerChain`] 的构建器，按调用顺序追加各列表。
pub struct RequestHandlerChainBuilder<I, O> {
    chain: RequestHandlerChain<I, O>,
}

impl<I, O> RequestHandlerChainBuilder<I, O> {
    pub fn with_request_interceptor(
        mut self,
        interceptor: impl RequestInterceptor<I> + 'static,
    ) -> Self {
        self.chain.request_interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn with_response_interceptor(
        mut self,
        interceptor: impl ResponseInterceptor<I, O> + 'static,
    ) -> Self {
        self.chain.response_interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn with_exception_handler(
        mut self,
        handler: impl ExceptionHandler<I, O> + 'static,
    ) -> Self {
        self.chain.exception_handlers.push(Arc::new(handler));
        self
    }

    pub fn build(self) -> RequestHandlerChain<I, O> {
        self.chain
    }
}
