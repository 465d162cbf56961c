//! 分发器：把一次输入驱动过拦截、解析、调用与异常恢复的完整流程。
//!
//! # 状态机
//! ```text
//! RunningInterceptorsAndHandler
//!   ├─ 成功 → RunningResponseInterceptors → 完成
//!   └─ 失败 → ResolvingExceptionHandler
//!               ├─ 命中 → RunningExceptionHandler → 完成
//!               └─ 未命中 → 原样返回错误
//! ```
//! 异常处理器自身的失败，以及随后全局响应拦截器的失败，都直接返回给调用方。

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, trace, warn};

use crate::adapter::HandlerAdapter;
use crate::chain::RequestHandlerChain;
use crate::error::{ConfigurationError, SkillError, codes};
use crate::exception::{
    DefaultExceptionMapper, ExceptionHandler, ExceptionMapper, ExceptionResolver,
};
use crate::interceptor::{
    RequestInterceptor, ResponseInterceptor, run_request_interceptors, run_response_interceptors,
};
use crate::mapper::{RequestMapper, RequestResolver};

/// 单次分发所处的阶段，仅用于日志字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    RunningInterceptorsAndHandler,
    RunningResponseInterceptors,
    ResolvingExceptionHandler,
    RunningExceptionHandler,
}

impl DispatchPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RunningInterceptorsAndHandler => "interceptors_and_handler",
            Self::RunningResponseInterceptors => "response_interceptors",
            Self::ResolvingExceptionHandler => "resolving_exception_handler",
            Self::RunningExceptionHandler => "exception_handler",
        }
    }
}

impl fmt::Display for DispatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 请求分发器。
///
/// # 教案式说明
/// - **意图 (Why)**：对任意输入类型 `I` 与输出类型 `O` 提供统一的“拦截 → 解析 → 调用 → 恢复”流程，
///   具体的请求模型由上层 crate 决定。
/// - **契约 (What)**：
///   - 构建完成后只读，可被多线程共享并发调用 [`dispatch`](Self::dispatch)；
///   - 每次调用独占自己的 `&mut I`；
///   - 解析未命中返回 `Ok(None)`；只有未被任何异常处理器认领的错误才会以 `Err` 返回，且是原始错误；
///   - 分发器本身不做 I/O，也不重试。
/// - **执行逻辑 (How)**：
///   1. 全局请求拦截器；
///   2. 请求解析器挑选处理链；
///   3. 链上请求拦截器 → 适配器调用处理器 → 链上响应拦截器；
///   4. 全局响应拦截器；
///   5. 任一步失败时进入异常恢复：链内失败先问链上异常处理器，再问全局异常解析器。
pub struct Dispatcher<I, O> {
    request_resolver: RequestResolver<I, O>,
    exception_resolver: ExceptionResolver<I, O>,
    adapters: Vec<HandlerAdapter>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor<I>>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor<I, O>>>,
}

impl<I, O> Dispatcher<I, O> {
    pub fn builder() -> DispatcherBuilder<I, O> {
        DispatcherBuilder::default()
    }

    pub fn adapters(&self) -> &[HandlerAdapter] {
        &self.adapters
    }

    /// 分发一次输入。
    pub fn dispatch(&self, input: &mut I) -> Result<Option<O>, SkillError> {
        if let Err(error) = run_request_interceptors(&self.request_interceptors, input) {
            return self.recover(
                input,
                None,
                DispatchPhase::RunningInterceptorsAndHandler,
                error,
            );
        }

        let chain = match self.request_resolver.resolve(input) {
            Ok(Some(chain)) => chain,
            Ok(None) => {
                warn!("no request handler chain matched the input");
                return Ok(None);
            }
            Err(error) => {
                return self.recover(
                    input,
                    None,
                    DispatchPhase::RunningInterceptorsAndHandler,
                    error,
                );
            }
        };
        debug!(handler = chain.handler().name(), "request handler chain matched");

        let output = match self.run_chain(chain, input) {
            Ok(output) => output,
            Err(error) => {
                return self.recover(
                    input,
                    Some(chain),
                    DispatchPhase::RunningInterceptorsAndHandler,
                    error,
                );
            }
        };

        match run_response_interceptors(&self.response_interceptors, input, output) {
            Ok(output) => Ok(output),
            Err(error) => {
                self.recover(input, None, DispatchPhase::RunningResponseInterceptors, error)
            }
        }
    }

    fn run_chain(
        &self,
        chain: &RequestHandlerChain<I, O>,
        input: &mut I,
    ) -> Result<Option<O>, SkillError> {
        run_request_interceptors(chain.request_interceptors(), input)?;

        let handler = chain.handler();
        let adapter = self
            .adapters
            .iter()
            .copied()
            .find(|adapter| adapter.supports(handler))
            .ok_or_else(|| {
                SkillError::new(
                    codes::DISPATCH_ADAPTER_UNAVAILABLE,
                    format!("no adapter supports handler `{}`", handler.name()),
                )
            })?;
        trace!(adapter = adapter.name(), handler = handler.name(), "invoking handler");
        let output = adapter.execute(input, handler)?;

        run_response_interceptors(chain.response_interceptors(), input, output)
    }

    fn recover(
        &self,
        input: &mut I,
        chain: Option<&RequestHandlerChain<I, O>>,
        failed_in: DispatchPhase,
        error: SkillError,
    ) -> Result<Option<O>, SkillError> {
        trace!(
            phase = %DispatchPhase::ResolvingExceptionHandler,
            failed_in = %failed_in,
            code = error.code(),
            "resolving exception handler"
        );
        let chain_local = chain.and_then(|chain| chain.resolve_exception(input, &error));
        let handler = match chain_local {
            Some(handler) => handler,
            None => match self.exception_resolver.resolve(input, &error) {
                Some(handler) => handler,
                None => {
                    error!(
                        failed_in = %failed_in,
                        code = error.code(),
                        error = %error,
                        "no exception handler claimed the error"
                    );
                    return Err(error);
                }
            },
        };

        debug!(
            phase = %DispatchPhase::RunningExceptionHandler,
            handler = handler.name(),
            code = error.code(),
            "exception handler claimed the error"
        );
        let output = handler.handle(input, &error)?;
        run_response_interceptors(&self.response_interceptors, input, output)
    }
}

impl<I, O> fmt::Debug for Dispatcher<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("request_mappers", &self.request_resolver.mappers().len())
            .field("adapters", &self.adapters)
            .field("request_interceptors", &self.request_interceptors.len())
            .field("response_interceptors", &self.response_interceptors.len())
            .finish_non_exhaustive()
    }
}

/// [`Dispatcher`] 构建器。
///
/// # 契约说明（What）
/// - 所有列表保持追加顺序；
/// - 未配置适配器时使用 [`HandlerAdapter::DEFAULT_ORDER`]；
/// - [`build`](Self::build) 对每条处理链检查是否存在支持它的适配器，缺失即返回
///   [`ConfigurationError::UnsupportedHandler`]。
pub struct DispatcherBuilder<I, O> {
    request_mappers: Vec<Arc<dyn RequestMapper<I, O>>>,
    exception_mappers: Vec<Arc<dyn ExceptionMapper<I, O>>>,
    adapters: Vec<HandlerAdapter>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor<I>>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor<I, O>>>,
}

impl<I, O> Default for DispatcherBuilder<I, O> {
    fn default() -> Self {
        Self {
            request_mappers: Vec::new(),
            exception_mappers: Vec::new(),
            adapters: Vec::new(),
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
        }
    }
}

impl<I, O> DispatcherBuilder<I, O> {
    pub fn with_request_mapper(mut self, mapper: impl RequestMapper<I, O> + 'static) -> Self {
        self.request_mappers.push(Arc::new(mapper));
        self
    }

    pub fn with_exception_mapper(mut self, mapper: impl ExceptionMapper<I, O> + 'static) -> Self {
        self.exception_mappers.push(Arc::new(mapper));
        self
    }

    /// 以单个异常处理器追加一个独立的异常映射器。
    pub fn with_exception_handler(self, handler: impl ExceptionHandler<I, O> + 'static) -> Self
    where
        I: 'static,
        O: 'static,
    {
        let handler: Arc<dyn ExceptionHandler<I, O>> = Arc::new(handler);
        self.with_exception_mapper(DefaultExceptionMapper::new(vec![handler]))
    }

    pub fn with_handler_adapter(mut self, adapter: HandlerAdapter) -> Self {
        self.adapters.push(adapter);
        self
    }

    pub fn with_request_interceptor(
        mut self,
        interceptor: impl RequestInterceptor<I> + 'static,
    ) -> Self {
        self.request_interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn with_response_interceptor(
        mut self,
        interceptor: impl ResponseInterceptor<I, O> + 'static,
    ) -> Self {
        self.response_interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn build(self) -> Result<Dispatcher<I, O>, ConfigurationError> {
        let adapters = if self.adapters.is_empty() {
            HandlerAdapter::DEFAULT_ORDER.to_vec()
        } else {
            self.adapters
        };

        for mapper in &self.request_mappers {
            for chain in mapper.handler_chains() {
                let handler = chain.handler();
                if !adapters.iter().any(|adapter| adapter.supports(handler)) {
                    return Err(ConfigurationError::UnsupportedHandler {
                        handler: handler.name().to_owned(),
                    });
                }
            }
        }

        Ok(Dispatcher {
            request_resolver: RequestResolver::new(self.request_mappers),
            exception_resolver: ExceptionResolver::new(self.exception_mappers),
            adapters,
            request_interceptors: self.request_interceptors,
            response_interceptors: self.response_interceptors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::FunctionalExceptionHandler;
    use crate::handler::{FunctionalHandler, HandlerShape};
    use crate::mapper::DefaultRequestMapper;

    fn echo() -> RequestHandlerChain<String, String> {
        RequestHandlerChain::new(HandlerShape::functional(FunctionalHandler::new(
            "echo",
            |_: &mut String| -> Result<bool, SkillError> { Ok(true) },
            |input: &mut String| -> Result<Option<String>, SkillError> { Ok(Some(input.clone())) },
        )))
    }

    #[test]
    fn build_rejects_handler_without_adapter() {
        let err = Dispatcher::<String, String>::builder()
            .with_request_mapper(DefaultRequestMapper::default().with_chain(echo()))
            .with_handler_adapter(HandlerAdapter::Typed)
            .build()
            .expect_err("闭包处理器缺少适配器时构建应失败");
        assert_eq!(
            err,
            ConfigurationError::UnsupportedHandler {
                handler: "echo".to_owned()
            }
        );
    }

    #[test]
    fn default_adapters_cover_all_shapes() {
        let dispatcher = Dispatcher::<String, String>::builder()
            .with_request_mapper(DefaultRequestMapper::default().with_chain(echo()))
            .build()
            .expect("默认适配器应覆盖全部形态");
        assert_eq!(dispatcher.adapters(), &HandlerAdapter::DEFAULT_ORDER);
        let output = dispatcher.dispatch(&mut "hi".to_owned()).expect("dispatch");
        assert_eq!(output.as_deref(), Some("hi"));
    }

    #[test]
    fn single_exception_handler_is_registered_as_its_own_mapper() {
        let failing = RequestHandlerChain::new(HandlerShape::functional(FunctionalHandler::new(
            "failing",
            |_: &mut String| -> Result<bool, SkillError> { Ok(true) },
            |_: &mut String| -> Result<Option<String>, SkillError> {
                Err(SkillError::handler("boom"))
            },
        )));
        let dispatcher = Dispatcher::<String, String>::builder()
            .with_request_mapper(DefaultRequestMapper::default().with_chain(failing))
            .with_exception_handler(FunctionalExceptionHandler::new(
                "apology",
                |_: &mut String, error: &SkillError| error.code() == codes::HANDLER_FAILED,
                |input: &mut String, _: &SkillError| -> Result<Option<String>, SkillError> {
                    Ok(Some(format!("sorry, {input}")))
                },
            ))
            .build()
            .expect("build");

        let output = dispatcher.dispatch(&mut "ada".to_owned()).expect("应被异常处理器认领");
        assert_eq!(output.as_deref(), Some("sorry, ada"));
    }
}
