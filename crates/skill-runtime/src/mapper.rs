//! 请求映射器与请求解析器。
//!
//! 解析顺序：映射器按配置顺序，映射器内的链按配置顺序，首个 `can_handle` 为真的链胜出，
//! 之后的谓词不再求值。空映射器列表与空映射器都合法，只是永远不命中。

use std::sync::Arc;

use tracing::trace;

use crate::chain::RequestHandlerChain;
use crate::error::SkillError;

/// 请求映射器：一组有序的处理链。
///
/// 自定义映射器只需提供 [`handler_chains`](Self::handler_chains)，首个命中算法由默认方法提供；
/// 构建器也依赖这份列表做适配器覆盖校验。
pub trait RequestMapper<I, O>: Send + Sync {
    fn handler_chains(&self) -> &[RequestHandlerChain<I, O>];

    /// 谓词失败时立即返回错误，不继续尝试后续链。
    fn resolve(&self, input: &mut I) -> Result<Option<&RequestHandlerChain<I, O>>, SkillError> {
        for chain in self.handler_chains() {
            if chain.handler().can_handle(input)? {
                return Ok(Some(chain));
            }
            trace!(handler = chain.handler().name(), "handler declined request");
        }
        Ok(None)
    }
}

pub struct DefaultRequestMapper<I, O> {
    chains: Vec<RequestHandlerChain<I, O>>,
}

impl<I, O> DefaultRequestMapper<I, O> {
    pub fn new(chains: Vec<RequestHandlerChain<I, O>>) -> Self {
        Self { chains }
    }

    pub fn with_chain(mut self, chain: RequestHandlerChain<I, O>) -> Self {
        self.chains.push(chain);
        self
    }
}

impl<I, O> Default for DefaultRequestMapper<I, O> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<I, O> RequestMapper<I, O> for DefaultRequestMapper<I, O> {
    fn handler_chains(&self) -> &[RequestHandlerChain<I, O>] {
        &self.chains
    }
}

/// 请求解析器：在有序映射器列表上执行首个命中解析。
pub struct RequestResolver<I, O> {
    mappers: Vec<Arc<dyn RequestMapper<I, O>>>,
}

impl<I, O> RequestResolver<I, O> {
    pub fn new(mappers: Vec<Arc<dyn RequestMapper<I, O>>>) -> Self {
        Self { mappers }
    }

    pub fn mappers(&self) -> &[Arc<dyn RequestMapper<I, O>>] {
        &self.mappers
    }

    pub fn resolve(&self, input: &mut I) -> Result<Option<&RequestHandlerChain<I, O>>, SkillError> {
        for mapper in &self.mappers {
            if let Some(chain) = mapper.resolve(input)? {
                return Ok(Some(chain));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::handler::{FunctionalHandler, HandlerShape};

    fn counting(
        name: &'static str,
        matches: bool,
        calls: Arc<AtomicUsize>,
    ) -> RequestHandlerChain<(), &'static str> {
        RequestHandlerChain::new(HandlerShape::functional(FunctionalHandler::new(
            name,
            move |_: &mut ()| -> Result<bool, SkillError> {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(matches)
            },
            move |_: &mut ()| -> Result<Option<&'static str>, SkillError> { Ok(Some(name)) },
        )))
    }

    #[test]
    fn empty_resolver_never_matches() {
        let resolver: RequestResolver<(), ()> = RequestResolver::new(Vec::new());
        assert!(resolver.resolve(&mut ()).expect("resolve").is_none());
    }

    #[test]
    fn predicate_error_propagates_without_trying_later_chains() {
        let later_calls = Arc::new(AtomicUsize::new(0));
        let failing = RequestHandlerChain::new(HandlerShape::functional(FunctionalHandler::new(
            "failing",
            |_: &mut ()| -> Result<bool, SkillError> {
                Err(SkillError::handler("predicate broke"))
            },
            |_: &mut ()| -> Result<Option<&'static str>, SkillError> { Ok(None) },
        )));
        let mapper = DefaultRequestMapper::default()
            .with_chain(failing)
            .with_chain(counting("later", true, Arc::clone(&later_calls)));
        let resolver = RequestResolver::new(vec![Arc::new(mapper) as Arc<dyn RequestMapper<_, _>>]);

        let err = resolver.resolve(&mut ()).expect_err("谓词失败应向上传播");
        assert_eq!(err.message(), "predicate broke");
        assert_eq!(later_calls.load(Ordering::SeqCst), 0, "失败之后不应再求值");
    }
}
