//! 异常处理器与异常解析器。
//!
//! 与请求解析采用同一套“映射器有序、处理器有序、首个命中即停止”的算法，只是判定输入变为
//! `(input, error)`。无命中时分发器把原始错误交还调用方。

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::SkillError;

/// 异常处理器。
///
/// # 教案式说明
/// - **意图 (Why)**：把处理器与拦截器的失败转换为面向用户的兜底输出。
/// - **契约 (What)**：
///   - `can_handle` 只做判定，返回 `bool`，不应产生新的失败；
///   - `handle` 返回的错误对本次分发是致命的，不会再次进入解析；
///   - 分发器拿到的输出仍会经过全局响应拦截器。
pub trait ExceptionHandler<I, O>: Send + Sync {
    fn can_handle(&self, input: &mut I, error: &SkillError) -> bool;

    fn handle(&self, input: &mut I, error: &SkillError) -> Result<Option<O>, SkillError>;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

type ErrorPredicateFn<I> = dyn Fn(&mut I, &SkillError) -> bool + Send + Sync;
type RecoverFn<I, O> = dyn Fn(&mut I, &SkillError) -> Result<Option<O>, SkillError> + Send + Sync;

/// 闭包形态的异常处理器。
pub struct FunctionalExceptionHandler<I, O> {
    name: Cow<'static, str>,
    predicate: Box<ErrorPredicateFn<I>>,
    recover: Box<RecoverFn<I, O>>,
}

impl<I, O> FunctionalExceptionHandler<I, O> {
    pub fn new<P, R>(name: impl Into<Cow<'static, str>>, predicate: P, recover: R) -> Self
    where
        P: Fn(&mut I, &SkillError) -> bool + Send + Sync + 'static,
        R: Fn(&mut I, &SkillError) -> Result<Option<O>, SkillError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
            recover: Box::new(recover),
        }
    }
}

impl<I, O> ExceptionHandler<I, O> for FunctionalExceptionHandler<I, O> {
    fn can_handle(&self, input: &mut I, error: &SkillError) -> bool {
        (self.predicate)(input, error)
    }

    fn handle(&self, input: &mut I, error: &SkillError) -> Result<Option<O>, SkillError> {
        (self.recover)(input, error)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<I, O> fmt::Debug for FunctionalExceptionHandler<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionalExceptionHandler")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// 在有序处理器列表上做首个命中匹配。请求链的局部异常处理器与全局映射器共用此逻辑。
pub(crate) fn first_claiming<'a, I, O>(
    handlers: &'a [Arc<dyn ExceptionHandler<I, O>>],
    input: &mut I,
    error: &SkillError,
) -> Option<&'a Arc<dyn ExceptionHandler<I, O>>> {
    handlers
        .iter()
        .find(|handler| handler.can_handle(input, error))
}

/// 异常映射器：一组有序的异常处理器。
pub trait ExceptionMapper<I, O>: Send + Sync {
    fn exception_handlers(&self) -> &[Arc<dyn ExceptionHandler<I, O>>];

    fn resolve(
        &self,
        input: &mut I,
        error: &SkillError,
    ) -> Option<&Arc<dyn ExceptionHandler<I, O>>> {
        first_claiming(self.exception_handlers(), input, error)
    }
}

pub struct DefaultExceptionMapper<I, O> {
    handlers: Vec<Arc<dyn ExceptionHandler<I, O>>>,
}

impl<I, O> DefaultExceptionMapper<I, O> {
    pub fn new(handlers: Vec<Arc<dyn ExceptionHandler<I, O>>>) -> Self {
        Self { handlers }
    }

    pub fn with_handler(mut self, handler: impl ExceptionHandler<I, O> + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }
}

impl<I, O> Default for DefaultExceptionMapper<I, O> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<I, O> ExceptionMapper<I, O> for DefaultExceptionMapper<I, O> {
    fn exception_handlers(&self) -> &[Arc<dyn ExceptionHandler<I, O>>] {
        &self.handlers
    }
}

/// 全局异常解析器：按配置顺序遍历映射器。
pub struct ExceptionResolver<I, O> {
    mappers: Vec<Arc<dyn ExceptionMapper<I, O>>>,
}

impl<I, O> ExceptionResolver<I, O> {
    pub fn new(mappers: Vec<Arc<dyn ExceptionMapper<I, O>>>) -> Self {
        Self { mappers }
    }

    pub fn resolve(
        &self,
        input: &mut I,
        error: &SkillError,
    ) -> Option<&Arc<dyn ExceptionHandler<I, O>>> {
        for mapper in &self.mappers {
            if let Some(handler) = mapper.resolve(input, error) {
                return Some(handler);
            }
        }
        None
    }
}
