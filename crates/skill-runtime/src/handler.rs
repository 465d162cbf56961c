//! 请求处理器的两种形态。
//!
//! 引擎只认识两种处理器写法：实现 [`RequestHandler`] trait 的类型化处理器，以及由谓词闭包和处理闭包
//! 拼成的 [`FunctionalHandler`]。二者统一收拢在 [`HandlerShape`] 中，由
//! [`HandlerAdapter`](crate::HandlerAdapter) 负责按形态调用。

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::SkillError;

/// 类型化请求处理器。
///
/// # 教案式说明
/// - **意图 (Why)**：业务逻辑的主要落点。`can_handle` 决定是否认领当前请求，`handle` 产出输出。
/// - **契约 (What)**：
///   - 两个方法都拿到 `&mut I`：判定逻辑可能需要触发持久属性的惰性加载；
///   - `can_handle` 返回 `Err` 时不会被解析器吞掉，而是进入分发器的异常路径；
///   - `handle` 返回 `Ok(None)` 表示“无响应”，这是合法结果；
///   - 实现需为 `Send + Sync`，一个实例会被并发的多次分发共享。
pub trait RequestHandler<I, O>: Send + Sync {
    fn can_handle(&self, input: &mut I) -> Result<bool, SkillError>;

    fn handle(&self, input: &mut I) -> Result<Option<O>, SkillError>;

    /// 日志中展示的名称，默认取具体类型名。
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

type PredicateFn<I> = dyn Fn(&mut I) -> Result<bool, SkillError> + Send + Sync;
type HandleFn<I, O> = dyn Fn(&mut I) -> Result<Option<O>, SkillError> + Send + Sync;

/// 闭包形态的处理器：一个谓词加一个处理函数。
pub struct FunctionalHandler<I, O> {
    name: Cow<'static, str>,
    predicate: Box<PredicateFn<I>>,
    handle: Box<HandleFn<I, O>>,
}

impl<I, O> FunctionalHandler<I, O> {
    pub fn new<P, H>(name: impl Into<Cow<'static, str>>, predicate: P, handle: H) -> Self
    where
        P: Fn(&mut I) -> Result<bool, SkillError> + Send + Sync + 'static,
        H: Fn(&mut I) -> Result<Option<O>, SkillError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
            handle: Box::new(handle),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn test(&self, input: &mut I) -> Result<bool, SkillError> {
        (self.predicate)(input)
    }

    pub fn apply(&self, input: &mut I) -> Result<Option<O>, SkillError> {
        (self.handle)(input)
    }
}

impl<I, O> fmt::Debug for FunctionalHandler<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionalHandler")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// 处理器形态的闭集。
///
/// # 教案式说明
/// - **意图 (Why)**：不同写法的处理器需要不同的调用约定，用带标签的枚举表达这一差异，
///   避免运行期类型探测。
/// - **契约 (What)**：克隆只复制 `Arc`，处理器实例始终共享。
pub enum HandlerShape<I, O> {
    Typed(Arc<dyn RequestHandler<I, O>>),
    Functional(Arc<FunctionalHandler<I, O>>),
}

impl<I, O> HandlerShape<I, O> {
    pub fn typed(handler: impl RequestHandler<I, O> + 'static) -> Self {
        Self::Typed(Arc::new(handler))
    }

    pub fn functional(handler: FunctionalHandler<I, O>) -> Self {
        Self::Functional(Arc::new(handler))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Typed(handler) => handler.name(),
            Self::Functional(handler) => handler.name(),
        }
    }

    /// 询问处理器是否认领当前输入。谓词失败原样向上传播。
    pub fn can_handle(&self, input: &mut I) -> Result<bool, SkillError> {
        match self {
            Self::Typed(handler) => handler.can_handle(input),
            Self::Functional(handler) => handler.test(input),
        }
    }
}

impl<I, O> Clone for HandlerShape<I, O> {
    fn clone(&self) -> Self {
        match self {
            Self::Typed(handler) => Self::Typed(Arc::clone(handler)),
            Self::Functional(handler) => Self::Functional(Arc::clone(handler)),
        }
    }
}

impl<I, O> fmt::Debug for HandlerShape<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Typed(_) => "Typed",
            Self::Functional(_) => "Functional",
        };
        f.debug_struct("HandlerShape")
            .field("kind", &kind)
            .field("name", &self.name())
            .finish()
    }
}
