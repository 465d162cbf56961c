//! 处理器适配器：按形态调用处理器。

use crate::error::{SkillError, codes};
use crate::handler::HandlerShape;

/// 适配器闭集，分发器按配置顺序逐个询问 [`supports`](Self::supports)，第一个支持者负责调用。
///
/// # 教案式说明
/// - **意图 (Why)**：历史上存在多种处理器调用约定；以带标签的变体表达并按固定顺序尝试，
///   新增约定时只需扩展枚举与两个 `match`。
/// - **契约 (What)**：构建期已确保每个处理器至少有一个适配器支持，`execute` 中的不匹配分支
///   只在调用方绕过构建器时可达，返回 [`codes::DISPATCH_ADAPTER_UNAVAILABLE`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerAdapter {
    Typed,
    Functional,
}

impl HandlerAdapter {
    /// 未显式配置适配器时采用的顺序。
    pub const DEFAULT_ORDER: [HandlerAdapter; 2] =
        [HandlerAdapter::Typed, HandlerAdapter::Functional];

    pub fn name(self) -> &'static str {
        match self {
            Self::Typed => "typed",
            Self::Functional => "functional",
        }
    }

    pub fn supports<I, O>(self, handler: &HandlerShape<I, O>) -> bool {
        matches!(
            (self, handler),
            (Self::Typed, HandlerShape::Typed(_)) | (Self::Functional, HandlerShape::Functional(_))
        )
    }

    pub fn execute<I, O>(
        self,
        input: &mut I,
        handler: &HandlerShape<I, O>,
    ) -> Result<Option<O>, SkillError> {
        match (self, handler) {
            (Self::Typed, HandlerShape::Typed(handler)) => handler.handle(input),
            (Self::Functional, HandlerShape::Functional(handler)) => handler.apply(input),
            _ => Err(SkillError::new(
                codes::DISPATCH_ADAPTER_UNAVAILABLE,
                format!(
                    "adapter `{}` cannot invoke handler `{}`",
                    self.name(),
                    handler.name()
                ),
            )),
        }
    }
}
