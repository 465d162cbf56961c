//! 模板子系统错误。

use std::io;
use std::path::PathBuf;

use skill_runtime::{SkillError, codes};
use thiserror::Error;

/// 模板定位、加载与渲染过程中的失败。
///
/// # 教案式说明
/// - **意图 (Why)**：按根因细分失败，异常处理器可以据此给出不同的兜底话术。
/// - **契约 (What)**：通过 `From<TemplateError> for SkillError` 进入分发路径，
///   原始错误保留为 `cause`。
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TemplateError {
    #[error("invalid locale `{locale}`, expected a form like `en-US`")]
    InvalidLocale { locale: String },

    #[error("template `{name}` was not found by any loader")]
    NotFound { name: String },

    #[error("failed to read template `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("template `{identifier}` is not valid UTF-8")]
    NotUtf8 { identifier: String },

    #[error("template `{identifier}` references missing variable `{key}`")]
    MissingVariable { identifier: String, key: String },

    #[error("template `{identifier}` has an unterminated placeholder")]
    UnterminatedPlaceholder { identifier: String },

    #[error("rendered template `{identifier}` does not match the response shape")]
    Deserialize {
        identifier: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("template factory requires at least one loader")]
    NoLoaders,

    #[error("template factory requires a renderer")]
    NoRenderer,
}

impl TemplateError {
    /// 对应的稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => codes::TEMPLATE_NOT_FOUND,
            Self::Io { .. } => codes::TEMPLATE_LOAD_FAILED,
            Self::NotUtf8 { .. }
            | Self::MissingVariable { .. }
            | Self::UnterminatedPlaceholder { .. }
            | Self::Deserialize { .. } => codes::TEMPLATE_RENDER_FAILED,
            Self::InvalidLocale { .. } | Self::NoLoaders | Self::NoRenderer => {
                codes::TEMPLATE_INVALID
            }
        }
    }
}

impl From<TemplateError> for SkillError {
    fn from(error: TemplateError) -> Self {
        SkillError::new(error.code(), error.to_string()).with_cause(error)
    }
}
