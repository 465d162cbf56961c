//! 技能设置。
//!
//! 设置文件为 TOML，所有字段均可省略：
//!
//! ```toml
//! skill_id = "amzn1.ask.skill.demo"
//! custom_user_agent = "demo-skill/2.1"
//! template_directory = "templates"
//! template_extension = "json"
//!
//! [template_cache]
//! capacity_bytes = 5000000
//! time_to_live_ms = 86400000
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skill_runtime::ConfigurationError;
use skill_template::TemplateCacheConfig;

/// 模板文件的默认扩展名。
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillSettings {
    /// 配置后，信封中的技能 ID 不一致的事件会被拒绝。
    pub skill_id: Option<String>,
    /// 追加到出站信封 `userAgent` 末尾的标识。
    pub custom_user_agent: Option<String>,
    /// 本地模板目录；配置后且未显式提供模板工厂时，自动装配文件加载器与 JSON 渲染器。
    pub template_directory: Option<PathBuf>,
    pub template_extension: String,
    pub template_cache: TemplateCacheConfig,
}

impl Default for SkillSettings {
    fn default() -> Self {
        Self {
            skill_id: None,
            custom_user_agent: None,
            template_directory: None,
            template_extension: DEFAULT_TEMPLATE_EXTENSION.to_owned(),
            template_cache: TemplateCacheConfig::default(),
        }
    }
}

impl SkillSettings {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigurationError> {
        toml::from_str(text).map_err(|error| ConfigurationError::InvalidSettings {
            reason: error.to_string(),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|error| ConfigurationError::InvalidSettings {
                reason: format!("cannot read `{}`: {error}", path.display()),
            })?;
        Self::from_toml_str(&text)
    }
}
