//! 模板加载器。

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::cache::{BoundedTemplateCache, TemplateCache};
use crate::content::TemplateContentData;
use crate::enumerator::LocaleTemplateEnumerator;
use crate::error::TemplateError;

/// 输入侧提供的 locale，用于挑选模板变体。
pub trait LocaleSource {
    fn locale(&self) -> Option<&str>;
}

/// 模板加载器：按名称与输入定位模板内容。
///
/// 找不到时返回 `Ok(None)`，由工厂继续尝试下一个加载器；只有真正的读取失败才返回错误。
pub trait TemplateLoader<I>: Send + Sync {
    fn load(
        &self,
        input: &I,
        template_name: &str,
    ) -> Result<Option<TemplateContentData>, TemplateError>;
}

/// 从本地目录加载模板文件。
///
/// # 教案式说明
/// - **意图 (Why)**：最常见的部署方式是把模板随技能一起打包到目录中，按 locale 分文件存放。
/// - **契约 (What)**：
///   - 候选路径为 `<directory>/<候选名>.<extension>`，候选名顺序见 [`LocaleTemplateEnumerator`]；
///   - 每个候选先查缓存（以完整路径为标识），未命中再读文件，读到后写回缓存；
///   - 文件不存在视为该候选未命中，其他 I/O 错误立即返回。
#[derive(Clone)]
pub struct LocalTemplateFileLoader {
    directory: PathBuf,
    extension: String,
    cache: Arc<dyn TemplateCache>,
}

impl LocalTemplateFileLoader {
    /// 使用默认配置的 [`BoundedTemplateCache`]。
    pub fn new(directory: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            extension: extension.into(),
            cache: Arc::new(BoundedTemplateCache::default()),
        }
    }

    /// 替换缓存，多个加载器可共享同一缓存实例。
    pub fn with_cache(mut self, cache: Arc<dyn TemplateCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn candidate_path(&self, candidate: &str) -> PathBuf {
        self.directory.join(format!("{candidate}.{}", self.extension))
    }
}

impl std::fmt::Debug for LocalTemplateFileLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTemplateFileLoader")
            .field("directory", &self.directory)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}

impl<I: LocaleSource> TemplateLoader<I> for LocalTemplateFileLoader {
    fn load(
        &self,
        input: &I,
        template_name: &str,
    ) -> Result<Option<TemplateContentData>, TemplateError> {
        for candidate in LocaleTemplateEnumerator::new(template_name, input.locale())? {
            let path = self.candidate_path(&candidate);
            let identifier = path.to_string_lossy().into_owned();

            if let Some(cached) = self.cache.get(&identifier) {
                trace!(identifier = %identifier, "template cache hit");
                return Ok(Some(cached));
            }

            match std::fs::read(&path) {
                Ok(bytes) => {
                    debug!(
                        identifier = %identifier,
                        size = bytes.len(),
                        "template loaded from disk"
                    );
                    let template = TemplateContentData::new(identifier.clone(), bytes)
                        .with_base_dir(self.directory.to_string_lossy());
                    self.cache.put(&identifier, template.clone());
                    return Ok(Some(template));
                }
                Err(error) if error.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(TemplateError::Io { path, source }),
            }
        }
        Ok(None)
    }
}
