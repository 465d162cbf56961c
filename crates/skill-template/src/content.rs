use bytes::Bytes;

/// 已加载的模板内容。
///
/// `content` 使用 [`Bytes`]，缓存命中时克隆只增加引用计数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContentData {
    identifier: String,
    content: Bytes,
    base_dir: Option<String>,
}

impl TemplateContentData {
    pub fn new(identifier: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            identifier: identifier.into(),
            content: content.into(),
            base_dir: None,
        }
    }

    /// 记录模板所在的目录，渲染器可据此解析相对引用。
    pub fn with_base_dir(mut self, base_dir: impl Into<String>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn base_dir(&self) -> Option<&str> {
        self.base_dir.as_deref()
    }

    /// 计入缓存容量的字节数。
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}
