//! # skill-template
//!
//! ## 定位（Why）
//! - 把响应文案从代码中剥离到模板文件，按请求 locale 挑选最具体的变体；
//! - 模板读取结果进入一个容量与存活时间双重受限的并发缓存，是整个框架中唯一的共享可变状态。
//!
//! ## 结构（How）
//! - [`enumerator`]：locale → 候选模板名；
//! - [`loader`]：候选名 → 模板内容（含缓存）；
//! - [`renderer`]：模板内容 + 数据 → 输出；
//! - [`factory`]：把加载器列表与渲染器串成一次模板生成；
//! - [`cache`] / [`clock`]：有界缓存与可注入时钟。

pub mod cache;
pub mod clock;
pub mod content;
pub mod enumerator;
pub mod error;
pub mod factory;
pub mod loader;
pub mod renderer;

/// 渲染模板时使用的数据。
pub type TemplateData = serde_json::Map<String, serde_json::Value>;

pub use cache::{
    BoundedTemplateCache, DEFAULT_CAPACITY_BYTES, DEFAULT_TIME_TO_LIVE_MS, TemplateCache,
    TemplateCacheConfig,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use content::TemplateContentData;
pub use enumerator::LocaleTemplateEnumerator;
pub use error::TemplateError;
pub use factory::{BaseTemplateFactory, BaseTemplateFactoryBuilder, TemplateFactory};
pub use loader::{LocalTemplateFileLoader, LocaleSource, TemplateLoader};
pub use renderer::{JsonTemplateRenderer, TemplateRenderer};
