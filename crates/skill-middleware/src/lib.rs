//! # skill-middleware
//!
//! 开箱即用的技能拦截器：
//! - [`LoggingInterceptor`]：以结构化字段记录每次请求与响应；
//! - [`SavePersistentAttributesInterceptor`]：在响应阶段写回被读取或修改过的持久属性；
//! - [`telemetry::install`]：为没有自建日志管线的宿主安装全局订阅器。

mod logging;
mod persistence;
pub mod telemetry;

pub use logging::{LoggingInterceptor, LoggingInterceptorConfig};
pub use persistence::SavePersistentAttributesInterceptor;
