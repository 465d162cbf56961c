//! # skill-runtime
//!
//! ## 定位（Why）
//! - 提供与请求模型无关的分发引擎：有序解析请求处理链、按形态适配调用、全局与链上拦截器、
//!   异常处理器兜底；
//! - 具体的请求信封、属性存储与响应模型由 `skill-core` 以类型参数 `I`/`O` 注入。
//!
//! ## 结构（How）
//! - [`handler`]：处理器 trait 与闭包形态，统一为 [`HandlerShape`]；
//! - [`adapter`]：适配器闭集 [`HandlerAdapter`]；
//! - [`chain`]：请求处理链；
//! - [`mapper`] / [`exception`]：首个命中解析；
//! - [`interceptor`]：请求/响应拦截器；
//! - [`dispatcher`]：把以上部件串成一次分发。
//!
//! ## 契约（What）
//! - 引擎全程同步执行，不创建后台任务；
//! - 构建完成的 [`Dispatcher`] 只读且 `Send + Sync`，可在线程间共享。

pub mod adapter;
pub mod chain;
pub mod dispatcher;
pub mod error;
pub mod exception;
pub mod handler;
pub mod interceptor;
pub mod mapper;

pub use adapter::HandlerAdapter;
pub use chain::{RequestHandlerChain, RequestHandlerChainBuilder};
pub use dispatcher::{DispatchPhase, Dispatcher, DispatcherBuilder};
pub use error::{ConfigurationError, ErrorCause, SkillError, codes};
pub use exception::{
    DefaultExceptionMapper, ExceptionHandler, ExceptionMapper, ExceptionResolver,
    FunctionalExceptionHandler,
};
pub use handler::{FunctionalHandler, HandlerShape, RequestHandler};
pub use interceptor::{RequestInterceptor, ResponseInterceptor};
pub use mapper::{DefaultRequestMapper, RequestMapper, RequestResolver};
