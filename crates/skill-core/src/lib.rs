//! # skill-core
//!
//! ## 定位（Why）
//! - 把 `skill-runtime` 的通用分发引擎落到语音技能的具体模型上：输入为 [`HandlerInput`]，
//!   输出为 [`Response`]；
//! - 提供 request / session / persistent 三层属性存储，以及技能门面 [`Skill`] 与构建器 [`SkillBuilder`]。
//!
//! ## 快速上手
//! ```rust
//! use skill_core::{Skill, predicates::request_type};
//! use skill_core::model::{Request, RequestEnvelope};
//!
//! let skill = Skill::builder()
//!     .add_request_handler_fn("launch", request_type("LaunchRequest"), |input| {
//!         Ok(input.response_builder().speak("Welcome!").build())
//!     })
//!     .build()
//!     .expect("skill");
//!
//! let envelope = skill
//!     .invoke(RequestEnvelope::new(Request::new("LaunchRequest", "r-1")), None)
//!     .expect("invoke");
//! assert!(envelope.response.is_some());
//! ```

pub mod attributes;
pub mod builder;
pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod persistence;
pub mod predicates;
pub mod response_builder;
pub mod service;
pub mod skill;

pub use attributes::AttributesManager;
pub use builder::SkillBuilder;
pub use config::SkillSettings;
pub use error::{AttributesError, PersistenceError};
pub use input::{HandlerInput, HandlerInputBuilder, SkillTemplateFactory};
pub use model::{AttributeMap, Response, ResponseEnvelope, RequestEnvelope};
pub use persistence::PersistenceAdapter;
pub use predicates::Predicate;
pub use response_builder::ResponseBuilder;
pub use service::{ApiClient, ApiRequest, ApiResponse, ServiceClientFactory};
pub use skill::Skill;
pub use skill_runtime::{SkillError, codes};
