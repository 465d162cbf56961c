//! 请求与响应模型。
//!
//! 只覆盖分发引擎与属性存储需要读取的字段；传输层负责完整信封的解码与签名校验。

mod envelope;
mod response;

pub use envelope::{
    Application, Context, Device, Intent, Person, Request, RequestEnvelope, Session, Slot,
    SystemState, User,
};
pub use response::{Card, OutputSpeech, Reprompt, Response, ResponseEnvelope};

/// 属性存储各层使用的键值表。
pub type AttributeMap = std::collections::HashMap<String, serde_json::Value>;
