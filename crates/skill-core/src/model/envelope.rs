use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::AttributeMap;

/// 一次入站事件的完整信封。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    #[serde(default)]
    pub context: Context,
    pub request: Request,
}

fn default_version() -> String {
    "1.0".to_owned()
}

impl RequestEnvelope {
    /// 无会话的信封。
    pub fn new(request: Request) -> Self {
        Self {
            version: default_version(),
            session: None,
            context: Context::default(),
            request,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// 技能 ID：优先取上下文，其次取会话。
    pub fn application_id(&self) -> Option<&str> {
        self.context
            .system
            .application
            .as_ref()
            .or_else(|| self.session.as_ref()?.application.as_ref())
            .map(|application| application.application_id.as_str())
    }

    /// 用户：优先取上下文，其次取会话。
    pub fn user(&self) -> Option<&User> {
        self.context
            .system
            .user
            .as_ref()
            .or_else(|| self.session.as_ref()?.user.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub new: bool,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<Application>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttributeMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl Session {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Self::default()
        }
    }

    pub fn with_attributes(mut self, attributes: AttributeMap) -> Self {
        self.attributes = Some(attributes);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub person_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(rename = "System", default)]
    pub system: SystemState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<Application>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(rename = "type")]
    pub request_type: String,
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
}

impl Request {
    pub fn new(request_type: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            request_type: request_type.into(),
            request_id: request_id.into(),
            locale: None,
            timestamp: None,
            intent: None,
        }
    }

    /// 意图请求。
    pub fn intent(request_id: impl Into<String>, intent: Intent) -> Self {
        let mut request = Self::new(Intent::REQUEST_TYPE, request_id);
        request.intent = Some(intent);
        request
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

impl Intent {
    pub const REQUEST_TYPE: &'static str = "IntentRequest";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: HashMap::new(),
        }
    }

    pub fn with_slot(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.slots.insert(
            name.clone(),
            Slot {
                name,
                value: Some(value.into()),
            },
        );
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wire_shape() {
        let envelope: RequestEnvelope = serde_json::from_str(
            r#"{
                "version": "1.0",
                "session": {"new": true, "sessionId": "s-1", "attributes": {"count": 2}},
                "context": {"System": {
                    "application": {"applicationId": "amzn1.ask.skill.demo"},
                    "user": {"userId": "u-1"},
                    "apiEndpoint": "https://api.example"
                }},
                "request": {
                    "type": "IntentRequest",
                    "requestId": "r-1",
                    "locale": "en-US",
                    "intent": {
                        "name": "OrderIntent",
                        "slots": {"size": {"name": "size", "value": "large"}}
                    }
                }
            }"#,
        )
        .expect("decode");

        assert_eq!(envelope.application_id(), Some("amzn1.ask.skill.demo"));
        assert_eq!(envelope.user().map(|user| user.user_id.as_str()), Some("u-1"));
        let intent = envelope.request.intent.as_ref().expect("intent");
        assert_eq!(intent.slots["size"].value.as_deref(), Some("large"));
        let session = envelope.session.as_ref().expect("session");
        assert_eq!(session.attributes.as_ref().map(|a| a["count"].clone()), Some(2.into()));
    }
}
