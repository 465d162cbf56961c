//! 常用的 `can_handle` 谓词。
//!
//! ```rust
//! use skill_core::predicates::{intent_name, request_type};
//!
//! let order = intent_name("OrderIntent").or(request_type("LaunchRequest"));
//! # let _ = order;
//! ```

use std::fmt;

use serde_json::Value;
use skill_runtime::SkillError;

use crate::input::HandlerInput;
use crate::model::Intent;

type PredicateFn = dyn Fn(&mut HandlerInput) -> Result<bool, SkillError> + Send + Sync;

/// 可组合的处理器谓词。
///
/// 谓词拿到 `&mut HandlerInput`，因此可以读取需要惰性加载的持久属性；失败会原样上抛。
pub struct Predicate {
    test: Box<PredicateFn>,
}

impl Predicate {
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&mut HandlerInput) -> Result<bool, SkillError> + Send + Sync + 'static,
    {
        Self {
            test: Box::new(test),
        }
    }

    pub fn test(&self, input: &mut HandlerInput) -> Result<bool, SkillError> {
        (self.test)(input)
    }

    /// 短路与。
    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::new(move |input| Ok(self.test(input)? && other.test(input)?))
    }

    /// 短路或。
    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::new(move |input| Ok(self.test(input)? || other.test(input)?))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Predicate {
        Predicate::new(move |input| Ok(!self.test(input)?))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate")
    }
}

/// 请求类型等于 `request_type`。
pub fn request_type(request_type: impl Into<String>) -> Predicate {
    let expected = request_type.into();
    Predicate::new(move |input| Ok(input.request().request_type == expected))
}

/// 意图请求且意图名等于 `name`。
pub fn intent_name(name: impl Into<String>) -> Predicate {
    let expected = name.into();
    Predicate::new(move |input| {
        Ok(current_intent(input).is_some_and(|intent| intent.name == expected))
    })
}

/// 意图请求中槽位 `slot` 的取值等于 `value`。
pub fn slot_value(slot: impl Into<String>, value: impl Into<String>) -> Predicate {
    let slot = slot.into();
    let expected = value.into();
    Predicate::new(move |input| {
        Ok(current_intent(input)
            .and_then(|intent| intent.slots.get(&slot))
            .and_then(|slot| slot.value.as_deref())
            .is_some_and(|value| value == expected))
    })
}

/// 请求层属性 `key` 等于 `value`。
pub fn request_attribute(key: impl Into<String>, value: impl Into<Value>) -> Predicate {
    let key = key.into();
    let expected = value.into();
    Predicate::new(move |input| {
        Ok(input.attributes().request_attributes().get(&key) == Some(&expected))
    })
}

/// 会话层属性 `key` 等于 `value`；无会话时为假。
pub fn session_attribute(key: impl Into<String>, value: impl Into<Value>) -> Predicate {
    let key = key.into();
    let expected = value.into();
    Predicate::new(move |input| {
        let attributes = input.attributes();
        if !attributes.has_session() {
            return Ok(false);
        }
        Ok(attributes.session_attributes()?.get(&key) == Some(&expected))
    })
}

/// 持久层属性 `key` 等于 `value`。会触发持久层的惰性加载，加载失败原样上抛。
pub fn persistent_attribute(key: impl Into<String>, value: impl Into<Value>) -> Predicate {
    let key = key.into();
    let expected = value.into();
    Predicate::new(move |input| {
        Ok(input.attributes_mut().persistent_attributes()?.get(&key) == Some(&expected))
    })
}

fn current_intent(input: &HandlerInput) -> Option<&Intent> {
    let request = input.request();
    if request.request_type != Intent::REQUEST_TYPE {
        return None;
    }
    request.intent.as_ref()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{Request, RequestEnvelope, Session};

    fn input(envelope: RequestEnvelope) -> HandlerInput {
        HandlerInput::builder(envelope).build()
    }

    #[test]
    fn intent_and_slot_predicates() {
        let mut order = input(RequestEnvelope::new(Request::intent(
            "r-1",
            Intent::new("OrderIntent").with_slot("size", "large"),
        )));
        assert!(intent_name("OrderIntent").test(&mut order).expect("test"));
        assert!(!intent_name("HelpIntent").test(&mut order).expect("test"));
        assert!(slot_value("size", "large").test(&mut order).expect("test"));
        assert!(!slot_value("size", "small").test(&mut order).expect("test"));

        let mut launch = input(RequestEnvelope::new(Request::new("LaunchRequest", "r-2")));
        assert!(!intent_name("OrderIntent").test(&mut launch).expect("非意图请求应为假"));
    }

    #[test]
    fn combinators_short_circuit() {
        let mut launch = input(RequestEnvelope::new(Request::new("LaunchRequest", "r-1")));
        let failing = || Predicate::new(|_| Err(SkillError::handler("should not run")));

        assert!(request_type("LaunchRequest").or(failing()).test(&mut launch).expect("或应短路"));
        assert!(!request_type("Other").and(failing()).test(&mut launch).expect("与应短路"));
        assert!(request_type("Other").not().test(&mut launch).expect("test"));
    }

    #[test]
    fn attribute_predicates_follow_tier_rules() {
        let mut sessionless = input(RequestEnvelope::new(Request::new("LaunchRequest", "r-1")));
        assert!(!session_attribute("mode", "quiz").test(&mut sessionless).expect("无会话时为假"));
        sessionless
            .attributes_mut()
            .request_attributes_mut()
            .insert("mode".to_owned(), json!("quiz"));
        assert!(request_attribute("mode", "quiz").test(&mut sessionless).expect("test"));

        let err = persistent_attribute("mode", "quiz")
            .test(&mut sessionless)
            .expect_err("未配置持久化时应上抛");
        assert!(err.is_invalid_state());

        let stored = serde_json::from_value(json!({"mode": "quiz"})).expect("map");
        let envelope = RequestEnvelope::new(Request::new("LaunchRequest", "r-2"))
            .with_session(Session::new("s-1").with_attributes(stored));
        assert!(session_attribute("mode", "quiz").test(&mut input(envelope)).expect("test"));
    }
}
