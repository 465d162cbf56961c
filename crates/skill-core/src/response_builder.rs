use serde_json::Value;

use crate::model::{Card, OutputSpeech, Reprompt, Response};

/// 逐步拼装 [`Response`]。
///
/// 方法返回 `&mut Self` 以便链式调用；[`build`](Self::build) 取走当前内容并把构建器重置为空。
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    response: Response,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speak(&mut self, text: impl Into<String>) -> &mut Self {
        self.response.output_speech = Some(OutputSpeech::PlainText { text: text.into() });
        self
    }

    pub fn speak_ssml(&mut self, ssml: impl Into<String>) -> &mut Self {
        self.response.output_speech = Some(OutputSpeech::Ssml { ssml: ssml.into() });
        self
    }

    /// 设置追问话术；同时让会话保持打开。
    pub fn reprompt(&mut self, text: impl Into<String>) -> &mut Self {
        self.response.reprompt = Some(Reprompt {
            output_speech: OutputSpeech::PlainText { text: text.into() },
        });
        self.response.should_end_session = Some(false);
        self
    }

    pub fn simple_card(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> &mut Self {
        self.response.card = Some(Card::Simple {
            title: title.into(),
            content: content.into(),
        });
        self
    }

    pub fn add_directive(&mut self, directive: Value) -> &mut Self {
        self.response.directives.push(directive);
        self
    }

    pub fn with_should_end_session(&mut self, end: bool) -> &mut Self {
        self.response.should_end_session = Some(end);
        self
    }

    pub fn build(&mut self) -> Option<Response> {
        Some(std::mem::take(&mut self.response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reprompt_keeps_session_open_and_build_resets() {
        let mut builder = ResponseBuilder::new();
        let response = builder
            .speak("What size?")
            .reprompt("Small or large?")
            .build()
            .expect("response");
        assert_eq!(response.should_end_session, Some(false));
        assert_eq!(
            response.output_speech,
            Some(OutputSpeech::PlainText {
                text: "What size?".to_owned()
            })
        );
        assert_eq!(builder.build(), Some(Response::default()), "build 之后构建器应为空");
    }
}
