use std::borrow::Cow;

use skill_core::{HandlerInput, Response, SkillError};
use skill_runtime::{RequestInterceptor, ResponseInterceptor};
use tracing::Level;

/// 日志拦截器配置。
///
/// # 教案式说明
/// - **意图（Why）**：不同技能对请求日志的详略要求不同，配置把标签与级别外部化，拦截器本身保持无状态。
/// - **契约（What）**：
///   - `label`：写入每条日志的 `interceptor` 字段，同一技能内建议唯一；
///   - `level`：普通请求/响应事件的日志级别；
///   - `include_attributes`：为真时额外记录会话层的键名（不记录取值）。
/// - **风险提示（Trade-offs）**：高频技能若使用 `INFO` 级别可能产生大量日志，可调低为 `DEBUG`。
#[derive(Clone, Debug)]
pub struct LoggingInterceptorConfig {
    pub label: Cow<'static, str>,
    pub level: Level,
    pub include_attributes: bool,
}

impl Default for LoggingInterceptorConfig {
    fn default() -> Self {
        Self {
            label: Cow::Borrowed("logging"),
            level: Level::INFO,
            include_attributes: false,
        }
    }
}

/// 记录入站请求与出站响应的拦截器。
///
/// 同一实例既是请求拦截器也是响应拦截器，通常克隆一份分别注册：
///
/// ```rust,ignore
/// let logging = LoggingInterceptor::default();
/// Skill::builder()
///     .add_request_interceptor(logging.clone())
///     .add_response_interceptor(logging)
/// ```
///
/// 拦截器从不修改输入或输出，也从不失败。
#[derive(Clone, Debug, Default)]
pub struct LoggingInterceptor {
    config: LoggingInterceptorConfig,
}

impl LoggingInterceptor {
    pub fn new(config: LoggingInterceptorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoggingInterceptorConfig {
        &self.config
    }

    fn session_keys(&self, input: &HandlerInput) -> Option<String> {
        if !self.config.include_attributes {
            return None;
        }
        let session = input.attributes().session_attributes().ok()?;
        let mut keys: Vec<&str> = session.keys().map(String::as_str).collect();
        keys.sort_unstable();
        Some(keys.join(","))
    }
}

// tracing 的级别必须是常量，按级别展开一次宏。
macro_rules! event_at {
    ($level:expr, $($rest:tt)+) => {
        match $level {
            Level::ERROR => tracing::event!(Level::ERROR, $($rest)+),
            Level::WARN => tracing::event!(Level::WARN, $($rest)+),
            Level::INFO => tracing::event!(Level::INFO, $($rest)+),
            Level::DEBUG => tracing::event!(Level::DEBUG, $($rest)+),
            _ => tracing::event!(Level::TRACE, $($rest)+),
        }
    };
}

impl RequestInterceptor<HandlerInput> for LoggingInterceptor {
    fn process(&self, input: &mut HandlerInput) -> Result<(), SkillError> {
        let request = input.request();
        let intent = request.intent.as_ref().map(|intent| intent.name.as_str());
        let session_keys = self.session_keys(input);
        event_at!(
            self.config.level,
            interceptor = %self.config.label,
            request_id = %request.request_id,
            request_type = %request.request_type,
            intent = ?intent,
            locale = ?request.locale,
            has_session = input.attributes().has_session(),
            session_keys = ?session_keys,
            "skill request received"
        );
        Ok(())
    }
}

impl ResponseInterceptor<HandlerInput, Response> for LoggingInterceptor {
    fn process(
        &self,
        input: &mut HandlerInput,
        output: Option<Response>,
    ) -> Result<Option<Response>, SkillError> {
        let (has_speech, should_end_session) = match output.as_ref() {
            Some(response) => (response.output_speech.is_some(), response.should_end_session),
            None => (false, None),
        };
        event_at!(
            self.config.level,
            interceptor = %self.config.label,
            request_id = %input.request().request_id,
            has_response = output.is_some(),
            has_speech,
            should_end_session = ?should_end_session,
            "skill response produced"
        );
        Ok(output)
    }
}
