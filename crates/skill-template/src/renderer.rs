//! 模板渲染器。

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::TemplateData;
use crate::content::TemplateContentData;
use crate::error::TemplateError;

/// 把模板内容与数据渲染成输出类型 `O`。
pub trait TemplateRenderer<O>: Send + Sync {
    fn render(
        &self,
        template: &TemplateContentData,
        data: &TemplateData,
    ) -> Result<O, TemplateError>;
}

/// JSON 占位符渲染器。
///
/// # 教案式说明
/// - **意图 (Why)**：响应本身就是 JSON，模板写成带 `{{ key }}` 占位符的 JSON 文档，
///   渲染后直接反序列化为响应类型，无需引入完整的模板引擎。
/// - **契约 (What)**：
///   - 占位符两侧空白会被忽略，键必须存在于数据中，否则返回
///     [`TemplateError::MissingVariable`]；
///   - 字符串值按 JSON 转义后原位插入（模板负责提供两侧引号），其他值以 JSON 文本插入；
///   - 渲染结果无法反序列化为 `O` 时返回 [`TemplateError::Deserialize`]。
pub struct JsonTemplateRenderer<O> {
    _output: PhantomData<fn() -> O>,
}

impl<O> JsonTemplateRenderer<O> {
    pub fn new() -> Self {
        Self {
            _output: PhantomData,
        }
    }
}

impl<O> Default for JsonTemplateRenderer<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> std::fmt::Debug for JsonTemplateRenderer<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JsonTemplateRenderer")
    }
}

impl<O: DeserializeOwned> TemplateRenderer<O> for JsonTemplateRenderer<O> {
    fn render(
        &self,
        template: &TemplateContentData,
        data: &TemplateData,
    ) -> Result<O, TemplateError> {
        let identifier = template.identifier();
        let source = std::str::from_utf8(template.content()).map_err(|_| TemplateError::NotUtf8 {
            identifier: identifier.to_owned(),
        })?;
        let rendered = substitute(identifier, source, data)?;
        serde_json::from_str(&rendered).map_err(|source| TemplateError::Deserialize {
            identifier: identifier.to_owned(),
            source,
        })
    }
}

fn substitute(
    identifier: &str,
    source: &str,
    data: &TemplateData,
) -> Result<String, TemplateError> {
    let mut rendered = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        rendered.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let end = after_open
            .find("}}")
            .ok_or_else(|| TemplateError::UnterminatedPlaceholder {
                identifier: identifier.to_owned(),
            })?;
        let key = after_open[..end].trim();
        let value = data.get(key).ok_or_else(|| TemplateError::MissingVariable {
            identifier: identifier.to_owned(),
            key: key.to_owned(),
        })?;
        push_value(&mut rendered, value);
        rest = &after_open[end + 2..];
    }
    rendered.push_str(rest);
    Ok(rendered)
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::String(text) => {
            let quoted = Value::String(text.clone()).to_string();
            out.push_str(&quoted[1..quoted.len() - 1]);
        }
        other => out.push_str(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Speech {
        text: String,
        count: u32,
    }

    fn data(value: Value) -> TemplateData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn substitutes_strings_escaped_and_numbers_raw() {
        let template = TemplateContentData::new(
            "greeting",
            r#"{"text": "Hello {{ name }}!", "count": {{count}}}"#,
        );
        let speech: Speech = JsonTemplateRenderer::new()
            .render(&template, &data(json!({"name": "Ada \"the\" Great", "count": 3})))
            .expect("render");
        assert_eq!(
            speech,
            Speech {
                text: "Hello Ada \"the\" Great!".to_owned(),
                count: 3
            }
        );
    }

    #[test]
    fn missing_variable_is_reported() {
        let template =
            TemplateContentData::new("greeting", r#"{"text": "{{ name }}", "count": 1}"#);
        let renderer = JsonTemplateRenderer::<Speech>::new();
        let err = TemplateRenderer::<Speech>::render(&renderer, &template, &TemplateData::new())
            .expect_err("缺少变量应报错");
        assert!(matches!(err, TemplateError::MissingVariable { ref key, .. } if key == "name"));
    }

    #[test]
    fn unterminated_placeholder_is_reported() {
        let template = TemplateContentData::new("broken", r#"{"text": "{{ name"}"#);
        let renderer = JsonTemplateRenderer::<Speech>::new();
        let err = TemplateRenderer::<Speech>::render(&renderer, &template, &TemplateData::new())
            .expect_err("未闭合占位符应报错");
        assert!(matches!(err, TemplateError::UnterminatedPlaceholder { .. }));
    }
}
