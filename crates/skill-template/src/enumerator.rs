//! 按 locale 生成模板候选名。

use crate::error::TemplateError;

/// 依 locale 由具体到笼统生成模板候选名。
///
/// 对 `en-US` 与模板名 `welcome`，依次产出：
/// `welcome/en/US`、`welcome/en_US`、`welcome/en`、`welcome_en_US`、`welcome_en`、`welcome`。
/// 没有 locale 时只产出 `welcome`。
#[derive(Debug, Clone)]
pub struct LocaleTemplateEnumerator {
    candidates: std::vec::IntoIter<String>,
}

impl LocaleTemplateEnumerator {
    /// locale 必须形如 `ll-CC`（两位小写语言码加两位大写地区码），否则返回
    /// [`TemplateError::InvalidLocale`]。
    pub fn new(template_name: &str, locale: Option<&str>) -> Result<Self, TemplateError> {
        let candidates = match locale {
            None => vec![template_name.to_owned()],
            Some(locale) => {
                let (language, country) = split_locale(locale).ok_or_else(|| {
                    TemplateError::InvalidLocale {
                        locale: locale.to_owned(),
                    }
                })?;
                vec![
                    format!("{template_name}/{language}/{country}"),
                    format!("{template_name}/{language}_{country}"),
                    format!("{template_name}/{language}"),
                    format!("{template_name}_{language}_{country}"),
                    format!("{template_name}_{language}"),
                    template_name.to_owned(),
                ]
            }
        };
        Ok(Self {
            candidates: candidates.into_iter(),
        })
    }
}

impl Iterator for LocaleTemplateEnumerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.candidates.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.candidates.size_hint()
    }
}

fn split_locale(locale: &str) -> Option<(&str, &str)> {
    let (language, country) = locale.split_once('-')?;
    let valid = language.len() == 2
        && country.len() == 2
        && language.bytes().all(|b| b.is_ascii_lowercase())
        && country.bytes().all(|b| b.is_ascii_uppercase());
    valid.then_some((language, country))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_locale_yields_six_candidates_most_specific_first() {
        let candidates: Vec<String> = LocaleTemplateEnumerator::new("welcome", Some("en-US"))
            .expect("合法 locale")
            .collect();
        assert_eq!(
            candidates,
            vec![
                "welcome/en/US",
                "welcome/en_US",
                "welcome/en",
                "welcome_en_US",
                "welcome_en",
                "welcome",
            ]
        );
    }

    #[test]
    fn missing_locale_yields_bare_name() {
        let candidates: Vec<String> = LocaleTemplateEnumerator::new("welcome", None)
            .expect("无 locale 合法")
            .collect();
        assert_eq!(candidates, vec!["welcome"]);
    }

    #[test]
    fn malformed_locales_are_rejected() {
        for locale in ["en", "EN-us", "en_US", "eng-USA", ""] {
            let err = LocaleTemplateEnumerator::new("welcome", Some(locale))
                .expect_err("非法 locale 应报错");
            assert!(matches!(err, TemplateError::InvalidLocale { .. }), "locale `{locale}`");
        }
    }
}
