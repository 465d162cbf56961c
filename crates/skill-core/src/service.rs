//! 平台服务客户端。
//!
//! 框架只负责把 API 端点与访问令牌从信封中取出并交给调用方配置的 [`ApiClient`]；
//! HTTP 实现由宿主提供。

use std::fmt;
use std::sync::Arc;

use skill_runtime::{SkillError, codes};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 宿主提供的 HTTP 客户端。
pub trait ApiClient: Send + Sync {
    fn invoke(&self, request: ApiRequest) -> Result<ApiResponse, SkillError>;
}

/// 绑定单次事件端点与令牌的服务客户端工厂。
#[derive(Clone)]
pub struct ServiceClientFactory {
    api_endpoint: String,
    authorization_value: String,
    client: Arc<dyn ApiClient>,
}

impl ServiceClientFactory {
    pub fn new(
        api_endpoint: impl Into<String>,
        authorization_value: impl Into<String>,
        client: Arc<dyn ApiClient>,
    ) -> Self {
        Self {
            api_endpoint: api_endpoint.into(),
            authorization_value: authorization_value.into(),
            client,
        }
    }

    pub fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    pub fn authorization_value(&self) -> &str {
        &self.authorization_value
    }

    /// 以事件令牌调用平台 API。非 2xx 响应转换为 [`codes::SERVICE_CALL_FAILED`]。
    pub fn call(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
    ) -> Result<ApiResponse, SkillError> {
        let request = ApiRequest {
            method: method.to_owned(),
            url: format!("{}{}", self.api_endpoint.trim_end_matches('/'), path),
            headers: vec![(
                "Authorization".to_owned(),
                format!("Bearer {}", self.authorization_value),
            )],
            body,
        };
        let url = request.url.clone();
        let response = self.client.invoke(request)?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(SkillError::new(
                codes::SERVICE_CALL_FAILED,
                format!("{method} {url} returned status {}", response.status),
            ))
        }
    }
}

impl fmt::Debug for ServiceClientFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClientFactory")
            .field("api_endpoint", &self.api_endpoint)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    struct Recording {
        seen: Mutex<Vec<ApiRequest>>,
        status: u16,
    }

    impl ApiClient for Recording {
        fn invoke(&self, request: ApiRequest) -> Result<ApiResponse, SkillError> {
            self.seen.lock().push(request);
            Ok(ApiResponse {
                status: self.status,
                headers: Vec::new(),
                body: None,
            })
        }
    }

    #[test]
    fn call_attaches_bearer_token_and_joins_url() {
        let client = Arc::new(Recording {
            seen: Mutex::new(Vec::new()),
            status: 200,
        });
        let factory = ServiceClientFactory::new("https://api.example/", "tok", client.clone());
        factory.call("GET", "/v1/settings", None).expect("call");

        let seen = client.seen.lock();
        assert_eq!(seen[0].url, "https://api.example/v1/settings");
        assert_eq!(seen[0].headers[0].1, "Bearer tok");
    }

    #[test]
    fn non_success_status_is_an_error() {
        let client = Arc::new(Recording {
            seen: Mutex::new(Vec::new()),
            status: 403,
        });
        let factory = ServiceClientFactory::new("https://api.example", "tok", client);
        let err = factory.call("GET", "/v1/settings", None).expect_err("403 应失败");
        assert_eq!(err.code(), codes::SERVICE_CALL_FAILED);
    }
}
