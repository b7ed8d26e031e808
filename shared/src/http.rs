use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 通用 HTTP 方法枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// 通用 HTTP 请求结构
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// 通用 HTTP 响应结构，头部名统一小写
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers
            .insert(key.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Serialization(e.to_string()))
    }
}

/// HTTP 客户端特性 (Trait)
/// 浏览器 fetch 的 future 不是 Send，所以使用 (?Send)
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse>;
}

// =========================================================
// 测试实现: 脚本化客户端
// =========================================================

#[cfg(test)]
pub(crate) mod mock {
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use std::rc::Rc;

    use super::*;

    /// 按 (方法, 路径) 预置响应，并记录所有请求
    #[derive(Clone, Default)]
    pub struct MockHttpClient {
        routes: Rc<RefCell<HashMap<(HttpMethod, String), VecDeque<ApiResult<HttpResponse>>>>>,
        pub log: Rc<RefCell<Vec<HttpRequest>>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// 为路径追加一个响应；同一路径多次调用按顺序返回，最后一个会被重复使用
        pub fn on(&self, method: HttpMethod, path: &str, response: HttpResponse) -> &Self {
            self.push(method, path, Ok(response))
        }

        pub fn fail(&self, method: HttpMethod, path: &str, error: ApiError) -> &Self {
            self.push(method, path, Err(error))
        }

        fn push(&self, method: HttpMethod, path: &str, result: ApiResult<HttpResponse>) -> &Self {
            self.routes
                .borrow_mut()
                .entry((method, path.to_string()))
                .or_default()
                .push_back(result);
            self
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.log.borrow().clone()
        }

        pub fn calls_to(&self, method: HttpMethod, path: &str) -> usize {
            self.log
                .borrow()
                .iter()
                .filter(|r| r.method == method && r.url.ends_with(path))
                .count()
        }
    }

    #[async_trait::async_trait(?Send)]
    impl HttpClient for MockHttpClient {
        async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
            self.log.borrow_mut().push(req.clone());

            let mut routes = self.routes.borrow_mut();
            let key = routes
                .keys()
                .filter(|(method, path)| *method == req.method && req.url.ends_with(path.as_str()))
                .max_by_key(|(_, path)| path.len())
                .cloned();

            let Some(key) = key else {
                return Ok(HttpResponse::new(404, "no mock route"));
            };

            let Some(queue) = routes.get_mut(&key) else {
                return Ok(HttpResponse::new(404, "no mock route"));
            };
            if queue.len() > 1 {
                queue
                    .pop_front()
                    .unwrap_or_else(|| Ok(HttpResponse::new(500, "empty mock queue")))
            } else {
                queue
                    .front()
                    .cloned()
                    .unwrap_or_else(|| Ok(HttpResponse::new(500, "empty mock queue")))
            }
        }
    }
}
