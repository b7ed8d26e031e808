//! 带认证的请求网关
//!
//! 所有请求经由这里：拼接基础地址、附加 JSON 与 Bearer 头、
//! 统一把状态码映射成 `ApiError`。401 会在这里集中清除会话。

use tracing::{debug, error, warn};

use crate::error::{ApiError, ApiResult};
use crate::http::{HttpClient, HttpRequest, HttpResponse};
use crate::protocol::ApiRequest;
use crate::session::{KeyValueStore, SessionStore};
use crate::{
    CONTENT_TYPE_JSON, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE, HEADER_ETAG, HEADER_IF_MATCH,
};


// =========================================================
// 配置
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

// =========================================================
// 凭据来源
// =========================================================

/// 网关需要的会话能力：读取令牌、在 401 时登出
pub trait CredentialSource {
    fn bearer_token(&self) -> Option<String>;
    fn on_unauthorized(&self);
}

impl<S: KeyValueStore> CredentialSource for SessionStore<S> {
    fn bearer_token(&self) -> Option<String> {
        self.get_token()
    }

    fn on_unauthorized(&self) {
        warn!("Backend answered 401, clearing the session");
        self.clear();
    }
}

/// 带 ETag 的读取结果
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub tag: String,
}

// =========================================================
// 网关
// =========================================================

pub struct Gateway<C, T> {
    client: C,
    credentials: T,
    config: ApiConfig,
}

impl<C: HttpClient, T: CredentialSource> Gateway<C, T> {
    pub fn new(client: C, credentials: T, config: ApiConfig) -> Self {
        Self {
            client,
            credentials,
            config,
        }
    }

    pub fn credentials(&self) -> &T {
        &self.credentials
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn build<R: ApiRequest>(&self, req: &R, if_match: Option<&str>) -> ApiResult<HttpRequest> {
        let mut http = HttpRequest::new(&self.config.url(&req.path()), R::METHOD)
            .with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON);

        if let Some(token) = self.credentials.bearer_token() {
            http = http.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
        }
        if let Some(tag) = if_match {
            http = http.with_header(HEADER_IF_MATCH, tag);
        }
        if let Some(body) = req.body()? {
            http = http.with_body(body);
        }
        Ok(http)
    }

    async fn dispatch(&self, http: HttpRequest) -> ApiResult<HttpResponse> {
        let method = http.method;
        let url = http.url.clone();
        debug!("{} {}", method.as_str(), url);

        let response = self.client.send(http).await.map_err(|e| {
            error!("{} {} failed: {}", method.as_str(), url, e);
            e
        })?;

        if response.is_success() {
            return Ok(response);
        }

        if response.status == 401 {
            self.credentials.on_unauthorized();
            return Err(ApiError::Unauthorized);
        }

        let err = ApiError::from_status(response.status, &response.body);
        error!("{} {} -> {}: {}", method.as_str(), url, response.status, err);
        Err(err)
    }

    /// 发送请求并解码响应
    pub async fn send<R: ApiRequest>(&self, req: &R) -> ApiResult<R::Response> {
        let response = self.dispatch(self.build(req, None)?).await?;
        R::decode(&response.body)
    }

    /// 读取资源并取出 ETag；没有 ETag 时无法做条件更新，按错误处理
    pub async fn fetch_versioned<R: ApiRequest>(
        &self,
        req: &R,
    ) -> ApiResult<Versioned<R::Response>> {
        let response = self.dispatch(self.build(req, None)?).await?;
        let tag = response
            .header(HEADER_ETAG)
            .map(str::to_string)
            .ok_or_else(|| {
                warn!("{} returned no ETag", req.path());
                ApiError::Status {
                    status: response.status,
                    message: "the response carried no ETag".to_string(),
                }
            })?;
        let value = R::decode(&response.body)?;
        Ok(Versioned { value, tag })
    }

    /// 携带 `If-Match` 发送写请求
    pub async fn send_if_match<R: ApiRequest>(&self, req: &R, tag: &str) -> ApiResult<R::Response> {
        let response = self.dispatch(self.build(req, Some(tag))?).await?;
        R::decode(&response.body)
    }

    /// 先读后写：读取得到 ETag，再用读取结果构造条件写请求
    pub async fn update_versioned<R, W, F>(
        &self,
        read: &R,
        build_write: F,
    ) -> ApiResult<W::Response>
    where
        R: ApiRequest,
        W: ApiRequest,
        F: FnOnce(R::Response) -> ApiResult<W>,
    {
        let Versioned { value, tag } = self.fetch_versioned(read).await?;
        let write = build_write(value)?;
        self.send_if_match(&write, &tag).await
    }
}
