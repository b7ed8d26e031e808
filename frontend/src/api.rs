use async_trait::async_trait;
use cinema_shared::{
    ApiError, ApiResult, CinemaApi, HttpClient, HttpMethod, HttpRequest, HttpResponse,
};
use gloo_net::http::Request;

use crate::config::AppConfig;
use crate::web::BrowserStorage;

/// 页面使用的 API 门面
pub type Api = CinemaApi<FetchClient, BrowserStorage>;

pub fn build_api(config: &AppConfig) -> Api {
    CinemaApi::new(FetchClient, BrowserStorage, config.api_config())
}

/// 基于 gloo-net (fetch) 的 HTTP 客户端
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchClient;

#[async_trait(?Send)]
impl HttpClient for FetchClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let mut builder = match req.method {
            HttpMethod::Get => Request::get(&req.url),
            HttpMethod::Post => Request::post(&req.url),
            HttpMethod::Put => Request::put(&req.url),
            HttpMethod::Delete => Request::delete(&req.url),
        };
        for (key, value) in &req.headers {
            builder = builder.header(key, value);
        }

        let request = match req.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| ApiError::Transport(e.to_string()))?;

        let res = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let mut response = HttpResponse::new(res.status(), String::new());
        for (key, value) in res.headers().entries() {
            response = response.with_header(&key, &value);
        }
        response.body = res
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(response)
    }
}
