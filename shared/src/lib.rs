//! 影院后台的平台无关核心
//!
//! 不依赖浏览器 API，所有 I/O 通过 trait 注入：
//! - `http::HttpClient`: 发送 HTTP 请求
//! - `session::KeyValueStore`: 持久化会话
//!
//! 前端 crate 提供浏览器实现，测试使用内存实现。

pub mod access;
pub mod error;
pub mod filters;
pub mod gateway;
pub mod http;
pub mod models;
pub mod mutation;
pub mod protocol;
pub mod resource;
pub mod service;
pub mod session;
pub mod validation;

pub use access::Screen;
pub use error::{ApiError, ApiResult, ConflictReason, ErrorKind, FormErrors};
pub use gateway::{ApiConfig, CredentialSource, Gateway, Versioned};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use models::{Account, AccountUpdate, Credentials, Movie, Role, Ticket};
pub use mutation::{
    CommitOutcome, CommitPermit, FlowCell, FlowEvent, FlowMode, FlowState, MutationFlow,
};
pub use resource::{LoadStatus, RemoteList};
pub use service::{CinemaApi, TicketScope};
pub use session::{KeyValueStore, MemoryStore, SessionAccount, SessionStore};

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_ETAG: &str = "ETag";
pub const HEADER_IF_MATCH: &str = "If-Match";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// localStorage 中的令牌键
pub const STORAGE_TOKEN_KEY: &str = "token";
/// localStorage 中的会话账户键
pub const STORAGE_ACCOUNT_KEY: &str = "account";
