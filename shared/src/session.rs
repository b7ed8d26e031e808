//! 会话存储
//!
//! 令牌和会话账户以两个字符串条目保存在键值存储中，登出时一起删除。
//! 令牌解码只用于界面展示与路由，不做签名校验。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::models::Role;
use crate::{STORAGE_ACCOUNT_KEY, STORAGE_TOKEN_KEY};

// =========================================================
// 存储抽象
// =========================================================

/// 持久化键值存储（浏览器中为 localStorage）
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    /// 返回是否写入成功
    fn set(&self, key: &str, value: &str) -> bool;
    /// 返回是否删除成功
    fn remove(&self, key: &str) -> bool;
}

/// 内存实现，供测试与非浏览器环境使用
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&self, key: &str) -> bool {
        self.entries.borrow_mut().remove(key);
        true
    }
}

// =========================================================
// 令牌声明
// =========================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Role),
    Many(Vec<Role>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Role>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(role) => vec![role],
        OneOrMany::Many(roles) => roles,
    })
}

/// JWT 负载中关心的字段
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    #[serde(alias = "login")]
    pub sub: String,
    #[serde(
        rename = "user_role",
        alias = "role",
        alias = "roles",
        default,
        deserialize_with = "one_or_many"
    )]
    pub roles: Vec<Role>,
}

impl TokenClaims {
    /// 解码 `header.payload.signature` 中间段
    pub fn decode(token: &str) -> ApiResult<Self> {
        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| ApiError::InvalidToken("token is not a JWT".to_string()))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| ApiError::InvalidToken(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidToken(e.to_string()))
    }
}

// =========================================================
// 会话
// =========================================================

/// 持久化的会话账户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAccount {
    pub login: String,
    pub role: Role,
}

impl TryFrom<TokenClaims> for SessionAccount {
    type Error = ApiError;

    fn try_from(claims: TokenClaims) -> ApiResult<Self> {
        let role = claims
            .roles
            .first()
            .copied()
            .ok_or_else(|| ApiError::InvalidToken("token carries no role".to_string()))?;
        Ok(SessionAccount {
            login: claims.sub,
            role,
        })
    }
}

#[derive(Clone)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 可用令牌；空串与字面量 "null" 视为不存在
    pub fn get_token(&self) -> Option<String> {
        self.store
            .get(STORAGE_TOKEN_KEY)
            .filter(|token| !token.trim().is_empty() && token != "null")
    }

    pub fn set_token(&self, token: &str) {
        if !self.store.set(STORAGE_TOKEN_KEY, token) {
            warn!("Failed to persist session token");
        }
    }

    pub fn set_account(&self, account: &SessionAccount) -> ApiResult<()> {
        let json = serde_json::to_string(account)?;
        if !self.store.set(STORAGE_ACCOUNT_KEY, &json) {
            warn!("Failed to persist session account");
        }
        Ok(())
    }

    /// 当前账户；没有可用令牌时一律视为匿名
    pub fn account(&self) -> Option<SessionAccount> {
        self.get_token()?;
        let raw = self.store.get(STORAGE_ACCOUNT_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(account) => Some(account),
            Err(e) => {
                warn!("Stored session account is unreadable: {}", e);
                None
            }
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.account().map(|account| account.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }

    /// 登录成功后：解码令牌并写入两个条目
    pub fn establish(&self, token: &str) -> ApiResult<SessionAccount> {
        let account = SessionAccount::try_from(TokenClaims::decode(token)?)?;
        self.set_token(token);
        self.set_account(&account)?;
        debug!("Session established for {} ({})", account.login, account.role);
        Ok(account)
    }

    pub fn clear(&self) {
        self.store.remove(STORAGE_TOKEN_KEY);
        self.store.remove(STORAGE_ACCOUNT_KEY);
        debug!("Session cleared");
    }
}
