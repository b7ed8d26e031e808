use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use validator::ValidationErrors;

// =========================================================
// 字段级校验错误
// =========================================================

/// 表单字段错误集合：字段名 -> 错误消息列表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// 字段的第一条错误消息（用于表单下方提示）
    pub fn first(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut result = FormErrors::new();
        for (field, list) in errors.field_errors() {
            for error in list.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                result.push(&field.to_string(), message);
            }
        }
        result
    }
}

// =========================================================
// 冲突原因
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    /// 412/409：资源在读取 ETag 之后被修改
    StaleVersion,
    /// 后端以空响应体拒绝（如客户已停用、影片已售罄）
    Rejected(String),
    /// 影片仍被票据引用，禁止删除
    MovieHasTickets(usize),
    /// 不允许停用当前登录账户
    SelfDeactivation,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::StaleVersion => write!(
                f,
                "the resource was modified by someone else, reload it and try again"
            ),
            ConflictReason::Rejected(reason) => write!(f, "{}", reason),
            ConflictReason::MovieHasTickets(count) => write!(
                f,
                "the movie cannot be deleted because {} ticket(s) reference it",
                count
            ),
            ConflictReason::SelfDeactivation => {
                write!(f, "you cannot deactivate the account you are signed in with")
            }
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 错误大类，对应界面上的四种处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 字段错误，用户修正后重试
    Validation,
    /// 业务冲突，提示并刷新列表
    Conflict,
    /// 鉴权失败，由路由守卫处理
    Authorization,
    /// 网络、状态码或解析失败
    Transport,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(FormErrors),
    #[error("{0}")]
    Conflict(ConflictReason),
    #[error("not authenticated, please log in again")]
    Unauthorized,
    #[error("access denied")]
    Forbidden,
    #[error("resource not found")]
    NotFound,
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("invalid session token: {0}")]
    InvalidToken(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// 根据 HTTP 状态码构造错误（不含 2xx 与 401）
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = body.trim().to_string();
        match status {
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound,
            409 | 412 => ApiError::Conflict(ConflictReason::StaleVersion),
            _ => ApiError::Status { status, message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Conflict(_) => ErrorKind::Conflict,
            ApiError::Unauthorized | ApiError::Forbidden | ApiError::InvalidToken(_) => {
                ErrorKind::Authorization
            }
            ApiError::NotFound
            | ApiError::Status { .. }
            | ApiError::Transport(_)
            | ApiError::Serialization(_) => ErrorKind::Transport,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict(_))
    }
}

impl From<FormErrors> for ApiError {
    fn from(errors: FormErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_distinguishes_version_conflicts() {
        assert_eq!(
            ApiError::from_status(412, ""),
            ApiError::Conflict(ConflictReason::StaleVersion)
        );
        assert_eq!(ApiError::from_status(404, "missing"), ApiError::NotFound);
        assert_eq!(
            ApiError::from_status(400, " bad input \n"),
            ApiError::Status {
                status: 400,
                message: "bad input".to_string()
            }
        );
    }

    #[test]
    fn kinds_follow_the_four_families() {
        assert_eq!(
            ApiError::Validation(FormErrors::single("title", "required")).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ApiError::Conflict(ConflictReason::SelfDeactivation).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(ApiError::Unauthorized.kind(), ErrorKind::Authorization);
        assert_eq!(
            ApiError::Transport("offline".into()).kind(),
            ErrorKind::Transport
        );
    }

    #[test]
    fn form_errors_merge_and_display() {
        let mut errors = FormErrors::single("login", "too short");
        errors.merge(FormErrors::single("login", "already taken"));
        errors.push("password", "required");

        assert_eq!(errors.first("login"), Some("too short"));
        assert!(errors.contains("password"));
        assert_eq!(
            errors.to_string(),
            "login: too short; login: already taken; password: required"
        );
        assert!(FormErrors::new().into_result().is_ok());
    }
}
