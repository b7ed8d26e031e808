//! 表单校验：必填、格式、数值范围、长度与两次密码一致。
//! 只有通过校验的提交才会进入等待确认状态。

use std::str::FromStr;

use chrono::NaiveDateTime;
use validator::{Validate, ValidationError};

use crate::error::FormErrors;
use crate::models::{Account, Credentials, Movie, NewTicket, TicketTimeChange};

/// 放映时间格式 `YYYY-MM-DDTHH:MM:SS`
pub const MOVIE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn validate_movie_time(value: &str) -> Result<(), ValidationError> {
    let shape_ok = value.len() == 19
        && value.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            10 => c == 'T',
            13 | 16 => c == ':',
            _ => c.is_ascii_digit(),
        });
    if shape_ok && NaiveDateTime::parse_from_str(value, MOVIE_TIME_FORMAT).is_ok() {
        Ok(())
    } else {
        Err(ValidationError::new("movie_time"))
    }
}

/// 表单里允许出现的数字类型
pub trait FormNumber: FromStr {
    fn is_finite_number(&self) -> bool {
        true
    }
}

impl FormNumber for i32 {}

impl FormNumber for f64 {
    fn is_finite_number(&self) -> bool {
        self.is_finite()
    }
}

/// 把输入框文本解析成数字，失败时记录字段错误。
/// `NaN` 与无穷大不算数字。
pub fn parse_number<T: FormNumber>(raw: &str, field: &str, errors: &mut FormErrors) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.push(field, "this field is required");
        return None;
    }
    match raw.parse::<T>() {
        Ok(value) if value.is_finite_number() => Some(value),
        _ => {
            errors.push(field, "must be a number");
            None
        }
    }
}

fn check<V: Validate>(form: &V) -> Result<(), FormErrors> {
    form.validate().map_err(FormErrors::from)
}

// =========================================================
// 影片
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct MovieForm {
    #[validate(length(min = 1, max = 150, message = "title must be 1 to 150 characters"))]
    pub title: String,
    #[validate(range(min = 0.0, max = 100.0, message = "base price must be between 0 and 100"))]
    pub base_price: f64,
    #[validate(range(min = 1, max = 30, message = "screening room must be between 1 and 30"))]
    pub screening_room: i32,
    #[validate(range(min = 0, max = 120, message = "available seats must be between 0 and 120"))]
    pub available_seats: i32,
}

impl MovieForm {
    pub fn from_movie(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            base_price: movie.base_price,
            screening_room: movie.screening_room,
            available_seats: movie.available_seats,
        }
    }

    pub fn check(&self) -> Result<(), FormErrors> {
        check(self)
    }

    /// `id` 为空表示新建
    pub fn to_movie(&self, id: &str) -> Movie {
        Movie {
            id: id.to_string(),
            title: self.title.trim().to_string(),
            base_price: self.base_price,
            screening_room: self.screening_room,
            available_seats: self.available_seats,
        }
    }
}

// =========================================================
// 票据
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct TicketForm {
    #[validate(custom(
        function = "validate_movie_time",
        message = "time must look like YYYY-MM-DDTHH:MM:SS"
    ))]
    pub movie_time: String,
    #[validate(length(min = 1, message = "choose a client"))]
    pub client_id: String,
    #[validate(length(min = 1, message = "choose a movie"))]
    pub movie_id: String,
}

impl TicketForm {
    pub fn check(&self) -> Result<(), FormErrors> {
        check(self)
    }

    pub fn to_ticket(&self) -> NewTicket {
        NewTicket {
            movie_time: self.movie_time.trim().to_string(),
            client_id: self.client_id.clone(),
            movie_id: self.movie_id.clone(),
        }
    }
}

/// 客户自助购票：客户即当前登录账户
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct OwnTicketForm {
    #[validate(custom(
        function = "validate_movie_time",
        message = "time must look like YYYY-MM-DDTHH:MM:SS"
    ))]
    pub movie_time: String,
    #[validate(length(min = 1, message = "choose a movie"))]
    pub movie_id: String,
}

impl OwnTicketForm {
    pub fn check(&self) -> Result<(), FormErrors> {
        check(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct TicketTimeForm {
    #[validate(custom(
        function = "validate_movie_time",
        message = "time must look like YYYY-MM-DDTHH:MM:SS"
    ))]
    pub movie_time: String,
}

impl TicketTimeForm {
    pub fn check(&self) -> Result<(), FormErrors> {
        check(self)
    }

    pub fn to_change(&self, ticket_id: &str) -> TicketTimeChange {
        TicketTimeChange {
            ticket_id: ticket_id.to_string(),
            movie_time: self.movie_time.trim().to_string(),
        }
    }
}

// =========================================================
// 账户
// =========================================================

/// 注册与管理员新建账户共用
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct AccountForm {
    #[validate(length(min = 8, max = 20, message = "login must be 8 to 20 characters"))]
    pub login: String,
    #[validate(length(min = 8, max = 40, message = "password must be 8 to 40 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub confirm_password: String,
}

impl AccountForm {
    pub fn check(&self) -> Result<(), FormErrors> {
        check(self)
    }

    /// 额外要求登录名不与已加载的账户重复
    pub fn check_against(&self, existing: &[Account]) -> Result<(), FormErrors> {
        let mut errors = match self.check() {
            Ok(()) => FormErrors::new(),
            Err(errors) => errors,
        };
        if existing.iter().any(|a| a.login == self.login) {
            errors.push("login", "this login already exists");
        }
        errors.into_result()
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.login, &self.password)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct PasswordForm {
    #[validate(length(min = 8, max = 40, message = "password must be 8 to 40 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub confirm_password: String,
}

impl PasswordForm {
    pub fn check(&self) -> Result<(), FormErrors> {
        check(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "login is required"))]
    pub login: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl LoginForm {
    pub fn check(&self) -> Result<(), FormErrors> {
        check(self)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.login.trim(), &self.password)
    }
}
