//! 表单状态管理模块
//!
//! 将零散的 signal 整合为结构体，负责：
//! - 数据的持有
//! - 数据的重置 / 预填
//! - 数据到校验表单的转换

use cinema_shared::validation::{
    AccountForm, MovieForm, OwnTicketForm, PasswordForm, TicketForm, TicketTimeForm, parse_number,
};
use cinema_shared::{FormErrors, Movie, Ticket};
use leptos::prelude::*;

/// 影片表单；数字字段保存输入框原文，提交时再解析
///
/// 使用 `RwSignal` 因为它实现了 `Copy` trait，非常适合作为 Props 在组件间传递。
#[derive(Clone, Copy)]
pub struct MovieFormState {
    pub title: RwSignal<String>,
    pub base_price: RwSignal<String>,
    pub screening_room: RwSignal<String>,
    pub available_seats: RwSignal<String>,
}

impl MovieFormState {
    pub fn new() -> Self {
        Self {
            title: RwSignal::new(String::new()),
            base_price: RwSignal::new("0".to_string()),
            screening_room: RwSignal::new("1".to_string()),
            available_seats: RwSignal::new("0".to_string()),
        }
    }

    pub fn reset(&self) {
        self.title.set(String::new());
        self.base_price.set("0".to_string());
        self.screening_room.set("1".to_string());
        self.available_seats.set("0".to_string());
    }

    pub fn fill(&self, movie: &Movie) {
        self.title.set(movie.title.clone());
        self.base_price.set(movie.base_price.to_string());
        self.screening_room.set(movie.screening_room.to_string());
        self.available_seats.set(movie.available_seats.to_string());
    }

    /// 解析数字并执行字段校验
    pub fn to_form(&self) -> Result<MovieForm, FormErrors> {
        let mut errors = FormErrors::new();
        let base_price = parse_number(&self.base_price.get_untracked(), "base_price", &mut errors);
        let screening_room =
            parse_number(&self.screening_room.get_untracked(), "screening_room", &mut errors);
        let available_seats =
            parse_number(&self.available_seats.get_untracked(), "available_seats", &mut errors);

        let form = MovieForm {
            title: self.title.get_untracked(),
            base_price: base_price.unwrap_or_default(),
            screening_room: screening_room.unwrap_or_default(),
            available_seats: available_seats.unwrap_or_default(),
        };
        if let Err(field_errors) = form.check() {
            errors.merge(field_errors);
        }
        errors.into_result().map(|()| form)
    }
}

/// 工作人员开票
#[derive(Clone, Copy)]
pub struct TicketFormState {
    pub movie_time: RwSignal<String>,
    pub client_id: RwSignal<String>,
    pub movie_id: RwSignal<String>,
}

impl TicketFormState {
    pub fn new() -> Self {
        Self {
            movie_time: RwSignal::new(String::new()),
            client_id: RwSignal::new(String::new()),
            movie_id: RwSignal::new(String::new()),
        }
    }

    pub fn reset(&self) {
        self.movie_time.set(String::new());
        self.client_id.set(String::new());
        self.movie_id.set(String::new());
    }

    pub fn to_form(&self) -> Result<TicketForm, FormErrors> {
        let form = TicketForm {
            movie_time: self.movie_time.get_untracked(),
            client_id: self.client_id.get_untracked(),
            movie_id: self.movie_id.get_untracked(),
        };
        form.check().map(|()| form)
    }
}

/// 客户自助购票
#[derive(Clone, Copy)]
pub struct OwnTicketFormState {
    pub movie_time: RwSignal<String>,
    pub movie_id: RwSignal<String>,
}

impl OwnTicketFormState {
    pub fn new() -> Self {
        Self {
            movie_time: RwSignal::new(String::new()),
            movie_id: RwSignal::new(String::new()),
        }
    }

    pub fn reset(&self) {
        self.movie_time.set(String::new());
        self.movie_id.set(String::new());
    }

    pub fn to_form(&self) -> Result<OwnTicketForm, FormErrors> {
        let form = OwnTicketForm {
            movie_time: self.movie_time.get_untracked(),
            movie_id: self.movie_id.get_untracked(),
        };
        form.check().map(|()| form)
    }
}

/// 改签，只编辑时间
#[derive(Clone, Copy)]
pub struct TicketTimeFormState {
    pub movie_time: RwSignal<String>,
}

impl TicketTimeFormState {
    pub fn new() -> Self {
        Self {
            movie_time: RwSignal::new(String::new()),
        }
    }

    pub fn fill(&self, ticket: &Ticket) {
        self.movie_time.set(ticket.movie_time.clone());
    }

    pub fn to_form(&self) -> Result<TicketTimeForm, FormErrors> {
        let form = TicketTimeForm {
            movie_time: self.movie_time.get_untracked(),
        };
        form.check().map(|()| form)
    }
}

/// 新建账户（注册页与账户管理共用）
#[derive(Clone, Copy)]
pub struct AccountFormState {
    pub login: RwSignal<String>,
    pub password: RwSignal<String>,
    pub confirm_password: RwSignal<String>,
}

impl AccountFormState {
    pub fn new() -> Self {
        Self {
            login: RwSignal::new(String::new()),
            password: RwSignal::new(String::new()),
            confirm_password: RwSignal::new(String::new()),
        }
    }

    pub fn reset(&self) {
        self.login.set(String::new());
        self.password.set(String::new());
        self.confirm_password.set(String::new());
    }

    pub fn snapshot(&self) -> AccountForm {
        AccountForm {
            login: self.login.get_untracked().trim().to_string(),
            password: self.password.get_untracked(),
            confirm_password: self.confirm_password.get_untracked(),
        }
    }
}

/// 修改密码
#[derive(Clone, Copy)]
pub struct PasswordFormState {
    pub password: RwSignal<String>,
    pub confirm_password: RwSignal<String>,
}

impl PasswordFormState {
    pub fn new() -> Self {
        Self {
            password: RwSignal::new(String::new()),
            confirm_password: RwSignal::new(String::new()),
        }
    }

    pub fn reset(&self) {
        self.password.set(String::new());
        self.confirm_password.set(String::new());
    }

    pub fn to_form(&self) -> Result<PasswordForm, FormErrors> {
        let form = PasswordForm {
            password: self.password.get_untracked(),
            confirm_password: self.confirm_password.get_untracked(),
        };
        form.check().map(|()| form)
    }
}
