use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =========================================================
// 实体记录 (后端使用连字符字段名，这里在边界完成转换)
// =========================================================

/// 影片；新建时 id 为空，不写入请求体
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Movie {
    #[serde(rename = "movie-id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "movie-title")]
    pub title: String,
    #[serde(rename = "movie-base-price")]
    pub base_price: f64,
    #[serde(rename = "scr-room-number")]
    pub screening_room: i32,
    #[serde(rename = "number-of-available-seats")]
    pub available_seats: i32,
}

impl Movie {
    pub fn is_available(&self) -> bool {
        self.available_seats > 0
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ticket {
    #[serde(rename = "ticket-id")]
    pub id: String,
    #[serde(rename = "movie-time")]
    pub movie_time: String,
    #[serde(rename = "ticket-final-price")]
    pub final_price: f64,
    #[serde(rename = "client-id")]
    pub client_id: String,
    #[serde(rename = "movie-id")]
    pub movie_id: String,
}

/// 新建票据的请求体（工作人员为客户创建，或客户为自己购买）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewTicket {
    #[serde(rename = "movie-time")]
    pub movie_time: String,
    #[serde(rename = "client-id")]
    pub client_id: String,
    #[serde(rename = "movie-id")]
    pub movie_id: String,
}

/// 改签：只允许修改放映时间
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TicketTimeChange {
    #[serde(rename = "ticket-id")]
    pub ticket_id: String,
    #[serde(rename = "movie-time")]
    pub movie_time: String,
}

/// 账户；同时接受账户接口 (`userID`...) 与客户列表 (`id`...) 两种拼写
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    #[serde(rename = "userID", alias = "id")]
    pub id: String,
    #[serde(rename = "userLogin", alias = "login")]
    pub login: String,
    #[serde(rename = "userStatusActive", alias = "status-active")]
    pub active: bool,
}

/// 修改密码时整条账户记录连同新密码一起提交
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdate {
    #[serde(rename = "userID")]
    pub id: String,
    #[serde(rename = "userLogin")]
    pub login: String,
    #[serde(rename = "userPassword")]
    pub password: String,
    #[serde(rename = "userStatusActive")]
    pub active: bool,
}

impl AccountUpdate {
    pub fn with_password(account: &Account, password: &str) -> Self {
        Self {
            id: account.id.clone(),
            login: account.login.clone(),
            password: password.to_string(),
            active: account.active,
        }
    }
}

/// 登录与注册共用的凭据
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "userLogin")]
    pub login: String,
    #[serde(rename = "userPassword")]
    pub password: String,
}

impl Credentials {
    pub fn new(login: &str, password: &str) -> Self {
        Self {
            login: login.to_string(),
            password: password.to_string(),
        }
    }
}

// =========================================================
// 角色
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[serde(alias = "admin")]
    Admin,
    #[serde(alias = "staff")]
    Staff,
    #[serde(alias = "client")]
    Client,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Client, Role::Staff];

    /// 路径中的单数形式：`/auth/login/{segment}`
    pub fn segment(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Client => "client",
        }
    }

    /// 账户集合路径：`/{collection}/all`
    pub fn collection(&self) -> &'static str {
        match self {
            Role::Admin => "admins",
            Role::Staff => "staffs",
            Role::Client => "clients",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Staff => "Staff",
            Role::Client => "Client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "ADMIN",
            Role::Staff => "STAFF",
            Role::Client => "CLIENT",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" | "ADMINS" => Ok(Role::Admin),
            "STAFF" | "STAFFS" => Ok(Role::Staff),
            "CLIENT" | "CLIENTS" => Ok(Role::Client),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn keys(value: &Value) -> Vec<String> {
        let mut keys: Vec<String> = value
            .as_object()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    #[test]
    fn movie_wire_keys_survive_a_round_trip() {
        let wire = json!({
            "movie-id": "m1",
            "movie-title": "Dune",
            "movie-base-price": 25.5,
            "scr-room-number": 3,
            "number-of-available-seats": 40
        });
        let movie: Movie = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(movie.title, "Dune");
        assert_eq!(movie.screening_room, 3);

        let back = serde_json::to_value(&movie).unwrap();
        assert_eq!(keys(&back), keys(&wire));
        assert_eq!(back, wire);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let movie: Movie = serde_json::from_value(json!({ "movie-id": "m2" })).unwrap();
        assert_eq!(movie.title, "");
        assert_eq!(movie.available_seats, 0);
        assert!(!movie.is_available());

        let ticket: Ticket = serde_json::from_value(json!({})).unwrap();
        assert_eq!(ticket.final_price, 0.0);

        let account: Account = serde_json::from_value(json!({ "login": "someone" })).unwrap();
        assert!(!account.active);
    }

    #[test]
    fn new_movie_omits_empty_id() {
        let movie = Movie {
            title: "Alien".into(),
            base_price: 10.0,
            screening_room: 1,
            available_seats: 5,
            ..Default::default()
        };
        let wire = serde_json::to_value(&movie).unwrap();
        assert!(wire.get("movie-id").is_none());
    }

    #[test]
    fn ticket_wire_keys_survive_a_round_trip() {
        let wire = json!({
            "ticket-id": "t1",
            "movie-time": "2024-05-01T18:30:00",
            "ticket-final-price": 30.0,
            "client-id": "c1",
            "movie-id": "m1"
        });
        let ticket: Ticket = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(serde_json::to_value(&ticket).unwrap(), wire);
    }

    #[test]
    fn account_accepts_both_spellings() {
        let from_accounts: Account = serde_json::from_value(json!({
            "userID": "u1", "userLogin": "alice123", "userStatusActive": true
        }))
        .unwrap();
        let from_clients: Account = serde_json::from_value(json!({
            "id": "u1", "login": "alice123", "status-active": true
        }))
        .unwrap();
        assert_eq!(from_accounts, from_clients);

        let wire = serde_json::to_value(AccountUpdate::with_password(&from_accounts, "newpass12"))
            .unwrap();
        assert_eq!(
            keys(&wire),
            vec!["userID", "userLogin", "userPassword", "userStatusActive"]
        );
    }

    #[test]
    fn roles_parse_from_tokens_and_paths() {
        let roles: Vec<Role> = serde_json::from_value(json!(["CLIENT", "admin"])).unwrap();
        assert_eq!(roles, vec![Role::Client, Role::Admin]);
        assert_eq!("staffs".parse::<Role>(), Ok(Role::Staff));
        assert!("guest".parse::<Role>().is_err());
        assert_eq!(Role::Staff.collection(), "staffs");
        assert_eq!(Role::Client.segment(), "client");
        assert_eq!(Role::Admin.to_string(), "ADMIN");
    }
}
