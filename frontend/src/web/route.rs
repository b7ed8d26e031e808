//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由，以及基于角色的守卫。

use std::fmt::Display;

use cinema_shared::{Role, Screen};

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页面
    #[default]
    Login,
    /// 注册页面
    Register,
    /// 主页（所有已登录角色）
    Home,
    /// 影片管理
    Movies,
    /// 票据管理
    Tickets,
    /// 账户管理
    Users,
    /// 客户购票
    BuyTickets,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "" => Self::Home,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/movies" => Self::Movies,
            "/tickets" => Self::Tickets,
            "/users" => Self::Users,
            "/buyTickets" => Self::BuyTickets,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Home => "/",
            Self::Movies => "/movies",
            Self::Tickets => "/tickets",
            Self::Users => "/users",
            Self::BuyTickets => "/buyTickets",
            Self::NotFound => "/404",
        }
    }

    pub fn from_screen(screen: Screen) -> Self {
        match screen {
            Screen::Home => Self::Home,
            Screen::Movies => Self::Movies,
            Screen::Tickets => Self::Tickets,
            Screen::Users => Self::Users,
            Screen::BuyTickets => Self::BuyTickets,
        }
    }

    /// 受角色门禁保护的页面
    pub fn screen(&self) -> Option<Screen> {
        match self {
            Self::Home => Some(Screen::Home),
            Self::Movies => Some(Screen::Movies),
            Self::Tickets => Some(Screen::Tickets),
            Self::Users => Some(Screen::Users),
            Self::BuyTickets => Some(Screen::BuyTickets),
            Self::Login | Self::Register | Self::NotFound => None,
        }
    }

    /// 已登录用户访问时应离开的页面
    pub fn is_auth_page(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// **核心守卫逻辑**
    ///
    /// - 匿名访问受保护页面 -> 登录页
    /// - 角色不符 -> 主页
    /// - 已登录访问登录/注册页 -> 主页
    pub fn resolve(self, role: Option<Role>) -> Self {
        if self.is_auth_page() {
            return if role.is_some() { Self::Home } else { self };
        }
        match self.screen() {
            Some(_) if role.is_none() => Self::Login,
            Some(screen) if !screen.admits(role) => Self::Home,
            _ => self,
        }
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip() {
        for route in [
            AppRoute::Login,
            AppRoute::Register,
            AppRoute::Home,
            AppRoute::Movies,
            AppRoute::Tickets,
            AppRoute::Users,
            AppRoute::BuyTickets,
        ] {
            assert_eq!(AppRoute::from_path(route.to_path()), route);
        }
        assert_eq!(AppRoute::from_path("/movies/"), AppRoute::Movies);
        assert_eq!(AppRoute::from_path("/nope"), AppRoute::NotFound);
    }

    #[test]
    fn anonymous_is_sent_to_login() {
        assert_eq!(AppRoute::Home.resolve(None), AppRoute::Login);
        assert_eq!(AppRoute::Users.resolve(None), AppRoute::Login);
        assert_eq!(AppRoute::Register.resolve(None), AppRoute::Register);
        assert_eq!(AppRoute::NotFound.resolve(None), AppRoute::NotFound);
    }

    #[test]
    fn wrong_role_is_sent_home() {
        let client = Some(Role::Client);
        assert_eq!(AppRoute::Movies.resolve(client), AppRoute::Home);
        assert_eq!(AppRoute::BuyTickets.resolve(client), AppRoute::BuyTickets);
        assert_eq!(AppRoute::Users.resolve(Some(Role::Staff)), AppRoute::Home);
        assert_eq!(AppRoute::Users.resolve(Some(Role::Admin)), AppRoute::Users);
    }

    #[test]
    fn signed_in_users_leave_auth_pages() {
        assert_eq!(AppRoute::Login.resolve(Some(Role::Staff)), AppRoute::Home);
        assert_eq!(AppRoute::Register.resolve(Some(Role::Admin)), AppRoute::Home);
    }
}
