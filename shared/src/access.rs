//! 角色门禁：每个页面声明允许的角色，匿名会话一律拒绝。
//! 这里只是界面层的便利，真正的授权由后端对每个请求完成。

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Home,
    Movies,
    Tickets,
    Users,
    BuyTickets,
}

impl Screen {
    /// 菜单顺序
    pub const ALL: [Screen; 5] = [
        Screen::Home,
        Screen::Users,
        Screen::Movies,
        Screen::Tickets,
        Screen::BuyTickets,
    ];

    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Screen::Home => &[Role::Admin, Role::Staff, Role::Client],
            Screen::Users => &[Role::Admin],
            Screen::Movies | Screen::Tickets => &[Role::Staff],
            Screen::BuyTickets => &[Role::Client],
        }
    }

    pub fn admits(&self, role: Option<Role>) -> bool {
        role.is_some_and(|role| self.allowed_roles().contains(&role))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Movies => "Movies",
            Screen::Tickets => "Tickets",
            Screen::Users => "Users",
            Screen::BuyTickets => "Buy tickets",
        }
    }

    /// 导航菜单中该角色可见的页面
    pub fn menu_for(role: Option<Role>) -> Vec<Screen> {
        Screen::ALL
            .into_iter()
            .filter(|screen| screen.admits(role))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_is_always_denied() {
        for screen in Screen::ALL {
            assert!(!screen.admits(None), "{:?}", screen);
        }
        assert!(Screen::menu_for(None).is_empty());
    }

    #[test]
    fn client_sees_buy_tickets_but_not_movie_management() {
        assert!(Screen::BuyTickets.admits(Some(Role::Client)));
        assert!(!Screen::Movies.admits(Some(Role::Client)));
        assert_eq!(
            Screen::menu_for(Some(Role::Client)),
            vec![Screen::Home, Screen::BuyTickets]
        );
    }

    #[test]
    fn menus_per_role() {
        assert_eq!(
            Screen::menu_for(Some(Role::Admin)),
            vec![Screen::Home, Screen::Users]
        );
        assert_eq!(
            Screen::menu_for(Some(Role::Staff)),
            vec![Screen::Home, Screen::Movies, Screen::Tickets]
        );
    }
}
