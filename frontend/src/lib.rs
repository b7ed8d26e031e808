//! 影院后台前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义与角色守卫
//! - `web::router`: 路由服务（核心引擎）
//! - `auth`: 会话状态管理
//! - `components`: 页面与 UI 组件

mod api;
mod auth;
pub mod config;
mod flow;
mod resource;
mod components {
    pub mod forms;
    pub mod home;
    pub mod login;
    pub mod movies;
    pub mod mutation_dialog;
    pub mod nav;
    pub mod notice;
    pub mod register;
    pub mod table;
    pub mod tickets;
    pub mod users;
}

use crate::auth::AuthContext;
use crate::components::home::HomePage;
use crate::components::login::LoginPage;
use crate::components::movies::MoviesPage;
use crate::components::nav::NavBar;
use crate::components::notice::{NoticeToast, Notifier};
use crate::components::register::RegisterPage;
use crate::components::tickets::{BuyTicketsPage, TicketsPage};
use crate::components::users::UsersPage;
use crate::config::AppConfig;

use leptos::prelude::*;

// 浏览器 API 适配层
pub(crate) mod web {
    pub mod console;
    mod dialog;
    pub mod route;
    pub mod router;
    mod storage;

    pub use dialog::alert;
    pub use storage::BrowserStorage;
}

pub use web::console::init as init_logging;

use web::route::AppRoute;
use web::router::{Link, Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。角色检查已由路由服务完成。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Movies => view! { <MoviesPage /> }.into_any(),
        AppRoute::Tickets => view! { <TicketsPage /> }.into_any(),
        AppRoute::BuyTickets => view! { <BuyTicketsPage /> }.into_any(),
        AppRoute::Users => view! { <UsersPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-[60vh]">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                    <Link to=AppRoute::Home class="btn btn-link mt-4">"Back home"</Link>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App(config: AppConfig) -> impl IntoView {
    // 1. 创建认证上下文（从 LocalStorage 恢复会话）
    let auth_ctx = AuthContext::new(api::build_api(&config));
    provide_context(auth_ctx);

    // 2. 全局通知
    provide_context(Notifier::new());

    // 3. 获取角色信号，用于注入路由服务
    let role = auth_ctx.role_signal();

    view! {
        // 4. 路由器组件：注入角色信号实现守卫
        <Router role=role>
            <div class="min-h-screen bg-base-200 font-sans">
                <NavBar />
                <RouterOutlet matcher=route_matcher />
            </div>
            <NoticeToast />
        </Router>
    }
}
