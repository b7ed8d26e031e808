use cinema_shared::Screen;
use leptos::prelude::*;

use crate::auth::{logout, use_auth};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

/// 顶部导航：菜单项按角色过滤
#[component]
pub fn NavBar() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let account = auth.account;

    let menu = move || Screen::menu_for(account.get().map(|a| a.role));

    let on_logout = move |_| logout(&auth);

    view! {
        <div class="navbar bg-base-100 shadow-xl">
            <div class="flex-1 gap-2">
                <span class="btn btn-ghost text-xl">"Cinema"</span>
                <ul class="menu menu-horizontal px-1">
                    <For
                        each=menu
                        key=|screen| *screen
                        children=move |screen| {
                            let route = AppRoute::from_screen(screen);
                            view! {
                                <li class:font-bold=move || router.current_route().get() == route>
                                    <Link to=route>{screen.label()}</Link>
                                </li>
                            }
                        }
                    />
                </ul>
            </div>
            <div class="flex-none gap-2">
                {move || match account.get() {
                    Some(current) => view! {
                        <span class="badge badge-neutral hidden md:inline-flex">
                            {current.login} " · " {current.role.label()}
                        </span>
                        <button on:click=on_logout class="btn btn-outline btn-error btn-sm">
                            "Log out"
                        </button>
                    }.into_any(),
                    None => view! {
                        <Link to=AppRoute::Login class="btn btn-primary btn-sm">"Log in"</Link>
                    }.into_any(),
                }}
            </div>
        </div>
    }
}
