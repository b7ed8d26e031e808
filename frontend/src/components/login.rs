use cinema_shared::validation::LoginForm;
use cinema_shared::{ApiError, FormErrors, Role};
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::warn;

use crate::auth::{login, use_auth};
use crate::components::mutation_dialog::FieldError;
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 角色选择框（登录页与注册页共用）
#[component]
pub fn RoleSelect(role: RwSignal<Role>) -> impl IntoView {
    view! {
        <div class="form-control">
            <label class="label" for="role">
                <span class="label-text">"Role"</span>
            </label>
            <select
                id="role"
                class="select select-bordered"
                on:change=move |ev| {
                    if let Ok(selected) = event_target_value(&ev).parse::<Role>() {
                        role.set(selected);
                    }
                }
            >
                {Role::ALL
                    .iter()
                    .map(|r| {
                        let r = *r;
                        view! {
                            <option value=r.segment() selected=move || role.get() == r>
                                {r.label()}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
        </div>
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();

    let role = RwSignal::new(Role::Client);
    let login_name = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let is_submitting = RwSignal::new(false);
    let error_msg = RwSignal::new(Option::<String>::None);
    let field_errors = RwSignal::new(FormErrors::new());

    let field = move |name: &'static str| {
        Signal::derive(move || field_errors.with(|e| e.first(name).map(str::to_string)))
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }
        let form = LoginForm {
            login: login_name.get_untracked(),
            password: password.get_untracked(),
        };
        if let Err(errors) = form.check() {
            field_errors.set(errors);
            return;
        }
        field_errors.set(FormErrors::new());
        is_submitting.set(true);
        error_msg.set(None);

        let selected = role.get_untracked();
        spawn_local(async move {
            // 成功后角色信号变化，路由服务会自动离开登录页
            if let Err(e) = login(&auth, selected, form.credentials()).await {
                warn!("Login failed: {}", e);
                let message = match e {
                    ApiError::Unauthorized | ApiError::Conflict(_) => {
                        "Wrong login, password or role.".to_string()
                    }
                    other => other.to_string(),
                };
                error_msg.set(Some(message));
            }
            is_submitting.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"Cinema"</h1>
                    <p class="text-base-content/70">"Sign in to manage movies and tickets"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <RoleSelect role=role />

                        <div class="form-control">
                            <label class="label" for="login">
                                <span class="label-text">"Login"</span>
                            </label>
                            <input
                                id="login"
                                type="text"
                                on:input=move |ev| login_name.set(event_target_value(&ev))
                                prop:value=login_name
                                class="input input-bordered"
                            />
                            <FieldError message=field("login") />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                placeholder="••••••••"
                                on:input=move |ev| password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                            />
                            <FieldError message=field("password") />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                                } else {
                                    "Sign in".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-sm text-center mt-2">
                            "No account yet? "
                            <Link to=AppRoute::Register class="link link-primary">"Register"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
