use cinema_shared::{FormErrors, Role};
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::{info, warn};

use crate::auth::use_auth;
use crate::components::forms::AccountFormState;
use crate::components::login::RoleSelect;
use crate::components::mutation_dialog::FieldError;
use crate::components::notice::use_notifier;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();
    let router = use_router();

    let role = RwSignal::new(Role::Client);
    let form = AccountFormState::new();
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
        let account = form.snapshot();
        if let Err(errors) = account.check() {
            field_errors.set(errors);
            return;
        }
        field_errors.set(FormErrors::new());
        is_submitting.set(true);
        error_msg.set(None);

        let selected = role.get_untracked();
        let api = auth.api();
        spawn_local(async move {
            match api.register(selected, account.credentials()).await {
                Ok(()) => {
                    info!("Registered {} as {}", account.login, selected);
                    form.reset();
                    notifier.success("Account created, please log in");
                    router.navigate(AppRoute::Login.to_path());
                }
                Err(e) => {
                    warn!("Registration failed: {}", e);
                    error_msg.set(Some(e.to_string()));
                }
            }
            is_submitting.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"Create an account"</h1>
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
                                on:input=move |ev| form.login.set(event_target_value(&ev))
                                prop:value=form.login
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
                                on:input=move |ev| form.password.set(event_target_value(&ev))
                                prop:value=form.password
                                class="input input-bordered"
                            />
                            <FieldError message=field("password") />
                        </div>
                        <div class="form-control">
                            <label class="label" for="confirm_password">
                                <span class="label-text">"Confirm password"</span>
                            </label>
                            <input
                                id="confirm_password"
                                type="password"
                                on:input=move |ev| form.confirm_password.set(event_target_value(&ev))
                                prop:value=form.confirm_password
                                class="input input-bordered"
                            />
                            <FieldError message=field("confirm_password") />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Creating..." }.into_any()
                                } else {
                                    "Register".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-sm text-center mt-2">
                            "Already registered? "
                            <Link to=AppRoute::Login class="link link-primary">"Log in"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
