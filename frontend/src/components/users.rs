use cinema_shared::filters::filter_by_login;
use cinema_shared::{Account, MutationFlow, Role};
use leptos::prelude::*;

use crate::auth::use_auth;
use crate::components::forms::{AccountFormState, PasswordFormState};
use crate::components::mutation_dialog::{MutationDialog, TextField, field_error};
use crate::components::notice::use_notifier;
use crate::components::table::{ListStatus, SearchBox};
use crate::flow::commit;
use crate::resource::RemoteResource;

/// 账户管理（仅管理员）
#[component]
pub fn UsersPage() -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();

    let role = RwSignal::new(Role::Admin);
    let accounts = RemoteResource::<Account>::new();
    let query = RwSignal::new(String::new());

    let load = move || {
        let current = role.get_untracked();
        accounts.reload(auth, move |api| async move { api.accounts(current).await });
    };

    // 切换标签页时重新拉取
    Effect::new(move |_| {
        role.track();
        accounts.reset();
        load();
    });

    let visible = move || filter_by_login(&accounts.items(), &query.get());

    // =========================================================
    // 启用 / 停用
    // =========================================================

    let status_flow = RwSignal::new(MutationFlow::<Account>::new());

    let on_status_submit = Callback::new(move |_: ()| {
        status_flow.update(|f| {
            f.submit(Ok(()));
        });
    });

    let on_status_confirm = Callback::new(move |_: ()| {
        let Some(account) = status_flow.with_untracked(|f| f.target().cloned()) else {
            return;
        };
        let current = role.get_untracked();
        let active = !account.active;
        commit(
            status_flow,
            auth,
            notifier,
            if active { "Account activated" } else { "Account deactivated" },
            move |api| async move { api.set_account_status(current, &account, active).await },
            load,
        );
    });

    let status_title = Signal::derive(move || {
        status_flow.with(|f| {
            f.target()
                .map(|a| {
                    let verb = if a.active { "Deactivate" } else { "Activate" };
                    format!("{} {}?", verb, a.login)
                })
                .unwrap_or_default()
        })
    });

    // =========================================================
    // 新建账户
    // =========================================================

    let create_flow = RwSignal::new(MutationFlow::<()>::new());
    let create_form = AccountFormState::new();

    let open_create = move |_| {
        create_form.reset();
        create_flow.update(|f| f.open_create());
    };

    let on_create_submit = Callback::new(move |_: ()| {
        let existing = accounts.items();
        let validation = create_form.snapshot().check_against(&existing);
        create_flow.update(|f| {
            f.submit(validation);
        });
    });

    let on_create_confirm = Callback::new(move |_: ()| {
        let credentials = create_form.snapshot().credentials();
        let current = role.get_untracked();
        commit(
            create_flow,
            auth,
            notifier,
            "Account created",
            move |api| async move { api.register(current, credentials).await },
            load,
        );
    });

    // =========================================================
    // 修改密码
    // =========================================================

    let password_flow = RwSignal::new(MutationFlow::<Account>::new());
    let password_form = PasswordFormState::new();

    let open_password = move |account: Account| {
        password_form.reset();
        password_flow.update(|f| f.open_edit(account));
    };

    let on_password_submit = Callback::new(move |_: ()| {
        let validation = password_form.to_form().map(|_| ());
        password_flow.update(|f| {
            f.submit(validation);
        });
    });

    let on_password_confirm = Callback::new(move |_: ()| {
        let Some(account_id) = password_flow.with_untracked(|f| f.target().map(|a| a.id.clone()))
        else {
            return;
        };
        let password = password_form.password.get_untracked();
        let current = role.get_untracked();
        commit(
            password_flow,
            auth,
            notifier,
            "Password changed",
            move |api| async move { api.change_password(current, &account_id, &password).await },
            load,
        );
    });

    let password_title = Signal::derive(move || {
        password_flow.with(|f| {
            f.target()
                .map(|a| format!("Change password of {}", a.login))
                .unwrap_or_default()
        })
    });

    view! {
        <div class="max-w-7xl mx-auto p-4 md:p-8 space-y-6">
            <div role="tablist" class="tabs tabs-boxed w-fit">
                {Role::ALL.iter().map(|r| {
                    let r = *r;
                    view! {
                        <a
                            role="tab"
                            class=move || if role.get() == r { "tab tab-active" } else { "tab" }
                            on:click=move |_| role.set(r)
                        >
                            {r.label()}
                        </a>
                    }
                }).collect_view()}
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex flex-wrap items-center justify-between gap-4 p-6 pb-2">
                        <div>
                            <h3 class="card-title">"Accounts"</h3>
                            <p class="text-base-content/70 text-sm">{move || format!("{} {}", accounts.len(), role.get().collection())}</p>
                        </div>
                        <div class="flex gap-2">
                            <SearchBox query=query placeholder="Filter by login" />
                            <button class="btn btn-primary" on:click=open_create>"New account"</button>
                        </div>
                    </div>

                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"Login"</th>
                                    <th>"Status"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <ListStatus
                                    columns=3
                                    loading=Signal::derive(move || accounts.is_loading())
                                    error=Signal::derive(move || accounts.error())
                                    empty=Signal::derive(move || visible().is_empty())
                                    empty_text="No accounts found."
                                />
                                {move || visible().into_iter().map(|account| {
                                    let current = role.get_untracked();
                                    // 不能停用自己
                                    let is_self = auth.is_current(current, &account.login);
                                    let for_status = account.clone();
                                    let for_password = account.clone();
                                    view! {
                                        <tr>
                                            <td class="font-medium">
                                                {account.login.clone()}
                                                {is_self.then(|| view! { <span class="badge badge-ghost ml-2">"you"</span> })}
                                            </td>
                                            <td>
                                                <span class=if account.active { "badge badge-success" } else { "badge badge-error" }>
                                                    {if account.active { "active" } else { "inactive" }}
                                                </span>
                                            </td>
                                            <td class="text-right space-x-2">
                                                <button
                                                    class="btn btn-ghost btn-sm"
                                                    disabled=is_self
                                                    on:click=move |_| status_flow.update(|f| f.open_confirm(for_status.clone()))
                                                >
                                                    {if account.active { "Deactivate" } else { "Activate" }}
                                                </button>
                                                <button class="btn btn-ghost btn-sm" on:click=move |_| open_password(for_password.clone())>
                                                    "Change password"
                                                </button>
                                            </td>
                                        </tr>
                                    }
                                }).collect_view()}
                            </tbody>
                        </table>
                    </div>
                </div>
            </div>

            <MutationDialog
                flow=status_flow
                title=status_title
                on_submit=on_status_submit
                on_confirm=on_status_confirm
            >
                <p>"The change takes effect immediately."</p>
            </MutationDialog>

            <MutationDialog
                flow=create_flow
                title=Signal::derive(move || format!("New {} account", role.get().label()))
                on_submit=on_create_submit
                on_confirm=on_create_confirm
            >
                <TextField label="Login" value=create_form.login error=field_error(create_flow, "login") />
                <TextField
                    label="Password"
                    value=create_form.password
                    input_type="password"
                    error=field_error(create_flow, "password")
                />
                <TextField
                    label="Confirm password"
                    value=create_form.confirm_password
                    input_type="password"
                    error=field_error(create_flow, "confirm_password")
                />
            </MutationDialog>

            <MutationDialog
                flow=password_flow
                title=password_title
                on_submit=on_password_submit
                on_confirm=on_password_confirm
            >
                <TextField
                    label="New password"
                    value=password_form.password
                    input_type="password"
                    error=field_error(password_flow, "password")
                />
                <TextField
                    label="Confirm password"
                    value=password_form.confirm_password
                    input_type="password"
                    error=field_error(password_flow, "confirm_password")
                />
            </MutationDialog>
        </div>
    }
}
