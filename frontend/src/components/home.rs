use cinema_shared::MutationFlow;
use leptos::prelude::*;

use crate::auth::use_auth;
use crate::components::forms::PasswordFormState;
use crate::components::mutation_dialog::{MutationDialog, TextField, field_error};
use crate::components::notice::use_notifier;
use crate::flow::commit;

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();

    let flow = RwSignal::new(MutationFlow::<()>::new());
    let form = PasswordFormState::new();

    let open_dialog = move |_| {
        form.reset();
        flow.update(|f| f.open_create());
    };

    let on_submit = Callback::new(move |_: ()| {
        let validation = form.to_form().map(|_| ());
        flow.update(|f| {
            f.submit(validation);
        });
    });

    let on_confirm = Callback::new(move |_: ()| {
        let password = form.password.get_untracked();
        commit(
            flow,
            auth,
            notifier,
            "Password changed",
            move |api| async move { api.change_own_password(&password).await },
            || {},
        );
    });

    view! {
        <div class="max-w-3xl mx-auto p-4 md:p-8 space-y-6">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    {move || auth.account.get().map(|account| view! {
                        <h2 class="card-title text-2xl">"Welcome, " {account.login.clone()}</h2>
                        <p class="text-base-content/70">
                            "Signed in as " <span class="badge badge-primary">{account.role.label()}</span>
                        </p>
                    })}
                    <div class="card-actions justify-end">
                        <button class="btn btn-outline" on:click=open_dialog>"Change password"</button>
                    </div>
                </div>
            </div>

            <MutationDialog
                flow=flow
                title="Change password".to_string()
                on_submit=on_submit
                on_confirm=on_confirm
            >
                <TextField
                    label="New password"
                    value=form.password
                    input_type="password"
                    error=field_error(flow, "password")
                />
                <TextField
                    label="Confirm password"
                    value=form.confirm_password
                    input_type="password"
                    error=field_error(flow, "confirm_password")
                />
            </MutationDialog>
        </div>
    }
}
