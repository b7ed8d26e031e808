//! 票据页面
//!
//! 工作人员页面按客户筛选并代客开票；客户页面只看自己的票据并自助购票。
//! 改签和删除两边共用 `TicketEditing`。

use cinema_shared::filters::{TicketRow, active_clients, available_movies, resolve_ticket_rows};
use cinema_shared::{Account, Movie, MutationFlow, Role, Ticket, TicketScope};
use leptos::prelude::*;

use crate::auth::use_auth;
use crate::components::forms::{OwnTicketFormState, TicketFormState, TicketTimeFormState};
use crate::components::mutation_dialog::{MutationDialog, SelectField, TextField, field_error};
use crate::components::notice::use_notifier;
use crate::components::table::ListStatus;
use crate::flow::commit;
use crate::resource::RemoteResource;

const TIME_PLACEHOLDER: &str = "2024-05-01T18:30:00";

fn movie_options(movies: &[Movie]) -> Vec<(String, String)> {
    available_movies(movies)
        .into_iter()
        .map(|m| {
            let text = format!("{} ({} seats left)", m.title, m.available_seats);
            (m.id, text)
        })
        .collect()
}

fn client_options(clients: &[Account]) -> Vec<(String, String)> {
    active_clients(clients)
        .into_iter()
        .map(|c| (c.id, c.login))
        .collect()
}

// =========================================================
// 改签 / 删除
// =========================================================

#[derive(Clone, Copy)]
pub struct TicketEditing {
    reschedule: RwSignal<MutationFlow<Ticket>>,
    delete: RwSignal<MutationFlow<Ticket>>,
    time: TicketTimeFormState,
}

impl TicketEditing {
    pub fn new() -> Self {
        Self {
            reschedule: RwSignal::new(MutationFlow::new()),
            delete: RwSignal::new(MutationFlow::new()),
            time: TicketTimeFormState::new(),
        }
    }

    pub fn open_reschedule(&self, ticket: Ticket) {
        self.time.fill(&ticket);
        self.reschedule.update(|f| f.open_edit(ticket));
    }

    /// 删除票据没有前置检查，直接进入确认
    pub fn open_delete(&self, ticket: Ticket) {
        self.delete.update(|f| f.open_confirm(ticket));
    }
}

#[component]
pub fn TicketDialogs(
    editing: TicketEditing,
    #[prop(into)] on_saved: Callback<()>,
) -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();
    let TicketEditing { reschedule, delete, time } = editing;

    let on_reschedule_submit = Callback::new(move |_: ()| {
        let validation = time.to_form().map(|_| ());
        reschedule.update(|f| {
            f.submit(validation);
        });
    });

    let on_reschedule_confirm = Callback::new(move |_: ()| {
        let Some(ticket_id) = reschedule.with_untracked(|f| f.target().map(|t| t.id.clone())) else {
            return;
        };
        let Ok(values) = time.to_form() else {
            reschedule.update(|f| f.touch());
            return;
        };
        let change = values.to_change(&ticket_id);
        commit(
            reschedule,
            auth,
            notifier,
            "Ticket rescheduled",
            move |api| async move { api.reschedule_ticket(change).await },
            move || on_saved.run(()),
        );
    });

    let on_delete_submit = Callback::new(move |_: ()| {
        delete.update(|f| {
            f.submit(Ok(()));
        });
    });

    let on_delete_confirm = Callback::new(move |_: ()| {
        let Some(ticket_id) = delete.with_untracked(|f| f.target().map(|t| t.id.clone())) else {
            return;
        };
        commit(
            delete,
            auth,
            notifier,
            "Ticket deleted",
            move |api| async move { api.delete_ticket(&ticket_id).await },
            move || on_saved.run(()),
        );
    });

    view! {
        <MutationDialog
            flow=reschedule
            title="Reschedule ticket".to_string()
            on_submit=on_reschedule_submit
            on_confirm=on_reschedule_confirm
        >
            <TextField
                label="Screening time"
                value=time.movie_time
                placeholder=TIME_PLACEHOLDER
                error=field_error(reschedule, "movie_time")
            />
        </MutationDialog>

        <MutationDialog
            flow=delete
            title="Delete ticket?".to_string()
            on_submit=on_delete_submit
            on_confirm=on_delete_confirm
            confirm_label="Delete"
        >
            <p>"The ticket will be removed permanently."</p>
        </MutationDialog>
    }
}

#[component]
fn TicketTable(
    rows: Signal<Vec<TicketRow>>,
    loading: Signal<bool>,
    error: Signal<Option<String>>,
    editing: TicketEditing,
    /// 客户视图不显示客户列
    #[prop(optional)]
    hide_client: bool,
) -> impl IntoView {
    let columns = if hide_client { 4 } else { 5 };

    view! {
        <div class="overflow-x-auto w-full">
            <table class="table table-zebra w-full">
                <thead>
                    <tr>
                        <th>"Movie"</th>
                        {(!hide_client).then(|| view! { <th>"Client"</th> })}
                        <th>"Screening time"</th>
                        <th>"Price"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    <ListStatus
                        columns=columns
                        loading=loading
                        error=error
                        empty=Signal::derive(move || rows.with(|r| r.is_empty()))
                        empty_text="No tickets yet."
                    />
                    {move || rows.get().into_iter().map(|row| {
                        let for_reschedule = row.ticket.clone();
                        let for_delete = row.ticket.clone();
                        let client_login = row.client_login;
                        view! {
                            <tr>
                                <td class="font-medium">{row.movie_title}</td>
                                {(!hide_client).then(|| view! { <td>{client_login}</td> })}
                                <td class="font-mono text-sm">{row.ticket.movie_time.clone()}</td>
                                <td>{format!("{:.2}", row.ticket.final_price)}</td>
                                <td class="text-right space-x-2">
                                    <button class="btn btn-ghost btn-sm" on:click=move |_| editing.open_reschedule(for_reschedule.clone())>
                                        "Reschedule"
                                    </button>
                                    <button class="btn btn-ghost btn-sm text-error" on:click=move |_| editing.open_delete(for_delete.clone())>
                                        "Delete"
                                    </button>
                                </td>
                            </tr>
                        }
                    }).collect_view()}
                </tbody>
            </table>
        </div>
    }
}

// =========================================================
// 工作人员：全部票据
// =========================================================

#[component]
pub fn TicketsPage() -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();

    let tickets = RemoteResource::<Ticket>::new();
    let clients = RemoteResource::<Account>::new();
    let movies = RemoteResource::<Movie>::new();
    let scope = RwSignal::new(TicketScope::All);

    let load_tickets = move || {
        let current = scope.get_untracked();
        tickets.reload(auth, move |api| async move { api.tickets(&current).await });
    };
    let load_clients =
        move || clients.reload(auth, |api| async move { api.accounts(Role::Client).await });
    let load_movies = move || movies.reload(auth, |api| async move { api.movies().await });
    // 写入后三张依赖列表全部重新拉取
    let refresh = move || {
        load_tickets();
        load_clients();
        load_movies();
    };

    Effect::new(move |_| {
        load_clients();
        load_movies();
    });
    // 切换客户时清空旧行再拉取
    Effect::new(move |_| {
        scope.track();
        tickets.reset();
        load_tickets();
    });

    let rows = Signal::derive(move || {
        resolve_ticket_rows(&tickets.items(), &clients.items(), &movies.items())
    });

    let editing = TicketEditing::new();

    // 代客开票
    let create_flow = RwSignal::new(MutationFlow::<()>::new());
    let form = TicketFormState::new();

    let open_create = move |_| {
        form.reset();
        if let TicketScope::Client(client_id) = scope.get_untracked() {
            form.client_id.set(client_id);
        }
        create_flow.update(|f| f.open_create());
    };

    let on_submit = Callback::new(move |_: ()| {
        let validation = form.to_form().map(|_| ());
        create_flow.update(|f| {
            f.submit(validation);
        });
    });

    let on_confirm = Callback::new(move |_: ()| {
        let Ok(values) = form.to_form() else {
            create_flow.update(|f| f.touch());
            return;
        };
        let ticket = values.to_ticket();
        commit(
            create_flow,
            auth,
            notifier,
            "Ticket created",
            move |api| async move { api.create_ticket(ticket).await },
            refresh,
        );
    });

    let on_scope_change = move |ev: leptos::ev::Event| {
        let value = event_target_value(&ev);
        scope.set(if value.is_empty() {
            TicketScope::All
        } else {
            TicketScope::Client(value)
        });
    };

    view! {
        <div class="max-w-7xl mx-auto p-4 md:p-8 space-y-6">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex flex-wrap items-center justify-between gap-4 p-6 pb-2">
                        <div>
                            <h3 class="card-title">"Tickets"</h3>
                            <p class="text-base-content/70 text-sm">{move || format!("{} tickets", tickets.len())}</p>
                        </div>
                        <div class="flex gap-2">
                            <select class="select select-bordered select-sm md:select-md" on:change=on_scope_change>
                                <option value="" selected=true>"All clients"</option>
                                {move || clients.items().into_iter().map(|c| view! {
                                    <option value=c.id.clone()>{c.login.clone()}</option>
                                }).collect_view()}
                            </select>
                            <button class="btn btn-primary" on:click=open_create>"New ticket"</button>
                        </div>
                    </div>

                    <TicketTable
                        rows=rows
                        loading=Signal::derive(move || tickets.is_loading())
                        error=Signal::derive(move || tickets.error())
                        editing=editing
                    />
                </div>
            </div>

            <MutationDialog
                flow=create_flow
                title="New ticket".to_string()
                on_submit=on_submit
                on_confirm=on_confirm
            >
                <TextField
                    label="Screening time"
                    value=form.movie_time
                    placeholder=TIME_PLACEHOLDER
                    error=field_error(create_flow, "movie_time")
                />
                <SelectField
                    label="Client"
                    value=form.client_id
                    options=Signal::derive(move || client_options(&clients.items()))
                    error=field_error(create_flow, "client_id")
                />
                <SelectField
                    label="Movie"
                    value=form.movie_id
                    options=Signal::derive(move || movie_options(&movies.items()))
                    error=field_error(create_flow, "movie_id")
                />
            </MutationDialog>

            <TicketDialogs editing=editing on_saved=Callback::new(move |_: ()| refresh()) />
        </div>
    }
}

// =========================================================
// 客户：自己的票据
// =========================================================

#[component]
pub fn BuyTicketsPage() -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();

    let tickets = RemoteResource::<Ticket>::new();
    let movies = RemoteResource::<Movie>::new();

    let load_tickets =
        move || tickets.reload(auth, |api| async move { api.tickets(&TicketScope::Own).await });
    let load_movies = move || movies.reload(auth, |api| async move { api.movies().await });
    let refresh = move || {
        load_tickets();
        load_movies();
    };

    Effect::new(move |_| refresh());

    let rows = Signal::derive(move || resolve_ticket_rows(&tickets.items(), &[], &movies.items()));

    let editing = TicketEditing::new();

    let buy_flow = RwSignal::new(MutationFlow::<()>::new());
    let form = OwnTicketFormState::new();

    let open_buy = move |_| {
        form.reset();
        buy_flow.update(|f| f.open_create());
    };

    let on_submit = Callback::new(move |_: ()| {
        let validation = form.to_form().map(|_| ());
        buy_flow.update(|f| {
            f.submit(validation);
        });
    });

    let on_confirm = Callback::new(move |_: ()| {
        let Ok(values) = form.to_form() else {
            buy_flow.update(|f| f.touch());
            return;
        };
        commit(
            buy_flow,
            auth,
            notifier,
            "Ticket purchased",
            move |api| async move {
                api.buy_ticket(values.movie_time.trim(), &values.movie_id).await
            },
            refresh,
        );
    });

    view! {
        <div class="max-w-7xl mx-auto p-4 md:p-8 space-y-6">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex flex-wrap items-center justify-between gap-4 p-6 pb-2">
                        <div>
                            <h3 class="card-title">"My tickets"</h3>
                            <p class="text-base-content/70 text-sm">
                                {move || format!("{} movies with free seats", available_movies(&movies.items()).len())}
                            </p>
                        </div>
                        <button class="btn btn-primary" on:click=open_buy>"Buy ticket"</button>
                    </div>

                    <TicketTable
                        rows=rows
                        loading=Signal::derive(move || tickets.is_loading())
                        error=Signal::derive(move || tickets.error())
                        editing=editing
                        hide_client=true
                    />
                </div>
            </div>

            <MutationDialog
                flow=buy_flow
                title="Buy ticket".to_string()
                on_submit=on_submit
                on_confirm=on_confirm
            >
                <SelectField
                    label="Movie"
                    value=form.movie_id
                    options=Signal::derive(move || movie_options(&movies.items()))
                    error=field_error(buy_flow, "movie_id")
                />
                <TextField
                    label="Screening time"
                    value=form.movie_time
                    placeholder=TIME_PLACEHOLDER
                    error=field_error(buy_flow, "movie_time")
                />
            </MutationDialog>

            <TicketDialogs editing=editing on_saved=Callback::new(move |_: ()| refresh()) />
        </div>
    }
}
