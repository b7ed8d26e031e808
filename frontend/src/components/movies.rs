use cinema_shared::filters::filter_by_title;
use cinema_shared::{FlowMode, Movie, MutationFlow};
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::warn;

use crate::auth::use_auth;
use crate::components::forms::MovieFormState;
use crate::components::mutation_dialog::{MutationDialog, TextField, field_error};
use crate::components::notice::use_notifier;
use crate::components::table::{ListStatus, SearchBox};
use crate::flow::commit;
use crate::resource::RemoteResource;
use crate::web::alert;

#[component]
pub fn MoviesPage() -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();

    let movies = RemoteResource::<Movie>::new();
    let query = RwSignal::new(String::new());
    let load = move || movies.reload(auth, |api| async move { api.movies().await });

    // 初始加载
    Effect::new(move |_| load());

    let visible = move || filter_by_title(&movies.items(), &query.get());

    // =========================================================
    // 新建 / 编辑
    // =========================================================

    let edit_flow = RwSignal::new(MutationFlow::<Movie>::new());
    let form = MovieFormState::new();

    let open_create = move |_| {
        form.reset();
        edit_flow.update(|f| f.open_create());
    };

    let open_edit = move |movie: Movie| {
        form.fill(&movie);
        edit_flow.update(|f| f.open_edit(movie));
    };

    let on_submit = Callback::new(move |_: ()| {
        let validation = form.to_form().map(|_| ());
        edit_flow.update(|f| {
            f.submit(validation);
        });
    });

    let on_confirm = Callback::new(move |_: ()| {
        let Ok(values) = form.to_form() else {
            edit_flow.update(|f| f.touch());
            return;
        };
        let (mode, id) = edit_flow.with_untracked(|f| {
            (f.mode(), f.target().map(|m| m.id.clone()).unwrap_or_default())
        });
        let movie = values.to_movie(&id);
        commit(
            edit_flow,
            auth,
            notifier,
            match mode {
                FlowMode::Create => "Movie added",
                FlowMode::Edit => "Movie updated",
            },
            move |api| async move {
                match mode {
                    FlowMode::Create => api.create_movie(movie).await,
                    FlowMode::Edit => api.update_movie(movie).await,
                }
            },
            load,
        );
    });

    let edit_title = Signal::derive(move || match edit_flow.with(|f| f.mode()) {
        FlowMode::Create => "Add movie".to_string(),
        FlowMode::Edit => "Edit movie".to_string(),
    });

    // =========================================================
    // 删除（有售出票据时拒绝）
    // =========================================================

    let delete_flow = RwSignal::new(MutationFlow::<Movie>::new());

    let request_delete = move |movie: Movie| {
        let api = auth.api();
        spawn_local(async move {
            let guard = api.ensure_movie_deletable(&movie.id).await;
            auth.observe(&guard);
            match guard {
                Ok(()) => delete_flow.update(|f| f.open_confirm(movie)),
                Err(e) => {
                    warn!("Movie {} cannot be deleted: {}", movie.id, e);
                    alert(&e.to_string());
                }
            }
        });
    };

    let on_delete_submit = Callback::new(move |_: ()| {
        delete_flow.update(|f| {
            f.submit(Ok(()));
        });
    });

    let on_delete_confirm = Callback::new(move |_: ()| {
        let Some(id) = delete_flow.with_untracked(|f| f.target().map(|m| m.id.clone())) else {
            return;
        };
        commit(
            delete_flow,
            auth,
            notifier,
            "Movie deleted",
            move |api| async move { api.delete_movie(&id).await },
            load,
        );
    });

    let delete_title = Signal::derive(move || {
        delete_flow.with(|f| {
            f.target()
                .map(|m| format!("Delete \"{}\"?", m.title))
                .unwrap_or_default()
        })
    });

    view! {
        <div class="max-w-7xl mx-auto p-4 md:p-8 space-y-6">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex flex-wrap items-center justify-between gap-4 p-6 pb-2">
                        <div>
                            <h3 class="card-title">"Movies"</h3>
                            <p class="text-base-content/70 text-sm">{move || format!("{} in the repertoire", movies.len())}</p>
                        </div>
                        <div class="flex gap-2">
                            <SearchBox query=query placeholder="Filter by title" />
                            <button class="btn btn-primary" on:click=open_create>"Add movie"</button>
                        </div>
                    </div>

                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"Title"</th>
                                    <th>"Base price"</th>
                                    <th>"Room"</th>
                                    <th>"Available seats"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <ListStatus
                                    columns=5
                                    loading=Signal::derive(move || movies.is_loading())
                                    error=Signal::derive(move || movies.error())
                                    empty=Signal::derive(move || visible().is_empty())
                                    empty_text="No movies found."
                                />
                                {move || visible().into_iter().map(|movie| {
                                    let for_edit = movie.clone();
                                    let for_delete = movie.clone();
                                    view! {
                                        <tr>
                                            <td class="font-medium">{movie.title.clone()}</td>
                                            <td>{format!("{:.2}", movie.base_price)}</td>
                                            <td>{movie.screening_room}</td>
                                            <td>
                                                <span class=if movie.is_available() { "badge badge-success" } else { "badge badge-ghost" }>
                                                    {movie.available_seats}
                                                </span>
                                            </td>
                                            <td class="text-right space-x-2">
                                                <button class="btn btn-ghost btn-sm" on:click=move |_| open_edit(for_edit.clone())>
                                                    "Edit"
                                                </button>
                                                <button class="btn btn-ghost btn-sm text-error" on:click=move |_| request_delete(for_delete.clone())>
                                                    "Delete"
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

            <MutationDialog flow=edit_flow title=edit_title on_submit=on_submit on_confirm=on_confirm>
                <TextField label="Title" value=form.title error=field_error(edit_flow, "title") />
                <TextField
                    label="Base price"
                    value=form.base_price
                    input_type="number"
                    error=field_error(edit_flow, "base_price")
                />
                <TextField
                    label="Screening room"
                    value=form.screening_room
                    input_type="number"
                    error=field_error(edit_flow, "screening_room")
                />
                <TextField
                    label="Available seats"
                    value=form.available_seats
                    input_type="number"
                    error=field_error(edit_flow, "available_seats")
                />
            </MutationDialog>

            <MutationDialog
                flow=delete_flow
                title=delete_title
                on_submit=on_delete_submit
                on_confirm=on_delete_confirm
                confirm_label="Delete"
            >
                <p>"The movie has no tickets and will be removed permanently."</p>
            </MutationDialog>
        </div>
    }
}
