//! 变更对话框
//!
//! 模态框的开合由 `MutationFlow` 状态驱动。底部按钮随状态切换：
//! Open 显示"保存"（提交校验），AwaitingConfirm 显示"确认"，
//! Committing 显示加载中。

use cinema_shared::{FlowState, MutationFlow};
use leptos::prelude::*;
use tracing::warn;

/// 某个字段的第一条错误
pub fn field_error<T: Send + Sync + 'static>(
    flow: RwSignal<MutationFlow<T>>,
    field: &'static str,
) -> Signal<Option<String>> {
    Signal::derive(move || flow.with(|f| f.errors().first(field).map(str::to_string)))
}

#[component]
pub fn FieldError(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some()>
            <label class="label">
                <span class="label-text-alt text-error">
                    {move || message.get().unwrap_or_default()}
                </span>
            </label>
        </Show>
    }
}

/// 带标签和错误提示的输入框
#[component]
pub fn TextField(
    label: &'static str,
    value: RwSignal<String>,
    #[prop(into)] error: Signal<Option<String>>,
    #[prop(optional)] input_type: Option<&'static str>,
    #[prop(optional)] placeholder: Option<&'static str>,
) -> impl IntoView {
    view! {
        <div class="form-control">
            <label class="label">
                <span class="label-text">{label}</span>
            </label>
            <input
                type=input_type.unwrap_or("text")
                placeholder=placeholder.unwrap_or_default()
                on:input=move |ev| value.set(event_target_value(&ev))
                prop:value=value
                class=move || {
                    if error.with(|e| e.is_some()) {
                        "input input-bordered input-error"
                    } else {
                        "input input-bordered"
                    }
                }
            />
            <FieldError message=error />
        </div>
    }
}

/// 下拉选择框；选项为 (值, 显示文本)
#[component]
pub fn SelectField(
    label: &'static str,
    value: RwSignal<String>,
    #[prop(into)] options: Signal<Vec<(String, String)>>,
    #[prop(into)] error: Signal<Option<String>>,
    #[prop(optional)] placeholder: Option<&'static str>,
) -> impl IntoView {
    view! {
        <div class="form-control">
            <label class="label">
                <span class="label-text">{label}</span>
            </label>
            <select
                class="select select-bordered"
                on:change=move |ev| value.set(event_target_value(&ev))
                prop:value=value
            >
                <option value="" disabled=true selected=move || value.get().is_empty()>
                    {placeholder.unwrap_or("Choose...")}
                </option>
                {move || {
                    options
                        .get()
                        .into_iter()
                        .map(|(key, text)| {
                            let selected = value.get_untracked() == key;
                            view! { <option value=key selected=selected>{text}</option> }
                        })
                        .collect_view()
                }}
            </select>
            <FieldError message=error />
        </div>
    }
}

#[component]
pub fn MutationDialog<T>(
    flow: RwSignal<MutationFlow<T>>,
    #[prop(into)] title: Signal<String>,
    /// 提交表单（校验）
    #[prop(into)]
    on_submit: Callback<()>,
    /// 确认写入
    #[prop(into)]
    on_confirm: Callback<()>,
    #[prop(optional, into)] confirm_label: Option<String>,
    children: Children,
) -> impl IntoView
where
    T: Send + Sync + 'static,
{
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();
    let state = Signal::derive(move || flow.with(|f| f.state()));
    let confirm_label = confirm_label.unwrap_or_else(|| "Confirm".to_string());

    Effect::new(move |_| {
        let open = state.get() != FlowState::Closed;
        if let Some(dialog) = dialog_ref.get() {
            if open {
                if !dialog.open() {
                    if let Err(e) = dialog.show_modal() {
                        warn!("Dialog could not be opened: {:?}", e);
                    }
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    let cancel = move || flow.update(|f| f.cancel());

    let on_form_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        match state.get_untracked() {
            FlowState::Open => on_submit.run(()),
            FlowState::AwaitingConfirm => on_confirm.run(()),
            FlowState::Closed | FlowState::Committing => {}
        }
    };

    view! {
        <dialog
            class="modal"
            node_ref=dialog_ref
            on:close=move |_| {
                if flow.with_untracked(|f| f.is_open()) {
                    cancel();
                }
            }
        >
            <div class="modal-box">
                <h3 class="font-bold text-lg">{move || title.get()}</h3>

                <form
                    on:submit=on_form_submit
                    on:input=move |_| flow.update(|f| f.touch())
                    class="space-y-4 mt-4"
                >
                    {children()}

                    <Show when=move || state.get() == FlowState::AwaitingConfirm>
                        <div role="alert" class="alert alert-warning text-sm py-2">
                            <span>
                                "Press confirm to save. Editing a field requires saving again."
                            </span>
                        </div>
                    </Show>

                    <div class="modal-action">
                        <button type="button" class="btn btn-ghost" on:click=move |_| cancel()>
                            "Cancel"
                        </button>
                        {
                            move || match state.get() {
                                FlowState::AwaitingConfirm => view! {
                                    <button type="submit" class="btn btn-warning">
                                        {confirm_label.clone()}
                                    </button>
                                }.into_any(),
                                FlowState::Committing => view! {
                                    <button type="button" class="btn btn-primary" disabled=true>
                                        <span class="loading loading-spinner"></span> "Saving..."
                                    </button>
                                }.into_any(),
                                FlowState::Open | FlowState::Closed => view! {
                                    <button type="submit" class="btn btn-primary">"Save"</button>
                                }.into_any(),
                            }
                        }
                    </div>
                </form>
            </div>
            <form method="dialog" class="modal-backdrop">
                <button>"close"</button>
            </form>
        </dialog>
    }
}
