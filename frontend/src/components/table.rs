use leptos::prelude::*;

/// 表格占位行：加载中 / 加载失败 / 空列表
#[component]
pub fn ListStatus(
    columns: u32,
    loading: Signal<bool>,
    error: Signal<Option<String>>,
    empty: Signal<bool>,
    empty_text: &'static str,
) -> impl IntoView {
    move || {
        if let Some(message) = error.get() {
            view! {
                <tr>
                    <td colspan=columns class="text-center py-8 text-error">
                        "Failed to load: " {message}
                    </td>
                </tr>
            }
            .into_any()
        } else if loading.get() && empty.get() {
            view! {
                <tr>
                    <td colspan=columns class="text-center py-8">
                        <span class="loading loading-dots loading-md"></span>
                    </td>
                </tr>
            }
            .into_any()
        } else if empty.get() {
            view! {
                <tr>
                    <td colspan=columns class="text-center py-8 text-base-content/50">
                        {empty_text}
                    </td>
                </tr>
            }
            .into_any()
        } else {
            ().into_any()
        }
    }
}

#[component]
pub fn SearchBox(query: RwSignal<String>, placeholder: &'static str) -> impl IntoView {
    view! {
        <input
            type="search"
            class="input input-bordered input-sm md:input-md"
            placeholder=placeholder
            on:input=move |ev| query.set(event_target_value(&ev))
            prop:value=query
        />
    }
}
