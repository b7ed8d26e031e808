use leptos::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub is_error: bool,
}

/// 通知（toast），3 秒后自动消失
#[derive(Clone, Copy)]
pub struct Notifier {
    current: RwSignal<Option<Notice>>,
    next_id: StoredValue<u64>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            current: RwSignal::new(None),
            next_id: StoredValue::new(0),
        }
    }

    fn show(&self, message: impl Into<String>, is_error: bool) {
        self.next_id.update_value(|id| *id += 1);
        self.current.set(Some(Notice {
            id: self.next_id.get_value(),
            message: message.into(),
            is_error,
        }));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message, false);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(message, true);
    }
}

pub fn use_notifier() -> Notifier {
    use_context::<Notifier>().expect("Notifier should be provided")
}

#[component]
pub fn NoticeToast() -> impl IntoView {
    let notifier = use_notifier();
    let current = notifier.current;

    // 3秒后清除通知（只清除当时显示的那一条）
    Effect::new(move |_| {
        if let Some(notice) = current.get() {
            set_timeout(
                move || {
                    if current.get_untracked().is_some_and(|n| n.id == notice.id) {
                        current.set(None);
                    }
                },
                std::time::Duration::from_secs(3),
            );
        }
    });

    view! {
        <Show when=move || current.with(|n| n.is_some())>
            <div class="toast toast-top toast-end z-50">
                <div class=move || {
                    if current.with(|n| n.as_ref().is_some_and(|n| n.is_error)) {
                        "alert alert-error shadow-lg"
                    } else {
                        "alert alert-success shadow-lg"
                    }
                }>
                    <span>{move || current.with(|n| n.as_ref().map(|n| n.message.clone()).unwrap_or_default())}</span>
                </div>
            </div>
        </Show>
    }
}
