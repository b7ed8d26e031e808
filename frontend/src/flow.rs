//! 把核心层的 `MutationFlow` 接到界面上：确认后发出唯一一次写入

use std::future::Future;

use cinema_shared::mutation::{self, CommitOutcome};
use cinema_shared::{ApiResult, ErrorKind, FlowCell, FlowEvent, MutationFlow};
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::warn;

use crate::api::Api;
use crate::auth::AuthContext;
use crate::components::notice::Notifier;
use crate::web::alert;

/// 信号里的表单状态机
struct SignalFlow<T: Send + Sync + 'static>(RwSignal<MutationFlow<T>>);

impl<T: Send + Sync + 'static> FlowCell<T> for SignalFlow<T> {
    fn update_flow<R>(&self, f: impl FnOnce(&mut MutationFlow<T>) -> R) -> Option<R> {
        self.0.try_update(f)
    }
}

/// 确认并提交
///
/// 只有处于等待确认的表单才会拿到写入许可；成功后关闭表单并提示，
/// 失败时按错误类别提示并回到可编辑状态。写入结束后才调用 `refresh`。
pub fn commit<T, R, W, Fut>(
    flow: RwSignal<MutationFlow<T>>,
    auth: AuthContext,
    notifier: Notifier,
    success: &'static str,
    write: W,
    refresh: impl Fn() + 'static,
) where
    T: Send + Sync + 'static,
    R: 'static,
    W: FnOnce(Api) -> Fut + 'static,
    Fut: Future<Output = ApiResult<R>> + 'static,
{
    if !flow.with_untracked(|f| f.is_pending()) {
        return;
    }
    let api = auth.api();

    spawn_local(async move {
        let cell = SignalFlow(flow);
        let outcome =
            mutation::commit(&cell, move || write(api), move || async move { refresh() }).await;
        let Some(CommitOutcome { event, result }) = outcome else {
            return;
        };
        auth.observe(&result);

        match event {
            FlowEvent::Committed => notifier.success(success),
            FlowEvent::Retry(message) => {
                warn!("Write failed: {}", message);
                match result.err().map(|e| e.kind()) {
                    // 字段错误已在表单内显示
                    Some(ErrorKind::Validation) => notifier.error("Please correct the form"),
                    Some(ErrorKind::Authorization) => notifier.error(message),
                    _ => alert(&message),
                }
            }
            FlowEvent::Ignored => {}
        }
    });
}
