//! 页面级列表缓存：`RemoteList` 的响应式包装

use std::future::Future;

use cinema_shared::{ApiResult, RemoteList};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::Api;
use crate::auth::AuthContext;

pub struct RemoteResource<T: Send + Sync + 'static> {
    list: RwSignal<RemoteList<T>>,
}

impl<T: Send + Sync + 'static> Clone for RemoteResource<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for RemoteResource<T> {}

impl<T: Clone + Send + Sync + 'static> RemoteResource<T> {
    pub fn new() -> Self {
        Self {
            list: RwSignal::new(RemoteList::new()),
        }
    }

    /// 重新拉取整个列表；较早发出的请求若晚到会被丢弃
    pub fn reload<F, Fut>(&self, auth: AuthContext, fetch: F)
    where
        F: FnOnce(Api) -> Fut + 'static,
        Fut: Future<Output = ApiResult<Vec<T>>> + 'static,
    {
        let list = self.list;
        let Some(ticket) = list.try_update(|l| l.begin_load()) else {
            return;
        };
        let api = auth.api();
        spawn_local(async move {
            let result = fetch(api).await;
            auth.observe(&result);
            list.try_update(|l| l.apply(ticket, result));
        });
    }

    /// 列表范围改变时调用，旧范围的行不再显示
    pub fn reset(&self) {
        self.list.update(|l| l.reset());
    }

    pub fn items(&self) -> Vec<T> {
        self.list.with(|l| l.items.clone())
    }

    pub fn len(&self) -> usize {
        self.list.with(|l| l.items.len())
    }

    pub fn is_loading(&self) -> bool {
        self.list.with(|l| l.is_loading())
    }

    pub fn error(&self) -> Option<String> {
        self.list.with(|l| l.error().map(str::to_string))
    }
}
