//! 每个页面私有的实体列表缓存：整表替换，不做增量合并

use crate::error::ApiResult;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteList<T> {
    pub items: Vec<T>,
    pub status: LoadStatus,
    /// 每次 `begin_load` 递增，用于丢弃过期的响应
    ticket: u64,
}

impl<T> Default for RemoteList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: LoadStatus::Idle,
            ticket: 0,
        }
    }
}

impl<T> RemoteList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始加载；返回本次加载的票号
    pub fn begin_load(&mut self) -> u64 {
        self.ticket += 1;
        self.status = LoadStatus::Loading;
        self.ticket
    }

    /// 切换列表范围：清空旧数据，并让尚未返回的加载作废
    pub fn reset(&mut self) {
        self.ticket += 1;
        self.items.clear();
        self.status = LoadStatus::Idle;
    }

    /// 应用加载结果；只有最新一次加载的结果会生效。
    /// 失败时保留旧数据。
    pub fn apply(&mut self, ticket: u64, result: ApiResult<Vec<T>>) -> bool {
        if ticket != self.ticket {
            return false;
        }
        match result {
            Ok(items) => {
                self.items = items;
                self.status = LoadStatus::Ready;
            }
            Err(e) => {
                self.status = LoadStatus::Failed(e.to_string());
            }
        }
        true
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            LoadStatus::Failed(message) => Some(message),
            _ => None,
        }
    }
}
