//! 先确认、后提交的变更流程
//!
//! ```text
//! Closed --open--> Open --submit(valid)--> AwaitingConfirm --confirm--> Committing
//!   ^               ^  \__ submit(invalid) stays Open          |
//!   |               |                                          |
//!   |               +------------- complete(Err) --------------+
//!   +------------------------------ complete(Ok) --------------+
//! ```
//!
//! `cancel` 在任何状态下回到 Closed。每次打开或关闭都会推进代数，
//! 旧代数的完成回调会被忽略，所以关闭后到达的响应不会影响新表单。

use std::cell::RefCell;
use std::future::Future;

use crate::error::{ApiError, ApiResult, FormErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Closed,
    Open,
    AwaitingConfirm,
    Committing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowMode {
    Create,
    Edit,
}

/// `confirm` 发放的一次性写入许可
#[derive(Debug, PartialEq, Eq)]
pub struct CommitPermit {
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    /// 写入成功，表单已关闭，调用方应刷新列表
    Committed,
    /// 写入失败，表单回到 Open，需要重新确认
    Retry(String),
    /// 过期的完成回调
    Ignored,
}

#[derive(Debug, Clone)]
pub struct MutationFlow<T> {
    state: FlowState,
    mode: FlowMode,
    target: Option<T>,
    errors: FormErrors,
    generation: u64,
}

impl<T> Default for MutationFlow<T> {
    fn default() -> Self {
        Self {
            state: FlowState::Closed,
            mode: FlowMode::Create,
            target: None,
            errors: FormErrors::new(),
            generation: 0,
        }
    }
}

impl<T> MutationFlow<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self, state: FlowState, mode: FlowMode, target: Option<T>) {
        self.state = state;
        self.mode = mode;
        self.target = target;
        self.errors = FormErrors::new();
        self.generation += 1;
    }

    pub fn open_create(&mut self) {
        self.reset(FlowState::Open, FlowMode::Create, None);
    }

    pub fn open_edit(&mut self, target: T) {
        self.reset(FlowState::Open, FlowMode::Edit, Some(target));
    }

    /// 没有表单的操作（删除）直接进入等待确认
    pub fn open_confirm(&mut self, target: T) {
        self.reset(FlowState::AwaitingConfirm, FlowMode::Edit, Some(target));
    }

    /// 提交表单；返回是否进入（或保持）等待确认。提交本身从不写入。
    pub fn submit(&mut self, validation: Result<(), FormErrors>) -> bool {
        match self.state {
            FlowState::Open | FlowState::AwaitingConfirm => match validation {
                Ok(()) => {
                    self.errors = FormErrors::new();
                    self.state = FlowState::AwaitingConfirm;
                    true
                }
                Err(errors) => {
                    self.errors = errors;
                    self.state = FlowState::Open;
                    false
                }
            },
            FlowState::Closed | FlowState::Committing => false,
        }
    }

    /// 字段在等待确认时被修改，必须重新提交
    pub fn touch(&mut self) {
        if self.state == FlowState::AwaitingConfirm {
            self.state = FlowState::Open;
        }
    }

    /// 仅在等待确认时发放许可，并进入 Committing；重复确认返回 None
    pub fn confirm(&mut self) -> Option<CommitPermit> {
        if self.state != FlowState::AwaitingConfirm {
            return None;
        }
        self.state = FlowState::Committing;
        Some(CommitPermit {
            generation: self.generation,
        })
    }

    pub fn complete<R>(&mut self, permit: CommitPermit, result: &ApiResult<R>) -> FlowEvent {
        if permit.generation != self.generation || self.state != FlowState::Committing {
            return FlowEvent::Ignored;
        }
        match result {
            Ok(_) => {
                self.reset(FlowState::Closed, self.mode, None);
                FlowEvent::Committed
            }
            Err(err) => {
                if let ApiError::Validation(errors) = err {
                    self.errors = errors.clone();
                }
                self.state = FlowState::Open;
                FlowEvent::Retry(err.to_string())
            }
        }
    }

    pub fn cancel(&mut self) {
        self.reset(FlowState::Closed, self.mode, None);
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn mode(&self) -> FlowMode {
        self.mode
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn is_open(&self) -> bool {
        self.state != FlowState::Closed
    }

    /// 对应"第一次提交已确认，下一次确认将真正提交"
    pub fn is_pending(&self) -> bool {
        self.state == FlowState::AwaitingConfirm
    }

    pub fn is_committing(&self) -> bool {
        self.state == FlowState::Committing
    }
}

// =========================================================
// 确认后的提交流程
// =========================================================

/// 持有 `MutationFlow` 的容器；界面层是响应式信号，测试里是 `RefCell`
pub trait FlowCell<T> {
    /// 修改其中的流程；容器已被释放时返回 None
    fn update_flow<R>(&self, f: impl FnOnce(&mut MutationFlow<T>) -> R) -> Option<R>;
}

impl<T> FlowCell<T> for RefCell<MutationFlow<T>> {
    fn update_flow<R>(&self, f: impl FnOnce(&mut MutationFlow<T>) -> R) -> Option<R> {
        Some(f(&mut self.borrow_mut()))
    }
}

/// 一次提交的结果
#[derive(Debug)]
pub struct CommitOutcome<R> {
    pub event: FlowEvent,
    pub result: ApiResult<R>,
}

/// 确认、写入、完成、刷新
///
/// 只有等待确认的流程才会发出写入，否则返回 None 且什么都不做。
/// 刷新总在写入结束之后进行，成功、失败或过期都一样。
pub async fn commit<T, C, R, W, WF, F, FF>(
    cell: &C,
    write: W,
    refresh: F,
) -> Option<CommitOutcome<R>>
where
    C: FlowCell<T>,
    W: FnOnce() -> WF,
    WF: Future<Output = ApiResult<R>>,
    F: FnOnce() -> FF,
    FF: Future<Output = ()>,
{
    let permit = cell.update_flow(|f| f.confirm()).flatten()?;
    let result = write().await;
    let event = cell
        .update_flow(|f| f.complete(permit, &result))
        .unwrap_or(FlowEvent::Ignored);
    refresh().await;
    Some(CommitOutcome { event, result })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConflictReason;

    fn ok() -> ApiResult<()> {
        Ok(())
    }

    #[test]
    fn submit_alone_never_grants_a_write() {
        let mut flow: MutationFlow<()> = MutationFlow::new();
        flow.open_create();
        assert!(flow.submit(Ok(())));
        assert!(flow.submit(Ok(())));
        assert!(flow.is_pending());
        assert_eq!(flow.state(), FlowState::AwaitingConfirm);
    }

    #[test]
    fn invalid_submit_stays_open_with_errors() {
        let mut flow: MutationFlow<()> = MutationFlow::new();
        flow.open_create();
        assert!(!flow.submit(Err(FormErrors::single("title", "required"))));
        assert_eq!(flow.state(), FlowState::Open);
        assert_eq!(flow.errors().first("title"), Some("required"));
        assert!(flow.confirm().is_none());
    }

    #[test]
    fn repeated_confirm_yields_a_single_permit() {
        let mut flow: MutationFlow<()> = MutationFlow::new();
        flow.open_create();
        flow.submit(Ok(()));
        let permit = flow.confirm();
        assert!(permit.is_some());
        assert!(flow.confirm().is_none());
        assert!(!flow.submit(Ok(())));
        assert!(flow.is_committing());

        assert_eq!(flow.complete(permit.unwrap(), &ok()), FlowEvent::Committed);
        assert_eq!(flow.state(), FlowState::Closed);
    }

    #[test]
    fn closing_resets_pending_and_reopen_does_not_inherit() {
        let mut flow = MutationFlow::new();
        flow.open_edit("m1".to_string());
        flow.submit(Ok(()));
        assert!(flow.is_pending());

        flow.cancel();
        assert!(!flow.is_pending());
        assert!(flow.target().is_none());

        flow.open_edit("m2".to_string());
        assert_eq!(flow.state(), FlowState::Open);
        assert_eq!(flow.target().map(String::as_str), Some("m2"));
        assert!(flow.confirm().is_none());
    }

    #[test]
    fn failure_requires_a_fresh_confirmation() {
        let mut flow: MutationFlow<()> = MutationFlow::new();
        flow.open_create();
        flow.submit(Ok(()));
        let permit = flow.confirm().unwrap();

        let failed: ApiResult<()> = Err(ApiError::Conflict(ConflictReason::StaleVersion));
        assert!(matches!(flow.complete(permit, &failed), FlowEvent::Retry(_)));
        assert_eq!(flow.state(), FlowState::Open);
        assert!(flow.confirm().is_none());

        flow.submit(Ok(()));
        assert!(flow.confirm().is_some());
    }

    #[test]
    fn completion_after_cancel_is_ignored() {
        let mut flow: MutationFlow<()> = MutationFlow::new();
        flow.open_create();
        flow.submit(Ok(()));
        let permit = flow.confirm().unwrap();

        flow.cancel();
        flow.open_create();
        assert_eq!(flow.complete(permit, &ok()), FlowEvent::Ignored);
        assert_eq!(flow.state(), FlowState::Open);
    }

    #[test]
    fn delete_confirmation_skips_the_form() {
        let mut flow = MutationFlow::new();
        flow.open_confirm(7u32);
        assert!(flow.is_pending());
        let permit = flow.confirm().unwrap();
        assert_eq!(flow.complete(permit, &ok()), FlowEvent::Committed);
    }

    #[test]
    fn editing_a_pending_form_requires_resubmit() {
        let mut flow: MutationFlow<()> = MutationFlow::new();
        flow.open_create();
        flow.submit(Ok(()));
        flow.touch();
        assert_eq!(flow.state(), FlowState::Open);
        assert!(flow.confirm().is_none());
    }

    #[tokio::test]
    async fn commit_requires_a_pending_confirmation() {
        let writes = std::cell::Cell::new(0);
        let refreshes = std::cell::Cell::new(0);
        let flow: RefCell<MutationFlow<()>> = RefCell::new(MutationFlow::new());
        flow.borrow_mut().open_create();

        let (writes, refreshes) = (&writes, &refreshes);
        let write = move || async move {
            writes.set(writes.get() + 1);
            ok()
        };
        let refresh = move || async move { refreshes.set(refreshes.get() + 1) };

        // 仅打开、未提交
        assert!(commit(&flow, write, refresh).await.is_none());
        assert_eq!((writes.get(), refreshes.get()), (0, 0));

        flow.borrow_mut().submit(Ok(()));
        let outcome = commit(&flow, write, refresh).await.unwrap();
        assert_eq!(outcome.event, FlowEvent::Committed);
        assert_eq!((writes.get(), refreshes.get()), (1, 1));
        assert_eq!(flow.borrow().state(), FlowState::Closed);

        // 已关闭的流程不会再次写入
        assert!(commit(&flow, write, refresh).await.is_none());
        assert_eq!(writes.get(), 1);
    }

    #[test]
    fn server_side_field_errors_are_kept() {
        let mut flow: MutationFlow<()> = MutationFlow::new();
        flow.open_create();
        flow.submit(Ok(()));
        let permit = flow.confirm().unwrap();
        let failed: ApiResult<()> = Err(ApiError::Validation(FormErrors::single(
            "login",
            "this login already exists",
        )));
        flow.complete(permit, &failed);
        assert_eq!(flow.errors().first("login"), Some("this login already exists"));
    }
}
