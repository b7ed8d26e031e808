//! 认证模块
//!
//! 管理会话状态，与路由系统解耦。
//! 路由服务通过注入的角色信号来执行守卫。

use cinema_shared::{ApiError, ApiResult, Credentials, Role, SessionAccount};
use leptos::prelude::*;

use crate::api::Api;

/// 认证上下文
///
/// 持久化的会话在 localStorage 中，这里的信号是它的响应式镜像。
#[derive(Clone, Copy)]
pub struct AuthContext {
    api: StoredValue<Api>,
    /// 当前账户（匿名为 None）
    pub account: RwSignal<Option<SessionAccount>>,
}

impl AuthContext {
    /// 创建认证上下文，并从存储恢复上次的会话
    pub fn new(api: Api) -> Self {
        let account = RwSignal::new(api.session().account());
        Self {
            api: StoredValue::new(api),
            account,
        }
    }

    pub fn api(&self) -> Api {
        self.api.get_value()
    }

    /// 获取角色信号（用于路由服务注入）
    pub fn role_signal(&self) -> Signal<Option<Role>> {
        let account = self.account;
        Signal::derive(move || account.get().map(|a| a.role))
    }

    /// 从存储重新读取会话；网关在 401 时会清除存储
    pub fn sync(&self) {
        let stored = self.api.with_value(|api| api.session().account());
        if self.account.get_untracked() != stored {
            self.account.set(stored);
        }
    }

    /// 请求失败后调用：401 意味着会话已被清除
    pub fn observe<T>(&self, result: &ApiResult<T>) {
        if matches!(result, Err(ApiError::Unauthorized)) {
            self.sync();
        }
    }

    pub fn is_current(&self, role: Role, login: &str) -> bool {
        self.account
            .get_untracked()
            .is_some_and(|a| a.role == role && a.login == login)
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 登录并保存会话
///
/// 导航由路由服务监听角色信号自动处理。
pub async fn login(
    ctx: &AuthContext,
    role: Role,
    credentials: Credentials,
) -> ApiResult<SessionAccount> {
    let result = ctx.api().login(role, credentials).await;
    if let Ok(account) = &result {
        ctx.account.set(Some(account.clone()));
    }
    result
}

/// 注销并清除状态
///
/// 注意：不需要手动导航，路由服务会监听角色变化并自动重定向
pub fn logout(ctx: &AuthContext) {
    ctx.api.with_value(|api| api.logout());
    ctx.account.set(None);
}
