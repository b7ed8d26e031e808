//! 面向页面的 API 门面
//!
//! 把协议请求、会话与网关组合成页面直接调用的操作。
//! 所有方法返回 `ApiResult`，页面据此决定刷新、提示或重试。

use std::sync::Arc;

use tracing::info;

use crate::error::{ApiError, ApiResult, ConflictReason};
use crate::gateway::{ApiConfig, Gateway};
use crate::http::HttpClient;
use crate::models::{
    Account, AccountUpdate, Credentials, Movie, NewTicket, Role, Ticket, TicketTimeChange,
};
use crate::protocol::{
    BuyTicket, ClientTickets, CreateMovie, CreateTicket, DeleteMovie, DeleteTicket, GetAccount,
    GetMovie, GetOwnAccount, ListAccounts, ListMovies, ListTickets, Login, MovieTickets,
    OwnTickets, Register, RescheduleTicket, SetAccountStatus, UpdateAccount, UpdateMovie,
};
use crate::session::{KeyValueStore, SessionAccount, SessionStore};

#[cfg(test)]
mod tests;

/// 票据列表的范围
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TicketScope {
    #[default]
    All,
    Client(String),
    Own,
}

pub struct CinemaApi<C, S> {
    gateway: Arc<Gateway<C, SessionStore<S>>>,
}

impl<C, S> Clone for CinemaApi<C, S> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<C: HttpClient, S: KeyValueStore> CinemaApi<C, S> {
    pub fn new(client: C, store: S, config: ApiConfig) -> Self {
        let session = SessionStore::new(store);
        Self {
            gateway: Arc::new(Gateway::new(client, session, config)),
        }
    }

    pub fn session(&self) -> &SessionStore<S> {
        self.gateway.credentials()
    }

    // =========================================================
    // Auth
    // =========================================================

    pub async fn login(&self, role: Role, credentials: Credentials) -> ApiResult<SessionAccount> {
        let token = self
            .gateway
            .send(&Login { role, credentials })
            .await?;
        let account = self.session().establish(&token)?;
        info!("Logged in as {} ({})", account.login, account.role);
        Ok(account)
    }

    pub fn logout(&self) {
        self.session().clear();
        info!("Logged out");
    }

    pub async fn register(&self, role: Role, credentials: Credentials) -> ApiResult<()> {
        self.gateway.send(&Register { role, credentials }).await
    }

    // =========================================================
    // Movies
    // =========================================================

    pub async fn movies(&self) -> ApiResult<Vec<Movie>> {
        self.gateway.send(&ListMovies).await
    }

    pub async fn movie_tickets(&self, movie_id: &str) -> ApiResult<Vec<Ticket>> {
        self.gateway
            .send(&MovieTickets {
                movie_id: movie_id.to_string(),
            })
            .await
    }

    pub async fn create_movie(&self, movie: Movie) -> ApiResult<()> {
        self.gateway.send(&CreateMovie { movie }).await
    }

    /// 读取影片取得 ETag，再以 `If-Match` 提交修改
    pub async fn update_movie(&self, movie: Movie) -> ApiResult<()> {
        let read = GetMovie {
            id: movie.id.clone(),
        };
        self.gateway
            .update_versioned(&read, move |_current| Ok(UpdateMovie { movie }))
            .await
    }

    /// 删除前的守卫：仍有票据引用时拒绝
    pub async fn ensure_movie_deletable(&self, movie_id: &str) -> ApiResult<()> {
        let tickets = self.movie_tickets(movie_id).await?;
        if crate::filters::movie_has_tickets(&tickets) {
            return Err(ApiError::Conflict(ConflictReason::MovieHasTickets(
                tickets.len(),
            )));
        }
        Ok(())
    }

    pub async fn delete_movie(&self, movie_id: &str) -> ApiResult<()> {
        self.gateway
            .send(&DeleteMovie {
                id: movie_id.to_string(),
            })
            .await
    }

    // =========================================================
    // Tickets
    // =========================================================

    pub async fn tickets(&self, scope: &TicketScope) -> ApiResult<Vec<Ticket>> {
        match scope {
            TicketScope::All => self.gateway.send(&ListTickets).await,
            TicketScope::Client(client_id) => {
                self.gateway
                    .send(&ClientTickets {
                        client_id: client_id.clone(),
                    })
                    .await
            }
            TicketScope::Own => self.gateway.send(&OwnTickets).await,
        }
    }

    pub async fn create_ticket(&self, ticket: NewTicket) -> ApiResult<Ticket> {
        self.gateway.send(&CreateTicket { ticket }).await
    }

    /// 客户为自己购票；先读取自己的账户 id 填入请求体
    pub async fn buy_ticket(&self, movie_time: &str, movie_id: &str) -> ApiResult<Ticket> {
        let own = self.own_account().await?;
        let ticket = NewTicket {
            movie_time: movie_time.to_string(),
            client_id: own.id,
            movie_id: movie_id.to_string(),
        };
        self.gateway.send(&BuyTicket { ticket }).await
    }

    pub async fn reschedule_ticket(&self, change: TicketTimeChange) -> ApiResult<()> {
        self.gateway.send(&RescheduleTicket { change }).await
    }

    pub async fn delete_ticket(&self, ticket_id: &str) -> ApiResult<()> {
        self.gateway
            .send(&DeleteTicket {
                id: ticket_id.to_string(),
            })
            .await
    }

    // =========================================================
    // Accounts
    // =========================================================

    pub async fn accounts(&self, role: Role) -> ApiResult<Vec<Account>> {
        self.gateway.send(&ListAccounts { role }).await
    }

    fn session_role(&self) -> ApiResult<Role> {
        self.session().role().ok_or(ApiError::Unauthorized)
    }

    pub async fn own_account(&self) -> ApiResult<Account> {
        let role = self.session_role()?;
        self.gateway.send(&GetOwnAccount { role }).await
    }

    /// 修改任意账户的密码，ETag 取自该账户自身的资源
    pub async fn change_password(
        &self,
        role: Role,
        account_id: &str,
        password: &str,
    ) -> ApiResult<()> {
        let read = GetAccount {
            role,
            id: account_id.to_string(),
        };
        self.gateway
            .update_versioned(&read, |account: Account| {
                Ok(UpdateAccount {
                    role,
                    update: AccountUpdate::with_password(&account, password),
                })
            })
            .await
    }

    pub async fn change_own_password(&self, password: &str) -> ApiResult<()> {
        let role = self.session_role()?;
        self.gateway
            .update_versioned(&GetOwnAccount { role }, |account: Account| {
                Ok(UpdateAccount {
                    role,
                    update: AccountUpdate::with_password(&account, password),
                })
            })
            .await
    }

    /// 启用或停用账户；不允许停用当前登录的账户
    pub async fn set_account_status(
        &self,
        role: Role,
        account: &Account,
        active: bool,
    ) -> ApiResult<()> {
        if !active && self.is_current_account(role, account) {
            return Err(ApiError::Conflict(ConflictReason::SelfDeactivation));
        }
        self.gateway
            .send(&SetAccountStatus {
                role,
                id: account.id.clone(),
                active,
            })
            .await
    }

    pub fn is_current_account(&self, role: Role, account: &Account) -> bool {
        self.session()
            .account()
            .is_some_and(|current| current.role == role && current.login == account.login)
    }
}
