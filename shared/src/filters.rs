//! 派生视图：对列表缓存的纯投影，从不修改源数据

use crate::models::{Account, Movie, Ticket};

pub const UNKNOWN_CLIENT: &str = "Unknown Client";
pub const UNKNOWN_MOVIE: &str = "Unknown Movie";

/// 仍有空位、可以开票的影片
pub fn available_movies(movies: &[Movie]) -> Vec<Movie> {
    movies.iter().filter(|m| m.is_available()).cloned().collect()
}

/// 可被选为票据归属的客户
pub fn active_clients(accounts: &[Account]) -> Vec<Account> {
    accounts.iter().filter(|a| a.active).cloned().collect()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn filter_by_login(accounts: &[Account], query: &str) -> Vec<Account> {
    accounts
        .iter()
        .filter(|a| contains_ignore_case(&a.login, query))
        .cloned()
        .collect()
}

pub fn filter_by_title(movies: &[Movie], query: &str) -> Vec<Movie> {
    movies
        .iter()
        .filter(|m| contains_ignore_case(&m.title, query))
        .cloned()
        .collect()
}

pub fn movie_has_tickets(tickets: &[Ticket]) -> bool {
    !tickets.is_empty()
}

/// 表格中的一行：票据加上解析出的客户登录名与影片标题
#[derive(Debug, Clone, PartialEq)]
pub struct TicketRow {
    pub ticket: Ticket,
    pub client_login: String,
    pub movie_title: String,
}

pub fn resolve_ticket_rows(
    tickets: &[Ticket],
    clients: &[Account],
    movies: &[Movie],
) -> Vec<TicketRow> {
    tickets
        .iter()
        .map(|ticket| TicketRow {
            client_login: clients
                .iter()
                .find(|c| c.id == ticket.client_id)
                .map(|c| c.login.clone())
                .unwrap_or_else(|| UNKNOWN_CLIENT.to_string()),
            movie_title: movies
                .iter()
                .find(|m| m.id == ticket.movie_id)
                .map(|m| m.title.clone())
                .unwrap_or_else(|| UNKNOWN_MOVIE.to_string()),
            ticket: ticket.clone(),
        })
        .collect()
}
