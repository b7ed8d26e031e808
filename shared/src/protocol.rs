use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::{ApiError, ApiResult, ConflictReason};
use crate::http::HttpMethod;
use crate::models::{
    Account, AccountUpdate, Credentials, Movie, NewTicket, Role, Ticket, TicketTimeChange,
};

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest {
    /// The response type returned by this request.
    type Response;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// The URL path relative to the API base.
    fn path(&self) -> String;
    /// Serialized JSON body, if the endpoint takes one.
    fn body(&self) -> ApiResult<Option<String>> {
        Ok(None)
    }
    /// Turns the raw response body into the typed response.
    fn decode(body: &str) -> ApiResult<Self::Response>;
}

// =========================================================
// Body helpers
// =========================================================

fn json_body<T: Serialize>(value: &T) -> ApiResult<Option<String>> {
    Ok(Some(serde_json::to_string(value)?))
}

pub fn decode_json<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    serde_json::from_str(body).map_err(ApiError::from)
}

/// List endpoints: an empty body is an empty list, a non-array body is logged and dropped.
pub fn decode_list<T: DeserializeOwned>(body: &str) -> ApiResult<Vec<T>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(body)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(ApiError::from))
            .collect(),
        other => {
            warn!("Expected a JSON array, got: {}", other);
            Ok(Vec::new())
        }
    }
}

/// Write endpoints that echo the created entity; an empty body means the server refused.
pub fn decode_entity<T: DeserializeOwned>(body: &str, refusal: &str) -> ApiResult<T> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(ApiError::Conflict(ConflictReason::Rejected(
            refusal.to_string(),
        )));
    }
    decode_json(trimmed)
}

pub fn decode_unit(_body: &str) -> ApiResult<()> {
    Ok(())
}

/// The login endpoint answers with the raw JWT, sometimes JSON-quoted.
pub fn decode_token(body: &str) -> ApiResult<String> {
    let trimmed = body.trim();
    let token = if trimmed.starts_with('"') {
        serde_json::from_str::<String>(trimmed)?
    } else {
        trimmed.to_string()
    };
    if token.is_empty() || token == "null" {
        return Err(ApiError::Unauthorized);
    }
    Ok(token)
}

// =========================================================
// Movies
// =========================================================

/// List all movies
#[derive(Debug, Clone, Copy)]
pub struct ListMovies;

impl ApiRequest for ListMovies {
    type Response = Vec<Movie>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/movies/all".to_string()
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_list(body)
    }
}

/// Read one movie; the response carries the ETag used by updates
#[derive(Debug, Clone)]
pub struct GetMovie {
    pub id: String,
}

impl ApiRequest for GetMovie {
    type Response = Movie;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/movies/{}", self.id)
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_json(body)
    }
}

/// Tickets referencing a movie (deletion guard)
#[derive(Debug, Clone)]
pub struct MovieTickets {
    pub movie_id: String,
}

impl ApiRequest for MovieTickets {
    type Response = Vec<Ticket>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/movies/{}/tickets", self.movie_id)
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_list(body)
    }
}

#[derive(Debug, Clone)]
pub struct CreateMovie {
    pub movie: Movie,
}

impl ApiRequest for CreateMovie {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/movies".to_string()
    }
    fn body(&self) -> ApiResult<Option<String>> {
        json_body(&self.movie)
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_unit(body)
    }
}

/// Sent with `If-Match`
#[derive(Debug, Clone)]
pub struct UpdateMovie {
    pub movie: Movie,
}

impl ApiRequest for UpdateMovie {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        "/movies/update".to_string()
    }
    fn body(&self) -> ApiResult<Option<String>> {
        json_body(&self.movie)
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_unit(body)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteMovie {
    pub id: String,
}

impl ApiRequest for DeleteMovie {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/movies/{}/delete", self.id)
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_unit(body)
    }
}

// =========================================================
// Tickets
// =========================================================

#[derive(Debug, Clone, Copy)]
pub struct ListTickets;

impl ApiRequest for ListTickets {
    type Response = Vec<Ticket>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/tickets/all".to_string()
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_list(body)
    }
}

#[derive(Debug, Clone)]
pub struct ClientTickets {
    pub client_id: String,
}

impl ApiRequest for ClientTickets {
    type Response = Vec<Ticket>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/clients/{}/ticket-list", self.client_id)
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_list(body)
    }
}

/// Tickets of the signed-in client
#[derive(Debug, Clone, Copy)]
pub struct OwnTickets;

impl ApiRequest for OwnTickets {
    type Response = Vec<Ticket>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/clients/self/ticket-list".to_string()
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_list(body)
    }
}

const TICKET_REFUSED: &str =
    "the ticket was not created: the client is inactive or the movie is sold out";

#[derive(Debug, Clone)]
pub struct CreateTicket {
    pub ticket: NewTicket,
}

impl ApiRequest for CreateTicket {
    type Response = Ticket;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/tickets".to_string()
    }
    fn body(&self) -> ApiResult<Option<String>> {
        json_body(&self.ticket)
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_entity(body, TICKET_REFUSED)
    }
}

/// A client buying a ticket for themselves
#[derive(Debug, Clone)]
pub struct BuyTicket {
    pub ticket: NewTicket,
}

impl ApiRequest for BuyTicket {
    type Response = Ticket;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/tickets/self".to_string()
    }
    fn body(&self) -> ApiResult<Option<String>> {
        json_body(&self.ticket)
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_entity(body, TICKET_REFUSED)
    }
}

#[derive(Debug, Clone)]
pub struct RescheduleTicket {
    pub change: TicketTimeChange,
}

impl ApiRequest for RescheduleTicket {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        "/tickets".to_string()
    }
    fn body(&self) -> ApiResult<Option<String>> {
        json_body(&self.change)
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_unit(body)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteTicket {
    pub id: String,
}

impl ApiRequest for DeleteTicket {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/tickets/{}", self.id)
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_unit(body)
    }
}

// =========================================================
// Accounts
// =========================================================

#[derive(Debug, Clone, Copy)]
pub struct ListAccounts {
    pub role: Role,
}

impl ApiRequest for ListAccounts {
    type Response = Vec<Account>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/{}/all", self.role.collection())
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_list(body)
    }
}

#[derive(Debug, Clone)]
pub struct GetAccount {
    pub role: Role,
    pub id: String,
}

impl ApiRequest for GetAccount {
    type Response = Account;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/{}/{}", self.role.collection(), self.id)
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_json(body)
    }
}

/// The signed-in account, read through its role's collection
#[derive(Debug, Clone, Copy)]
pub struct GetOwnAccount {
    pub role: Role,
}

impl ApiRequest for GetOwnAccount {
    type Response = Account;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/{}/login/self", self.role.collection())
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_json(body)
    }
}

/// Sent with `If-Match`
#[derive(Debug, Clone)]
pub struct UpdateAccount {
    pub role: Role,
    pub update: AccountUpdate,
}

impl ApiRequest for UpdateAccount {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/{}/update", self.role.collection())
    }
    fn body(&self) -> ApiResult<Option<String>> {
        json_body(&self.update)
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_unit(body)
    }
}

#[derive(Debug, Clone)]
pub struct SetAccountStatus {
    pub role: Role,
    pub id: String,
    pub active: bool,
}

impl ApiRequest for SetAccountStatus {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        let action = if self.active { "activate" } else { "deactivate" };
        format!("/{}/{}/{}", self.role.collection(), self.id, action)
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_unit(body)
    }
}

// =========================================================
// Auth
// =========================================================

#[derive(Debug, Clone)]
pub struct Login {
    pub role: Role,
    pub credentials: Credentials,
}

impl ApiRequest for Login {
    type Response = String;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        format!("/auth/login/{}", self.role.segment())
    }
    fn body(&self) -> ApiResult<Option<String>> {
        json_body(&self.credentials)
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_token(body)
    }
}

#[derive(Debug, Clone)]
pub struct Register {
    pub role: Role,
    pub credentials: Credentials,
}

impl ApiRequest for Register {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        format!("/auth/register/{}", self.role.segment())
    }
    fn body(&self) -> ApiResult<Option<String>> {
        json_body(&self.credentials)
    }
    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_unit(body)
    }
}
