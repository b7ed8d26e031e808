use std::cell::RefCell;

use super::*;
use crate::error::ErrorKind;
use crate::filters::available_movies;
use crate::http::mock::MockHttpClient;
use crate::http::{HttpMethod, HttpResponse};
use crate::mutation::{FlowEvent, FlowState, MutationFlow, commit};
use crate::session::MemoryStore;
use crate::session::tests::fake_jwt;
use crate::validation::{MovieForm, TicketForm};
use crate::{HEADER_AUTHORIZATION, HEADER_IF_MATCH, Screen};

type TestApi = CinemaApi<MockHttpClient, MemoryStore>;

const OWN_CLIENT_JSON: &str = r#"{"userID":"c-42","userLogin":"alice123","userStatusActive":true}"#;

fn setup() -> (MockHttpClient, MemoryStore, TestApi) {
    let client = MockHttpClient::new();
    let store = MemoryStore::new();
    let api = CinemaApi::new(
        client.clone(),
        store.clone(),
        ApiConfig::new("http://cinema.test/api"),
    );
    (client, store, api)
}

fn token_for(login: &str, role: &str) -> String {
    fake_jwt(serde_json::json!({ "sub": login, "user_role": [role] }))
}

async fn logged_in(
    role: Role,
    login: &str,
    role_claim: &str,
) -> (MockHttpClient, MemoryStore, TestApi) {
    let (client, store, api) = setup();
    client.on(
        HttpMethod::Post,
        &format!("/auth/login/{}", role.segment()),
        HttpResponse::new(200, token_for(login, role_claim)),
    );
    api.login(role, Credentials::new(login, "secret12"))
        .await
        .unwrap();
    (client, store, api)
}

fn body_of(client: &MockHttpClient, method: HttpMethod, path: &str) -> serde_json::Value {
    let request = client
        .requests()
        .into_iter()
        .rev()
        .find(|r| r.method == method && r.url.ends_with(path))
        .unwrap();
    serde_json::from_str(request.body.as_deref().unwrap()).unwrap()
}

// =========================================================
// Auth
// =========================================================

#[tokio::test]
async fn client_login_scenario() {
    let (client, store, api) = setup();
    client.on(
        HttpMethod::Post,
        "/auth/login/client",
        HttpResponse::new(200, token_for("alice123", "CLIENT")),
    );

    let account = api
        .login(Role::Client, Credentials::new("alice123", "secret12"))
        .await
        .unwrap();

    assert_eq!(account.login, "alice123");
    assert_eq!(account.role, Role::Client);
    assert_eq!(
        body_of(&client, HttpMethod::Post, "/auth/login/client"),
        serde_json::json!({ "userLogin": "alice123", "userPassword": "secret12" })
    );

    let token = api.session().get_token();
    assert!(token.as_deref().is_some_and(|t| !t.is_empty()));
    assert_eq!(store.len(), 2);

    let role = api.session().role();
    assert!(Screen::BuyTickets.admits(role));
    assert!(!Screen::Movies.admits(role));
}

#[tokio::test]
async fn rejected_login_leaves_session_anonymous() {
    let (client, _store, api) = setup();
    client.on(HttpMethod::Post, "/auth/login/staff", HttpResponse::new(401, ""));

    let err = api
        .login(Role::Staff, Credentials::new("bob_staff", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert!(!api.session().is_authenticated());
}

#[tokio::test]
async fn logout_removes_both_entries() {
    let (_client, store, api) = logged_in(Role::Admin, "root_admin", "ADMIN").await;
    api.logout();
    assert!(store.is_empty());
    assert_eq!(api.session().account(), None);
}

#[tokio::test]
async fn register_posts_credentials_to_role_path() {
    let (client, _store, api) = setup();
    client.on(HttpMethod::Post, "/auth/register/staff", HttpResponse::new(201, ""));

    api.register(Role::Staff, Credentials::new("new_staffer", "password1"))
        .await
        .unwrap();
    assert_eq!(client.calls_to(HttpMethod::Post, "/auth/register/staff"), 1);
}

// =========================================================
// Movies
// =========================================================

#[tokio::test]
async fn movie_with_tickets_is_refused_without_a_write() {
    let (client, _store, api) = logged_in(Role::Staff, "bob_staff", "STAFF").await;
    client.on(
        HttpMethod::Get,
        "/movies/m1/tickets",
        HttpResponse::new(200, r#"[{"ticket-id":"t1","movie-id":"m1"}]"#),
    );

    let err = api.ensure_movie_deletable("m1").await.unwrap_err();
    assert_eq!(err, ApiError::Conflict(ConflictReason::MovieHasTickets(1)));
    assert_eq!(client.calls_to(HttpMethod::Delete, "/movies/m1/delete"), 0);
}

#[tokio::test]
async fn movie_without_tickets_proceeds_to_confirmation() {
    let (client, _store, api) = logged_in(Role::Staff, "bob_staff", "STAFF").await;
    client.on(HttpMethod::Get, "/movies/m2/tickets", HttpResponse::new(200, "[]"));
    client.on(HttpMethod::Delete, "/movies/m2/delete", HttpResponse::new(204, ""));

    let mut flow = MutationFlow::new();
    api.ensure_movie_deletable("m2").await.unwrap();
    flow.open_confirm("m2".to_string());
    assert_eq!(client.calls_to(HttpMethod::Delete, "/movies/m2/delete"), 0);

    let permit = flow.confirm().unwrap();
    let result = api.delete_movie("m2").await;
    assert_eq!(flow.complete(permit, &result), FlowEvent::Committed);
    assert_eq!(client.calls_to(HttpMethod::Delete, "/movies/m2/delete"), 1);
}

#[tokio::test]
async fn submit_and_confirm_write_exactly_once() {
    let (client, _store, api) = logged_in(Role::Staff, "bob_staff", "STAFF").await;
    client.on(HttpMethod::Post, "/movies", HttpResponse::new(201, ""));
    client.on(HttpMethod::Get, "/movies/all", HttpResponse::new(200, "[]"));

    let form = MovieForm {
        title: "Arrival".into(),
        base_price: 18.0,
        screening_room: 4,
        available_seats: 90,
    };
    let mut flow: MutationFlow<()> = MutationFlow::new();
    flow.open_create();

    assert!(flow.submit(form.check()));
    assert_eq!(client.calls_to(HttpMethod::Post, "/movies"), 0);

    let permit = flow.confirm().unwrap();
    assert!(flow.confirm().is_none());
    let result = api.create_movie(form.to_movie("")).await;
    if flow.complete(permit, &result) == FlowEvent::Committed {
        api.movies().await.unwrap();
    }

    assert_eq!(client.calls_to(HttpMethod::Post, "/movies"), 1);
    let body = body_of(&client, HttpMethod::Post, "/movies");
    assert!(body.get("movie-id").is_none());
    assert_eq!(body["movie-title"], "Arrival");

    let requests = client.requests();
    let write = requests
        .iter()
        .position(|r| r.method == HttpMethod::Post && r.url.ends_with("/movies"));
    let refresh = requests.iter().rposition(|r| r.url.ends_with("/movies/all"));
    assert!(write < refresh);
}

#[tokio::test]
async fn movie_update_reads_etag_first() {
    let (client, _store, api) = logged_in(Role::Staff, "bob_staff", "STAFF").await;
    client.on(
        HttpMethod::Get,
        "/movies/m1",
        HttpResponse::new(200, r#"{"movie-id":"m1","movie-title":"Old"}"#)
            .with_header("ETag", "sig-123"),
    );
    client.on(HttpMethod::Put, "/movies/update", HttpResponse::new(204, ""));

    let movie = Movie {
        id: "m1".into(),
        title: "New".into(),
        base_price: 12.0,
        screening_room: 2,
        available_seats: 10,
    };
    api.update_movie(movie).await.unwrap();

    let put = client
        .requests()
        .into_iter()
        .find(|r| r.method == HttpMethod::Put)
        .unwrap();
    assert_eq!(put.header(HEADER_IF_MATCH), Some("sig-123"));
    assert!(put.header(HEADER_AUTHORIZATION).is_some_and(|h| h.starts_with("Bearer ")));
    assert_eq!(body_of(&client, HttpMethod::Put, "/movies/update")["movie-title"], "New");
}

// =========================================================
// Tickets
// =========================================================

#[tokio::test]
async fn ticket_scopes_hit_their_endpoints() {
    let (client, _store, api) = logged_in(Role::Staff, "bob_staff", "STAFF").await;
    client.on(HttpMethod::Get, "/tickets/all", HttpResponse::new(200, "[]"));
    client.on(HttpMethod::Get, "/clients/c1/ticket-list", HttpResponse::new(200, "[]"));
    client.on(HttpMethod::Get, "/clients/self/ticket-list", HttpResponse::new(200, "{}"));

    api.tickets(&TicketScope::All).await.unwrap();
    api.tickets(&TicketScope::Client("c1".into())).await.unwrap();
    let own = api.tickets(&TicketScope::Own).await.unwrap();

    assert!(own.is_empty());
    assert_eq!(client.calls_to(HttpMethod::Get, "/tickets/all"), 1);
    assert_eq!(client.calls_to(HttpMethod::Get, "/clients/c1/ticket-list"), 1);
    assert_eq!(client.calls_to(HttpMethod::Get, "/clients/self/ticket-list"), 1);
}

#[tokio::test]
async fn sold_out_ticket_is_a_conflict_and_adds_no_row() {
    let (client, _store, api) = logged_in(Role::Staff, "bob_staff", "STAFF").await;
    client.on(HttpMethod::Post, "/tickets", HttpResponse::new(200, ""));
    client.on(HttpMethod::Get, "/tickets/all", HttpResponse::new(200, "[]"));

    let form = TicketForm {
        movie_time: "2024-05-01T18:30:00".into(),
        client_id: "c1".into(),
        movie_id: "m1".into(),
    };
    let mut flow: MutationFlow<()> = MutationFlow::new();
    flow.open_create();
    flow.submit(form.check());
    let permit = flow.confirm().unwrap();

    let result = api.create_ticket(form.to_ticket()).await;
    assert!(matches!(
        result,
        Err(ApiError::Conflict(ConflictReason::Rejected(_)))
    ));
    assert!(matches!(flow.complete(permit, &result), FlowEvent::Retry(_)));
    assert!(flow.is_open());

    let tickets = api.tickets(&TicketScope::All).await.unwrap();
    assert!(tickets.is_empty());
}

fn position_of(client: &MockHttpClient, method: HttpMethod, path: &str) -> usize {
    client
        .requests()
        .iter()
        .position(|r| r.method == method && r.url.ends_with(path))
        .unwrap()
}

/// 工作人员开票页面在写入之后刷新的三个列表
async fn refresh_ticket_screen(api: &TestApi) {
    let _ = api.tickets(&TicketScope::All).await;
    let _ = api.accounts(Role::Client).await;
    let _ = api.movies().await;
}

fn pending_ticket_flow() -> RefCell<MutationFlow<()>> {
    let flow = RefCell::new(MutationFlow::new());
    flow.borrow_mut().open_create();
    flow.borrow_mut().submit(Ok(()));
    flow
}

fn new_ticket() -> NewTicket {
    NewTicket {
        movie_time: "2024-05-01T18:30:00".into(),
        client_id: "c1".into(),
        movie_id: "m1".into(),
    }
}

#[tokio::test]
async fn rejected_write_refreshes_dependent_lists_afterwards() {
    let (client, _store, api) = logged_in(Role::Staff, "bob_staff", "STAFF").await;
    client.on(HttpMethod::Post, "/tickets", HttpResponse::new(200, ""));
    client.on(HttpMethod::Get, "/tickets/all", HttpResponse::new(200, "[]"));
    client.on(HttpMethod::Get, "/clients/all", HttpResponse::new(200, "[]"));
    client.on(HttpMethod::Get, "/movies/all", HttpResponse::new(200, "[]"));

    let flow = pending_ticket_flow();
    let api = &api;
    let outcome = commit(
        &flow,
        move || api.create_ticket(new_ticket()),
        move || refresh_ticket_screen(api),
    )
    .await
    .unwrap();

    assert!(matches!(outcome.event, FlowEvent::Retry(_)));
    assert!(matches!(
        outcome.result,
        Err(ApiError::Conflict(ConflictReason::Rejected(_)))
    ));
    assert_eq!(flow.borrow().state(), FlowState::Open);

    let post = position_of(&client, HttpMethod::Post, "/tickets");
    for list in ["/tickets/all", "/clients/all", "/movies/all"] {
        let refreshed = position_of(&client, HttpMethod::Get, list);
        assert!(refreshed > post, "{list} fetched before the write");
    }
    assert_eq!(client.calls_to(HttpMethod::Post, "/tickets"), 1);
}

#[tokio::test]
async fn confirmed_write_is_sent_once_and_closes_the_form() {
    let (client, _store, api) = logged_in(Role::Staff, "bob_staff", "STAFF").await;
    client.on(
        HttpMethod::Post,
        "/tickets",
        HttpResponse::new(
            200,
            r#"{"ticket-id":"t1","movie-time":"2024-05-01T18:30:00",
                "ticket-final-price":12.5,"client-id":"c1","movie-id":"m1"}"#,
        ),
    );

    let flow = pending_ticket_flow();
    let api = &api;
    let outcome = commit(
        &flow,
        move || api.create_ticket(new_ticket()),
        move || refresh_ticket_screen(api),
    )
    .await
    .unwrap();
    assert_eq!(outcome.event, FlowEvent::Committed);
    assert_eq!(outcome.result.unwrap().id, "t1");
    assert_eq!(flow.borrow().state(), FlowState::Closed);

    // 再次确认不会产生第二次写入
    let again = commit(
        &flow,
        move || api.create_ticket(new_ticket()),
        move || refresh_ticket_screen(api),
    )
    .await;
    assert!(again.is_none());
    assert_eq!(client.calls_to(HttpMethod::Post, "/tickets"), 1);
    let post = position_of(&client, HttpMethod::Post, "/tickets");
    assert!(position_of(&client, HttpMethod::Get, "/tickets/all") > post);
}

#[tokio::test]
async fn buying_fills_in_own_client_id() {
    let (client, _store, api) = logged_in(Role::Client, "alice123", "CLIENT").await;
    client.on(
        HttpMethod::Get,
        "/clients/login/self",
        HttpResponse::new(200, OWN_CLIENT_JSON),
    );
    client.on(
        HttpMethod::Post,
        "/tickets/self",
        HttpResponse::new(
            200,
            r#"{"ticket-id":"t9","movie-time":"2024-06-01T20:00:00",
                "ticket-final-price":15,"client-id":"c-42","movie-id":"m3"}"#,
        ),
    );

    let ticket = api.buy_ticket("2024-06-01T20:00:00", "m3").await.unwrap();
    assert_eq!(ticket.id, "t9");
    assert_eq!(
        body_of(&client, HttpMethod::Post, "/tickets/self"),
        serde_json::json!({
            "movie-time": "2024-06-01T20:00:00",
            "client-id": "c-42",
            "movie-id": "m3"
        })
    );
}

#[tokio::test]
async fn new_ticket_form_only_offers_available_movies() {
    let (client, _store, api) = logged_in(Role::Staff, "bob_staff", "STAFF").await;
    client.on(
        HttpMethod::Get,
        "/movies/all",
        HttpResponse::new(
            200,
            r#"[{"movie-id":"m1","number-of-available-seats":0},
                {"movie-id":"m2","number-of-available-seats":5}]"#,
        ),
    );
    let movies = api.movies().await.unwrap();
    let offered: Vec<String> = available_movies(&movies).into_iter().map(|m| m.id).collect();
    assert_eq!(offered, vec!["m2".to_string()]);
}

#[tokio::test]
async fn reschedule_and_delete_ticket() {
    let (client, _store, api) = logged_in(Role::Client, "alice123", "CLIENT").await;
    client.on(HttpMethod::Put, "/tickets", HttpResponse::new(204, ""));
    client.on(HttpMethod::Delete, "/tickets/t1", HttpResponse::new(204, ""));

    api.reschedule_ticket(TicketTimeChange {
        ticket_id: "t1".into(),
        movie_time: "2024-06-02T20:00:00".into(),
    })
    .await
    .unwrap();
    api.delete_ticket("t1").await.unwrap();

    assert_eq!(client.calls_to(HttpMethod::Put, "/tickets"), 1);
    assert_eq!(client.calls_to(HttpMethod::Delete, "/tickets/t1"), 1);
}

// =========================================================
// Accounts
// =========================================================

#[tokio::test]
async fn self_deactivation_is_refused_before_any_request() {
    let (client, _store, api) = logged_in(Role::Admin, "root_admin", "ADMIN").await;
    let me = Account {
        id: "a1".into(),
        login: "root_admin".into(),
        active: true,
    };

    let err = api.set_account_status(Role::Admin, &me, false).await.unwrap_err();
    assert_eq!(err, ApiError::Conflict(ConflictReason::SelfDeactivation));
    assert_eq!(client.calls_to(HttpMethod::Post, "/admins/a1/deactivate"), 0);
}

#[tokio::test]
async fn toggling_other_accounts_posts_the_action() {
    let (client, _store, api) = logged_in(Role::Admin, "root_admin", "ADMIN").await;
    client.on(HttpMethod::Post, "/clients/c1/deactivate", HttpResponse::new(204, ""));
    client.on(HttpMethod::Post, "/admins/a2/activate", HttpResponse::new(204, ""));

    let client_account = Account {
        id: "c1".into(),
        login: "root_admin".into(),
        active: true,
    };
    // 同名但不同角色，不是当前账户
    api.set_account_status(Role::Client, &client_account, false)
        .await
        .unwrap();

    let other_admin = Account {
        id: "a2".into(),
        login: "second_admin".into(),
        active: false,
    };
    api.set_account_status(Role::Admin, &other_admin, true)
        .await
        .unwrap();

    assert_eq!(client.calls_to(HttpMethod::Post, "/clients/c1/deactivate"), 1);
    assert_eq!(client.calls_to(HttpMethod::Post, "/admins/a2/activate"), 1);
}

#[tokio::test]
async fn change_password_uses_the_accounts_own_etag() {
    let (client, _store, api) = logged_in(Role::Admin, "root_admin", "ADMIN").await;
    client.on(
        HttpMethod::Get,
        "/staffs/s1",
        HttpResponse::new(200, r#"{"userID":"s1","userLogin":"bob_staff","userStatusActive":true}"#)
            .with_header("ETag", "staff-sig"),
    );
    client.on(HttpMethod::Put, "/staffs/update", HttpResponse::new(204, ""));

    api.change_password(Role::Staff, "s1", "brandnew12").await.unwrap();

    let put = client
        .requests()
        .into_iter()
        .find(|r| r.method == HttpMethod::Put)
        .unwrap();
    assert_eq!(put.header(HEADER_IF_MATCH), Some("staff-sig"));
    assert_eq!(
        body_of(&client, HttpMethod::Put, "/staffs/update"),
        serde_json::json!({
            "userID": "s1",
            "userLogin": "bob_staff",
            "userPassword": "brandnew12",
            "userStatusActive": true
        })
    );
}

#[tokio::test]
async fn own_password_change_goes_through_login_self() {
    let (client, _store, api) = logged_in(Role::Client, "alice123", "CLIENT").await;
    client.on(
        HttpMethod::Get,
        "/clients/login/self",
        HttpResponse::new(200, OWN_CLIENT_JSON)
            .with_header("ETag", "self-sig"),
    );
    client.on(HttpMethod::Put, "/clients/update", HttpResponse::new(412, ""));

    let err = api.change_own_password("another12").await.unwrap_err();
    assert_eq!(err, ApiError::Conflict(ConflictReason::StaleVersion));
    assert_eq!(client.calls_to(HttpMethod::Put, "/clients/update"), 1);
}

#[tokio::test]
async fn anonymous_own_account_is_unauthorized() {
    let (client, _store, api) = setup();
    assert_eq!(api.own_account().await.unwrap_err(), ApiError::Unauthorized);
    assert!(client.requests().is_empty());
}
