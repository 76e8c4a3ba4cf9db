//! HTTP contract: status codes, error bodies, and long-poll behaviour of the API routes.

use actix_web::{http::StatusCode, test, web::Data, App};
use chrono::SecondsFormat;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tournament_bracket_web::{
    api, BracketDocument, BracketService, BracketSettings, BracketStore, BroadcastNotifier,
    MemoryStore, ResultReport, ServerState, StoreError, TeamRef, TournamentFormat,
};

fn state_with(store: Box<dyn BracketStore>, poll_timeout: Duration) -> Data<ServerState> {
    let notifier = BroadcastNotifier::default();
    let service = BracketService::new(
        store,
        Arc::new(notifier.clone()),
        BracketSettings::default(),
        TournamentFormat::DoubleElimination,
    );
    Data::new(ServerState::new(service, notifier, poll_timeout))
}

fn memory_state() -> Data<ServerState> {
    state_with(Box::new(MemoryStore::new()), Duration::from_millis(50))
}

fn teams_json(n: usize) -> Value {
    let teams: Vec<Value> = (1..=n)
        .map(|i| json!({ "id": format!("t{i}"), "name": format!("Team {i}") }))
        .collect();
    json!({ "teams": teams })
}

fn teams(n: usize) -> Vec<TeamRef> {
    (1..=n).map(|i| TeamRef::new(format!("t{i}"), format!("Team {i}"))).collect()
}

fn since_param(doc: &BracketDocument) -> String {
    doc.tournament.last_updated.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

struct BrokenStore;

impl BracketStore for BrokenStore {
    fn load(&self) -> Result<Option<BracketDocument>, StoreError> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "disk unavailable").into())
    }

    fn save(&self, _document: &BracketDocument) -> Result<(), StoreError> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "disk unavailable").into())
    }
}

#[actix_web::test]
async fn health_and_bracket_are_readable() {
    let app = test::init_service(App::new().app_data(memory_state()).configure(api::configure)).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/bracket").to_request(),
    )
    .await;
    assert_eq!(body["tournament"]["status"], "pending");
}

#[actix_web::test]
async fn initialize_returns_the_started_bracket() {
    let app = test::init_service(App::new().app_data(memory_state()).configure(api::configure)).await;
    let req = test::TestRequest::post()
        .uri("/api/bracket/initialize")
        .set_json(teams_json(8))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["tournament"]["status"], "active");
    assert_eq!(body["teams"].as_array().unwrap().len(), 8);
}

#[actix_web::test]
async fn csv_roster_initializes_the_bracket() {
    let app = test::init_service(App::new().app_data(memory_state()).configure(api::configure)).await;
    let req = test::TestRequest::post()
        .uri("/api/bracket/initialize/csv?format=double_elimination")
        .set_payload("id,name\nt1,One\nt2,Two\nt3,Three\nt4,Four\n")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["teams"][3]["id"], "t4");
    assert_eq!(body["tournament"]["status"], "active");
}

#[actix_web::test]
async fn validation_errors_are_bad_requests() {
    let app = test::init_service(App::new().app_data(memory_state()).configure(api::configure)).await;
    let req = test::TestRequest::post()
        .uri("/api/bracket/initialize")
        .set_json(teams_json(3))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "validation");
    assert!(body["error"].as_str().unwrap().contains("at least 4"));
}

#[actix_web::test]
async fn non_integer_score_is_a_validation_error() {
    let state = memory_state();
    state.service().initialize(teams(8), TournamentFormat::DoubleElimination).unwrap();
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let req = test::TestRequest::put()
        .uri("/api/bracket/matches/upperR1M1/result")
        .set_json(json!({ "team1Score": 1.5, "team2Score": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "validation");

    let req = test::TestRequest::put()
        .uri("/api/bracket/matches/upperR1M1/result")
        .set_json(json!({ "team1Score": -1, "team2Score": 0 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let stored = state.service().current().unwrap();
    assert_eq!(stored.get_match("upperR1M1").unwrap().team1_score, 0);
}

#[actix_web::test]
async fn unknown_match_is_not_found() {
    let state = memory_state();
    state.service().initialize(teams(8), TournamentFormat::DoubleElimination).unwrap();
    let app = test::init_service(App::new().app_data(state).configure(api::configure)).await;

    let req = test::TestRequest::put()
        .uri("/api/bracket/matches/upperR9M9/result")
        .set_json(json!({ "team1Score": 2, "team2Score": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "not_found");
}

#[actix_web::test]
async fn lifecycle_violations_are_conflicts() {
    let app = test::init_service(App::new().app_data(memory_state()).configure(api::configure)).await;

    let req = test::TestRequest::put()
        .uri("/api/bracket/matches/upperR1M1/result")
        .set_json(json!({ "team1Score": 2, "team2Score": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "precondition");

    let advance = test::TestRequest::post().uri("/api/bracket/advance").to_request();
    assert_eq!(test::call_service(&app, advance).await.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn store_failures_are_server_errors() {
    let state = state_with(Box::new(BrokenStore), Duration::from_millis(50));
    let app = test::init_service(App::new().app_data(state).configure(api::configure)).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/bracket").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "store");
}

#[actix_web::test]
async fn poll_answers_at_once_when_caller_is_behind() {
    let state = memory_state();
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;
    let before = state.service().current().unwrap();
    state.service().initialize(teams(4), TournamentFormat::DoubleElimination).unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/bracket/poll?since={}", since_param(&before)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["tournament"]["status"], "active");
}

#[actix_web::test]
async fn poll_without_changes_is_not_modified() {
    let state = memory_state();
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;
    let doc = state.service().initialize(teams(4), TournamentFormat::DoubleElimination).unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/bracket/poll?since={}", since_param(&doc)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
}

#[actix_web::test]
async fn poll_wakes_up_on_a_change() {
    let state = state_with(Box::new(MemoryStore::new()), Duration::from_secs(5));
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;
    let doc = state.service().initialize(teams(4), TournamentFormat::DoubleElimination).unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/bracket/poll?since={}", since_param(&doc)))
        .to_request();
    let report = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        state
            .service()
            .report_result("upperR1M1", &ResultReport::new(2, 0))
            .unwrap();
    };
    let (resp, ()) = tokio::join!(test::call_service(&app, req), report);
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let first = body["rounds"][0]["matches"][0].clone();
    assert_eq!(first["id"], "upperR1M1");
    assert_eq!(first["status"], "completed");
}
