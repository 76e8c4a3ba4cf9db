//! HTTP API: bracket reads and long-poll for viewers, mutations for admins.
//!
//! Handlers are thin: they extract the request, call [`BracketService`], and map the outcome.

use crate::logic::ResultReport;
use crate::models::{parse_roster_csv, BracketDocument, BracketError, TeamRef, TournamentFormat};
use crate::service::BracketService;
use crate::store::BroadcastNotifier;
use actix_web::{
    error::InternalError,
    get,
    http::StatusCode,
    post, put,
    web::{self, Data, Json, Path, Query},
    HttpResponse, Responder,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};

/// Shared server state: the single-writer bracket service plus the change feed for pollers.
pub struct ServerState {
    service: BracketService,
    notifier: BroadcastNotifier,
    poll_timeout: Duration,
}

impl ServerState {
    pub fn new(service: BracketService, notifier: BroadcastNotifier, poll_timeout: Duration) -> Self {
        Self {
            service,
            notifier,
            poll_timeout,
        }
    }

    pub fn service(&self) -> &BracketService {
        &self.service
    }
}

pub type AppState = Data<ServerState>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct InitializeBody {
    teams: Vec<TeamRef>,
    #[serde(default)]
    format: Option<TournamentFormat>,
}

#[derive(Deserialize)]
struct FormatQuery {
    #[serde(default)]
    format: Option<TournamentFormat>,
}

#[derive(Deserialize)]
struct PollQuery {
    #[serde(default)]
    since: Option<DateTime<Utc>>,
}

/// Path segment: match id (e.g. /api/bracket/matches/{match_id}/result)
#[derive(Deserialize)]
struct MatchPath {
    match_id: String,
}

/// HTTP status for a rejected operation.
pub fn status_for(e: &BracketError) -> StatusCode {
    match e {
        BracketError::Validation(_) => StatusCode::BAD_REQUEST,
        BracketError::NotFound { .. } => StatusCode::NOT_FOUND,
        BracketError::Precondition(_) => StatusCode::CONFLICT,
        BracketError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{ "error": <message>, "kind": <kind> }` with the matching status.
pub fn error_response(e: &BracketError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string(), "kind": e.kind() });
    HttpResponse::build(status_for(e)).json(body)
}

fn respond(result: Result<BracketDocument, BracketError>) -> HttpResponse {
    match result {
        Ok(document) => HttpResponse::Ok().json(&document),
        Err(e) => error_response(&e),
    }
}

/// What a long-poll answers with.
#[derive(Debug)]
pub enum PollOutcome {
    /// Newer than the caller's copy.
    Changed(Arc<BracketDocument>),
    /// Nothing changed before the timeout.
    Unchanged,
    /// The feed dropped messages; the caller should re-read the store.
    Reload,
}

/// Answer at once when `current` is newer than `since`, otherwise wait for the next change.
///
/// `changes` must be subscribed before `current` was read, or a change in between is missed.
pub async fn poll_outcome(
    current: BracketDocument,
    since: Option<DateTime<Utc>>,
    changes: &mut broadcast::Receiver<Arc<BracketDocument>>,
    timeout: Duration,
) -> PollOutcome {
    match since {
        Some(since) if current.tournament.last_updated <= since => {}
        _ => return PollOutcome::Changed(Arc::new(current)),
    }
    match tokio::time::timeout(timeout, changes.recv()).await {
        Ok(Ok(document)) => PollOutcome::Changed(document),
        Ok(Err(RecvError::Lagged(_))) => PollOutcome::Reload,
        Ok(Err(RecvError::Closed)) | Err(_) => PollOutcome::Unchanged,
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-bracket-web",
    })
}

/// Current bracket document.
#[get("/api/bracket")]
async fn api_get_bracket(state: AppState) -> HttpResponse {
    respond(state.service.current())
}

/// Long-poll: answer as soon as the bracket is newer than `since`, or 304 after the timeout.
#[get("/api/bracket/poll")]
async fn api_poll_bracket(state: AppState, query: Query<PollQuery>) -> HttpResponse {
    let mut changes = state.notifier.subscribe();
    let current = match state.service.current() {
        Ok(document) => document,
        Err(e) => return error_response(&e),
    };
    match poll_outcome(current, query.since, &mut changes, state.poll_timeout).await {
        PollOutcome::Changed(document) => HttpResponse::Ok().json(&*document),
        PollOutcome::Reload => respond(state.service.current()),
        PollOutcome::Unchanged => HttpResponse::NotModified().finish(),
    }
}

/// Seed teams into a fresh bracket (tournament must not be started).
#[post("/api/bracket/initialize")]
async fn api_initialize(state: AppState, body: Json<InitializeBody>) -> HttpResponse {
    let body = body.into_inner();
    let format = body.format.unwrap_or_else(|| state.service.default_format());
    respond(state.service.initialize(body.teams, format))
}

/// Same as initialize, with the roster as a CSV body (`id,name,logo`).
#[post("/api/bracket/initialize/csv")]
async fn api_initialize_csv(state: AppState, query: Query<FormatQuery>, body: String) -> HttpResponse {
    let teams = match parse_roster_csv(body.as_bytes()) {
        Ok(teams) => teams,
        Err(e) => return error_response(&BracketError::from(e)),
    };
    let format = query.format.unwrap_or_else(|| state.service.default_format());
    respond(state.service.initialize(teams, format))
}

/// Report (or correct) the score of one match.
#[put("/api/bracket/matches/{match_id}/result")]
async fn api_report_result(state: AppState, path: Path<MatchPath>, body: Json<ResultReport>) -> HttpResponse {
    respond(state.service.report_result(&path.match_id, &body))
}

/// Close the group stage and seed the final stage.
#[post("/api/bracket/advance")]
async fn api_advance_stage(state: AppState) -> HttpResponse {
    respond(state.service.advance_stage())
}

/// Hard reset back to the empty template.
#[post("/api/bracket/reset")]
async fn api_reset(state: AppState) -> HttpResponse {
    respond(state.service.reset())
}

/// Malformed JSON (including non-integer scores) is a validation error like any other.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = serde_json::json!({ "error": err.to_string(), "kind": "validation" });
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// Register every route. State is added by the caller with `app_data`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(api_health)
        .service(api_get_bracket)
        .service(api_poll_bracket)
        .service(api_initialize)
        .service(api_initialize_csv)
        .service(api_report_result)
        .service(api_advance_stage)
        .service(api_reset);
}
