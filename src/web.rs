use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::config::PlannerConfig;
use crate::form::{validate_subject, SubjectRequest};
use crate::schedule::{build_schedule_with, validate_slot_input, GenerateOptions, OptionalOrder, ScheduleOutcome, Strategy, SubjectId, TimetableGrid};
use crate::store::SubjectStore;

pub const USER_HEADER: &str = "X-User-Id";

// In-memory storage; subjects and the last generated timetable per user
pub struct AppState {
    pub subjects: Mutex<SubjectStore>,
    pub timetables: Mutex<HashMap<String, GeneratedTimetable>>,
    pub config: PlannerConfig,
}

impl AppState {
    pub fn new(config: PlannerConfig) -> Self {
        AppState {
            subjects: Mutex::new(SubjectStore::new()),
            timetables: Mutex::new(HashMap::new()),
            config,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedTimetable {
    pub generated_at: DateTime<Utc>,
    pub options: GenerateOptions,
    pub outcome: ScheduleOutcome,
    pub grid: TimetableGrid,
}

/// Per-request overrides of the configured generate options
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateRequest {
    pub strategy: Option<Strategy>,
    pub optional_order: Option<OptionalOrder>,
    /// Shorthand for `optional_order: {"mode": "shuffled", "seed": ..}`
    pub seed: Option<u64>,
}

impl GenerateRequest {
    /// Empty or whitespace-only bodies mean "no overrides".
    pub fn from_body(body: &[u8]) -> Result<Self, String> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(GenerateRequest::default());
        }
        serde_json::from_slice(body).map_err(|e| e.to_string())
    }

    pub fn apply(self, mut options: GenerateOptions) -> Result<GenerateOptions, String> {
        if let Some(strategy) = self.strategy {
            options.strategy = strategy;
        }
        match (self.optional_order, self.seed) {
            (Some(_), Some(_)) => return Err("give either optional_order or seed, not both".to_string()),
            (Some(order), None) => options.optional_order = order,
            (None, Some(seed)) => options.optional_order = OptionalOrder::Shuffled { seed },
            (None, None) => {}
        }
        Ok(options)
    }
}

#[derive(Debug, Deserialize)]
pub struct SlotCheckRequest {
    pub day: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("state lock poisoned"))
}

fn user_id(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Missing user identity"}))
}

fn bad_request(error: impl ToString) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({"success": false, "error": error.to_string()}))
}

// Subject list endpoint
async fn list_subjects(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    let Some(user) = user_id(&req) else {
        return Ok(unauthorized());
    };
    let subjects = lock(&state.subjects)?.list(&user);
    Ok(HttpResponse::Ok().json(subjects))
}

async fn create_subject(
    req: HttpRequest,
    body: web::Json<SubjectRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let Some(user) = user_id(&req) else {
        return Ok(unauthorized());
    };
    match validate_subject(&body, state.config.slots.max_end()) {
        Ok(valid) => {
            let created = lock(&state.subjects)?.create(&user, valid);
            info!(user = %user, id = %created.id, "subject created");
            Ok(HttpResponse::Created().json(created))
        }
        Err(e) => Ok(bad_request(e)),
    }
}

async fn update_subject(
    req: HttpRequest,
    path: web::Path<u64>,
    body: web::Json<SubjectRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let Some(user) = user_id(&req) else {
        return Ok(unauthorized());
    };
    let id = SubjectId(path.into_inner());
    let valid = match validate_subject(&body, state.config.slots.max_end()) {
        Ok(valid) => valid,
        Err(e) => return Ok(bad_request(e)),
    };
    let updated = lock(&state.subjects)?.update(&user, id, valid);
    match updated {
        Ok(updated) => Ok(HttpResponse::Ok().json(updated)),
        Err(e) => Ok(HttpResponse::NotFound().json(serde_json::json!({"success": false, "error": e.to_string()}))),
    }
}

async fn delete_subject(
    req: HttpRequest,
    path: web::Path<u64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let Some(user) = user_id(&req) else {
        return Ok(unauthorized());
    };
    let deleted = lock(&state.subjects)?.delete(&user, SubjectId(path.into_inner()));
    match deleted {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(HttpResponse::NotFound().json(serde_json::json!({"success": false, "error": e.to_string()}))),
    }
}

// Timetable generation endpoint
async fn generate_timetable(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let Some(user) = user_id(&req) else {
        return Ok(unauthorized());
    };
    let options = match GenerateRequest::from_body(&body).and_then(|r| r.apply(state.config.generate.options())) {
        Ok(options) => options,
        Err(e) => return Ok(bad_request(e)),
    };

    // Copy the candidates out so the build runs without holding the lock.
    let candidates = lock(&state.subjects)?.list(&user);
    let outcome = build_schedule_with(&candidates, &options);
    let grid = TimetableGrid::from_schedule(&outcome.accepted, state.config.grid.hours());

    let generated = GeneratedTimetable {
        generated_at: Utc::now(),
        options,
        outcome,
        grid,
    };
    lock(&state.timetables)?.insert(user, generated.clone());

    Ok(HttpResponse::Ok().json(generated))
}

async fn get_timetable(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    let Some(user) = user_id(&req) else {
        return Ok(unauthorized());
    };
    let timetables = lock(&state.timetables)?;
    match timetables.get(&user) {
        Some(generated) => Ok(HttpResponse::Ok().json(generated)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "Timetable not available"}))),
    }
}

async fn time_options(state: web::Data<AppState>) -> Result<HttpResponse> {
    let options: Vec<String> = state.config.slots.options().map(|t| t.to_string()).collect();
    Ok(HttpResponse::Ok().json(options))
}

async fn validate_slot(body: web::Json<SlotCheckRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let max_end = state.config.slots.max_end().map(|t| t.to_string());
    match validate_slot_input(
        body.day.as_deref(),
        body.start.as_deref(),
        body.end.as_deref(),
        max_end.as_deref(),
    ) {
        Ok(slot) => Ok(HttpResponse::Ok().json(serde_json::json!({"valid": true, "slot": slot}))),
        Err(e) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "valid": false,
            "message": e.to_string(),
            "error": e,
        }))),
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

/// Registers every route; shared by the server and the API tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/api/subjects", web::get().to(list_subjects))
        .route("/api/subjects", web::post().to(create_subject))
        .route("/api/subjects/{id}", web::put().to(update_subject))
        .route("/api/subjects/{id}", web::delete().to(delete_subject))
        .route("/api/timetable", web::get().to(get_timetable))
        .route("/api/timetable/generate", web::post().to(generate_timetable))
        .route("/api/time-options", web::get().to(time_options))
        .route("/api/validate-slot", web::post().to(validate_slot));
}

pub async fn start_server(config: PlannerConfig) -> std::io::Result<()> {
    let bind = (config.server.host.clone(), config.server.port);
    let app_state = web::Data::new(AppState::new(config));

    info!(host = %bind.0, port = bind.1, "starting timetable server");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await
}
