//! Widget snapshot server.
//!
//! Serves progress snapshots of the checklist store over HTTP, standing in
//! for the home-screen widget: a separate display surface that reads the
//! persisted store and refreshes on a timer. Reads are eventually
//! consistent; the snapshot may trail the CLI's latest write until the next
//! refresh. A change bus subscription shortens that window for mutations
//! made through this server's own toggle endpoint.

use arc_swap::ArcSwap;
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::checklist::Checklist;
use crate::db::{Database, now_ms};
use crate::events::{ChangeBus, ChangeKind};
use crate::types::ChecklistSummary;

/// Point-in-time view of all checklist summaries.
pub struct Snapshot {
    pub summaries: Vec<ChecklistSummary>,
    pub refreshed_at: i64,
}

/// The widget entry: the most recently updated checklist plus the snapshot
/// timestamp it was computed at.
#[derive(Serialize)]
struct WidgetEntry {
    checklist: Option<ChecklistSummary>,
    progress: f64,
    is_completed: bool,
    refreshed_at: i64,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Shared state for the snapshot server.
#[derive(Clone)]
struct WidgetServer {
    db: Arc<Database>,
    bus: ChangeBus,
    snapshot: Arc<ArcSwap<Snapshot>>,
}

fn build_snapshot(db: &Database) -> Snapshot {
    let summaries = match db.checklist_summaries() {
        Ok(summaries) => summaries,
        Err(e) => {
            warn!(error = %e, "snapshot refresh failed, keeping empty view");
            Vec::new()
        }
    };
    Snapshot {
        summaries,
        refreshed_at: now_ms(),
    }
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Root page: a server-rendered rendition of the small widget face.
async fn root(State(state): State<WidgetServer>) -> Html<String> {
    let snapshot = state.snapshot.load();
    let body = match snapshot.summaries.first() {
        Some(summary) => {
            let percent = (summary.progress() * 100.0).round() as i64;
            let done = if summary.is_completed() { " ✓" } else { "" };
            format!(
                r#"<div class="widget">
                    <h1>{}{}</h1>
                    <progress max="100" value="{}"></progress>
                    <p>{}/{} done</p>
                </div>"#,
                html_escape(&summary.title),
                done,
                percent,
                summary.completed_count,
                summary.total_count,
            )
        }
        None => r#"<div class="widget"><p>No checklists yet</p></div>"#.to_string(),
    };

    Html(format!(
        "<!DOCTYPE html><html><head><title>ticklist</title></head><body>{body}</body></html>"
    ))
}

/// Latest checklist summary, as the widget consumes it.
async fn api_widget(State(state): State<WidgetServer>) -> Json<WidgetEntry> {
    let snapshot = state.snapshot.load();
    let checklist = snapshot.summaries.first().cloned();
    let (progress, is_completed) = checklist
        .as_ref()
        .map(|s| (s.progress(), s.is_completed()))
        .unwrap_or((0.0, false));

    Json(WidgetEntry {
        checklist,
        progress,
        is_completed,
        refreshed_at: snapshot.refreshed_at,
    })
}

/// All checklist summaries from the current snapshot.
async fn api_checklists(State(state): State<WidgetServer>) -> Json<Vec<ChecklistSummary>> {
    Json(state.snapshot.load().summaries.clone())
}

/// One full checklist, read live from the store.
async fn api_checklist(
    State(state): State<WidgetServer>,
    Path(id): Path<String>,
) -> Result<Json<Checklist>, StatusCode> {
    match state.db.get_checklist(&id) {
        Ok(Some(checklist)) => Ok(Json(checklist)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            warn!(error = %e, "checklist read failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Serialize)]
struct ToggleResponse {
    item_id: String,
    completed: bool,
}

/// Toggle one item's completion through the store, then notify.
async fn api_toggle_item(
    State(state): State<WidgetServer>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<ToggleResponse>, StatusCode> {
    let mut checklist = match state.db.get_checklist(&id) {
        Ok(Some(checklist)) => checklist,
        Ok(None) => return Err(StatusCode::NOT_FOUND),
        Err(e) => {
            warn!(error = %e, "checklist read failed");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let Some(completed) = checklist.toggle_item(&item_id) else {
        return Err(StatusCode::NOT_FOUND);
    };

    if let Err(e) = state.db.save_checklist(&checklist) {
        warn!(error = %e, "checklist write failed");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    state.bus.emit(ChangeKind::ItemChanged);

    Ok(Json(ToggleResponse { item_id, completed }))
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Run the snapshot server until the process is stopped.
pub async fn serve(
    db: Arc<Database>,
    bus: ChangeBus,
    port: u16,
    refresh: Duration,
) -> anyhow::Result<()> {
    let snapshot = Arc::new(ArcSwap::from_pointee(build_snapshot(&db)));

    // Refresh on the widget timeline or as soon as a mutation lands.
    {
        let db = Arc::clone(&db);
        let snapshot = Arc::clone(&snapshot);
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(refresh);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            interval.tick().await; // the immediate first tick
            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    event = rx.recv() => {
                        if matches!(event, Err(RecvError::Closed)) {
                            break;
                        }
                    }
                }
                snapshot.store(Arc::new(build_snapshot(&db)));
            }
        });
    }

    let state = WidgetServer { db, bus, snapshot };

    let app = Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/api/widget", get(api_widget))
        .route("/api/checklists", get(api_checklists))
        .route("/api/checklists/{id}", get(api_checklist))
        .route(
            "/api/checklists/{id}/items/{item_id}/toggle",
            post(api_toggle_item),
        )
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "widget snapshot server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
