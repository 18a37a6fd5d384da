use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dataset::parse_timestamp;
use crate::engine::{build_graph, cumulative_series, revealed_graph, top_n, RankedPerson};
use crate::error::MingleError;
use crate::layout::Position;
use crate::server::{AppState, Snapshot};

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub snapshot_id: Uuid,
    pub people: Vec<String>,
    pub record_count: usize,
    pub photo_count: usize,
    pub timestamps: Vec<DateTime<Utc>>,
    pub time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub manito_count: usize,
}

#[derive(Debug, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub weight: u64,
}

#[derive(Debug, Serialize)]
pub struct GraphResponse {
    pub snapshot_id: Uuid,
    pub cutoff: DateTime<Utc>,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Set when the response degrades to empty instead of failing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PersonSeries {
    pub person: String,
    pub counts: Vec<u64>,
}

#[derive(Debug, Serialize)]
pub struct MeetingsResponse {
    pub snapshot_id: Uuid,
    pub focal: String,
    pub timestamps: Vec<DateTime<Utc>>,
    pub series: Vec<PersonSeries>,
    pub top: Vec<RankedPerson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ManitoNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ManitoResponse {
    pub snapshot_id: Uuid,
    pub upto: usize,
    pub total: usize,
    pub nodes: Vec<ManitoNode>,
    pub edges: Vec<crate::model::graph::DirectedEdge>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub snapshot_id: Uuid,
    pub record_count: usize,
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse { error: self.message });
        (self.status, body).into_response()
    }
}

impl From<MingleError> for ApiError {
    fn from(err: MingleError) -> Self {
        match err {
            MingleError::MissingInputFile(_) | MingleError::EmptyDataset(_) => {
                ApiError::not_found(err.to_string())
            }
            MingleError::InvalidCutoff(_)
            | MingleError::InvalidTimestamp { .. }
            | MingleError::PersonNotFound(_) => ApiError::bad_request(err.to_string()),
            other => ApiError::internal(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Embedded single-page dashboard: cutoff slider, focal-person dropdown,
/// manito reveal. All rendering happens client-side from the JSON API.
pub async fn dashboard() -> Html<&'static str> {
    Html(include_str!("dashboard.html"))
}

pub async fn summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    let snapshot = state.current().await;
    Json(summary_of(&snapshot))
}

fn summary_of(snapshot: &Snapshot) -> SummaryResponse {
    SummaryResponse {
        snapshot_id: snapshot.id,
        people: snapshot.dataset.people(),
        record_count: snapshot.dataset.len(),
        photo_count: snapshot.dataset.photo_count(),
        timestamps: snapshot.dataset.timestamps(),
        time_range: snapshot.dataset.time_range(),
        manito_count: snapshot.manito.as_ref().map(|m| m.len()).unwrap_or(0),
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphParams {
    /// RFC 3339 or `YYYY-MM-DD HH:MM:SS`; defaults to the latest timestamp.
    pub cutoff: Option<String>,
}

pub async fn graph(
    State(state): State<AppState>,
    Query(params): Query<GraphParams>,
) -> Result<Json<GraphResponse>, ApiError> {
    let snapshot = state.current().await;

    let cutoff = match params.cutoff {
        Some(raw) => parse_timestamp(&raw)
            .map_err(|_| ApiError::bad_request(format!("unparsable cutoff '{raw}'")))?,
        None => snapshot
            .dataset
            .time_range()
            .map(|(_, last)| last)
            .ok_or_else(|| ApiError::internal("snapshot has no records"))?,
    };

    let graph = build_graph(snapshot.dataset.records(), cutoff);

    let nodes = graph
        .nodes()
        .map(|person| {
            // Cached full-graph layout keeps positions stable across cutoffs.
            let position = snapshot
                .layout
                .position(person)
                .unwrap_or(Position { x: 0.0, y: 0.0 });
            GraphNode {
                id: person.to_string(),
                x: position.x,
                y: position.y,
            }
        })
        .collect();

    let edges = graph
        .edges()
        .map(|(pair, weight)| GraphEdge {
            source: pair.first().to_string(),
            target: pair.second().to_string(),
            weight,
        })
        .collect();

    let notice = if graph.is_empty() {
        Some("no records at or before this cutoff".to_string())
    } else {
        None
    };

    Ok(Json(GraphResponse {
        snapshot_id: snapshot.id,
        cutoff,
        nodes,
        edges,
        notice,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MeetingsParams {
    pub person: String,
    pub top: Option<usize>,
}

pub async fn meetings(
    State(state): State<AppState>,
    Query(params): Query<MeetingsParams>,
) -> Result<Json<MeetingsResponse>, ApiError> {
    let snapshot = state.current().await;
    let top = params.top.unwrap_or(state.config.data.top_n);

    let series = cumulative_series(snapshot.dataset.records(), &params.person);

    // Unknown focal person degrades to an empty chart with a message rather
    // than an error status.
    let notice = if series.is_empty() && !snapshot.dataset.knows_person(&params.person) {
        Some(format!("'{}' does not appear in the data", params.person))
    } else {
        None
    };

    let last_index = series.len().saturating_sub(1);
    let ranked = top_n(&series, last_index, top);

    let person_series = series
        .counts
        .iter()
        .map(|(person, counts)| PersonSeries {
            person: person.clone(),
            counts: counts.clone(),
        })
        .collect();

    Ok(Json(MeetingsResponse {
        snapshot_id: snapshot.id,
        focal: series.focal.clone(),
        timestamps: series.timestamps.clone(),
        series: person_series,
        top: ranked,
        notice,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ManitoParams {
    /// Number of revealed rows; 0 shows nothing.
    pub upto: Option<usize>,
}

pub async fn manito(
    State(state): State<AppState>,
    Query(params): Query<ManitoParams>,
) -> Result<Json<ManitoResponse>, ApiError> {
    let snapshot = state.current().await;
    let records = snapshot
        .manito
        .as_ref()
        .ok_or_else(|| ApiError::not_found("no manito dataset configured"))?;
    let layout = snapshot
        .manito_layout
        .as_ref()
        .ok_or_else(|| ApiError::internal("manito layout missing"))?;

    let total = records.len();
    let upto = params.upto.unwrap_or(total);
    let graph = revealed_graph(records, upto);

    let nodes = graph
        .nodes()
        .map(|person| {
            let position = layout
                .position(person)
                .unwrap_or(Position { x: 0.0, y: 0.0 });
            ManitoNode {
                id: person.to_string(),
                x: position.x,
                y: position.y,
                description: graph.node_description(person).map(String::from),
            }
        })
        .collect();

    Ok(Json(ManitoResponse {
        snapshot_id: snapshot.id,
        upto: upto.min(total),
        total,
        nodes,
        edges: graph.edges().to_vec(),
    }))
}

pub async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, ApiError> {
    let snapshot = Snapshot::build(&state.config).map_err(ApiError::from)?;
    let response = ReloadResponse {
        snapshot_id: snapshot.id,
        record_count: snapshot.dataset.len(),
    };

    let mut slot = state.snapshot.write().await;
    *slot = std::sync::Arc::new(snapshot);
    tracing::info!(snapshot_id = %response.snapshot_id, "dataset reloaded");

    Ok(Json(response))
}
