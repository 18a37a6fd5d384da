use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::dataset::Dataset;
use crate::engine::build_full_graph;
use crate::error::{MingleError, MingleResult};
use crate::layout::{spring_layout, GraphLayout};
use crate::model::graph::RelationGraph;
use crate::model::record::ManitoRecord;

pub mod api;

// ---------------------------------------------------------------------------
// Snapshot: one immutable view of the loaded data and its cached layout
// ---------------------------------------------------------------------------

/// Everything a request needs, computed once per dataset load.
///
/// The full graph and its layout are the slider-stability cache: cutoff
/// queries carve sub-graphs out of the data but always reuse these node
/// positions. A snapshot is never mutated; reload builds a new one and swaps
/// the pointer.
#[derive(Debug)]
pub struct Snapshot {
    /// Changes on every (re)load; lets clients notice a reload.
    pub id: Uuid,
    pub dataset: Dataset,
    pub full_graph: RelationGraph,
    pub layout: GraphLayout,
    pub manito: Option<Vec<ManitoRecord>>,
    pub manito_layout: Option<GraphLayout>,
}

impl Snapshot {
    /// Load the configured datasets and compute the layout cache.
    pub fn build(config: &AppConfig) -> MingleResult<Self> {
        let records_path = config.data.records_path.as_ref().ok_or_else(|| {
            MingleError::ConfigError("data.records_path is not configured".to_string())
        })?;

        let dataset = Dataset::load(records_path)?;
        let full_graph = build_full_graph(dataset.records());
        let layout = spring_layout(&full_graph, config.layout.seed, config.layout.iterations);

        let manito = match &config.data.manito_path {
            Some(path) => Some(Dataset::load_manito(path)?),
            None => None,
        };
        let manito_layout = manito.as_ref().map(|records| {
            // Positions come from the fully revealed graph so nodes hold
            // still while the reveal slider moves.
            let mut undirected = RelationGraph::new();
            for record in records {
                undirected.add_cooccurrence(&record.from, &record.to, 1);
            }
            spring_layout(&undirected, config.layout.seed, config.layout.iterations)
        });

        tracing::info!(
            people = full_graph.node_count(),
            edges = full_graph.edge_count(),
            manito = manito.as_ref().map(|m| m.len()).unwrap_or(0),
            "snapshot built"
        );

        Ok(Self {
            id: Uuid::new_v4(),
            dataset,
            full_graph,
            layout,
            manito,
            manito_layout,
        })
    }
}

// ---------------------------------------------------------------------------
// HTTP server
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub snapshot: Arc<RwLock<Arc<Snapshot>>>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(snapshot: Snapshot, config: AppConfig) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Arc::new(snapshot))),
            config,
        }
    }

    /// The current snapshot. Requests hold this `Arc` for their whole render
    /// pass, so a concurrent reload never changes data mid-request.
    pub async fn current(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::dashboard))
        .route("/health", get(health))
        .route("/api/summary", get(api::summary))
        .route("/api/graph", get(api::graph))
        .route("/api/meetings", get(api::meetings))
        .route("/api/manito", get(api::manito))
        .route("/api/reload", post(api::reload))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn run_http_server(config: AppConfig) -> MingleResult<()> {
    let snapshot = Snapshot::build(&config)?;
    let state = AppState::new(snapshot, config.clone());
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|err| MingleError::Internal(format!("invalid server address: {err}")))?;

    tracing::info!(%addr, "mingle dashboard listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| MingleError::Internal(format!("failed to bind server: {err}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|err| MingleError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn config_for(records: &tempfile::NamedTempFile) -> AppConfig {
        let mut config = AppConfig::default();
        config.data.records_path = Some(records.path().to_path_buf());
        config
    }

    const SMALL: &str = "class,filename,timestamp,xmin,ymin,xmax,ymax\n\
                         alice,p1.jpg,2024-08-14 10:00:00,0,0,1,1\n\
                         bob,p1.jpg,2024-08-14 10:00:00,0,0,1,1\n";

    #[test]
    fn snapshot_covers_every_node_with_a_position() {
        let file = write_csv(SMALL);
        let snapshot = Snapshot::build(&config_for(&file)).unwrap();

        assert_eq!(snapshot.dataset.len(), 2);
        assert_eq!(snapshot.full_graph.weight("alice", "bob"), 1);
        for node in snapshot.full_graph.nodes() {
            assert!(snapshot.layout.position(node).is_some());
        }
        assert!(snapshot.manito.is_none());
    }

    #[test]
    fn snapshot_requires_a_records_path() {
        let err = Snapshot::build(&AppConfig::default()).unwrap_err();
        assert!(matches!(err, MingleError::ConfigError(_)));
    }

    #[tokio::test]
    async fn reload_swaps_the_snapshot_id() {
        let file = write_csv(SMALL);
        let config = config_for(&file);
        let first = Snapshot::build(&config).unwrap();
        let first_id = first.id;

        let state = AppState::new(first, config.clone());
        let second = Snapshot::build(&config).unwrap();
        {
            let mut slot = state.snapshot.write().await;
            *slot = Arc::new(second);
        }

        assert_ne!(state.current().await.id, first_id);
    }
}
