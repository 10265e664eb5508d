//! omni-brain library interface
//!
//! The Omni brain: a long-lived backend that lazily loads the heavy AI
//! resources and serves the launcher's deep-answer, intent-action,
//! semantic-search and install-planning requests over HTTP.
//!
//! Exposed as a library so integration tests can drive the router with
//! stubbed loader/classifier/embedder seams.

pub mod api;
pub mod calc;
pub mod config;
pub mod error;
pub mod inference;
pub mod installer;
pub mod intent;
pub mod lanes;
pub mod registry;
pub mod resolvers;
pub mod services;
pub mod store;

pub use crate::error::{ApiError, ApiResult};

use crate::config::BrainConfig;
use crate::inference::{CompletionClient, Embedder, EmbeddingClient, GenerationOptions};
use crate::installer::InstallPlanner;
use crate::intent::{Classifier, FastLaneClassifier, IntentPipeline};
use crate::lanes::{CancelFlag, LaneLocks};
use crate::registry::{ProductionLoader, ResourceLoader, ResourceRegistry};
use crate::resolvers::{NavigationResolver, PersonResolver, PlaceResolver};
use crate::services::{app_website, knowledge, AppWebsiteClient, KnowledgeClient, SearchClient};
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BrainConfig>,
    /// Resource lifecycle owner; process-wide singleton **[BRN-REG-010]**
    pub registry: Arc<ResourceRegistry>,
    /// Lane locks from the resource-binding table **[BRN-ARB-010]**
    pub lanes: LaneLocks,
    /// Cooperative deep-over-fast cancellation signal **[BRN-ARB-020]**
    pub cancel: CancelFlag,
    /// Deep-lane completion client
    pub completion: Arc<CompletionClient>,
    pub embedder: Arc<dyn Embedder>,
    pub web_search: Arc<SearchClient>,
    pub pipeline: Arc<IntentPipeline>,
    pub planner: Arc<InstallPlanner>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Production wiring: real clients, real loader, apt+flatpak planner.
    pub fn from_config(config: BrainConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let completion = Arc::new(CompletionClient::new(
            &config.runtime_url,
            &config.model,
            config.timeouts.generation(),
        )?);
        // Shared hardware config: the fast lane reuses the deep client
        let fast_completion = if config.deep_binding() == config.fast_binding() {
            completion.clone()
        } else {
            Arc::new(CompletionClient::new(
                &config.fast_runtime_url,
                &config.fast_model,
                config.timeouts.generation(),
            )?)
        };
        let embedding = Arc::new(EmbeddingClient::new(
            &config.embedding_url,
            &config.embedding_model,
            config.timeouts.lookup(),
        )?);

        let lanes = LaneLocks::from_bindings(config.deep_binding(), config.fast_binding());
        let loader = Arc::new(ProductionLoader {
            store_path: config.store_path.clone(),
            model_path: config.model_path.clone(),
            completion: completion.clone(),
            embedding: embedding.clone(),
        });
        let classifier = Arc::new(FastLaneClassifier::new(
            fast_completion,
            lanes.fast.clone(),
            GenerationOptions {
                max_tokens: config.generation.fast_max_tokens,
                temperature: config.generation.fast_temperature,
                stop: config.generation.stop.clone(),
            },
        ));

        Self::assemble(
            config,
            lanes,
            loader,
            completion,
            classifier,
            embedding,
            Arc::new(InstallPlanner::system_default()),
        )
    }

    /// Assembly with injectable seams (loader, classifier, embedder,
    /// planner); `from_config` and the integration tests both land here.
    pub fn assemble(
        config: Arc<BrainConfig>,
        lanes: LaneLocks,
        loader: Arc<dyn ResourceLoader>,
        completion: Arc<CompletionClient>,
        classifier: Arc<dyn Classifier>,
        embedder: Arc<dyn Embedder>,
        planner: Arc<InstallPlanner>,
    ) -> anyhow::Result<Self> {
        let cancel = CancelFlag::new();
        let registry = Arc::new(ResourceRegistry::new(loader, lanes.deep.clone()));

        let web_search = Arc::new(SearchClient::new(&config.searx_url)?);
        let knowledge_client = Arc::new(KnowledgeClient::new(
            knowledge::DEFAULT_BASE_URL,
            config.timeouts.lookup(),
        )?);
        let website_client = Arc::new(AppWebsiteClient::new(
            app_website::DEFAULT_BASE_URL,
            config.timeouts.scrape(),
        ));

        let pipeline = Arc::new(IntentPipeline::new(
            classifier,
            PersonResolver::new(
                web_search.clone(),
                knowledge_client,
                config.timeouts.lookup(),
            ),
            PlaceResolver::new(web_search.clone(), config.timeouts.lookup()),
            NavigationResolver::new(web_search.clone(), config.timeouts.navigation()),
            website_client,
            cancel.clone(),
        ));

        Ok(Self {
            config,
            registry,
            lanes,
            cancel,
            completion,
            embedder,
            web_search,
            pipeline,
            planner,
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ask_routes())
        .merge(api::search_routes())
        .merge(api::action_routes())
        .merge(api::install_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
