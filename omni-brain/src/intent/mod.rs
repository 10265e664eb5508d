//! Intent Pipeline
//!
//! **[BRN-INT-020]** Stages, short-circuiting on first match:
//! shortcut table -> fast-lane classification -> tag parsing -> per-line
//! resolution -> ordered action list. A resolver finding nothing drops its
//! line only; total classification failure yields an empty list plus an
//! error string, never a transport error.

pub mod grammar;
pub mod shortcuts;

use crate::calc;
use crate::inference::{CompletionClient, GenerationOptions, InferenceError};
use crate::lanes::CancelFlag;
use crate::resolvers::{Enrichment, NavigationResolver, PersonResolver, PlaceResolver};
use crate::services::AppWebsiteClient;
use async_trait::async_trait;
use grammar::Directive;
use omni_common::api::ActionResult;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Fixed instruction for the fast model. The grammar module owns the
/// matching side of this contract.
pub const CLASSIFIER_SYSTEM_PROMPT: &str = "Output ONLY the matching action(s).\n\
Format:\n\
PERSON:[Name]\n\
PLACE:[Name]\n\
OPEN:https://[URL]\n\
INSTALL:[App Name]\n\
CALC:[Expression]\n\
SEARCH:[Query]\n";

/// Classification seam; the production impl runs the fast lane under its
/// lock.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, query: &str) -> Result<String, InferenceError>;
}

/// Fast-lane classifier: low randomness, tight token budget, exclusive
/// access to the fast model.
pub struct FastLaneClassifier {
    client: Arc<CompletionClient>,
    lane: Arc<Mutex<()>>,
    options: GenerationOptions,
}

impl FastLaneClassifier {
    pub fn new(client: Arc<CompletionClient>, lane: Arc<Mutex<()>>, options: GenerationOptions) -> Self {
        Self {
            client,
            lane,
            options,
        }
    }
}

#[async_trait]
impl Classifier for FastLaneClassifier {
    async fn classify(&self, query: &str) -> Result<String, InferenceError> {
        let user_prompt = format!("Query: {}", query);
        // One inference per physical resource; the guard spans the call
        let _guard = self.lane.lock().await;
        self.client
            .chat(CLASSIFIER_SYSTEM_PROMPT, &user_prompt, &self.options)
            .await
    }
}

/// Pipeline result handed to the boundary. `error` carries the explicit
/// indicator for total failure.
#[derive(Debug, Default)]
pub struct PipelineOutcome {
    pub actions: Vec<ActionResult>,
    pub error: Option<String>,
}

impl PipelineOutcome {
    fn single(action: ActionResult) -> Self {
        Self {
            actions: vec![action],
            error: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            actions: Vec::new(),
            error: Some(message),
        }
    }

    /// Discarded quietly: a deep request superseded this work.
    fn discarded() -> Self {
        Self::default()
    }
}

pub struct IntentPipeline {
    classifier: Arc<dyn Classifier>,
    person: PersonResolver,
    place: PlaceResolver,
    navigation: NavigationResolver,
    app_website: Arc<AppWebsiteClient>,
    cancel: CancelFlag,
}

impl IntentPipeline {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        person: PersonResolver,
        place: PlaceResolver,
        navigation: NavigationResolver,
        app_website: Arc<AppWebsiteClient>,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            classifier,
            person,
            place,
            navigation,
            app_website,
            cancel,
        }
    }

    pub async fn run(&self, query: &str) -> PipelineOutcome {
        // Stage 1: shortcut table, no inference at all
        if let Some(action) = shortcuts::shortcut_action(query) {
            info!(query = %query, "Shortcut hit");
            return PipelineOutcome::single(action);
        }

        // Stage 2: classification on the fast lane
        let epoch = self.cancel.observe();
        let raw = match self.classifier.classify(query).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Classification failed");
                return PipelineOutcome::failed(e.to_string());
            }
        };
        if self.cancel.superseded(epoch) {
            debug!("Discarding classification superseded by a deep request");
            return PipelineOutcome::discarded();
        }

        // Stage 3: tag grammar
        let directives = grammar::parse_output(&raw);
        debug!(lines = directives.len(), "Classifier output parsed");

        // Stage 4: sequential resolution, line order preserved
        let mut actions = Vec::new();
        for directive in directives {
            if self.cancel.superseded(epoch) {
                debug!("Discarding resolution superseded by a deep request");
                return PipelineOutcome::discarded();
            }
            if let Some(action) = self.dispatch(directive).await {
                actions.push(action);
            }
        }

        PipelineOutcome {
            actions,
            error: None,
        }
    }

    async fn dispatch(&self, directive: Directive) -> Option<ActionResult> {
        match directive {
            Directive::Calc(expr) => Some(calc_action(&expr)),
            Directive::Search(query) => self.navigation.resolve(&query).await,
            Directive::Person(name) => self.person.resolve(&name).await,
            Directive::Place(name) => self.place.resolve(&name).await,
            Directive::Install(app) => {
                let website = self.app_website.official_website(&app).await;
                Some(ActionResult::Install {
                    content: format!("Install {}", app),
                    name: app,
                    website,
                })
            }
            Directive::Open(url) => Some(ActionResult::Link {
                url,
                title: "Link".to_string(),
                description: "Open Link".to_string(),
            }),
        }
    }
}

/// Evaluate a CALC payload into its card; evaluation errors become the
/// card content rather than dropping the line.
fn calc_action(expr: &str) -> ActionResult {
    let content = match calc::evaluate_query(expr) {
        Ok(ev) => ev.result.to_string(),
        Err(e) => format!("Error calculating '{}': {}", calc::strip_prefixes(expr), e),
    };
    ActionResult::Calc { content }
}
