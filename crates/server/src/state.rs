//! Application State
//!
//! Shared state across all handlers.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use sales_agent_agent::{
    BantQualifier, InteractionLog, KeywordSignalExtractor, LeadScoringEngine, PipelineManager,
    QualificationConversation, RoiCalculator,
};
use sales_agent_config::Settings;
use sales_agent_core::DealStore;
use sales_agent_persistence::IcpFileStore;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub manager: Arc<PipelineManager>,
    pub engine: Arc<LeadScoringEngine>,
    pub conversation: Arc<QualificationConversation>,
    pub interactions: Arc<InteractionLog>,
    pub roi: RoiCalculator,
    /// Saved ICPs, only with the json persistence backend
    pub icps: Option<IcpFileStore>,
    /// Prometheus handle, absent when the recorder could not be installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Wire the engine, qualifier and manager from settings over `store`
    pub fn new(settings: Settings, store: Arc<dyn DealStore>) -> Self {
        Self::with_interaction_log(settings, store, InteractionLog::new())
    }

    /// Same as [`AppState::new`], recording into an existing log
    pub fn with_interaction_log(
        settings: Settings,
        store: Arc<dyn DealStore>,
        log: InteractionLog,
    ) -> Self {
        let interactions = Arc::new(log);
        let manager = Arc::new(
            PipelineManager::new(store, settings.pipeline.clone())
                .with_interaction_log(interactions.clone()),
        );
        let conversation = Arc::new(QualificationConversation::new(
            manager.clone(),
            Arc::new(KeywordSignalExtractor::new(settings.qualification.clone())),
            BantQualifier::new(settings.qualification.clone()),
        ));

        Self {
            engine: Arc::new(LeadScoringEngine::with_config(settings.scoring.clone())),
            settings: Arc::new(settings),
            manager,
            conversation,
            interactions,
            roi: RoiCalculator::new(),
            icps: None,
            metrics: None,
        }
    }

    pub fn with_icp_store(mut self, icps: IcpFileStore) -> Self {
        self.icps = Some(icps);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
