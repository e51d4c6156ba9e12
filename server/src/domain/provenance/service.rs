use std::sync::Arc;

use super::builder::RecordSetBuilder;
use super::error::ProvenanceError;
use super::narrative::{DataModelUi, NarrativeDetail, assemble};
use super::nested::{NestedEvent, project};
use super::record_set::RecordSet;
use super::source::{Credential, TraceSource};
use crate::core::config::BuildStrategy;

/// Query entry point shared by the HTTP routes and the CLI
pub struct ProvenanceService {
    source: Arc<dyn TraceSource>,
    strategy: BuildStrategy,
    detail: NarrativeDetail,
}

impl ProvenanceService {
    pub fn new(source: Arc<dyn TraceSource>, strategy: BuildStrategy, detail: NarrativeDetail) -> Self {
        tracing::debug!(source = source.name(), strategy = %strategy, "Provenance service ready");
        Self {
            source,
            strategy,
            detail,
        }
    }

    pub async fn record_set_for_item(
        &self,
        credential: &Credential,
        epc: &str,
    ) -> Result<RecordSet, ProvenanceError> {
        let builder = RecordSetBuilder::new(self.source.as_ref(), credential);
        match self.strategy {
            BuildStrategy::Batched => builder.build_from_item(epc).await,
            BuildStrategy::PerEvent => builder.build_from_item_per_event(epc).await,
        }
    }

    pub async fn narrative_for_item(
        &self,
        credential: &Credential,
        epc: &str,
    ) -> Result<DataModelUi, ProvenanceError> {
        let record_set = self.record_set_for_item(credential, epc).await?;
        assemble(&record_set, self.detail.clone())
    }

    pub async fn graph_for_item(
        &self,
        credential: &Credential,
        epc: &str,
    ) -> Result<Vec<NestedEvent>, ProvenanceError> {
        let record_set = self.record_set_for_item(credential, epc).await?;
        Ok(project(&record_set))
    }

    /// Nested graph around one event; empty when the event is unknown
    pub async fn graph_for_event(
        &self,
        credential: &Credential,
        event_id: &str,
    ) -> Result<Vec<NestedEvent>, ProvenanceError> {
        let Some(event) = self.source.fetch_event(credential, event_id).await? else {
            tracing::debug!(event_id = %event_id, "Event unknown upstream");
            return Ok(Vec::new());
        };
        let record_set = RecordSetBuilder::new(self.source.as_ref(), credential)
            .build_from_event(event)
            .await?;
        Ok(project(&record_set))
    }
}
