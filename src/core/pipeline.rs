use serde::Deserialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

use crate::core::collaborators::{ClinicInfoStore, MessageDispatcher, SemanticMatcher};
use crate::core::composer::ResponseComposer;
use crate::core::errors::{DeliveryError, PipelineError};
use crate::models::{ComposedAnswer, Query};

/// What to do with the request when the answer could not be delivered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Return the answer anyway with `delivered = false`
    #[default]
    ReportOnly,
    /// Fail the whole request
    FailRequest,
}

/// Stages of a single request, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    ContextGathered,
    Composed,
    Dispatched,
    Completed,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::ContextGathered => "context_gathered",
            PipelineStage::Composed => "composed",
            PipelineStage::Dispatched => "dispatched",
            PipelineStage::Completed => "completed",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Number of services requested from the similarity search
    pub match_count: usize,
    /// Default WhatsApp recipient
    pub recipient: String,
    pub delivery_policy: DeliveryPolicy,
    /// Upper bound for each external call
    pub call_timeout: Duration,
}

/// Result of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub answer: ComposedAnswer,
    pub delivered: bool,
    pub matches_used: usize,
}

/// Request orchestrator
///
/// # Pipeline Stages
/// 1. Received: the query is taken as is, an empty message included
/// 2. ContextGathered: clinic info and service matches, fetched concurrently
/// 3. Composed: prompt formatting and chat completion
/// 4. Dispatched: outbound message, handled per [`DeliveryPolicy`]
/// 5. Completed
///
/// Any error moves the request to `Failed`.
#[derive(Clone)]
pub struct QueryPipeline {
    clinic_store: Arc<dyn ClinicInfoStore>,
    matcher: Arc<dyn SemanticMatcher>,
    composer: ResponseComposer,
    dispatcher: Arc<dyn MessageDispatcher>,
    options: PipelineOptions,
}

impl QueryPipeline {
    pub fn new(
        clinic_store: Arc<dyn ClinicInfoStore>,
        matcher: Arc<dyn SemanticMatcher>,
        composer: ResponseComposer,
        dispatcher: Arc<dyn MessageDispatcher>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            clinic_store,
            matcher,
            composer,
            dispatcher,
            options,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run one query through every stage
    pub async fn handle(&self, query: Query) -> Result<PipelineOutcome, PipelineError> {
        let span = tracing::info_span!("query", request_id = %uuid::Uuid::new_v4());

        async move {
            let result = self.run(query).await;
            match &result {
                Ok(outcome) => tracing::info!(
                    stage = %PipelineStage::Completed,
                    delivered = outcome.delivered,
                    matches = outcome.matches_used,
                    "Query completed"
                ),
                Err(e) => tracing::error!(stage = %PipelineStage::Failed, code = e.code(), "Query failed: {}", e),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, query: Query) -> Result<PipelineOutcome, PipelineError> {
        tracing::debug!(stage = %PipelineStage::Received, chars = query.message.chars().count());

        let timeout = self.options.call_timeout;

        let (clinic_info, matches) = tokio::try_join!(
            bounded("clinic info lookup", timeout, self.clinic_store.fetch_clinic_info()),
            async {
                let embedding = bounded("embedding", timeout, self.matcher.embed(&query.message)).await?;
                bounded(
                    "similarity search",
                    timeout,
                    self.matcher.match_services(&embedding, self.options.match_count),
                )
                .await
            },
        )?;

        tracing::debug!(
            stage = %PipelineStage::ContextGathered,
            matches = matches.len(),
            clinic_known = !clinic_info.is_placeholder()
        );

        let answer = bounded(
            "chat completion",
            timeout,
            self.composer.compose(&query.message, &matches, &clinic_info),
        )
        .await?;

        tracing::debug!(stage = %PipelineStage::Composed, chars = answer.text.len());

        let recipient = query.recipient.as_deref().unwrap_or(&self.options.recipient);
        let delivered = self.dispatch(recipient, &answer.text).await?;

        Ok(PipelineOutcome {
            answer,
            delivered,
            matches_used: matches.len(),
        })
    }

    /// Send the answer and apply the delivery policy. Returns whether it was delivered.
    async fn dispatch(&self, recipient: &str, text: &str) -> Result<bool, PipelineError> {
        let sent = bounded(
            "message delivery",
            self.options.call_timeout,
            self.dispatcher.send(recipient, text),
        )
        .await
        .and_then(|result| {
            if result.success {
                Ok(())
            } else {
                Err(DeliveryError::Rejected(result.status).into())
            }
        });

        match sent {
            Ok(()) => {
                tracing::debug!(stage = %PipelineStage::Dispatched, delivered = true);
                Ok(true)
            }
            Err(e) => match self.options.delivery_policy {
                DeliveryPolicy::FailRequest => Err(e),
                DeliveryPolicy::ReportOnly => {
                    tracing::warn!(stage = %PipelineStage::Dispatched, delivered = false, "Answer not delivered: {}", e);
                    Ok(false)
                }
            },
        }
    }
}

/// Run `fut` with a timeout, mapping its error into [`PipelineError`]
async fn bounded<T, E, F>(stage: &'static str, timeout: Duration, fut: F) -> Result<T, PipelineError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<PipelineError>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(PipelineError::Timeout { stage, timeout }),
    }
}
