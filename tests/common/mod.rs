// Shared test doubles for the pipeline collaborators
#![allow(dead_code)]

use async_trait::async_trait;
use clinic_assistant::core::{
    ChatModel, ChatRequest, ClinicInfoStore, CompletionError, CompletionOptions, DeliveryError, DeliveryPolicy,
    MatchError, MessageDispatcher, PipelineOptions, QueryPipeline, ResponseComposer, SemanticMatcher, StoreError,
};
use clinic_assistant::models::{ClinicInfo, DeliveryResult, ServiceId, ServiceMatch};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;

pub const DEFAULT_RECIPIENT: &str = "77001234567";

pub fn clinic(hours: &str) -> ClinicInfo {
    ClinicInfo {
        address: "123 Medical Center Drive, Healthcare City".to_string(),
        phone: "+1 (555) 123-4567".to_string(),
        operating_hours: hours.to_string(),
    }
}

pub fn service(id: i64, content: &str, similarity: f64) -> ServiceMatch {
    ServiceMatch {
        id: ServiceId::Int(id),
        content: content.to_string(),
        specialty: Some("General Medicine".to_string()),
        price: Some(8000.0),
        category: Some("Consultation".to_string()),
        similarity,
    }
}

pub struct FakeClinicStore {
    pub info: ClinicInfo,
    pub fail: bool,
    pub barrier: Option<Arc<Barrier>>,
    pub calls: AtomicUsize,
}

impl FakeClinicStore {
    pub fn with(info: ClinicInfo) -> Self {
        Self {
            info,
            fail: false,
            barrier: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with(ClinicInfo::placeholder())
        }
    }
}

#[async_trait]
impl ClinicInfoStore for FakeClinicStore {
    async fn fetch_clinic_info(&self) -> Result<ClinicInfo, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if self.fail {
            return Err(StoreError::ApiError {
                status: 503,
                body: "store unavailable".to_string(),
            });
        }
        Ok(self.info.clone())
    }
}

pub struct FakeMatcher {
    pub matches: Vec<ServiceMatch>,
    pub fail_embed: bool,
    pub embed_delay: Option<Duration>,
    pub barrier: Option<Arc<Barrier>>,
    pub embedded: Mutex<Vec<String>>,
    pub requested_k: Mutex<Option<usize>>,
}

impl FakeMatcher {
    pub fn with(matches: Vec<ServiceMatch>) -> Self {
        Self {
            matches,
            fail_embed: false,
            embed_delay: None,
            barrier: None,
            embedded: Mutex::new(Vec::new()),
            requested_k: Mutex::new(None),
        }
    }

    pub fn empty() -> Self {
        Self::with(Vec::new())
    }
}

#[async_trait]
impl SemanticMatcher for FakeMatcher {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MatchError> {
        self.embedded.lock().unwrap().push(text.to_string());
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if let Some(delay) = self.embed_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_embed {
            return Err(MatchError::EmbeddingApi {
                status: 401,
                body: "invalid api key".to_string(),
            });
        }
        Ok(vec![0.1, 0.2, 0.3])
    }

    async fn match_services(&self, _embedding: &[f32], k: usize) -> Result<Vec<ServiceMatch>, MatchError> {
        *self.requested_k.lock().unwrap() = Some(k);
        Ok(self.matches.iter().take(k).cloned().collect())
    }
}

type Responder = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Chat model that builds its reply from the user message
pub struct FakeModel {
    responder: Responder,
    pub last_user: Mutex<Option<String>>,
}

impl FakeModel {
    pub fn replying(reply: &str) -> Self {
        let reply = reply.to_string();
        Self::with(move |_| reply.clone())
    }

    pub fn with(responder: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            last_user: Mutex::new(None),
        }
    }

    /// Answers from the "Operating Hours:" line of the context only
    pub fn hours_reader() -> Self {
        Self::with(|user| {
            user.lines()
                .find_map(|line| line.strip_prefix("Operating Hours: "))
                .map(|hours| format!("Our operating hours are {}.", hours))
                .unwrap_or_default()
        })
    }
}

#[async_trait]
impl ChatModel for FakeModel {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<String, CompletionError> {
        *self.last_user.lock().unwrap() = Some(request.user.to_string());
        Ok((self.responder)(request.user))
    }
}

pub struct FakeDispatcher {
    pub status: u16,
    pub delay: Option<Duration>,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl FakeDispatcher {
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            delay: None,
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MessageDispatcher for FakeDispatcher {
    async fn send(&self, recipient: &str, text: &str) -> Result<DeliveryResult, DeliveryError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.sent.lock().unwrap().push((recipient.to_string(), text.to_string()));
        Ok(DeliveryResult {
            success: self.status == 200,
            status: self.status,
        })
    }
}

pub fn options(policy: DeliveryPolicy) -> PipelineOptions {
    PipelineOptions {
        match_count: 5,
        recipient: DEFAULT_RECIPIENT.to_string(),
        delivery_policy: policy,
        call_timeout: Duration::from_secs(2),
    }
}

pub fn pipeline(
    store: Arc<FakeClinicStore>,
    matcher: Arc<FakeMatcher>,
    model: Arc<FakeModel>,
    dispatcher: Arc<FakeDispatcher>,
    options: PipelineOptions,
) -> QueryPipeline {
    QueryPipeline::new(
        store,
        matcher,
        ResponseComposer::new(model, CompletionOptions::default()),
        dispatcher,
        options,
    )
}
