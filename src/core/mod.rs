// Core pipeline exports
pub mod collaborators;
pub mod composer;
pub mod errors;
pub mod pipeline;
pub mod prompt;
pub mod ranking;

pub use collaborators::{ChatModel, ChatRequest, ClinicInfoStore, MessageDispatcher, SemanticMatcher};
pub use composer::{CompletionOptions, ResponseComposer};
pub use errors::{CompletionError, DeliveryError, MatchError, PipelineError, StoreError};
pub use pipeline::{DeliveryPolicy, PipelineOptions, PipelineOutcome, PipelineStage, QueryPipeline};
pub use prompt::{build_user_message, format_context, NOT_FOUND_REPLY, SYSTEM_PROMPT};
pub use ranking::rank_by_similarity;
