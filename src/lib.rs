//! Clinic Assistant - answers clinic questions and forwards the answers over WhatsApp
//!
//! Each request gathers the clinic record and the closest matching services,
//! asks a hosted chat model for an answer grounded in that context, and sends
//! the answer through the WhatsApp Cloud API.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{DeliveryPolicy, PipelineError, PipelineOptions, QueryPipeline, ResponseComposer};
pub use models::{ClinicInfo, ComposedAnswer, Query, QueryRequest, QueryResponse, ServiceMatch};
