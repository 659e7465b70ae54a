// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{ClinicInfo, ComposedAnswer, DeliveryResult, Query, ServiceId, ServiceMatch, PLACEHOLDER};
pub use requests::{QueryRequest, MAX_MESSAGE_CHARS};
pub use responses::{ErrorResponse, HealthResponse, QueryResponse};
