use serde::{Deserialize, Serialize};
use std::fmt;

/// Value used by the clinic store when no clinic record exists.
pub const PLACEHOLDER: &str = "N/A";

/// Identifier of a service row. The backing table may use integer or text keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceId::Int(id) => write!(f, "{}", id),
            ServiceId::Text(id) => f.write_str(id),
        }
    }
}

/// A clinic service returned by the similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceMatch {
    pub id: ServiceId,
    pub content: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    /// Similarity to the query embedding, 0..1
    pub similarity: f64,
}

/// Clinic contact details, one record per deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicInfo {
    pub address: String,
    pub phone: String,
    #[serde(alias = "operatingHours")]
    pub operating_hours: String,
}

impl ClinicInfo {
    /// Record returned when the clinic table is empty.
    ///
    /// Every field holds [`PLACEHOLDER`]; consumers must read these as unknown.
    pub fn placeholder() -> Self {
        Self {
            address: PLACEHOLDER.to_string(),
            phone: PLACEHOLDER.to_string(),
            operating_hours: PLACEHOLDER.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        *self == Self::placeholder()
    }
}

/// Inbound question, one per request
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub message: String,
    /// Overrides the configured WhatsApp recipient when set
    pub recipient: Option<String>,
}

/// Answer produced by the composer. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedAnswer {
    pub text: String,
}

/// Outcome of an outbound message send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryResult {
    pub success: bool,
    /// HTTP status returned by the messaging provider
    pub status: u16,
}
