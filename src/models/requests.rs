use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::Query;

/// Longest text body the messaging provider accepts
pub const MAX_MESSAGE_CHARS: u64 = 4096;

/// Request body for `POST /query`
///
/// A missing `message` is read as an empty question rather than rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct QueryRequest {
    #[serde(default)]
    #[validate(length(max = 4096))]
    pub message: String,
    #[serde(default, alias = "to", alias = "from")]
    #[validate(length(min = 1))]
    pub recipient: Option<String>,
}

impl From<QueryRequest> for Query {
    fn from(req: QueryRequest) -> Self {
        Query {
            message: req.message,
            recipient: req.recipient,
        }
    }
}
