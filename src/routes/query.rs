use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::QueryPipeline;
use crate::models::{ErrorResponse, HealthResponse, QueryRequest, QueryResponse};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<QueryPipeline>,
}

/// Configure query and health routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/query", web::post().to(query_handler));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Answer a clinic question and forward the answer over WhatsApp
///
/// POST /query
///
/// Request body:
/// ```json
/// {
///   "message": "What are your operating hours?",
///   "recipient": "77001234567"
/// }
/// ```
///
/// Both fields are optional. Upstream failures answer 502 (504 on timeout) with a
/// distinct error code per failing collaborator.
async fn query_handler(state: web::Data<AppState>, req: web::Json<QueryRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for query request: {}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    match state.pipeline.handle(req.into_inner().into()).await {
        Ok(outcome) => HttpResponse::Ok().json(QueryResponse {
            response: outcome.answer.text,
            delivered: outcome.delivered,
        }),
        Err(e) => {
            let status_code = e.status_code();
            HttpResponse::build(StatusCode::from_u16(status_code).unwrap_or(StatusCode::BAD_GATEWAY)).json(
                ErrorResponse {
                    error: e.code().to_string(),
                    message: format!("Error processing query: {}", e),
                    status_code,
                },
            )
        }
    }
}
