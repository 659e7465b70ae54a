// Populate the services table with embedded clinic documents.
//
// Usage: seed-services [FILE]
// FILE holds one document per line. Without it the built-in clinic documents are loaded.

use clinic_assistant::config::Settings;
use clinic_assistant::services::{
    parse_seed_documents, seed_services, AzureDeployment, AzureOpenAIClient, SupabaseClient, SupabaseTables,
    DEFAULT_SEED_DOCUMENTS,
};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        e
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.logging.level)),
        )
        .with_target(false)
        .compact()
        .init();

    let documents = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path).map_err(|e| {
                error!("Failed to read seed file {}: {}", path, e);
                e
            })?;
            parse_seed_documents(&text)
        }
        None => DEFAULT_SEED_DOCUMENTS.iter().map(|d| d.to_string()).collect(),
    };

    if documents.is_empty() {
        info!("No documents to seed");
        return Ok(());
    }

    let embeddings = AzureOpenAIClient::new(AzureDeployment {
        endpoint: settings.embedding.endpoint.clone(),
        api_key: settings.embedding.api_key.clone(),
        api_version: settings.embedding.api_version.clone(),
        deployment: settings.embedding.deployment.clone(),
    })?;

    let store = SupabaseClient::new(
        settings.supabase.url.clone(),
        settings.supabase.key.clone(),
        SupabaseTables {
            clinic_info: settings.supabase.clinic_table.clone(),
            match_function: settings.supabase.match_function.clone(),
            services: settings.supabase.services_table.clone(),
        },
    )?;

    info!(
        "Seeding {} documents into {}",
        documents.len(),
        settings.supabase.services_table
    );

    // Small delay between documents to stay under provider rate limits
    let report = seed_services(&embeddings, &store, &documents, Duration::from_millis(200)).await;

    if report.failed > 0 {
        return Err(format!("{} of {} documents failed", report.failed, documents.len()).into());
    }

    Ok(())
}
