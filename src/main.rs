use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use clinic_assistant::config::Settings;
use clinic_assistant::core::{ClinicInfoStore, CompletionOptions, PipelineOptions, QueryPipeline, ResponseComposer};
use clinic_assistant::routes::{self, AppState};
use clinic_assistant::services::{
    AzureDeployment, AzureOpenAIClient, CachedClinicInfoStore, SupabaseClient, SupabaseTables, VectorMatcher,
    WhatsAppClient,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

/// Construct the collaborator clients and wire them into the pipeline
fn build_pipeline(settings: &Settings) -> std::io::Result<QueryPipeline> {
    let supabase = Arc::new(
        SupabaseClient::new(
            settings.supabase.url.clone(),
            settings.supabase.key.clone(),
            SupabaseTables {
                clinic_info: settings.supabase.clinic_table.clone(),
                match_function: settings.supabase.match_function.clone(),
                services: settings.supabase.services_table.clone(),
            },
        )
        .map_err(|e| startup_error("Failed to create Supabase client", e))?,
    );

    let embeddings = Arc::new(
        AzureOpenAIClient::new(AzureDeployment {
            endpoint: settings.embedding.endpoint.clone(),
            api_key: settings.embedding.api_key.clone(),
            api_version: settings.embedding.api_version.clone(),
            deployment: settings.embedding.deployment.clone(),
        })
        .map_err(|e| startup_error("Failed to create embedding client", e))?,
    );

    let chat = Arc::new(
        AzureOpenAIClient::new(AzureDeployment {
            endpoint: settings.chat.endpoint.clone(),
            api_key: settings.chat.api_key.clone(),
            api_version: settings.chat.api_version.clone(),
            deployment: settings.chat.deployment.clone(),
        })
        .map_err(|e| startup_error("Failed to create chat client", e))?,
    );

    let whatsapp = Arc::new(
        WhatsAppClient::new(
            settings.whatsapp.api_base.clone(),
            settings.whatsapp.api_version.clone(),
            settings.whatsapp.phone_number_id.clone(),
            settings.whatsapp.token.clone(),
        )
        .map_err(|e| startup_error("Failed to create WhatsApp client", e))?,
    );

    info!("External service clients initialized");

    let clinic_store: Arc<dyn ClinicInfoStore> = match settings.cache.clinic_info_ttl() {
        Some(ttl) => {
            info!("Clinic info cache enabled (TTL: {}s)", ttl.as_secs());
            Arc::new(CachedClinicInfoStore::new(supabase.clone(), ttl))
        }
        None => supabase.clone(),
    };

    let composer = ResponseComposer::new(
        chat,
        CompletionOptions {
            temperature: settings.completion.temperature,
            max_tokens: settings.completion.max_tokens,
            currency: settings.completion.currency.clone(),
        },
    );

    let options = PipelineOptions {
        match_count: settings.pipeline.match_count,
        recipient: settings.whatsapp.recipient.clone(),
        delivery_policy: settings.pipeline.delivery_policy,
        call_timeout: settings.pipeline.call_timeout(),
    };

    info!(
        "Pipeline initialized (match_count: {}, delivery_policy: {:?}, timeout: {}s)",
        options.match_count,
        options.delivery_policy,
        options.call_timeout.as_secs()
    );

    Ok(QueryPipeline::new(
        clinic_store,
        Arc::new(VectorMatcher::new(embeddings, supabase)),
        composer,
        whatsapp,
        options,
    ))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::global() {
        Ok(settings) => settings,
        Err(e) => {
            // Logging is configured from settings, so report on stderr
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting clinic assistant...");
    info!("Configuration loaded successfully");

    let app_state = AppState {
        pipeline: Arc::new(build_pipeline(settings)?),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
