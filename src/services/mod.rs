// Service exports
pub mod azure_openai;
pub mod cache;
pub mod seed;
pub mod supabase;
pub mod vector;
pub mod whatsapp;

pub use azure_openai::{AzureDeployment, AzureOpenAIClient};
pub use cache::{CacheKey, CachedClinicInfoStore};
pub use seed::{parse_seed_documents, seed_services, SeedReport, DEFAULT_SEED_DOCUMENTS};
pub use supabase::{SupabaseClient, SupabaseTables};
pub use vector::VectorMatcher;
pub use whatsapp::WhatsAppClient;
