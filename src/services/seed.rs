use std::time::Duration;

use crate::services::{AzureOpenAIClient, SupabaseClient};

/// Clinic documents loaded when no seed file is given
pub const DEFAULT_SEED_DOCUMENTS: &[&str] = &[
    "Our clinic is located at 123 Medical Center Drive, Healthcare City. We provide comprehensive medical care for all ages.",
    "Operating hours are Monday through Friday from 9:00 AM to 6:00 PM, Saturday from 9:00 AM to 2:00 PM, and we are closed on Sundays.",
    "Contact us at +1 (555) 123-4567 for appointments and general inquiries.",
    "Dr. John Smith specializes in General Medicine and is available Monday through Wednesday.",
    "Dr. Sarah Johnson is our pediatric specialist, available Monday, Thursday, and Friday.",
    "Dr. Michael Chen, our cardiologist, sees patients on Tuesday, Thursday, and Friday.",
];

/// Outcome of a seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub failed: usize,
}

/// One document per non-blank line, trimmed
pub fn parse_seed_documents(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Embed each document and insert it into the services table
///
/// A document that fails to embed or insert is logged and counted, and the run
/// moves on to the next one.
pub async fn seed_services<S: AsRef<str>>(
    embeddings: &AzureOpenAIClient,
    store: &SupabaseClient,
    documents: &[S],
    pause: Duration,
) -> SeedReport {
    let mut report = SeedReport::default();

    for (i, document) in documents.iter().enumerate() {
        let document = document.as_ref();

        let embedding = match embeddings.embed(document).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!("Failed to embed document [{}]: {}", i, e);
                report.failed += 1;
                continue;
            }
        };

        match store.insert_service(document, &embedding).await {
            Ok(()) => report.inserted += 1,
            Err(e) => {
                tracing::warn!("Failed to insert document [{}]: {}", i, e);
                report.failed += 1;
            }
        }

        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }

    tracing::info!(
        inserted = report.inserted,
        failed = report.failed,
        "Seeding finished"
    );

    report
}
