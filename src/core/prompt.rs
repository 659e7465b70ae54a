use crate::models::{ClinicInfo, ServiceMatch, PLACEHOLDER};

/// Instructions sent as the system message of every completion
pub const SYSTEM_PROMPT: &str = "You are a helpful clinic assistant. Answer questions about the clinic, \
its services and general information using only the provided context. Include relevant details about \
services, specialties, prices, categories, schedules and contact information when they are present in \
the context. Never invent services, prices, doctors or schedules that are not in the context. If the \
answer cannot be found in the context, say so politely and suggest contacting the clinic directly or \
asking about a more specific service.";

/// Answer used when the model returns nothing
pub const NOT_FOUND_REPLY: &str = "I'm sorry, I don't have information about that. \
Please contact the clinic directly or ask about a specific service.";

const NOT_AVAILABLE: &str = "not available";

/// Render clinic info and service matches as the context block of the prompt.
///
/// The clinic block always comes first. Placeholder clinic values are rendered as
/// "not available" and absent service fields are left out.
pub fn format_context(matches: &[ServiceMatch], clinic_info: &ClinicInfo, currency: &str) -> String {
    let mut sections = Vec::with_capacity(matches.len() + 1);

    sections.push(format!(
        "Clinic Information:\nAddress: {}\nPhone: {}\nOperating Hours: {}",
        known_or_unavailable(&clinic_info.address),
        known_or_unavailable(&clinic_info.phone),
        known_or_unavailable(&clinic_info.operating_hours),
    ));

    if matches.is_empty() {
        sections.push("Service Information:\nNo matching services were found for this question.".to_string());
    }

    for service in matches {
        let mut block = format!("Service Information:\nService: {}", service.content);
        if let Some(specialty) = &service.specialty {
            block.push_str(&format!("\nSpecialty: {}", specialty));
        }
        if let Some(price) = service.price {
            block.push_str(&format!("\nPrice: {} {}", price, currency));
        }
        if let Some(category) = &service.category {
            block.push_str(&format!("\nCategory: {}", category));
        }
        sections.push(block);
    }

    sections.join("\n\n")
}

/// User message carrying the context and the question
pub fn build_user_message(context: &str, query: &str) -> String {
    format!("Context:\n{}\n\nQuestion: {}", context, query)
}

fn known_or_unavailable(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == PLACEHOLDER {
        NOT_AVAILABLE
    } else {
        value
    }
}
