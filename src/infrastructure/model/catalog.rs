//! Static model catalogs
//!
//! The cloud adapter always serves [`openrouter_free_models`]; no live catalog
//! call is made. The local adapter falls back to [`ollama_fallback_models`]
//! when the daemon cannot be queried.

use super::types::ModelInfo;
use crate::constants::OLLAMA_NAME;

fn entry(
    id: &str,
    name: &str,
    provider: &str,
    description: &str,
    best_for: &[&str],
    context_window: u32,
    is_local: Option<bool>,
) -> ModelInfo {
    ModelInfo {
        id: id.to_string(),
        name: name.to_string(),
        provider: provider.to_string(),
        description: description.to_string(),
        best_for: best_for.iter().map(|tag| tag.to_string()).collect(),
        context_window,
        is_free: true,
        is_local,
    }
}

/// Free-tier models reachable through the aggregator.
pub fn openrouter_free_models() -> Vec<ModelInfo> {
    vec![
        entry(
            "openrouter/auto:free",
            "Free Models Router (Recommended)",
            "OpenRouter",
            "Routes to an available free model to avoid rate limits. Most reliable choice.",
            &["Production use", "Rate limit avoidance", "All general tasks", "Automatic failover"],
            128_000,
            None,
        ),
        entry(
            "meta-llama/llama-3.3-70b-instruct:free",
            "Llama 3.3 70B Instruct",
            "Meta",
            "Large open model suited to complex, nuanced instructions.",
            &["Complex reasoning", "Coding", "Creative writing", "Nuanced instruction following"],
            128_000,
            None,
        ),
        entry(
            "google/gemini-2.0-flash-exp:free",
            "Gemini 2.0 Flash (Experimental)",
            "Google",
            "Fast experimental multimodal model; may be rate-limited.",
            &["General purpose", "Multimodal tasks", "Complex reasoning"],
            1_048_576,
            None,
        ),
        entry(
            "google/gemma-3-27b-it:free",
            "Gemma 3 27B Instruct",
            "Google",
            "Open model with solid math, reasoning and chat.",
            &["Reasoning", "Math", "Chat", "Structured outputs"],
            128_000,
            None,
        ),
        entry(
            "meta-llama/llama-3.2-3b-instruct:free",
            "Llama 3.2 3B Instruct",
            "Meta",
            "Lightweight model optimised for low latency.",
            &["Simple queries", "Chatbots", "Summarization", "Fast responses"],
            131_072,
            None,
        ),
        entry(
            "mistralai/mistral-7b-instruct:free",
            "Mistral 7B Instruct",
            "Mistral AI",
            "Reliable, fast 7B general-purpose model.",
            &["General tasks", "Text generation", "Basic reasoning"],
            32_768,
            None,
        ),
        entry(
            "qwen/qwen-2.5-vl-7b-instruct:free",
            "Qwen 2.5 VL 7B Instruct",
            "Qwen",
            "Multimodal model for visual understanding and general text.",
            &["Vision tasks", "General chat", "Multilingual support"],
            32_768,
            None,
        ),
        entry(
            "deepseek/deepseek-r1:free",
            "DeepSeek R1 (Free)",
            "DeepSeek",
            "Reasoning model, strong at logic and code.",
            &["Coding", "Math", "Complex Logic", "Reasoning"],
            163_840,
            None,
        ),
    ]
}

/// Common local models suggested when the daemon's model list is unavailable.
pub fn ollama_fallback_models() -> Vec<ModelInfo> {
    vec![
        entry(
            "llama3.2",
            "Llama 3.2",
            OLLAMA_NAME,
            "Balanced performance and speed",
            &["General purpose", "Fast responses", "Local privacy"],
            128_000,
            Some(true),
        ),
        entry(
            "mistral",
            "Mistral",
            OLLAMA_NAME,
            "Mistral 7B - efficient and capable",
            &["General tasks", "Coding", "Fast inference"],
            32_768,
            Some(true),
        ),
        entry(
            "deepseek-r1",
            "DeepSeek R1",
            OLLAMA_NAME,
            "Reasoning focused",
            &["Reasoning", "Math", "Complex logic"],
            163_840,
            Some(true),
        ),
        entry(
            "qwen2.5",
            "Qwen 2.5",
            OLLAMA_NAME,
            "Multilingual support",
            &["Multilingual", "General chat", "Code generation"],
            32_768,
            Some(true),
        ),
    ]
}

/// Describe a model reported by the local daemon.
pub fn local_model(name: &str) -> ModelInfo {
    entry(
        name,
        name,
        OLLAMA_NAME,
        &format!("Local model: {name}"),
        &["Local inference", "Privacy", "No API costs"],
        4_096,
        Some(true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn cloud_catalog_is_free_and_unique() {
        let models = openrouter_free_models();
        assert!(!models.is_empty());
        assert!(models.iter().all(|m| m.is_free));
        let ids: HashSet<_> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), models.len());
    }

    #[test]
    fn local_entries_are_marked_local() {
        assert!(ollama_fallback_models().iter().all(|m| m.is_local == Some(true)));
        let model = local_model("phi3:mini");
        assert_eq!(model.id, "phi3:mini");
        assert_eq!(model.description, "Local model: phi3:mini");
        assert_eq!(model.context_window, 4_096);
    }
}
