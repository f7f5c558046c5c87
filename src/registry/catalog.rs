//! Built-in provider catalog

use super::{ModelDescriptor, ProviderDescriptor};
use crate::providers::{anthropic, gemini, openai};

fn models(pairs: &[(&str, &str)]) -> Vec<ModelDescriptor> {
    pairs
        .iter()
        .map(|(api_id, display_name)| ModelDescriptor::new(*api_id, *display_name))
        .collect()
}

pub(super) fn openai() -> ProviderDescriptor {
    ProviderDescriptor::new(
        openai::PROVIDER_ID,
        "OpenAI",
        models(&[
            ("gpt-5", "ChatGPT 5"),
            ("gpt-4o", "GPT-4o"),
            ("gpt-4o-mini", "GPT-4o Mini"),
            ("gpt-4-turbo", "GPT-4 Turbo"),
            ("gpt-3.5-turbo", "GPT-3.5 Turbo"),
        ]),
    )
}

pub(super) fn anthropic() -> ProviderDescriptor {
    ProviderDescriptor::new(
        anthropic::PROVIDER_ID,
        "Anthropic (Claude)",
        models(&[
            ("claude-sonnet-4-20250514", "Claude Sonnet 4"),
            ("claude-opus-4-20250514", "Claude Opus 4"),
            ("claude-opus-4-1-20250805", "Claude Opus 4.1"),
        ]),
    )
}

pub(super) fn google() -> ProviderDescriptor {
    ProviderDescriptor::new(
        gemini::PROVIDER_ID,
        "Google (Gemini)",
        models(&[
            ("gemini-3", "Gemini 3"),
            ("gemini-1.5-pro", "Gemini 1.5 Pro"),
            ("gemini-1.5-flash", "Gemini 1.5 Flash"),
            ("gemini-pro", "Gemini Pro"),
        ]),
    )
}
