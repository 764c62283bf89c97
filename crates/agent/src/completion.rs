//! Inline fill-in-the-middle completion.

use quill_config::AppConfig;
use quill_core::{GenerateOptions, GenerateRequest, Provider, ProviderError};
use quill_protocol::{clean_suggestion, fim_prompt};
use tracing::debug;

/// Ask the model for the text between `prefix` and `suffix`.
///
/// An unusable answer is an empty suggestion; transport failures are errors.
pub async fn complete_inline(
    provider: &dyn Provider,
    model: &str,
    options: GenerateOptions,
    prefix: &str,
    suffix: &str,
) -> Result<String, ProviderError> {
    let request = GenerateRequest {
        model: model.to_string(),
        prompt: fim_prompt(prefix, suffix),
        options,
    };
    let raw = provider.generate(request).await?;
    let suggestion = clean_suggestion(&raw);
    debug!(raw_len = raw.len(), suggestion_len = suggestion.len(), "Inline completion");
    Ok(suggestion)
}

/// [`complete_inline`] with the configured model and sampling options.
pub async fn complete_with_config(
    provider: &dyn Provider,
    config: &AppConfig,
    prefix: &str,
    suffix: &str,
) -> Result<String, ProviderError> {
    complete_inline(
        provider,
        &config.default_model,
        config.completion.options(),
        prefix,
        suffix,
    )
    .await
}
