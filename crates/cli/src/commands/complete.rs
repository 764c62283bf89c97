//! `quill complete`: Inline fill-in-the-middle completion.

use quill_agent::complete_inline;
use quill_providers::OllamaProvider;

pub async fn run(
    prefix: String,
    suffix: String,
    model: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let provider = OllamaProvider::from_config(&config.ollama);
    let model = model.unwrap_or_else(|| config.default_model.clone());

    let suggestion = complete_inline(
        &provider,
        &model,
        config.completion.options(),
        &prefix,
        &suffix,
    )
    .await?;
    println!("{suggestion}");
    Ok(())
}
