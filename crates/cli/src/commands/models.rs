//! `quill models`: List models on the inference server.

use quill_core::Provider;
use quill_providers::OllamaProvider;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let provider = OllamaProvider::from_config(&config.ollama);

    let models = provider.list_models().await?;
    if models.is_empty() {
        println!("No models installed on {}", provider.base_url());
        return Ok(());
    }

    for model in models {
        let mark = if model == config.default_model { "*" } else { " " };
        println!("{mark} {model}");
    }
    Ok(())
}
