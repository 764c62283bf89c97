//! `quill status`: Show configuration and server health.

use quill_config::AppConfig;
use quill_core::Provider;
use quill_providers::OllamaProvider;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    println!("🪶 Quill Status");
    println!("===============");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Server:       {}", config.ollama.base_url);
    println!("  Model:        {}", config.default_model);
    println!(
        "  Tool budget:  {}",
        config
            .agent
            .max_tool_rounds
            .map_or_else(|| "unbounded".to_string(), |n| n.to_string())
    );
    println!(
        "  Containment:  {}",
        if config.agent.restrict_tools_to_project { "project only" } else { "off" }
    );
    println!("  Plan file:    {}", config.workspace.plan_file);

    let provider = OllamaProvider::from_config(&config.ollama);
    match provider.health_check().await {
        Ok(true) => println!("\n  ✅ Inference server reachable"),
        Ok(false) => println!("\n  ⚠️  Inference server answered with an error"),
        Err(e) => println!("\n  ❌ Inference server unreachable: {e}"),
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file — run `quill init` first");
    }

    Ok(())
}
