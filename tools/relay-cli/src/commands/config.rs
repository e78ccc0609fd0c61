//! Configuration management commands.

use std::fs;

use anyhow::{bail, Context as _, Result};
use relay_core::{Endpoint, RelayConfig};

use super::{ConfigArgs, ConfigCommand};
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    ctx.output.info("[cache]");
    ctx.output.kv("enabled", &ctx.config.cache.enabled.to_string());

    ctx.output.info("[transport]");
    ctx.output.kv("latency_ms", &ctx.config.transport.latency_ms.to_string());
    ctx.output.kv("page_size", &ctx.config.transport.page_size.to_string());
    if !ctx.config.transport.fail_endpoints.is_empty() {
        let failing: Vec<&str> = ctx
            .config
            .transport
            .fail_endpoints
            .iter()
            .map(Endpoint::as_str)
            .collect();
        ctx.output.kv("fail_endpoints", &failing.join(", "));
    }

    ctx.output.info("[logging]");
    ctx.output.kv("level", &ctx.config.logging.level);
    ctx.output.kv("format", &format!("{:?}", ctx.config.logging.format).to_lowercase());

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config()?)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    let errors = validation_errors(&ctx.config);

    if errors.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }
    bail!("Configuration has {} error(s)", errors.len())
}

fn validation_errors(config: &RelayConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if relay_observability::parse_level(&config.logging.level).is_err() {
        errors.push(format!("logging.level '{}' is not a valid level", config.logging.level));
    }

    if config.transport.page_size == 0 {
        errors.push("transport.page_size must be greater than 0".to_string());
    }

    errors
}

fn generate_default_config() -> Result<String> {
    let body = RelayConfig::default().to_toml()?;
    Ok(format!("# relay configuration\n\n{}", body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validation_errors(&RelayConfig::default()).is_empty());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = RelayConfig::default();
        config.logging.level = "loud".to_string();
        config.transport.page_size = 0;

        let errors = validation_errors(&config);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("logging.level"));
        assert!(errors[1].contains("page_size"));
    }

    #[test]
    fn test_generated_config_parses() {
        let content = generate_default_config().unwrap();
        let parsed: RelayConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed, RelayConfig::default());
    }
}
