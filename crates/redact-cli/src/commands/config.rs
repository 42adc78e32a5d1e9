use anyhow::Result;
use redact_config::Config;
use std::path::Path;

pub fn handle(path: &Path, config: &Config) -> Result<()> {
    println!("# {}", path.display());
    println!("{}", render(config)?);
    Ok(())
}

fn render(config: &Config) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}
