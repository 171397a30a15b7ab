use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;

use typegen::{CONFIG_FILE_NAME, TypegenConfig};

use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Configuration",
    commands: &[
        "typegen init                           # Write typegen.toml with defaults",
        "typegen init --force                   # Overwrite an existing typegen.toml",
    ],
}];

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

pub fn handle_init(args: InitArgs, output: &OutputManager) -> Result<()> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config_path = write_default_config(&current_dir, args.force, output)?;

    output.success(&format!("Created {}", config_path.display()));
    output.info(
        "Edit [source] candidates to point at your API project, then run 'typegen'.",
    );
    Ok(())
}

fn write_default_config(
    dir: &Path,
    force: bool,
    output: &OutputManager,
) -> Result<std::path::PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        output.error(&format!("{} already exists.", config_path.display()));
        output.info("Use --force to overwrite it.");
        anyhow::bail!("Configuration already exists");
    }

    let content = TypegenConfig::default().to_toml()?;
    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    Ok(config_path)
}
