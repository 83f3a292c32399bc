//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
        ConfigCommand::Validate { path } => validate_config(&path, ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Current Configuration");

    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.info("");
    ctx.output.info("[shop]");
    ctx.output.kv("currency", ctx.config.shop.currency.code());
    ctx.output.kv(
        "ticket_grace_secs",
        &ctx.config.shop.ticket_grace_secs.to_string(),
    );
    ctx.output.kv(
        "deduct_stock_on_checkout",
        &ctx.config.shop.deduct_stock_on_checkout.to_string(),
    );
    ctx.output.kv(
        "max_quantity_per_line",
        &ctx.config.shop.max_quantity_per_line.to_string(),
    );

    ctx.output.info("");
    ctx.output.info("[session]");
    ctx.output.kv("user", &ctx.config.session.user);
    ctx.output.kv("staff", &ctx.config.session.staff.join(", "));

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let path = ctx.resolve_path("till.toml");

    if path.exists() && !force {
        bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    fs::write(&path, generate_default_config())?;
    ctx.output
        .success(&format!("Wrote default config to {}", path.display()));
    Ok(())
}

async fn validate_config(path: &str, ctx: &Context) -> Result<()> {
    let resolved = ctx.resolve_path(path);
    let Some(path_str) = resolved.to_str() else {
        bail!("Config path is not valid UTF-8");
    };
    let config = CliConfig::load(path_str)?;

    if config.session.staff.is_empty() {
        ctx.output
            .warn("No staff configured; nobody can manage the catalog");
    }
    ctx.output.success(&format!("{} is valid", resolved.display()));
    Ok(())
}
