//! Initialize command.

use anyhow::Context;
use console::style;

use diarybatch::config::Settings;
use diarybatch::repository::DieselDbContext;

/// Create the data directory and bring the schema up to date.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    let ctx = DieselDbContext::from_url(&settings.database_url());
    let applied = ctx
        .init_schema()
        .await
        .context("Failed to apply migrations")?;

    for name in &applied {
        println!("  {} Applied {}", style("✓").green(), name);
    }
    println!(
        "{} Initialized diarybatch database at {}",
        style("✓").green(),
        settings.database_url()
    );

    Ok(())
}
