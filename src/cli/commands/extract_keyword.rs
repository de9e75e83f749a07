//! Monthly keyword command.

use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use console::style;
use tokio::sync::mpsc;

use diarybatch::config::Settings;
use diarybatch::jobs::extract_keyword;
use diarybatch::models::MonthWindow;
use diarybatch::repository::DieselDbContext;
use diarybatch::services::ComprehendExtractor;

use crate::cli::progress::{print_summary, spawn_event_printer};

pub async fn cmd_extract_keyword(settings: &Settings, execution_date: NaiveDate) -> anyhow::Result<()> {
    let ctx = DieselDbContext::from_url(&settings.database_url());
    ctx.init_schema().await.context("Failed to apply migrations")?;

    let window = MonthWindow::containing(execution_date);
    let records = ctx.records().count_in_window(&window).await?;
    println!(
        "{} Extracting keywords from {} records in {}",
        style("→").cyan(),
        records,
        window
    );

    let extractor = ComprehendExtractor::from_settings(&settings.keywords).await;
    let mut job = extract_keyword::build_job(&ctx, settings, execution_date, Arc::new(extractor));

    let (event_tx, event_rx) = mpsc::channel(100);
    let printer = spawn_event_printer(event_rx);
    let result = job.run(event_tx).await;
    let _ = printer.await;

    print_summary(&result);
    if !result.is_completed() {
        bail!("Job {} failed", result.job_name);
    }
    Ok(())
}
