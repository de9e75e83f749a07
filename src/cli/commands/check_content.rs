//! Content moderation command.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use console::style;
use tokio::sync::mpsc;

use diarybatch::config::Settings;
use diarybatch::jobs::check_content;
use diarybatch::repository::DieselDbContext;
use diarybatch::services::{FfmpegFrameExtractor, RekognitionClassifier};

use crate::cli::progress::{print_summary, spawn_event_printer};

pub async fn cmd_check_content(settings: &Settings, file_path: &Path) -> anyhow::Result<()> {
    if !file_path.is_dir() {
        bail!("Content directory not found: {}", file_path.display());
    }

    let ctx = DieselDbContext::from_url(&settings.database_url());
    ctx.init_schema().await.context("Failed to apply migrations")?;

    let pending = ctx.media_files().count_unchecked().await?;
    println!(
        "{} Checking {} unchecked media files under {}",
        style("→").cyan(),
        pending,
        file_path.display()
    );

    let classifier = RekognitionClassifier::from_settings(&settings.moderation).await;
    let frames = FfmpegFrameExtractor::new(&settings.frames);
    let mut job = check_content::build_job(
        &ctx,
        settings,
        file_path,
        Arc::new(frames),
        Arc::new(classifier),
    );

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
