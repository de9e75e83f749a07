//! Terminal rendering of step events and job results.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use diarybatch::batch::{JobResult, JobStatus, StepEvent};

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb
}

/// Drive a spinner from step events until the sender side is dropped.
pub fn spawn_event_printer(mut event_rx: mpsc::Receiver<StepEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut pb: Option<ProgressBar> = None;

        while let Some(event) = event_rx.recv().await {
            match event {
                StepEvent::StepStarted { step } => {
                    let bar = spinner();
                    bar.set_prefix(step);
                    bar.set_message("starting...");
                    pb = Some(bar);
                }
                StepEvent::ChunkCommitted { total_written, .. } => {
                    if let Some(ref bar) = pb {
                        bar.set_message(format!("{} written", total_written));
                    }
                }
                StepEvent::ItemSkipped {
                    reason, skip_count, ..
                } => {
                    if let Some(ref bar) = pb {
                        bar.println(format!(
                            "  {} skipped ({}): {}",
                            style("!").yellow(),
                            skip_count,
                            reason
                        ));
                    }
                }
                StepEvent::StepCompleted {
                    step,
                    read,
                    written,
                    skipped,
                    filtered,
                } => {
                    if let Some(bar) = pb.take() {
                        bar.finish_and_clear();
                    }
                    println!(
                        "{} {}: {} read, {} written, {} skipped, {} filtered",
                        style("✓").green(),
                        step,
                        read,
                        written,
                        skipped,
                        filtered
                    );
                }
                StepEvent::StepFailed { step, cause } => {
                    if let Some(bar) = pb.take() {
                        bar.finish_and_clear();
                    }
                    println!("{} {} failed: {}", style("✗").red(), step, cause);
                }
            }
        }

        if let Some(bar) = pb.take() {
            bar.finish_and_clear();
        }
    })
}

pub fn print_summary(result: &JobResult) {
    match &result.status {
        JobStatus::Completed => println!(
            "{} Job {} completed ({} steps)",
            style("✓").green(),
            result.job_name,
            result.steps.len()
        ),
        JobStatus::Failed { step, cause } => println!(
            "{} Job {} failed at step {}: {}",
            style("✗").red(),
            result.job_name,
            step,
            cause
        ),
    }
}
