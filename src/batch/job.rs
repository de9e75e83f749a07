//! Ordered sequence of steps.

use tokio::sync::mpsc;
use tracing::{error, info};

use super::{Step, StepEvent, StepExecution};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Completed,
    Failed { step: String, cause: String },
}

#[derive(Debug, Clone)]
pub struct JobResult {
    pub job_name: String,
    pub status: JobStatus,
    /// Executions of the steps that ran, in order.
    pub steps: Vec<StepExecution>,
}

impl JobResult {
    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }

    pub fn step(&self, name: &str) -> Option<&StepExecution> {
        self.steps.iter().find(|s| s.step_name == name)
    }
}

/// Runs its steps strictly one after another. The first failed step halts
/// the job and later steps are never started.
pub struct Job {
    name: String,
    steps: Vec<Box<dyn Step>>,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub async fn run(&mut self, event_tx: mpsc::Sender<StepEvent>) -> JobResult {
        info!(job = %self.name, steps = self.steps.len(), "Job started");
        let mut executions = Vec::with_capacity(self.steps.len());

        for step in self.steps.iter_mut() {
            let execution = step.execute(&event_tx).await;
            let failure = execution.failure().map(str::to_string);
            executions.push(execution);

            if let Some(cause) = failure {
                error!(job = %self.name, step = %step.name(), "Job failed");
                return JobResult {
                    job_name: self.name.clone(),
                    status: JobStatus::Failed {
                        step: step.name().to_string(),
                        cause,
                    },
                    steps: executions,
                };
            }
        }

        info!(job = %self.name, "Job completed");
        JobResult {
            job_name: self.name.clone(),
            status: JobStatus::Completed,
            steps: executions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::StepStatus;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedStep {
        name: &'static str,
        fail: bool,
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Step for FixedStep {
        fn name(&self) -> &str {
            self.name
        }

        async fn execute(&mut self, _event_tx: &mpsc::Sender<StepEvent>) -> StepExecution {
            self.runs.fetch_add(1, Ordering::SeqCst);
            StepExecution {
                step_name: self.name.to_string(),
                status: if self.fail {
                    StepStatus::Failed {
                        cause: "boom".to_string(),
                    }
                } else {
                    StepStatus::Completed
                },
                read_count: 0,
                write_count: 0,
                skip_count: 0,
                filter_count: 0,
                commit_count: 0,
            }
        }
    }

    fn fixed(name: &'static str, fail: bool, runs: &Arc<AtomicUsize>) -> FixedStep {
        FixedStep {
            name,
            fail,
            runs: runs.clone(),
        }
    }

    #[tokio::test]
    async fn test_runs_steps_in_order() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut job = Job::new("two-step")
            .step(fixed("first", false, &runs))
            .step(fixed("second", false, &runs));
        let (tx, _rx) = mpsc::channel(8);

        let result = job.run(tx).await;

        assert!(result.is_completed());
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(job.step_names(), vec!["first", "second"]);
        assert!(result.step("second").is_some());
    }

    #[tokio::test]
    async fn test_failed_step_halts_job() {
        let first_runs = Arc::new(AtomicUsize::new(0));
        let second_runs = Arc::new(AtomicUsize::new(0));
        let mut job = Job::new("halting")
            .step(fixed("first", true, &first_runs))
            .step(fixed("second", false, &second_runs));
        let (tx, _rx) = mpsc::channel(8);

        let result = job.run(tx).await;

        assert_eq!(
            result.status,
            JobStatus::Failed {
                step: "first".to_string(),
                cause: "boom".to_string()
            }
        );
        assert_eq!(second_runs.load(Ordering::SeqCst), 0);
        assert_eq!(result.steps.len(), 1);
    }
}
