//! Progress events emitted by steps.
//!
//! Generic enough that the CLI can render them as a progress display and
//! tests can ignore them by dropping the receiver.

#[derive(Debug, Clone)]
pub enum StepEvent {
    StepStarted {
        step: String,
    },
    ItemSkipped {
        step: String,
        reason: String,
        skip_count: usize,
    },
    ChunkCommitted {
        step: String,
        items: usize,
        total_written: usize,
    },
    StepCompleted {
        step: String,
        read: usize,
        written: usize,
        skipped: usize,
        filtered: usize,
    },
    StepFailed {
        step: String,
        cause: String,
    },
}

impl StepEvent {
    pub fn step(&self) -> &str {
        match self {
            StepEvent::StepStarted { step }
            | StepEvent::ItemSkipped { step, .. }
            | StepEvent::ChunkCommitted { step, .. }
            | StepEvent::StepCompleted { step, .. }
            | StepEvent::StepFailed { step, .. } => step,
        }
    }
}
