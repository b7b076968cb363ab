use std::sync::Mutex;

use tokio::sync::mpsc;

/// Client-visible phase of a submission. `Success` and `Failed` are
/// terminal; `Failed` is reachable from every non-terminal state so a stage
/// error can never strand the UI mid-phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Waiting,
    Converting,
    Uploading,
    Generating,
    Success,
    Failed { reason: String },
}

impl UploadStatus {
    /// Input controls are enabled only before a submission starts.
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Converting => "converting",
            Self::Uploading => "uploading",
            Self::Generating => "generating",
            Self::Success => "success",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid status transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: &'static str,
    pub to: &'static str,
}

/// Tracks the current status and publishes every accepted transition, in
/// order, to a single subscriber. There is no edge back to `Waiting`; a new
/// machine is the external reset.
pub struct StatusMachine {
    current: Mutex<UploadStatus>,
    events: mpsc::UnboundedSender<UploadStatus>,
}

impl StatusMachine {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UploadStatus>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                current: Mutex::new(UploadStatus::Waiting),
                events,
            },
            receiver,
        )
    }

    pub fn current(&self) -> UploadStatus {
        self.current.lock().unwrap().clone()
    }

    pub fn advance(&self, next: UploadStatus) -> Result<(), InvalidTransition> {
        let mut current = self.current.lock().unwrap();
        if !allowed(&current, &next) {
            return Err(InvalidTransition {
                from: current.label(),
                to: next.label(),
            });
        }
        *current = next.clone();
        let _ = self.events.send(next);
        Ok(())
    }
}

fn allowed(from: &UploadStatus, to: &UploadStatus) -> bool {
    use UploadStatus::*;
    match (from, to) {
        (Waiting, Converting)
        | (Converting, Uploading)
        | (Uploading, Generating)
        | (Generating, Success) => true,
        (from, Failed { .. }) => !from.is_terminal(),
        _ => false,
    }
}
