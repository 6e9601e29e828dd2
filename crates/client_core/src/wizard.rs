//! Multi-step flows: an ordered set of steps feeding one accumulator.
//!
//! Each step validates itself (usually through its own
//! [`crate::form::FormController`]) and only then calls
//! [`WizardController::advance`] with its payload. The wizard trusts that
//! payload, merges it, and moves on. Completing the last step hands the
//! accumulator to a [`CompletionHandler`] and afterwards removes the flow's
//! scratch-pad entries. There is no way back to an earlier step.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use storage::ScratchPad;
use thiserror::Error;
use tracing::{info, warn};

pub trait WizardFlow: Send + Sync + 'static {
    type Step: Copy + Eq + fmt::Debug + Send + Sync + 'static;
    type Payload: fmt::Debug + Send;
    type Accumulator: Clone + Default + Send + Sync;

    /// Declared order of the steps. Must not be empty.
    const STEPS: &'static [Self::Step];

    /// Scratch-pad keys removed once the flow has completed.
    const SCRATCH_KEYS: &'static [&'static str] = &[];

    fn step_of(payload: &Self::Payload) -> Self::Step;

    fn merge(accumulator: &mut Self::Accumulator, payload: Self::Payload);
}

#[async_trait]
pub trait CompletionHandler<A>: Send + Sync {
    async fn complete(&self, accumulator: A) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance<S> {
    Moved { from: S, to: S },
    Completed,
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("payload for step {payload} submitted while on step {current}")]
    StepMismatch { current: String, payload: String },
    #[error("wizard has already completed")]
    AlreadyCompleted,
    #[error("step submitted without producing a payload")]
    MissingPayload,
    #[error("completion handler failed: {source}")]
    Completion { source: anyhow::Error },
}

pub struct WizardController<W: WizardFlow> {
    position: usize,
    accumulator: W::Accumulator,
    completed: bool,
    scratch: Arc<dyn ScratchPad>,
    completion: Arc<dyn CompletionHandler<W::Accumulator>>,
}

impl<W: WizardFlow> WizardController<W> {
    pub fn new(
        scratch: Arc<dyn ScratchPad>,
        completion: Arc<dyn CompletionHandler<W::Accumulator>>,
    ) -> Self {
        Self {
            position: 0,
            accumulator: W::Accumulator::default(),
            completed: false,
            scratch,
            completion,
        }
    }

    /// `None` once the flow has completed.
    pub fn current_step(&self) -> Option<W::Step> {
        if self.completed {
            None
        } else {
            W::STEPS.get(self.position).copied()
        }
    }

    pub fn step_index(&self) -> usize {
        self.position
    }

    pub fn accumulator(&self) -> &W::Accumulator {
        &self.accumulator
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Merges a validated step result and moves to the next step, or completes the flow.
    ///
    /// A failing completion handler leaves the wizard on its last step so the
    /// step can be submitted again; scratch-pad entries are only removed after
    /// the handler succeeded.
    pub async fn advance(&mut self, payload: W::Payload) -> Result<Advance<W::Step>, WizardError> {
        let current = self.current_step().ok_or(WizardError::AlreadyCompleted)?;
        let payload_step = W::step_of(&payload);
        if payload_step != current {
            return Err(WizardError::StepMismatch {
                current: format!("{current:?}"),
                payload: format!("{payload_step:?}"),
            });
        }

        W::merge(&mut self.accumulator, payload);

        if let Some(next) = W::STEPS.get(self.position + 1).copied() {
            self.position += 1;
            info!(from = ?current, to = ?next, "wizard advanced");
            return Ok(Advance::Moved {
                from: current,
                to: next,
            });
        }

        self.completion
            .complete(self.accumulator.clone())
            .await
            .map_err(|source| WizardError::Completion { source })?;
        self.completed = true;
        info!(step = ?current, "wizard completed");

        for key in W::SCRATCH_KEYS {
            if let Err(err) = self.scratch.remove(key).await {
                warn!(key, "failed to clear scratch pad entry: {err:#}");
            }
        }

        Ok(Advance::Completed)
    }
}

#[cfg(test)]
#[path = "tests/wizard_tests.rs"]
mod tests;
