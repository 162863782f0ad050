//! Minimal saga executor for multi-step operations spanning the object
//! store and the database, where no real transaction exists.
//!
//! Each side-effecting step registers one compensating action after it
//! succeeds. On a later failure the accumulated compensations run in
//! reverse registration order; at the commit point the set is disarmed.
//! Compensation is best-effort: an undo that itself fails is logged and
//! the unwind continues, and the original error is what the caller sees.

use futures_util::future::BoxFuture;

use crate::errors::AppError;

type CompensationFn<'a> = Box<dyn FnOnce() -> BoxFuture<'a, Result<(), AppError>> + Send + 'a>;

pub struct Compensations<'a> {
    steps: Vec<(&'static str, CompensationFn<'a>)>,
}

impl<'a> Compensations<'a> {
    pub fn new() -> Self {
        Compensations { steps: Vec::new() }
    }

    /// Registers the undo for a step that just succeeded.
    pub fn push<F>(&mut self, label: &'static str, undo: F)
    where
        F: FnOnce() -> BoxFuture<'a, Result<(), AppError>> + Send + 'a,
    {
        self.steps.push((label, Box::new(undo)));
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Commit point reached: drop every registered undo.
    pub fn disarm(mut self) {
        self.steps.clear();
    }

    /// Runs the registered compensations in reverse order. Failures are
    /// demoted to warnings so the caller can still surface the error that
    /// triggered the unwind.
    pub async fn unwind(mut self) {
        while let Some((label, undo)) = self.steps.pop() {
            match undo().await {
                Ok(()) => tracing::debug!(step = label, "compensated"),
                Err(e) => tracing::warn!(
                    step = label,
                    error = %e,
                    "compensation failed, continuing unwind"
                ),
            }
        }
    }
}

impl Default for Compensations<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Propagates an error after unwinding the compensations registered so far.
macro_rules! try_step {
    ($comp:expr, $result:expr) => {
        match $result {
            Ok(value) => value,
            Err(err) => {
                $comp.unwind().await;
                return Err(err.into());
            }
        }
    };
}
pub(crate) use try_step;
