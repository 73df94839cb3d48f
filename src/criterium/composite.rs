//! Combination of several stop criteria.
//!
//! Every member is evaluated on every call so each keeps its own status up to
//! date. The combined verdict is `Diverged` if any member diverged, otherwise
//! `Converged` if any member converged, otherwise `Continue`. An empty
//! composite never stops.

use std::fmt;

use crate::core::traits::Modulus;
use crate::criterium::{IterationStatus, StopCriterium, check_inputs};
use crate::error::StopError;

pub struct CompositeStopCriterium<S: Modulus> {
    members: Vec<Box<dyn StopCriterium<S>>>,
    status: IterationStatus,
}

impl<S: Modulus> Default for CompositeStopCriterium<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Modulus> fmt::Debug for CompositeStopCriterium<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeStopCriterium")
            .field("members", &self.members.iter().map(|m| m.name()).collect::<Vec<_>>())
            .field("status", &self.status)
            .finish()
    }
}

impl<S: Modulus> Clone for CompositeStopCriterium<S> {
    fn clone(&self) -> Self {
        let mut copy = Self::new();
        for member in &self.members {
            copy.push_boxed(member.clone_fresh());
        }
        copy
    }
}

impl<S: Modulus> CompositeStopCriterium<S> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            status: IterationStatus::Continue,
        }
    }

    /// Builder-style [`push`](Self::push).
    pub fn with<C: StopCriterium<S> + 'static>(mut self, criterium: C) -> Self {
        self.push(criterium);
        self
    }

    pub fn push<C: StopCriterium<S> + 'static>(&mut self, criterium: C) {
        self.members.push(Box::new(criterium));
    }

    /// Adds an already boxed member, e.g. one produced by
    /// [`StopCriterium::clone_fresh`].
    pub fn push_boxed(&mut self, criterium: Box<dyn StopCriterium<S>>) {
        self.members.push(criterium);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = &dyn StopCriterium<S>> {
        self.members.iter().map(|m| m.as_ref())
    }

    /// Name of the first member currently reporting `status`, if any.
    pub fn reported_by(&self, status: IterationStatus) -> Option<&'static str> {
        self.members.iter().find(|m| m.status() == status).map(|m| m.name())
    }
}

impl<S: Modulus> StopCriterium<S> for CompositeStopCriterium<S> {
    fn determine_status(
        &mut self,
        iteration: i64,
        solution: &[S],
        source: &[S],
        residual: &[S],
    ) -> Result<IterationStatus, StopError> {
        check_inputs(iteration, solution, source, residual)?;
        let mut combined = IterationStatus::Continue;
        for member in self.members.iter_mut() {
            match member.determine_status(iteration, solution, source, residual)? {
                IterationStatus::Diverged => combined = IterationStatus::Diverged,
                IterationStatus::Converged if combined == IterationStatus::Continue => {
                    combined = IterationStatus::Converged
                }
                _ => {}
            }
        }
        self.status = combined;
        Ok(combined)
    }

    fn reset(&mut self) {
        for member in self.members.iter_mut() {
            member.reset();
        }
        self.status = IterationStatus::Continue;
    }

    fn status(&self) -> IterationStatus {
        self.status
    }

    fn clone_fresh(&self) -> Box<dyn StopCriterium<S>> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "composite"
    }
}
