//! Minimum-dwell-time debounce filter for a two-valued input.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::trace;

use crate::events::RawLevel;

pub const DEFAULT_THRESHOLD: Duration = Duration::from_millis(20);

/// What a sample back at the confirmed level does to a pending candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DebouncePolicy {
    /// A revert clears the candidate; the new level must hold continuously.
    #[default]
    Strict,
    /// A revert is ignored; only the sample at commit time is checked.
    Loose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub level: RawLevel,
    pub since: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceState {
    pub confirmed_level: RawLevel,
    pub candidate: Option<Candidate>,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    state: DebounceState,
    threshold: Duration,
    policy: DebouncePolicy,
}

impl Debouncer {
    pub fn new(initial: RawLevel, threshold: Duration, policy: DebouncePolicy) -> Self {
        Self {
            state: DebounceState {
                confirmed_level: initial,
                candidate: None,
            },
            threshold,
            policy,
        }
    }

    pub fn confirmed(&self) -> RawLevel {
        self.state.confirmed_level
    }

    pub fn state(&self) -> &DebounceState {
        &self.state
    }

    /// Feed one raw sample; returns the new confirmed level when it changes.
    pub fn feed(&mut self, raw: RawLevel, now: Instant) -> Option<RawLevel> {
        if raw == self.state.confirmed_level {
            if self.policy == DebouncePolicy::Strict && self.state.candidate.take().is_some() {
                trace!(level = %raw, "candidate reverted before settling");
            }
            return None;
        }

        match self.state.candidate {
            Some(candidate) if candidate.level == raw => {
                if now.saturating_duration_since(candidate.since) < self.threshold {
                    return None;
                }
                self.state.confirmed_level = raw;
                self.state.candidate = None;
                Some(raw)
            }
            _ => {
                trace!(level = %raw, "new debounce candidate");
                self.state.candidate = Some(Candidate {
                    level: raw,
                    since: now,
                });
                None
            }
        }
    }
}
