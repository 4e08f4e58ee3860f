//! Ability queue and the single time-boxed ability session.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use serenity_core::timer::TickCounter;

use crate::obstacles::FountainId;

/// Abilities granted by fountains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Dash,
    Flight,
    Transparency,
    /// Applied on contact; never queued.
    Restore,
}

impl Ability {
    pub fn is_queueable(self) -> bool {
        !matches!(self, Ability::Restore)
    }
}

/// A granted ability together with the fountain it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityGrant {
    pub fountain: FountainId,
    pub ability: Ability,
}

/// Result of a successful `activate_next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub started: AbilityGrant,
    /// Session that was running and got cut short. Its expiry effect must be
    /// applied before the new session's start effect.
    pub superseded: Option<AbilityGrant>,
}

#[derive(Debug, Clone, Copy)]
struct Session {
    grant: AbilityGrant,
    remaining: Duration,
}

/// FIFO of granted abilities plus at most one running session.
///
/// The countdown advances only when [`AbilityController::sync`] drains ticks
/// that a real-time clock posted into the shared [`TickCounter`], so every
/// session write happens on the simulation thread.
#[derive(Debug)]
pub struct AbilityController {
    queue: VecDeque<AbilityGrant>,
    session: Option<Session>,
    last_used: Option<AbilityGrant>,
    paused: bool,
    tick_period: Duration,
    ticks: TickCounter,
}

impl AbilityController {
    pub fn new(tick_period: Duration) -> Self {
        Self::with_counter(tick_period, TickCounter::new())
    }

    pub fn with_counter(tick_period: Duration, ticks: TickCounter) -> Self {
        Self {
            queue: VecDeque::new(),
            session: None,
            last_used: None,
            paused: false,
            tick_period,
            ticks,
        }
    }

    /// Handle for the clock that drives the countdown.
    pub fn tick_counter(&self) -> TickCounter {
        self.ticks.clone()
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    /// Append a grant. The caller has already marked its fountain unavailable.
    pub fn enqueue(&mut self, grant: AbilityGrant) {
        tracing::debug!(ability = ?grant.ability, fountain = grant.fountain.0, "Ability queued");
        self.queue.push_back(grant);
    }

    /// Start the front grant's session, superseding any running one.
    /// Returns `None` and changes nothing when the queue is empty.
    pub fn activate_next(&mut self, duration: Duration) -> Option<Activation> {
        let grant = self.queue.pop_front()?;
        // Ticks posted before this activation belong to no session.
        self.ticks.drain();
        let superseded = self.session.take().map(|s| s.grant);
        if let Some(old) = superseded {
            tracing::debug!(ability = ?old.ability, "Ability session superseded");
        }
        self.session = Some(Session {
            grant,
            remaining: duration,
        });
        self.paused = false;
        self.last_used = Some(grant);
        tracing::debug!(ability = ?grant.ability, ?duration, "Ability session started");
        Some(Activation {
            started: grant,
            superseded,
        })
    }

    /// Apply posted clock ticks. Returns the grant whose session expired, at
    /// most once per session.
    pub fn sync(&mut self) -> Option<AbilityGrant> {
        let ticks = self.ticks.drain();
        if self.paused || ticks == 0 {
            return None;
        }
        self.advance(ticks)
    }

    /// Advance the running session by `ticks` countdown periods.
    pub fn advance(&mut self, ticks: u32) -> Option<AbilityGrant> {
        if self.paused {
            return None;
        }
        let session = self.session.as_mut()?;
        session.remaining = session.remaining.saturating_sub(self.tick_period * ticks);
        if session.remaining.is_zero() {
            let grant = session.grant;
            self.session = None;
            tracing::debug!(ability = ?grant.ability, "Ability session expired");
            return Some(grant);
        }
        None
    }

    pub fn is_active(&self, ability: Ability) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.grant.ability == ability && !s.remaining.is_zero())
    }

    pub fn active(&self) -> Option<AbilityGrant> {
        self.session.as_ref().map(|s| s.grant)
    }

    pub fn remaining_time(&self) -> Duration {
        self.session.as_ref().map(|s| s.remaining).unwrap_or_default()
    }

    /// Freeze the countdown. Returns whether a running session was paused.
    ///
    /// Callers `sync` first so ticks posted before the pause still count and
    /// an expiry they cause is not lost.
    pub fn pause(&mut self) -> bool {
        if self.paused || self.session.is_none() {
            return false;
        }
        self.paused = true;
        true
    }

    /// Unfreeze the countdown. Ticks posted while paused are discarded.
    pub fn resume(&mut self) {
        self.ticks.drain();
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Clear queue and session. Returns every grant that was held so the
    /// caller can hand its fountain back.
    pub fn reset(&mut self) -> Vec<AbilityGrant> {
        let mut held: Vec<AbilityGrant> = self.queue.drain(..).collect();
        if let Some(s) = self.session.take() {
            held.push(s.grant);
        }
        self.paused = false;
        self.last_used = None;
        self.ticks.drain();
        held
    }

    /// Most recently activated grant, kept after its session ends.
    pub fn last_used(&self) -> Option<AbilityGrant> {
        self.last_used
    }

    pub fn clear_last_used(&mut self) {
        self.last_used = None;
    }

    pub fn queue(&self) -> impl Iterator<Item = &AbilityGrant> {
        self.queue.iter()
    }

    pub fn queued_abilities(&self) -> Vec<Ability> {
        self.queue.iter().map(|g| g.ability).collect()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }
}
