//! Per-user fixed-interval cooldown.
//!
//! A message is accepted when at least `cooldown` has elapsed since the user's
//! last *accepted* message. Rejections leave the record untouched, so a user
//! hammering the channel is not locked out forever. There is no burst credit.

use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

pub struct RateLimiter {
    cooldown: Duration,
    last_accepted: DashMap<String, Instant>,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: DashMap::new(),
        }
    }

    /// Accept or reject a message from `user_id` arriving at `now`.
    pub fn try_accept(&self, user_id: &str, now: Instant) -> bool {
        match self.last_accepted.entry(user_id.to_string()) {
            Entry::Occupied(mut last) => {
                if now.saturating_duration_since(*last.get()) < self.cooldown {
                    return false;
                }
                last.insert(now);
                true
            }
            Entry::Vacant(slot) => {
                slot.insert(now);
                true
            }
        }
    }

    /// Timestamp of the user's last accepted message, if any.
    pub fn last_accepted(&self, user_id: &str) -> Option<Instant> {
        self.last_accepted.get(user_id).map(|t| *t)
    }

    /// Time left before `user_id` may send again. Zero when not cooling down.
    pub fn remaining(&self, user_id: &str, now: Instant) -> Duration {
        self.last_accepted(user_id)
            .map(|last| self.cooldown.saturating_sub(now.saturating_duration_since(last)))
            .unwrap_or(Duration::ZERO)
    }
}
