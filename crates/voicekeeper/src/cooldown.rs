//! Advisory per-command rate limiting.
//!
//! Purely a UX throttle — nothing here is a correctness invariant. A
//! rejected invocation is silently dropped, matching how the commands
//! behave on the platform.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;
use voicekeeper_protocol::MemberId;

/// Entry count above which stale entries are pruned on insert.
const PRUNE_THRESHOLD: usize = 1024;

/// Entries older than this can never block anything (every window is
/// far shorter) and are dropped during pruning.
const PRUNE_HORIZON: Duration = Duration::from_secs(100);

/// Last accepted invocation per (member, command).
///
/// Timestamps are `tokio::time::Instant`s so windows respond to the
/// runtime's paused clock in tests.
#[derive(Debug, Default)]
pub struct CooldownMap {
    entries: HashMap<(MemberId, &'static str), Instant>,
}

impl CooldownMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` and records the invocation if the member is past
    /// the window for this command; `false` while still cooling down.
    pub fn check(
        &mut self,
        member: MemberId,
        command: &'static str,
        window: Duration,
    ) -> bool {
        self.check_at(member, command, window, Instant::now())
    }

    fn check_at(
        &mut self,
        member: MemberId,
        command: &'static str,
        window: Duration,
        now: Instant,
    ) -> bool {
        let key = (member, command);
        if let Some(last) = self.entries.get(&key) {
            if now.duration_since(*last) < window {
                return false;
            }
        }

        if self.entries.len() >= PRUNE_THRESHOLD {
            self.entries
                .retain(|_, last| now.duration_since(*last) < PRUNE_HORIZON);
        }

        self.entries.insert(key, now);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
