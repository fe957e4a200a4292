//! The search board: every live session, keyed by owner.

use std::collections::HashMap;

use voicekeeper_protocol::{MemberId, MessageId};

use crate::{SearchError, SearchSession};

/// Owner-keyed registry of live search sessions.
///
/// At most one session per member. Retirement is removal — there is no
/// tombstone state, so anything operating on a retired session simply
/// finds nothing.
#[derive(Debug, Default)]
pub struct SearchBoard {
    sessions: HashMap<MemberId, SearchSession>,
}

impl SearchBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session.
    pub fn create(&mut self, session: SearchSession) -> Result<(), SearchError> {
        if self.sessions.contains_key(&session.owner) {
            return Err(SearchError::AlreadySearching(session.owner));
        }
        tracing::info!(
            owner = %session.owner,
            channel = %session.channel,
            "search session created"
        );
        self.sessions.insert(session.owner, session);
        Ok(())
    }

    pub fn get(&self, owner: MemberId) -> Option<&SearchSession> {
        self.sessions.get(&owner)
    }

    pub fn get_mut(&mut self, owner: MemberId) -> Option<&mut SearchSession> {
        self.sessions.get_mut(&owner)
    }

    /// Retires a session. Absent owners are a no-op returning `None`.
    pub fn remove(&mut self, owner: MemberId) -> Option<SearchSession> {
        let removed = self.sessions.remove(&owner);
        if removed.is_some() {
            tracing::info!(%owner, "search session retired");
        }
        removed
    }

    /// The owner whose session posted the given announcement.
    pub fn owner_of_message(&self, message: MessageId) -> Option<MemberId> {
        self.sessions
            .values()
            .find(|s| s.message == message)
            .map(|s| s.owner)
    }

    /// Snapshot of all owners, for the reconciler's enumeration.
    pub fn owners(&self) -> Vec<MemberId> {
        self.sessions.keys().copied().collect()
    }

    pub fn contains(&self, owner: MemberId) -> bool {
        self.sessions.contains_key(&owner)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
