//! One live search announcement and its opt-in set.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use voicekeeper_protocol::{ChannelId, MemberId, MessageId};

use crate::SearchError;

/// A "looking for players" announcement owned by one member.
///
/// The opt-in set never contains the owner — that invariant is enforced
/// here, at the only place the set is mutated.
#[derive(Debug, Clone)]
pub struct SearchSession {
    pub owner: MemberId,
    /// The voice channel the search recruits for. May be deleted
    /// externally at any time; always re-resolved before rendering.
    pub channel: ChannelId,
    pub description: String,
    /// The posted announcement this session keeps up to date.
    pub message: MessageId,
    joined: BTreeSet<MemberId>,
    pub last_update: DateTime<Utc>,
}

impl SearchSession {
    pub fn new(
        owner: MemberId,
        channel: ChannelId,
        description: impl Into<String>,
        message: MessageId,
    ) -> Self {
        Self {
            owner,
            channel,
            description: description.into(),
            message,
            joined: BTreeSet::new(),
            last_update: Utc::now(),
        }
    }

    /// Adds a member to the opt-in set.
    pub fn opt_in(&mut self, member: MemberId) -> Result<(), SearchError> {
        if member == self.owner {
            return Err(SearchError::OwnerCannotJoin);
        }
        if !self.joined.insert(member) {
            return Err(SearchError::AlreadyJoined(member));
        }
        self.last_update = Utc::now();
        Ok(())
    }

    /// Removes a member from the opt-in set.
    pub fn opt_out(&mut self, member: MemberId) -> Result<(), SearchError> {
        if !self.joined.remove(&member) {
            return Err(SearchError::NotJoined(member));
        }
        self.last_update = Utc::now();
        Ok(())
    }

    /// The opted-in members, in id order.
    pub fn joined(&self) -> &BTreeSet<MemberId> {
        &self.joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SearchSession {
        SearchSession::new(
            MemberId(1),
            ChannelId(10),
            "Ищем игроков!",
            MessageId(100),
        )
    }

    #[test]
    fn test_owner_can_never_opt_in() {
        let mut s = session();
        assert!(matches!(
            s.opt_in(MemberId(1)),
            Err(SearchError::OwnerCannotJoin)
        ));
        assert!(s.joined().is_empty());
    }

    #[test]
    fn test_duplicate_opt_in_rejected() {
        let mut s = session();
        s.opt_in(MemberId(2)).unwrap();
        assert!(matches!(
            s.opt_in(MemberId(2)),
            Err(SearchError::AlreadyJoined(_))
        ));
        assert_eq!(s.joined().len(), 1);
    }

    #[test]
    fn test_opt_out_requires_prior_opt_in() {
        let mut s = session();
        assert!(matches!(
            s.opt_out(MemberId(2)),
            Err(SearchError::NotJoined(_))
        ));
    }

    #[test]
    fn test_opt_in_opt_out_round_trip_restores_set() {
        let mut s = session();
        s.opt_in(MemberId(2)).unwrap();
        let before = s.joined().clone();

        s.opt_in(MemberId(3)).unwrap();
        s.opt_out(MemberId(3)).unwrap();

        assert_eq!(*s.joined(), before);
    }

    #[test]
    fn test_opt_in_bumps_last_update() {
        let mut s = session();
        let initial = s.last_update;
        s.opt_in(MemberId(2)).unwrap();
        assert!(s.last_update >= initial);
    }
}
