//! Room trigger kinds, name templates, and keeper configuration.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use voicekeeper_protocol::ChannelId;

// ---------------------------------------------------------------------------
// TriggerKind
// ---------------------------------------------------------------------------

/// The fixed set of lobby triggers a room can be spawned from.
///
/// Each kind maps to one lobby channel and one [`RoomTemplate`] in the
/// configuration. The tag strings are the ones the deployment uses in
/// its config files and logs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Solo,
    Duo,
    Squad,
    Party,
    Meeting,
    Cinema,
}

impl TriggerKind {
    /// All trigger kinds, for config defaults and sweeps.
    pub const ALL: [TriggerKind; 6] = [
        TriggerKind::Solo,
        TriggerKind::Duo,
        TriggerKind::Squad,
        TriggerKind::Party,
        TriggerKind::Meeting,
        TriggerKind::Cinema,
    ];

    /// The config-file tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Solo => "соло",
            Self::Duo => "дуо",
            Self::Squad => "сквад",
            Self::Party => "группа",
            Self::Meeting => "митинг",
            Self::Cinema => "кино",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// RoomTemplate
// ---------------------------------------------------------------------------

/// Naming and capacity rules for one trigger kind's rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTemplate {
    /// Channel name pattern with one `{}` ordinal placeholder,
    /// e.g. `"👥Дуо {}"`.
    pub name_pattern: String,
    /// Occupancy cap for created rooms. 0 means unlimited.
    pub user_limit: u32,
    /// Category the rooms are created under (created on demand).
    pub category_name: String,
}

impl RoomTemplate {
    /// The portion of the name pattern before the first space.
    ///
    /// Sibling rooms are counted by this prefix when computing the next
    /// ordinal, so `"👥Дуо 1"` and `"👥Дуо 2"` both count for `"👥Дуо {}"`.
    pub fn base_prefix(&self) -> &str {
        self.name_pattern
            .split_once(' ')
            .map(|(prefix, _)| prefix)
            .unwrap_or(&self.name_pattern)
    }

    /// Renders the channel name for the given ordinal.
    pub fn render_name(&self, ordinal: usize) -> String {
        self.name_pattern.replacen("{}", &ordinal.to_string(), 1)
    }
}

// ---------------------------------------------------------------------------
// RoomsConfig
// ---------------------------------------------------------------------------

/// Configuration for the room keeper. Fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomsConfig {
    /// Lobby channel per trigger kind. A deployment maps these to its
    /// own channel ids; kinds without a lobby never trigger.
    pub lobbies: HashMap<TriggerKind, ChannelId>,
    /// Room template per trigger kind.
    pub templates: HashMap<TriggerKind, RoomTemplate>,
    /// How long a room must stay empty before it is deleted.
    pub grace: Duration,
}

impl RoomsConfig {
    /// Grace period between a room emptying and its deletion.
    pub const DEFAULT_GRACE: Duration = Duration::from_secs(10);

    /// The trigger kind whose lobby is the given channel, if any.
    pub fn trigger_for_lobby(&self, channel: ChannelId) -> Option<TriggerKind> {
        self.lobbies
            .iter()
            .find(|(_, lobby)| **lobby == channel)
            .map(|(kind, _)| *kind)
    }

    /// The template for a trigger kind.
    pub fn template(&self, kind: TriggerKind) -> Option<&RoomTemplate> {
        self.templates.get(&kind)
    }
}

impl Default for RoomsConfig {
    /// Templates of the original deployment; lobbies start empty since
    /// channel ids are deployment-specific.
    fn default() -> Self {
        let category = "🔊 Временные каналы";
        let template = |pattern: &str, limit: u32| RoomTemplate {
            name_pattern: pattern.to_owned(),
            user_limit: limit,
            category_name: category.to_owned(),
        };

        let mut templates = HashMap::new();
        templates.insert(TriggerKind::Solo, template("👤Соло {}", 1));
        templates.insert(TriggerKind::Duo, template("👥Дуо {}", 2));
        templates.insert(TriggerKind::Squad, template("🔹Сквад {}", 4));
        templates.insert(TriggerKind::Party, template("👾Другие игры {}", 8));
        templates.insert(TriggerKind::Meeting, template("🗣️Говорилка {}", 0));
        templates.insert(TriggerKind::Cinema, template("🎬Кино {}", 0));

        Self {
            lobbies: HashMap::new(),
            templates,
            grace: Self::DEFAULT_GRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_prefix_stops_at_first_space() {
        let template = RoomTemplate {
            name_pattern: "👾Другие игры {}".to_owned(),
            user_limit: 8,
            category_name: "cat".to_owned(),
        };
        assert_eq!(template.base_prefix(), "👾Другие");
    }

    #[test]
    fn test_base_prefix_without_space_is_whole_pattern() {
        let template = RoomTemplate {
            name_pattern: "room{}".to_owned(),
            user_limit: 0,
            category_name: "cat".to_owned(),
        };
        assert_eq!(template.base_prefix(), "room{}");
    }

    #[test]
    fn test_render_name_substitutes_ordinal() {
        let config = RoomsConfig::default();
        let duo = config.template(TriggerKind::Duo).unwrap();
        assert_eq!(duo.render_name(3), "👥Дуо 3");
    }

    #[test]
    fn test_default_templates_cover_every_kind() {
        let config = RoomsConfig::default();
        for kind in TriggerKind::ALL {
            assert!(config.template(kind).is_some(), "missing {kind}");
        }
    }

    #[test]
    fn test_default_limits_match_deployment() {
        let config = RoomsConfig::default();
        assert_eq!(config.template(TriggerKind::Solo).unwrap().user_limit, 1);
        assert_eq!(config.template(TriggerKind::Duo).unwrap().user_limit, 2);
        assert_eq!(config.template(TriggerKind::Squad).unwrap().user_limit, 4);
        assert_eq!(config.template(TriggerKind::Party).unwrap().user_limit, 8);
        assert_eq!(config.template(TriggerKind::Meeting).unwrap().user_limit, 0);
        assert_eq!(config.template(TriggerKind::Cinema).unwrap().user_limit, 0);
    }

    #[test]
    fn test_trigger_for_lobby_reverse_lookup() {
        let mut config = RoomsConfig::default();
        config.lobbies.insert(TriggerKind::Duo, ChannelId(7));

        assert_eq!(config.trigger_for_lobby(ChannelId(7)), Some(TriggerKind::Duo));
        assert_eq!(config.trigger_for_lobby(ChannelId(8)), None);
    }

    #[test]
    fn test_trigger_kind_tags() {
        assert_eq!(TriggerKind::Duo.to_string(), "дуо");
        assert_eq!(TriggerKind::Party.to_string(), "группа");
    }
}
