//! Nickname-format verification.
//!
//! Members unlock the server by registering a game nickname plus their
//! real name in a fixed format: latin nickname, russian name in
//! parentheses — `PlayerName (Алексей)`.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use voicekeeper_protocol::MemberId;

/// Latin nickname, whitespace, russian name in mandatory parentheses.
static NICK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z0-9_\-\.]+)\s+\(([а-яА-ЯёЁ\s]+)\)$")
        .expect("static pattern compiles")
});

/// Why a verification string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NickFormat {
    /// The overall shape didn't match `никнейм (имя)`.
    Malformed,
    /// Nickname must be 3–20 characters.
    NicknameLength,
    /// Real name must be 2–15 characters.
    NameLength,
}

/// A successfully parsed verification string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNick {
    pub nickname: String,
    pub real_name: String,
}

impl ParsedNick {
    /// Parses and validates `никнейм (имя)`.
    pub fn parse(text: &str) -> Result<Self, NickFormat> {
        let captures = NICK_PATTERN
            .captures(text.trim())
            .ok_or(NickFormat::Malformed)?;
        let nickname = captures[1].to_owned();
        let real_name = captures[2].to_owned();

        let nick_len = nickname.chars().count();
        if !(3..=20).contains(&nick_len) {
            return Err(NickFormat::NicknameLength);
        }
        let name_len = real_name.chars().count();
        if !(2..=15).contains(&name_len) {
            return Err(NickFormat::NameLength);
        }

        Ok(Self {
            nickname,
            real_name,
        })
    }

    /// The server nickname the member is asked to set.
    pub fn required_nick(&self) -> String {
        format!("{} ({})", self.nickname, self.real_name)
    }
}

/// One member's verification record.
#[derive(Debug, Clone)]
pub struct VerifiedPlayer {
    pub nickname: String,
    pub real_name: String,
    pub required_nick: String,
    pub verified_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Everyone who has passed verification, keyed by member.
#[derive(Debug, Default)]
pub struct VerifiedRegistry {
    players: HashMap<MemberId, VerifiedPlayer>,
}

impl VerifiedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_verified(&self, member: MemberId) -> bool {
        self.players.contains_key(&member)
    }

    pub fn get(&self, member: MemberId) -> Option<&VerifiedPlayer> {
        self.players.get(&member)
    }

    /// Records a first-time verification.
    pub fn insert(&mut self, member: MemberId, parsed: &ParsedNick) {
        self.players.insert(
            member,
            VerifiedPlayer {
                nickname: parsed.nickname.clone(),
                real_name: parsed.real_name.clone(),
                required_nick: parsed.required_nick(),
                verified_at: Utc::now(),
                updated_at: None,
            },
        );
        tracing::info!(%member, "member verified");
    }

    /// Replaces the nickname data, keeping the original verification
    /// date. Returns `false` if the member was never verified.
    pub fn update(&mut self, member: MemberId, parsed: &ParsedNick) -> bool {
        let Some(player) = self.players.get_mut(&member) else {
            return false;
        };
        player.nickname = parsed.nickname.clone();
        player.real_name = parsed.real_name.clone();
        player.required_nick = parsed.required_nick();
        player.updated_at = Some(Utc::now());
        tracing::info!(%member, "verification data updated");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_canonical_format() {
        let parsed = ParsedNick::parse("ProPlayer (Алексей)").unwrap();
        assert_eq!(parsed.nickname, "ProPlayer");
        assert_eq!(parsed.real_name, "Алексей");
        assert_eq!(parsed.required_nick(), "ProPlayer (Алексей)");
    }

    #[test]
    fn test_parse_accepts_allowed_nickname_symbols() {
        assert!(ParsedNick::parse("Top_Fragger-1.5 (Иван)").is_ok());
    }

    #[test]
    fn test_parse_trims_surrounding_whitespace() {
        assert!(ParsedNick::parse("  SniperWolf (Мария)  ").is_ok());
    }

    #[test]
    fn test_parse_rejects_missing_parentheses() {
        assert_eq!(
            ParsedNick::parse("ProPlayer Алексей"),
            Err(NickFormat::Malformed)
        );
    }

    #[test]
    fn test_parse_rejects_cyrillic_nickname() {
        assert_eq!(
            ParsedNick::parse("Игрок (Алексей)"),
            Err(NickFormat::Malformed)
        );
    }

    #[test]
    fn test_parse_rejects_latin_real_name() {
        assert_eq!(
            ParsedNick::parse("ProPlayer (Alex)"),
            Err(NickFormat::Malformed)
        );
    }

    #[test]
    fn test_parse_rejects_short_nickname() {
        assert_eq!(
            ParsedNick::parse("ab (Иван)"),
            Err(NickFormat::NicknameLength)
        );
    }

    #[test]
    fn test_parse_rejects_long_nickname() {
        let nick = "a".repeat(21);
        assert_eq!(
            ParsedNick::parse(&format!("{nick} (Иван)")),
            Err(NickFormat::NicknameLength)
        );
    }

    #[test]
    fn test_parse_rejects_short_real_name() {
        assert_eq!(
            ParsedNick::parse("ProPlayer (Я)"),
            Err(NickFormat::NameLength)
        );
    }

    #[test]
    fn test_registry_update_preserves_verified_at() {
        let mut registry = VerifiedRegistry::new();
        let member = MemberId(1);
        registry.insert(member, &ParsedNick::parse("OldNick (Иван)").unwrap());
        let original = registry.get(member).unwrap().verified_at;

        let updated =
            registry.update(member, &ParsedNick::parse("NewNick (Иван)").unwrap());

        assert!(updated);
        let player = registry.get(member).unwrap();
        assert_eq!(player.nickname, "NewNick");
        assert_eq!(player.verified_at, original);
        assert!(player.updated_at.is_some());
    }

    #[test]
    fn test_registry_update_without_record_fails() {
        let mut registry = VerifiedRegistry::new();
        let parsed = ParsedNick::parse("SomeNick (Иван)").unwrap();
        assert!(!registry.update(MemberId(1), &parsed));
    }
}
