//! Rendering a search session into its announcement payload.
//!
//! Pure function of the session and a live channel snapshot — no
//! gateway calls, so the exact output is unit-testable.

use voicekeeper_gateway::VoiceChannelInfo;
use voicekeeper_protocol::{colors, MemberId, Payload};

use crate::SearchSession;

/// How many entries the itemized lists show before summarizing the rest.
#[derive(Debug, Clone, Copy)]
pub struct RenderCaps {
    /// Channel occupants listed by name.
    pub channel_members: usize,
    /// Opted-in members listed by name.
    pub respondents: usize,
}

impl Default for RenderCaps {
    fn default() -> Self {
        Self {
            channel_members: 8,
            respondents: 6,
        }
    }
}

/// Builds the full announcement payload for a session.
///
/// `channel` is the freshly resolved target; `None` means it no longer
/// exists (the announcement then shows a deleted-channel marker — the
/// reconciler retires such sessions on its next pass).
pub fn render(
    session: &SearchSession,
    channel: Option<&VoiceChannelInfo>,
    caps: &RenderCaps,
) -> Payload {
    let occupants = channel.map(|info| info.members.len()).unwrap_or(0);
    let capacity = match channel {
        Some(info) if info.user_limit > 0 => info.user_limit.to_string(),
        _ => "∞".to_owned(),
    };
    let channel_line = match channel {
        Some(info) => format!(
            "**➥ {}**\n👥 **Игроков:** {}/{}",
            info.id.mention(),
            occupants,
            capacity
        ),
        None => format!(
            "**➥ ❌ Канал удален**\n👥 **Игроков:** {}/{}",
            occupants, capacity
        ),
    };

    let mut payload = Payload::new("🎯 ПОИСК ИГРОКОВ", colors::INFO)
        .description(format!(
            "**{} ищет команду!**\n\n**📝 Описание поиска:**\n{}",
            session.owner.mention(),
            session.description
        ))
        .timestamp(session.last_update)
        .field("🔊 ГОЛОСОВОЙ КАНАЛ", channel_line, false);

    payload = match channel.filter(|info| !info.members.is_empty()) {
        Some(info) => payload.field(
            format!("👥 В КАНАЛЕ ({})", info.members.len()),
            roster(&info.members, caps.channel_members, "игроков"),
            true,
        ),
        None => payload.field("👥 В КАНАЛЕ", "*Канал пуст*", true),
    };

    let joined: Vec<MemberId> = session.joined().iter().copied().collect();
    payload = if joined.is_empty() {
        payload.field("🎮 ОТКЛИКНУЛИСЬ", "*Пока никто*", true)
    } else {
        payload.field(
            format!("🎮 ОТКЛИКНУЛИСЬ ({})", joined.len()),
            roster(&joined, caps.respondents, ""),
            true,
        )
    };

    payload.footer("Заходи быстрее💀")
}

/// A bulleted mention list capped at `limit`, with the overflow
/// summarized as a count.
fn roster(members: &[MemberId], limit: usize, noun: &str) -> String {
    let mut lines: Vec<String> = members
        .iter()
        .take(limit)
        .map(|m| format!("• {}", m.mention()))
        .collect();
    if members.len() > limit {
        let rest = members.len() - limit;
        if noun.is_empty() {
            lines.push(format!("• ... и еще {rest}"));
        } else {
            lines.push(format!("• ... и еще {rest} {noun}"));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use voicekeeper_protocol::{ChannelId, MessageId};

    fn info(members: &[u64], user_limit: u32) -> VoiceChannelInfo {
        VoiceChannelInfo {
            id: ChannelId(10),
            name: "👥Дуо 1".to_owned(),
            user_limit,
            category: None,
            members: members.iter().map(|id| MemberId(*id)).collect(),
        }
    }

    fn session() -> SearchSession {
        SearchSession::new(
            MemberId(1),
            ChannelId(10),
            "нужен один",
            MessageId(100),
        )
    }

    #[test]
    fn test_render_lists_occupants_and_respondents() {
        let mut s = session();
        s.opt_in(MemberId(3)).unwrap();
        let payload = render(&s, Some(&info(&[1, 2], 2)), &RenderCaps::default());

        let in_channel = payload.field_named("👥 В КАНАЛЕ (2)").unwrap();
        assert_eq!(in_channel.value, "• <@1>\n• <@2>");

        let responded = payload.field_named("🎮 ОТКЛИКНУЛИСЬ (1)").unwrap();
        assert_eq!(responded.value, "• <@3>");
    }

    #[test]
    fn test_render_zero_limit_shows_unlimited() {
        let payload = render(&session(), Some(&info(&[1], 0)), &RenderCaps::default());
        let field = payload.field_named("🔊 ГОЛОСОВОЙ КАНАЛ").unwrap();
        assert!(field.value.contains("1/∞"));
    }

    #[test]
    fn test_render_empty_channel_shows_placeholder() {
        let payload = render(&session(), Some(&info(&[], 2)), &RenderCaps::default());
        let field = payload.field_named("👥 В КАНАЛЕ").unwrap();
        assert_eq!(field.value, "*Канал пуст*");
    }

    #[test]
    fn test_render_deleted_channel_shows_marker() {
        let payload = render(&session(), None, &RenderCaps::default());
        let field = payload.field_named("🔊 ГОЛОСОВОЙ КАНАЛ").unwrap();
        assert!(field.value.contains("❌ Канал удален"));
    }

    #[test]
    fn test_render_caps_long_occupant_list() {
        let members: Vec<u64> = (1..=10).collect();
        let payload = render(
            &session(),
            Some(&info(&members, 0)),
            &RenderCaps::default(),
        );

        let field = payload.field_named("👥 В КАНАЛЕ (10)").unwrap();
        assert_eq!(field.value.lines().count(), 9);
        assert!(field.value.ends_with("• ... и еще 2 игроков"));
    }

    #[test]
    fn test_render_caps_long_respondent_list() {
        let mut s = session();
        for id in 2..=9 {
            s.opt_in(MemberId(id)).unwrap();
        }
        let payload = render(&s, Some(&info(&[1], 0)), &RenderCaps::default());

        let field = payload.field_named("🎮 ОТКЛИКНУЛИСЬ (8)").unwrap();
        assert_eq!(field.value.lines().count(), 7);
        assert!(field.value.ends_with("• ... и еще 2"));
    }

    #[test]
    fn test_render_nobody_responded_placeholder() {
        let payload = render(&session(), Some(&info(&[1], 2)), &RenderCaps::default());
        let field = payload.field_named("🎮 ОТКЛИКНУЛИСЬ").unwrap();
        assert_eq!(field.value, "*Пока никто*");
    }
}
