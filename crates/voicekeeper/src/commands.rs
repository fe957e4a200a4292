//! Text command dispatch.
//!
//! Commands arrive pre-split as (actor, channel, name, argument string);
//! prefix parsing stays with the platform collaborator. Every handler
//! resolves its failures into posted messages — nothing user-triggered
//! propagates as an error.

use std::time::Duration;

use chrono::Utc;
use voicekeeper_gateway::{Gateway, GatewayError};
use voicekeeper_protocol::{colors, ChannelId, MemberId, Payload};
use voicekeeper_search::SearchError;

use crate::verify::NickFormat;
use crate::{BotError, Coordinator, LeaveDuration, LeaveRecord, ParsedNick};

/// How long the different notice classes stay up before the platform
/// deletes them.
const TTL_BRIEF: Duration = Duration::from_secs(10);
const TTL_SHORT: Duration = Duration::from_secs(15);
const TTL_USAGE: Duration = Duration::from_secs(30);
const TTL_LONG: Duration = Duration::from_secs(60);

/// Every text command the bot answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Verify,
    ChangeNick,
    Instruction,
    VerificationHelp,
    CheckVerification,
    Leave,
    Return,
    Search,
}

impl Command {
    /// Resolves a command name (without prefix) to a command.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "verify" => Some(Self::Verify),
            "сменить_ник" => Some(Self::ChangeNick),
            "инструкция" => Some(Self::Instruction),
            "верификация" => Some(Self::VerificationHelp),
            "проверить" => Some(Self::CheckVerification),
            "отпуск" => Some(Self::Leave),
            "вернулся" => Some(Self::Return),
            "i" | "поиск" => Some(Self::Search),
            _ => None,
        }
    }

    /// Stable key for the cooldown map.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Verify => "verify",
            Self::ChangeNick => "change_nickname",
            Self::Instruction => "instruction",
            Self::VerificationHelp => "verification_help",
            Self::CheckVerification => "check_verification",
            Self::Leave => "vacation",
            Self::Return => "back_from_vacation",
            Self::Search => "player_search",
        }
    }

    /// Per-command throttle window. Help commands are not throttled.
    pub fn cooldown(&self) -> Option<Duration> {
        match self {
            Self::Verify => Some(Duration::from_secs(5)),
            Self::ChangeNick => Some(Duration::from_secs(10)),
            Self::CheckVerification => Some(Duration::from_secs(5)),
            Self::Leave => Some(Duration::from_secs(10)),
            Self::Return => Some(Duration::from_secs(5)),
            Self::Search => Some(Duration::from_secs(10)),
            Self::Instruction | Self::VerificationHelp => None,
        }
    }
}

/// `<@id>` or `<@!id>` mention markup.
fn parse_mention(text: &str) -> Option<MemberId> {
    let inner = text.trim().strip_prefix("<@")?.strip_suffix('>')?;
    let inner = inner.strip_prefix('!').unwrap_or(inner);
    inner.parse().ok().map(MemberId)
}

fn error_payload(title: &str, description: impl Into<String>) -> Payload {
    Payload::new(title, colors::ERROR).description(description)
}

impl<G: Gateway> Coordinator<G> {
    /// Dispatches one text command. Unknown names are ignored; throttled
    /// invocations are dropped silently.
    pub async fn on_command(
        &self,
        actor: MemberId,
        channel: ChannelId,
        name: &str,
        args: &str,
    ) -> Result<(), BotError> {
        let Some(command) = Command::parse(name) else {
            return Ok(());
        };

        if let Some(window) = command.cooldown() {
            if !self.cooldowns.lock().await.check(actor, command.key(), window) {
                tracing::debug!(%actor, command = command.key(), "command throttled");
                return Ok(());
            }
        }

        match command {
            Command::Verify => self.cmd_verify(actor, channel, args).await,
            Command::ChangeNick => self.cmd_change_nick(actor, channel, args).await,
            Command::Instruction => self.cmd_instruction(channel).await,
            Command::VerificationHelp => self.cmd_verification_help(channel).await,
            Command::CheckVerification => self.cmd_check(actor, channel, args).await,
            Command::Leave => self.cmd_leave(actor, channel, args).await,
            Command::Return => self.cmd_return(actor, channel).await,
            Command::Search => self.cmd_search(actor, channel, args).await,
        }
    }

    // -- Verification ------------------------------------------------------

    async fn cmd_verify(
        &self,
        actor: MemberId,
        channel: ChannelId,
        args: &str,
    ) -> Result<(), BotError> {
        let text = args.trim();
        if text.is_empty() {
            let usage = error_payload(
                "❌ Неверный формат",
                "**Использование:** `!verify <никнейм> (<имя>)`\n\n\
                 **Пример:** `!verify PlayerName (Алексей)`\n\n\
                 **Правила:**\n\
                 • Никнейм: только английские буквы, цифры и символы\n\
                 • Имя в скобках: только русские буквы\n\
                 • Скобки обязательны!",
            );
            self.post_notice(channel, usage, TTL_USAGE).await;
            return Ok(());
        }

        let parsed = match ParsedNick::parse(text) {
            Ok(parsed) => parsed,
            Err(reason) => {
                self.post_notice(channel, nick_rejection(reason), TTL_USAGE)
                    .await;
                return Ok(());
            }
        };

        if self.verified.lock().await.is_verified(actor) {
            let payload = error_payload(
                "❌ Уже верифицирован",
                "Вы уже прошли верификацию ранее!",
            );
            self.post_notice(channel, payload, TTL_SHORT).await;
            return Ok(());
        }

        let role = self.config.verification.role;
        if let Err(err) = self.grant_role_checked(actor, role).await {
            self.post_notice(channel, role_failure("верификации", &err), TTL_SHORT)
                .await;
            return Ok(());
        }

        self.verified.lock().await.insert(actor, &parsed);
        let required = parsed.required_nick();
        let now = Utc::now();

        let success = Payload::new("✅ Верификация успешна!", colors::SUCCESS)
            .description(format!(
                "**Добро пожаловать, {}!**\n\n\
                 **Ваши данные:**\n\
                 • 🎮 Игровой ник: `{}`\n\
                 • 👤 Ваше имя: `{}`\n\
                 • 📅 Верифицирован: `{}`\n\
                 • 📛 Требуемый ник: `{}`\n\n\
                 Теперь у вас есть доступ ко всем возможностям сервера! 🎉",
                parsed.real_name,
                parsed.nickname,
                parsed.real_name,
                now.format("%d.%m.%Y %H:%M"),
                required
            ))
            .field(
                "📝 ВАЖНО: Измените серверный никнейм вручную",
                format!(
                    "1. Нажмите на **название сервера**\n\
                     2. Выберите **'Профили'** → **'Личные профили сервера'**\n\
                     3. В поле **'Никнейм на сервере'** введите:\n```{required}```\n\
                     4. **Сохраните изменения**"
                ),
                false,
            )
            .timestamp(now);
        self.post_notice(channel, success, TTL_LONG).await;

        // Best effort; members with closed DMs just miss the reminder.
        let dm = Payload::new("📝 Инструкция по изменению ника", colors::INFO)
            .description(format!(
                "**Пожалуйста, установите ваш серверный никнейм:**\n```{required}```\n\n\
                 Профили → Личные профили сервера → Никнейм на сервере."
            ));
        if let Err(err) = self.gateway.dm(actor, dm).await {
            tracing::debug!(%actor, error = %err, "verification DM failed");
        }

        Ok(())
    }

    async fn cmd_change_nick(
        &self,
        actor: MemberId,
        channel: ChannelId,
        args: &str,
    ) -> Result<(), BotError> {
        let text = args.trim();
        if text.is_empty() {
            let usage = error_payload(
                "❌ Неверный формат",
                "**Использование:** `!сменить_ник <никнейм> (<имя>)`\n\n\
                 **Пример:** `!сменить_ник NewNickname (НовоеИмя)`",
            );
            self.post_notice(channel, usage, TTL_USAGE).await;
            return Ok(());
        }

        if !self.verified.lock().await.is_verified(actor) {
            let payload = error_payload(
                "❌ Ошибка",
                "Сначала пройдите верификацию командой `!verify`",
            );
            self.post_notice(channel, payload, TTL_SHORT).await;
            return Ok(());
        }

        let parsed = match ParsedNick::parse(text) {
            Ok(parsed) => parsed,
            Err(reason) => {
                self.post_notice(channel, nick_rejection(reason), TTL_USAGE)
                    .await;
                return Ok(());
            }
        };

        self.verified.lock().await.update(actor, &parsed);
        let required = parsed.required_nick();

        let payload = Payload::new("✅ Данные обновлены!", colors::SUCCESS)
            .description(format!(
                "**Новые данные:**\n\
                 • 🎮 Игровой ник: `{}`\n\
                 • 👤 Ваше имя: `{}`\n\
                 • 📛 Требуемый ник: `{}`\n\
                 • 📅 Обновлено: `{}`",
                parsed.nickname,
                parsed.real_name,
                required,
                Utc::now().format("%d.%m.%Y %H:%M")
            ))
            .field(
                "📝 Инструкция по изменению ника",
                format!(
                    "Профили → Личные профили сервера → Никнейм на сервере:\n```{required}```"
                ),
                false,
            );
        self.post_notice(channel, payload, TTL_LONG).await;
        Ok(())
    }

    async fn cmd_instruction(&self, channel: ChannelId) -> Result<(), BotError> {
        let payload = Payload::new(
            "📝 Инструкция по изменению серверного никнейма",
            colors::INFO,
        )
        .description(
            "**Как изменить никнейм в личном профиле сервера:**\n\n\
             1. **Нажмите на название сервера** в левом верхнем углу\n\
             2. Выберите **'Профили'** → **'Личные профили сервера'**\n\
             3. Найдите нужный сервер в списке\n\
             4. В поле **'Никнейм на сервере'** введите ваш ник\n\
             5. **Сохраните изменения**\n\n\
             **Формат ника для клана:** `PlayerName (Имя)`\n\
             **Пример:** `ProPlayer (Алексей)`",
        );
        self.post_notice(channel, payload, TTL_LONG).await;
        Ok(())
    }

    async fn cmd_verification_help(
        &self,
        channel: ChannelId,
    ) -> Result<(), BotError> {
        let payload = Payload::new("🔐 ВЕРИФИКАЦИЯ ИГРОКА", colors::INFO)
            .description(
                "**Для доступа к серверу необходимо пройти верификацию!**\n\n\
                 **Команда:** `!verify <никнейм> (<имя>)`\n\n\
                 **Примеры:**\n\
                 • `!verify ProPlayer (Алексей)`\n\
                 • `!verify SniperWolf (Мария)`\n\n\
                 **Правила:**\n\
                 • Никнейм: английские буквы, цифры, символы _-.\n\
                 • Имя: только русские буквы в скобках\n\
                 • Скобки вокруг имени обязательны!",
            );
        self.post_notice(channel, payload, TTL_LONG).await;
        Ok(())
    }

    async fn cmd_check(
        &self,
        actor: MemberId,
        channel: ChannelId,
        args: &str,
    ) -> Result<(), BotError> {
        let target = parse_mention(args).unwrap_or(actor);

        let payload = match self.verified.lock().await.get(target) {
            Some(player) => Payload::new("✅ Игрок верифицирован", colors::SUCCESS)
                .description(format!(
                    "**Данные игрока {}:**\n\
                     • 🎮 Игровой ник: `{}`\n\
                     • 👤 Реальное имя: `{}`\n\
                     • 📅 Дата верификации: `{}`\n\
                     • 📛 Требуемый ник: `{}`",
                    target.mention(),
                    player.nickname,
                    player.real_name,
                    player.verified_at.format("%d.%m.%Y %H:%M"),
                    player.required_nick
                ))
                .field(
                    "📝 Инструкция",
                    "Используйте `!инструкция` для получения инструкции по изменению ника",
                    false,
                ),
            None => error_payload(
                "❌ Игрок не верифицирован",
                format!(
                    "{} еще не прошел верификацию.\n\
                     Используйте команду `!верификация` для инструкций.",
                    target.mention()
                ),
            ),
        };
        self.post_notice(channel, payload, TTL_USAGE).await;
        Ok(())
    }

    // -- Leave of absence --------------------------------------------------

    async fn cmd_leave(
        &self,
        actor: MemberId,
        channel: ChannelId,
        args: &str,
    ) -> Result<(), BotError> {
        let text = args.trim();
        if text.is_empty() {
            let payload = Payload::new("🏖️ Система отпусков", colors::INFO)
                .description(
                    "**Использование:** `!отпуск <длительность>`\n\n\
                     **Доступные варианты:**\n\
                     • `!отпуск 3д` - 1-3 дня\n\
                     • `!отпуск неделя` - 7 дней\n\
                     • `!отпуск 2недели` - 14 дней\n\
                     **Для досрочного возвращения:** `!вернулся`",
                );
            self.post_notice(channel, payload, TTL_USAGE).await;
            return Ok(());
        }

        let Some(duration) = LeaveDuration::parse(text) else {
            let payload = error_payload(
                "❌ Ошибка",
                "Неверная длительность. Используйте: 3д, неделя, 2недели",
            );
            self.post_notice(channel, payload, TTL_BRIEF).await;
            return Ok(());
        };

        let role = self.config.leave.role;
        match self.gateway.role(role).await {
            Ok(_) => {}
            Err(err) if err.is_not_found() => {
                let payload =
                    error_payload("❌ Ошибка", "Роль отпуска не найдена!");
                self.post_notice(channel, payload, TTL_BRIEF).await;
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }

        if self.gateway.member_has_role(actor, role).await? {
            let payload = error_payload("❌ Ошибка", "Вы уже в отпуске!");
            self.post_notice(channel, payload, TTL_BRIEF).await;
            return Ok(());
        }

        if let Err(err) = self.grant_role_checked(actor, role).await {
            self.post_notice(channel, role_failure("отпуска", &err), TTL_SHORT)
                .await;
            return Ok(());
        }

        let now = Utc::now();
        let end_date = now + duration.delta();

        let notice = Payload::new("🏖️ Новая заявка на отпуск", colors::SUCCESS)
            .field("👤 Сотрудник", actor.mention(), true)
            .field("⏱️ Длительность", duration.display(), true)
            .field(
                "📅 Дата окончания",
                end_date.format("%d.%m.%Y %H:%M").to_string(),
                true,
            )
            .timestamp(now);
        let admin_message = match self
            .gateway
            .post(self.config.leave.admin_channel, notice)
            .await
        {
            Ok(message) => Some(message),
            Err(err) => {
                tracing::warn!(error = %err, "failed to notify admin channel");
                None
            }
        };

        self.leaves.lock().await.insert(
            actor,
            LeaveRecord {
                duration,
                end_date,
                admin_message,
            },
        );

        let confirm = Payload::new("🎉 Заявка на отпуск принята!", colors::SUCCESS)
            .description(format!(
                "**{}, вы получили роль 🏖️ В отпуске!**\n\n\
                 **📅 Период отпуска:** {}\n\
                 **⏰ Дата окончания:** {}\n\n\
                 Для досрочного возвращения используйте команду `!вернулся`\n\
                 **Хорошего отдыха! 🌴☀️**",
                actor.mention(),
                duration.display(),
                end_date.format("%d.%m.%Y в %H:%M")
            ));
        self.post_sticky(channel, confirm).await;
        Ok(())
    }

    async fn cmd_return(
        &self,
        actor: MemberId,
        channel: ChannelId,
    ) -> Result<(), BotError> {
        let role = self.config.leave.role;
        let held = match self.gateway.role(role).await {
            Ok(_) => self.gateway.member_has_role(actor, role).await?,
            Err(err) if err.is_not_found() => false,
            Err(err) => return Err(err.into()),
        };
        if !held {
            let payload = error_payload("❌ Ошибка", "У вас нет роли отпуска.");
            self.post_notice(channel, payload, TTL_BRIEF).await;
            return Ok(());
        }

        if let Err(err) = self.revoke_role_checked(actor, role).await {
            self.post_notice(channel, role_failure("отпуска", &err), TTL_SHORT)
                .await;
            return Ok(());
        }

        if let Some(record) = self.leaves.lock().await.remove(actor) {
            if let Some(message) = record.admin_message {
                match self
                    .gateway
                    .delete_message(self.config.leave.admin_channel, message)
                    .await
                {
                    Ok(()) => {}
                    Err(err) if err.is_not_found() => {}
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to withdraw admin notice");
                    }
                }
            }
        }

        let payload = Payload::new("🎉 Добро пожаловать обратно!", colors::SUCCESS)
            .description(format!(
                "**{}, рады вашему возвращению!**\n\n\
                 Роль **🏖️ В отпуске** была успешно снята.\n\
                 Приятной игры! 🎮",
                actor.mention()
            ));
        self.post_sticky(channel, payload).await;
        Ok(())
    }

    // -- Player search -----------------------------------------------------

    async fn cmd_search(
        &self,
        actor: MemberId,
        channel: ChannelId,
        args: &str,
    ) -> Result<(), BotError> {
        let description = match args.trim() {
            "" => "Ищем игроков!",
            text => text,
        };

        match self.search.create(actor, description).await {
            Ok(message) => {
                tracing::debug!(%actor, %message, "search announcement posted");
                Ok(())
            }
            Err(SearchError::AlreadySearching(_)) => {
                let payload = error_payload(
                    "❌ Ошибка",
                    "У вас уже есть активный поиск! Завершите его перед созданием нового.",
                );
                self.post_notice(channel, payload, TTL_BRIEF).await;
                Ok(())
            }
            Err(SearchError::NotInVoice(_)) => {
                let payload = error_payload(
                    "❌ Ошибка",
                    "Вы должны находиться в голосовом канале для создания поиска!",
                );
                self.post_notice(channel, payload, TTL_BRIEF).await;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    // -- Posting helpers ---------------------------------------------------

    async fn post_notice(
        &self,
        channel: ChannelId,
        payload: Payload,
        ttl: Duration,
    ) {
        if let Err(err) = self.gateway.post_transient(channel, payload, ttl).await
        {
            tracing::warn!(%channel, error = %err, "failed to post notice");
        }
    }

    async fn post_sticky(&self, channel: ChannelId, payload: Payload) {
        if let Err(err) = self.gateway.post(channel, payload).await {
            tracing::warn!(%channel, error = %err, "failed to post message");
        }
    }
}

/// The rejection payload for a bad verification string.
fn nick_rejection(reason: NickFormat) -> Payload {
    match reason {
        NickFormat::Malformed => error_payload(
            "❌ Неверный формат",
            "**Правильный формат:** `никнейм (имя)`\n\n\
             **Пример:** `!verify PlayerName (Алексей)`\n\n\
             **Ошибки:**\n\
             • Используйте английские буквы для ника\n\
             • Используйте русские буквы для имени\n\
             • Не забудьте скобки вокруг имени",
        ),
        NickFormat::NicknameLength => error_payload(
            "❌ Ошибка в никнейме",
            "Никнейм должен быть от 3 до 20 символов",
        ),
        NickFormat::NameLength => error_payload(
            "❌ Ошибка в имени",
            "Имя должно быть от 2 до 15 символов",
        ),
    }
}

/// The failure payload for a role grant/revoke that didn't go through.
fn role_failure(what: &str, err: &GatewayError) -> Payload {
    match err {
        GatewayError::NotFound { .. } => error_payload(
            "❌ Ошибка сервера",
            format!("Роль {what} не найдена! Обратитесь к администратору."),
        ),
        GatewayError::Permission(_) => error_payload(
            "❌ Ошибка прав",
            format!("Не удалось изменить роль {what}. Проверьте права бота."),
        ),
        _ => error_payload("❌ Ошибка", "Произошла ошибка. Попробуйте позже."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parse_known_names() {
        assert_eq!(Command::parse("verify"), Some(Command::Verify));
        assert_eq!(Command::parse("сменить_ник"), Some(Command::ChangeNick));
        assert_eq!(Command::parse("отпуск"), Some(Command::Leave));
        assert_eq!(Command::parse("вернулся"), Some(Command::Return));
        assert_eq!(Command::parse("i"), Some(Command::Search));
        assert_eq!(Command::parse("поиск"), Some(Command::Search));
    }

    #[test]
    fn test_command_parse_unknown_is_none() {
        assert_eq!(Command::parse("help"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn test_help_commands_have_no_cooldown() {
        assert_eq!(Command::Instruction.cooldown(), None);
        assert_eq!(Command::VerificationHelp.cooldown(), None);
        assert!(Command::Verify.cooldown().is_some());
    }

    #[test]
    fn test_parse_mention_variants() {
        assert_eq!(parse_mention("<@123>"), Some(MemberId(123)));
        assert_eq!(parse_mention("<@!123>"), Some(MemberId(123)));
        assert_eq!(parse_mention(" <@7> "), Some(MemberId(7)));
        assert_eq!(parse_mention("123"), None);
        assert_eq!(parse_mention(""), None);
    }
}
