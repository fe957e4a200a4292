//! Integration tests for the search subsystem against the in-memory
//! gateway. The reconciler is driven as synchronous passes except for
//! one spawned-task test under paused time.

use std::sync::Arc;
use std::time::Duration;

use voicekeeper_gateway::{Gateway, InMemoryGateway};
use voicekeeper_protocol::{ChannelId, MemberId, Payload};
use voicekeeper_search::{
    spawn_reconciler, ReconcileSummary, SearchConfig, SearchError,
    SearchService,
};

const ANNOUNCE: ChannelId = ChannelId(900);

struct Fixture {
    gateway: Arc<InMemoryGateway>,
    service: Arc<SearchService<InMemoryGateway>>,
    voice: ChannelId,
}

async fn fixture(user_limit: u32) -> Fixture {
    let gateway = Arc::new(InMemoryGateway::new());
    let voice = gateway.seed_voice_channel("👥Дуо 1", user_limit, None).await;
    let service = Arc::new(SearchService::new(
        Arc::clone(&gateway),
        SearchConfig::new(ANNOUNCE),
    ));
    Fixture {
        gateway,
        service,
        voice,
    }
}

/// The single announcement currently posted, panicking if there are
/// zero or several.
async fn announcement(fx: &Fixture) -> Payload {
    let messages = fx.gateway.messages_in(ANNOUNCE).await;
    assert_eq!(messages.len(), 1, "expected exactly one announcement");
    messages.into_iter().next().map(|(_, p)| p).expect("just checked")
}

// =========================================================================
// Creation
// =========================================================================

#[tokio::test]
async fn test_create_requires_voice_presence() {
    let fx = fixture(2).await;

    let err = fx.service.create(MemberId(1), "го").await.unwrap_err();

    assert!(matches!(err, SearchError::NotInVoice(MemberId(1))));
    assert!(fx.gateway.messages_in(ANNOUNCE).await.is_empty());
}

#[tokio::test]
async fn test_create_rejects_second_session() {
    let fx = fixture(2).await;
    fx.gateway.connect(MemberId(1), fx.voice).await;
    fx.service.create(MemberId(1), "го").await.unwrap();

    let err = fx.service.create(MemberId(1), "еще раз").await.unwrap_err();
    assert!(matches!(err, SearchError::AlreadySearching(MemberId(1))));
}

#[tokio::test]
async fn test_created_announcement_shows_channel_and_respondents() {
    let fx = fixture(2).await;
    let owner = MemberId(1);
    let buddy = MemberId(2);
    let responder = MemberId(3);
    fx.gateway.connect(owner, fx.voice).await;
    fx.gateway.connect(buddy, fx.voice).await;

    fx.service.create(owner, "нужен еще один").await.unwrap();
    fx.service.opt_in(owner, responder).await.unwrap();

    let payload = announcement(&fx).await;
    assert_eq!(payload.title, "🎯 ПОИСК ИГРОКОВ");
    assert!(payload.description.contains("<@1> ищет команду!"));
    assert!(payload.description.contains("нужен еще один"));

    let in_channel = payload.field_named("👥 В КАНАЛЕ (2)").unwrap();
    assert!(in_channel.value.contains("<@1>"));
    assert!(in_channel.value.contains("<@2>"));

    let responded = payload.field_named("🎮 ОТКЛИКНУЛИСЬ (1)").unwrap();
    assert_eq!(responded.value, "• <@3>");
}

// =========================================================================
// Opt-in / opt-out / cancel
// =========================================================================

#[tokio::test]
async fn test_opt_out_removes_respondent_from_render() {
    let fx = fixture(2).await;
    let owner = MemberId(1);
    fx.gateway.connect(owner, fx.voice).await;
    fx.service.create(owner, "го").await.unwrap();

    fx.service.opt_in(owner, MemberId(3)).await.unwrap();
    fx.service.opt_out(owner, MemberId(3)).await.unwrap();

    let payload = announcement(&fx).await;
    let responded = payload.field_named("🎮 ОТКЛИКНУЛИСЬ").unwrap();
    assert_eq!(responded.value, "*Пока никто*");
}

#[tokio::test]
async fn test_cancel_by_non_owner_rejected() {
    let fx = fixture(2).await;
    let owner = MemberId(1);
    fx.gateway.connect(owner, fx.voice).await;
    fx.service.create(owner, "го").await.unwrap();

    let err = fx.service.cancel(owner, MemberId(2)).await.unwrap_err();

    assert!(matches!(err, SearchError::NotOwner));
    assert_eq!(fx.gateway.messages_in(ANNOUNCE).await.len(), 1);
}

#[tokio::test]
async fn test_owner_cancel_deletes_announcement_and_deregisters() {
    let fx = fixture(2).await;
    let owner = MemberId(1);
    fx.gateway.connect(owner, fx.voice).await;
    fx.service.create(owner, "го").await.unwrap();

    fx.service.cancel(owner, owner).await.unwrap();

    assert!(fx.gateway.messages_in(ANNOUNCE).await.is_empty());
    assert!(fx.service.board().lock().await.is_empty());

    // Cancelling again reports no active session, not a crash.
    let err = fx.service.cancel(owner, owner).await.unwrap_err();
    assert!(matches!(err, SearchError::NoActiveSession(_)));
}

#[tokio::test]
async fn test_voice_leave_retires_owned_session() {
    let fx = fixture(2).await;
    let owner = MemberId(1);
    fx.gateway.connect(owner, fx.voice).await;
    fx.service.create(owner, "го").await.unwrap();

    fx.gateway.disconnect(owner).await;
    assert!(fx.service.retire_if_owner(owner).await);

    assert!(fx.gateway.messages_in(ANNOUNCE).await.is_empty());
    assert!(!fx.service.retire_if_owner(owner).await);
}

// =========================================================================
// Reconciliation
// =========================================================================

#[tokio::test]
async fn test_pass_retires_session_when_owner_left_channel() {
    let fx = fixture(2).await;
    let owner = MemberId(1);
    fx.gateway.connect(owner, fx.voice).await;
    fx.service.create(owner, "го").await.unwrap();
    fx.gateway.disconnect(owner).await;

    let summary = fx.service.reconcile_pass().await;

    assert_eq!(
        summary,
        ReconcileSummary {
            retired: 1,
            refreshed: 0
        }
    );
    assert!(fx.gateway.messages_in(ANNOUNCE).await.is_empty());

    // Later opt-ins find nothing to act on.
    let err = fx.service.opt_in(owner, MemberId(2)).await.unwrap_err();
    assert!(matches!(err, SearchError::NoActiveSession(_)));
}

#[tokio::test]
async fn test_pass_retires_session_when_channel_deleted() {
    let fx = fixture(2).await;
    let owner = MemberId(1);
    fx.gateway.connect(owner, fx.voice).await;
    fx.service.create(owner, "го").await.unwrap();

    fx.gateway.delete_channel(fx.voice).await.unwrap();
    let summary = fx.service.reconcile_pass().await;

    assert_eq!(summary.retired, 1);
    assert!(fx.service.board().lock().await.is_empty());
}

#[tokio::test]
async fn test_pass_refreshes_live_session_with_current_occupancy() {
    let fx = fixture(4).await;
    let owner = MemberId(1);
    fx.gateway.connect(owner, fx.voice).await;
    fx.service.create(owner, "го").await.unwrap();

    // Someone wanders in after the announcement went up.
    fx.gateway.connect(MemberId(2), fx.voice).await;
    let summary = fx.service.reconcile_pass().await;

    assert_eq!(summary.refreshed, 1);
    let payload = announcement(&fx).await;
    assert!(payload.field_named("👥 В КАНАЛЕ (2)").is_some());
}

#[tokio::test]
async fn test_pass_retires_session_whose_announcement_was_deleted() {
    let fx = fixture(2).await;
    let owner = MemberId(1);
    fx.gateway.connect(owner, fx.voice).await;
    let message = fx.service.create(owner, "го").await.unwrap();

    // A moderator removes the announcement by hand.
    fx.gateway.delete_message(ANNOUNCE, message).await.unwrap();
    let summary = fx.service.reconcile_pass().await;

    assert_eq!(summary.retired, 1);
    assert!(fx.service.board().lock().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_spawned_reconciler_retires_after_one_period() {
    let fx = fixture(2).await;
    let owner = MemberId(1);
    fx.gateway.connect(owner, fx.voice).await;
    fx.service.create(owner, "го").await.unwrap();
    fx.gateway.disconnect(owner).await;

    let handle = spawn_reconciler(Arc::clone(&fx.service));

    // Start jitter is under two seconds and the first tick fires
    // immediately after it, so one simulated period is plenty.
    tokio::time::sleep(SearchConfig::DEFAULT_PERIOD + Duration::from_secs(5)).await;

    assert!(fx.service.board().lock().await.is_empty());
    handle.shutdown().await;
}
