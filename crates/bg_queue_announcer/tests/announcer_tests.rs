//! Integration tests for queue and start announcements
//!
//! A recording host stands in for the game server: it records every chat
//! delivery so the tests can assert on what players would see.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use bg_queue_announcer::messages::strip_color_codes;
use bg_queue_announcer::timer::TIMER_INACTIVE;
use bg_queue_announcer::{
    Battleground, BattlegroundQueue, BattlegroundTypeId, BgQueueAnnouncer, BracketEntry,
    BracketId, BroadcastFilter, ChatError, HostContext, Player, PlayerGuid,
    QueueAnnounceDecision, Settings, Team,
};
use parking_lot::Mutex;

const START: u64 = 1_700_000_000;

#[derive(Debug, Clone, PartialEq)]
enum Sent {
    Whisper(PlayerGuid, String),
    World(String, BroadcastFilter),
}

struct RecordingHost {
    now: AtomicU64,
    sent: Mutex<Vec<Sent>>,
    fail_delivery: bool,
}

impl RecordingHost {
    fn new() -> Self {
        Self {
            now: AtomicU64::new(START),
            sent: Mutex::new(Vec::new()),
            fail_delivery: false,
        }
    }

    fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock())
    }
}

impl HostContext for RecordingHost {
    fn game_time(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn send_to_player(&self, player: PlayerGuid, text: &str) -> Result<(), ChatError> {
        if self.fail_delivery {
            return Err(ChatError::RecipientOffline(player));
        }
        self.sent
            .lock()
            .push(Sent::Whisper(player, strip_color_codes(text)));
        Ok(())
    }

    fn broadcast(&self, text: &str, filter: BroadcastFilter) -> Result<(), ChatError> {
        if self.fail_delivery {
            return Err(ChatError::Delivery("world channel closed".to_string()));
        }
        self.sent
            .lock()
            .push(Sent::World(strip_color_codes(text), filter));
        Ok(())
    }
}

struct TestPlayer(PlayerGuid);

impl Player for TestPlayer {
    fn guid(&self) -> PlayerGuid {
        self.0
    }

    fn name(&self) -> &str {
        "Leader"
    }
}

struct TestBattleground {
    name: &'static str,
    type_id: BattlegroundTypeId,
    arena: bool,
    min_level: u32,
    max_level: u32,
    per_team: u32,
}

impl TestBattleground {
    fn warsong() -> Self {
        Self {
            name: "Warsong Gulch",
            type_id: BattlegroundTypeId::WarsongGulch,
            arena: false,
            min_level: 10,
            max_level: 19,
            per_team: 5,
        }
    }

    fn random() -> Self {
        Self {
            name: "Random Battleground",
            type_id: BattlegroundTypeId::RandomBattleground,
            arena: false,
            min_level: 80,
            max_level: 80,
            per_team: 10,
        }
    }

    fn arena() -> Self {
        Self {
            name: "Nagrand Arena",
            type_id: BattlegroundTypeId::NagrandArena,
            arena: true,
            min_level: 80,
            max_level: 80,
            per_team: 2,
        }
    }
}

impl Battleground for TestBattleground {
    fn name(&self) -> &str {
        self.name
    }

    fn type_id(&self) -> BattlegroundTypeId {
        self.type_id
    }

    fn is_arena(&self) -> bool {
        self.arena
    }

    fn min_level(&self) -> u32 {
        self.min_level
    }

    fn max_level(&self) -> u32 {
        self.max_level
    }

    fn min_players_per_team(&self, _bracket: &BracketEntry) -> u32 {
        self.per_team
    }
}

#[derive(Default)]
struct TestQueue {
    counts: HashMap<(BracketId, Team), u32>,
}

impl TestQueue {
    fn with(bracket: BracketId, alliance: u32, horde: u32) -> Self {
        let mut counts = HashMap::new();
        counts.insert((bracket, Team::Alliance), alliance);
        counts.insert((bracket, Team::Horde), horde);
        Self { counts }
    }
}

impl BattlegroundQueue for TestQueue {
    fn players_in_queue(&self, bracket: BracketId, team: Team) -> u32 {
        self.counts.get(&(bracket, team)).copied().unwrap_or(0)
    }
}

fn enabled() -> Settings {
    Settings {
        enabled: true,
        ..Settings::default()
    }
}

fn low_bracket() -> BracketEntry {
    BracketEntry {
        id: BracketId(1),
        min_level: 10,
        max_level: 19,
    }
}

fn max_bracket() -> BracketEntry {
    BracketEntry {
        id: BracketId(15),
        min_level: 80,
        max_level: 84,
    }
}

#[test]
fn test_second_call_within_delay_is_denied_and_keeps_timestamp() {
    let announcer = BgQueueAnnouncer::with_settings(enabled());
    let player = TestPlayer(PlayerGuid(1));

    assert!(announcer.can_announce(&player, None, 10, 1, START));
    assert!(!announcer.can_announce(&player, None, 10, 1, START + 29));
    assert_eq!(
        announcer.spam_protection().last_announcement(PlayerGuid(1)),
        START
    );
}

#[test]
fn test_call_exactly_after_delay_is_allowed() {
    let announcer = BgQueueAnnouncer::with_settings(enabled());
    let player = TestPlayer(PlayerGuid(2));

    assert!(announcer.can_announce(&player, None, 10, 1, START));
    assert!(announcer.can_announce(&player, None, 10, 1, START + 30));
    assert_eq!(
        announcer.spam_protection().last_announcement(PlayerGuid(2)),
        START + 30
    );
}

#[test]
fn test_small_random_queue_is_denied_at_max_level() {
    let announcer = BgQueueAnnouncer::with_settings(Settings {
        limit_min_level: 80,
        limit_min_players: 3,
        ..enabled()
    });
    let player = TestPlayer(PlayerGuid(3));
    let bg = TestBattleground::random();

    assert!(!announcer.can_announce(&player, Some(&bg), 80, 2, START + 1_000));
    assert_eq!(announcer.spam_protection().last_announcement(PlayerGuid(3)), 0);

    assert!(announcer.can_announce(&player, Some(&bg), 80, 3, START + 1_000));
    assert_eq!(
        announcer.spam_protection().last_announcement(PlayerGuid(3)),
        START + 1_000
    );
}

#[test]
fn test_limit_only_applies_to_limited_type() {
    let announcer = BgQueueAnnouncer::with_settings(Settings {
        limit_min_level: 10,
        limit_min_players: 3,
        ..enabled()
    });
    let bg = TestBattleground::warsong();

    // Below max level the limited type is Warsong Gulch.
    assert!(!announcer.can_announce(&TestPlayer(PlayerGuid(4)), Some(&bg), 10, 1, START));
    // A max level bracket limits the random queue instead.
    assert!(announcer.can_announce(&TestPlayer(PlayerGuid(4)), Some(&bg), 80, 1, START));
    // Bracket below the configured minimum level is never limited.
    assert!(announcer.can_announce(&TestPlayer(PlayerGuid(5)), Some(&bg), 9, 1, START));
}

#[test]
fn test_timer_accessors() {
    let announcer = BgQueueAnnouncer::new();
    let bracket = BracketId(6);

    assert_eq!(announcer.get_announcement_timer(bracket), TIMER_INACTIVE);
    announcer.update_announcement_timer(bracket, 1_000);
    assert_eq!(announcer.get_announcement_timer(bracket), TIMER_INACTIVE);

    announcer.set_announcement_timer(bracket, 30_000);
    assert_eq!(announcer.get_announcement_timer(bracket), 30_000);
    announcer.update_announcement_timer(bracket, 1_000);
    assert_eq!(announcer.get_announcement_timer(bracket), 29_000);
}

#[test]
fn test_disabled_module_defers_to_host() {
    let announcer = BgQueueAnnouncer::new();
    let host = RecordingHost::new();
    let queue = TestQueue::with(BracketId(1), 4, 4);
    let bg = TestBattleground::warsong();

    let decision = announcer.on_queue_update(
        &queue,
        &TestPlayer(PlayerGuid(1)),
        Some(&bg),
        &low_bracket(),
        &host,
    );

    assert_eq!(decision, QueueAnnounceDecision::HostDefault);
    assert!(decision.allows_host_announcement());
    assert!(host.take().is_empty());
    assert!(announcer.spam_protection().is_empty());
}

#[test]
fn test_missing_battleground_and_arena_defer_to_host() {
    let announcer = BgQueueAnnouncer::with_settings(enabled());
    let host = RecordingHost::new();
    let queue = TestQueue::with(BracketId(15), 1, 1);
    let leader = TestPlayer(PlayerGuid(1));

    let decision = announcer.on_queue_update(&queue, &leader, None, &max_bracket(), &host);
    assert_eq!(decision, QueueAnnounceDecision::HostDefault);

    let arena = TestBattleground::arena();
    let decision = announcer.on_queue_update(&queue, &leader, Some(&arena), &max_bracket(), &host);
    assert_eq!(decision, QueueAnnounceDecision::HostDefault);
    assert!(host.take().is_empty());
}

#[test]
fn test_player_only_whispers_leader() {
    let announcer = BgQueueAnnouncer::with_settings(Settings {
        player_only: true,
        timed: true,
        ..enabled()
    });
    let host = RecordingHost::new();
    let queue = TestQueue::with(BracketId(15), 3, 4);
    let bg = TestBattleground::random();

    let decision = announcer.on_queue_update(
        &queue,
        &TestPlayer(PlayerGuid(8)),
        Some(&bg),
        &max_bracket(),
        &host,
    );

    assert_eq!(decision, QueueAnnounceDecision::Suppress);
    assert_eq!(
        host.take(),
        vec![Sent::Whisper(
            PlayerGuid(8),
            "[BG Queue] Random Battleground (Lvl 80-80) - Alliance: 3 Horde: 4 [7/20]".to_string()
        )]
    );
    // Player-only mode takes precedence over timed mode.
    assert_eq!(announcer.get_announcement_timer(BracketId(15)), TIMER_INACTIVE);
}

#[test]
fn test_immediate_mode_broadcasts_then_throttles() {
    let announcer = BgQueueAnnouncer::with_settings(enabled());
    let host = RecordingHost::new();
    let queue = TestQueue::with(BracketId(1), 2, 1);
    let bg = TestBattleground::warsong();
    let leader = TestPlayer(PlayerGuid(21));

    let decision = announcer.on_queue_update(&queue, &leader, Some(&bg), &low_bracket(), &host);
    assert_eq!(decision, QueueAnnounceDecision::Suppress);
    assert_eq!(
        host.take(),
        vec![Sent::World(
            "[BG Queue Announcer] Warsong Gulch (Lvl 10-19) - A: 2 H: 1 [3/10 players]".to_string(),
            BroadcastFilter::All
        )]
    );

    host.advance(10);
    let decision = announcer.on_queue_update(&queue, &leader, Some(&bg), &low_bracket(), &host);
    assert_eq!(decision, QueueAnnounceDecision::Suppress);
    assert!(host.take().is_empty());

    host.advance(20);
    announcer.on_queue_update(&queue, &leader, Some(&bg), &low_bracket(), &host);
    assert_eq!(host.take().len(), 1);
}

#[test]
fn test_immediate_mode_respects_opt_out_filter() {
    let announcer = BgQueueAnnouncer::with_settings(Settings {
        respect_announcer_opt_out: true,
        ..enabled()
    });
    let host = RecordingHost::new();
    let queue = TestQueue::with(BracketId(1), 1, 0);
    let bg = TestBattleground::warsong();

    announcer.on_queue_update(&queue, &TestPlayer(PlayerGuid(1)), Some(&bg), &low_bracket(), &host);
    assert!(matches!(
        host.take().as_slice(),
        [Sent::World(_, BroadcastFilter::SkipAnnouncerOptOut)]
    ));
}

#[test]
fn test_bracket_levels_are_clamped() {
    let announcer = BgQueueAnnouncer::with_settings(enabled());
    let host = RecordingHost::new();
    let queue = TestQueue::with(BracketId(15), 0, 1);
    let bg = TestBattleground::random();

    announcer.on_queue_update(&queue, &TestPlayer(PlayerGuid(1)), Some(&bg), &max_bracket(), &host);
    match host.take().as_slice() {
        [Sent::World(text, _)] => assert!(text.contains("(Lvl 80-80)")),
        other => panic!("unexpected deliveries: {:?}", other),
    }
}

#[test]
fn test_timed_mode_batches_until_countdown_expires() {
    let announcer = BgQueueAnnouncer::with_settings(Settings {
        timed: true,
        timer_ms: 10_000,
        ..enabled()
    });
    let host = RecordingHost::new();
    let bg = TestBattleground::warsong();
    let bracket = low_bracket();

    let decision = announcer.on_queue_update(
        &TestQueue::with(bracket.id, 1, 0),
        &TestPlayer(PlayerGuid(1)),
        Some(&bg),
        &bracket,
        &host,
    );
    assert_eq!(decision, QueueAnnounceDecision::Suppress);
    assert_eq!(announcer.get_announcement_timer(bracket.id), 10_000);
    assert!(host.take().is_empty());

    announcer.on_world_update(4_000, &host);
    announcer.on_queue_update(
        &TestQueue::with(bracket.id, 2, 3),
        &TestPlayer(PlayerGuid(2)),
        Some(&bg),
        &bracket,
        &host,
    );
    // The running countdown is not restarted by later updates.
    assert_eq!(announcer.get_announcement_timer(bracket.id), 6_000);
    assert!(host.take().is_empty());

    announcer.on_world_update(6_000, &host);
    assert!(host.take().is_empty());

    announcer.on_world_update(50, &host);
    assert_eq!(
        host.take(),
        vec![Sent::World(
            "[BG Queue Announcer] Warsong Gulch (Lvl 10-19) - A: 2 H: 3 [5/10 players]".to_string(),
            BroadcastFilter::All
        )]
    );
    assert!(announcer.pending_announcement(bracket.id).is_none());
    assert!(announcer.get_announcement_timer(bracket.id) < 0);

    announcer.on_world_update(60_000, &host);
    assert!(host.take().is_empty());
}

#[test]
fn test_leaving_timed_mode_drops_pending() {
    let announcer = BgQueueAnnouncer::with_settings(Settings {
        timed: true,
        ..enabled()
    });
    let host = RecordingHost::new();
    let bg = TestBattleground::warsong();
    let bracket = low_bracket();

    announcer.on_queue_update(
        &TestQueue::with(bracket.id, 1, 1),
        &TestPlayer(PlayerGuid(1)),
        Some(&bg),
        &bracket,
        &host,
    );
    assert!(announcer.pending_announcement(bracket.id).is_some());

    announcer.apply_settings(enabled());
    assert!(announcer.pending_announcement(bracket.id).is_none());
    assert_eq!(announcer.get_announcement_timer(bracket.id), TIMER_INACTIVE);
}

#[test]
fn test_pausing_timed_broadcasts_drops_pending() {
    let timed = Settings {
        timed: true,
        timer_ms: 1_000,
        ..enabled()
    };
    let paused = [
        Settings {
            player_only: true,
            ..timed.clone()
        },
        Settings {
            enabled: false,
            ..timed.clone()
        },
    ];
    let bg = TestBattleground::warsong();
    let bracket = low_bracket();

    for settings in paused {
        let announcer = BgQueueAnnouncer::with_settings(timed.clone());
        let host = RecordingHost::new();
        announcer.on_queue_update(
            &TestQueue::with(bracket.id, 1, 1),
            &TestPlayer(PlayerGuid(1)),
            Some(&bg),
            &bracket,
            &host,
        );
        assert!(announcer.pending_announcement(bracket.id).is_some());

        announcer.apply_settings(settings);
        assert!(announcer.pending_announcement(bracket.id).is_none());
        assert_eq!(announcer.get_announcement_timer(bracket.id), TIMER_INACTIVE);

        for _ in 0..100 {
            announcer.on_world_update(60_000, &host);
        }
        host.take();

        // Back in timed mode, nothing queued while paused is broadcast.
        announcer.apply_settings(timed.clone());
        announcer.on_world_update(2_000, &host);
        assert!(host.take().is_empty());
    }
}

#[test]
fn test_battleground_start_announcement() {
    let announcer = BgQueueAnnouncer::with_settings(enabled());
    let host = RecordingHost::new();

    announcer.on_battleground_start(&TestBattleground::warsong(), &host);
    assert_eq!(
        host.take(),
        vec![Sent::World(
            "[BG Started] Warsong Gulch (Lvl 10-19) has begun!".to_string(),
            BroadcastFilter::All
        )]
    );

    announcer.on_battleground_start(&TestBattleground::arena(), &host);
    assert!(host.take().is_empty());
}

#[test]
fn test_battleground_start_gated_by_settings() {
    let host = RecordingHost::new();
    let bg = TestBattleground::warsong();

    BgQueueAnnouncer::new().on_battleground_start(&bg, &host);
    BgQueueAnnouncer::with_settings(Settings {
        on_start_enabled: false,
        ..enabled()
    })
    .on_battleground_start(&bg, &host);

    assert!(host.take().is_empty());
}

#[test]
fn test_delivery_failure_keeps_decision() {
    let announcer = BgQueueAnnouncer::with_settings(Settings {
        player_only: true,
        ..enabled()
    });
    let host = RecordingHost {
        fail_delivery: true,
        ..RecordingHost::new()
    };
    let bg = TestBattleground::warsong();

    let decision = announcer.on_queue_update(
        &TestQueue::with(BracketId(1), 1, 1),
        &TestPlayer(PlayerGuid(1)),
        Some(&bg),
        &low_bracket(),
        &host,
    );
    assert_eq!(decision, QueueAnnounceDecision::Suppress);
}

#[test]
fn test_world_update_sweeps_stale_spam_entries() {
    let announcer = BgQueueAnnouncer::with_settings(enabled());
    let host = RecordingHost::new();
    let player = TestPlayer(PlayerGuid(30));

    assert!(announcer.can_announce(&player, None, 10, 1, START));
    host.advance(120);
    announcer.on_world_update(59_999, &host);
    assert_eq!(announcer.spam_protection().len(), 1);

    announcer.on_world_update(1, &host);
    assert!(announcer.spam_protection().is_empty());
}
