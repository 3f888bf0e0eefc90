//! Conversation ledger behaviour.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::thread;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use rstest::rstest;

use super::{Harness, fixture_timestamp, harness};
use crate::domain::ports::{
    Conversations, IdentityRegistry, RecordingNotificationSink, ScriptedPublicIds, SocialGraph,
};
use crate::domain::{
    ErrorCode, LaunchIdentity, NotificationKind, PlatformId, PublicId, Reaction, SocialStore,
};

fn ledger_len(h: &Harness, owner: PublicId, partner: PublicId) -> usize {
    h.store
        .read_conversation(owner, partner)
        .expect("ledger readable")
        .len()
}

#[rstest]
fn append_stores_read_and_unread_copies(harness: Harness) {
    let (ada, ben, _) = harness.trio();
    let sent = harness
        .store
        .append_message(ada, ben, "hi ben")
        .expect("message stored");
    assert!(!sent.unread);
    assert!(sent.id.is_some());

    let snapshot = harness.store.snapshot();
    let find = |id: PublicId| {
        snapshot
            .accounts
            .iter()
            .find(|a| a.public_id() == id)
            .expect("account in snapshot")
    };
    let ada_copy = &find(ada).ledgers[&ben][0];
    let ben_copy = &find(ben).ledgers[&ada][0];

    assert!(!ada_copy.unread);
    assert!(ben_copy.unread);
    assert_eq!(ada_copy.text, ben_copy.text);
    assert_eq!(ada_copy.timestamp, ben_copy.timestamp);
    assert_eq!(ada_copy.id, ben_copy.id);
    assert_eq!(ada_copy, &sent);
}

#[rstest]
fn append_notifies_receiver(harness: Harness) {
    let (ada, ben, _) = harness.trio();
    harness.store.append_message(ada, ben, "hi").expect("stored");

    let sent = harness.sink.take();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, PlatformId::new(2));
    assert_eq!(sent[0].kind, NotificationKind::NewMessage { from: "Ada".into() });
}

#[rstest]
fn append_rejects_self_unknown_and_blocked(harness: Harness) {
    let (ada, ben, cy) = harness.trio();

    let err = harness.store.append_message(ada, ada, "me").expect_err("self");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    let ghost = PublicId::new(98_765_432).expect("in range");
    let err = harness.store.append_message(ada, ghost, "hi").expect_err("ghost");
    assert_eq!(err.code(), ErrorCode::NotFound);

    harness.store.block(ben, ada).expect("ben blocks ada");
    let err = harness.store.append_message(ada, ben, "hi").expect_err("blocked");
    assert_eq!(err.code(), ErrorCode::Blocked);
    assert_eq!(err.message(), "you have been blocked by this user");

    harness.store.block(ada, cy).expect("ada blocks cy");
    let err = harness.store.append_message(ada, cy, "hi").expect_err("blocked");
    assert_eq!(err.message(), "you must unblock this user first");

    // Only the two block notices went out; rejected sends stay silent.
    assert!(
        harness
            .sink
            .take()
            .iter()
            .all(|note| !matches!(note.kind, NotificationKind::NewMessage { .. }))
    );
    assert_eq!(ledger_len(&harness, ada, ben), 0);
}

#[rstest]
fn read_marks_messages_read(harness: Harness) {
    let (ada, ben, _) = harness.trio();
    harness.store.append_message(ada, ben, "one").expect("stored");
    harness.clock.advance_seconds(1);
    harness.store.append_message(ada, ben, "two").expect("stored");

    let previews = harness.store.list_conversations(ben).expect("previews");
    assert_eq!(previews[0].unread_count, 2);

    let messages = harness.store.read_conversation(ben, ada).expect("read");
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| !m.unread));

    let previews = harness.store.list_conversations(ben).expect("previews");
    assert_eq!(previews[0].unread_count, 0);
}

#[rstest]
fn read_missing_ledger_is_empty(harness: Harness) {
    let (ada, ben, _) = harness.trio();
    assert!(harness
        .store
        .read_conversation(ada, ben)
        .expect("read")
        .is_empty());
}

#[rstest]
fn list_sorts_newest_first_with_names(harness: Harness) {
    let (ada, ben, cy) = harness.trio();
    harness.store.append_message(ada, ben, "older").expect("stored");
    harness.clock.advance_seconds(60);
    harness.store.append_message(cy, ada, "newer").expect("stored");

    let previews = harness.store.list_conversations(ada).expect("previews");
    assert_eq!(previews.len(), 2);
    assert_eq!(previews[0].partner_id, cy);
    assert_eq!(previews[0].partner_name, "Cy");
    assert_eq!(previews[0].last_text.as_deref(), Some("newer"));
    assert_eq!(previews[0].unread_count, 1);
    assert_eq!(previews[1].partner_id, ben);
    assert_eq!(previews[1].unread_count, 0);
}

#[rstest]
fn delete_only_removes_callers_ledger(harness: Harness) {
    let (ada, ben, _) = harness.trio();
    harness.store.append_message(ada, ben, "hi").expect("stored");

    harness.store.delete_conversation(ada, ben).expect("deleted");
    assert_eq!(ledger_len(&harness, ada, ben), 0);
    assert_eq!(ledger_len(&harness, ben, ada), 1);

    let err = harness
        .store
        .delete_conversation(ada, ben)
        .expect_err("already deleted");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
fn react_mirrors_onto_partner_copy(harness: Harness) {
    let (ada, ben, _) = harness.trio();
    harness.store.append_message(ada, ben, "first").expect("stored");
    harness.clock.advance_seconds(1);
    harness.store.append_message(ben, ada, "second").expect("stored");

    harness.store.react(ada, ben, "👍").expect("reacted");
    let updated = harness.store.react(ada, ben, "🔥").expect("replaced");
    harness.store.react(ben, ada, "😂").expect("partner reacts");

    assert_eq!(updated.text, "second");
    assert_eq!(
        updated.reactions,
        vec![Reaction {
            reactor_id: ada,
            emoji: "🔥".into()
        }]
    );

    let ada_side = harness.store.read_conversation(ada, ben).expect("read");
    let ben_side = harness.store.read_conversation(ben, ada).expect("read");
    let expected = vec![
        Reaction {
            reactor_id: ada,
            emoji: "🔥".into(),
        },
        Reaction {
            reactor_id: ben,
            emoji: "😂".into(),
        },
    ];
    assert_eq!(ada_side[1].reactions, expected);
    assert_eq!(ben_side[1].reactions, expected);
    assert!(ada_side[0].reactions.is_empty());
}

#[rstest]
fn react_without_partner_copy_only_updates_caller(harness: Harness) {
    let (ada, ben, _) = harness.trio();
    harness.store.append_message(ada, ben, "hi").expect("stored");
    harness.store.delete_conversation(ben, ada).expect("ben deletes");

    let updated = harness.store.react(ada, ben, "👍").expect("reacted");
    assert_eq!(updated.reactions.len(), 1);
    assert_eq!(ledger_len(&harness, ben, ada), 0);
}

#[rstest]
fn react_on_empty_ledger_is_not_found(harness: Harness) {
    let (ada, ben, _) = harness.trio();
    let err = harness.store.react(ada, ben, "👍").expect_err("no history");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

/// Clock that moves forward one millisecond on every read.
struct TickingClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl Clock for TickingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + TimeDelta::milliseconds(tick)
    }
}

#[rstest]
fn concurrent_sends_keep_ledger_in_time_order() {
    let store = SocialStore::new(
        Arc::new(ScriptedPublicIds::sequential()),
        Arc::new(TickingClock {
            start: fixture_timestamp(),
            ticks: AtomicI64::new(0),
        }),
        Arc::new(RecordingNotificationSink::default()),
    );
    let [ada, ben] = [(1, "Ada"), (2, "Ben")].map(|(platform_id, name)| {
        let mut identity = LaunchIdentity::new(PlatformId::new(platform_id));
        identity.first_name = Some(name.to_owned());
        store.resolve_or_create(&identity).expect("registered")
    });

    thread::scope(|scope| {
        for worker in 0..8 {
            let store = &store;
            scope.spawn(move || {
                for n in 0..25 {
                    store
                        .append_message(ada, ben, &format!("{worker}-{n}"))
                        .expect("stored");
                }
            });
        }
    });

    for (owner, partner) in [(ada, ben), (ben, ada)] {
        let ledger = store.read_conversation(owner, partner).expect("ledger");
        assert_eq!(ledger.len(), 200);
        assert!(
            ledger.windows(2).all(|pair| pair[0].timestamp < pair[1].timestamp),
            "ledger order must match timestamp order"
        );
    }
}
