//! Unit tests for the social store.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rstest::fixture;

use super::SocialStore;
use crate::domain::ports::{IdentityRegistry, RecordingNotificationSink, ScriptedPublicIds};
use crate::domain::{LaunchIdentity, PlatformId, PublicId};
use crate::test_support::MutableClock;

mod conversations;

pub(super) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("fixture timestamp is unambiguous")
}

pub(super) struct Harness {
    pub store: SocialStore,
    pub clock: Arc<MutableClock>,
    pub sink: Arc<RecordingNotificationSink>,
}

impl Harness {
    pub fn register(&self, platform_id: i64, name: &str) -> PublicId {
        let mut identity = LaunchIdentity::new(PlatformId::new(platform_id));
        identity.first_name = Some(name.to_owned());
        self.store
            .resolve_or_create(&identity)
            .expect("registration succeeds")
    }

    /// Register three users: Ada (1), Ben (2) and Cy (3).
    pub fn trio(&self) -> (PublicId, PublicId, PublicId) {
        (
            self.register(1, "Ada"),
            self.register(2, "Ben"),
            self.register(3, "Cy"),
        )
    }
}

#[fixture]
pub(super) fn harness() -> Harness {
    let clock = Arc::new(MutableClock::new(fixture_timestamp()));
    let sink = Arc::new(RecordingNotificationSink::default());
    let store = SocialStore::new(
        Arc::new(ScriptedPublicIds::sequential()),
        clock.clone(),
        sink.clone(),
    );
    Harness { store, clock, sink }
}
