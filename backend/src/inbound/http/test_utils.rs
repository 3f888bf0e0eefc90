//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::{test, web};
use chrono::{DateTime, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{MockConversations, MockIdentityRegistry, MockSocialGraph};
use crate::domain::{LaunchVerifier, PlatformId, PublicId, UserProfile};
use crate::inbound::http::launch::LAUNCH_HEADER;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::test_support::{MutableClock, launch_payload_for};

pub const BOT_TOKEN: &str = "42:handler-test";
pub const CALLER_PLATFORM: i64 = 1001;

pub fn caller_id() -> PublicId {
    PublicId::new(11_111_111).expect("fixture id in range")
}

pub fn other_id() -> PublicId {
    PublicId::new(22_222_222).expect("fixture id in range")
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub fn profile(public_id: PublicId, platform_id: i64, name: &str) -> UserProfile {
    UserProfile::new(public_id, PlatformId::new(platform_id), name, fixed_now())
}

/// Registry mock that authenticates the fixture caller on every request.
pub fn authenticating_registry() -> MockIdentityRegistry {
    let mut registry = MockIdentityRegistry::new();
    registry
        .expect_resolve_or_create()
        .times(0..)
        .returning(|_| Ok(caller_id()));
    registry.expect_touch_activity().times(0..).return_const(());
    registry
}

/// Mock ports bundled into handler state with a clock pinned to
/// [`fixed_now`].
pub struct MockPorts {
    pub registry: MockIdentityRegistry,
    pub graph: MockSocialGraph,
    pub conversations: MockConversations,
}

impl Default for MockPorts {
    fn default() -> Self {
        Self {
            registry: authenticating_registry(),
            graph: MockSocialGraph::new(),
            conversations: MockConversations::new(),
        }
    }
}

impl MockPorts {
    pub fn into_state(self) -> web::Data<HttpState> {
        let ports = HttpStatePorts {
            registry: Arc::new(self.registry),
            graph: Arc::new(self.graph),
            conversations: Arc::new(self.conversations),
        };
        let verifier = LaunchVerifier::new(BOT_TOKEN, false).expect("verifier");
        let clock: Arc<dyn Clock> = Arc::new(MutableClock::new(fixed_now()));
        web::Data::new(HttpState::new(ports, Arc::new(verifier), clock))
    }
}

/// Request builder carrying a valid launch payload for the fixture caller.
pub fn signed(request: test::TestRequest) -> test::TestRequest {
    request.insert_header((
        LAUNCH_HEADER,
        launch_payload_for(BOT_TOKEN, CALLER_PLATFORM, "Ada"),
    ))
}
