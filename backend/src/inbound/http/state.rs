//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable with mocks.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::LaunchVerifier;
use crate::domain::SocialStore;
use crate::domain::ports::{Conversations, IdentityRegistry, SocialGraph};

/// Parameter object bundling the port implementations handlers call.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub registry: Arc<dyn IdentityRegistry>,
    pub graph: Arc<dyn SocialGraph>,
    pub conversations: Arc<dyn Conversations>,
}

impl HttpStatePorts {
    /// Serve every port from one social store.
    pub fn from_store(store: Arc<SocialStore>) -> Self {
        Self {
            registry: store.clone(),
            graph: store.clone(),
            conversations: store,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registry: Arc<dyn IdentityRegistry>,
    pub graph: Arc<dyn SocialGraph>,
    pub conversations: Arc<dyn Conversations>,
    pub verifier: Arc<LaunchVerifier>,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Construct state from a ports bundle, the launch verifier and a clock
    /// for presence strings.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use companion::domain::LaunchVerifier;
    /// use companion::domain::SocialStore;
    /// use companion::domain::ports::{NoOpNotificationSink, RandomPublicIds};
    /// use companion::inbound::http::state::{HttpState, HttpStatePorts};
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(SocialStore::new(
    ///     Arc::new(RandomPublicIds),
    ///     Arc::new(DefaultClock),
    ///     Arc::new(NoOpNotificationSink),
    /// ));
    /// let verifier = LaunchVerifier::new("1:abc", false).expect("verifier");
    /// let state = HttpState::new(
    ///     HttpStatePorts::from_store(store),
    ///     Arc::new(verifier),
    ///     Arc::new(DefaultClock),
    /// );
    /// assert!(!state.verifier.allows_mock());
    /// ```
    pub fn new(
        ports: HttpStatePorts,
        verifier: Arc<LaunchVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let HttpStatePorts {
            registry,
            graph,
            conversations,
        } = ports;
        Self {
            registry,
            graph,
            conversations,
            verifier,
            clock,
        }
    }
}
