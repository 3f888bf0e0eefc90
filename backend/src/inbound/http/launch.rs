//! Launch payload extractor.
//!
//! Every API request carries the host platform's signed launch payload in a
//! header. The extractor verifies it, registers first-time callers and bumps
//! their activity timestamp, so handlers only ever see a resolved caller.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error};

use crate::domain::{Error, PlatformId, PublicId};
use crate::inbound::http::state::HttpState;

/// Header carrying the URL-encoded launch payload.
pub const LAUNCH_HEADER: &str = "X-Telegram-Init-Data";

/// Authenticated caller of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchUser {
    pub public_id: PublicId,
    pub platform_id: PlatformId,
}

impl LaunchUser {
    fn authenticate(req: &HttpRequest) -> Result<Self, Error> {
        let Some(state) = req.app_data::<web::Data<HttpState>>() else {
            error!("HTTP state is not registered; cannot authenticate");
            return Err(Error::internal("HTTP state unavailable"));
        };

        let raw = req
            .headers()
            .get(LAUNCH_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::unauthorized("launch payload required"))?;

        let identity = state.verifier.verify(raw).map_err(|err| {
            debug!(error = %err, "rejected launch payload");
            Error::forbidden("invalid launch payload")
        })?;

        let public_id = state.registry.resolve_or_create(&identity)?;
        state.registry.touch_activity(identity.platform_id);
        Ok(Self {
            public_id,
            platform_id: identity.platform_id,
        })
    }
}

impl FromRequest for LaunchUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Deferred until polled so errors capture the request's trace id.
        let req = req.clone();
        Box::pin(async move { Self::authenticate(&req) })
    }
}
