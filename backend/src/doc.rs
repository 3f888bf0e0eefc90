//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api` endpoint, the health probes, the
//! response schemas, and the launch payload header as the security scheme.
//! Swagger UI serves it in debug builds and `openapi-dump` prints it.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{ConversationPreview, Error, ErrorCode, Message, Reaction, Relation};
use crate::inbound::http::chats::SendMessageRequest;
use crate::inbound::http::launch::LAUNCH_HEADER;
use crate::inbound::http::profiles::{
    PendingRequestsResponse, ProfileResponse, ProfileView, UpdateBioRequest,
};

/// Name of the launch payload security scheme.
pub const LAUNCH_SCHEME: &str = "LaunchPayload";

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            LAUNCH_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                LAUNCH_HEADER,
                "Signed launch payload supplied by the messaging platform.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Companion chat API",
        description = "Profiles, friendships and direct messages for users launched from a messaging platform."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("LaunchPayload" = [])),
    paths(
        crate::inbound::http::profiles::current_profile,
        crate::inbound::http::profiles::update_bio,
        crate::inbound::http::profiles::get_profile,
        crate::inbound::http::profiles::list_friends,
        crate::inbound::http::profiles::list_requests,
        crate::inbound::http::chats::list_chats,
        crate::inbound::http::chats::read_chat,
        crate::inbound::http::chats::delete_chat,
        crate::inbound::http::chats::send_message,
        crate::inbound::http::chats::react,
        crate::inbound::http::actions::apply_action,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Relation,
        Message,
        Reaction,
        ConversationPreview,
        ProfileView,
        ProfileResponse,
        PendingRequestsResponse,
        UpdateBioRequest,
        SendMessageRequest,
    )),
    tags(
        (name = "profiles", description = "Own profile, other profiles and friend lists"),
        (name = "chats", description = "Direct conversations and reactions"),
        (name = "social", description = "Friend requests and blocking"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
