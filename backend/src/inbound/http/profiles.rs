//! Profile and friend-list handlers.
//!
//! ```text
//! GET /api/me
//! PUT /api/me/bio {"bio":"hello"}
//! GET /api/profile/{publicId}
//! GET /api/friends
//! GET /api/requests
//! ```

use actix_web::{get, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, PlatformId, PublicId, Relation, UserProfile, presence};
use crate::inbound::http::ApiResult;
use crate::inbound::http::launch::LaunchUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_public_id, validate_bio};

/// Profile as shown to a viewer. The platform id is only disclosed to its
/// owner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub public_id: PublicId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<PlatformId>,
    pub display_name: String,
    pub bio: String,
    pub joined_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    /// Presence string such as `online` or `5m ago`.
    pub status: String,
}

impl ProfileView {
    fn new(profile: UserProfile, now: DateTime<Utc>, disclose_platform_id: bool) -> Self {
        Self {
            public_id: profile.public_id,
            platform_id: disclose_platform_id.then_some(profile.platform_id),
            display_name: profile.display_name,
            bio: profile.bio,
            joined_at: profile.joined_at,
            status: presence(profile.last_active_at, now),
            last_active_at: profile.last_active_at,
        }
    }
}

/// Another user's profile plus how the caller relates to them.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: ProfileView,
    pub relation: Relation,
}

/// Incoming and outgoing friend requests.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequestsResponse {
    pub received: Vec<ProfileView>,
    pub sent: Vec<ProfileView>,
}

/// Request body for `PUT /api/me/bio`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBioRequest {
    pub bio: String,
}

fn own_profile(state: &HttpState, user: LaunchUser) -> ApiResult<ProfileView> {
    let profile = state
        .registry
        .profile(user.public_id)
        .ok_or_else(|| Error::not_found("your profile could not be found"))?;
    Ok(ProfileView::new(profile, state.clock.utc(), true))
}

fn views(state: &HttpState, profiles: Vec<UserProfile>) -> Vec<ProfileView> {
    let now = state.clock.utc();
    profiles
        .into_iter()
        .map(|profile| ProfileView::new(profile, now, false))
        .collect()
}

/// The caller's own profile.
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Caller profile", body = ProfileView),
        (status = 401, description = "Launch payload missing", body = Error),
        (status = 403, description = "Launch payload invalid", body = Error)
    ),
    tags = ["profiles"],
    operation_id = "currentProfile"
)]
#[get("/me")]
pub async fn current_profile(
    state: web::Data<HttpState>,
    user: LaunchUser,
) -> ApiResult<web::Json<ProfileView>> {
    own_profile(&state, user).map(web::Json)
}

/// Replace the caller's bio.
#[utoipa::path(
    put,
    path = "/api/me/bio",
    request_body = UpdateBioRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileView),
        (status = 400, description = "Bio too long", body = Error),
        (status = 401, description = "Launch payload missing", body = Error),
        (status = 403, description = "Launch payload invalid", body = Error)
    ),
    tags = ["profiles"],
    operation_id = "updateBio"
)]
#[put("/me/bio")]
pub async fn update_bio(
    state: web::Data<HttpState>,
    user: LaunchUser,
    payload: web::Json<UpdateBioRequest>,
) -> ApiResult<web::Json<ProfileView>> {
    let bio = validate_bio(&payload.bio)?;
    state.registry.update_bio(user.public_id, bio)?;
    own_profile(&state, user).map(web::Json)
}

/// Another user's profile with the caller's relation to them.
#[utoipa::path(
    get,
    path = "/api/profile/{public_id}",
    params(("public_id" = String, Path, description = "Eight-digit public id")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Launch payload missing", body = Error),
        (status = 403, description = "Launch payload invalid", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["profiles"],
    operation_id = "getProfile"
)]
#[get("/profile/{public_id}")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    user: LaunchUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let target = parse_public_id(&path)?;
    let profile = state
        .registry
        .profile(target)
        .ok_or_else(|| Error::not_found("user not found"))?;
    let relation = state.graph.relation_to(user.public_id, target)?;
    Ok(web::Json(ProfileResponse {
        profile: ProfileView::new(profile, state.clock.utc(), relation.is_self),
        relation,
    }))
}

/// The caller's friends.
#[utoipa::path(
    get,
    path = "/api/friends",
    responses(
        (status = 200, description = "Friends", body = [ProfileView]),
        (status = 401, description = "Launch payload missing", body = Error),
        (status = 403, description = "Launch payload invalid", body = Error)
    ),
    tags = ["profiles"],
    operation_id = "listFriends"
)]
#[get("/friends")]
pub async fn list_friends(
    state: web::Data<HttpState>,
    user: LaunchUser,
) -> ApiResult<web::Json<Vec<ProfileView>>> {
    let friends = state.graph.friends_of(user.public_id)?;
    Ok(web::Json(views(&state, friends)))
}

/// Pending friend requests in both directions.
#[utoipa::path(
    get,
    path = "/api/requests",
    responses(
        (status = 200, description = "Pending requests", body = PendingRequestsResponse),
        (status = 401, description = "Launch payload missing", body = Error),
        (status = 403, description = "Launch payload invalid", body = Error)
    ),
    tags = ["profiles"],
    operation_id = "listRequests"
)]
#[get("/requests")]
pub async fn list_requests(
    state: web::Data<HttpState>,
    user: LaunchUser,
) -> ApiResult<web::Json<PendingRequestsResponse>> {
    let pending = state.graph.pending_requests(user.public_id)?;
    Ok(web::Json(PendingRequestsResponse {
        received: views(&state, pending.received),
        sent: views(&state, pending.sent),
    }))
}
