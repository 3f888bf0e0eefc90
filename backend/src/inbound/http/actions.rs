//! Social actions on another user.
//!
//! ```text
//! POST /api/action/add_friend/{targetId}
//! ```

use std::str::FromStr;

use actix_web::{post, web};
use serde_json::json;

use crate::domain::ports::SocialGraph;
use crate::domain::{Error, PublicId, Relation};
use crate::inbound::http::ApiResult;
use crate::inbound::http::launch::LaunchUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_public_id;

/// Actions accepted by `POST /api/action/{kind}/{targetId}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialAction {
    AddFriend,
    AcceptFriend,
    DeclineFriend,
    CancelRequest,
    Unfriend,
    Block,
    Unblock,
}

impl SocialAction {
    pub const ALL: [Self; 7] = [
        Self::AddFriend,
        Self::AcceptFriend,
        Self::DeclineFriend,
        Self::CancelRequest,
        Self::Unfriend,
        Self::Block,
        Self::Unblock,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddFriend => "add_friend",
            Self::AcceptFriend => "accept_friend",
            Self::DeclineFriend => "decline_friend",
            Self::CancelRequest => "cancel_request",
            Self::Unfriend => "unfriend",
            Self::Block => "block",
            Self::Unblock => "unblock",
        }
    }

    fn apply(self, graph: &dyn SocialGraph, actor: PublicId, target: PublicId) -> Result<(), Error> {
        match self {
            Self::AddFriend => graph.send_request(actor, target),
            Self::AcceptFriend => graph.accept_request(actor, target),
            Self::DeclineFriend => graph.decline_request(actor, target),
            Self::CancelRequest => graph.cancel_request(actor, target),
            Self::Unfriend => graph.unfriend(actor, target),
            Self::Block => graph.block(actor, target),
            Self::Unblock => graph.unblock(actor, target),
        }
    }
}

impl FromStr for SocialAction {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == raw)
            .ok_or_else(|| {
                Error::invalid_request("invalid action").with_details(json!({
                    "field": "kind",
                    "value": raw,
                    "allowed": Self::ALL.map(Self::as_str),
                }))
            })
    }
}

/// Apply a social action and return the caller's resulting relation to the
/// target.
#[utoipa::path(
    post,
    path = "/api/action/{kind}/{target_id}",
    params(
        ("kind" = String, Path, description = "add_friend, accept_friend, decline_friend, cancel_request, unfriend, block or unblock"),
        ("target_id" = String, Path, description = "Target public id")
    ),
    responses(
        (status = 200, description = "Relation after the action", body = Relation),
        (status = 400, description = "Unknown action", body = Error),
        (status = 401, description = "Launch payload missing", body = Error),
        (status = 403, description = "Blocked or acting on self", body = Error),
        (status = 404, description = "Unknown target", body = Error),
        (status = 409, description = "Action does not fit the current relation", body = Error)
    ),
    tags = ["social"],
    operation_id = "applyAction"
)]
#[post("/action/{kind}/{target_id}")]
pub async fn apply_action(
    state: web::Data<HttpState>,
    user: LaunchUser,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Relation>> {
    let (kind, target) = path.into_inner();
    let action: SocialAction = kind.parse()?;
    let target = parse_public_id(&target)?;
    action.apply(state.graph.as_ref(), user.public_id, target)?;
    let relation = state.graph.relation_to(user.public_id, target)?;
    Ok(web::Json(relation))
}
