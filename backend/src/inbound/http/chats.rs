//! Conversation handlers.
//!
//! ```text
//! GET /api/chats
//! GET /api/chat/{partnerId}
//! DELETE /api/chat/{partnerId}
//! POST /api/message/{partnerId} {"text":"hi"}
//! POST /api/react/{partnerId}/{emoji}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ConversationPreview, Error, Message};
use crate::inbound::http::ApiResult;
use crate::inbound::http::launch::LaunchUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_public_id, validate_emoji, validate_message_text};

/// Request body for `POST /api/message/{partnerId}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub text: String,
}

/// Conversation list, newest activity first.
#[utoipa::path(
    get,
    path = "/api/chats",
    responses(
        (status = 200, description = "Conversation previews", body = [ConversationPreview]),
        (status = 401, description = "Launch payload missing", body = Error),
        (status = 403, description = "Launch payload invalid", body = Error)
    ),
    tags = ["chats"],
    operation_id = "listChats"
)]
#[get("/chats")]
pub async fn list_chats(
    state: web::Data<HttpState>,
    user: LaunchUser,
) -> ApiResult<web::Json<Vec<ConversationPreview>>> {
    let previews = state.conversations.list_conversations(user.public_id)?;
    Ok(web::Json(previews))
}

/// Read a conversation and mark the partner's messages as read.
#[utoipa::path(
    get,
    path = "/api/chat/{partner_id}",
    params(("partner_id" = String, Path, description = "Partner public id")),
    responses(
        (status = 200, description = "Messages, oldest first", body = [Message]),
        (status = 401, description = "Launch payload missing", body = Error),
        (status = 403, description = "Launch payload invalid", body = Error),
        (status = 404, description = "Unknown partner", body = Error)
    ),
    tags = ["chats"],
    operation_id = "readChat"
)]
#[get("/chat/{partner_id}")]
pub async fn read_chat(
    state: web::Data<HttpState>,
    user: LaunchUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Message>>> {
    let partner = parse_public_id(&path)?;
    let messages = state
        .conversations
        .read_conversation(user.public_id, partner)?;
    Ok(web::Json(messages))
}

/// Delete the caller's copy of a conversation. The partner keeps theirs.
#[utoipa::path(
    delete,
    path = "/api/chat/{partner_id}",
    params(("partner_id" = String, Path, description = "Partner public id")),
    responses(
        (status = 204, description = "Conversation deleted"),
        (status = 401, description = "Launch payload missing", body = Error),
        (status = 403, description = "Launch payload invalid", body = Error),
        (status = 404, description = "No such conversation", body = Error)
    ),
    tags = ["chats"],
    operation_id = "deleteChat"
)]
#[delete("/chat/{partner_id}")]
pub async fn delete_chat(
    state: web::Data<HttpState>,
    user: LaunchUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let partner = parse_public_id(&path)?;
    state
        .conversations
        .delete_conversation(user.public_id, partner)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Send a message; the partner is notified.
#[utoipa::path(
    post,
    path = "/api/message/{partner_id}",
    params(("partner_id" = String, Path, description = "Recipient public id")),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Sender's copy of the message", body = Message),
        (status = 400, description = "Invalid message text", body = Error),
        (status = 401, description = "Launch payload missing", body = Error),
        (status = 403, description = "Blocked or messaging self", body = Error),
        (status = 404, description = "Unknown recipient", body = Error)
    ),
    tags = ["chats"],
    operation_id = "sendMessage"
)]
#[post("/message/{partner_id}")]
pub async fn send_message(
    state: web::Data<HttpState>,
    user: LaunchUser,
    path: web::Path<String>,
    payload: web::Json<SendMessageRequest>,
) -> ApiResult<web::Json<Message>> {
    let partner = parse_public_id(&path)?;
    let text = validate_message_text(&payload.text)?;
    let message = state
        .conversations
        .append_message(user.public_id, partner, text)?;
    Ok(web::Json(message))
}

/// React to the latest message in a conversation.
#[utoipa::path(
    post,
    path = "/api/react/{partner_id}/{emoji}",
    params(
        ("partner_id" = String, Path, description = "Partner public id"),
        ("emoji" = String, Path, description = "Reaction, 1 to 16 characters")
    ),
    responses(
        (status = 200, description = "Message with the updated reaction", body = Message),
        (status = 400, description = "Invalid emoji", body = Error),
        (status = 401, description = "Launch payload missing", body = Error),
        (status = 403, description = "Launch payload invalid", body = Error),
        (status = 404, description = "Empty or unknown conversation", body = Error)
    ),
    tags = ["chats"],
    operation_id = "react"
)]
#[post("/react/{partner_id}/{emoji}")]
pub async fn react(
    state: web::Data<HttpState>,
    user: LaunchUser,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Message>> {
    let (partner, emoji) = path.into_inner();
    let partner = parse_public_id(&partner)?;
    let emoji = validate_emoji(&emoji)?;
    let message = state.conversations.react(user.public_id, partner, emoji)?;
    Ok(web::Json(message))
}
