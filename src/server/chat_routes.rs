//! Companion chat routes.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::chat::{ChatReply, ResumedConversation};
use crate::server::error::ApiResult;
use crate::server::extract::{ApiJson, ApiPath, ApiQuery};
use crate::server::metrics::set_active_conversations;
use crate::server::state::{GuardedChatService, ServerState};
use crate::user::ChatMessage;

#[derive(Debug, Deserialize)]
pub struct ChatInput {
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UserOnly {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct NewConversationResponse {
    pub message: &'static str,
    pub success: bool,
}

async fn send(
    State(chat): State<GuardedChatService>,
    ApiJson(input): ApiJson<ChatInput>,
) -> ApiResult<Json<ChatReply>> {
    let reply = chat.send(&input.user_id, &input.message).await?;
    set_active_conversations(chat.conversations().len());
    Ok(Json(reply))
}

async fn new_conversation(
    State(chat): State<GuardedChatService>,
    ApiJson(input): ApiJson<UserOnly>,
) -> ApiResult<Json<NewConversationResponse>> {
    chat.new_conversation(&input.user_id)?;
    set_active_conversations(chat.conversations().len());
    Ok(Json(NewConversationResponse {
        message: "New conversation started.",
        success: true,
    }))
}

async fn history(
    State(chat): State<GuardedChatService>,
    ApiQuery(query): ApiQuery<UserOnly>,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    Ok(Json(chat.history(&query.user_id)?))
}

async fn resume(
    State(chat): State<GuardedChatService>,
    ApiQuery(query): ApiQuery<UserOnly>,
) -> ApiResult<Json<ResumedConversation>> {
    Ok(Json(chat.resume(&query.user_id)?))
}

async fn messages_of(
    State(chat): State<GuardedChatService>,
    ApiPath(user_handle): ApiPath<String>,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    Ok(Json(chat.history(&user_handle)?))
}

async fn mood_chat(
    State(chat): State<GuardedChatService>,
    ApiJson(input): ApiJson<ChatInput>,
) -> ApiResult<Json<ChatMessage>> {
    let message = chat.mood_chat(&input.user_id, &input.message)?;
    set_active_conversations(chat.conversations().len());
    Ok(Json(message))
}

pub fn chat_routes() -> Router<ServerState> {
    Router::new()
        .route("/send", post(send))
        .route("/new", post(new_conversation))
        .route("/history", get(history))
        .route("/resume", get(resume))
        .route("/messages/{user_handle}", get(messages_of))
        .route("/mood-chat", post(mood_chat))
}
