//! Chat thread commands
//!
//! Local persistence for agent conversation threads and their messages.

use std::time::Instant;

use chrono::Utc;
use openbooks_domain::{ChatMessage, ChatThread, MessageRole, Result};
use uuid::Uuid;

use crate::context::AppContext;
use crate::utils::logging::log_command_execution;

/// Create a new chat thread for an owner.
pub async fn create_thread(ctx: &AppContext, owner_id: &str, title: &str) -> Result<ChatThread> {
    let started = Instant::now();
    let now = Utc::now().timestamp();
    let thread = ChatThread {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        title: title.to_string(),
        created_at: now,
        updated_at: now,
    };
    let result = ctx.chat_store.create_thread(&thread).await.map(|()| thread);
    log_command_execution("chat::create_thread", started.elapsed(), result.is_ok());
    result
}

/// List an owner's threads, most recently active first.
pub async fn list_threads(ctx: &AppContext, owner_id: &str) -> Result<Vec<ChatThread>> {
    let started = Instant::now();
    let result = ctx.chat_store.list_threads(owner_id).await;
    log_command_execution("chat::list_threads", started.elapsed(), result.is_ok());
    result
}

/// Rename a thread.
pub async fn rename_thread(ctx: &AppContext, id: &str, title: &str) -> Result<()> {
    let started = Instant::now();
    let result = ctx.chat_store.rename_thread(id, title).await;
    log_command_execution("chat::rename_thread", started.elapsed(), result.is_ok());
    result
}

/// Delete a thread and all of its messages.
pub async fn delete_thread(ctx: &AppContext, id: &str) -> Result<()> {
    let started = Instant::now();
    let result = ctx.chat_store.delete_thread(id).await;
    log_command_execution("chat::delete_thread", started.elapsed(), result.is_ok());
    result
}

/// Append a message to a thread, bumping the thread's recency.
pub async fn send_message(
    ctx: &AppContext,
    thread_id: &str,
    role: MessageRole,
    body: &str,
) -> Result<ChatMessage> {
    let started = Instant::now();
    let message = ChatMessage {
        id: Uuid::new_v4().to_string(),
        thread_id: thread_id.to_string(),
        role,
        body: body.to_string(),
        created_at: Utc::now().timestamp(),
    };
    let result = ctx.chat_store.append_message(&message).await.map(|()| message);
    log_command_execution("chat::send_message", started.elapsed(), result.is_ok());
    result
}

/// List a thread's messages in chronological order.
pub async fn list_messages(ctx: &AppContext, thread_id: &str) -> Result<Vec<ChatMessage>> {
    let started = Instant::now();
    let result = ctx.chat_store.list_messages(thread_id).await;
    log_command_execution("chat::list_messages", started.elapsed(), result.is_ok());
    result
}
