//! Conversation list, history viewer and chat export

use std::collections::BTreeMap;
use std::sync::Arc;

use colored::Colorize;
use prettytable::{row, Table};

use super::{format_timestamp, or_dash, print_json, truncate, Context};
use crate::api::types::{ChatMessage, Sender, UserSummary};
use crate::error::Result;
use crate::history::HistoryLoader;
use crate::session::{require_role, Role};

/// `adminctl chats list`
///
/// # Errors
///
/// Returns error if the session is missing or the request fails
pub async fn list_conversations(ctx: &Context, json: bool) -> Result<()> {
    require_role(ctx.session().as_ref(), Role::Admin)?;
    let conversations = ctx.client.list_conversations().await?;
    if json {
        return print_json(&conversations);
    }
    if conversations.is_empty() {
        println!("{}", "No conversations found.".yellow());
        return Ok(());
    }
    println!("\nConversations ({}):\n", conversations.len());
    conversations_table(&conversations).printstd();
    println!();
    Ok(())
}

/// `adminctl chats history <user-id>`
///
/// Loads the newest page, then up to `pages - 1` older pages, and prints
/// the result oldest first.
///
/// # Errors
///
/// Returns error if the session is missing or a page cannot be loaded
pub async fn show_history(ctx: &Context, user_id: &str, pages: u32, json: bool) -> Result<()> {
    require_role(ctx.session().as_ref(), Role::Admin)?;

    let loader = HistoryLoader::new(Arc::new(ctx.client.clone()));
    loader.select_conversation(user_id).await?;
    for _ in 1..pages.max(1) {
        if !loader.has_more() {
            break;
        }
        loader.load_older().await?;
    }

    let snapshot = loader.snapshot();
    if json {
        return print_json(&snapshot.messages);
    }

    if snapshot.messages.is_empty() {
        println!("{}", "No messages in this conversation.".yellow());
        return Ok(());
    }
    println!("\nConversation {} ({} messages):\n", user_id, snapshot.messages.len());
    for message in &snapshot.messages {
        println!("{}", format_message(message));
    }
    if snapshot.has_more {
        println!(
            "\n{}",
            format!("Older messages available (use --pages {})", snapshot.page + 1).dimmed()
        );
    }
    println!();
    Ok(())
}

/// `adminctl chats export`
///
/// # Errors
///
/// Returns error if the session is missing or the request fails
pub async fn export_chats(ctx: &Context, email: Option<&str>, json: bool) -> Result<()> {
    require_role(ctx.session().as_ref(), Role::Admin)?;
    let chats = filter_by_email(ctx.client.all_chats().await?, email);
    if json {
        return print_json(&chats);
    }
    if chats.is_empty() {
        println!("{}", "No chats found.".yellow());
        return Ok(());
    }
    for (user_email, messages) in &chats {
        println!("\n{} ({} messages)", user_email.bold(), messages.len());
        for message in messages {
            println!("  {}", format_message(message));
        }
    }
    println!();
    Ok(())
}

/// Keep only conversations whose email contains `needle` (case-insensitive)
pub fn filter_by_email(
    chats: BTreeMap<String, Vec<ChatMessage>>,
    needle: Option<&str>,
) -> BTreeMap<String, Vec<ChatMessage>> {
    let Some(needle) = needle.map(str::trim).filter(|n| !n.is_empty()) else {
        return chats;
    };
    let needle = needle.to_lowercase();
    chats
        .into_iter()
        .filter(|(email, _)| email.to_lowercase().contains(&needle))
        .collect()
}

/// Table of conversations, one row per user
pub fn conversations_table(conversations: &[UserSummary]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["User ID", "Name", "Email", "Last Message", "At"]);
    for summary in conversations {
        table.add_row(row![
            summary.id,
            or_dash(summary.full_name.as_deref()),
            or_dash(summary.email.as_deref()),
            truncate(summary.last_message.as_deref().unwrap_or("-"), 40),
            format_timestamp(summary.last_message_at)
        ]);
    }
    table
}

fn format_message(message: &ChatMessage) -> String {
    let who = match message.sender {
        Sender::User => "USER".cyan(),
        Sender::Admin => "ADMIN".green(),
        Sender::Ai => "AI".magenta(),
        Sender::System => "SYSTEM".dimmed(),
    };
    format!(
        "[{}] {:>6}: {}",
        format_timestamp(message.created_at),
        who,
        message.message
    )
}
