//! Interactive chat loop: the presentation shell.
//!
//! Renders plain-text messages, collects the customer's free-text
//! input and identity fields, and serializes turns - one submit at a
//! time per session.

use std::io::Write;

use tourdesk_config::Config;
use tourdesk_conversation::SubmitError;
use tourdesk_core::{ChatMessage, CustomerIdentity, Role};
use tracing::info;
use uuid::Uuid;

use super::build_manager;

/// Input parameters for the chat command.
#[derive(Debug, Clone)]
pub struct ChatInput {
    pub session: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

pub async fn run_chat(config: &Config, input: ChatInput) -> anyhow::Result<()> {
    let manager = build_manager(config).await?;

    let session_id = input
        .session
        .unwrap_or_else(|| Uuid::now_v7().to_string());
    info!("Chat session: {session_id}");

    let mut identity = CustomerIdentity {
        name: input.name,
        email: input.email,
        phone: input.phone,
    };

    if let Some(message) = input.message {
        // Single message mode
        let messages = manager.submit(&session_id, &message, &identity).await?;
        if let Some(reply) = last_reply(&messages) {
            println!("{reply}");
        }
        return Ok(());
    }

    // Interactive mode
    println!("=== BlingDestinations Travel Assistant ===");
    println!("Session: {session_id}");
    println!("Type 'exit', 'quit', or Ctrl+C to end the session.\n");

    if identity.name.is_none() {
        identity.name = prompt_optional("Your name (press Enter to skip): ")?;
    }
    if identity.email.is_none() {
        identity.email = prompt_optional("Email for the booking confirmation (Enter to skip): ")?;
    }
    if identity.phone.is_none() {
        identity.phone = prompt_optional("Phone number (Enter to skip): ")?;
    }

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        if matches!(line, "exit" | "quit" | "q") {
            println!("\nSafe travels!");
            break;
        }

        if line.is_empty() {
            continue;
        }

        match manager.submit(&session_id, line, &identity).await {
            Ok(messages) => {
                if let Some(reply) = last_reply(&messages) {
                    println!("\n{reply}\n");
                }
                // Identity is merged into the session on first use.
                identity = CustomerIdentity::default();
            }
            Err(SubmitError::Engine(e)) => {
                eprintln!("The assistant is unavailable right now ({e}). Your conversation is saved; please try again.");
            }
            Err(e) => {
                eprintln!("Error: {e}");
            }
        }
    }

    Ok(())
}

fn last_reply(messages: &[ChatMessage]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant && m.tool_calls.is_none())
        .map(|m| m.content.as_str())
}

fn prompt_optional(prompt: &str) -> anyhow::Result<Option<String>> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let line = line.trim();
    Ok(if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    })
}
