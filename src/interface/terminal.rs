use crate::{
    bus::{Event, EventBus},
    chat::{Message, MessageKind},
    controller::SessionController,
    directory::ChatDirectory,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

const HELP: &str = "These commands are supported:
/chats              List available chats.
/open <chat-id>     Open a chat.
/back               Close the chat and return to the list.
/sidebar show|hide  Show or hide the chat list.
/help               Display this text.
/quit               Exit.
Anything else is sent to the open chat.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Chats,
    Open(String),
    Back,
    Sidebar(bool),
    Help,
    Quit,
    Send(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Usage: /open <chat-id>")]
    MissingChatId,
    #[error("Usage: /sidebar show|hide")]
    BadSidebarArg,
    #[error("Unknown command /{0}. Use /help to see what I can do.")]
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let Some(rest) = line.trim_start().strip_prefix('/') else {
            return Ok(Command::Send(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest.trim_end(), ""),
        };

        match name {
            "chats" => Ok(Command::Chats),
            "open" if arg.is_empty() => Err(CommandError::MissingChatId),
            "open" => Ok(Command::Open(arg.to_string())),
            "back" => Ok(Command::Back),
            "sidebar" => match arg {
                "show" | "on" => Ok(Command::Sidebar(true)),
                "hide" | "off" => Ok(Command::Sidebar(false)),
                _ => Err(CommandError::BadSidebarArg),
            },
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Line-oriented front-end: reads commands from stdin and prints whatever
/// the controller publishes on the bus.
pub struct TerminalInterface {
    bus: Arc<EventBus>,
    directory: Arc<dyn ChatDirectory>,
}

impl TerminalInterface {
    pub fn new(bus: Arc<EventBus>, directory: Arc<dyn ChatDirectory>) -> Self {
        Self { bus, directory }
    }

    pub async fn run(&self, mut controller: SessionController) -> anyhow::Result<()> {
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(32);

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match Command::parse(&line) {
                        Ok(cmd) => {
                            if cmd_tx.send(cmd).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => println!("{}", e),
                    },
                    Ok(None) => break,
                    Err(e) => {
                        error!("Failed to read from stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let mut bus_rx = self.bus.subscribe();
        let directory = self.directory.clone();
        tokio::spawn(async move {
            loop {
                match bus_rx.recv().await {
                    Ok(event) => {
                        if let Some(out) = render(&event, directory.as_ref()) {
                            println!("{}", out);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Renderer lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        println!("{}", render_chat_list(self.directory.as_ref()));
        println!("Use /help to see what I can do.");

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down...");
                    break;
                }
                cmd = cmd_rx.recv() => match cmd {
                    Some(Command::Quit) | None => break,
                    Some(cmd) => self.apply(&mut controller, cmd),
                },
                Some(_) = controller.next_delivery() => {}
            }
        }

        controller.go_back();
        Ok(())
    }

    fn apply(&self, controller: &mut SessionController, cmd: Command) {
        match cmd {
            Command::Chats => println!("{}", render_chat_list(self.directory.as_ref())),
            Command::Open(chat_id) => controller.select_chat(chat_id),
            Command::Back => controller.go_back(),
            Command::Sidebar(visible) => controller.toggle_sidebar(visible),
            Command::Help => println!("{}", HELP),
            Command::Send(text) => {
                if controller.selected_chat_id().is_empty() {
                    println!("No chat open. Use /open <chat-id> first.");
                } else {
                    controller.send_message(&text);
                }
            }
            Command::Quit => {}
        }
    }
}

pub fn render(event: &Event, directory: &dyn ChatDirectory) -> Option<String> {
    match event {
        Event::ChatSelected { chat_id } if !chat_id.is_empty() => {
            Some(format!("== {} ==", display_name(directory, chat_id)))
        }
        Event::ChatSelected { .. } => None,
        Event::ChatClosed { chat_id } => {
            Some(format!("== Left {} ==", display_name(directory, chat_id)))
        }
        Event::SidebarToggled { visible: true } => Some(render_chat_list(directory)),
        Event::SidebarToggled { visible: false } => None,
        Event::MessageAppended { chat_id, message } => {
            Some(render_message(message, &display_name(directory, chat_id)))
        }
    }
}

pub fn render_message(message: &Message, peer_name: &str) -> String {
    match message.kind {
        MessageKind::DateDivider => format!("--- {} ---", message.content),
        MessageKind::Outgoing => format!("[{}] you: {}", message.sent_at, message.content),
        MessageKind::Incoming => {
            format!("[{}] {}: {}", message.sent_at, peer_name, message.content)
        }
    }
}

pub fn render_chat_list(directory: &dyn ChatDirectory) -> String {
    let chats = directory.chats();
    if chats.is_empty() {
        return "No chats in the directory. /open <chat-id> still works.".to_string();
    }

    let mut list = String::from("Chats:\n");
    for chat in &chats {
        let marker = if chat.unread { "*" } else { " " };
        list.push_str(&format!(
            "{} {:<10} {:<20} {:<10} {}\n",
            marker, chat.id, chat.display_name, chat.last_activity_label, chat.last_message_preview
        ));
    }
    list.pop();
    list
}

fn display_name(directory: &dyn ChatDirectory, chat_id: &str) -> String {
    directory
        .find(chat_id)
        .map(|summary| summary.display_name)
        .unwrap_or_else(|| chat_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{ChatSummary, StaticDirectory};

    fn directory() -> StaticDirectory {
        StaticDirectory::new(vec![ChatSummary {
            id: "42".to_string(),
            display_name: "Deep Thought".to_string(),
            avatar_ref: None,
            last_message_preview: "Working on it".to_string(),
            last_activity_label: "9:41 am".to_string(),
            unread: true,
        }])
    }

    #[test]
    fn plain_text_is_a_send() {
        assert_eq!(
            Command::parse("hello there"),
            Ok(Command::Send("hello there".to_string()))
        );
        assert_eq!(Command::parse(""), Ok(Command::Send(String::new())));
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("/open 42"), Ok(Command::Open("42".to_string())));
        assert_eq!(Command::parse("  /back  "), Ok(Command::Back));
        assert_eq!(Command::parse("/sidebar show"), Ok(Command::Sidebar(true)));
        assert_eq!(Command::parse("/sidebar hide"), Ok(Command::Sidebar(false)));
        assert_eq!(Command::parse("/chats"), Ok(Command::Chats));
        assert_eq!(Command::parse("/quit"), Ok(Command::Quit));
    }

    #[test]
    fn reports_bad_usage() {
        assert_eq!(Command::parse("/open"), Err(CommandError::MissingChatId));
        assert_eq!(Command::parse("/sidebar maybe"), Err(CommandError::BadSidebarArg));
        assert_eq!(
            Command::parse("/dance"),
            Err(CommandError::Unknown("dance".to_string()))
        );
    }

    #[test]
    fn renders_messages_by_kind() {
        let divider = Message::date_divider("d", "Today", "9:00 am");
        let out = Message::outgoing("o", "hi", "9:01 am", None);
        let inc = Message::incoming("i", "hello", "9:02 am", None);

        assert_eq!(render_message(&divider, "Ada"), "--- Today ---");
        assert_eq!(render_message(&out, "Ada"), "[9:01 am] you: hi");
        assert_eq!(render_message(&inc, "Ada"), "[9:02 am] Ada: hello");
    }

    #[test]
    fn render_uses_directory_names() {
        let dir = directory();
        let event = Event::ChatSelected {
            chat_id: "42".to_string(),
        };
        assert_eq!(render(&event, &dir).as_deref(), Some("== Deep Thought =="));

        let event = Event::ChatClosed {
            chat_id: "7".to_string(),
        };
        assert_eq!(render(&event, &dir).as_deref(), Some("== Left 7 =="));

        assert!(render(&Event::SidebarToggled { visible: false }, &dir).is_none());
    }

    #[test]
    fn chat_list_marks_unread() {
        let list = render_chat_list(&directory());
        assert!(list.starts_with("Chats:\n*"));
        assert!(list.contains("Deep Thought"));
        assert!(render_chat_list(&StaticDirectory::default()).starts_with("No chats"));
    }
}
