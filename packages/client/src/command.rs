//! Prompt command parsing.

use liverelay_server::infrastructure::dto::websocket::ClientMessage;

pub const HELP: &str = "\
Commands:
  /connect <room> [credential]  relay the given live room
  /disconnect                   stop the active session
  /help                         show this help
  /quit                         exit the client
";

/// A line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect {
        room: String,
        credential: Option<String>,
    },
    Disconnect,
    Help,
    Quit,
    /// Anything else, with a hint for the user
    Invalid(String),
}

impl Command {
    /// Parse one trimmed, non-empty input line
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Command::Invalid("Empty input".to_string());
        };

        match head {
            "/connect" => {
                let Some(room) = words.next() else {
                    return Command::Invalid("Usage: /connect <room> [credential]".to_string());
                };
                let credential = words.next().map(str::to_string);
                if words.next().is_some() {
                    return Command::Invalid("Usage: /connect <room> [credential]".to_string());
                }
                Command::Connect {
                    room: room.to_string(),
                    credential,
                }
            }
            "/disconnect" => Command::Disconnect,
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            other if other.starts_with('/') => {
                Command::Invalid(format!("Unknown command '{}', try /help", other))
            }
            _ => Command::Invalid("Viewers cannot chat, try /help".to_string()),
        }
    }

    /// The request this command sends to the server, if any
    pub fn to_client_message(&self) -> Option<ClientMessage> {
        match self {
            Command::Connect { room, credential } => Some(ClientMessage::Connect {
                room: room.clone(),
                credential: credential.clone(),
            }),
            Command::Disconnect => Some(ClientMessage::Disconnect),
            _ => None,
        }
    }
}
