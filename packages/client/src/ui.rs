//! UI utilities for the client.

use std::io::Write;

pub const PROMPT: &str = "relay> ";

/// Redisplay the prompt after receiving a message
pub fn redisplay_prompt() {
    print!("{}", PROMPT);
    std::io::stdout().flush().ok();
}
