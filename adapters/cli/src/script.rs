//! Keystroke scripts that stand in for a live keyboard.
//!
//! Every token is one frame: `w`/`s` walk, `a`/`d` strafe, `<`/`>` turn,
//! `e` interacts and `.` waits. Whitespace is ignored.

use anyhow::{bail, Result};
use terminal_abyss_core::Intents;

/// Parses `script` into one set of intents per frame.
pub(crate) fn parse(script: &str) -> Result<Vec<Intents>> {
    let mut frames = Vec::new();
    for (position, token) in script.chars().enumerate() {
        if token.is_whitespace() {
            continue;
        }
        let mut intents = Intents::default();
        match token {
            'w' => intents.forward = true,
            's' => intents.backward = true,
            'a' => intents.strafe_left = true,
            'd' => intents.strafe_right = true,
            '<' => intents.turn_left = true,
            '>' => intents.turn_right = true,
            'e' => intents.interact = true,
            '.' => {}
            other => bail!("unknown script token `{other}` at position {position}"),
        }
        frames.push(intents);
    }
    Ok(frames)
}
