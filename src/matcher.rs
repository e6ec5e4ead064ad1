use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A keystroke as seen by the matcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyInput {
    /// A single printable character; the only input that gets scored.
    Char(char),
    Backspace,
    Enter,
    /// Arrows, function keys, bare modifiers, chords and key releases.
    Ignored,
}

impl KeyInput {
    pub fn from_key_event(key: &KeyEvent) -> Self {
        if key.kind == KeyEventKind::Release {
            return KeyInput::Ignored;
        }

        match key.code {
            KeyCode::Char(c) => {
                if key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    || c.is_control()
                {
                    KeyInput::Ignored
                } else {
                    KeyInput::Char(c)
                }
            }
            KeyCode::Backspace => KeyInput::Backspace,
            KeyCode::Enter => KeyInput::Enter,
            _ => KeyInput::Ignored,
        }
    }
}

impl From<KeyEvent> for KeyInput {
    fn from(key: KeyEvent) -> Self {
        KeyInput::from_key_event(&key)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The character was the expected one and the word still has characters left.
    Advanced,
    /// The character was the expected one and completed the word.
    WordComplete,
    Miss,
    Deleted,
    /// Confirm key, swallowed without effect.
    Suppressed,
    Ignored,
}

/// Decide what `input` does to `typed`, which must be a prefix of `word`.
///
/// Appends or removes characters in place; counters and word advancement
/// are left to the caller.
pub fn apply_key(word: &str, typed: &mut String, input: KeyInput) -> MatchOutcome {
    debug_assert!(word.starts_with(typed.as_str()));

    match input {
        KeyInput::Char(c) => match expected_char(word, typed) {
            Some(expected) if expected == c => {
                typed.push(c);
                if typed.len() == word.len() {
                    MatchOutcome::WordComplete
                } else {
                    MatchOutcome::Advanced
                }
            }
            Some(_) => MatchOutcome::Miss,
            // the word is already complete; nothing left to match
            None => MatchOutcome::Ignored,
        },
        KeyInput::Backspace => {
            if typed.pop().is_some() {
                MatchOutcome::Deleted
            } else {
                MatchOutcome::Ignored
            }
        }
        KeyInput::Enter => MatchOutcome::Suppressed,
        KeyInput::Ignored => MatchOutcome::Ignored,
    }
}

/// The next character the player has to type.
pub fn expected_char(word: &str, typed: &str) -> Option<char> {
    word.get(typed.len()..).and_then(|rest| rest.chars().next())
}
