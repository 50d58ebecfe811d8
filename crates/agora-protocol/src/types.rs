//! Core protocol types: client commands and server lines.
//!
//! Both directions are plain text. A client line is classified by its first
//! whitespace-delimited token; a server line is one of a small, fixed
//! vocabulary rendered through [`Display`](std::fmt::Display).

use std::borrow::Cow;
use std::fmt;

use crate::ProtocolError;

/// The first tokens that make a client line a command rather than chat.
pub const COMMAND_KEYWORDS: [&str; 5] =
    ["/nick", "/join", "/leave", "/bye", "/priv"];

// ---------------------------------------------------------------------------
// Command — client → server
// ---------------------------------------------------------------------------

/// A classified client line.
///
/// ```text
/// /nick <name>            → Nick
/// /join <room>            → Join
/// /leave                  → Leave
/// /bye                    → Bye
/// /priv <name> <text...>  → Priv
/// /<anything else>        → Say (leading '/' stripped)
/// <anything else>         → Say (verbatim)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Take (or change to) a nickname.
    Nick(String),
    /// Enter a room, leaving the current one first.
    Join(String),
    /// Leave the current room.
    Leave,
    /// Say goodbye and close the connection.
    Bye,
    /// Send `text` to the holder of nickname `to`.
    Priv { to: String, text: String },
    /// Chat text for the sender's room.
    Say(String),
}

impl Command {
    /// Classifies an already-decoded, trimmed line.
    ///
    /// Extra arguments after `/leave` and `/bye` are ignored. Arguments to
    /// `/nick` and `/join` are taken as the rest of the line, trimmed.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidCommand`] when `/nick` or `/join`
    /// has no argument, or `/priv` has fewer than three segments.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };

        match keyword {
            "/nick" => required(keyword, rest).map(Self::Nick),
            "/join" => required(keyword, rest).map(Self::Join),
            "/leave" => Ok(Self::Leave),
            "/bye" => Ok(Self::Bye),
            "/priv" => {
                // `rest` is trimmed, so a successful split always leaves
                // non-empty text behind.
                let (to, text) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| {
                        ProtocolError::InvalidCommand(
                            "/priv needs a nickname and a message".into(),
                        )
                    })?;
                Ok(Self::Priv {
                    to: to.to_string(),
                    text: text.trim_start().to_string(),
                })
            }
            _ => {
                let text = line.strip_prefix('/').unwrap_or(line);
                Ok(Self::Say(text.to_string()))
            }
        }
    }

    /// A short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nick(_) => "nick",
            Self::Join(_) => "join",
            Self::Leave => "leave",
            Self::Bye => "bye",
            Self::Priv { .. } => "priv",
            Self::Say(_) => "say",
        }
    }
}

fn required(keyword: &str, arg: &str) -> Result<String, ProtocolError> {
    if arg.is_empty() {
        return Err(ProtocolError::InvalidCommand(format!(
            "{keyword} needs an argument"
        )));
    }
    Ok(arg.to_string())
}

/// Applies the client-side escaping rule to one outgoing line.
///
/// A line that starts with `/` but is not one of the five commands gets an
/// extra `/` so the server relays it as chat instead of misreading it.
/// The server strips exactly one leading slash from chat, so the text
/// arrives as the user typed it.
///
/// ```rust
/// use agora_protocol::escape_outgoing;
///
/// assert_eq!(escape_outgoing("/nick ana"), "/nick ana");
/// assert_eq!(escape_outgoing("/shrug"), "//shrug");
/// assert_eq!(escape_outgoing("hello"), "hello");
/// ```
pub fn escape_outgoing(line: &str) -> Cow<'_, str> {
    let first = line.split(' ').next().unwrap_or_default();
    if line.starts_with('/') && !COMMAND_KEYWORDS.contains(&first) {
        Cow::Owned(format!("/{line}"))
    } else {
        Cow::Borrowed(line)
    }
}

// ---------------------------------------------------------------------------
// ServerLine — server → client
// ---------------------------------------------------------------------------

/// Everything the server ever writes to a client, one line each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLine {
    /// The command succeeded.
    Ok,
    /// The command was rejected.
    Error,
    /// Reply to `/bye`; the connection closes right after.
    Bye,
    /// Someone entered the recipient's room.
    Joined(String),
    /// Someone left the recipient's room.
    Left(String),
    /// A nickname change.
    Renamed { old: String, new: String },
    /// A private message.
    Private { from: String, text: String },
    /// Room chat.
    Chat { from: String, text: String },
}

impl fmt::Display for ServerLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("OK"),
            Self::Error => f.write_str("ERROR"),
            Self::Bye => f.write_str("BYE"),
            Self::Joined(name) => write!(f, "JOINED {name}"),
            Self::Left(name) => write!(f, "LEFT {name}"),
            Self::Renamed { old, new } => {
                write!(f, "{old} mudou de nome para {new}")
            }
            Self::Private { from, text } => write!(f, "PRIVATE {from} {text}"),
            Self::Chat { from, text } => write!(f, "{from}: {text}"),
        }
    }
}
