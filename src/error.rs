use std::panic::Location;
use std::{fmt, sync::Arc};

use strum::IntoStaticStr;

/// Stable keys for the failures this crate raises itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Signature, timestamp or body did not match the application's public key.
    VerificationFailed,
    MalformedInteraction,
    UnsupportedInteraction,
    /// A second initial acknowledgment was attempted on one context.
    ResponseAlreadySent,
    /// A follow-up was attempted after the token validity window.
    TokenExpired,
    MalformedComponentIdentifier,
    /// The response kind does not fit the interaction (e.g. `reply` on autocomplete).
    InvalidResponseType,
    /// The transport stopped waiting for the initial acknowledgment.
    ResponseUndelivered,
    HandlerTimedOut,
    /// Dispatch finished without acknowledging the interaction.
    NoResponse,
    DuplicateCommand,
    DuplicateComponent,
    InvalidPublicKey,
    MissingSetting,
    InvalidSetting,
    DiscordApiError,
    HttpError,
}

impl ErrorKind {
    pub fn key(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone)]
pub enum Cause {
    Any(BotError),
    Std(Arc<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Clone)]
pub struct BotError {
    pub key: &'static str,
    pub causes: Vec<Cause>,
    pub file: &'static str,
    pub line: u32,
}

impl BotError {
    #[track_caller]
    #[inline]
    pub fn new(key: &'static str) -> Self {
        let loc = Location::caller();
        Self {
            key,
            causes: Vec::new(),
            file: loc.file(),
            line: loc.line(),
        }
    }

    #[track_caller]
    #[inline]
    pub fn kind(kind: ErrorKind) -> Self {
        let loc = Location::caller();
        Self {
            key: kind.key(),
            causes: Vec::new(),
            file: loc.file(),
            line: loc.line(),
        }
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.key == kind.key()
    }

    #[inline]
    pub fn push_any(mut self, cause: BotError) -> Self {
        self.causes.push(Cause::Any(cause));
        self
    }

    #[inline]
    pub fn push_str(mut self, message: impl Into<String>) -> Self {
        self.causes
            .push(Cause::Std(Arc::new(std::io::Error::other(message.into()))));
        self
    }

    #[inline]
    pub fn push_std(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.causes.push(Cause::Std(Arc::new(cause)));
        self
    }

    /// Log the error with an ASCII tree of its causes, one `tracing` event per line.
    pub fn log_tree(&self) {
        tracing::error!("{}:{} - {}", self.file, self.line, self.key);
        for line in self.tree_lines("") {
            tracing::error!("{}", line);
        }
    }

    fn tree_lines(&self, prefix: &str) -> Vec<String> {
        let mut lines = Vec::new();
        for (i, cause) in self.causes.iter().enumerate() {
            let is_last = i == self.causes.len() - 1;
            let branch = if is_last { "└── " } else { "├── " };
            let extension = if is_last { "    " } else { "│   " };

            match cause {
                Cause::Any(e) => {
                    lines.push(format!("{}{}[{}:{}] {}", prefix, branch, e.file, e.line, e.key));
                    lines.extend(e.tree_lines(&format!("{}{}", prefix, extension)));
                }
                Cause::Std(e) => {
                    lines.push(format!("{}{}{}", prefix, branch, e));

                    let mut source = e.source();
                    let mut depth = 0;
                    while let Some(err) = source {
                        lines.push(format!(
                            "{}{}{}↳ {}",
                            prefix,
                            extension,
                            "  ".repeat(depth + 1),
                            err
                        ));
                        source = err.source();
                        depth += 1;
                    }
                }
            }
        }
        lines
    }
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}] {}", self.file, self.line, self.key)?;
        if !self.causes.is_empty() {
            write!(f, " (causes: {})", self.causes.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for BotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes.iter().find_map(|c| match c {
            Cause::Any(e) => Some(e as &dyn std::error::Error),
            Cause::Std(e) => Some(e.as_ref()),
        })
    }
}

impl From<reqwest::Error> for BotError {
    #[track_caller]
    fn from(e: reqwest::Error) -> Self {
        BotError::new("reqwest").push_std(e)
    }
}

impl From<serde_json::Error> for BotError {
    #[track_caller]
    fn from(e: serde_json::Error) -> Self {
        BotError::new("serde_json").push_std(e)
    }
}

impl From<std::io::Error> for BotError {
    #[track_caller]
    fn from(e: std::io::Error) -> Self {
        BotError::new("io_error").push_std(e)
    }
}

impl From<String> for BotError {
    #[track_caller]
    fn from(s: String) -> Self {
        BotError::new("string_error").push_str(s)
    }
}

impl From<&str> for BotError {
    #[track_caller]
    fn from(s: &str) -> Self {
        BotError::new("str_error").push_str(s)
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
