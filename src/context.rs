//! Runtime-context gate.
//!
//! Firebase web clients only make sense where a user is present. The host
//! decides which kind of process it is and passes an [`ExecutionContext`] to the
//! initializer instead of the initializer sniffing ambient globals.

use crate::config::EnvSource;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Environment key read by [`ExecutionContext::from_source`].
pub const CONTEXT_ENV_KEY: &str = "FIREBASE_EXECUTION_CONTEXT";

/// Where the current process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionContext {
    /// An interactive client (desktop app, CLI with a user, WASM front-end).
    #[default]
    InteractiveClient,
    /// Server-side rendering or a backend worker: the web client is not used.
    Server,
    /// A test harness that wants a real initialization.
    Test,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown execution context: {0:?}")]
pub struct UnknownContextError(pub String);

impl ExecutionContext {
    /// Whether the Firebase client should be initialized in this context.
    pub fn is_initializable(self) -> bool {
        match self {
            ExecutionContext::InteractiveClient | ExecutionContext::Test => true,
            ExecutionContext::Server => false,
        }
    }

    /// Reads [`CONTEXT_ENV_KEY`] from `source`.
    ///
    /// An absent key means [`ExecutionContext::InteractiveClient`]. A value that
    /// cannot be parsed is logged and treated as [`ExecutionContext::Server`], so a
    /// typo never initializes a client where it was meant to be off.
    pub fn from_source(source: &impl EnvSource) -> Self {
        match source.get(CONTEXT_ENV_KEY) {
            None => ExecutionContext::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e: UnknownContextError| {
                warn!(error = %e, "falling back to server context");
                ExecutionContext::Server
            }),
        }
    }
}

impl FromStr for ExecutionContext {
    type Err = UnknownContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" | "interactive" | "interactive_client" | "browser" => {
                Ok(ExecutionContext::InteractiveClient)
            }
            "server" | "ssr" => Ok(ExecutionContext::Server),
            "test" => Ok(ExecutionContext::Test),
            _ => Err(UnknownContextError(s.to_string())),
        }
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionContext::InteractiveClient => "interactive_client",
            ExecutionContext::Server => "server",
            ExecutionContext::Test => "test",
        };
        f.write_str(name)
    }
}
