//! Pigment PTY - Pseudo-terminal allocation
//!
//! Opens a pseudo-terminal pair and starts the user's shell on the slave
//! side, for hosts that draw a terminal with the renderer. Only Unix
//! platforms are supported; elsewhere every call fails with
//! [`PtyError::Unsupported`].

use std::io;
use std::path::PathBuf;

#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod unsupported;

#[cfg(unix)]
pub use unix::Pty;
#[cfg(not(unix))]
pub use unsupported::Pty;

/// `TERM` value exported to the shell
pub const TERM: &str = "xterm-256color";

const FALLBACK_SHELL: &str = "/bin/sh";

/// Pseudo-terminal errors
#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("Failed to open pseudo-terminal: {0}")]
    Open(#[source] io::Error),

    #[error("Failed to spawn {shell:?}: {source}")]
    Spawn {
        shell: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to resize pseudo-terminal: {0}")]
    Resize(#[source] io::Error),

    #[error("Pseudo-terminals are not supported on this platform")]
    Unsupported,
}

pub type Result<T> = std::result::Result<T, PtyError>;

/// The user's login shell from `$SHELL`, or `/bin/sh`
pub fn default_shell() -> PathBuf {
    std::env::var_os("SHELL")
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(FALLBACK_SHELL))
}

/// Open a `rows`×`cols` pseudo-terminal running the user's shell
pub fn fork_pty(rows: u16, cols: u16) -> Result<Pty> {
    Pty::spawn(&default_shell(), rows, cols)
}
