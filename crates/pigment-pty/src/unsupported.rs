//! Placeholder for platforms without pseudo-terminals

use std::path::Path;

use crate::{PtyError, Result};

/// A pseudo-terminal; cannot be constructed on this platform
#[derive(Debug)]
pub enum Pty {}

impl Pty {
    pub fn spawn(shell: &Path, rows: u16, cols: u16) -> Result<Self> {
        tracing::warn!("Cannot open a {}x{} pty for {:?} on this platform", rows, cols, shell);
        Err(PtyError::Unsupported)
    }

    pub fn child_id(&self) -> u32 {
        match *self {}
    }

    pub fn resize(&self, _rows: u16, _cols: u16) -> Result<()> {
        match *self {}
    }

    pub fn window_size(&self) -> Result<(u16, u16)> {
        match *self {}
    }
}
