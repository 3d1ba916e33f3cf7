//! Pseudo-terminal entry point

use crate::args;

#[cfg(unix)]
fn open(rows: u16, cols: u16) -> pigment_pty::Result<(i32, u32)> {
    let pty = pigment_pty::fork_pty(rows, cols)?;
    let pid = pty.child_id();
    Ok((pty.into_raw_fd(), pid))
}

#[cfg(not(unix))]
fn open(rows: u16, cols: u16) -> pigment_pty::Result<(i32, u32)> {
    pigment_pty::fork_pty(rows, cols).map(|pty| match pty {})
}

/// Start the user's shell on a new `rows`×`cols` pseudo-terminal.
///
/// Returns the master file descriptor, owned by the caller, or -1 on
/// failure. The shell's pid is stored in `out_pid`.
///
/// # Safety
/// `out_pid` must be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pigment_fork_pty(rows: u16, cols: u16, out_pid: *mut u32) -> i32 {
    match open(rows, cols) {
        Ok((fd, pid)) => {
            // SAFETY: guaranteed by the caller
            unsafe { args::write(out_pid, pid) };
            fd
        }
        Err(e) => {
            tracing::warn!("fork_pty: {}", e);
            -1
        }
    }
}
