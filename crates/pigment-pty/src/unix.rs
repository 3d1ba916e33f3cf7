//! Unix pseudo-terminals via `openpty`

use std::fs::File;
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, IntoRawFd, OwnedFd, RawFd};
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};

use nix::fcntl::{FcntlArg, FdFlag, fcntl};
use nix::pty::{Winsize, openpty};
use nix::unistd::setsid;

use crate::{PtyError, Result, TERM};

nix::ioctl_write_int_bad!(set_controlling_terminal, nix::libc::TIOCSCTTY);
nix::ioctl_write_ptr_bad!(set_window_size, nix::libc::TIOCSWINSZ, Winsize);
nix::ioctl_read_bad!(get_window_size, nix::libc::TIOCGWINSZ, Winsize);

fn winsize(rows: u16, cols: u16) -> Winsize {
    Winsize {
        ws_row: rows,
        ws_col: cols,
        ws_xpixel: 0,
        ws_ypixel: 0,
    }
}

/// Master side of a pseudo-terminal with a shell attached to the slave
#[derive(Debug)]
pub struct Pty {
    master: OwnedFd,
    child: Child,
}

impl Pty {
    /// Open a `rows`×`cols` pty and run `shell` as a session leader with
    /// the slave as its controlling terminal and stdio
    pub fn spawn(shell: &Path, rows: u16, cols: u16) -> Result<Self> {
        let size = winsize(rows, cols);
        let pair = openpty(&size, None).map_err(|e| PtyError::Open(e.into()))?;

        // Neither end leaks into the shell except through stdio
        for fd in [&pair.master, &pair.slave] {
            fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))
                .map_err(|e| PtyError::Open(e.into()))?;
        }

        let stdin = pair.slave.try_clone().map_err(PtyError::Open)?;
        let stdout = pair.slave.try_clone().map_err(PtyError::Open)?;

        let mut command = Command::new(shell);
        command
            .env("TERM", TERM)
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(pair.slave));

        // SAFETY: setsid and ioctl are async-signal-safe
        unsafe {
            command.pre_exec(|| {
                setsid()?;
                set_controlling_terminal(0, 0)?;
                Ok(())
            });
        }

        let child = command.spawn().map_err(|source| PtyError::Spawn {
            shell: shell.to_path_buf(),
            source,
        })?;

        tracing::debug!("Spawned {:?} (pid {}) on a {}x{} pty", shell, child.id(), rows, cols);
        Ok(Self {
            master: pair.master,
            child,
        })
    }

    /// Process id of the shell
    pub fn child_id(&self) -> u32 {
        self.child.id()
    }

    /// Change the terminal size; the shell receives `SIGWINCH`
    pub fn resize(&self, rows: u16, cols: u16) -> Result<()> {
        let size = winsize(rows, cols);
        // SAFETY: the fd is open for the lifetime of self and size outlives the call
        unsafe { set_window_size(self.master.as_raw_fd(), &size) }
            .map_err(|e| PtyError::Resize(e.into()))?;
        Ok(())
    }

    /// Current terminal size as `(rows, cols)`
    pub fn window_size(&self) -> Result<(u16, u16)> {
        let mut size = winsize(0, 0);
        // SAFETY: the fd is open for the lifetime of self
        unsafe { get_window_size(self.master.as_raw_fd(), &mut size) }
            .map_err(|e| PtyError::Resize(e.into()))?;
        Ok((size.ws_row, size.ws_col))
    }

    /// Independent handle on the master for reading and writing
    pub fn try_clone_file(&self) -> io::Result<File> {
        Ok(File::from(self.master.try_clone()?))
    }

    /// Wait for the shell to exit
    pub fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait()
    }

    /// Give up ownership of the master descriptor.
    ///
    /// The shell keeps running; reaping it is left to the caller.
    pub fn into_raw_fd(self) -> RawFd {
        tracing::debug!("Releasing pty master for pid {}", self.child.id());
        self.master.into_raw_fd()
    }
}

impl AsFd for Pty {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.master.as_fd()
    }
}
