//! OGG Opus to WAV conversion with ffmpeg.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::relay::backend::Transcoder;

#[derive(Debug)]
pub enum TranscodeError {
    /// The executable could not be found.
    NotInstalled(PathBuf),
    /// ffmpeg ran and reported failure.
    Failed(ExitStatus),
    TimedOut(Duration),
    /// Spawning failed for a reason other than a missing executable.
    Spawn(io::Error),
}

impl fmt::Display for TranscodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInstalled(program) => write!(f, "{} not found", program.display()),
            Self::Failed(status) => write!(f, "ffmpeg failed: {status}"),
            Self::TimedOut(limit) => write!(f, "ffmpeg did not finish within {}s", limit.as_secs()),
            Self::Spawn(e) => write!(f, "failed to run ffmpeg: {e}"),
        }
    }
}

impl std::error::Error for TranscodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

/// Runs an external ffmpeg binary.
pub struct Ffmpeg {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl Ffmpeg {
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self { program: program.into(), timeout }
    }
}

#[async_trait]
impl Transcoder for Ffmpeg {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        let mut command = Command::new(&self.program);
        command
            .arg("-y") // Overwrite
            .arg("-i")
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        debug!("Converting {:?} to {:?}", input, output);

        let status = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.status())
                .await
                .map_err(|_| TranscodeError::TimedOut(limit))?,
            None => command.status().await,
        };

        let status = status.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TranscodeError::NotInstalled(self.program.clone()),
            _ => TranscodeError::Spawn(e),
        })?;

        if !status.success() {
            return Err(TranscodeError::Failed(status));
        }
        Ok(())
    }
}
