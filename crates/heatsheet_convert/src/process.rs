//! External process execution shared by the office backends.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use fs_extra::file::{move_file, CopyOptions};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{ConvertError, ConvertResult};

/// Captured result of one external process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub exit_code: i64,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Run `command` to completion, capturing its output.
///
/// The child is not killed when the returned future is dropped; it is only
/// killed when `timeout_seconds` (0 = none) elapses.
pub async fn run_process(
    converter: &str,
    mut command: Command,
    timeout_seconds: u64,
) -> ConvertResult<ProcessOutput> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(false);

    debug!("Executing: {:?}", command.as_std());

    let mut child = command.spawn().map_err(|e| ConvertError::SpawnFailed {
        converter: converter.to_string(),
        message: e.to_string(),
    })?;

    let stdout_task = tokio::spawn(read_stream(child.stdout.take()));
    let stderr_task = tokio::spawn(read_stream(child.stderr.take()));

    let status = if timeout_seconds > 0 {
        match timeout(Duration::from_secs(timeout_seconds), child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                warn!("{} timed out after {}s, killing it", converter, timeout_seconds);
                let _ = child.start_kill();
                return Err(ConvertError::Timeout {
                    converter: converter.to_string(),
                    seconds: timeout_seconds,
                });
            }
        }
    } else {
        child.wait().await?
    };

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();

    Ok(ProcessOutput {
        exit_code: status.code().map(i64::from).unwrap_or(-1),
        stdout,
        stderr,
    })
}

async fn read_stream<R: AsyncRead + Unpin>(stream: Option<R>) -> String {
    let Some(mut stream) = stream else {
        return String::new();
    };
    let mut buffer = Vec::new();
    let _ = stream.read_to_end(&mut buffer).await;
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Move a converted file to its final location, replacing any existing file.
/// Works across file systems.
pub fn move_into_place(from: &Path, to: &Path) -> ConvertResult<()> {
    let options = CopyOptions::new().overwrite(true);
    move_file(from, to, &options)?;
    debug!("Moved {:?} to {:?}", from, to);
    Ok(())
}

/// Create the private working directory of one conversion.
pub fn work_dir() -> ConvertResult<tempfile::TempDir> {
    Ok(tempfile::Builder::new().prefix("heatsheet-").tempdir()?)
}
