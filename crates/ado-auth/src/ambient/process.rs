use std::time::Duration;

use crate::error::AuthError;

/// Upper bound on a developer tool invocation.
const TOOL_TIMEOUT: Duration = Duration::from_secs(20);

/// Run a developer CLI and return its stdout.
///
/// A missing binary, a non-zero exit, or a timeout all map to
/// [`AuthError::SourceUnavailable`] so the chain moves on.
pub(super) async fn run_tool(
    source_name: &'static str,
    program: &str,
    args: &[&str],
) -> Result<Vec<u8>, AuthError> {
    let unavailable = |message: String| AuthError::SourceUnavailable {
        source_name,
        message,
    };

    let child = tokio::process::Command::new(program)
        .args(args)
        .stdin(std::process::Stdio::null())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(TOOL_TIMEOUT, child).await {
        Err(_) => {
            return Err(unavailable(format!(
                "{program} did not finish within {}s",
                TOOL_TIMEOUT.as_secs()
            )));
        }
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(unavailable(format!("{program} not found on PATH")));
        }
        Ok(Err(e)) => return Err(unavailable(format!("failed to run {program}: {e}"))),
        Ok(Ok(output)) => output,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(unavailable(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(output.stdout)
}

/// Platform name of a CLI that ships as a `.cmd` shim on Windows.
pub(super) fn tool_program(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.cmd")
    } else {
        name.to_string()
    }
}
