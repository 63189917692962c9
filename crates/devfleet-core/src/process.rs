use crate::error::{FleetError, Result};
use std::path::Path;
use std::process::{Command, Output};

pub(crate) fn stderr_trimmed(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

pub(crate) fn stderr_or_status(output: &Output) -> String {
    let stderr = stderr_trimmed(output);
    if !stderr.is_empty() {
        return stderr;
    }
    format!("exit status {}", output.status)
}

/// Run a whitespace-separated command line inside `dir`.
/// An empty line is a no-op.
pub fn run_line(dir: &Path, line: &str) -> Result<()> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((program, args)) = words.split_first() else {
        return Ok(());
    };

    let output = Command::new(program).args(args).current_dir(dir).output()?;
    if output.status.success() {
        return Ok(());
    }
    Err(FleetError::CommandFailed(format!(
        "{line}: {}",
        stderr_or_status(&output)
    )))
}
