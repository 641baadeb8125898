use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::Context;
use tracing::debug;

pub const GIT_BIN: &str = "git";

/// Runs an external command to completion with inherited stdio, treating a
/// non-zero exit as a failure.
pub fn run<S: AsRef<OsStr>>(program: &str, args: &[S], dir: &Path) -> anyhow::Result<()> {
    let shown: Vec<String> = args
        .iter()
        .map(|arg| arg.as_ref().to_string_lossy().into_owned())
        .collect();
    debug!(program, args = ?shown, dir = %dir.display(), "running external command");

    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .status()
        .with_context(|| format!("failed to launch '{program}'"))?;

    if !status.success() {
        match status.code() {
            Some(code) => anyhow::bail!(
                "'{program} {}' exited with status {code}",
                shown.join(" ")
            ),
            None => anyhow::bail!("'{program} {}' was terminated by a signal", shown.join(" ")),
        }
    }

    Ok(())
}

/// Spawns a command detached from the current process, without waiting.
/// Used to hand a project off to the engine editor.
pub fn run_detached<S: AsRef<OsStr>>(program: &str, args: &[S]) -> anyhow::Result<()> {
    debug!(program, "spawning detached command");
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to launch '{program}'"))?;
    Ok(())
}

/// Probes for an executable by invoking `<program> --version` with all
/// output suppressed.
pub fn is_installed(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_fails_for_missing_executable() {
        assert!(!is_installed("gdkit-definitely-not-a-real-binary"));
    }

    #[cfg(unix)]
    #[test]
    fn run_maps_nonzero_exit_to_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = run("sh", &["-c", "exit 3"], temp.path()).expect_err("should fail");
        assert!(err.to_string().contains("status 3"));
    }

    #[cfg(unix)]
    #[test]
    fn run_succeeds_for_zero_exit() {
        let temp = tempfile::tempdir().expect("tempdir");
        run("sh", &["-c", "exit 0"], temp.path()).expect("should succeed");
    }
}
