use buildgate_domain::tool::{Invocation, ToolOutput};
use camino::{Utf8Path, Utf8PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

/// Runs external tools. Implementations must be shareable across worker threads.
pub trait ToolRunner: Send + Sync {
    /// Run to completion. Spawn failures are reported through [`ToolOutput::spawn_error`],
    /// never as a panic or an `Err`, so one broken tool cannot abort its siblings.
    fn run(&self, invocation: &Invocation) -> ToolOutput;
}

/// Spawns real processes with the project root as the base working directory.
#[derive(Clone, Debug)]
pub struct ProcessRunner {
    root: Utf8PathBuf,
}

impl ProcessRunner {
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> ToolOutput {
        let cwd = if invocation.cwd == "." {
            self.root.clone()
        } else {
            self.root.join(&invocation.cwd)
        };
        let started = Instant::now();
        tracing::debug!(command = %invocation.display(), cwd = %cwd, "spawning");

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(&invocation.env)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .output();

        match output {
            Ok(out) => {
                let result = ToolOutput {
                    exit_code: out.status.code(),
                    stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
                    spawn_error: None,
                };
                tracing::debug!(
                    command = %invocation.program,
                    exit_code = ?result.exit_code,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "finished"
                );
                result
            }
            Err(e) => {
                tracing::warn!(command = %invocation.program, error = %e, "could not spawn");
                ToolOutput {
                    exit_code: None,
                    stdout: String::new(),
                    stderr: String::new(),
                    spawn_error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn root() -> (tempfile::TempDir, Utf8PathBuf) {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8");
        (tmp, root)
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let (_tmp, root) = root();
        let runner = ProcessRunner::new(&root);
        let inv = Invocation::from_argv(vec!["buildgate-no-such-tool-xyz".to_string()]).expect("inv");
        let out = runner.run(&inv);
        assert!(out.spawn_error.is_some());
        assert!(!out.success());
    }

    #[cfg(unix)]
    #[test]
    fn captures_streams_exit_code_and_env() {
        let (_tmp, root) = root();
        let runner = ProcessRunner::new(&root);
        let inv = Invocation::from_argv(vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo out-$GOOS; echo err >&2; exit 3".to_string(),
        ])
        .expect("inv")
        .with_env(BTreeMap::from([("GOOS".to_string(), "linux".to_string())]));
        let out = runner.run(&inv);
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stdout.trim(), "out-linux");
        assert_eq!(out.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[test]
    fn runs_in_project_root() {
        let (_tmp, root) = root();
        std::fs::write(root.join("marker"), "x").expect("write");
        let runner = ProcessRunner::new(&root);
        let inv = Invocation::from_argv(vec!["ls".to_string()]).expect("inv");
        assert!(runner.run(&inv).stdout.contains("marker"));
    }
}
