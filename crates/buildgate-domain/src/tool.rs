//! Data exchanged with external tools. Spawning lives in `buildgate-exec`.

use std::collections::BTreeMap;

/// A fully expanded external command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    /// Repo-relative working directory (`.` for the project root).
    pub cwd: String,
}

impl Invocation {
    /// Build from an already expanded argv; `None` if argv is empty.
    pub fn from_argv(argv: Vec<String>) -> Option<Self> {
        let mut it = argv.into_iter();
        let program = it.next()?;
        Some(Self {
            program,
            args: it.collect(),
            env: BTreeMap::new(),
            cwd: ".".to_string(),
        })
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Shell-like rendering for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(|s| s.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// What came back from one external invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was killed by a signal or never started.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Set when the process could not be spawned at all.
    pub spawn_error: Option<String>,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.spawn_error.is_none() && self.exit_code == Some(0)
    }

    /// Output lines in emission order per stream: stdout first, then stderr.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines().chain(self.stderr.lines())
    }

    /// Last `max` non-empty output lines, for attaching to failure findings.
    pub fn tail(&self, max: usize) -> Vec<String> {
        let lines: Vec<&str> = self.lines().filter(|l| !l.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(max);
        lines[start..].iter().map(|l| l.to_string()).collect()
    }

    pub fn describe_failure(&self) -> String {
        if let Some(err) = &self.spawn_error {
            return format!("failed to start: {err}");
        }
        match self.exit_code {
            Some(code) => format!("exited with status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}
