//! Fakes and a temp-dir fixture for use case tests.

use crate::context::{AppContext, load_config};
use buildgate_domain::tool::{Invocation, ToolOutput};
use buildgate_exec::{RevisionSource, ToolRunner, VcsRevision};
use buildgate_settings::Overrides;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

type Handler = Arc<dyn Fn(&Invocation) -> ToolOutput + Send + Sync>;

/// Answers invocations by program name and records every call.
#[derive(Clone, Default)]
pub struct FakeRunner {
    handlers: BTreeMap<String, Handler>,
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(mut self, program: &str, handler: F) -> Self
    where
        F: Fn(&Invocation) -> ToolOutput + Send + Sync + 'static,
    {
        self.handlers.insert(program.to_string(), Arc::new(handler));
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl ToolRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> ToolOutput {
        self.calls
            .lock()
            .expect("calls lock")
            .push(invocation.clone());
        match self.handlers.get(&invocation.program) {
            Some(handler) => handler(invocation),
            None => ToolOutput {
                spawn_error: Some(format!("{}: not found", invocation.program)),
                ..ToolOutput::default()
            },
        }
    }
}

/// A handler that exits with `code` and prints `stdout`.
pub fn respond(code: i32, stdout: &str) -> impl Fn(&Invocation) -> ToolOutput + Send + Sync + 'static {
    let stdout = stdout.to_string();
    move |_| ToolOutput {
        exit_code: Some(code),
        stdout: stdout.clone(),
        ..ToolOutput::default()
    }
}

#[derive(Clone, Debug, Default)]
pub struct FakeRevisions {
    revision: Option<VcsRevision>,
    tag: Option<String>,
}

impl FakeRevisions {
    pub fn clean(commit: &str) -> Self {
        Self {
            revision: Some(VcsRevision {
                commit: commit.to_string(),
                dirty: false,
            }),
            tag: None,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn tagged(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }
}

impl RevisionSource for FakeRevisions {
    fn revision(&self) -> Option<VcsRevision> {
        self.revision.clone()
    }

    fn describe(&self) -> Option<String> {
        self.tag
            .clone()
            .or_else(|| self.revision.as_ref().map(|r| r.commit.clone()))
    }
}

/// A throwaway project tree plus optional `buildgate.toml` text.
pub struct Fixture {
    _tmp: TempDir,
    root: Utf8PathBuf,
    config: String,
}

impl Fixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 temp dir");
        Self {
            _tmp: tmp,
            root,
            config: String::new(),
        }
    }

    pub fn file(self, rel: &str, contents: &str) -> Self {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(&path, contents).expect("write fixture file");
        self
    }

    pub fn config(mut self, text: &str) -> Self {
        self.config = text.to_string();
        self
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn context_full(&self, runner: FakeRunner, revisions: FakeRevisions) -> AppContext {
        let config = load_config(&self.config, Overrides::default()).expect("fixture config");
        AppContext::new(&self.root, config, Arc::new(runner), Arc::new(revisions)).expect("fixture context")
    }

    pub fn context(&self, runner: FakeRunner) -> AppContext {
        self.context_full(runner, FakeRevisions::clean("abc1234"))
    }

    pub fn context_with(&self, revisions: FakeRevisions) -> AppContext {
        self.context_full(FakeRunner::new(), revisions)
    }
}
