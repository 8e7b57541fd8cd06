use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};

/// Import path of the project at `root`: the `module` line of `go.mod`, else the root's
/// position below `<gopath>/src/` for one of `gopaths`.
pub fn detect_import_path(root: &Utf8Path, gopaths: &[Utf8PathBuf]) -> anyhow::Result<Option<String>> {
    let go_mod = root.join("go.mod");
    match std::fs::read_to_string(&go_mod) {
        Ok(text) => {
            if let Some(module) = parse_module_line(&text) {
                tracing::debug!(import_path = %module, "import path from go.mod");
                return Ok(Some(module));
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).with_context(|| format!("read {go_mod}")),
    }

    let from_gopath = gopath_import_path(root, gopaths);
    if let Some(path) = &from_gopath {
        tracing::debug!(import_path = %path, "import path from GOPATH");
    }
    Ok(from_gopath)
}

/// The module path declared by `go.mod` text, if any.
pub fn parse_module_line(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or_default().trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) && !rest.starts_with('"') {
            return None;
        }
        let module = rest.trim().trim_matches(|c| c == '"' || c == '`');
        (!module.is_empty()).then(|| module.to_string())
    })
}

fn gopath_import_path(root: &Utf8Path, gopaths: &[Utf8PathBuf]) -> Option<String> {
    gopaths.iter().find_map(|gopath| {
        let rel = root.strip_prefix(gopath.join("src")).ok()?;
        let path = rel
            .components()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join("/");
        (!path.is_empty()).then_some(path)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{utf8_root, write_file};
    use tempfile::TempDir;

    #[test]
    fn module_line_forms() {
        assert_eq!(
            parse_module_line("// header\nmodule example.com/app\n\ngo 1.22\n").as_deref(),
            Some("example.com/app")
        );
        assert_eq!(
            parse_module_line("module \"example.com/quoted\" // comment\n").as_deref(),
            Some("example.com/quoted")
        );
        assert_eq!(parse_module_line("modules example.com/x\n"), None);
        assert_eq!(parse_module_line("go 1.22\n"), None);
    }

    #[test]
    fn go_mod_wins_over_gopath() {
        let tmp = TempDir::new().expect("temp dir");
        let gopath = utf8_root(&tmp);
        let root = gopath.join("src/github.com/acme/tool");
        write_file(&root.join("go.mod"), "module example.com/tool\n");

        let found = detect_import_path(&root, &[gopath]).expect("detect");
        assert_eq!(found.as_deref(), Some("example.com/tool"));
    }

    #[test]
    fn gopath_position_is_used_without_go_mod() {
        let tmp = TempDir::new().expect("temp dir");
        let gopath = utf8_root(&tmp);
        let root = gopath.join("src/github.com/acme/tool");
        std::fs::create_dir_all(&root).expect("create root");

        let found = detect_import_path(&root, &[Utf8PathBuf::from("/nowhere"), gopath]).expect("detect");
        assert_eq!(found.as_deref(), Some("github.com/acme/tool"));
    }

    #[test]
    fn unknown_outside_gopath_without_go_mod() {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp);
        assert_eq!(detect_import_path(&root, &[]).expect("detect"), None);
    }
}
