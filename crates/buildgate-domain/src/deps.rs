//! Vendored dependency reconciliation.
//!
//! The declared set comes from the whole manifest; the imported set only from the files the
//! scope selects. Both sets are ordered lexically so the output is stable.

use crate::fingerprint::stamp;
use buildgate_types::ids;
use buildgate_types::{CheckMode, CheckResult, Finding, Location, RepoPath, Severity, Verdict};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

/// `extra` (declared, never imported) and `missing` (imported, never declared).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DependencyDiff {
    pub extra: BTreeSet<String>,
    pub missing: BTreeSet<String>,
}

impl DependencyDiff {
    pub fn is_consistent(&self) -> bool {
        self.extra.is_empty() && self.missing.is_empty()
    }
}

pub fn reconcile(declared: &BTreeSet<String>, imported: &BTreeSet<String>) -> DependencyDiff {
    DependencyDiff {
        extra: declared.difference(imported).cloned().collect(),
        missing: imported.difference(declared).cloned().collect(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclaredPackage {
    pub name: String,
    /// 1-based line of the entry in the manifest, when it could be located.
    pub line: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyManifest {
    pub path: RepoPath,
    pub packages: Vec<DeclaredPackage>,
}

impl DependencyManifest {
    pub fn declared(&self) -> BTreeSet<String> {
        self.packages.iter().map(|p| p.name.clone()).collect()
    }

    fn line_of(&self, name: &str) -> Option<u32> {
        self.packages
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.line)
    }
}

/// One external import found in a source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportSite {
    pub package: String,
    pub path: RepoPath,
    pub line: u32,
}

/// A source file that could not be scanned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnparsableSource {
    pub path: RepoPath,
    pub reason: String,
}

/// External imports of every in-scope source file, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportScan {
    pub sites: Vec<ImportSite>,
    pub unparsable: Vec<UnparsableSource>,
}

impl ImportScan {
    pub fn imported(&self) -> BTreeSet<String> {
        self.sites.iter().map(|s| s.package.clone()).collect()
    }

    fn first_sites(&self) -> BTreeMap<&str, &ImportSite> {
        let mut first = BTreeMap::new();
        for site in &self.sites {
            first.entry(site.package.as_str()).or_insert(site);
        }
        first
    }
}

/// Diff plus the check result the pipeline reports for it.
#[derive(Clone, Debug)]
pub struct DependencyEvaluation {
    pub diff: DependencyDiff,
    pub result: CheckResult,
}

pub fn evaluate_dependencies(
    check_id: &str,
    mode: CheckMode,
    manifest: &DependencyManifest,
    scan: &ImportScan,
) -> DependencyEvaluation {
    let diff = reconcile(&manifest.declared(), &scan.imported());
    let severity = mode.finding_severity();
    let first_sites = scan.first_sites();

    let mut findings = Vec::new();
    for name in &diff.extra {
        let location = Some(match manifest.line_of(name) {
            Some(line) => Location::line(manifest.path.clone(), line),
            None => Location::file(manifest.path.clone()),
        });
        findings.push(stamp(Finding {
            severity,
            check_id: check_id.to_string(),
            code: ids::CODE_UNUSED_PACKAGE.to_string(),
            message: format!("{} {}", ids::TAG_UNUSED, name),
            location,
            tool_severity: None,
            help: Some("Remove the package from the vendor manifest, or import it.".to_string()),
            fingerprint: None,
            data: json!({ "package": name, "tag": ids::TAG_UNUSED }),
        }));
    }
    for name in &diff.missing {
        let location = first_sites
            .get(name.as_str())
            .map(|site| Location::line(site.path.clone(), site.line));
        findings.push(stamp(Finding {
            severity,
            check_id: check_id.to_string(),
            code: ids::CODE_MISSING_PACKAGE.to_string(),
            message: format!("{} {}", ids::TAG_MISSING, name),
            location,
            tool_severity: None,
            help: Some("Vendor the package and add it to the manifest.".to_string()),
            fingerprint: None,
            data: json!({ "package": name, "tag": ids::TAG_MISSING }),
        }));
    }
    for bad in &scan.unparsable {
        findings.push(stamp(Finding {
            severity: Severity::Info,
            check_id: check_id.to_string(),
            code: ids::CODE_SOURCE_UNPARSABLE.to_string(),
            message: format!("imports not readable: {}", bad.reason),
            location: Some(Location::file(bad.path.clone())),
            tool_severity: None,
            help: None,
            fingerprint: None,
            data: serde_json::Value::Null,
        }));
    }

    let result = CheckResult {
        check_id: check_id.to_string(),
        mode,
        verdict: Verdict::from_pass(diff.is_consistent()),
        findings,
        exit_code: None,
        duration_ms: 0,
    };
    DependencyEvaluation { diff, result }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn manifest(names: &[&str]) -> DependencyManifest {
        DependencyManifest {
            path: RepoPath::new("vendor/vendor.json"),
            packages: names
                .iter()
                .enumerate()
                .map(|(i, n)| DeclaredPackage {
                    name: n.to_string(),
                    line: Some(i as u32 + 3),
                })
                .collect(),
        }
    }

    fn site(pkg: &str, path: &str, line: u32) -> ImportSite {
        ImportSite {
            package: pkg.to_string(),
            path: RepoPath::new(path),
            line,
        }
    }

    #[test]
    fn reconcile_reports_both_directions() {
        let diff = reconcile(&set(&["a.io/x", "b.io/y"]), &set(&["b.io/y", "c.io/z"]));
        assert_eq!(diff.extra, set(&["a.io/x"]));
        assert_eq!(diff.missing, set(&["c.io/z"]));
        assert!(!diff.is_consistent());
    }

    #[test]
    fn findings_carry_tags_and_locations() {
        let scan = ImportScan {
            sites: vec![
                site("github.com/stretchr/testify/assert", "pkg/a_test.go", 5),
                site("github.com/stretchr/testify/assert", "pkg/b_test.go", 4),
            ],
            unparsable: Vec::new(),
        };
        let eval = evaluate_dependencies(
            "deps",
            CheckMode::Blocking,
            &manifest(&["golang.org/x/net/context"]),
            &scan,
        );
        let messages: Vec<&str> = eval.result.findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "u golang.org/x/net/context",
                "m github.com/stretchr/testify/assert"
            ]
        );
        let unused = &eval.result.findings[0];
        assert_eq!(unused.code, ids::CODE_UNUSED_PACKAGE);
        assert_eq!(unused.location.as_ref().and_then(|l| l.line), Some(3));
        let missing = &eval.result.findings[1];
        assert_eq!(missing.path().map(|p| p.as_str()), Some("pkg/a_test.go"));
        assert_eq!(eval.result.verdict, Verdict::Fail);
    }

    #[test]
    fn unparsable_sources_do_not_fail_the_verdict() {
        let scan = ImportScan {
            sites: vec![site("golang.org/x/net/context", "cmd/tool/main.go", 4)],
            unparsable: vec![UnparsableSource {
                path: RepoPath::new("pkg/broken.go"),
                reason: "line 3: unterminated import block".to_string(),
            }],
        };
        let eval = evaluate_dependencies(
            "deps",
            CheckMode::Blocking,
            &manifest(&["golang.org/x/net/context"]),
            &scan,
        );
        assert_eq!(eval.result.verdict, Verdict::Pass);
        assert_eq!(eval.result.findings.len(), 1);
        assert_eq!(eval.result.findings[0].severity, Severity::Info);
        assert_eq!(eval.result.findings[0].code, ids::CODE_SOURCE_UNPARSABLE);
    }

    proptest! {
        #[test]
        fn diff_sides_are_disjoint_and_exact(
            declared in prop::collection::btree_set("[a-c]\\.io/[a-c]", 0..6),
            imported in prop::collection::btree_set("[a-c]\\.io/[a-c]", 0..6),
        ) {
            let diff = reconcile(&declared, &imported);
            prop_assert!(diff.extra.is_disjoint(&diff.missing));
            for p in &diff.extra {
                prop_assert!(declared.contains(p) && !imported.contains(p));
            }
            for p in &diff.missing {
                prop_assert!(imported.contains(p) && !declared.contains(p));
            }
            prop_assert_eq!(diff.is_consistent(), declared == imported);
        }
    }
}
