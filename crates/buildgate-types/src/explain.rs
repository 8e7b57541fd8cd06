//! Explain registry for built-in checks and codes.
//!
//! Maps check IDs and codes to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for a check or code.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the check/code.
    pub title: &'static str,
    /// What the check does and why it exists.
    pub description: &'static str,
    /// How to fix violations.
    pub remediation: &'static str,
}

/// Look up an explanation by check id or code.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    match identifier {
        // Check IDs
        ids::CHECK_GOFMT => Some(explain_gofmt()),
        ids::CHECK_GOVET => Some(explain_govet()),
        ids::CHECK_GOLINT => Some(explain_golint()),
        ids::CHECK_UNUSED => Some(explain_unused()),
        ids::CHECK_MISSPELL => Some(explain_misspell()),
        ids::CHECK_DEADCODE => Some(explain_deadcode()),
        ids::CHECK_UNITTEST => Some(explain_unittest()),
        ids::CHECK_DEPS => Some(explain_deps()),
        ids::CHECK_STATIC => Some(explain_static()),

        // Codes
        ids::CODE_UNUSED_PACKAGE => Some(explain_unused_package()),
        ids::CODE_MISSING_PACKAGE => Some(explain_missing_package()),
        ids::CODE_SOURCE_UNPARSABLE => Some(explain_source_unparsable()),
        ids::CODE_TOOL_FAILURE => Some(explain_tool_failure()),

        _ => None,
    }
}

/// List all built-in check IDs.
pub fn all_check_ids() -> &'static [&'static str] {
    &[
        ids::CHECK_GOFMT,
        ids::CHECK_GOVET,
        ids::CHECK_GOLINT,
        ids::CHECK_UNUSED,
        ids::CHECK_MISSPELL,
        ids::CHECK_DEADCODE,
        ids::CHECK_UNITTEST,
        ids::CHECK_DEPS,
        ids::CHECK_STATIC,
    ]
}

/// List all codes with explanations.
pub fn all_codes() -> &'static [&'static str] {
    &[
        ids::CODE_UNUSED_PACKAGE,
        ids::CODE_MISSING_PACKAGE,
        ids::CODE_SOURCE_UNPARSABLE,
        ids::CODE_TOOL_FAILURE,
    ]
}

// --- Check-level explanations ---

fn explain_gofmt() -> Explanation {
    Explanation {
        title: "Formatting",
        description: "\
Lists source files whose formatting differs from the canonical formatter output.
Blocking: any listed file fails the run.",
        remediation: "Run `gofmt -w` on the listed files and commit the result.",
    }
}

fn explain_govet() -> Explanation {
    Explanation {
        title: "Vet",
        description: "\
Runs the vet checker over the packages in scope. Reports suspicious constructs such as
unreachable code, bad format verbs and copied locks. Blocking.",
        remediation: "Fix the reported construct; vet findings are almost always real bugs.",
    }
}

fn explain_golint() -> Explanation {
    Explanation {
        title: "Style lint",
        description: "\
Runs the style linter over the packages in scope (missing doc comments on exported
identifiers, naming). Observational: findings are reported but do not fail an aggregate run.",
        remediation: "Add the missing comment or rename the identifier as suggested.",
    }
}

fn explain_unused() -> Explanation {
    Explanation {
        title: "Unused symbols",
        description: "Reports unused constants, variables, functions and struct fields. Observational.",
        remediation: "Delete the symbol or start using it.",
    }
}

fn explain_misspell() -> Explanation {
    Explanation {
        title: "Spelling",
        description: "Reports commonly misspelled English words in comments and strings. Observational.",
        remediation: "Correct the spelling.",
    }
}

fn explain_deadcode() -> Explanation {
    Explanation {
        title: "Dead code",
        description: "Reports unreachable top-level declarations. Observational.",
        remediation: "Remove the dead declaration.",
    }
}

fn explain_unittest() -> Explanation {
    Explanation {
        title: "Unit tests",
        description: "\
Runs the unit test runner over the packages in scope. Any non-zero exit fails the check and
the tail of the runner output is attached to the finding. Blocking.",
        remediation: "Fix the failing tests listed in the attached output.",
    }
}

fn explain_deps() -> Explanation {
    Explanation {
        title: "Vendored dependency consistency",
        description: "\
Compares the packages declared in the vendor manifest with the external packages actually
imported by the source files in scope.

- `u <package>`: declared but not imported (unused)
- `m <package>`: imported but not declared (missing)

Narrowing the scope changes which files are scanned for imports, never which packages count
as declared: the full manifest is always used.",
        remediation: "\
Remove unused packages from the vendor manifest, and vendor the missing ones
(e.g. `govendor fetch <package>` / `govendor remove <package>`).",
    }
}

fn explain_static() -> Explanation {
    Explanation {
        title: "Static analysis (meta check)",
        description: "\
Runs every constituent check and reports the union of their findings, each tagged with the
constituent that produced it. Equivalent to running the constituents one by one.",
        remediation: "Address the findings of each constituent check.",
    }
}

// --- Code-level explanations ---

fn explain_unused_package() -> Explanation {
    let mut exp = explain_deps();
    exp.title = "Unused vendored package";
    exp
}

fn explain_missing_package() -> Explanation {
    let mut exp = explain_deps();
    exp.title = "Missing vendored package";
    exp
}

fn explain_source_unparsable() -> Explanation {
    Explanation {
        title: "Unparsable source file",
        description: "\
The import clause of a source file could not be parsed (invalid UTF-8, an unterminated
import block or import path). Its imports are left out of the dependency comparison.",
        remediation: "Fix the syntax of the file's import clause.",
    }
}

fn explain_tool_failure() -> Explanation {
    Explanation {
        title: "External tool failure",
        description: "\
The external tool could not be started, or exited non-zero without producing any finding
buildgate could attribute to a file. The tail of its output is attached.",
        remediation: "Check that the tool is installed and on PATH, then run it by hand.",
    }
}
