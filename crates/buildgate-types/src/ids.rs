//! Stable identifiers for built-in checks and finding codes.
//!
//! Check ids are short and match the historical make-target names. `code` is a snake_case
//! discriminator for a finding within a check.

// Checks
pub const CHECK_GOFMT: &str = "gofmt";
pub const CHECK_GOVET: &str = "govet";
pub const CHECK_GOLINT: &str = "golint";
pub const CHECK_UNUSED: &str = "unused";
pub const CHECK_MISSPELL: &str = "misspell";
pub const CHECK_DEADCODE: &str = "deadcode";
pub const CHECK_UNITTEST: &str = "unittest";
pub const CHECK_DEPS: &str = "deps";
pub const CHECK_STATIC: &str = "static";

// Codes: external tools
pub const CODE_DIAGNOSTIC: &str = "diagnostic";
pub const CODE_FILE_FLAGGED: &str = "file_flagged";
pub const CODE_TOOL_FAILURE: &str = "tool_failure";

// Codes: deps
pub const CODE_UNUSED_PACKAGE: &str = "unused_package";
pub const CODE_MISSING_PACKAGE: &str = "missing_package";
pub const CODE_SOURCE_UNPARSABLE: &str = "source_unparsable";

// Diagnostic tags for dependency diffs (machine-parsed by consumers).
pub const TAG_UNUSED: &str = "u";
pub const TAG_MISSING: &str = "m";

// Tool-level
pub const CODE_RUNTIME_ERROR: &str = "runtime_error";
pub const CODE_CANCELLED: &str = "cancelled";
