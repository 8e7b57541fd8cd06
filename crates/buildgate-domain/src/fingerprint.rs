use buildgate_types::Finding;
use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a finding.
///
/// Identity fields:
/// - check_id
/// - code
/// - path (repo-relative, if present)
/// - line (if present)
/// - message
pub fn fingerprint_for_finding(
    check_id: &str,
    code: &str,
    path: Option<&str>,
    line: Option<u32>,
    message: &str,
) -> String {
    let line = line.map(|l| l.to_string()).unwrap_or_default();
    let canonical = [check_id, code, path.unwrap_or(""), &line, message].join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}

/// Fill `finding.fingerprint` from its identity fields.
pub(crate) fn stamp(mut finding: Finding) -> Finding {
    let (path, line) = match &finding.location {
        Some(loc) => (Some(loc.path.as_str()), loc.line),
        None => (None, None),
    };
    finding.fingerprint = Some(fingerprint_for_finding(
        &finding.check_id,
        &finding.code,
        path,
        line,
        &finding.message,
    ));
    finding
}
