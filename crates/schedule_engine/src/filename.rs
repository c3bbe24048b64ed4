use sha2::{Digest, Sha256};

/// Filesystem-safe, deterministic snapshot name: `{sanitized_id}--{short_hash(id)}.ron`.
///
/// The hash keeps ids apart that sanitize to the same text.
pub fn snapshot_filename(source_id: &str) -> String {
    let sanitized = sanitize_id(source_id);
    let hash = short_hash(source_id);
    format!("{sanitized}--{hash}.ron")
}

fn sanitize_id(input: &str) -> String {
    let mut cleaned = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '-' {
            c
        } else {
            '_'
        };
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        cleaned.push(c);
    }
    let mut cleaned = cleaned.trim_matches('_').to_string();
    if cleaned.is_empty() {
        cleaned = "source".to_string();
    }
    cleaned.truncate(64);
    cleaned
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
