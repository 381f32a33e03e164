use k8s_openapi::api::core::v1::ObjectReference;
use std::fmt::Display;

/// Keep at most the last `max` lines of a log buffer.
///
/// A trailing newline terminates the final line rather than starting a new,
/// empty one, so `"a\nb\n"` counts as two lines.
pub fn tail_lines(buf: &[u8], max: usize) -> &[u8] {
    if max == 0 {
        return &[];
    }
    let body = buf.strip_suffix(b"\n").unwrap_or(buf);
    let mut seen = 0;
    for (idx, byte) in body.iter().enumerate().rev() {
        if *byte == b'\n' {
            seen += 1;
            if seen == max {
                return &buf[idx + 1..];
            }
        }
    }
    buf
}

/// Render an object reference as `group/version, Kind=kind`.
///
/// Core resources have an empty group, so a pod renders as `/v1, Kind=Pod`.
pub fn group_version_kind(reference: &ObjectReference) -> String {
    let api_version = reference.api_version.as_deref().unwrap_or_default();
    let (group, version) = match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    };
    format!(
        "{}/{}, Kind={}",
        group,
        version,
        reference.kind.as_deref().unwrap_or_default()
    )
}

/// Display an optional value, falling back to an empty string.
pub fn display_or_empty<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
