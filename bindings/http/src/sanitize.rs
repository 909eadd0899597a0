//! Upload filename sanitization.

use unicode_normalization::UnicodeNormalization;

/// Reserved device names on Windows; there a file with one of these stems
/// gets a leading underscore.
const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "LPT1", "LPT2", "LPT3",
];

/// Turn a client-supplied filename into one that is safe to join onto the
/// upload directory.
///
/// The name is NFKD-normalized so accented letters keep their base letter
/// (`joão` becomes `joao`), then any remaining non-ASCII is dropped. Path
/// separators become word breaks, words are joined with `_`, anything
/// outside `[A-Za-z0-9_.-]` is removed and leading/trailing dots and
/// underscores are stripped. The result may be empty.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let safe = filtered.trim_matches(|c| c == '.' || c == '_');

    if cfg!(windows) && is_windows_device_name(safe) {
        return format!("_{safe}");
    }

    safe.to_string()
}

fn is_windows_device_name(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or_default();
    WINDOWS_DEVICE_NAMES
        .iter()
        .any(|device| device.eq_ignore_ascii_case(stem))
}
