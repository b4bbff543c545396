// Upload filename checks

const ALLOWED_EXTENSIONS: [&str; 1] = ["pdf"];

/// True if the name has an extension and it is an allowed one, ignoring case
#[inline]
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, extension)| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| extension.eq_ignore_ascii_case(allowed))
        })
}

/// Reduce a client-supplied file name to something safe to join onto the
/// upload directory.
///
/// Non-ASCII characters are dropped and path separators become word breaks.
/// Whitespace runs collapse to a single `_`, anything outside
/// `[A-Za-z0-9_.-]` is removed, and leading or trailing dots and underscores
/// are stripped. The result may be empty.
#[inline]
pub fn sanitize_filename(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}
