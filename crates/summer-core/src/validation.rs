//! Pure input checks shared by the services.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum password length, counted in characters before hashing.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Extensions accepted for profile photos (compared lower-cased).
pub const ALLOWED_PHOTO_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(
        || match Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$") {
            Ok(regex) => regex,
            Err(err) => panic!("Email regex is invalid: {err}"),
        },
    );

/// Check that `email` looks like `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Canonical form used for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// Check the extension after the last `.` against the photo allow-list.
pub fn is_allowed_photo(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_PHOTO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Mask the local part of an email for logging, keeping the first character.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) if local.chars().count() > 1 => format!("{first}***@{domain}"),
            _ => format!("***@{domain}"),
        },
        None => "***".to_string(),
    }
}

/// Reduce an arbitrary client-supplied name to a flat, filesystem-safe one.
///
/// Path separators become spaces, runs of whitespace become `_`, anything
/// outside `[A-Za-z0-9._-]` is dropped and leading/trailing `.`/`_` are
/// stripped. The result may be empty.
pub fn sanitize_file_name(file_name: &str) -> String {
    let flattened: String = file_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}
