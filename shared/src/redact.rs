//! Redaction of connection strings before they reach a trace

use url::Url;

/// Visible prefix length of a redacted value
pub const VISIBLE_PREFIX: usize = 20;
pub const MASK: &str = "****";

/// Mask URL credentials, then truncate to a short prefix
pub fn redact_secret(value: &str) -> String {
    let masked = mask_credentials(value);
    truncate(&masked, VISIBLE_PREFIX)
}

/// The password is masked when present; a lone username is treated as a token
fn mask_credentials(value: &str) -> String {
    let Ok(mut url) = Url::parse(value) else {
        return value.to_string();
    };
    let masked = if url.password().is_some() {
        url.set_password(Some(MASK))
    } else if !url.username().is_empty() {
        url.set_username(MASK)
    } else {
        return value.to_string();
    };

    match masked {
        Ok(()) => url.to_string(),
        Err(()) => MASK.to_string(),
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let prefix: String = value.chars().take(max_chars).collect();
    format!("{prefix}...")
}
