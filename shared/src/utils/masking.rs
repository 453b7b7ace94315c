//! Target masking for logs
//!
//! Verification targets are phone numbers or e-mail addresses. They are
//! desensitized before they reach any log line.

/// Mask a verification target for display
///
/// - e-mail: first character of the local part and the full domain (`a***@example.com`)
/// - anything else: first three and last four characters (`+86****5678`)
/// - short values are fully masked
pub fn mask_target(target: &str) -> String {
    if let Some((local, domain)) = target.split_once('@') {
        return match local.chars().next() {
            Some(first) if !domain.is_empty() => format!("{}***@{}", first, domain),
            _ => "****".to_string(),
        };
    }

    let chars: Vec<char> = target.chars().collect();
    if chars.len() >= 8 {
        let head: String = chars[..3].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}****{}", head, tail)
    } else {
        "****".to_string()
    }
}
