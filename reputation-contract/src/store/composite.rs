//! Composite keys: `\0` + object type + `\0` + each attribute + `\0`.
//!
//! The leading NUL keeps composite keys out of the plain key namespace, so
//! ranges over them never pick up regular records.

use super::StoreError;

const SEPARATOR: char = '\u{0}';
const MAX_RUNE: char = '\u{10FFFF}';

fn validate(attribute: &str) -> Result<(), StoreError> {
    if attribute.contains(SEPARATOR) || attribute.contains(MAX_RUNE) {
        return Err(StoreError::InvalidKey(format!(
            "attribute {attribute:?} contains a reserved character"
        )));
    }
    Ok(())
}

/// Build a composite key.
pub fn composite_key(object_type: &str, attributes: &[&str]) -> Result<String, StoreError> {
    validate(object_type)?;
    let mut key = String::with_capacity(
        2 + object_type.len() + attributes.iter().map(|a| a.len() + 1).sum::<usize>(),
    );
    key.push(SEPARATOR);
    key.push_str(object_type);
    key.push(SEPARATOR);
    for attribute in attributes {
        validate(attribute)?;
        key.push_str(attribute);
        key.push(SEPARATOR);
    }
    Ok(key)
}

/// Split a composite key into its object type and attributes.
pub fn split_composite_key(key: &str) -> Result<(String, Vec<String>), StoreError> {
    let body = key
        .strip_prefix(SEPARATOR)
        .and_then(|rest| rest.strip_suffix(SEPARATOR))
        .ok_or_else(|| StoreError::InvalidKey(format!("{key:?} is not a composite key")))?;

    let mut parts = body.split(SEPARATOR).map(str::to_string);
    let object_type = parts.next().unwrap_or_default();
    Ok((object_type, parts.collect()))
}

/// Half-open key range covering every composite key with the given prefix.
pub fn composite_range(
    object_type: &str,
    attributes: &[&str],
) -> Result<(String, String), StoreError> {
    let start = composite_key(object_type, attributes)?;
    let mut end = start.clone();
    end.push(MAX_RUNE);
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let key = composite_key("doc~service", &["Service", "svc-1"]).unwrap();
        assert_eq!(key, "\u{0}doc~service\u{0}Service\u{0}svc-1\u{0}");

        let (object_type, attributes) = split_composite_key(&key).unwrap();
        assert_eq!(object_type, "doc~service");
        assert_eq!(attributes, vec!["Service", "svc-1"]);
    }

    #[test]
    fn test_range_covers_prefix_only() {
        let (start, end) = composite_range("doc~service", &["Service"]).unwrap();
        let inside = composite_key("doc~service", &["Service", "zzz"]).unwrap();
        let outside = composite_key("doc~evaluation", &["Evaluation", "e1"]).unwrap();

        assert!(start.as_str() <= inside.as_str() && inside.as_str() < end.as_str());
        assert!(!(start.as_str() <= outside.as_str() && outside.as_str() < end.as_str()));
        assert!("svc-1" < start.as_str() || "svc-1" >= end.as_str());
    }

    #[test]
    fn test_reserved_characters_rejected() {
        assert!(composite_key("doc~service", &["bad\u{0}id"]).is_err());
        assert!(split_composite_key("plain-key").is_err());
    }
}
