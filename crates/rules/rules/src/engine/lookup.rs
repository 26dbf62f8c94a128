use serde_json::Value;

/// Field names that are never resolved, whatever the value contains.
pub const FORBIDDEN_FIELDS: [&str; 3] = ["__proto__", "constructor", "prototype"];

/// Look up a single field of a resolved value.
///
/// Objects expose their own keys and arrays their decimal indices. Scalars
/// have no fields. Names in [`FORBIDDEN_FIELDS`] always resolve as missing.
pub fn safe_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    if FORBIDDEN_FIELDS.contains(&key) {
        return None;
    }
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key
            .parse::<usize>()
            .ok()
            .filter(|_| is_canonical_index(key))
            .and_then(|idx| items.get(idx)),
        _ => None,
    }
}

/// Walk `path` from `root` with [`safe_field`].
///
/// On failure, returns the index of the first segment that did not resolve.
pub fn walk_path<'a, S: AsRef<str>>(root: &'a Value, path: &[S]) -> Result<&'a Value, usize> {
    let mut current = root;
    for (idx, key) in path.iter().enumerate() {
        current = safe_field(current, key.as_ref()).ok_or(idx)?;
    }
    Ok(current)
}

// "01" or "+1" are not indices of an array.
fn is_canonical_index(key: &str) -> bool {
    key == "0" || (!key.starts_with('0') && key.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn own_object_keys() {
        let v = json!({"v1": 1, "o": {"v1": 2}});
        assert_eq!(safe_field(&v, "v1"), Some(&json!(1)));
        assert_eq!(safe_field(&v, "missing"), None);
    }

    #[test]
    fn forbidden_names_always_missing() {
        let v = json!({"__proto__": 1, "constructor": 2, "prototype": 3});
        for name in FORBIDDEN_FIELDS {
            assert_eq!(safe_field(&v, name), None, "{name}");
        }
    }

    #[test]
    fn scalars_have_no_fields() {
        assert_eq!(safe_field(&json!("string"), "length"), None);
        assert_eq!(safe_field(&json!(5), "x"), None);
        assert_eq!(safe_field(&json!(null), "x"), None);
    }

    #[test]
    fn array_indices() {
        let v = json!([10, 20]);
        assert_eq!(safe_field(&v, "1"), Some(&json!(20)));
        assert_eq!(safe_field(&v, "0"), Some(&json!(10)));
        assert_eq!(safe_field(&v, "01"), None);
        assert_eq!(safe_field(&v, "2"), None);
        assert_eq!(safe_field(&v, "+1"), None);
        assert_eq!(safe_field(&v, "length"), None);
    }

    #[test]
    fn walk_reports_first_missing_segment() {
        let v = json!({"o": {"o": {"v1": 1}}});
        assert_eq!(walk_path(&v, &["o", "o", "v1"]), Ok(&json!(1)));
        assert_eq!(walk_path(&v, &["o", "x", "v1"]), Err(1));
        assert_eq!(walk_path(&v, &["o", "__proto__"]), Err(1));
        let empty: [&str; 0] = [];
        assert_eq!(walk_path(&v, &empty), Ok(&v));
    }
}
