//! Member naming convention: lower-case first letter, trailing underscore.

use crate::error::{Error, Result};

/// True when `name` starts with an ASCII lower-case letter, ends with `_` and
/// is at least two characters long.
pub fn is_compliant(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_lowercase() && bytes[bytes.len() - 1] == b'_'
}

/// The compliant form of `name`: lower-case the first letter, append `_`.
///
/// Fails for the empty name and for names whose first character has no
/// ASCII lower-case form (`_x`, `1a`, `Éa`); no lower-casing and suffixing
/// can make those compliant.
pub fn canonicalize(name: &str) -> Result<String> {
    let mut chars = name.chars();
    let first = chars
        .next()
        .ok_or_else(|| Error::validation_invalid_identifier(name, "identifier is empty"))?;

    let first = if first.is_ascii_lowercase() {
        first
    } else if first.is_ascii_uppercase() {
        first.to_ascii_lowercase()
    } else {
        return Err(Error::validation_invalid_identifier(
            name,
            format!("first character '{}' has no lower-case letter form", first),
        ));
    };

    let mut fixed = String::with_capacity(name.len() + 1);
    fixed.push(first);
    fixed.push_str(chars.as_str());
    if !fixed.ends_with('_') {
        fixed.push('_');
    }
    Ok(fixed)
}
