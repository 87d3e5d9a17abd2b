/// String from raw bytes, mapping 0-255 to `char`
/// (ISO8859-1, exceeding ascii).
pub(crate) fn string_from_bytes(bytes: &[u8], ignore_null: bool) -> String {
    match ignore_null {
        true => bytes.iter()
            .filter_map(|b| if b == &0 {None} else {Some(*b as char)})
            .collect(),
        false => bytes.iter()
            .map(|b| *b as char)
            .collect(),
    }
}

/// Counted (Pascal) string. First byte is the character count.
/// Count is clamped to the available bytes.
pub(crate) fn counted_string(bytes: &[u8], ignore_null: bool) -> String {
    let Some((count, rest)) = bytes.split_first() else {
        return String::new()
    };
    let end = (*count as usize).min(rest.len());
    string_from_bytes(&rest[..end], ignore_null)
}

/// Handler or component name. May be a counted string,
/// null terminated, or neither.
pub(crate) fn component_name(bytes: &[u8]) -> String {
    match bytes.first() {
        Some(count) if (*count as usize) < bytes.len() && *count != 0 && !count.is_ascii_graphic() => {
            counted_string(bytes, true)
        },
        _ => string_from_bytes(bytes, true),
    }
    .trim()
    .to_owned()
}

/// 16.16 fixed point to `f64`.
pub(crate) fn fixed_16_16(value: i32) -> f64 {
    value as f64 / 65536.0
}
