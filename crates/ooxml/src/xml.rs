//! Small helpers over quick-xml events.

use quick_xml::events::BytesStart;

/// Extract the local name from a potentially namespaced XML element name.
pub fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Unescaped value of the attribute whose local name is `key`.
pub fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| local_name(a.key.as_ref()) == key)
        .map(|a| match a.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&a.value).to_string(),
        })
}

/// Value of a namespaced relationship-id attribute such as `r:id`.
///
/// Elements like `p:sldId` carry both a plain `id` and `r:id`; only the
/// prefixed one names a relationship.
pub fn rel_id(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| {
            let key = a.key.as_ref();
            key.contains(&b':') && local_name(key) == b"id"
        })
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}
