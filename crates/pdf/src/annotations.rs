//! URI link annotations.

use lopdf::{Document, Object, ObjectId};

use crate::objects::{dict_get, name, resolve_dict, text_string};

/// A `/Link` annotation whose action opens a URI.
#[derive(Debug, Clone, PartialEq)]
pub struct UriLink {
    pub uri: String,
    /// `/Contents` of the annotation, empty when absent.
    pub text: String,
}

/// URI links of one page in `/Annots` order.
pub fn page_links(doc: &Document, page_id: ObjectId) -> Vec<UriLink> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };
    let Some(Object::Array(annots)) = dict_get(doc, page, b"Annots") else {
        return Vec::new();
    };

    annots
        .iter()
        .filter_map(|annot| resolve_dict(doc, annot))
        .filter(|annot| dict_get(doc, annot, b"Subtype").and_then(name).as_deref() == Some("Link"))
        .filter_map(|annot| {
            let action = annot.get(b"A").ok().and_then(|a| resolve_dict(doc, a))?;
            if dict_get(doc, action, b"S").and_then(name).as_deref() != Some("URI") {
                return None;
            }
            let uri = dict_get(doc, action, b"URI").and_then(text_string)?;
            let text = dict_get(doc, annot, b"Contents")
                .and_then(text_string)
                .unwrap_or_default();
            Some(UriLink { uri, text })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_only_uri_link_annotations() {
        let mut doc = Document::with_version("1.5");
        let action = doc.add_object(dictionary! {
            "S" => "URI",
            "URI" => Object::string_literal("http://example.com"),
        });
        let annots = vec![
            Object::Dictionary(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Link",
                "A" => action,
                "Contents" => Object::string_literal("Example"),
            }),
            Object::Dictionary(dictionary! {
                "Subtype" => "Link",
                "A" => dictionary! { "S" => "GoTo", "D" => Vec::<Object>::new() },
            }),
            Object::Dictionary(dictionary! {
                "Subtype" => "Text",
                "Contents" => Object::string_literal("a note"),
            }),
            Object::Dictionary(dictionary! {
                "Subtype" => "Link",
                "A" => dictionary! {
                    "S" => "URI",
                    "URI" => Object::string_literal("https://plain.test"),
                },
            }),
        ];
        let page_id = doc.add_object(dictionary! { "Type" => "Page", "Annots" => annots });

        let links = page_links(&doc, page_id);
        assert_eq!(
            links,
            vec![
                UriLink { uri: "http://example.com".into(), text: "Example".into() },
                UriLink { uri: "https://plain.test".into(), text: String::new() },
            ]
        );
    }

    #[test]
    fn test_page_without_annotations() {
        let mut doc = Document::with_version("1.5");
        let page_id = doc.add_object(dictionary! { "Type" => "Page" });
        assert!(page_links(&doc, page_id).is_empty());
    }
}
