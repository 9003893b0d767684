//! Package relationship tables (`_rels/*.rels`).

use docmine_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::package::resolve_target;
use crate::xml::{attr, local_name};

/// A single `<Relationship>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Target as written in the file.
    pub target: String,
    /// Target resolved to a part path, for internal relationships.
    pub part: Option<String>,
    pub external: bool,
}

impl Relationship {
    /// Whether the relationship type denotes an image part.
    pub fn is_image(&self) -> bool {
        self.rel_type.ends_with("/image")
    }

    /// Whether this is an internal slide relationship (not a layout or master).
    pub fn is_slide(&self) -> bool {
        self.rel_type.ends_with("/slide")
    }

    /// Address of an external hyperlink target.
    pub fn external_address(&self) -> Option<&str> {
        if self.external && !self.target.is_empty() {
            Some(&self.target)
        } else {
            None
        }
    }
}

/// Relationships declared by one part, in file order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Parse a `.rels` document belonging to `source_part`.
    pub fn parse(xml: &str, source_part: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut entries = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"Relationship" =>
                {
                    let id = attr(e, b"Id").unwrap_or_default();
                    let rel_type = attr(e, b"Type").unwrap_or_default();
                    let target = attr(e, b"Target").unwrap_or_default();
                    let external = attr(e, b"TargetMode").as_deref() == Some("External");
                    let part = if external {
                        None
                    } else {
                        Some(resolve_target(source_part, &target))
                    };

                    entries.push(Relationship {
                        id,
                        rel_type,
                        target,
                        part,
                        external,
                    });
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships of '{}': {}",
                        source_part, e
                    )));
                }
                _ => {}
            }
        }

        Ok(Self { entries })
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// External address a relationship id points at, if any.
    pub fn external_address(&self, id: &str) -> Option<String> {
        self.get(id)
            .and_then(Relationship::external_address)
            .map(str::to_string)
    }

    /// Internal part a relationship id points at, if any.
    pub fn part(&self, id: &str) -> Option<&str> {
        self.get(id).and_then(|r| r.part.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
