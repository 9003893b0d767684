//! Page fonts: display names and byte-to-text decoding.

use std::collections::HashMap;
use std::sync::LazyLock;

use lopdf::{Dictionary, Document, ObjectId};
use regex::Regex;

use crate::encoding::FontEncoding;
use crate::objects::{
    dict_get, name, page_resources, resolve_dict, resolve_stream, resource_category, stream_bytes,
};

/// Subset fonts carry a six-letter tag, e.g. `ABCDEF+Helvetica`.
static SUBSET_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{6}\+").unwrap());

/// A font resource of one page.
#[derive(Debug, Clone, Default)]
pub struct PageFont {
    /// BaseFont without subset tag.
    pub name: String,
    /// Composite (Type0) fonts use two-byte codes.
    pub two_byte: bool,
    pub to_unicode: Option<CMap>,
    /// Byte mapping of simple fonts when ToUnicode has no entry.
    pub encoding: FontEncoding,
}

impl PageFont {
    /// Decode a string operand shown with this font.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let codes: Vec<u32> = if self.two_byte {
            bytes
                .chunks(2)
                .map(|pair| match pair {
                    [hi, lo] => u32::from(*hi) << 8 | u32::from(*lo),
                    [single] => u32::from(*single),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|&b| u32::from(b)).collect()
        };

        let mut text = String::with_capacity(codes.len());
        for code in codes {
            match self.to_unicode.as_ref().and_then(|cmap| cmap.get(code)) {
                Some(mapped) => text.push_str(mapped),
                None if self.two_byte => text.push(char::REPLACEMENT_CHARACTER),
                None => match u8::try_from(code) {
                    Ok(byte) => text.push(self.encoding.decode_byte(byte)),
                    Err(_) => text.push(char::REPLACEMENT_CHARACTER),
                },
            }
        }
        text
    }
}

/// Fonts of one page keyed by resource name (`F1`, ...).
#[derive(Debug, Clone, Default)]
pub struct FontSet {
    fonts: HashMap<String, PageFont>,
}

impl FontSet {
    pub fn for_page(doc: &Document, page_id: ObjectId) -> Self {
        let mut fonts = HashMap::new();

        let Some(category) = page_resources(doc, page_id)
            .and_then(|resources| resource_category(doc, resources, b"Font"))
        else {
            return Self { fonts };
        };

        for (key, value) in category.iter() {
            let resource = String::from_utf8_lossy(key).into_owned();
            let Some(dict) = resolve_dict(doc, value) else {
                continue;
            };
            fonts.insert(resource.clone(), read_font(doc, dict, &resource));
        }

        Self { fonts }
    }

    pub fn get(&self, resource: &str) -> Option<&PageFont> {
        self.fonts.get(resource)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

fn read_font(doc: &Document, dict: &Dictionary, resource: &str) -> PageFont {
    let base = dict_get(doc, dict, b"BaseFont")
        .and_then(name)
        .unwrap_or_else(|| resource.to_string());
    let two_byte = dict_get(doc, dict, b"Subtype").and_then(name).as_deref() == Some("Type0");
    let to_unicode = dict
        .get(b"ToUnicode")
        .ok()
        .and_then(|o| resolve_stream(doc, o))
        .map(|stream| CMap::parse(&stream_bytes(stream)));
    let encoding = dict
        .get(b"Encoding")
        .ok()
        .filter(|_| !two_byte)
        .map(|o| FontEncoding::from_object(doc, o))
        .unwrap_or_default();

    PageFont {
        name: strip_subset_tag(&base),
        two_byte,
        to_unicode,
        encoding,
    }
}

pub fn strip_subset_tag(base_font: &str) -> String {
    SUBSET_TAG_REGEX.replace(base_font, "").into_owned()
}

/// A ToUnicode CMap: character codes to Unicode text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CMap {
    map: HashMap<u32, String>,
}

impl CMap {
    /// Parse the `bfchar` and `bfrange` sections of a CMap program.
    pub fn parse(data: &[u8]) -> Self {
        let text = String::from_utf8_lossy(data);
        let tokens = tokenize(&text);
        let mut map = HashMap::new();

        let mut index = 0;
        while index < tokens.len() {
            match &tokens[index] {
                Token::Keyword(k) if k == "beginbfchar" => {
                    index += 1;
                    while let (Some(Token::Hex(src)), Some(Token::Hex(dst))) =
                        (tokens.get(index), tokens.get(index + 1))
                    {
                        map.insert(code_of(src), utf16_text(dst));
                        index += 2;
                    }
                }
                Token::Keyword(k) if k == "beginbfrange" => {
                    index += 1;
                    loop {
                        let (Some(Token::Hex(lo)), Some(Token::Hex(hi))) =
                            (tokens.get(index), tokens.get(index + 1))
                        else {
                            break;
                        };
                        let (lo, hi) = (code_of(lo), code_of(hi));
                        match tokens.get(index + 2) {
                            Some(Token::Hex(dst)) => {
                                insert_range(&mut map, lo, hi, dst);
                                index += 3;
                            }
                            Some(Token::Array(items)) => {
                                for (offset, dst) in items.iter().enumerate() {
                                    let code = lo + offset as u32;
                                    if code > hi {
                                        break;
                                    }
                                    map.insert(code, utf16_text(dst));
                                }
                                index += 3;
                            }
                            _ => break,
                        }
                    }
                }
                _ => index += 1,
            }
        }

        Self { map }
    }

    pub fn get(&self, code: u32) -> Option<&str> {
        self.map.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Consecutive codes map to consecutive values of the last destination unit.
fn insert_range(map: &mut HashMap<u32, String>, lo: u32, hi: u32, dst: &[u8]) {
    let Some(mut units) = utf16_units(dst) else {
        return;
    };
    for code in lo..=hi.min(lo.saturating_add(0xFFFF)) {
        map.insert(code, String::from_utf16_lossy(&units));
        match units.last_mut() {
            Some(last) => *last = last.wrapping_add(1),
            None => break,
        }
    }
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| acc << 8 | u32::from(b))
}

fn utf16_units(bytes: &[u8]) -> Option<Vec<u16>> {
    if bytes.is_empty() {
        return None;
    }
    Some(
        bytes
            .chunks(2)
            .map(|pair| match pair {
                [hi, lo] => u16::from(*hi) << 8 | u16::from(*lo),
                [single] => u16::from(*single),
                _ => 0,
            })
            .collect(),
    )
}

fn utf16_text(bytes: &[u8]) -> String {
    utf16_units(bytes)
        .map(|units| String::from_utf16_lossy(&units))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Hex(Vec<u8>),
    Array(Vec<Vec<u8>>),
    Keyword(String),
}

/// Split a CMap program into hex strings, arrays of hex strings and keywords.
fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut array: Option<Vec<Vec<u8>>> = None;

    while let Some(c) = chars.next() {
        match c {
            '<' if chars.peek() == Some(&'<') => {
                chars.next();
            }
            '<' => {
                let mut digits = String::new();
                for d in chars.by_ref() {
                    if d == '>' {
                        break;
                    }
                    if d.is_ascii_hexdigit() {
                        digits.push(d);
                    }
                }
                let bytes = hex_bytes(&digits);
                match array.as_mut() {
                    Some(items) => items.push(bytes),
                    None => tokens.push(Token::Hex(bytes)),
                }
            }
            '[' => array = Some(Vec::new()),
            ']' => {
                if let Some(items) = array.take() {
                    tokens.push(Token::Array(items));
                }
            }
            '%' => {
                for d in chars.by_ref() {
                    if d == '\n' || d == '\r' {
                        break;
                    }
                }
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphanumeric() {
                        word.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Keyword(word));
            }
            _ => {}
        }
    }

    tokens
}

fn hex_bytes(digits: &str) -> Vec<u8> {
    let mut padded = digits.to_string();
    if padded.len() % 2 == 1 {
        padded.push('0');
    }
    (0..padded.len())
        .step_by(2)
        .filter_map(|i| u8::from_str_radix(&padded[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CMAP: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
2 beginbfchar
<0003> <0020>
<0011> <00660069>
endbfchar
2 beginbfrange
<0024> <0026> <0041>
<0030> <0031> [<0078> <0079>]
endbfrange
endcmap";

    #[test]
    fn test_strip_subset_tag() {
        assert_eq!(strip_subset_tag("ABCDEF+Helvetica-Bold"), "Helvetica-Bold");
        assert_eq!(strip_subset_tag("Helvetica"), "Helvetica");
        assert_eq!(strip_subset_tag("Abcdef+Times"), "Abcdef+Times");
    }

    #[test]
    fn test_cmap_bfchar_and_ranges() {
        let cmap = CMap::parse(CMAP);
        assert_eq!(cmap.get(0x03), Some(" "));
        assert_eq!(cmap.get(0x11), Some("fi"));
        assert_eq!(cmap.get(0x24), Some("A"));
        assert_eq!(cmap.get(0x26), Some("C"));
        assert_eq!(cmap.get(0x30), Some("x"));
        assert_eq!(cmap.get(0x31), Some("y"));
        assert_eq!(cmap.get(0x27), None);
        assert_eq!(cmap.len(), 7);
    }

    #[test]
    fn test_two_byte_decode_with_cmap() {
        let font = PageFont {
            name: "Test".into(),
            two_byte: true,
            to_unicode: Some(CMap::parse(CMAP)),
            encoding: FontEncoding::default(),
        };
        assert_eq!(font.decode(&[0x00, 0x24, 0x00, 0x03, 0x00, 0x11]), "A fi");
    }

    #[test]
    fn test_single_byte_decode_latin1() {
        let font = PageFont::default();
        assert_eq!(font.decode(b"Caf\xe9"), "Caf\u{e9}");
    }
}
