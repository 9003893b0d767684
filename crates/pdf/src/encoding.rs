//! Single-byte font encodings: `/Encoding` names, `/BaseEncoding` and
//! `/Differences`.

use lopdf::{Document, Object};

use crate::objects::{dict_get, name, resolve, resolve_dict};

/// Windows-1252 code points for 0x80..=0x9F. Unassigned codes stay as-is.
const WIN_ANSI_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

/// Mac OS Roman code points for 0x80..=0xFF.
const MAC_ROMAN_HIGH: [char; 128] = [
    'Ä', 'Å', 'Ç', 'É', 'Ñ', 'Ö', 'Ü', 'á', 'à', 'â', 'ä', 'ã', 'å', 'ç', 'é', 'è',
    'ê', 'ë', 'í', 'ì', 'î', 'ï', 'ñ', 'ó', 'ò', 'ô', 'ö', 'õ', 'ú', 'ù', 'û', 'ü',
    '†', '°', '¢', '£', '§', '•', '¶', 'ß', '®', '©', '™', '´', '¨', '≠', 'Æ', 'Ø',
    '∞', '±', '≤', '≥', '¥', 'µ', '∂', '∑', '∏', 'π', '∫', 'ª', 'º', 'Ω', 'æ', 'ø',
    '¿', '¡', '¬', '√', 'ƒ', '≈', '∆', '«', '»', '…', '\u{00A0}', 'À', 'Ã', 'Õ', 'Œ', 'œ',
    '–', '—', '“', '”', '‘', '’', '÷', '◊', 'ÿ', 'Ÿ', '⁄', '€', '‹', '›', 'ﬁ', 'ﬂ',
    '‡', '·', '‚', '„', '‰', 'Â', 'Ê', 'Á', 'Ë', 'È', 'Í', 'Î', 'Ï', 'Ì', 'Ó', 'Ô',
    '\u{F8FF}', 'Ò', 'Ú', 'Û', 'Ù', 'ı', 'ˆ', '˜', '¯', '˘', '˙', '˚', '¸', '˝', '˛', 'ˇ',
];

/// Glyph names outside the single-letter and `uniXXXX` forms.
const GLYPH_NAMES: &[(&str, char)] = &[
    ("space", ' '),
    ("exclam", '!'),
    ("quotedbl", '"'),
    ("numbersign", '#'),
    ("dollar", '$'),
    ("percent", '%'),
    ("ampersand", '&'),
    ("quotesingle", '\''),
    ("parenleft", '('),
    ("parenright", ')'),
    ("asterisk", '*'),
    ("plus", '+'),
    ("comma", ','),
    ("hyphen", '-'),
    ("period", '.'),
    ("slash", '/'),
    ("zero", '0'),
    ("one", '1'),
    ("two", '2'),
    ("three", '3'),
    ("four", '4'),
    ("five", '5'),
    ("six", '6'),
    ("seven", '7'),
    ("eight", '8'),
    ("nine", '9'),
    ("colon", ':'),
    ("semicolon", ';'),
    ("less", '<'),
    ("equal", '='),
    ("greater", '>'),
    ("question", '?'),
    ("at", '@'),
    ("bracketleft", '['),
    ("backslash", '\\'),
    ("bracketright", ']'),
    ("asciicircum", '^'),
    ("underscore", '_'),
    ("grave", '`'),
    ("braceleft", '{'),
    ("bar", '|'),
    ("braceright", '}'),
    ("asciitilde", '~'),
    ("quoteleft", '\u{2018}'),
    ("quoteright", '\u{2019}'),
    ("quotedblleft", '\u{201C}'),
    ("quotedblright", '\u{201D}'),
    ("quotesinglbase", '\u{201A}'),
    ("quotedblbase", '\u{201E}'),
    ("endash", '\u{2013}'),
    ("emdash", '\u{2014}'),
    ("bullet", '\u{2022}'),
    ("ellipsis", '\u{2026}'),
    ("dagger", '\u{2020}'),
    ("daggerdbl", '\u{2021}'),
    ("perthousand", '\u{2030}'),
    ("trademark", '\u{2122}'),
    ("copyright", '\u{00A9}'),
    ("registered", '\u{00AE}'),
    ("degree", '\u{00B0}'),
    ("section", '\u{00A7}'),
    ("paragraph", '\u{00B6}'),
    ("Euro", '\u{20AC}'),
    ("sterling", '\u{00A3}'),
    ("yen", '\u{00A5}'),
    ("cent", '\u{00A2}'),
    ("nbspace", '\u{00A0}'),
    ("fi", '\u{FB01}'),
    ("fl", '\u{FB02}'),
    ("minus", '\u{2212}'),
    ("multiply", '\u{00D7}'),
    ("divide", '\u{00F7}'),
    ("eacute", 'é'),
    ("egrave", 'è'),
    ("aacute", 'á'),
    ("agrave", 'à'),
    ("ccedilla", 'ç'),
    ("odieresis", 'ö'),
    ("udieresis", 'ü'),
    ("adieresis", 'ä'),
    ("germandbls", 'ß'),
];

/// Code-to-character table of a simple (single-byte) font.
#[derive(Debug, Clone, PartialEq)]
pub struct FontEncoding {
    table: [char; 256],
}

impl Default for FontEncoding {
    fn default() -> Self {
        Self::latin1()
    }
}

impl FontEncoding {
    /// Every byte maps to the code point of the same value.
    pub fn latin1() -> Self {
        let mut table = ['\0'; 256];
        for (code, slot) in table.iter_mut().enumerate() {
            *slot = char::from(code as u8);
        }
        Self { table }
    }

    pub fn win_ansi() -> Self {
        let mut encoding = Self::latin1();
        encoding.table[0x80..0xA0].copy_from_slice(&WIN_ANSI_HIGH);
        encoding
    }

    pub fn mac_roman() -> Self {
        let mut encoding = Self::latin1();
        encoding.table[0x80..].copy_from_slice(&MAC_ROMAN_HIGH);
        encoding
    }

    /// Predefined encoding by `/Encoding` or `/BaseEncoding` name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "WinAnsiEncoding" => Some(Self::win_ansi()),
            "MacRomanEncoding" => Some(Self::mac_roman()),
            "StandardEncoding" | "PDFDocEncoding" => Some(Self::latin1()),
            _ => None,
        }
    }

    /// Read a font's `/Encoding` value: a name, or a dictionary with an
    /// optional `/BaseEncoding` and `/Differences`.
    pub fn from_object(doc: &Document, object: &Object) -> Self {
        let Some(object) = resolve(doc, object) else {
            return Self::default();
        };

        if let Some(encoding) = name(object).and_then(|n| Self::from_name(&n)) {
            return encoding;
        }

        let Some(dict) = resolve_dict(doc, object) else {
            return Self::default();
        };
        let mut encoding = dict_get(doc, dict, b"BaseEncoding")
            .and_then(name)
            .and_then(|n| Self::from_name(&n))
            .unwrap_or_default();
        if let Some(Object::Array(differences)) = dict_get(doc, dict, b"Differences") {
            encoding.apply_differences(doc, differences);
        }
        encoding
    }

    /// `[code name name ... code name ...]`: each name replaces the next code.
    pub fn apply_differences(&mut self, doc: &Document, differences: &[Object]) {
        let mut code: Option<usize> = None;
        for item in differences {
            match resolve(doc, item) {
                Some(Object::Integer(start)) => code = usize::try_from(*start).ok(),
                Some(Object::Name(glyph)) => {
                    let Some(current) = code.filter(|c| *c < self.table.len()) else {
                        continue;
                    };
                    if let Some(ch) = glyph_char(&String::from_utf8_lossy(glyph)) {
                        self.table[current] = ch;
                    }
                    code = Some(current + 1);
                }
                _ => {}
            }
        }
    }

    pub fn decode_byte(&self, byte: u8) -> char {
        self.table[usize::from(byte)]
    }
}

/// Unicode character for a glyph name, if it is one we can map.
pub fn glyph_char(glyph: &str) -> Option<char> {
    let mut chars = glyph.chars();
    if let (Some(single), None) = (chars.next(), chars.next()) {
        if single.is_ascii_alphabetic() {
            return Some(single);
        }
    }

    if let Some(hex) = glyph.strip_prefix("uni").filter(|h| h.len() == 4) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(hex) = glyph.strip_prefix('u').filter(|h| (4..=6).contains(&h.len())) {
        if let Some(ch) = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
            return Some(ch);
        }
    }

    GLYPH_NAMES
        .iter()
        .find(|(known, _)| *known == glyph)
        .map(|(_, ch)| *ch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn decode(encoding: &FontEncoding, bytes: &[u8]) -> String {
        bytes.iter().map(|&b| encoding.decode_byte(b)).collect()
    }

    #[test]
    fn test_win_ansi_punctuation() {
        let encoding = FontEncoding::win_ansi();
        assert_eq!(decode(&encoding, b"It\x92s \x96 ok"), "It\u{2019}s \u{2013} ok");
        assert_eq!(encoding.decode_byte(0x95), '\u{2022}');
        assert_eq!(encoding.decode_byte(0xE9), 'é');
        assert_eq!(encoding.decode_byte(b'A'), 'A');
    }

    #[test]
    fn test_mac_roman() {
        let encoding = FontEncoding::mac_roman();
        assert_eq!(encoding.decode_byte(0x8E), 'é');
        assert_eq!(encoding.decode_byte(0xD5), '\u{2019}');
    }

    #[test]
    fn test_encoding_by_name() {
        let doc = Document::with_version("1.5");
        let win_ansi = Object::Name(b"WinAnsiEncoding".to_vec());
        let encoding = FontEncoding::from_object(&doc, &win_ansi);
        assert_eq!(encoding, FontEncoding::win_ansi());

        let unknown = FontEncoding::from_object(&doc, &Object::Name(b"Custom".to_vec()));
        assert_eq!(unknown, FontEncoding::latin1());
    }

    #[test]
    fn test_differences_over_base_encoding() {
        let mut doc = Document::with_version("1.5");
        let encoding_id = doc.add_object(dictionary! {
            "Type" => "Encoding",
            "BaseEncoding" => "WinAnsiEncoding",
            "Differences" => vec![
                Object::Integer(65),
                "bullet".into(),
                "uni00E9".into(),
                Object::Integer(200),
                "fi".into(),
                "notaglyph".into(),
            ],
        });

        let encoding = FontEncoding::from_object(&doc, &Object::Reference(encoding_id));
        assert_eq!(encoding.decode_byte(65), '\u{2022}');
        assert_eq!(encoding.decode_byte(66), 'é');
        assert_eq!(encoding.decode_byte(67), 'C');
        assert_eq!(encoding.decode_byte(200), '\u{FB01}');
        assert_eq!(encoding.decode_byte(201), '\u{00C9}');
        assert_eq!(encoding.decode_byte(0x92), '\u{2019}');
    }

    #[test]
    fn test_glyph_names() {
        assert_eq!(glyph_char("A"), Some('A'));
        assert_eq!(glyph_char("quoteright"), Some('\u{2019}'));
        assert_eq!(glyph_char("uni2014"), Some('\u{2014}'));
        assert_eq!(glyph_char("u1F600"), Some('\u{1F600}'));
        assert_eq!(glyph_char("g123"), None);
    }
}
