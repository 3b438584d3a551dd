//! Font metrics and code-to-text decoding
//!
//! Widths come from `/Widths` (simple fonts) or the descendant's `/W`
//! array (Type0). Text comes from `/ToUnicode` when present, otherwise
//! from WinAnsi / Latin-1 for simple fonts and raw CIDs for Type0.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object};

use super::cmap::ToUnicodeCMap;
use super::{number, resolve};

const DEFAULT_SIMPLE_WIDTH: f64 = 500.0;
const DEFAULT_CID_WIDTH: f64 = 1000.0;
const DEFAULT_ASCENT: f64 = 800.0;
const DEFAULT_DESCENT: f64 = -200.0;

/// WinAnsiEncoding for 0x80..=0x9F; the rest of the byte range is Latin-1
const WIN_ANSI_HIGH: [char; 32] = [
    '€', '\u{FFFD}', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', '\u{FFFD}', 'Ž',
    '\u{FFFD}', '\u{FFFD}', '‘', '’', '“', '”', '•', '–', '—', '˜', '™', 'š', '›', 'œ',
    '\u{FFFD}', 'ž', 'Ÿ',
];

/// One shown glyph after decoding
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub text: String,
    /// Advance in glyph space (1/1000 text space units)
    pub width: f64,
    /// Single-byte code 32, the only code word spacing applies to
    pub is_space: bool,
}

#[derive(Debug, Clone)]
pub struct FontMetrics {
    pub name: String,
    two_byte: bool,
    first_char: u32,
    widths: Vec<f64>,
    cid_widths: HashMap<u32, f64>,
    default_width: f64,
    to_unicode: Option<ToUnicodeCMap>,
    pub ascent: f64,
    pub descent: f64,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            name: String::new(),
            two_byte: false,
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            default_width: DEFAULT_SIMPLE_WIDTH,
            to_unicode: None,
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
        }
    }
}

impl FontMetrics {
    pub fn load(doc: &Document, font: &Dictionary) -> Self {
        let name = font
            .get(b"BaseFont")
            .and_then(Object::as_name)
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_default();
        let to_unicode = font
            .get(b"ToUnicode")
            .ok()
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_stream().ok())
            .and_then(|s| {
                if s.dict.get(b"Filter").is_ok() {
                    s.decompressed_content().ok()
                } else {
                    Some(s.content.clone())
                }
            })
            .map(|bytes| ToUnicodeCMap::parse(&bytes))
            .filter(|cmap| !cmap.is_empty());

        let is_type0 = matches!(font.get(b"Subtype").and_then(Object::as_name), Ok(b"Type0"));
        let mut metrics = if is_type0 {
            Self::load_type0(doc, font)
        } else {
            Self::load_simple(doc, font)
        };
        metrics.name = name;
        metrics.to_unicode = to_unicode;
        metrics
    }

    fn load_simple(doc: &Document, font: &Dictionary) -> Self {
        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|o| number(resolve(doc, o)))
            .map(|v| v.max(0.0) as u32)
            .unwrap_or(0);
        let widths = font
            .get(b"Widths")
            .ok()
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|w| number(resolve(doc, w)).unwrap_or(DEFAULT_SIMPLE_WIDTH))
                    .collect()
            })
            .unwrap_or_default();
        let (ascent, descent) = descriptor_metrics(doc, font);

        Self {
            first_char,
            widths,
            ascent,
            descent,
            ..Self::default()
        }
    }

    fn load_type0(doc: &Document, font: &Dictionary) -> Self {
        let descendant = font
            .get(b"DescendantFonts")
            .ok()
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
            .and_then(|arr| arr.first())
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok());

        let Some(descendant) = descendant else {
            return Self {
                two_byte: true,
                default_width: DEFAULT_CID_WIDTH,
                ..Self::default()
            };
        };

        let default_width = descendant
            .get(b"DW")
            .ok()
            .and_then(|o| number(resolve(doc, o)))
            .unwrap_or(DEFAULT_CID_WIDTH);
        let cid_widths = descendant
            .get(b"W")
            .ok()
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
            .map(|w| parse_cid_widths(doc, w))
            .unwrap_or_default();
        let (ascent, descent) = descriptor_metrics(doc, descendant);

        Self {
            two_byte: true,
            cid_widths,
            default_width,
            ascent,
            descent,
            ..Self::default()
        }
    }

    fn width(&self, code: u32) -> f64 {
        if self.two_byte {
            return self.cid_widths.get(&code).copied().unwrap_or(self.default_width);
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(self.default_width)
    }

    /// Split a shown string into glyphs
    pub fn decode(&self, bytes: &[u8]) -> Vec<Glyph> {
        if self.two_byte {
            return bytes
                .chunks(2)
                .map(|pair| {
                    let code = pair.iter().fold(0u32, |acc, b| (acc << 8) | *b as u32);
                    let text = match self.lookup(code) {
                        Some(text) => text,
                        None => char::from_u32(code)
                            .filter(|c| !c.is_control())
                            .map(String::from)
                            .unwrap_or_default(),
                    };
                    Glyph {
                        text,
                        width: self.width(code),
                        is_space: false,
                    }
                })
                .collect();
        }

        if self.to_unicode.is_none() && bytes.starts_with(&[0xFE, 0xFF]) {
            return self.decode_utf16(&bytes[2..]);
        }

        bytes
            .iter()
            .map(|&b| {
                let code = b as u32;
                let text = self.lookup(code).unwrap_or_else(|| win_ansi(b).to_string());
                Glyph {
                    text,
                    width: self.width(code),
                    is_space: b == b' ',
                }
            })
            .collect()
    }

    fn decode_utf16(&self, bytes: &[u8]) -> Vec<Glyph> {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .map(|c| Glyph {
                text: c.to_string(),
                width: if c as u32 >= 0x2E80 {
                    DEFAULT_CID_WIDTH
                } else {
                    self.default_width
                },
                is_space: c == ' ',
            })
            .collect()
    }

    fn lookup(&self, code: u32) -> Option<String> {
        self.to_unicode
            .as_ref()
            .and_then(|cmap| cmap.lookup(code))
            .map(str::to_owned)
    }
}

fn win_ansi(byte: u8) -> char {
    match byte {
        0x80..=0x9F => WIN_ANSI_HIGH[(byte - 0x80) as usize],
        _ => byte as char,
    }
}

/// `[c [w1 w2 ...]]` and `[c_first c_last w]` forms, mixed freely
fn parse_cid_widths(doc: &Document, w: &[Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let mut i = 0;

    while i + 1 < w.len() {
        let Some(first) = number(resolve(doc, &w[i])) else {
            break;
        };
        let first = first.max(0.0) as u32;
        match resolve(doc, &w[i + 1]) {
            Object::Array(list) => {
                for (k, value) in list.iter().enumerate() {
                    let Some(code) = first.checked_add(k as u32) else {
                        break;
                    };
                    if let Some(width) = number(resolve(doc, value)) {
                        widths.insert(code, width);
                    }
                }
                i += 2;
            }
            other => {
                let (Some(last), Some(width)) = (
                    number(other),
                    w.get(i + 2).and_then(|o| number(resolve(doc, o))),
                ) else {
                    break;
                };
                let last = (last.max(0.0) as u32).min(first.saturating_add(0xFFFF));
                for code in first..=last {
                    widths.insert(code, width);
                }
                i += 3;
            }
        }
    }

    widths
}

fn descriptor_metrics(doc: &Document, font: &Dictionary) -> (f64, f64) {
    let descriptor = font
        .get(b"FontDescriptor")
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok());
    let Some(descriptor) = descriptor else {
        return (DEFAULT_ASCENT, DEFAULT_DESCENT);
    };

    let read = |key: &[u8]| descriptor.get(key).ok().and_then(|o| number(resolve(doc, o)));
    match (read(b"Ascent"), read(b"Descent")) {
        (Some(ascent), Some(descent)) if ascent - descent >= 1.0 => (ascent, descent.min(0.0)),
        _ => (DEFAULT_ASCENT, DEFAULT_DESCENT),
    }
}
