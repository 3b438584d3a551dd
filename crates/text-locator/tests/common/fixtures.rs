//! In-memory PDFs built with lopdf for end-to-end locator tests

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// One page of content-stream source plus an optional own MediaBox
pub struct FixturePage {
    pub content: String,
    pub media_box: Option<[i64; 4]>,
}

impl FixturePage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            media_box: None,
        }
    }

    pub fn with_media_box(mut self, media_box: [i64; 4]) -> Self {
        self.media_box = Some(media_box);
        self
    }
}

/// Build a PDF whose pages all use Helvetica as `/F1`.
///
/// `pages_media_box` is set on the `/Pages` node and inherited by every
/// page that has no box of its own.
pub fn build_pdf(pages: &[FixturePage], pages_media_box: Option<[i64; 4]>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for fixture in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, fixture.content.as_bytes().to_vec()));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => resources_id,
            "Contents" => content_id,
        };
        if let Some(media_box) = fixture.media_box {
            page.set("MediaBox", media_box_object(media_box));
        }
        kids.push(doc.add_object(page).into());
    }

    let mut pages_dict = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
    };
    if let Some(media_box) = pages_media_box {
        pages_dict.set("MediaBox", media_box_object(media_box));
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

fn media_box_object(media_box: [i64; 4]) -> Object {
    Object::Array(media_box.iter().map(|v| Object::Integer(*v)).collect())
}

/// `BT ... ET` showing each line with `Tj`, 14pt apart, starting at (x, y)
pub fn text_lines(x: i64, y: i64, lines: &[&str]) -> String {
    let mut content = format!("BT /F1 12 Tf 14 TL {x} {y} Td ");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            content.push_str("T* ");
        }
        content.push_str(&format!("({}) Tj ", escape(line)));
    }
    content.push_str("ET");
    content
}

/// Hex string with a UTF-16BE byte order mark, for text outside Latin-1
pub fn utf16_hex(text: &str) -> String {
    let mut hex = String::from("<FEFF");
    for unit in text.encode_utf16() {
        hex.push_str(&format!("{unit:04X}"));
    }
    hex.push('>');
    hex
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}
