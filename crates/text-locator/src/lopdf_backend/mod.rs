//! Pure-Rust PDF backend on top of lopdf
//!
//! Builds a [`PageLayout`] for each requested page by interpreting its
//! content stream. Exact search, plain text and the span tree all come from
//! that layout.
//!
//! Supported: simple fonts with `/Widths`, Type0 fonts with `/W`,
//! `/ToUnicode` CMaps, UTF-16BE strings with a BOM and a Latin-1 fallback.
//! Type3 glyph procedures and form XObjects are not interpreted.

mod cmap;
mod fonts;
mod interpreter;

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, warn};

use crate::backend::{DocumentBackend, DocumentSource, TextDocument};
use crate::error::BackendError;
use crate::layout::PageLayout;

pub use cmap::ToUnicodeCMap;
pub use fonts::FontMetrics;
pub use interpreter::{interpret, MediaBox, KERNING_SPACE_THRESHOLD};

/// US Letter, used when a page and its ancestors carry no `/MediaBox`
pub const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentBackend for LopdfBackend {
    type Document = LopdfDocument;

    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn open(&self, source: &DocumentSource) -> Result<LopdfDocument, BackendError> {
        let inner = match source {
            DocumentSource::Path(path) => Document::load(path),
            DocumentSource::Bytes(bytes) => Document::load_mem(bytes),
        }
        .map_err(|e| BackendError::Parse(e.to_string()))?;

        // get_pages is keyed by 1-based page number, already in order
        let page_ids: Vec<ObjectId> = inner.get_pages().values().copied().collect();
        debug!("Opened {} ({} pages)", source.describe(), page_ids.len());

        Ok(LopdfDocument {
            inner,
            page_ids,
            origin: source.describe(),
        })
    }
}

/// An open PDF. The parsed object graph is released on drop.
pub struct LopdfDocument {
    inner: Document,
    page_ids: Vec<ObjectId>,
    origin: String,
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("origin", &self.origin)
            .field("pages", &self.page_ids.len())
            .finish()
    }
}

impl Drop for LopdfDocument {
    fn drop(&mut self) {
        debug!("Closing {}", self.origin);
    }
}

impl LopdfDocument {
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    fn page_id(&self, number: u32) -> Result<ObjectId, BackendError> {
        number
            .checked_sub(1)
            .and_then(|i| self.page_ids.get(i as usize))
            .copied()
            .ok_or(BackendError::PageOutOfRange {
                page: number,
                count: self.page_ids.len(),
            })
    }

    fn media_box(&self, page_number: u32, page_id: ObjectId) -> Result<MediaBox, BackendError> {
        let Some(obj) = resolve_inherited(&self.inner, page_id, b"MediaBox") else {
            let [a, b, c, d] = DEFAULT_MEDIA_BOX;
            return Ok(MediaBox::new(a, b, c, d));
        };
        let values: Vec<f64> = resolve(&self.inner, obj)
            .as_array()
            .map(|arr| arr.iter().filter_map(|o| number(resolve(&self.inner, o))).collect())
            .unwrap_or_default();
        match values[..] {
            [a, b, c, d] => Ok(MediaBox::new(a, b, c, d)),
            _ => Err(BackendError::Content {
                page: page_number,
                message: format!("malformed MediaBox {obj:?}"),
            }),
        }
    }

    fn fonts(&self, page_id: ObjectId) -> HashMap<Vec<u8>, FontMetrics> {
        let doc = &self.inner;
        let font_dict = resolve_inherited(doc, page_id, b"Resources")
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|resources| resources.get(b"Font").ok())
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok());

        let Some(font_dict) = font_dict else {
            return HashMap::new();
        };
        font_dict
            .iter()
            .filter_map(|(key, value)| {
                let font: &Dictionary = resolve(doc, value).as_dict().ok()?;
                Some((key.clone(), FontMetrics::load(doc, font)))
            })
            .collect()
    }
}

impl TextDocument for LopdfDocument {
    type Page = PageLayout;

    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page(&self, number: u32) -> Result<PageLayout, BackendError> {
        let page_id = self.page_id(number)?;
        let media = self.media_box(number, page_id)?;
        let fonts = self.fonts(page_id);

        let content = self
            .inner
            .get_page_content(page_id)
            .map_err(|e| BackendError::Content {
                page: number,
                message: e.to_string(),
            })?;
        let operations = match Content::decode(&content) {
            Ok(decoded) => decoded.operations,
            Err(e) => {
                warn!("Page {} content stream unreadable: {}", number, e);
                return Err(BackendError::Content {
                    page: number,
                    message: e.to_string(),
                });
            }
        };

        let blocks = interpret(&operations, &fonts, media);
        debug!(
            "Page {}: {} ops, {} fonts, {} blocks",
            number,
            operations.len(),
            fonts.len(),
            blocks.len()
        );
        Ok(PageLayout::new(media.width(), media.height(), blocks))
    }
}

/// Integer or real operand as f64
pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(*f as f64),
        _ => None,
    }
}

/// Follow one indirect reference, leaving direct objects untouched
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Look up a page attribute, walking `/Parent` links for inherited ones
fn resolve_inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_id;
    // Guard against cyclic /Parent chains
    for _ in 0..64 {
        let dict = doc.get_object(current).and_then(Object::as_dict).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}
