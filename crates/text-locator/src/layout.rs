//! Page text layout: the block → line → span tree every backend produces
//!
//! Coordinates are absolute page points with a top-left origin.

/// Axis-aligned rectangle in page space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Bounding box of a set of corner points
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let mut rect = Rect::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &(x, y) in points {
            rect.x0 = rect.x0.min(x);
            rect.y0 = rect.y0.min(y);
            rect.x1 = rect.x1.max(x);
            rect.y1 = rect.y1.max(y);
        }
        rect
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Finite and not inverted
    pub fn is_well_formed(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|v| v.is_finite())
            && self.x0 <= self.x1
            && self.y0 <= self.y1
    }
}

fn union_all<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Rect {
    let mut iter = rects.into_iter();
    match iter.next() {
        Some(first) => iter.fold(*first, |acc, r| acc.union(r)),
        None => Rect::default(),
    }
}

/// One character with its own box
#[derive(Debug, Clone, PartialEq)]
pub struct TextChar {
    pub ch: char,
    pub bbox: Rect,
}

/// Smallest text-bearing unit: a run of characters in one font on one line
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub bbox: Rect,
    pub chars: Vec<TextChar>,
    pub font_name: String,
    pub font_size: f64,
}

impl TextSpan {
    pub fn from_chars(chars: Vec<TextChar>, font_name: impl Into<String>, font_size: f64) -> Self {
        let text = chars.iter().map(|c| c.ch).collect();
        let bbox = union_all(chars.iter().map(|c| &c.bbox));
        Self {
            text,
            bbox,
            chars,
            font_name: font_name.into(),
            font_size,
        }
    }

    /// Build a span whose characters share the box evenly, left to right.
    ///
    /// For backends that only report span-level geometry.
    pub fn uniform(text: &str, bbox: Rect) -> Self {
        let count = text.chars().count().max(1) as f64;
        let step = bbox.width() / count;
        let chars = text
            .chars()
            .enumerate()
            .map(|(i, ch)| TextChar {
                ch,
                bbox: Rect::new(
                    bbox.x0 + step * i as f64,
                    bbox.y0,
                    bbox.x0 + step * (i + 1) as f64,
                    bbox.y1,
                ),
            })
            .collect();
        Self {
            text: text.to_string(),
            bbox,
            chars,
            font_name: String::new(),
            font_size: bbox.height(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
    pub bbox: Rect,
}

impl TextLine {
    pub fn new(spans: Vec<TextSpan>) -> Self {
        let bbox = union_all(spans.iter().map(|s| &s.bbox));
        Self { spans, bbox }
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
    pub bbox: Rect,
}

impl TextBlock {
    pub fn new(lines: Vec<TextLine>) -> Self {
        let bbox = union_all(lines.iter().map(|l| &l.bbox));
        Self { lines, bbox }
    }
}

/// Everything the locator needs from one page
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLayout {
    pub width: f64,
    pub height: f64,
    pub blocks: Vec<TextBlock>,
}

impl PageLayout {
    pub fn new(width: f64, height: f64, blocks: Vec<TextBlock>) -> Self {
        Self {
            width,
            height,
            blocks,
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }

    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.lines().flat_map(|l| l.spans.iter())
    }

    /// Plain text, one line per text line
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for line in self.lines() {
            for span in &line.spans {
                text.push_str(&span.text);
            }
            text.push('\n');
        }
        text
    }

    /// Exact, case-sensitive search within each line.
    ///
    /// Occurrences do not overlap. A match may cover several spans of the
    /// same line but never continues onto the next line.
    pub fn search_exact(&self, needle: &str) -> Vec<Rect> {
        let needle: Vec<char> = needle.chars().collect();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for line in self.lines() {
            let chars: Vec<&TextChar> = line.spans.iter().flat_map(|s| s.chars.iter()).collect();
            if chars.len() < needle.len() {
                continue;
            }

            let mut i = 0;
            while i + needle.len() <= chars.len() {
                let window = &chars[i..i + needle.len()];
                if window.iter().zip(&needle).all(|(c, n)| c.ch == *n) {
                    hits.push(union_all(window.iter().map(|c| &c.bbox)));
                    i += needle.len();
                } else {
                    i += 1;
                }
            }
        }
        hits
    }
}
