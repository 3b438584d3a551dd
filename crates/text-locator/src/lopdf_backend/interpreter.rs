//! Content-stream interpreter producing positioned glyphs
//!
//! Tracks the graphics state stack, the text matrices and the text state
//! parameters needed to place each glyph. Glyph boxes are mapped into page
//! space (points, top-left origin). Each `BT`..`ET` section becomes one
//! block; a baseline change or a backward jump starts a new line; a font
//! change starts a new span.

use std::collections::HashMap;
use std::sync::OnceLock;

use lopdf::content::Operation;
use lopdf::Object;

use super::fonts::FontMetrics;
use super::number;
use crate::layout::{Rect, TextBlock, TextChar, TextLine, TextSpan};

/// TJ adjustments below this (in thousandths of an em) read as a word gap
pub const KERNING_SPACE_THRESHOLD: f64 = -100.0;

type Matrix = [f64; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

fn apply(m: &Matrix, x: f64, y: f64) -> (f64, f64) {
    (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
}

fn translation(tx: f64, ty: f64) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

/// Page box in default user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl MediaBox {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            x0: a.min(c),
            y0: b.min(d),
            x1: a.max(c),
            y1: b.max(d),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// User space to page space (top-left origin)
    fn to_page(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (x - self.x0, self.y1 - y)
    }
}

#[derive(Debug, Clone)]
struct TextState {
    font: Option<Vec<u8>>,
    size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scale: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

/// Groups glyphs into spans, lines and blocks as they are shown
#[derive(Debug, Default)]
struct LayoutBuilder {
    blocks: Vec<TextBlock>,
    lines: Vec<TextLine>,
    spans: Vec<TextSpan>,
    chars: Vec<TextChar>,
    span_font: String,
    span_size: f64,
    baseline: Option<f64>,
    pen_x: f64,
}

impl LayoutBuilder {
    fn push(&mut self, ch: TextChar, font: &str, size: f64, baseline: f64, origin_x: f64) {
        if let Some(current) = self.baseline {
            let tolerance = size.abs().max(1.0) * 0.5;
            if (current - baseline).abs() > tolerance || origin_x < self.pen_x - size.abs() {
                self.end_line();
            }
        }
        if !self.chars.is_empty()
            && (self.span_font != font || (self.span_size - size).abs() > 0.01)
        {
            self.end_span();
        }
        if self.chars.is_empty() {
            self.span_font = font.to_string();
            self.span_size = size;
        }
        if self.baseline.is_none() {
            self.baseline = Some(baseline);
        }
        self.pen_x = ch.bbox.x1;
        self.chars.push(ch);
    }

    fn last_char(&self) -> Option<char> {
        self.chars.last().map(|c| c.ch)
    }

    fn end_span(&mut self) {
        if !self.chars.is_empty() {
            let chars = std::mem::take(&mut self.chars);
            self.spans
                .push(TextSpan::from_chars(chars, self.span_font.clone(), self.span_size));
        }
    }

    fn end_line(&mut self) {
        self.end_span();
        if !self.spans.is_empty() {
            self.lines.push(TextLine::new(std::mem::take(&mut self.spans)));
        }
        self.baseline = None;
        self.pen_x = f64::NEG_INFINITY;
    }

    fn end_block(&mut self) {
        self.end_line();
        if !self.lines.is_empty() {
            self.blocks.push(TextBlock::new(std::mem::take(&mut self.lines)));
        }
    }

    fn finish(mut self) -> Vec<TextBlock> {
        self.end_block();
        self.blocks
    }
}

struct Interpreter<'a> {
    fonts: &'a HashMap<Vec<u8>, FontMetrics>,
    media: MediaBox,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    tm: Matrix,
    tlm: Matrix,
    builder: LayoutBuilder,
}

fn fallback_font() -> &'static FontMetrics {
    static FALLBACK: OnceLock<FontMetrics> = OnceLock::new();
    FALLBACK.get_or_init(FontMetrics::default)
}

fn operand_numbers(operands: &[Object]) -> Vec<f64> {
    operands.iter().filter_map(number).collect()
}

impl<'a> Interpreter<'a> {
    fn new(fonts: &'a HashMap<Vec<u8>, FontMetrics>, media: MediaBox) -> Self {
        Self {
            fonts,
            media,
            state: GraphicsState {
                ctm: IDENTITY,
                text: TextState::default(),
            },
            stack: Vec::new(),
            tm: IDENTITY,
            tlm: IDENTITY,
            builder: LayoutBuilder {
                pen_x: f64::NEG_INFINITY,
                ..LayoutBuilder::default()
            },
        }
    }

    fn font(&self) -> (&'a FontMetrics, String) {
        let fonts = self.fonts;
        match self.state.text.font.as_ref() {
            Some(key) => match fonts.get(key) {
                Some(font) => (font, font.name.clone()),
                None => (fallback_font(), String::from_utf8_lossy(key).into_owned()),
            },
            None => (fallback_font(), String::new()),
        }
    }

    fn next_line(&mut self, tx: f64, ty: f64) {
        self.tlm = multiply(&translation(tx, ty), &self.tlm);
        self.tm = self.tlm;
    }

    fn execute(&mut self, op: &Operation) {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => self.stack.push(self.state.clone()),
            "Q" => {
                if let Some(saved) = self.stack.pop() {
                    self.state = saved;
                }
            }
            "cm" => {
                if let [a, b, c, d, e, f] = operand_numbers(operands)[..] {
                    self.state.ctm = multiply(&[a, b, c, d, e, f], &self.state.ctm);
                }
            }
            "BT" => {
                self.tm = IDENTITY;
                self.tlm = IDENTITY;
            }
            "ET" => self.builder.end_block(),
            "Tf" => {
                if let (Some(Object::Name(name)), Some(size)) =
                    (operands.first(), operands.get(1).and_then(number))
                {
                    self.state.text.font = Some(name.clone());
                    self.state.text.size = size;
                }
            }
            "Tc" => {
                if let Some(v) = operands.first().and_then(number) {
                    self.state.text.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = operands.first().and_then(number) {
                    self.state.text.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = operands.first().and_then(number) {
                    self.state.text.horizontal_scale = v / 100.0;
                }
            }
            "TL" => {
                if let Some(v) = operands.first().and_then(number) {
                    self.state.text.leading = v;
                }
            }
            "Ts" => {
                if let Some(v) = operands.first().and_then(number) {
                    self.state.text.rise = v;
                }
            }
            "Td" => {
                if let [tx, ty] = operand_numbers(operands)[..] {
                    self.next_line(tx, ty);
                }
            }
            "TD" => {
                if let [tx, ty] = operand_numbers(operands)[..] {
                    self.state.text.leading = -ty;
                    self.next_line(tx, ty);
                }
            }
            "Tm" => {
                if let [a, b, c, d, e, f] = operand_numbers(operands)[..] {
                    self.tlm = [a, b, c, d, e, f];
                    self.tm = self.tlm;
                }
            }
            "T*" => self.next_line(0.0, -self.state.text.leading),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "'" => {
                self.next_line(0.0, -self.state.text.leading);
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "\"" => {
                if let (Some(aw), Some(ac)) = (
                    operands.first().and_then(number),
                    operands.get(1).and_then(number),
                ) {
                    self.state.text.word_spacing = aw;
                    self.state.text.char_spacing = ac;
                }
                self.next_line(0.0, -self.state.text.leading);
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    self.show(bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => self.show(bytes),
                            other => {
                                if let Some(adjust) = number(other) {
                                    self.adjust(adjust);
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Text rendering matrix for the current glyph origin
    fn rendering_matrix(&self) -> Matrix {
        let ts = &self.state.text;
        let params = [
            ts.size * ts.horizontal_scale,
            0.0,
            0.0,
            ts.size,
            0.0,
            ts.rise,
        ];
        multiply(&params, &multiply(&self.tm, &self.state.ctm))
    }

    fn glyph_box(&self, trm: &Matrix, width: f64, font: &FontMetrics) -> Rect {
        let (descent, ascent) = (font.descent / 1000.0, font.ascent / 1000.0);
        let corners: Vec<(f64, f64)> = [(0.0, descent), (width, descent), (0.0, ascent), (width, ascent)]
            .iter()
            .map(|&(x, y)| self.media.to_page(apply(trm, x, y)))
            .collect();
        Rect::from_points(&corners)
    }

    fn effective_size(&self) -> f64 {
        let m = multiply(&self.tm, &self.state.ctm);
        self.state.text.size * m[2].hypot(m[3])
    }

    fn show(&mut self, bytes: &[u8]) {
        let (font, font_name) = self.font();
        let size = self.effective_size();

        for glyph in font.decode(bytes) {
            let trm = self.rendering_matrix();
            let w0 = glyph.width / 1000.0;

            let chars: Vec<char> = glyph.text.chars().collect();
            if !chars.is_empty() {
                let bbox = self.glyph_box(&trm, w0, font);
                let (origin_x, baseline) = self.media.to_page(apply(&trm, 0.0, 0.0));
                let part = bbox.width() / chars.len() as f64;
                for (i, ch) in chars.iter().enumerate() {
                    let x0 = bbox.x0 + part * i as f64;
                    let char_box = Rect::new(x0, bbox.y0, x0 + part, bbox.y1);
                    self.builder.push(
                        TextChar { ch: *ch, bbox: char_box },
                        &font_name,
                        size,
                        baseline,
                        origin_x,
                    );
                }
            }

            let ts = &self.state.text;
            let spacing = ts.char_spacing + if glyph.is_space { ts.word_spacing } else { 0.0 };
            let tx = (w0 * ts.size + spacing) * ts.horizontal_scale;
            self.tm = multiply(&translation(tx, 0.0), &self.tm);
        }
    }

    /// A number inside a TJ array: move the pen back by `adjust` thousandths
    fn adjust(&mut self, adjust: f64) {
        let gap = -adjust / 1000.0;
        if adjust < KERNING_SPACE_THRESHOLD
            && self.builder.last_char().is_some_and(|c| !c.is_whitespace())
        {
            let (font, font_name) = self.font();
            let trm = self.rendering_matrix();
            let bbox = self.glyph_box(&trm, gap, font);
            let (origin_x, baseline) = self.media.to_page(apply(&trm, 0.0, 0.0));
            let size = self.effective_size();
            self.builder
                .push(TextChar { ch: ' ', bbox }, &font_name, size, baseline, origin_x);
        }
        let ts = &self.state.text;
        let tx = gap * ts.size * ts.horizontal_scale;
        self.tm = multiply(&translation(tx, 0.0), &self.tm);
    }
}

/// Lay out every text-showing operation of one page
pub fn interpret(
    operations: &[Operation],
    fonts: &HashMap<Vec<u8>, FontMetrics>,
    media: MediaBox,
) -> Vec<TextBlock> {
    let mut interpreter = Interpreter::new(fonts, media);
    for op in operations {
        interpreter.execute(op);
    }
    interpreter.builder.finish()
}
