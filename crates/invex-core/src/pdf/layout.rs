//! Positioned text extraction from PDF content streams.
//!
//! Implements a simplified PDF text-rendering state machine over a page's
//! decoded operations and assembles the resulting glyph runs into lines with
//! per-character boxes, ready for exact-substring search.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};
use tracing::trace;

use crate::error::PdfError;
use crate::models::PdfConfig;

/// The identity 2x3 text matrix: [a, b, c, d, tx, ty].
const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Approximate glyph advance as a fraction of font size. Glyph metrics are
/// not resolved; 0.5 is a workable default for proportional fonts.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// One character cell on the page, in PDF x coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharBox {
    /// The character.
    pub ch: char,
    /// Left edge.
    pub x0: f32,
    /// Right edge.
    pub x1: f32,
}

/// A contiguous glyph run emitted by one show-text operation.
#[derive(Debug, Clone)]
struct TextRun {
    text: String,
    chars: Vec<CharBox>,
    y: f32,
    font_size: f32,
}

impl TextRun {
    fn x0(&self) -> f32 {
        self.chars.first().map(|c| c.x0).unwrap_or(0.0)
    }
}

/// A horizontal line of text with aligned per-character boxes, in top-down
/// page coordinates.
///
/// Invariant: `text.chars().count() == chars.len()`.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The assembled line text, spaces inserted at word gaps.
    pub text: String,
    /// One box per character of `text`.
    pub chars: Vec<CharBox>,
    /// Top edge, measured from the top of the page.
    pub top: f32,
    /// Bottom edge, measured from the top of the page.
    pub bottom: f32,
}

/// Mutable state tracked while walking a page's content stream.
#[derive(Debug, Clone)]
struct TextState {
    /// Current font size in text-space units.
    font_size: f32,
    /// Elements [a, b, c, d, tx, ty] of the current text matrix.
    text_matrix: [f32; 6],
    /// Text line matrix; set by BT and updated by Td/TD/T*/Tm.
    line_matrix: [f32; 6],
    /// Horizontal scaling factor (percent / 100).
    horiz_scale: f32,
    /// Character spacing (Tc).
    char_spacing: f32,
    /// Word spacing (Tw).
    word_spacing: f32,
    /// Text rise (Ts).
    text_rise: f32,
    /// Leading (TL).
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_size: 0.0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn x(&self) -> f32 {
        self.text_matrix[4]
    }

    fn y(&self) -> f32 {
        self.text_matrix[5]
    }

    /// Rendered font size accounting for the text matrix vertical scale.
    fn effective_font_size(&self) -> f32 {
        let scale = (self.text_matrix[1].powi(2) + self.text_matrix[3].powi(2)).sqrt();
        (self.font_size * scale).abs()
    }

    /// Advance the text matrix horizontally by `dx` text-space units.
    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Translate the line matrix (Td / TD) and reset the text matrix to it.
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let new_tx = self.line_matrix[0] * tx + self.line_matrix[2] * ty + self.line_matrix[4];
        let new_ty = self.line_matrix[1] * tx + self.line_matrix[3] * ty + self.line_matrix[5];
        self.line_matrix[4] = new_tx;
        self.line_matrix[5] = new_ty;
        self.text_matrix = self.line_matrix;
    }

    /// Glyph advance for one character in text-space units.
    fn char_width(&self, config: &PdfConfig) -> f32 {
        if self.font_size > 0.0 {
            self.font_size * APPROX_CHAR_WIDTH_RATIO * self.horiz_scale
        } else {
            config.x_density
        }
    }
}

/// Extract a number from an operand.
fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(f) => Some(*f),
        _ => None,
    }
}

/// Decode a PDF string operand.
///
/// UTF-16BE when BOM-prefixed; otherwise byte-per-character, which covers
/// the Latin range of both PDFDocEncoding and WinAnsiEncoding.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// Emit one glyph run for a shown string and advance the text matrix.
fn show_text(bytes: &[u8], state: &mut TextState, config: &PdfConfig, runs: &mut Vec<TextRun>) {
    let text = decode_pdf_string(bytes);
    if text.is_empty() {
        return;
    }

    let y = state.y() + state.text_rise;
    let font_size = state.effective_font_size();
    let mut chars = Vec::with_capacity(text.chars().count());

    for ch in text.chars() {
        let x0 = state.x();
        state.advance_x(state.char_width(config));
        let x1 = state.x();
        chars.push(CharBox { ch, x0, x1 });

        let mut spacing = state.char_spacing;
        if ch == ' ' {
            spacing += state.word_spacing;
        }
        if spacing != 0.0 {
            state.advance_x(spacing);
        }
    }

    runs.push(TextRun {
        text,
        chars,
        y,
        font_size,
    });
}

/// Walk a page's decoded operations and produce the raw glyph runs.
///
/// Handles the text-positioning and text-showing operators; everything else
/// is ignored. TJ kerning adjustments advance the position without emitting
/// characters, so word gaps inside one TJ array surface as inter-run gaps
/// and are spaced during line assembly.
fn runs_from_operations(operations: &[Operation], config: &PdfConfig) -> Vec<TextRun> {
    let mut state = TextState::default();
    let mut runs = Vec::new();

    for op in operations {
        match op.operator.as_str() {
            "BT" => {
                state.text_matrix = IDENTITY_MATRIX;
                state.line_matrix = IDENTITY_MATRIX;
            }
            "ET" => {}
            "Tf" => {
                // Font resources are not resolved; only the size matters here.
                if let Some(size) = op.operands.get(1).and_then(number) {
                    state.font_size = size;
                }
            }
            "Tm" => {
                let values: Vec<f32> = op.operands.iter().take(6).filter_map(number).collect();
                if values.len() == 6 {
                    state.text_matrix = [
                        values[0], values[1], values[2], values[3], values[4], values[5],
                    ];
                    state.line_matrix = state.text_matrix;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (
                    op.operands.first().and_then(number),
                    op.operands.get(1).and_then(number),
                ) {
                    state.translate_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (
                    op.operands.first().and_then(number),
                    op.operands.get(1).and_then(number),
                ) {
                    state.leading = -ty;
                    state.translate_line(tx, ty);
                }
            }
            "T*" => {
                state.translate_line(0.0, -state.leading);
            }
            "TL" => {
                if let Some(value) = op.operands.first().and_then(number) {
                    state.leading = value;
                }
            }
            "Tc" => {
                if let Some(value) = op.operands.first().and_then(number) {
                    state.char_spacing = value;
                }
            }
            "Tw" => {
                if let Some(value) = op.operands.first().and_then(number) {
                    state.word_spacing = value;
                }
            }
            "Tz" => {
                if let Some(value) = op.operands.first().and_then(number) {
                    state.horiz_scale = value / 100.0;
                }
            }
            "Ts" => {
                if let Some(value) = op.operands.first().and_then(number) {
                    state.text_rise = value;
                }
            }
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    show_text(bytes, &mut state, config, &mut runs);
                }
            }
            "TJ" => {
                if let Some(Object::Array(elements)) = op.operands.first() {
                    for element in elements {
                        match element {
                            Object::String(bytes, _) => {
                                show_text(bytes, &mut state, config, &mut runs);
                            }
                            other => {
                                // Kerning in thousandths of text space;
                                // negative values move the pen right.
                                if let Some(adjust) = number(other) {
                                    state.advance_x(
                                        -adjust / 1000.0 * state.font_size * state.horiz_scale,
                                    );
                                }
                            }
                        }
                    }
                }
            }
            "'" => {
                state.translate_line(0.0, -state.leading);
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    show_text(bytes, &mut state, config, &mut runs);
                }
            }
            "\"" => {
                if op.operands.len() >= 3 {
                    if let Some(word) = number(&op.operands[0]) {
                        state.word_spacing = word;
                    }
                    if let Some(chr) = number(&op.operands[1]) {
                        state.char_spacing = chr;
                    }
                    state.translate_line(0.0, -state.leading);
                    if let Object::String(bytes, _) = &op.operands[2] {
                        show_text(bytes, &mut state, config, &mut runs);
                    }
                }
            }
            _ => {}
        }
    }

    runs
}

/// Group glyph runs into lines and convert to top-down coordinates.
///
/// Runs whose baselines differ by at most `y_tolerance` share a line. Within
/// a line, runs are ordered left to right and a space character is inserted
/// wherever the horizontal gap exceeds `x_tolerance`.
fn assemble_lines(mut runs: Vec<TextRun>, config: &PdfConfig, page_height: f32) -> Vec<TextLine> {
    runs.retain(|run| !run.chars.is_empty());
    if runs.is_empty() {
        return Vec::new();
    }

    // Top of page first, then left to right.
    runs.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x0().partial_cmp(&b.x0()).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines = Vec::new();
    let mut group: Vec<TextRun> = Vec::new();
    let mut group_y = runs[0].y;

    for run in runs {
        if group.is_empty() || (run.y - group_y).abs() <= config.y_tolerance {
            if group.is_empty() {
                group_y = run.y;
            }
            group.push(run);
        } else {
            lines.push(build_line(std::mem::take(&mut group), config, page_height));
            group_y = run.y;
            group.push(run);
        }
    }
    if !group.is_empty() {
        lines.push(build_line(group, config, page_height));
    }

    lines
}

/// Merge one group of same-baseline runs into a line.
fn build_line(mut group: Vec<TextRun>, config: &PdfConfig, page_height: f32) -> TextLine {
    group.sort_by(|a, b| a.x0().partial_cmp(&b.x0()).unwrap_or(std::cmp::Ordering::Equal));

    let baseline = group[0].y;
    let font_size = group
        .iter()
        .map(|run| run.font_size)
        .fold(0.0_f32, f32::max);
    let height = if font_size > 0.0 {
        font_size
    } else {
        config.y_density
    };

    let mut text = String::new();
    let mut chars: Vec<CharBox> = Vec::new();

    for run in group {
        if let Some(last) = chars.last() {
            let gap = run.x0() - last.x1;
            if gap > config.x_tolerance {
                text.push(' ');
                chars.push(CharBox {
                    ch: ' ',
                    x0: last.x1,
                    x1: run.x0(),
                });
            }
        }
        text.push_str(&run.text);
        chars.extend(run.chars);
    }

    TextLine {
        text,
        chars,
        top: page_height - (baseline + height),
        bottom: page_height - baseline,
    }
}

/// Resolve the page's MediaBox, defaulting to US Letter.
fn media_box(document: &Document, page_id: ObjectId) -> [f32; 4] {
    const LETTER: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

    let Ok(page) = document.get_object(page_id).and_then(Object::as_dict) else {
        return LETTER;
    };
    let Ok(raw) = page.get(b"MediaBox") else {
        return LETTER;
    };
    let Ok((_, resolved)) = document.dereference(raw) else {
        return LETTER;
    };
    let Object::Array(values) = resolved else {
        return LETTER;
    };

    let bounds: Vec<f32> = values.iter().filter_map(number).collect();
    if bounds.len() == 4 {
        [bounds[0], bounds[1], bounds[2], bounds[3]]
    } else {
        LETTER
    }
}

/// Extract the positioned lines of one page.
pub fn extract_page_lines(
    document: &Document,
    page_id: ObjectId,
    config: &PdfConfig,
) -> Result<Vec<TextLine>, PdfError> {
    let content = document
        .get_page_content(page_id)
        .map_err(|e| PdfError::Parse(e.to_string()))?;
    let decoded = Content::decode(&content).map_err(|e| PdfError::Parse(e.to_string()))?;

    let media = media_box(document, page_id);
    let page_height = media[3] - media[1];

    let runs = runs_from_operations(&decoded.operations, config);
    trace!(runs = runs.len(), "Extracted glyph runs");

    Ok(assemble_lines(runs, config, page_height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Object;

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn text_ops(x: f32, y: f32, size: f32, text: &str) -> Vec<Operation> {
        vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), Object::Real(size)]),
            op("Td", vec![Object::Real(x), Object::Real(y)]),
            op("Tj", vec![Object::string_literal(text)]),
            op("ET", vec![]),
        ]
    }

    #[test]
    fn test_single_run_positions() {
        let config = PdfConfig::default();
        let runs = runs_from_operations(&text_ops(72.0, 700.0, 12.0, "Acme"), &config);

        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Acme");
        assert_eq!(runs[0].y, 700.0);
        assert_eq!(runs[0].chars[0].x0, 72.0);
        // Each glyph advances by half the font size.
        assert_eq!(runs[0].chars[0].x1, 78.0);
        assert_eq!(runs[0].chars[3].x1, 96.0);
    }

    #[test]
    fn test_td_moves_to_next_line() {
        let config = PdfConfig::default();
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), Object::Real(12.0)]),
            op("Td", vec![Object::Real(72.0), Object::Real(700.0)]),
            op("Tj", vec![Object::string_literal("one")]),
            op("Td", vec![Object::Real(0.0), Object::Real(-14.0)]),
            op("Tj", vec![Object::string_literal("two")]),
            op("ET", vec![]),
        ];
        let runs = runs_from_operations(&ops, &config);

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].y, 700.0);
        assert_eq!(runs[1].y, 686.0);
        // Td is relative to the line matrix, not the advanced pen position.
        assert_eq!(runs[1].x0(), 72.0);
    }

    #[test]
    fn test_tj_kerning_creates_gap() {
        let config = PdfConfig::default();
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), Object::Real(12.0)]),
            op("Td", vec![Object::Real(0.0), Object::Real(700.0)]),
            op(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("ab"),
                    // -1000/1000 * 12 = 12pt rightward gap.
                    Object::Integer(-1000),
                    Object::string_literal("cd"),
                ])],
            ),
            op("ET", vec![]),
        ];
        let runs = runs_from_operations(&ops, &config);

        assert_eq!(runs.len(), 2);
        let gap = runs[1].x0() - runs[0].chars.last().unwrap().x1;
        assert_eq!(gap, 12.0);
    }

    #[test]
    fn test_assemble_merges_same_baseline() {
        let config = PdfConfig::default();
        let mut ops = text_ops(72.0, 700.0, 12.0, "Acme");
        // 30pt to the right of where "Acme" ends (x = 96): a clear word gap.
        ops.extend(text_ops(126.0, 700.0, 12.0, "Associates"));

        let runs = runs_from_operations(&ops, &config);
        let lines = assemble_lines(runs, &config, 792.0);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Acme Associates");
        assert_eq!(lines[0].chars.len(), lines[0].text.chars().count());
    }

    #[test]
    fn test_assemble_joins_adjacent_runs_without_space() {
        let config = PdfConfig::default();
        let mut ops = text_ops(72.0, 700.0, 12.0, "V10");
        // "V10" ends at x = 90; within x_tolerance, so no space.
        ops.extend(text_ops(91.0, 700.0, 12.0, "000"));

        let runs = runs_from_operations(&ops, &config);
        let lines = assemble_lines(runs, &config, 792.0);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "V10000");
    }

    #[test]
    fn test_assemble_splits_distinct_baselines() {
        let config = PdfConfig::default();
        let mut ops = text_ops(72.0, 700.0, 12.0, "upper");
        ops.extend(text_ops(72.0, 680.0, 12.0, "lower"));

        let runs = runs_from_operations(&ops, &config);
        let lines = assemble_lines(runs, &config, 792.0);

        assert_eq!(lines.len(), 2);
        // Top of page first.
        assert_eq!(lines[0].text, "upper");
        assert_eq!(lines[1].text, "lower");
    }

    #[test]
    fn test_top_down_conversion() {
        let config = PdfConfig::default();
        let runs = runs_from_operations(&text_ops(72.0, 700.0, 12.0, "x"), &config);
        let lines = assemble_lines(runs, &config, 792.0);

        assert_eq!(lines[0].bottom, 92.0);
        assert_eq!(lines[0].top, 80.0);
    }

    #[test]
    fn test_decode_utf16() {
        let bytes = [0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42];
        assert_eq!(decode_pdf_string(&bytes), "AB");
    }

    #[test]
    fn test_decode_latin() {
        assert_eq!(decode_pdf_string(b"Invoice"), "Invoice");
    }
}
