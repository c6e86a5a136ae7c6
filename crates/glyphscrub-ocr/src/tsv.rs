//! Tesseract TSV output parsing and serialization.
//!
//! Each row carries twelve tab-separated columns:
//! `level page_num block_num par_num line_num word_num left top width height conf text`.
//! Word rows have level 5. Rows of levels 1–4 describe page, block,
//! paragraph and line structure; they carry no text and confidence `-1`.
//! They are kept as empty tokens so that the token stream preserves line and
//! block boundaries.

use glyphscrub_core::{PixelBox, Token};

use crate::error::OcrError;

/// Header row written by [`write_tsv`] and emitted by Tesseract.
pub const TSV_HEADER: &str =
    "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

/// Level of word rows.
pub const WORD_LEVEL: u8 = 5;

/// Level written for empty separator tokens.
const LINE_LEVEL: u8 = 4;

const COLUMNS: usize = 12;

/// Parse Tesseract TSV output into a token stream.
///
/// The header row and blank lines are skipped. Fractional confidences are
/// truncated toward zero. A row with a missing trailing text column is read
/// as empty text.
///
/// # Errors
///
/// Returns [`OcrError::Tsv`] when a row has too few columns or a numeric
/// column does not parse.
pub fn parse_tsv(input: &str) -> Result<Vec<Token>, OcrError> {
    let mut tokens = Vec::new();

    for (i, raw) in input.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with("level") {
            continue;
        }

        let fields: Vec<&str> = line.splitn(COLUMNS, '\t').collect();
        if fields.len() < COLUMNS - 1 {
            return Err(OcrError::Tsv {
                line: line_no,
                reason: format!("expected {COLUMNS} columns, found {}", fields.len()),
            });
        }

        let coord = |idx: usize, name: &str| -> Result<u32, OcrError> {
            let value: i64 = fields[idx].trim().parse().map_err(|_| OcrError::Tsv {
                line: line_no,
                reason: format!("invalid {name}: '{}'", fields[idx]),
            })?;
            Ok(value.clamp(0, i64::from(u32::MAX)) as u32)
        };

        let bbox = PixelBox::new(
            coord(6, "left")?,
            coord(7, "top")?,
            coord(8, "width")?,
            coord(9, "height")?,
        );
        let confidence = parse_confidence(fields[10]).ok_or_else(|| OcrError::Tsv {
            line: line_no,
            reason: format!("invalid conf: '{}'", fields[10]),
        })?;
        let text = fields.get(11).copied().unwrap_or("");

        tokens.push(Token::new(text, confidence, bbox));
    }

    Ok(tokens)
}

fn parse_confidence(raw: &str) -> Option<i32> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value.trunc() as i32)
}

/// Serialize tokens as TSV that [`parse_tsv`] reads back.
///
/// Tokens with text become word rows; empty tokens become line rows.
/// Structural numbering columns are written as zero.
pub fn write_tsv(tokens: &[Token]) -> String {
    let mut out = String::from(TSV_HEADER);
    out.push('\n');
    for (i, t) in tokens.iter().enumerate() {
        let level = if t.trimmed().is_empty() {
            LINE_LEVEL
        } else {
            WORD_LEVEL
        };
        out.push_str(&format!(
            "{level}\t1\t0\t0\t0\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            i + 1,
            t.bbox.x,
            t.bbox.y,
            t.bbox.width,
            t.bbox.height,
            t.confidence,
            t.text.replace(['\t', '\n'], " "),
        ));
    }
    out
}
