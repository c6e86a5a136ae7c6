use std::path::Path;

use glyphscrub::{Tesseract, TesseractConfig, Token, TokenSource, write_tsv};

use crate::cli::TokenFormat;
use crate::shared::{csv_escape, open_image};

pub fn run(file: &Path, scale: f64, format: &TokenFormat) -> Result<(), i32> {
    let image = open_image(file)?;

    let source = Tesseract::new(TesseractConfig::default()).with_scale(scale);
    if !source.is_available() {
        eprintln!("Error: OCR engine unavailable: 'tesseract' not found");
        return Err(1);
    }
    let tokens = source.tokens(&image.to_rgb8()).map_err(|e| {
        eprintln!("Error: {}: {e}", file.display());
        1
    })?;

    match format {
        TokenFormat::Text => write_text(&tokens),
        TokenFormat::Json => write_json(&tokens),
        TokenFormat::Csv => write_csv(&tokens),
        TokenFormat::Tsv => {
            print!("{}", write_tsv(&tokens));
            Ok(())
        }
    }
}

/// Tokens with text; structural separators are left out of human-facing dumps.
fn words(tokens: &[Token]) -> impl Iterator<Item = &Token> {
    tokens.iter().filter(|t| !t.trimmed().is_empty())
}

fn write_text(tokens: &[Token]) -> Result<(), i32> {
    println!("text\tconf\tx\ty\twidth\theight");
    for t in words(tokens) {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            t.text, t.confidence, t.bbox.x, t.bbox.y, t.bbox.width, t.bbox.height,
        );
    }
    Ok(())
}

fn write_json(tokens: &[Token]) -> Result<(), i32> {
    let all: Vec<_> = words(tokens)
        .map(|t| {
            serde_json::json!({
                "text": t.text,
                "conf": t.confidence,
                "x": t.bbox.x,
                "y": t.bbox.y,
                "width": t.bbox.width,
                "height": t.bbox.height,
            })
        })
        .collect();
    let json_str = serde_json::to_string(&all).map_err(|e| {
        eprintln!("Error: failed to serialize tokens: {e}");
        1
    })?;
    println!("{json_str}");
    Ok(())
}

fn write_csv(tokens: &[Token]) -> Result<(), i32> {
    println!("text,conf,x,y,width,height");
    for t in words(tokens) {
        println!(
            "{},{},{},{},{},{}",
            csv_escape(&t.text),
            t.confidence,
            t.bbox.x,
            t.bbox.y,
            t.bbox.width,
            t.bbox.height,
        );
    }
    Ok(())
}
