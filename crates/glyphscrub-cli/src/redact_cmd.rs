use std::path::{Path, PathBuf};

use glyphscrub::{
    PrecomputedTokens, RedactOptions, Redaction, Redactor, Tesseract, TermSet, TesseractConfig,
    TokenSource,
};

use crate::cli::ReportFormat;
use crate::shared::{ProgressReporter, anon_path, load_terms, open_image, read_text, save_image};

/// Options for the `redact` subcommand.
pub struct RedactArgs<'a> {
    pub files: &'a [PathBuf],
    pub map: Option<&'a str>,
    pub map_file: Option<&'a Path>,
    pub extra_redact: Option<&'a str>,
    pub output_dir: Option<&'a Path>,
    pub scale: f64,
    pub min_size: u32,
    pub tokens: Option<&'a Path>,
    pub format: &'a ReportFormat,
}

struct FileReport {
    input: PathBuf,
    output: Option<PathBuf>,
    redaction: Redaction,
}

pub fn run(args: &RedactArgs<'_>) -> Result<(), i32> {
    let (names, extras) = load_terms(args.map, args.map_file, args.extra_redact)?;
    if names.is_empty() && extras.is_empty() {
        eprintln!("Error: nothing to redact; pass --map, --map-file, or --extra-redact");
        return Err(1);
    }
    if args.tokens.is_some() && args.files.len() > 1 {
        eprintln!("Error: --tokens replays one token stream and needs exactly one FILE");
        return Err(1);
    }
    if let Some(dir) = args.output_dir {
        std::fs::create_dir_all(dir).map_err(|e| {
            eprintln!("Error: cannot create output directory {}: {e}", dir.display());
            1
        })?;
    }

    let source = token_source(args.tokens, args.scale)?;
    let redactor = Redactor::new(source).with_options(RedactOptions {
        scale: args.scale,
        min_side: args.min_size,
        ..RedactOptions::default()
    });
    if !redactor.is_available() {
        eprintln!(
            "Error: OCR engine unavailable: 'tesseract' not found. Install Tesseract or pass --tokens"
        );
        return Err(1);
    }

    let terms = TermSet::new(&names, &extras);
    tracing::debug!(
        names = names.len(),
        variants = names.variant_count(),
        extras = extras.len(),
        "term set built"
    );

    let progress = ProgressReporter::new(args.files.len());
    let mut reports = Vec::with_capacity(args.files.len());
    for (i, file) in args.files.iter().enumerate() {
        progress.report(i + 1);
        let image = open_image(file)?;
        let redaction = redactor.redact_with_terms(&image, &terms).map_err(|e| {
            eprintln!("Error: {}: {e}", file.display());
            1
        })?;
        if redaction.engine_unavailable() {
            eprintln!("Error: OCR engine unavailable while processing {}", file.display());
            return Err(1);
        }

        let output = if redaction.is_modified() {
            let path = anon_path(file, args.output_dir);
            save_image(&redaction.image, &path)?;
            Some(path)
        } else {
            None
        };
        reports.push(FileReport {
            input: file.clone(),
            output,
            redaction,
        });
    }
    progress.finish();

    match args.format {
        ReportFormat::Text => write_text(&reports),
        ReportFormat::Json => write_json(&reports),
    }
}

fn token_source(tokens: Option<&Path>, scale: f64) -> Result<Box<dyn TokenSource>, i32> {
    match tokens {
        Some(path) => {
            let tsv = read_text(path, "token file")?;
            let replay = PrecomputedTokens::from_tsv(&tsv).map_err(|e| {
                eprintln!("Error: {}: {e}", path.display());
                1
            })?;
            Ok(Box::new(replay))
        }
        None => Ok(Box::new(
            Tesseract::new(TesseractConfig::default()).with_scale(scale),
        )),
    }
}

fn write_text(reports: &[FileReport]) -> Result<(), i32> {
    let mut total = 0;
    for r in reports {
        total += r.redaction.count;
        match &r.output {
            Some(out) => println!(
                "{}: {} redaction(s) -> {}",
                r.input.display(),
                r.redaction.count,
                out.display()
            ),
            None => println!("{}: no changes", r.input.display()),
        }
        for span in &r.redaction.spans {
            if span.replacement.is_empty() {
                println!("  [{}] blacked out", span.term);
            } else {
                println!("  [{}] -> {}", span.term, span.replacement);
            }
        }
        for w in &r.redaction.warnings {
            println!("  warning: {w}");
        }
    }
    println!(
        "Done! {total} image redaction(s) in {} file(s).",
        reports.len()
    );
    Ok(())
}

fn write_json(reports: &[FileReport]) -> Result<(), i32> {
    let files: Vec<_> = reports
        .iter()
        .map(|r| {
            serde_json::json!({
                "file": r.input.display().to_string(),
                "output": r.output.as_ref().map(|p| p.display().to_string()),
                "count": r.redaction.count,
                "spans": r.redaction.spans,
                "warnings": r.redaction.warnings,
            })
        })
        .collect();
    let total: usize = reports.iter().map(|r| r.redaction.count).sum();
    let report = serde_json::json!({ "files": files, "total": total });

    let json_str = serde_json::to_string_pretty(&report).map_err(|e| {
        eprintln!("Error: failed to serialize report: {e}");
        1
    })?;
    println!("{json_str}");
    Ok(())
}
