use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use glyphscrub::{NameMap, parse_extra_redact};
use image::{DynamicImage, ImageReader, RgbImage};
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level is `warn`, raised to
/// `debug` by one `-v` and `trace` by two or more.
pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Open an image file with user-friendly error messages.
///
/// The format is detected from the file contents, falling back to the
/// extension. Returns `Err(1)` with a message printed to stderr if the file
/// is missing or cannot be decoded.
pub fn open_image(file: &Path) -> Result<DynamicImage, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    let reader = ImageReader::open(file)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| {
            eprintln!("Error: failed to read {}: {e}", file.display());
            1
        })?;
    reader.decode().map_err(|e| {
        eprintln!("Error: failed to decode image {}: {e}", file.display());
        1
    })
}

/// Write an image, choosing the encoder from the file extension.
pub fn save_image(image: &RgbImage, path: &Path) -> Result<(), i32> {
    image.save(path).map_err(|e| {
        eprintln!("Error: failed to write {}: {e}", path.display());
        1
    })
}

/// Read a text file, printing an error on failure.
pub fn read_text(path: &Path, what: &str) -> Result<String, i32> {
    if !path.exists() {
        eprintln!("Error: {what} not found: {}", path.display());
        return Err(1);
    }
    std::fs::read_to_string(path).map_err(|e| {
        eprintln!("Error: failed to read {what} {}: {e}", path.display());
        1
    })
}

/// Build the name map and extra-redact list from command-line options.
///
/// Pairs from `--map` come first, then pairs from `--map-file`.
pub fn load_terms(
    map: Option<&str>,
    map_file: Option<&Path>,
    extra_redact: Option<&str>,
) -> Result<(NameMap, Vec<String>), i32> {
    let mut names = map.map(NameMap::parse).unwrap_or_default();
    if let Some(path) = map_file {
        let content = read_text(path, "map file")?;
        names.extend_from_lines(&content);
    }
    let extras = extra_redact.map(parse_extra_redact).unwrap_or_default();
    Ok((names, extras))
}

/// Output path for a redacted image: `<stem>_anon.<ext>` next to the input,
/// or inside `output_dir` when given. Inputs without an extension get `.png`.
pub fn anon_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    let name = format!("{stem}_anon.{ext}");
    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

/// Escape a string for CSV output.
///
/// If the text contains commas, double quotes, or newlines, wraps it in
/// double quotes and escapes any internal double quotes by doubling them.
pub fn csv_escape(text: &str) -> String {
    if text.contains(',') || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// A progress reporter that prints "Processing image N/M..." to stderr,
/// but only when stderr is connected to a TTY (terminal).
pub struct ProgressReporter {
    total: usize,
    is_tty: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter for `total` images.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            is_tty: io::stderr().is_terminal(),
        }
    }

    /// Report progress for image `current` (1-indexed).
    pub fn report(&self, current: usize) {
        if self.is_tty {
            eprint!("\rProcessing image {}/{}...", current, self.total);
            let _ = io::stderr().flush();
        }
    }

    /// Clear the progress line (if TTY).
    pub fn finish(&self) {
        if self.is_tty {
            eprint!("\r{}\r", " ".repeat(40));
            let _ = io::stderr().flush();
        }
    }
}
