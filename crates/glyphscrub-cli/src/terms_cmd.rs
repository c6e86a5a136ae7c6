use std::collections::HashSet;
use std::path::Path;

use glyphscrub::NameMap;

use crate::cli::ReportFormat;
use crate::shared::load_terms;

pub fn run(
    map: Option<&str>,
    map_file: Option<&Path>,
    extra_redact: Option<&str>,
    format: &ReportFormat,
) -> Result<(), i32> {
    let (names, extras) = load_terms(map, map_file, extra_redact)?;
    let listing = variant_listing(&names);

    match format {
        ReportFormat::Text => {
            println!("Name mappings ({} variants):", names.variant_count());
            for (orig, repl) in &listing {
                println!("  '{orig}' -> '{repl}'");
            }
            if !extras.is_empty() {
                println!("Extra redact: {}", extras.join(", "));
            }
        }
        ReportFormat::Json => {
            let variants: Vec<_> = listing
                .iter()
                .map(|(orig, repl)| serde_json::json!({ "original": orig, "replacement": repl }))
                .collect();
            let report = serde_json::json!({
                "variant_count": names.variant_count(),
                "variants": variants,
                "extra_redact": extras,
            });
            let json_str = serde_json::to_string(&report).map_err(|e| {
                eprintln!("Error: failed to serialize terms: {e}");
                1
            })?;
            println!("{json_str}");
        }
    }
    Ok(())
}

/// All case variants, longest first then alphabetical, keeping one line per
/// distinct lowercase (original, replacement) pair.
pub fn variant_listing(names: &NameMap) -> Vec<(String, String)> {
    let mut all: Vec<(&str, &str)> = names
        .entries()
        .iter()
        .flat_map(|e| e.variants())
        .map(|v| (v.original.as_str(), v.replacement.as_str()))
        .collect();
    all.sort_by(|a, b| {
        b.0.chars()
            .count()
            .cmp(&a.0.chars().count())
            .then_with(|| a.0.cmp(b.0))
    });

    let mut seen = HashSet::new();
    all.into_iter()
        .filter(|(orig, repl)| seen.insert((orig.to_lowercase(), repl.to_lowercase())))
        .map(|(orig, repl)| (orig.to_string(), repl.to_string()))
        .collect()
}
