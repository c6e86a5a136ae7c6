mod cli;
mod redact_cmd;
mod shared;
mod terms_cmd;
mod tokens_cmd;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    shared::init_logging(cli.verbose);

    let result = match cli.command {
        cli::Commands::Redact {
            ref files,
            ref map,
            ref map_file,
            ref extra_redact,
            ref output_dir,
            scale,
            min_size,
            ref tokens,
            ref format,
        } => redact_cmd::run(&redact_cmd::RedactArgs {
            files,
            map: map.as_deref(),
            map_file: map_file.as_deref(),
            extra_redact: extra_redact.as_deref(),
            output_dir: output_dir.as_deref(),
            scale,
            min_size,
            tokens: tokens.as_deref(),
            format,
        }),
        cli::Commands::Tokens {
            ref file,
            scale,
            ref format,
        } => tokens_cmd::run(file, scale, format),
        cli::Commands::Terms {
            ref map,
            ref map_file,
            ref extra_redact,
            ref format,
        } => terms_cmd::run(
            map.as_deref(),
            map_file.as_deref(),
            extra_redact.as_deref(),
            format,
        ),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
