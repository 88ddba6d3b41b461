// crates/extract_code_segment/src/main.rs

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter};

use extract_code_segment::config::{build_cli, AppConfig};
use extract_code_segment::{extract_code_segments, ExtractionSummary};

fn main() {
    let matches = build_cli().get_matches();
    let config = AppConfig::from_matches(&matches).unwrap_or_else(|err| {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    });
    init_logging(config.verbose);
    log::debug!("{:?}", config);

    if let Err(err) = run(&config) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

/// `RUST_LOG` sets the filter (default `warn`); `--verbose` forces `debug`.
fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn run(config: &AppConfig) -> Result<ExtractionSummary> {
    match &config.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            extract_code_segments(config, &mut writer)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            extract_code_segments(config, &mut handle)
        }
    }
}
