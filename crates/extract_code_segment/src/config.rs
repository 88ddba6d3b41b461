// crates/extract_code_segment/src/config.rs

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use segment_marker::{MarkerSyntax, END_SEGMENT, START_SEGMENT};

pub const START_MARKER_ENV: &str = "EXTRACT_SEGMENT_START_MARKER";
pub const END_MARKER_ENV: &str = "EXTRACT_SEGMENT_END_MARKER";
pub const EMIT_POLICY_ENV: &str = "EXTRACT_SEGMENT_EMIT";

/// Extensions picked up when a directory is given as input.
pub const DEFAULT_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx", "h", "hh", "hpp", "hxx", "m", "mm"];

/// When extracted segments are written out during a scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EmitPolicy {
    /// Write every closed segment once, after all documents are scanned.
    #[default]
    EndOfScan,
    /// Write the segments closed in each document right after scanning it.
    PerDocument,
}

impl EmitPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            EmitPolicy::EndOfScan => "end-of-scan",
            EmitPolicy::PerDocument => "per-document",
        }
    }
}

impl FromStr for EmitPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "end-of-scan" => Ok(EmitPolicy::EndOfScan),
            "per-document" => Ok(EmitPolicy::PerDocument),
            other => Err(anyhow!(
                "Unknown emit policy '{}' (expected 'end-of-scan' or 'per-document')",
                other
            )),
        }
    }
}

impl fmt::Display for EmitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Document name on its own line, then the segment text verbatim.
    #[default]
    Text,
    /// One `name:start-end` line per segment.
    Ranges,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "text" => Ok(OutputFormat::Text),
            "ranges" => Ok(OutputFormat::Ranges),
            other => Err(anyhow!("Unknown format '{}' (expected 'text' or 'ranges')", other)),
        }
    }
}

/// Runtime configuration composed from CLI + environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Files or directories to scan; `-` reads stdin.
    pub inputs: Vec<PathBuf>,
    /// Extensions accepted while walking directories.
    pub extensions: Vec<String>,
    pub start_marker: String,
    pub end_marker: String,
    pub emit_policy: EmitPolicy,
    pub format: OutputFormat,
    /// Write here instead of stdout.
    pub output: Option<PathBuf>,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            start_marker: START_SEGMENT.to_string(),
            end_marker: END_SEGMENT.to_string(),
            emit_policy: EmitPolicy::default(),
            format: OutputFormat::default(),
            output: None,
            verbose: false,
        }
    }
}

/// Builds the command-line interface of `extract_code_segment`.
pub fn build_cli() -> Command {
    Command::new("extract_code_segment")
        .version("0.1.0")
        .about("Extracts the code segments wrapped by #pragma start_segment / #pragma end_segment")
        .arg(
            Arg::new("inputs")
                .value_name("PATH")
                .num_args(1..)
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Source files or directories to scan ('-' reads stdin)"),
        )
        .arg(
            Arg::new("ext")
                .long("ext")
                .action(ArgAction::Append)
                .help("File extension to include when walking directories (repeatable)"),
        )
        .arg(
            Arg::new("start_marker")
                .long("start-marker")
                .num_args(1)
                .help("Pragma name that opens a segment [default: start_segment]"),
        )
        .arg(
            Arg::new("end_marker")
                .long("end-marker")
                .num_args(1)
                .help("Pragma name that closes a segment [default: end_segment]"),
        )
        .arg(
            Arg::new("emit")
                .long("emit")
                .num_args(1)
                .value_parser(["end-of-scan", "per-document"])
                .help("When segments are written [default: end-of-scan]"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .num_args(1)
                .value_parser(["text", "ranges"])
                .default_value("text")
                .help("Output format"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .num_args(1)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Write segments to this file instead of stdout"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue),
        )
}

impl AppConfig {
    /// Merges parsed arguments with the environment. A flag given on the
    /// command line wins over its environment variable.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let mut config = AppConfig::default();

        config.inputs = matches
            .get_many::<PathBuf>("inputs")
            .unwrap_or_default()
            .cloned()
            .collect();

        let extensions: Vec<String> = matches
            .get_many::<String>("ext")
            .unwrap_or_default()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect();
        if !extensions.is_empty() {
            config.extensions = extensions;
        }

        if let Some(start) = setting(matches, "start_marker", START_MARKER_ENV) {
            config.start_marker = start;
        }
        if let Some(end) = setting(matches, "end_marker", END_MARKER_ENV) {
            config.end_marker = end;
        }
        if let Some(policy) = setting(matches, "emit", EMIT_POLICY_ENV) {
            config.emit_policy = policy.parse()?;
        }
        if let Some(format) = matches.get_one::<String>("format") {
            config.format = format.parse()?;
        }

        config.output = matches.get_one::<PathBuf>("output").cloned();
        config.verbose = matches.get_flag("verbose");
        Ok(config)
    }

    /// Validates the marker names and builds the scanner syntax for them.
    pub fn marker_syntax(&self) -> Result<MarkerSyntax> {
        MarkerSyntax::new(&self.start_marker, &self.end_marker)
            .context("Invalid --start-marker/--end-marker configuration")
    }
}

fn setting(matches: &ArgMatches, id: &str, env_key: &str) -> Option<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .or_else(|| env::var(env_key).ok().filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AppConfig {
        let matches = build_cli()
            .try_get_matches_from(args)
            .expect("arguments should parse");
        AppConfig::from_matches(&matches).expect("config should build")
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["extract_code_segment", "main.c"]);
        assert_eq!(config.inputs, vec![PathBuf::from("main.c")]);
        assert_eq!(config.start_marker, START_SEGMENT);
        assert_eq!(config.end_marker, END_SEGMENT);
        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.extensions.contains(&"cpp".to_string()));
        assert!(config.output.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_flags() {
        let config = parse(&[
            "extract_code_segment",
            "a.c",
            "src",
            "--ext",
            ".inc",
            "--ext",
            "c",
            "--start-marker",
            "begin",
            "--end-marker",
            "finish",
            "--emit",
            "per-document",
            "--format",
            "ranges",
            "-o",
            "out.txt",
            "--verbose",
        ]);
        assert_eq!(config.inputs.len(), 2);
        assert_eq!(config.extensions, vec!["inc".to_string(), "c".to_string()]);
        assert_eq!(config.start_marker, "begin");
        assert_eq!(config.end_marker, "finish");
        assert_eq!(config.emit_policy, EmitPolicy::PerDocument);
        assert_eq!(config.format, OutputFormat::Ranges);
        assert_eq!(config.output, Some(PathBuf::from("out.txt")));
        assert!(config.verbose);
    }

    #[test]
    fn test_missing_inputs_is_rejected() {
        assert!(build_cli().try_get_matches_from(["extract_code_segment"]).is_err());
    }

    #[test]
    fn test_emit_policy_parsing() {
        assert_eq!("end-of-scan".parse::<EmitPolicy>().unwrap(), EmitPolicy::EndOfScan);
        assert_eq!(" per-document ".parse::<EmitPolicy>().unwrap(), EmitPolicy::PerDocument);
        assert!("per-unit".parse::<EmitPolicy>().is_err());
        assert_eq!(EmitPolicy::PerDocument.to_string(), "per-document");
    }

    #[test]
    fn test_marker_syntax_validation() {
        let mut config = AppConfig::default();
        assert!(config.marker_syntax().is_ok());

        config.end_marker = config.start_marker.clone();
        assert!(config.marker_syntax().is_err());

        config.end_marker = "end segment".to_string();
        assert!(config.marker_syntax().is_err());

        config.end_marker = String::new();
        assert!(config.marker_syntax().is_err());

        // Names that are not identifiers could never match a pragma line.
        config.start_marker = "seg+".to_string();
        config.end_marker = "seg-".to_string();
        let err = config.marker_syntax().unwrap_err();
        assert!(format!("{:#}", err).contains("invalid directive name 'seg+'"));
    }
}
