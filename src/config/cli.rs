//! Command-line parsing

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use super::{BenchmarkConfig, OutputFormat};
use crate::{APP_NAME, DEFAULT_FILE};

#[derive(Parser, Debug)]
#[command(name = APP_NAME, version)]
#[command(about = "Time how long it takes to append into a file and fdatasync it.")]
#[command(
    long_about = "Time how long it takes to append into a file and fdatasync it.\n\
                  The results are printed in seconds total for all the writes."
)]
pub struct Cli {
    /// Number of sequential appends to measure
    #[arg(short, long, value_name = "NUM", default_value_t = 1000)]
    pub count: u64,

    /// Whether to use O_DIRECT
    #[arg(
        short,
        long,
        value_name = "yes|no",
        default_value = "no",
        value_parser = parse_yes_no,
        action = ArgAction::Set
    )]
    pub direct: bool,

    /// File to create/truncate and write into
    #[arg(short, long, value_name = "NAME", default_value = DEFAULT_FILE)]
    pub file: PathBuf,

    /// Number of bytes to skip at start of file
    #[arg(short, long, value_name = "BYTES", default_value_t = 0)]
    pub offset: u64,

    /// Number of bytes to append in each iteration
    #[arg(short, long, value_name = "BYTES", default_value_t = 1)]
    pub size: u64,

    /// How to print the result
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl Cli {
    pub fn into_config(self) -> BenchmarkConfig {
        BenchmarkConfig {
            count: self.count,
            direct: self.direct,
            file: self.file,
            offset: self.offset,
            size: self.size,
            format: self.format,
        }
    }
}

/// Only the literal `yes` turns direct I/O on.
fn parse_yes_no(value: &str) -> Result<bool, String> {
    Ok(value == "yes")
}

/// Parse an argument vector (program name first) into a configuration.
pub fn parse_args<I, T>(args: I) -> Result<BenchmarkConfig, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map(Cli::into_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_no_arguments_gives_defaults() {
        let config = parse_args(["syncbench"]).unwrap();
        assert_eq!(config, BenchmarkConfig::default());
    }

    #[test]
    fn test_long_options_with_equals() {
        let config = parse_args([
            "syncbench",
            "--count=10",
            "--direct=yes",
            "--file=/tmp/x.dat",
            "--offset=4096",
            "--size=512",
        ])
        .unwrap();
        assert_eq!(config.count, 10);
        assert!(config.direct);
        assert_eq!(config.file, PathBuf::from("/tmp/x.dat"));
        assert_eq!(config.offset, 4096);
        assert_eq!(config.size, 512);
    }

    #[test]
    fn test_short_options() {
        let config = parse_args(["syncbench", "-c", "3", "-s", "8", "-o", "16", "-f", "a.dat"]).unwrap();
        assert_eq!(config.count, 3);
        assert_eq!(config.size, 8);
        assert_eq!(config.offset, 16);
        assert_eq!(config.file, PathBuf::from("a.dat"));
    }

    #[test]
    fn test_direct_requires_literal_yes() {
        for value in ["no", "YES", "true", "1"] {
            let arg = format!("--direct={}", value);
            let config = parse_args(["syncbench", arg.as_str()]).unwrap();
            assert!(!config.direct, "{:?} must not enable direct I/O", value);
        }
    }

    #[test]
    fn test_format_option() {
        let config = parse_args(["syncbench", "--format=json"]).unwrap();
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_help_is_reported_as_help() {
        let err = parse_args(["syncbench", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(err.to_string().contains("--count"));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = parse_args(["syncbench", "--bogus"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_non_numeric_count_is_rejected() {
        let err = parse_args(["syncbench", "--count=lots"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        assert!(parse_args(["syncbench", "--size=-1"]).is_err());
        assert!(parse_args(["syncbench", "--offset=1k"]).is_err());
    }

    #[test]
    fn test_missing_value_is_rejected() {
        assert!(parse_args(["syncbench", "--count"]).is_err());
    }
}
