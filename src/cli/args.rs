//! Command-line argument parsing for pisum
//!
//! Provides clap-based CLI with run overrides and verbosity control.

use crate::arithmetic::Precision;
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

/// pisum - Approximate pi with a parallel remote Leibniz series
#[derive(Parser, Debug)]
#[command(name = "pisum")]
#[command(version)]
#[command(about = "Approximate pi by summing Leibniz series ranges on a remote service", long_about = None)]
pub struct Args {
    /// Number of correct decimal digits to compute (default 5)
    #[arg(value_name = "DIGITS", allow_negative_numbers = true)]
    pub digits: Option<String>,

    /// Compute service host
    #[arg(long)]
    pub host: Option<String>,

    /// Compute service port
    #[arg(long)]
    pub port: Option<u16>,

    /// Terms evaluated per iteration
    #[arg(long)]
    pub step_size: Option<u64>,

    /// Parallel sub-ranges per iteration
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Give up after this many iterations
    #[arg(long)]
    pub max_iterations: Option<u64>,

    /// Tail correction policy: magnitude (default) or alternating
    #[arg(long)]
    pub tail_correction: Option<String>,

    /// Evaluate partial sums in-process instead of calling the service
    #[arg(long)]
    pub local: bool,

    /// Print a JSON run summary instead of the result banner
    #[arg(long)]
    pub json: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress all output except final result)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Requested digits, falling back to `default` when absent or malformed
    ///
    /// A malformed value is logged, never fatal.
    pub fn resolve_digits(&self, default: u32) -> u32 {
        match self.digits.as_deref() {
            None => default,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(digits) => digits,
                Err(e) => {
                    warn!(value = raw, error = %e, default, "invalid digit count, using default");
                    default
                }
            },
        }
    }

    /// Requested precision with the built-in default
    pub fn precision(&self) -> Precision {
        Precision::new(self.resolve_digits(Precision::DEFAULT_DIGITS))
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Parse the config-file spelling
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "quiet" => Some(Verbosity::Quiet),
            "normal" => Some(Verbosity::Normal),
            "verbose" => Some(Verbosity::Verbose),
            "very_verbose" => Some(Verbosity::VeryVerbose),
            _ => None,
        }
    }

    /// Check if per-iteration lines should be printed
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show detailed events
    pub fn show_events(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }

    /// Default `tracing` directive for this level
    pub fn log_directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "pisum=error",
            Verbosity::Normal => "pisum=info",
            Verbosity::Verbose => "pisum=debug",
            Verbosity::VeryVerbose => "pisum=trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("pisum").chain(argv.iter().copied()))
    }

    #[test]
    fn test_default_digits() {
        let args = parse(&[]);
        assert_eq!(args.resolve_digits(5), 5);
        assert_eq!(args.precision().digits(), 5);
    }

    #[test]
    fn test_explicit_digits() {
        let args = parse(&["8"]);
        assert_eq!(args.resolve_digits(5), 8);
    }

    #[test]
    fn test_malformed_digits_fall_back() {
        assert_eq!(parse(&["abc"]).resolve_digits(5), 5);
        assert_eq!(parse(&["-3"]).resolve_digits(5), 5);
        assert_eq!(parse(&["2.5"]).resolve_digits(7), 7);
    }

    #[test]
    fn test_overrides() {
        let args = parse(&[
            "3",
            "--host",
            "compute.local",
            "--port",
            "9090",
            "--step-size",
            "1000",
            "-w",
            "4",
            "--local",
            "--json",
        ]);
        assert_eq!(args.host.as_deref(), Some("compute.local"));
        assert_eq!(args.port, Some(9090));
        assert_eq!(args.step_size, Some(1000));
        assert_eq!(args.workers, Some(4));
        assert!(args.local);
        assert!(args.json);
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["-q"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&[]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["-v"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["-vv"]).verbosity(), Verbosity::VeryVerbose);
    }

    #[test]
    fn test_verbosity_methods() {
        assert!(!Verbosity::Quiet.show_progress());
        assert!(Verbosity::Normal.show_progress());

        assert!(!Verbosity::Normal.show_events());
        assert!(Verbosity::Verbose.show_events());

        assert_eq!(Verbosity::Normal.log_directive(), "pisum=info");
        assert_eq!(Verbosity::from_name("verbose"), Some(Verbosity::Verbose));
        assert_eq!(Verbosity::from_name(Verbosity::Quiet.as_str()), Some(Verbosity::Quiet));
        assert!(Verbosity::from_name("loud").is_none());
    }
}
