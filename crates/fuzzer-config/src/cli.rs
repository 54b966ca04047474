use std::path::PathBuf;

use clap::Parser;

/// Ethereum consensus fuzzer.
///
/// Flags mirror the `statetests.ini`-driven Python original one-to-one
/// (spec §6 "CLI surface"); any flag set here overrides the corresponding
/// INI key for the active profile.
#[derive(Parser, Debug, Clone)]
#[command(name = "fuzzer", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "configfile")]
    pub configfile: PathBuf,

    /// Log verbosity: critical, error, warn, info, debug, trace.
    #[arg(short = 'v', long = "verbosity", default_value = "info")]
    pub verbosity: String,

    /// Simulate and print test generation instead of running it against
    /// the container backend.
    #[arg(short = 'D', long = "dry-run")]
    pub dry_run: bool,

    /// Benchmark test generation instead of executing tests.
    #[arg(short = 'B', long = "benchmark")]
    pub benchmark: bool,

    /// Keep tracefiles/logs/testfiles for non-failing testcases.
    #[arg(short = 'x', long = "force-save")]
    pub force_save: bool,

    /// Emit per-test statistics log lines.
    #[arg(short = 'r', long = "enable-reporting")]
    pub enable_reporting: bool,

    /// Remove the named image(s) before starting the fuzzer, to force a
    /// fresh pull. May be repeated.
    #[arg(short = 'y', long = "docker-force-update-image")]
    pub docker_force_update_image: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_image_flag_collects_into_vec() {
        let args = CliArgs::parse_from([
            "fuzzer",
            "-c",
            "statetests.ini",
            "-y",
            "geth",
            "-y",
            "parity",
        ]);
        assert_eq!(args.docker_force_update_image, vec!["geth", "parity"]);
    }

    #[test]
    fn boolean_flags_default_false() {
        let args = CliArgs::parse_from(["fuzzer", "-c", "statetests.ini"]);
        assert!(!args.force_save);
        assert!(!args.enable_reporting);
        assert!(!args.dry_run);
        assert!(!args.benchmark);
    }
}
