//! Merging file configuration under CLI arguments and deriving runtime settings.

use anyhow::Result;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches};

use pdfdl_core::{CrawlConfig, FetcherConfig, default_user_agent};

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::Args;

/// Which arguments were given explicitly on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) output_dir: bool,
    pub(crate) user_agent: bool,
    pub(crate) overwrite: bool,
    pub(crate) max_depth: bool,
    pub(crate) connect_timeout: bool,
    pub(crate) read_timeout: bool,
    pub(crate) no_ojs_shortcut: bool,
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

pub(crate) fn parse_cli_with_sources() -> (Args, CliValueSources) {
    let matches = Args::command().get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    let sources = sources_from_matches(&matches);
    (args, sources)
}

fn sources_from_matches(matches: &ArgMatches) -> CliValueSources {
    CliValueSources {
        output_dir: is_commandline_value(matches, "output_dir"),
        user_agent: is_commandline_value(matches, "user_agent"),
        overwrite: is_commandline_value(matches, "overwrite"),
        max_depth: is_commandline_value(matches, "max_depth"),
        connect_timeout: is_commandline_value(matches, "connect_timeout"),
        read_timeout: is_commandline_value(matches, "read_timeout"),
        no_ojs_shortcut: is_commandline_value(matches, "no_ojs_shortcut"),
        verbose: is_commandline_value(matches, "verbose"),
        quiet: is_commandline_value(matches, "quiet"),
    }
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Fills every argument not given on the command line from `file_config`.
pub(crate) fn apply_config_defaults(
    mut args: Args,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> Result<Args> {
    let Some(file_config) = file_config else {
        return Ok(args);
    };

    if !cli_sources.output_dir
        && let Some(output_dir) = &file_config.output_dir
    {
        args.output_dir = output_dir.clone();
    }

    if !cli_sources.user_agent
        && let Some(user_agent) = &file_config.user_agent
    {
        args.user_agent = Some(user_agent.clone());
    }

    if !cli_sources.overwrite
        && let Some(overwrite) = file_config.overwrite
    {
        args.overwrite = overwrite;
    }

    if !cli_sources.max_depth
        && let Some(max_depth) = file_config.max_depth
    {
        args.max_depth = Some(max_depth);
    }

    if !cli_sources.connect_timeout
        && let Some(secs) = file_config.connect_timeout_secs
    {
        args.connect_timeout = secs;
    }

    if !cli_sources.read_timeout
        && let Some(secs) = file_config.read_timeout_secs
    {
        args.read_timeout = secs;
    }

    if !cli_sources.no_ojs_shortcut
        && let Some(ojs_shortcut) = file_config.ojs_shortcut
    {
        args.no_ojs_shortcut = !ojs_shortcut;
    }

    if !cli_sources.verbose
        && !cli_sources.quiet
        && let Some(verbosity) = file_config.verbosity
    {
        apply_config_verbosity(&mut args, verbosity);
    }

    Ok(args)
}

fn apply_config_verbosity(args: &mut Args, verbosity: VerbositySetting) {
    let (quiet, verbose) = match verbosity {
        VerbositySetting::Default => (false, 0),
        VerbositySetting::Verbose => (false, 1),
        VerbositySetting::Debug => (false, 2),
        VerbositySetting::Quiet => (true, 0),
    };
    args.quiet = quiet;
    args.verbose = verbose;
}

pub(crate) fn resolve_default_log_level(args: &Args) -> &'static str {
    if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn should_force_cli_log_level(cli_sources: &CliValueSources) -> bool {
    cli_sources.verbose || cli_sources.quiet
}

pub(crate) fn fetcher_config(args: &Args) -> FetcherConfig {
    FetcherConfig {
        user_agent: args.user_agent.clone().unwrap_or_else(default_user_agent),
        connect_timeout_secs: args.connect_timeout,
        read_timeout_secs: args.read_timeout,
        ..FetcherConfig::default()
    }
}

pub(crate) fn crawl_config(args: &Args) -> CrawlConfig {
    CrawlConfig {
        max_depth: args.max_depth,
        ojs_shortcut: !args.no_ojs_shortcut,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn parse(argv: &[&str]) -> (Args, CliValueSources) {
        let matches = Args::command().try_get_matches_from(argv).unwrap();
        let args = Args::from_arg_matches(&matches).unwrap();
        (args, sources_from_matches(&matches))
    }

    fn file_config() -> FileConfig {
        FileConfig {
            output_dir: Some(PathBuf::from("/from/config")),
            user_agent: Some("ConfigBot/1.0".into()),
            overwrite: Some(true),
            max_depth: Some(4),
            connect_timeout_secs: Some(5),
            read_timeout_secs: Some(60),
            ojs_shortcut: Some(false),
            verbosity: Some(VerbositySetting::Quiet),
        }
    }

    #[test]
    fn test_no_config_keeps_cli_values() {
        let (args, sources) = parse(&["pdfdl", "https://j.example/"]);
        let merged = apply_config_defaults(args.clone(), &sources, None).unwrap();
        assert_eq!(merged.output_dir, args.output_dir);
        assert_eq!(merged.max_depth, None);
    }

    #[test]
    fn test_config_fills_unset_values() {
        let (args, sources) = parse(&["pdfdl"]);
        let merged = apply_config_defaults(args, &sources, Some(&file_config())).unwrap();
        assert_eq!(merged.output_dir, PathBuf::from("/from/config"));
        assert_eq!(merged.user_agent.as_deref(), Some("ConfigBot/1.0"));
        assert!(merged.overwrite);
        assert_eq!(merged.max_depth, Some(4));
        assert_eq!(merged.connect_timeout, 5);
        assert_eq!(merged.read_timeout, 60);
        assert!(merged.no_ojs_shortcut);
        assert!(merged.quiet);
    }

    #[test]
    fn test_cli_values_win_over_config() {
        let (args, sources) = parse(&[
            "pdfdl",
            "-o",
            "cli-dir",
            "--user-agent",
            "CliBot/1.0",
            "--max-depth",
            "1",
            "--read-timeout",
            "30",
            "-v",
        ]);
        let merged = apply_config_defaults(args, &sources, Some(&file_config())).unwrap();
        assert_eq!(merged.output_dir, PathBuf::from("cli-dir"));
        assert_eq!(merged.user_agent.as_deref(), Some("CliBot/1.0"));
        assert_eq!(merged.max_depth, Some(1));
        assert_eq!(merged.read_timeout, 30);
        assert_eq!(merged.connect_timeout, 5, "not given on the CLI");
        assert!(!merged.quiet);
        assert_eq!(merged.verbose, 1);
    }

    #[test]
    fn test_default_valued_output_dir_is_not_a_cli_source() {
        let (_, sources) = parse(&["pdfdl"]);
        assert!(!sources.output_dir);
        let (_, sources) = parse(&["pdfdl", "-o", "."]);
        assert!(sources.output_dir);
    }

    #[test]
    fn test_log_level_from_flags() {
        let (args, _) = parse(&["pdfdl"]);
        assert_eq!(resolve_default_log_level(&args), "info");
        let (args, _) = parse(&["pdfdl", "-v"]);
        assert_eq!(resolve_default_log_level(&args), "debug");
        let (args, _) = parse(&["pdfdl", "-vvv"]);
        assert_eq!(resolve_default_log_level(&args), "trace");
        let (args, _) = parse(&["pdfdl", "-q"]);
        assert_eq!(resolve_default_log_level(&args), "error");
    }

    #[test]
    fn test_force_cli_log_level_only_when_flag_given() {
        let (_, sources) = parse(&["pdfdl"]);
        assert!(!should_force_cli_log_level(&sources));
        let (_, sources) = parse(&["pdfdl", "-q"]);
        assert!(should_force_cli_log_level(&sources));
    }

    #[test]
    fn test_fetcher_config_uses_default_user_agent() {
        let (args, _) = parse(&["pdfdl", "--connect-timeout", "7"]);
        let config = fetcher_config(&args);
        assert_eq!(config.user_agent, default_user_agent());
        assert_eq!(config.connect_timeout_secs, 7);
        assert_eq!(config.read_timeout_secs, 300);
    }

    #[test]
    fn test_crawl_config_from_args() {
        let (args, _) = parse(&["pdfdl", "--no-ojs-shortcut", "--max-depth", "2"]);
        let config = crawl_config(&args);
        assert!(!config.ojs_shortcut);
        assert_eq!(config.max_depth, Some(2));
    }
}
