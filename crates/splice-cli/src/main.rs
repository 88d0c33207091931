//! `yaml-splice`: render YAML templates whose scalars embed code

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use splice_core::{render, RenderOptions};
use splice_kernel::{KernelConfig, KernelGateway, SetupRegistry};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("yaml-splice")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Evaluate code markers embedded in YAML scalars and splice in the results")
        .long_about(
            "Each plain scalar of the form (<mode>[target] <code><mode>) is evaluated in a \
             session for its target.\n\n  (* code *)  run for effect, remove the node\n  \
             (@ code @)  merge the produced mapping or sequence into the enclosing one\n  \
             (! code !)  replace the node with the produced value",
        )
        .arg(
            Arg::new("files")
                .value_name("FILE")
                .required(true)
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf))
                .help("Templates to render, in order"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("YAML file with target definitions"),
        )
        .arg(
            Arg::new("default-target")
                .long("default-target")
                .short('t')
                .value_name("TARGET")
                .help("Target for markers that name none"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .default_value("warn")
                .value_parser(["error", "warn", "info", "debug", "trace"])
                .help("Log level when RUST_LOG is not set"),
        )
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<KernelConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => KernelConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => KernelConfig::default(),
    };
    if let Some(target) = matches.get_one::<String>("default-target") {
        config = config.with_default_target(target.clone());
    }
    Ok(config)
}

/// Render every file, writing each complete result before starting the next
fn render_files(
    files: &[PathBuf],
    gateway: &mut KernelGateway,
    options: &RenderOptions,
) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    for path in files {
        let input = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        tracing::info!(file = %path.display(), "rendering");

        let output = render(&input, &mut *gateway, options)
            .with_context(|| format!("rendering {}", path.display()))?;

        let mut out = stdout.lock();
        writeln!(out, "{output}")
            .and_then(|()| out.flush())
            .context("writing output")?;
    }
    Ok(())
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(matches)?;
    let options = RenderOptions::default().with_default_target(config.default_target.clone());
    let files: Vec<PathBuf> = matches
        .get_many::<PathBuf>("files")
        .into_iter()
        .flatten()
        .cloned()
        .collect();

    let mut gateway = KernelGateway::new(config, SetupRegistry::with_defaults());
    let result = render_files(&files, &mut gateway, &options);

    // sessions go down whether or not rendering succeeded
    let stats = gateway.stats();
    let shutdown = gateway.shutdown();
    tracing::info!(launched = stats.launched, reused = stats.reused, "sessions shut down");

    result?;
    shutdown.context("shutting down sessions")
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    let level = matches
        .get_one::<String>("log-level")
        .map_or("warn", String::as_str);
    init_tracing(level);

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("yaml-splice: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn parses_files_and_options() {
        let matches = cli()
            .try_get_matches_from(["yaml-splice", "-t", "sh", "a.yaml", "b.yaml"])
            .unwrap();
        let files: Vec<&PathBuf> = matches.get_many::<PathBuf>("files").unwrap().collect();
        assert_eq!(files, vec![&PathBuf::from("a.yaml"), &PathBuf::from("b.yaml")]);
        assert_eq!(load_config(&matches).unwrap().default_target, "sh");
    }

    #[test]
    fn requires_a_file() {
        assert!(cli().try_get_matches_from(["yaml-splice"]).is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        assert!(cli()
            .try_get_matches_from(["yaml-splice", "--log-level", "loud", "a.yaml"])
            .is_err());
    }
}
