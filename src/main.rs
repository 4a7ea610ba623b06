use anyhow::Context;
use mfatext::config::{EditorConfig, APP_NAME};
use mfatext::file::{expand_path, xdg};
use mfatext::{error, logging, BufferFactory, ConsoleApplication};
use std::path::PathBuf;

const USAGE: &str = "\
Usage: mfatext [OPTIONS] [FILE]

Options:
  --config <PATH>   read configuration from PATH
  -h, --help        print this help
  -V, --version     print the version";

enum Command {
    Run {
        config: Option<PathBuf>,
        file: Option<String>,
    },
    Help,
    Version,
}

fn main() -> anyhow::Result<()> {
    error::setup_panic_handler();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_args(&args)? {
        Command::Help => println!("{}", USAGE),
        Command::Version => println!("mfatext {}", env!("CARGO_PKG_VERSION")),
        Command::Run { config, file } => run(config, file)?,
    }
    Ok(())
}

fn run(config_path: Option<PathBuf>, file: Option<String>) -> anyhow::Result<()> {
    let config = match &config_path {
        Some(path) => EditorConfig::load_from(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => EditorConfig::load_default().context("failed to load configuration")?,
    };
    logging::init(&config.logging);

    if let Err(e) = xdg::ensure_directories_exist(APP_NAME) {
        log::warn!("Could not create application directories: {}", e);
    }

    let path = file
        .map(|raw| expand_path(&raw))
        .transpose()
        .context("invalid file argument")?;

    println!("mfatext {} (:help for commands)", env!("CARGO_PKG_VERSION"));

    let factory = BufferFactory::from_config(&config);
    let mut app = ConsoleApplication::new(std::io::stdout(), config, factory)?;
    app.start(path.as_deref());

    let stdin = std::io::stdin();
    app.run(stdin.lock())?;
    Ok(())
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut config = None;
    let mut file = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "--config" => {
                let value = iter.next().context("--config requires a path")?;
                config = Some(expand_path(value)?);
            }
            other if other.starts_with('-') => {
                anyhow::bail!("unknown option {}\n\n{}", other, USAGE)
            }
            other => {
                if file.is_some() {
                    anyhow::bail!("only one file can be opened\n\n{}", USAGE);
                }
                file = Some(other.to_string());
            }
        }
    }

    Ok(Command::Run { config, file })
}
