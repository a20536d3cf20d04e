use std::{error::Error, process, sync::Arc};

use clap::{command, Parser, ValueHint};
use log::{debug, error, info, warn, LevelFilter};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

use gmusic_remote::{
    cache::FileCache,
    command::Command,
    config::{self, Config},
    host::Terminal,
    remote::{self, Exit},
    signal,
};

/// Profile to display when not built in release mode.
#[cfg(debug_assertions)]
const BUILD_PROFILE: &str = "debug";
/// Profile to display when not built release mode.
#[cfg(not(debug_assertions))]
const BUILD_PROFILE: &str = "release";

/// Group name for mutually exclusive logging options.
const ARGS_GROUP_LOGGING: &str = "logging";

/// Command line arguments as parsed by `clap`.
#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Player endpoint
    ///
    /// The websocket address of the Google Play Music Desktop Player JSON
    /// API. The API must be enabled in the player's settings.
    #[arg(long, value_name = "URL", value_hint = ValueHint::Url, env = "GMUSIC_REMOTE_URL", default_value_t = String::from(config::DEFAULT_URL))]
    url: String,

    /// Application identifier
    ///
    /// The name this remote presents when pairing. Changing it requires
    /// pairing again.
    #[arg(long, value_name = "NAME", default_value_t = String::from(config::DEFAULT_APP_ID))]
    app_id: String,

    /// Token cache file
    ///
    /// Ensure that this file is kept private, as it contains the token
    /// that grants control over the player.
    ///
    /// [default: gmusic-remote/cache.toml in the user cache directory]
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath, env = "GMUSIC_REMOTE_CACHE")]
    cache_file: Option<String>,

    /// Suppresses all output except warnings and errors.
    #[arg(short, long, default_value_t = false, group = ARGS_GROUP_LOGGING)]
    quiet: bool,

    /// Enable verbose logging
    ///
    /// Specify twice for trace logging.
    #[arg(short, long, action = clap::ArgAction::Count, group = ARGS_GROUP_LOGGING)]
    verbose: u8,
}

/// Initializes the logger facade.
///
/// The logging level is determined as follows, in order of precedence from
/// highest to lowest:
/// 1. Command line arguments
/// 2. `RUST_LOG` environment variable
/// 3. Hard coded default
///
/// # Panics
///
/// Panics when a logger facade is already initialized.
fn init_logger(config: &Args) {
    let mut logger = env_logger::Builder::from_env(
        // Note: if you change the default logging level here, then you should
        // probably also change the verbosity levels below.
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    if config.quiet || config.verbose > 0 {
        let level = match config.verbose {
            0 => {
                // Quiet and verbose are mutually exclusive, and `verbose` is 0
                // by default. So this arm means: quiet mode.
                LevelFilter::Warn
            }
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        // Filter log messages of external crates.
        logger.filter_module(module_path!(), level);
    }

    logger.init();
}

/// Prints the commands understood on standard input.
fn print_help() {
    println!("commands:");
    for (words, description) in Command::USAGE {
        println!("  {words:<26} {description}");
    }
}

/// Reads standard input line by line.
///
/// Lines answer a waiting prompt first; otherwise they are parsed as
/// commands. End of input quits.
async fn read_input(terminal: Terminal, commands: mpsc::Sender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("error reading input: {e}");
                break;
            }
        };

        let Some(line) = terminal.feed(&line) else {
            continue;
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => {
                if commands.send(command).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!("{e}; enter `help` for a list of commands"),
        }
    }

    debug!("end of input");
    let _ = commands.send(Command::Quit).await;
}

/// Waits while disconnected.
///
/// Returns `true` when the user asks for a restart, `false` to quit.
async fn wait_for_restart(
    commands: &mut mpsc::Receiver<Command>,
    signals: &mut signal::Handler,
) -> bool {
    info!("not connected; enter `restart` to reconnect");

    loop {
        tokio::select! {
            signal = signals.recv() => {
                info!("received {signal}");
                return signal.is_restart();
            }

            command = commands.recv() => {
                match command {
                    Some(Command::Restart) => return true,
                    Some(Command::Quit) | None => return false,
                    Some(command) => warn!("not connected, ignoring {command}"),
                }
            }
        }
    }
}

/// Main application loop.
///
/// # Errors
///
/// This function returns an error when the configuration is invalid or the
/// token cache cannot be opened. Connection failures are reported and wait
/// for the user to restart.
async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = Config::new()?;
    config.url = args.url.parse()?;
    config.app_id = args.app_id;
    if let Some(cache_file) = args.cache_file {
        config.cache_file = cache_file.into();
    }

    let cache = Arc::new(FileCache::open(&config.cache_file)?);
    debug!("auth token cache: {}", cache.path().display());
    let terminal = Terminal::new();
    let mut client = remote::Client::new(&config, Arc::new(terminal.clone()), cache)?;

    let (commands_tx, mut commands) = mpsc::channel(16);
    tokio::spawn(read_input(terminal, commands_tx));

    let mut signals = signal::Handler::new()?;

    // Main application loop. Sessions are replaced on request; there is no
    // automatic reconnection when the player goes away.
    loop {
        let exit = tokio::select! {
            // Prioritize shutdown signals.
            biased;

            signal = signals.recv() => {
                if signal.is_restart() {
                    info!("received {signal}, restarting session");
                    continue;
                }

                info!("received {signal}, shutting down gracefully");
                break Ok(());
            }

            result = client.start(&mut commands) => result,
        };

        match exit {
            Ok(Exit::Restart) => info!("restarting session"),
            Ok(Exit::Quit) => break Ok(()),
            Ok(Exit::Closed) => {
                if !wait_for_restart(&mut commands, &mut signals).await {
                    break Ok(());
                }
            }
            Err(e) => {
                error!("{e}");
                if !wait_for_restart(&mut commands, &mut signals).await {
                    break Ok(());
                }
            }
        }
    }
}

/// Main entry point of the application.
///
/// This function initializes the logger facade, parses the command line
/// arguments, and starts the main application loop.
#[tokio::main]
async fn main() {
    // `clap` handles our command line arguments and help text.
    let args = Args::parse();
    init_logger(&args);

    // Dump command line arguments before we do anything more.
    // This aids in debugging of whatever comes next.
    debug!("Command {:#?}", args);

    let cmd = command!();
    let name = cmd.get_name().to_string();
    let version = cmd.get_version().unwrap_or("UNKNOWN").to_string();

    info!("starting {name}/{version}; {BUILD_PROFILE}");
    info!("enter `help` for a list of commands");

    if let Err(e) = run(args).await {
        error!("{e}");
        process::exit(1);
    }
}
