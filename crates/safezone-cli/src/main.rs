use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod console;

#[derive(Parser)]
#[command(name = "safezone", version, about = "SafeZone emergency alert CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emergency contact management
    Contact {
        #[command(subcommand)]
        action: commands::contact::ContactAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Send an alert now and call after the countdown (Ctrl-C cancels)
    Trigger(commands::trigger::TriggerArgs),
    /// Feed stdin lines to the distress detector
    Listen(commands::listen::ListenArgs),
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SAFEZONE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Contact { action } => commands::contact::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Trigger(args) => commands::trigger::run(args),
        Commands::Listen(args) => commands::listen::run(args),
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
