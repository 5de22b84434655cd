use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod alert;
mod commands;

#[derive(Parser)]
#[command(name = "physfocus", version, about = "PhysFocus study companion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive study session: timer, notes and doubt solver
    Study(commands::study::StudyArgs),
    /// Ask the doubt solver a single question
    Ask(commands::ask::AskArgs),
    /// Timer inspection
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Study(args) => commands::study::run(args).await,
        Commands::Ask(args) => commands::ask::run(args).await,
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
