//! Order service CLI entry point.

use clap::Parser;

use order_service::cli::{commands, handle_error, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::execute(&cli).await,
        Commands::Config => commands::config::execute(&cli),
    };

    if let Err(err) = result {
        handle_error(&err, cli.json);
        std::process::exit(1);
    }
}
