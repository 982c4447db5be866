use clap::Parser;
use glide_bin::{
    cli::{Cli, Command},
    commands,
};
use glide_log::LogConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _log_guard = match glide_log::init(LogConfig {
        log_file_path: cli.log_file.clone(),
    }) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e}");
            None
        },
    };

    let result = match cli.command {
        Command::Replay(args) => commands::replay::handle(args, cli.config.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
