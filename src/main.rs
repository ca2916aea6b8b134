use clap::Parser;
use colored::Colorize;

use contentops::cli::args::{Cli, Commands};
use contentops::cli::commands::{self, Services};
use contentops::config::{ColorSetting, Config, Paths};
use contentops::error::ContentOpsError;
use contentops::logging;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ContentOpsError> {
    let cli = Cli::parse();
    let paths = Paths::new()?;
    let config = Config::load(&paths)?;

    logging::init(&config.logging)?;

    match config.general.color {
        ColorSetting::Always => colored::control::set_override(true),
        ColorSetting::Never => colored::control::set_override(false),
        ColorSetting::Auto => {}
    }

    let format = cli.output.unwrap_or(config.general.default_output);
    let services = || Services::open(&paths, &config);

    let output = match cli.command {
        Commands::Rules(args) => commands::rules(&services()?.rules, args.command, format)?,
        Commands::Templates(args) => {
            commands::templates(&services()?.templates, args.command, format)?
        }
        Commands::Trigger(args) => {
            commands::trigger(&services()?.engine, args.command, format).await?
        }
        Commands::Scheduler(args) => {
            commands::scheduler(services()?.engine, &config, args.command).await?
        }
        Commands::Posts(args) => commands::posts(&services()?.posts, args.command, format)?,
        Commands::Newsletters(args) => {
            commands::newsletters(&services()?.newsletters, args.command, format)?
        }
        Commands::Config(args) => commands::config(&paths, &config, args.command, format)?,
        Commands::Completions { shell } => commands::completions(shell)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
