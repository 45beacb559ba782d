// streamguard/src/main.rs
//! StreamGuard entry point.
//!
//! Loads `.env`, parses the command line, sets up logging and the theme,
//! then hands off to the selected command.

use clap::Parser;
use std::process::ExitCode;

use streamguard::cli::Cli;
use streamguard::commands::{error_msg, warn_msg};
use streamguard::logger;
use streamguard::ui::theme::{build_theme_map, ThemeStyle};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logger::init_logger(logger::level_for_flags(cli.quiet, cli.debug));

    let theme = match build_theme_map(cli.theme.as_deref()) {
        Ok(theme) => theme,
        Err(e) => {
            let theme = ThemeStyle::default_theme_map();
            warn_msg(format!("{:#}; using the default theme.", e), &theme);
            theme
        }
    };

    match streamguard::run(cli, &theme).await {
        Ok(code) => code,
        Err(e) => {
            error_msg(format!("{:#}", e), &theme);
            ExitCode::FAILURE
        }
    }
}
