use bindle_cli::cli::{Cli, Command};
use bindle_cli::{commands, error, logger};
use clap::Parser;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let no_color = cli.no_color || !logger::should_use_colors();
    logger::init_logger(cli.verbose, cli.quiet, no_color);
    if no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let result = match cli.command {
        Command::Build(args) => commands::build::execute(args).await,
    };

    result.map_err(error::cli_error_to_miette)
}
