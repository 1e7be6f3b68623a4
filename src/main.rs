use adb_bridge::cli::Cli;
use adb_bridge::commands::runner::CommandRunner;
use adb_bridge::output::OutputFormatter;
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    let result = match CommandRunner::from_cli(&cli) {
        Ok(runner) => runner.run(cli.command()).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::new(cli.output.into()).error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
