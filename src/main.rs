use clap::Parser;
use tradesim::cli::{run, Cli};
use tradesim::logging::init_logging;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level);
    run(cli)
}
