use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = appcred_watch::cli::Cli::parse();
    appcred_watch::util::logging::init(cli.verbose);
    cli.run()
}
