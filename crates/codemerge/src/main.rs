use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = codemerge::cli::Cli::parse();
    codemerge::init(cli.verbose, cli.quiet);

    codemerge::cli::run(cli)
}
