use nominator_wallet::cli::Cli;
use nominator_wallet::utils::init_logger;


fn main() -> anyhow::Result<()> {
    init_logger()?;
    let cli = Cli::parse_args();
    cli.execute()?;
    Ok(())
}
