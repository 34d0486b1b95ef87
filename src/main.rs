use clap::Parser;
use dynalist2md::{Args, export_dynalist, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose, args.quiet)?;

    export_dynalist(&args).await?;

    Ok(())
}
