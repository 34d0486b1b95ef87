use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Installs the global stderr subscriber.
pub fn init(verbose: bool, quiet: bool) -> anyhow::Result<()> {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
