use clap::Parser;
use log::{error, info};

use mediascribe::{Args, BatchOrchestrator, ConfigError, ConfigFile, RunConfig, SUPPORTED_EXTENSIONS};

fn init_logging(verbose: bool) {
    // RUST_LOG wins over the defaults
    let default_filter = if verbose { "mediascribe=debug,info" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.filetypes {
        println!("Supported file types:");
        for extension in SUPPORTED_EXTENSIONS {
            println!("  .{}", extension);
        }
        return Ok(());
    }

    let file = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let invocation = RunConfig::merge(&args, &file)?;
    init_logging(invocation.config.verbose);

    let Some(input) = invocation.input else {
        error!("{}", ConfigError::MissingFiles);
        return Err(ConfigError::MissingFiles.into());
    };

    info!("mediascribe {} starting", env!("CARGO_PKG_VERSION"));
    let orchestrator = BatchOrchestrator::new(invocation.config)?;

    let summary = match orchestrator.run(&input).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    println!("{}", summary);
    let code = summary.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
