use anyhow::Result;
use clap::Parser;
use poststrat::{config::DEFAULT_CSV_NAME, pipeline, Config};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Cleaning script for the IPUMS data set.
///
/// The extract should follow the variable selection described in the README
/// (PERWT, SEX, AGE, RACE, HISPAN, STATEICP); other extracts are rejected or
/// cleaned unpredictably.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Relative or full path for the IPUMS data set
    #[arg(long)]
    data: PathBuf,
    /// Name for the csv file to be created
    #[arg(long = "csv-name", default_value = DEFAULT_CSV_NAME)]
    csv_name: PathBuf,
}

/// Fixed log filter. The environment is not consulted, and the table library
/// is held to errors.
fn log_filter() -> Result<EnvFilter> {
    Ok(EnvFilter::new("info").add_directive("arrow=error".parse()?))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let env = log_filter()?;
    let subscriber = fmt::Subscriber::builder().with_env_filter(env).finish();

    tracing::subscriber::with_default(subscriber, || -> Result<()> {
        info!("startup");
        let config = Config::new(args.data).with_csv_name(args.csv_name);
        let summary = pipeline::run(&config)?;
        info!(
            rows = summary.rows_written,
            output = %summary.output.display(),
            "all done"
        );
        Ok(())
    })
}
