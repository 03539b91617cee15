use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tabstats")]
#[command(about = "Tab render statistics reports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the report API over HTTP
    Serve {
        /// Override the configured port for this run only
        #[arg(long)]
        port: Option<u16>,
    },
    /// Fold new tab render events into the aggregation store
    Ingest {
        /// Read events from this directory instead of the data dir
        #[arg(long)]
        dir: Option<String>,
    },
    /// Print the tab render data table as JSON
    Report {
        #[arg(long)]
        interval: Option<String>,
        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,
        /// Last day, YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,
        /// Group id; repeat for several groups
        #[arg(long = "group")]
        groups: Vec<i64>,
        /// Tab id; repeat for several tabs
        #[arg(long = "tab")]
        tabs: Vec<i64>,
    },
}
