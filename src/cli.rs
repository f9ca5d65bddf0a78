use clap::{Parser, Subcommand};

/// Work log query API
#[derive(Parser)]
#[command(name = "worklog-api", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Port to bind; defaults to WORKLOG_PORT or 8000
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Apply pending database migrations and exit
    Migrate {
        /// Overrides the configured database URL
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },
}
