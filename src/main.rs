use clap::Parser;
use log_tail::{EmissionMode, TailOptions, watch_log};
use std::path::PathBuf;
use std::process;
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

/// Print records appended to a file as they arrive.
#[derive(Parser)]
#[command(name = "log-tail")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File to follow
    path: PathBuf,

    /// Emit the existing contents before following new data
    #[arg(short = 'b', long)]
    from_beginning: bool,

    /// Deliver records after each processing pass instead of in-line
    #[arg(long)]
    deferred: bool,

    /// Single-character record separator
    #[arg(short, long, default_value = "\n", hide_default_value = true)]
    separator: String,

    /// Maximum bytes scanned per processing pass
    #[arg(long, default_value_t = log_tail::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> log_tail::Result<TailOptions> {
        let emission = if self.deferred {
            EmissionMode::Deferred
        } else {
            EmissionMode::Synchronous
        };

        TailOptions::default()
            .from_beginning(self.from_beginning)
            .emission(emission)
            .with_separator(&self.separator)?
            .with_chunk_size(self.chunk_size)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let options = match cli.options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    match watch_log(&cli.path, options).await {
        Ok(mut stream) => {
            tracing::info!(path = %cli.path.display(), "watching file");
            while let Some(record) = stream.next().await {
                match record {
                    Ok(content) => println!("{}", content),
                    Err(e) => {
                        eprintln!("Error reading file: {}", e);
                        process::exit(1);
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("Error setting up file watcher: {}", e);
            process::exit(1);
        }
    }
}
