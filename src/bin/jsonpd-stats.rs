use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use jsonpd::stats::StatsSnapshot;

#[derive(Parser)]
#[command(name = "jsonpd-stats")]
#[command(about = "Read outcome counters from a running jsonpd", long_about = None)]
struct Cli {
    /// Address of the stats listener
    #[arg(short, long, default_value = "localhost:8001")]
    addr: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Give up after this many milliseconds
    #[arg(short, long, default_value_t = 2000)]
    timeout: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// `key: value` lines, as served
    Text,
    /// Pretty-printed JSON object
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let raw = tokio::time::timeout(Duration::from_millis(cli.timeout), fetch(&cli.addr)).await??;
    let snapshot: StatsSnapshot = raw.parse()?;
    print!("{}", render(&snapshot, cli.format)?);

    Ok(())
}

fn render(snapshot: &StatsSnapshot, format: Format) -> Result<String, serde_json::Error> {
    match format {
        Format::Text => Ok(snapshot.to_string()),
        Format::Json => Ok(format!("{}\n", serde_json::to_string_pretty(snapshot)?)),
    }
}

async fn fetch(addr: &str) -> Result<String, std::io::Error> {
    let mut stream = TcpStream::connect(addr).await?;
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await?;
    Ok(raw)
}
