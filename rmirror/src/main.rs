use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rmirror",
    version,
    about = "Continuously mirror a local directory to a remote host over scp",
    long_about = "`rmirror` watches a source directory and copies new or updated content to a \
remote destination with `scp -r`.

EXAMPLE:
    # Mirror ./data to backup:/srv/data, waiting until files stop growing
    # for 3 polls before sending them
    rmirror --count 3 ./data backup:/srv/data

State is kept in memory only; every run starts from a fresh scan and treats
content already present in the source as transferred."
)]
struct Args {
    // Polling options
    /// Poll the source directory every N seconds
    #[arg(
        short = 'n',
        long = "interval",
        default_value = "1",
        value_name = "SECONDS",
        help_heading = "Polling"
    )]
    interval: u64,

    /// Number of polls a file's size must stay unchanged before it is transferred
    ///
    /// The counter resets whenever the size changes, so large files that are
    /// still being written are not sent mid-write. 0 transfers on the first
    /// observation.
    #[arg(
        long,
        default_value = "0",
        value_name = "N",
        help_heading = "Polling"
    )]
    count: u32,

    // Transfer options
    /// Do not bulk-transfer content that already exists at startup
    #[arg(long, help_heading = "Transfer")]
    ignore_existing: bool,

    // Progress & output
    /// Verbose level: -v INFO / -vv DEBUG / -vvv TRACE (default: ERROR)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help_heading = "Progress & output")]
    verbose: u8,

    // ARGUMENTS
    /// Source directory followed by the destination spec ([user@]host:path)
    #[arg()]
    paths: Vec<String>,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    if args.paths.len() != 2 {
        eprintln!("You must specify a source directory and a destination, e.g.: rmirror <src> <host:path>");
        std::process::exit(1);
    }
    let settings = common::Settings {
        source: std::path::PathBuf::from(&args.paths[0]),
        destination: args.paths[1].clone(),
        interval: std::time::Duration::from_secs(args.interval),
        check_count: args.count,
        ignore_existing: args.ignore_existing,
    };
    if let Err(error) = common::mirror::run(settings, common::transport::scp).await {
        tracing::error!("{:#}", &error);
        std::process::exit(1);
    }
    Ok(())
}
