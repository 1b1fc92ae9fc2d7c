mod commands;
mod output;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "envstate")]
#[command(about = "Bring labeled cloud environments up and down", long_about = None)]
struct Cli {
    /// Log filter, e.g. `debug` or `envstate_engine=trace` (RUST_LOG wins)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage environments declared in the environment file
    #[command(subcommand)]
    Env(EnvCommands),
    /// Manage a single instance
    #[command(subcommand)]
    Vm(VmCommands),
    /// Run the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "ENVSTATE_PORT", default_value_t = envstate_config::DEFAULT_PORT)]
        port: u16,
    },
    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum EnvCommands {
    /// Start instances, reconcile DNS and run up scripts
    Up(EnvArgs),
    /// Run down scripts and stop instances
    Down(EnvArgs),
    /// Show live details of the declared instances
    Show(EnvArgs),
}

#[derive(Args, Clone)]
pub struct EnvArgs {
    /// Environment file
    #[arg(short = 'e', long, env = "ENVSTATE_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Environment name (wins over --all)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Every environment matching --label
    #[arg(short, long)]
    pub all: bool,

    /// Comma-separated labels that must all be present
    #[arg(short, long, default_value = "")]
    pub label: String,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

#[derive(Subcommand)]
pub enum VmCommands {
    /// List instances in a project/zone
    List(VmArgs),
    /// Start an instance, optionally updating DNS and running a command
    Start(VmArgs),
    /// Show an instance's status
    Status(VmArgs),
    /// Stop an instance
    Stop(VmArgs),
}

#[derive(Args, Clone)]
pub struct VmArgs {
    /// Instance name
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Google Cloud project ID
    #[arg(short, long, default_value = "")]
    pub project: String,

    /// Compute zone
    #[arg(short, long, default_value = "")]
    pub zone: String,

    /// Hosted zone domain for the DNS record
    #[arg(short, long, default_value = "")]
    pub domain: String,

    /// Record name, published as <name>.<domain>
    #[arg(long, default_value = "")]
    pub dns_record_name: String,

    /// Record type
    #[arg(long, default_value = "")]
    pub dns_record_type: String,

    /// Publish the instance's external IP
    #[arg(long)]
    pub external_ip: bool,

    /// Explicit record addresses
    #[arg(long, value_delimiter = ',')]
    pub ip: Vec<String>,

    /// Command to run over SSH after start
    #[arg(short, long)]
    pub script: Option<String>,

    /// Path to the SSH private key
    #[arg(long, default_value = "")]
    pub ssh_key: String,

    #[arg(long)]
    pub ssh_port: Option<u16>,

    #[arg(long, default_value = "")]
    pub ssh_user: String,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

#[derive(Args, Clone)]
pub struct RemoteArgs {
    /// Server that executes the request, e.g. `10.0.0.5:8080`
    #[arg(short = 'H', long, env = "ENVSTATE_HOST")]
    pub host: Option<String>,

    /// Print what would be done without doing it
    #[arg(long)]
    pub dry: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Env(command) => commands::env::handle(command).await,
        Commands::Vm(command) => commands::vm::handle(command).await,
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::Version => {
            println!("envstate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
