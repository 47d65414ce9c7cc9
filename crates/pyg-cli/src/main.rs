use clap::{Parser, Subcommand};
use pyg::{
    commands::{
        config::{self, ConfigAction},
        dump, generate,
    },
    GlobalOpts,
};
use pyg_logger as logger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pyg")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Python binding generator for llgo",
    long_about = "pyg turns a Python module's introspection dump into a Go file of link-only declarations."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate link-only declarations for a Python module
    Generate(generate::GenerateCommand),
    /// Print the symbols a module dump reports
    Dump(dump::DumpCommand),
    /// Configure pyg
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("PYG_LOG")
                .unwrap_or_else(|_| logger::verbosity_to_filter().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), cli.global.no_stdout)
    {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing();

    let result = match cli.command {
        Commands::Generate(cmd) => generate::handle_generate(cmd, &cli.global),
        Commands::Dump(cmd) => dump::handle_dump(cmd, &cli.global),
        Commands::Config { action } => {
            config::handle_config(action.unwrap_or(ConfigAction::Show), &cli.global)
        }
    };

    if let Err(e) = result {
        logger::error(&e);
        logger::show_log_path();
        std::process::exit(1);
    }
}
