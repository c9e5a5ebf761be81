mod cmd;
mod context;
mod output;

use clap::{Parser, Subcommand};
use cmd::{
    associations::AssociationsSubcommand, config::ConfigSubcommand, issues::IssuesSubcommand,
    level10::Level10Subcommand, rocks::RocksSubcommand, targets::TargetsSubcommand,
    vto::VtoSubcommand,
};
use context::Context;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "bizdash",
    about = "Sales and business-development dashboard: meetings, goals, issues, rocks, associations, and targets",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ./bizdash.yaml, then ~/.bizdash/config.yaml)
    #[arg(long, global = true, env = "BIZDASH_CONFIG")]
    config: Option<PathBuf>,

    /// Hosted backend URL; switches the backend to REST
    #[arg(long, global = true, env = "BIZDASH_BACKEND_URL", hide_env_values = true)]
    backend_url: Option<String>,

    /// Hosted backend API key
    #[arg(long, global = true, env = "BIZDASH_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the dashboard web UI
    Serve {
        /// Port to listen on (default from config, 0 = OS-assigned)
        #[arg(long)]
        port: Option<u16>,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,

        /// Keep everything in memory; nothing is persisted
        #[arg(long)]
        memory: bool,
    },

    /// Show the bounds of a week
    Week {
        /// Any date in the week (YYYY-MM-DD) or an ISO week (YYYY-Www)
        #[arg(long)]
        week: Option<String>,
    },

    /// Weekly Level 10 meetings
    Level10 {
        #[command(subcommand)]
        subcommand: Level10Subcommand,
    },

    /// Yearly goals (VTO)
    Vto {
        #[command(subcommand)]
        subcommand: VtoSubcommand,
    },

    /// Issues list (IDS)
    Issues {
        #[command(subcommand)]
        subcommand: IssuesSubcommand,
    },

    /// Quarterly rocks
    Rocks {
        #[command(subcommand)]
        subcommand: RocksSubcommand,
    },

    /// Association memberships
    Associations {
        #[command(subcommand)]
        subcommand: AssociationsSubcommand,
    },

    /// Month calendar of association events
    Calendar {
        /// Month to show as YYYY-MM (default: this month)
        #[arg(long)]
        month: Option<String>,
    },

    /// Sales targets pipeline
    Targets {
        #[command(subcommand)]
        subcommand: TargetsSubcommand,
    },

    /// Show, validate, or create the config file
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = run(cli);

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let json = cli.json;

    // `config init` must work before any config exists.
    if let Commands::Config {
        subcommand: ConfigSubcommand::Init { home },
    } = &cli.command
    {
        return cmd::config::init(cli.config.as_deref(), *home, json);
    }

    let ctx = Context::load(cli.config.as_deref(), cli.backend_url, cli.api_key)?;

    match cli.command {
        Commands::Serve {
            port,
            no_open,
            memory,
        } => cmd::serve::run(ctx, port, no_open, memory),
        Commands::Week { week } => cmd::week::run(week.as_deref(), json),
        Commands::Level10 { subcommand } => cmd::level10::run(&ctx, subcommand, json),
        Commands::Vto { subcommand } => cmd::vto::run(&ctx, subcommand, json),
        Commands::Issues { subcommand } => cmd::issues::run(&ctx, subcommand, json),
        Commands::Rocks { subcommand } => cmd::rocks::run(&ctx, subcommand, json),
        Commands::Associations { subcommand } => cmd::associations::run(&ctx, subcommand, json),
        Commands::Calendar { month } => cmd::calendar::run(&ctx, month.as_deref(), json),
        Commands::Targets { subcommand } => cmd::targets::run(&ctx, subcommand, json),
        Commands::Config { subcommand } => cmd::config::run(&ctx, subcommand, json),
    }
}
