use clap::{Parser, Subcommand};

mod commands;
mod output;
mod templates;

#[derive(Parser)]
#[command(name = "ccx")]
#[command(author, version, about = "Switch the AI backend used by your coding agent", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new profile
    #[command(alias = "add")]
    Create(commands::profile::CreateArgs),

    /// Edit an existing profile
    Edit(commands::profile::EditArgs),

    /// Delete a profile
    #[command(alias = "rm")]
    Delete {
        /// Profile name
        name: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Activate a profile: prints shell commands for eval
    Use {
        /// Profile name (interactive selection if omitted)
        name: Option<String>,

        /// Shell dialect: bash, zsh, fish, powershell, cmd
        #[arg(short, long)]
        shell: Option<String>,
    },

    /// Print shell commands that clear every tracked variable
    Reset {
        /// Shell dialect: bash, zsh, fish, powershell, cmd
        #[arg(short, long)]
        shell: Option<String>,
    },

    /// Show detailed profile information
    #[command(alias = "info")]
    Show {
        /// Profile name
        name: String,
    },

    /// List all profiles
    #[command(alias = "ls")]
    List {
        /// Output format: json (default is a table)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Export profiles as JSON (credentials omitted)
    Export {
        /// Output file path (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import profiles from JSON
    Import {
        /// Input file path (stdin if not specified)
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Show the active profile recorded by the last invocation
    Current,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Create(args)) => commands::profile::create(args),
        Some(Commands::Edit(args)) => commands::profile::edit(args),
        Some(Commands::Delete { name, yes }) => commands::profile::delete(name, yes),
        Some(Commands::Use { name, shell }) => commands::profile::activate(name, shell),
        Some(Commands::Reset { shell }) => commands::profile::reset(shell),
        Some(Commands::Show { name }) => commands::profile::show(name),
        Some(Commands::List { format }) => commands::profile::list(format),
        Some(Commands::Export { output }) => commands::profile::export(output),
        Some(Commands::Import { input }) => commands::profile::import(input),
        Some(Commands::Current) => commands::profile::current(),
        None => commands::profile::activate(None, None),
    }
}
