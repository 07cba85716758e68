use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use ccauth::{
    commands,
    paths::Paths,
    ui::{ColorMode, Ui},
};

#[derive(Parser)]
#[command(name = "ccauth")]
#[command(about = "Claude Code account switcher - manage multiple credential snapshots")]
#[command(version)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// When to use colors: always, auto, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all registered accounts
    List,

    /// Show the currently active account
    Current,

    /// Register an existing credential file under a name
    Register {
        /// Name for the account
        name: String,

        /// Path to the credential file
        path: PathBuf,
    },

    /// Save the current live credentials as a named account
    Save {
        /// Name for the account
        name: String,
    },

    /// Switch to a named account
    Use {
        /// Name of the account to activate
        name: String,
    },

    /// Rotate to the next account in registry order
    Switch,

    /// Rename an account
    Rename {
        /// Current account name
        old: String,

        /// New account name
        new: String,
    },

    /// Remove an account and its saved snapshot
    Remove {
        /// Name of the account to remove
        name: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Run diagnostics on the ccauth setup
    Doctor,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("ccauth: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = Paths::new()?;
    let ui = Ui::new(cli.color, cli.no_color);

    match cli.command {
        Commands::List => commands::list(&paths, &ui),
        Commands::Current => commands::current(&paths, &ui),
        Commands::Register { name, path } => commands::register(&paths, &name, &path, &ui),
        Commands::Save { name } => commands::save(&paths, &name, &ui),
        Commands::Use { name } => commands::use_account(&paths, &name, &ui),
        Commands::Switch => commands::switch_next(&paths, &ui),
        Commands::Rename { old, new } => commands::rename(&paths, &old, &new, &ui),
        Commands::Remove { name, force } => commands::remove(&paths, &name, force, &ui),
        Commands::Doctor => commands::doctor(&paths, &ui),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "ccauth", &mut std::io::stdout());
            Ok(())
        }
    }
}
