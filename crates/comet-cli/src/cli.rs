use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "comet",
    about = "Comet: version control for reusable source components",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a workspace, or a bare scope with --bare
    Init(InitArgs),
    /// Scaffold a new component in the workspace layout
    Create(CreateArgs),
    /// Track existing files as a component
    Add(AddArgs),
    /// Record new versions of new and modified components
    Commit(CommitArgs),
    /// Push staged components to a remote scope
    Export(ExportArgs),
    /// Fetch a component and its dependencies into the workspace
    Import(ImportArgs),
    /// Show untracked, new, modified and staged components
    Status(StatusArgs),
    /// Manage remote scopes
    Remote(RemoteArgs),
}

#[derive(Args)]
pub struct InitArgs {
    pub path: Option<PathBuf>,
    /// Create a bare scope that workspaces export to
    #[arg(long)]
    pub bare: bool,
    /// Scope name (defaults to "local" for workspaces)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct CreateArgs {
    pub id: String,
    /// Also write a component comet.json
    #[arg(long)]
    pub manifest: bool,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Component id; derived from the layout when omitted
    #[arg(long)]
    pub id: Option<String>,
    /// Entry point, relative to the component directory
    #[arg(short, long)]
    pub main: Option<String>,
}

#[derive(Args)]
pub struct CommitArgs {
    /// Components to commit; every pending one when empty
    pub ids: Vec<String>,
    #[arg(short, long)]
    pub message: String,
    #[arg(long)]
    pub author: Option<String>,
}

#[derive(Args)]
pub struct ExportArgs {
    pub remote: String,
    /// Components to export; every staged one when empty
    pub ids: Vec<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    pub id: String,
    /// Write the component here instead of its layout directory
    #[arg(short, long)]
    pub path: Option<PathBuf>,
    /// Replace local files that differ from the imported version
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Args)]
pub struct StatusArgs {}

#[derive(Args)]
pub struct RemoteArgs {
    #[command(subcommand)]
    pub action: Option<RemoteAction>,
}

#[derive(Subcommand)]
pub enum RemoteAction {
    /// Register a bare scope directory as a remote
    Add { path: PathBuf },
}
