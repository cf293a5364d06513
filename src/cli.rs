// Command-line surface. Parsing only; the work happens in `commands`.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::api::{DEFAULT_API_URL, DEFAULT_UPLOAD_URL};

/// GitHub release helper.
#[derive(Parser, Debug)]
#[command(name = "github-release", version)]
#[command(about = "Create, inspect and delete GitHub releases")]
pub struct Cli {
    /// GitHub OAuth token.
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL of the GitHub REST API.
    #[arg(long, global = true, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Base URL of the GitHub asset upload host.
    #[arg(long, global = true, env = "GITHUB_UPLOAD_URL", default_value = DEFAULT_UPLOAD_URL)]
    pub upload_url: String,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print release metadata as JSON.
    Get(Target),
    /// Create new GitHub release.
    Create(CreateArgs),
    /// Delete GitHub release.
    Delete(Target),
}

/// Repository and tag a command operates on.
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// GitHub repo (eg. tadeboro/release-me).
    #[arg(long)]
    pub repo: String,

    /// Existing git tag name.
    #[arg(long)]
    pub tag: String,
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    #[command(flatten)]
    pub target: Target,

    /// Path to release notes file ("-" reads standard input).
    #[arg(long, value_name = "PATH")]
    pub notes: PathBuf,

    /// Release display name. Defaults to the tag.
    #[arg(long)]
    pub name: Option<String>,

    /// File to attach to the release. May be given more than once.
    #[arg(short, long = "asset", value_name = "PATH")]
    pub assets: Vec<PathBuf>,
}
