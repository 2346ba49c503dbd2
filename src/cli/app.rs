use clap::{Args, Parser, Subcommand};
use flasharray_client::api::ResourceGroup;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flasharray-cli")]
#[command(about = "A CLI tool for the FlashArray REST 2.x management API")]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Array address, overrides the config file and FLASHARRAY_TARGET
    #[arg(long, global = true)]
    pub target: Option<String>,

    /// REST version, overrides the config file and FLASHARRAY_API_VERSION
    #[arg(long, global = true)]
    pub api_version: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(long, global = true)]
    pub insecure: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the items of a resource group
    List(ListArgs),
    /// Print the current access token
    Token {
        /// Ask the token manager for a fresh token
        #[arg(long)]
        refresh: bool,
    },
    /// Print the REST version the client speaks
    Version,
    /// List the REST versions the array supports
    Versions,
}

#[derive(Args)]
pub struct ListArgs {
    /// Resource group, e.g. volumes or host-groups
    pub group: ResourceGroup,

    /// Restrict to these names (repeatable)
    #[arg(long = "name")]
    pub names: Vec<String>,

    /// Restrict to these ids (repeatable)
    #[arg(long = "id")]
    pub ids: Vec<String>,

    /// Server-side filter expression
    #[arg(long)]
    pub filter: Option<String>,

    /// Sort keys, e.g. `name` or `space.total_physical-`
    #[arg(long)]
    pub sort: Vec<String>,

    /// Page size
    #[arg(long)]
    pub limit: Option<u32>,

    /// Follow continuation tokens until every page is read
    #[arg(long)]
    pub all: bool,
}
