//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

use crate::domain::PassKind;

/// Canonical ordering for Maven POM sections that keeps comments and group banners attached
#[derive(Parser, Debug)]
#[command(name = "pomsort")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every sorting command.
#[derive(Args, Debug, Clone, Default)]
pub struct SortArgs {
    /// POM files, or directories containing pom.xml (default: <project_dir>/pom.xml)
    #[arg(value_hint = ValueHint::AnyPath)]
    pub paths: Vec<PathBuf>,

    /// Sort every pom.xml below the given directories (multi-module builds)
    #[arg(short, long)]
    pub recursive: bool,

    /// Name used in log lines (default: the document's artifactId)
    #[arg(long)]
    pub project_id: Option<String>,

    /// Print the sorted document instead of writing it
    #[arg(long, conflicts_with = "check")]
    pub dry_run: bool,

    /// Write nothing; exit with code 1 if a document is not sorted
    #[arg(long)]
    pub check: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sort <dependencies> by groupId:artifactId
    Dependencies(SortArgs),

    /// Sort <dependencyManagement><dependencies> by groupId:artifactId
    DependencyManagement(SortArgs),

    /// Sort <build><plugins> by groupId:artifactId
    Plugins(SortArgs),

    /// Sort <build><pluginManagement><plugins> by groupId:artifactId
    PluginManagement(SortArgs),

    /// Group *.version properties under plugin and dependency banners
    Properties(SortArgs),

    /// Sort *.version properties as one flat block
    PropertiesVersion(SortArgs),

    /// Run every pass except properties-version
    All(SortArgs),

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Commands {
    /// Sort options and passes, for sorting commands.
    pub fn sort_request(&self) -> Option<(&SortArgs, Vec<PassKind>)> {
        let request = match self {
            Commands::Dependencies(args) => (args, vec![PassKind::Dependencies]),
            Commands::DependencyManagement(args) => (args, vec![PassKind::DependencyManagement]),
            Commands::Plugins(args) => (args, vec![PassKind::Plugins]),
            Commands::PluginManagement(args) => (args, vec![PassKind::PluginManagement]),
            Commands::Properties(args) => (args, vec![PassKind::Properties]),
            Commands::PropertiesVersion(args) => (args, vec![PassKind::PropertiesVersion]),
            Commands::All(args) => (args, PassKind::STANDARD.to_vec()),
            Commands::Config { .. } | Commands::Completion { .. } => return None,
        };
        Some(request)
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a commented config template
    Template,

    /// Show config paths
    Path,
}
