use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pagedit")]
#[command(about = "Edit knowledge-base pages from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Page snapshot file (JSON)
    #[arg(long, global = true, value_name = "PATH", default_value = "page.json")]
    pub page: PathBuf,

    /// Optional session config file (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log session activity
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the page and its attachments
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit the page and save it
    Edit(EditArgs),
    /// Leave edit mode without saving, dropping any draft
    Discard,
}

#[derive(clap::Args, Debug, Default)]
pub struct EditArgs {
    /// New page title
    #[arg(long)]
    pub title: Option<String>,
    /// New markdown content
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,
    /// Read new markdown content from a file
    #[arg(long, value_name = "PATH")]
    pub content_file: Option<PathBuf>,
    /// Editor mode to record (markdown or wysiwyg)
    #[arg(long)]
    pub mode: Option<String>,
    /// Attach a file (repeatable)
    #[arg(long, value_name = "PATH")]
    pub attach: Vec<PathBuf>,
    /// Remove a stored attachment by id (repeatable)
    #[arg(long, value_name = "ID")]
    pub remove: Vec<String>,
    /// Only store the content as a draft (title, mode, and removals need a save)
    #[arg(long, conflicts_with_all = ["title", "mode", "remove"])]
    pub autosave_only: bool,
}
