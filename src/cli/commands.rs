use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tl", about = concat!("tasklists v", env!("CARGO_PKG_VERSION"), " - named task lists with undo"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different directory
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create .tasklists/ in the current directory
    Init(InitArgs),
    /// Show all lists
    Lists,
    /// Create a list and select it
    New(NewArgs),
    /// Rename a list (default: the selected one)
    Rename(RenameArgs),
    /// Delete a list and its tasks (default: the selected one)
    Drop(DropArgs),
    /// Select a list
    Use(UseArgs),
    /// Show the tasks of a list (default: the selected one)
    Tasks(TasksArgs),
    /// Add a task to the selected list
    Add(AddArgs),
    /// Toggle a task done / not done
    Done(TaskArg),
    /// Change a task's text
    Edit(EditArgs),
    /// Delete a task (recoverable with `undo` for a short time)
    Rm(TaskArg),
    /// Move a task onto another task's position, or to the end
    Mv(MvArgs),
    /// Bring back the most recently deleted task
    Undo,
    /// Forget the most recently deleted task
    Dismiss,
    /// Delete every list and task
    Clear(ClearArgs),
}

// ---------------------------------------------------------------------------
// List command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Create an initial list (repeatable; the last one is selected)
    #[arg(long = "list", value_name = "NAME")]
    pub lists: Vec<String>,
}

#[derive(Args)]
pub struct NewArgs {
    /// List name
    pub name: String,
}

#[derive(Args)]
pub struct RenameArgs {
    /// New name
    pub name: String,
    /// List to rename (position, id or name)
    #[arg(long)]
    pub list: Option<String>,
}

#[derive(Args)]
pub struct DropArgs {
    /// List to delete (position, id or name)
    pub list: Option<String>,
}

#[derive(Args)]
pub struct UseArgs {
    /// List to select (position, id or name)
    pub list: String,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Confirm deleting everything
    #[arg(long)]
    pub yes: bool,
}

// ---------------------------------------------------------------------------
// Task command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TasksArgs {
    /// List to show (position, id or name)
    pub list: Option<String>,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task text
    pub text: String,
}

#[derive(Args)]
pub struct TaskArg {
    /// Task (position in the selected list, id or id prefix)
    pub task: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task (position in the selected list, id or id prefix)
    pub task: String,
    /// New text
    pub text: String,
}

#[derive(Args)]
#[command(group(ArgGroup::new("target").required(true).args(["onto", "end"])))]
pub struct MvArgs {
    /// Task to move
    pub task: String,
    /// Take the position of this task
    #[arg(long)]
    pub onto: Option<String>,
    /// Move to the end of the list
    #[arg(long)]
    pub end: bool,
}
