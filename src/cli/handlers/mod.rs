mod init;
pub use init::cmd_init;

use std::path::Path;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::DirLock;
use crate::io::session_state;
use crate::io::store::StateStore;
use crate::io::substrate::FileSubstrate;
use crate::logging;
use crate::model::config::AppConfig;
use crate::model::document::Document;
use crate::ops::session::{Operation, Outcome, Session};
use crate::util::clock::SystemClock;

type CliResult = Result<(), Box<dyn std::error::Error>>;
type CliSession = Session<FileSubstrate, SystemClock>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CliResult {
    let json = cli.json;
    let start = match cli.dir {
        Some(ref dir) => std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init(args) => cmd_init(&start, args),

        // Read commands
        Commands::Lists => cmd_lists(&Workspace::open(&start)?, json),
        Commands::Tasks(args) => cmd_tasks(&Workspace::open(&start)?, args, json),

        // Write commands
        Commands::New(args) => with_write(&start, |ws| cmd_new(ws, args)),
        Commands::Rename(args) => with_write(&start, |ws| cmd_rename(ws, args)),
        Commands::Drop(args) => with_write(&start, |ws| cmd_drop(ws, args)),
        Commands::Use(args) => with_write(&start, |ws| cmd_use(ws, args)),
        Commands::Add(args) => with_write(&start, |ws| cmd_add(ws, args)),
        Commands::Done(args) => with_write(&start, |ws| cmd_done(ws, args)),
        Commands::Edit(args) => with_write(&start, |ws| cmd_edit(ws, args)),
        Commands::Rm(args) => with_write(&start, |ws| cmd_rm(ws, args, json)),
        Commands::Mv(args) => with_write(&start, |ws| cmd_mv(ws, args)),
        Commands::Undo => with_write(&start, cmd_undo),
        Commands::Dismiss => with_write(&start, cmd_dismiss),
        Commands::Clear(args) => with_write(&start, |ws| cmd_clear(ws, args)),
    }
}

// ---------------------------------------------------------------------------
// Workspace: data dir + config + lock + session
// ---------------------------------------------------------------------------

struct Workspace {
    config: AppConfig,
    session: CliSession,
    _lock: DirLock,
}

impl Workspace {
    /// Readers lock too: opening may persist a selection repair.
    fn open(start: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data_dir = config_io::discover_data_dir(start)?;
        let config = config_io::read_config(&data_dir)?;
        if let Err(e) = logging::init_logging(&config.log.level) {
            eprintln!("warning: {}", e);
        }

        let lock = DirLock::acquire_default(&data_dir)?;

        let substrate = FileSubstrate::new(&data_dir);
        let undo = session_state::read_undo(&substrate, &config.storage.key);
        let store = StateStore::open(substrate, &config.storage.key)?;
        let session = Session::new(store, SystemClock)
            .with_undo_timeout_ms(config.undo.timeout_ms)
            .with_undo(undo);

        Ok(Workspace {
            config,
            session,
            _lock: lock,
        })
    }

    fn doc(&self) -> &Document {
        self.session.document()
    }

    /// Persist the undo slot for the next invocation.
    fn finish(self) -> CliResult {
        let key = self.config.storage.key.clone();
        let (mut store, undo) = self.session.into_parts();
        session_state::write_undo(store.substrate_mut(), &key, &undo)?;
        Ok(())
    }
}

fn with_write(start: &Path, f: impl FnOnce(&mut Workspace) -> CliResult) -> CliResult {
    let mut ws = Workspace::open(start)?;
    f(&mut ws)?;
    ws.finish()
}

// ---------------------------------------------------------------------------
// Reference resolution
// ---------------------------------------------------------------------------

/// A list by 1-based position, id, or exact name.
fn resolve_list(doc: &Document, reference: &str) -> Result<String, String> {
    if let Ok(n) = reference.parse::<usize>()
        && n >= 1
        && n <= doc.lists.len()
    {
        return Ok(doc.lists[n - 1].id.clone());
    }
    if let Some(list) = doc.find_list(reference) {
        return Ok(list.id.clone());
    }
    let named: Vec<&str> = doc
        .lists
        .iter()
        .filter(|l| l.name == reference)
        .map(|l| l.id.as_str())
        .collect();
    match named.as_slice() {
        [id] => Ok(id.to_string()),
        [] => Err(format!("list not found: {}", reference)),
        _ => Err(format!(
            "list name '{}' is ambiguous, use its position or id",
            reference
        )),
    }
}

/// A task of the selected list by 1-based position, id, or unique id prefix.
fn resolve_task(doc: &Document, reference: &str) -> Result<String, String> {
    let list = doc
        .active_list()
        .ok_or("no list selected: create or select a list first")?;
    if let Ok(n) = reference.parse::<usize>()
        && n >= 1
        && n <= list.tasks.len()
    {
        return Ok(list.tasks[n - 1].id.clone());
    }
    if let Some(task) = list.find_task(reference) {
        return Ok(task.id.clone());
    }
    let matches: Vec<&str> = list
        .tasks
        .iter()
        .filter(|t| t.id.starts_with(reference))
        .map(|t| t.id.as_str())
        .collect();
    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => Err(format!("task not found in '{}': {}", list.name, reference)),
        _ => Err(format!("task id prefix '{}' is ambiguous", reference)),
    }
}

fn selected_list_id(doc: &Document) -> Result<String, String> {
    doc.active_list()
        .map(|l| l.id.clone())
        .ok_or_else(|| "no list selected: create or select a list first".to_string())
}

fn print_active_tasks(doc: &Document) {
    if let Some(list) = doc.active_list() {
        println!("{}", format_list_header(list));
        for line in format_task_lines(list) {
            println!("{}", line);
        }
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_lists(ws: &Workspace, json: bool) -> CliResult {
    let doc = ws.doc();
    let active = doc.active_list_id.as_deref();

    if json {
        let lists: Vec<_> = doc
            .lists
            .iter()
            .enumerate()
            .map(|(i, l)| list_summary_to_json(i + 1, l, Some(l.id.as_str()) == active))
            .collect();
        println!("{}", serde_json::to_string_pretty(&lists)?);
        return Ok(());
    }

    if doc.lists.is_empty() {
        println!("no lists (create one with `tl new <name>`)");
        return Ok(());
    }
    let width = list_name_column(&doc.lists);
    for (i, list) in doc.lists.iter().enumerate() {
        let is_active = Some(list.id.as_str()) == active;
        println!("{}", format_list_line(i + 1, list, is_active, width));
    }
    Ok(())
}

fn cmd_tasks(ws: &Workspace, args: TasksArgs, json: bool) -> CliResult {
    let doc = ws.doc();
    let list_id = match args.list {
        Some(ref reference) => resolve_list(doc, reference)?,
        None => selected_list_id(doc)?,
    };
    let Some(list) = doc.find_list(&list_id) else {
        return Err(format!("list not found: {}", list_id).into());
    };
    let is_active = doc.active_list_id.as_deref() == Some(list.id.as_str());

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&list_tasks_to_json(list, is_active))?
        );
        return Ok(());
    }
    println!("{}", format_list_header(list));
    for line in format_task_lines(list) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// List write commands
// ---------------------------------------------------------------------------

fn cmd_new(ws: &mut Workspace, args: NewArgs) -> CliResult {
    match ws
        .session
        .dispatch(Operation::CreateList { name: args.name })?
    {
        Outcome::ListCreated { id } => {
            println!("{}", id);
            Ok(())
        }
        _ => Err("list name cannot be blank".into()),
    }
}

fn cmd_rename(ws: &mut Workspace, args: RenameArgs) -> CliResult {
    let id = match args.list {
        Some(ref reference) => resolve_list(ws.doc(), reference)?,
        None => selected_list_id(ws.doc())?,
    };
    let outcome = ws.session.dispatch(Operation::RenameList {
        id,
        name: args.name,
    })?;
    if outcome == Outcome::Unchanged {
        return Err("list name cannot be blank".into());
    }
    Ok(())
}

fn cmd_drop(ws: &mut Workspace, args: DropArgs) -> CliResult {
    let id = match args.list {
        Some(ref reference) => resolve_list(ws.doc(), reference)?,
        None => selected_list_id(ws.doc())?,
    };
    let name = ws
        .doc()
        .find_list(&id)
        .map(|l| l.name.clone())
        .unwrap_or_default();
    ws.session.dispatch(Operation::DeleteList { id })?;
    println!("deleted list: {}", name);
    match ws.doc().active_list() {
        Some(list) => println!("selected: {}", list.name),
        None => println!("no lists left"),
    }
    Ok(())
}

fn cmd_use(ws: &mut Workspace, args: UseArgs) -> CliResult {
    let id = resolve_list(ws.doc(), &args.list)?;
    ws.session.dispatch(Operation::SelectList { id })?;
    print_active_tasks(ws.doc());
    Ok(())
}

fn cmd_clear(ws: &mut Workspace, args: ClearArgs) -> CliResult {
    if !args.yes {
        return Err("this deletes every list and task; re-run with --yes".into());
    }
    ws.session.dispatch(Operation::ClearAll)?;
    println!("cleared all lists");
    Ok(())
}

// ---------------------------------------------------------------------------
// Task write commands
// ---------------------------------------------------------------------------

fn cmd_add(ws: &mut Workspace, args: AddArgs) -> CliResult {
    match ws.session.dispatch(Operation::AddTask { text: args.text })? {
        Outcome::TaskAdded { id } => {
            println!("{}", id);
            Ok(())
        }
        _ => Err("task text cannot be blank".into()),
    }
}

fn cmd_done(ws: &mut Workspace, args: TaskArg) -> CliResult {
    let id = resolve_task(ws.doc(), &args.task)?;
    ws.session.dispatch(Operation::ToggleTask { id: id.clone() })?;
    if let Some(list) = ws.doc().active_list()
        && let Some(idx) = list.task_index(&id)
    {
        println!("{}", format_task_line(idx + 1, &list.tasks[idx]));
    }
    Ok(())
}

fn cmd_edit(ws: &mut Workspace, args: EditArgs) -> CliResult {
    let id = resolve_task(ws.doc(), &args.task)?;
    let outcome = ws.session.dispatch(Operation::EditTask {
        id,
        text: args.text,
    })?;
    if outcome == Outcome::Unchanged {
        return Err("task text cannot be blank".into());
    }
    Ok(())
}

fn cmd_rm(ws: &mut Workspace, args: TaskArg, json: bool) -> CliResult {
    let id = resolve_task(ws.doc(), &args.task)?;
    let position = ws
        .doc()
        .active_list()
        .and_then(|l| l.task_index(&id))
        .map_or(0, |i| i + 1);
    let Outcome::TaskDeleted { task } = ws.session.dispatch(Operation::DeleteTask { id })? else {
        return Ok(());
    };
    let undo_ms = ws.config.undo.timeout_ms;
    if json {
        let out = DeletedJson {
            deleted: task_to_json(position, &task),
            undo_ms,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "deleted: {} (undo with `tl undo` within {}s)",
            task.text,
            undo_ms.div_ceil(1000)
        );
    }
    Ok(())
}

fn cmd_mv(ws: &mut Workspace, args: MvArgs) -> CliResult {
    let id = resolve_task(ws.doc(), &args.task)?;
    let op = match args.onto {
        Some(ref target) => Operation::ReorderTask {
            from: id,
            to: resolve_task(ws.doc(), target)?,
        },
        None => Operation::MoveTaskToEnd { id },
    };
    ws.session.dispatch(op)?;
    print_active_tasks(ws.doc());
    Ok(())
}

fn cmd_undo(ws: &mut Workspace) -> CliResult {
    match ws.session.dispatch(Operation::Undo)? {
        Outcome::TaskRestored { task } => println!("restored: {}", task.text),
        _ => println!("nothing to undo"),
    }
    Ok(())
}

fn cmd_dismiss(ws: &mut Workspace) -> CliResult {
    match ws.session.dispatch(Operation::DismissUndo)? {
        Outcome::Updated => println!("dismissed"),
        _ => println!("nothing to dismiss"),
    }
    Ok(())
}
