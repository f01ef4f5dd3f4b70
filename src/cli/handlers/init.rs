use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io;
use crate::io::store::StateStore;
use crate::io::substrate::FileSubstrate;
use crate::model::config::DEFAULT_STORAGE_KEY;

/// Create `.tasklists/` under `root`, optionally seeded with lists.
pub fn cmd_init(root: &Path, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = config_io::init_data_dir(root)?;

    if !args.lists.is_empty() {
        let mut store = StateStore::open(FileSubstrate::new(&data_dir), DEFAULT_STORAGE_KEY)?;
        for name in &args.lists {
            if store.create_list(name, &[])?.is_none() {
                eprintln!("warning: skipping blank list name");
            }
        }
    }

    println!("initialized {}", data_dir.display());
    Ok(())
}
