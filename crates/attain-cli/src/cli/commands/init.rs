use attain_core::storage::{SchemaState, Store};

use super::exit_codes;
use crate::cli::args::InitArgs;

pub fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    if let Some(parent) = args.db.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = Store::open(&args.db)?;
    match store.init_schema()? {
        SchemaState::Created => eprintln!("schema created at {}", args.db.display()),
        SchemaState::AlreadyExists => {
            eprintln!("schema already present at {}", args.db.display())
        }
    }
    Ok(exit_codes::OK)
}
