pub mod add;
pub mod import;
pub mod init;
pub mod report;
pub mod status;

use std::path::Path;

use attain_core::storage::Store;

use crate::cli::args::{Cli, Command};

pub mod exit_codes {
    pub const OK: i32 = 0;
    /// Rejected input (validation/referential); committed state untouched.
    pub const INPUT_ERROR: i32 = 1;
    /// Store failure; the current operation was aborted.
    pub const STORE_ERROR: i32 = 2;
}

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Init(args) => init::cmd_init(args),
        Command::Add(args) => add::cmd_add(args),
        Command::Import(args) => import::cmd_import(args),
        Command::Report(args) => report::cmd_report(args),
        Command::Status(args) => status::cmd_status(args),
    }
}

pub(crate) fn open_store(db: &Path) -> anyhow::Result<Store> {
    if let Some(parent) = db.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = Store::open(db)?;
    store.init_schema()?;
    Ok(store)
}
