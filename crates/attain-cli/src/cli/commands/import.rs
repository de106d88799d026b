use attain_core::config::load_import_doc;

use super::{exit_codes, open_store};
use crate::cli::args::ImportArgs;

pub fn cmd_import(args: ImportArgs) -> anyhow::Result<i32> {
    let doc = match load_import_doc(&args.file) {
        Ok(doc) => doc,
        Err(e) if e.is_input_error() => {
            eprintln!("rejected: {e}");
            return Ok(exit_codes::INPUT_ERROR);
        }
        Err(e) => return Err(e.into()),
    };

    let store = open_store(&args.db)?;
    match doc.apply(&store) {
        Ok(summary) => {
            eprintln!(
                "imported {} program outcomes, {} course outcomes, {} relations, {} criteria, {} assessments, {} students",
                summary.program_outcomes,
                summary.course_outcomes,
                summary.relations,
                summary.criteria,
                summary.assessments,
                summary.students
            );
            Ok(exit_codes::OK)
        }
        Err(e) if e.is_input_error() => {
            eprintln!("rejected: {e}");
            Ok(exit_codes::INPUT_ERROR)
        }
        Err(e) => Err(e.into()),
    }
}
