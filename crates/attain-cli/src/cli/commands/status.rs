use super::{exit_codes, open_store};
use crate::cli::args::StatusArgs;

pub fn cmd_status(args: StatusArgs) -> anyhow::Result<i32> {
    let store = open_store(&args.db)?;
    let stats = store.stats()?;

    if args.format == "json" {
        let payload = serde_json::json!({
            "db": args.db.display().to_string(),
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "counts": stats,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("store: {}", args.db.display());
        println!("  program outcomes:      {}", stats.program_outcomes);
        println!("  course outcomes:       {}", stats.course_outcomes);
        println!("  relations:             {}", stats.relations);
        println!("  criteria:              {}", stats.criteria);
        println!("  assessment relations:  {}", stats.evaluation_relations);
        match stats.students {
            Some(n) => println!("  students:              {n}"),
            None => println!("  students:              (no criteria committed)"),
        }
    }
    Ok(exit_codes::OK)
}
