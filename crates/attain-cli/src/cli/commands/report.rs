use anyhow::Context;
use attain_core::report::{console, csv};

use super::{exit_codes, open_store};
use crate::cli::args::ReportArgs;

pub fn cmd_report(args: ReportArgs) -> anyhow::Result<i32> {
    let store = open_store(&args.db)?;
    let builders = attain_reports::default_reports();

    if let Some(only) = &args.only {
        if !builders.iter().any(|b| b.name() == only) {
            let known: Vec<&str> = builders.iter().map(|b| b.name()).collect();
            anyhow::bail!("unknown report {only:?} (known: {})", known.join(", "));
        }
    }

    let mut written = Vec::new();
    for builder in builders {
        if let Some(only) = &args.only {
            if builder.name() != only {
                continue;
            }
        }

        let report = builder
            .build(&store)
            .with_context(|| format!("failed to build {}", builder.name()))?;
        let paths = csv::write_report(&report, &args.out)?;
        tracing::info!(
            event = "report_written",
            report = builder.name(),
            files = paths.len()
        );
        if args.print {
            console::print_report(&report);
        }
        written.extend(paths);

        // table3 and table4 are also persisted back to the store so the
        // attainment report can read success rates without recomputing the
        // per-student pipeline.
        match builder.name() {
            "table3" => {
                let snap = store.snapshot()?;
                store.materialize_table3(&snap.criteria, &attain_reports::table3::rows(&snap))?;
            }
            "table4" => {
                let snap = store.snapshot()?;
                store.materialize_table4(&snap.criteria, &attain_reports::table4::rows(&snap))?;
            }
            _ => {}
        }
    }

    eprintln!(
        "wrote {} artifact(s) to {}",
        written.len(),
        args.out.display()
    );
    Ok(exit_codes::OK)
}
