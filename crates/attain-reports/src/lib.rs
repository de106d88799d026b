use std::sync::Arc;

use attain_core::report_api::ReportBuilder;

pub mod gradebook;
pub mod table1;
pub mod table2;
pub mod table3;
pub mod table4;
pub mod table5;

/// All report builders in generation order. The program-attainment report
/// (table5) reads the `table4` materialization, so it is listed after the
/// scorecards.
pub fn default_reports() -> Vec<Arc<dyn ReportBuilder>> {
    vec![
        Arc::new(table1::CoverageReport),
        Arc::new(table2::AssessmentMapReport),
        Arc::new(table3::WeightedEvaluationReport),
        Arc::new(table4::ScorecardReport),
        Arc::new(table5::AttainmentReport),
        Arc::new(gradebook::GradebookReport),
    ]
}
