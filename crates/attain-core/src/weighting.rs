use std::collections::HashMap;

use crate::model::{CourseEvaluationRelation, Criterion};

/// Weighted contribution of every (course outcome, criterion) pair present
/// in the relation set: `relation_value * weight / 100`. Pure function of
/// its two inputs; absent pairs contribute 0, never an error.
#[derive(Debug, Clone, Default)]
pub struct WeightedContributions {
    by_outcome: HashMap<i64, HashMap<String, f64>>,
}

impl WeightedContributions {
    pub fn compute(criteria: &[Criterion], relations: &[CourseEvaluationRelation]) -> Self {
        let weights: HashMap<&str, u32> = criteria
            .iter()
            .map(|c| (c.name.as_str(), c.weight))
            .collect();
        let mut by_outcome: HashMap<i64, HashMap<String, f64>> = HashMap::new();
        for rel in relations {
            let weight = weights.get(rel.criterion.as_str()).copied().unwrap_or(0);
            by_outcome
                .entry(rel.course_outcome_id)
                .or_default()
                .insert(
                    rel.criterion.clone(),
                    f64::from(rel.value) * f64::from(weight) / 100.0,
                );
        }
        Self { by_outcome }
    }

    pub fn get(&self, course_outcome_id: i64, criterion: &str) -> f64 {
        self.by_outcome
            .get(&course_outcome_id)
            .and_then(|m| m.get(criterion))
            .copied()
            .unwrap_or(0.0)
    }

    /// Sum of a course outcome's contributions across all criteria, i.e. the
    /// score the outcome realizes out of the combined criteria weight.
    pub fn outcome_total(&self, course_outcome_id: i64) -> f64 {
        self.by_outcome
            .get(&course_outcome_id)
            .map(|m| m.values().sum())
            .unwrap_or(0.0)
    }
}

/// Half-up rounding to a fixed number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
