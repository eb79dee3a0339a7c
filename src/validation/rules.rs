use crate::builder::SloDraft;
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, draft: &SloDraft) -> Result<()>;
}

fn slo_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$").expect("SLO name regex is valid")
    })
}

pub struct SloNameRule;

impl ValidationRule for SloNameRule {
    fn name(&self) -> &'static str {
        "SloName"
    }

    fn validate(&self, draft: &SloDraft) -> Result<()> {
        if draft.name.is_empty() {
            anyhow::bail!("SLO name cannot be empty");
        }
        if !slo_name_pattern().is_match(&draft.name) {
            anyhow::bail!(
                "SLO name '{}' must be an identifier (letters, digits, '-', '_', '.')",
                draft.name
            );
        }
        Ok(())
    }
}

pub struct SingleObjectiveRule;

impl ValidationRule for SingleObjectiveRule {
    fn name(&self) -> &'static str {
        "SingleObjective"
    }

    fn validate(&self, draft: &SloDraft) -> Result<()> {
        match draft.objectives.len() {
            0 => anyhow::bail!("objective is missing"),
            1 => Ok(()),
            n => anyhow::bail!("objective declared {} times, expected exactly once", n),
        }
    }
}

pub struct ObjectiveRangeRule;

impl ValidationRule for ObjectiveRangeRule {
    fn name(&self) -> &'static str {
        "ObjectiveRange"
    }

    fn validate(&self, draft: &SloDraft) -> Result<()> {
        let objective = draft.parse_objective()?;
        if !objective.is_finite() || !(0.0..=100.0).contains(&objective) {
            anyhow::bail!(
                "objective must be between 0 and 100, got {}",
                draft.objectives[0]
            );
        }
        Ok(())
    }
}

pub struct SliFormRule;

impl ValidationRule for SliFormRule {
    fn name(&self) -> &'static str {
        "SliForm"
    }

    fn validate(&self, draft: &SloDraft) -> Result<()> {
        if draft.sli.is_complete() {
            return Ok(());
        }
        match (&draft.sli.error_query, &draft.sli.total_query) {
            (Some(_), None) => anyhow::bail!("sli.total_query is missing for sli.error_query"),
            (None, Some(_)) => anyhow::bail!("sli.error_query is missing for sli.total_query"),
            _ => anyhow::bail!("SLI needs sli.error_query and sli.total_query, or sli.raw_query"),
        }
    }
}
