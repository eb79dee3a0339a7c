use crate::builder::SloDraft;
use crate::validation::rules::{
    ObjectiveRangeRule, SingleObjectiveRule, SliFormRule, SloNameRule, ValidationRule,
};
use anyhow::Result;

pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    pub fn validate(&self, draft: &SloDraft) -> Result<()> {
        for rule in &self.rules {
            if let Err(e) = rule.validate(draft) {
                anyhow::bail!("[{}] {}", rule.name(), e);
            }
        }
        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            rules: vec![
                Box::new(SloNameRule),
                Box::new(SingleObjectiveRule),
                Box::new(ObjectiveRangeRule),
                Box::new(SliFormRule),
            ],
        }
    }
}
