//! Salary bands keyed by department name.
//!
//! Departments are matched by their display name, case-insensitively. Renaming
//! a department therefore changes which band applies to its instructors.

use serde::{Deserialize, Serialize};

use crate::rules::same_text;

/// Salary band for one department category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRule {
    pub department: String,
    #[serde(default)]
    pub min: Option<u64>,
    #[serde(default)]
    pub max: Option<u64>,
}

impl SalaryRule {
    pub fn at_least(department: impl Into<String>, min: u64) -> Self {
        Self {
            department: department.into(),
            min: Some(min),
            max: None,
        }
    }

    pub fn between(department: impl Into<String>, min: u64, max: u64) -> Self {
        Self {
            department: department.into(),
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn allows(&self, salary: u64) -> bool {
        self.min.is_none_or(|min| salary >= min) && self.max.is_none_or(|max| salary <= max)
    }

    /// Human-readable reason used when the band rejects a salary.
    pub fn describe(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!(
                "{} instructors must have salary between {min} and {max}",
                self.department
            ),
            (Some(min), None) => format!(
                "{} instructors must have salary at least {min}",
                self.department
            ),
            (None, Some(max)) => format!(
                "{} instructors must have salary at most {max}",
                self.department
            ),
            (None, None) => format!("{} instructors have no salary band", self.department),
        }
    }
}

/// Ordered list of salary bands. The first rule matching a department name wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SalaryPolicy {
    rules: Vec<SalaryRule>,
}

impl SalaryPolicy {
    pub fn new(rules: Vec<SalaryRule>) -> Self {
        Self { rules }
    }

    /// No bands at all; every salary is accepted.
    pub fn unconstrained() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rules(&self) -> &[SalaryRule] {
        &self.rules
    }

    pub fn rule_for(&self, department_name: &str) -> Option<&SalaryRule> {
        self.rules
            .iter()
            .find(|r| same_text(&r.department, department_name))
    }

    /// `Err(reason)` when the department's band rejects `salary`.
    pub fn check(&self, department_name: &str, salary: u64) -> Result<(), String> {
        match self.rule_for(department_name) {
            Some(rule) if !rule.allows(salary) => Err(rule.describe()),
            _ => Ok(()),
        }
    }
}

impl Default for SalaryPolicy {
    fn default() -> Self {
        Self::new(vec![
            SalaryRule::at_least("Software Development", 10_000),
            SalaryRule::between("Human Resources", 5_000, 15_000),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn software_development_requires_ten_thousand() {
        let p = SalaryPolicy::default();
        assert!(p.check("Software Development", 8_000).is_err());
        assert!(p.check("software development", 10_000).is_ok());
        assert!(p.check("SOFTWARE DEVELOPMENT", 12_000).is_ok());
    }

    #[test]
    fn human_resources_is_bounded_on_both_sides() {
        let p = SalaryPolicy::default();
        assert!(p.check("Human Resources", 4_999).is_err());
        assert!(p.check("Human Resources", 5_000).is_ok());
        assert!(p.check("Human Resources", 15_000).is_ok());
        assert!(p.check("Human Resources", 15_001).is_err());
    }

    #[test]
    fn other_departments_are_unconstrained() {
        let p = SalaryPolicy::default();
        assert!(p.check("Physics", 1).is_ok());
        assert!(p.check("Physics", 0).is_ok());
    }

    #[test]
    fn policy_reads_from_json() {
        let p: SalaryPolicy =
            serde_json::from_str(r#"[{"department":"Research","min":20000}]"#).unwrap();
        assert!(p.check("research", 19_999).is_err());
        assert!(p.check("Software Development", 1).is_ok());
    }
}
