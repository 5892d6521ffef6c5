//! Check Pass - Coverage Report for Parsed Libraries
//!
//! Rules produce structured violations.
//! The report is valid unless some violation is an error.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::monster::{Library, MonsterRecord};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    /// Name of the offending monster, possibly empty.
    pub monster: String,
    pub message: String,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub library: String,
    pub valid: bool,
    pub monsters: usize,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    pub fn by_rule(&self, rule: &str) -> Vec<&ValidationViolation> {
        self.violations.iter().filter(|v| v.rule == rule).collect()
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    /// `index` is the monster's position in `library`.
    fn validate(&self, monster: &MonsterRecord, index: usize, library: &Library) -> Vec<ValidationViolation>;
}

fn violation(
    rule: &dyn ValidationRule,
    severity: ViolationSeverity,
    monster: &MonsterRecord,
    message: String,
    remediation: &str,
) -> ValidationViolation {
    ValidationViolation {
        rule: rule.name().to_string(),
        severity,
        monster: monster.name.clone(),
        message,
        remediation: vec![remediation.to_string()],
    }
}

// --- Concrete Rules ---

pub struct UnrecognizedFieldsRule;

impl ValidationRule for UnrecognizedFieldsRule {
    fn name(&self) -> &'static str { "unrecognized_fields" }

    fn validate(&self, monster: &MonsterRecord, _index: usize, _library: &Library) -> Vec<ValidationViolation> {
        if monster.unrecognized.is_empty() {
            return vec![];
        }
        let tags: Vec<_> = monster.unrecognized.iter().map(|f| f.tag.as_str()).collect();
        vec![violation(
            self,
            ViolationSeverity::Warning,
            monster,
            format!("Unparsed data in <{}>", tags.join(">, <")),
            "Map the tags to a field or drop them from the document",
        )]
    }
}

pub struct MissingNameRule;

impl ValidationRule for MissingNameRule {
    fn name(&self) -> &'static str { "missing_name" }

    fn validate(&self, monster: &MonsterRecord, index: usize, _library: &Library) -> Vec<ValidationViolation> {
        if !monster.name.trim().is_empty() {
            return vec![];
        }
        vec![violation(
            self,
            ViolationSeverity::Error,
            monster,
            format!("Monster #{} has no name", index + 1),
            "Add a <name> element",
        )]
    }
}

pub struct DuplicateNameRule;

impl ValidationRule for DuplicateNameRule {
    fn name(&self) -> &'static str { "duplicate_name" }

    fn validate(&self, monster: &MonsterRecord, index: usize, library: &Library) -> Vec<ValidationViolation> {
        if monster.name.is_empty() {
            return vec![];
        }
        let earlier = library.monsters[..index].iter().any(|m| m.name == monster.name);
        if !earlier {
            return vec![];
        }
        vec![violation(
            self,
            ViolationSeverity::Error,
            monster,
            format!("Monster #{} repeats the name {:?}; lookups return the first", index + 1, monster.name),
            "Rename or remove the duplicate entry",
        )]
    }
}

pub struct AbilityScoreRule;

impl ValidationRule for AbilityScoreRule {
    fn name(&self) -> &'static str { "ability_scores" }

    fn validate(&self, monster: &MonsterRecord, _index: usize, _library: &Library) -> Vec<ValidationViolation> {
        let odd: Vec<_> = monster
            .ability_scores()
            .iter()
            .filter(|(_, score)| score.trim().parse::<i32>().is_err())
            .map(|(short, score)| format!("{}={:?}", short, score))
            .collect();
        if odd.is_empty() {
            return vec![];
        }
        vec![violation(
            self,
            ViolationSeverity::Info,
            monster,
            format!("Non-numeric ability scores shown without modifier: {}", odd.join(", ")),
            "Use a plain integer score",
        )]
    }
}

/// Validator runs every rule over every monster of a library
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(MissingNameRule),
                Box::new(DuplicateNameRule),
                Box::new(UnrecognizedFieldsRule),
                Box::new(AbilityScoreRule),
            ],
        }
    }

    pub fn with_rules(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    pub fn validate(&self, library: &Library) -> ValidationReport {
        let mut violations = vec![];

        for (index, monster) in library.monsters.iter().enumerate() {
            for rule in &self.rules {
                violations.extend(rule.validate(monster, index, library));
            }
        }

        for v in violations.iter().filter(|v| v.severity != ViolationSeverity::Info) {
            warn!("Monster {:?} [{}]: {}", v.monster, v.rule, v.message);
        }

        let mut report = ValidationReport {
            library: library.display_name(),
            valid: true,
            monsters: library.len(),
            violations,
        };
        report.valid = !report.has_errors();
        report
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
