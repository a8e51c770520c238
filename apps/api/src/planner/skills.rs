//! Submission inputs: the comma-separated skill list and the memo key built from it.

use serde::Serialize;

use crate::errors::AppError;

/// Ordered, trimmed, non-empty skills. Casing and duplicates are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SkillSet(Vec<String>);

impl SkillSet {
    /// Splits on commas, trims each segment and drops empty ones.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Form substituted into the stage 1 prompt.
    pub fn to_prompt_value(&self) -> String {
        self.0.join(", ")
    }
}

/// Memoization key. Two keys are equal iff the role strings are identical and
/// the skill sequences match in content and order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    target_role: String,
    skills: SkillSet,
}

impl RequestKey {
    /// Validates raw form inputs. Rejects a blank role, a blank skills field, and a
    /// skills field that contains only separators.
    pub fn from_inputs(target_role: &str, skills_input: &str) -> Result<Self, AppError> {
        if target_role.trim().is_empty() || skills_input.trim().is_empty() {
            return Err(AppError::Validation(
                "Please provide both target role and skills.".to_string(),
            ));
        }

        let skills = SkillSet::parse(skills_input);
        if skills.is_empty() {
            return Err(AppError::Validation(
                "skills must contain at least one non-empty entry".to_string(),
            ));
        }

        Ok(Self {
            target_role: target_role.to_string(),
            skills,
        })
    }

    pub fn target_role(&self) -> &str {
        &self.target_role
    }

    pub fn skills(&self) -> &SkillSet {
        &self.skills
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_drops_empty_segments() {
        let skills = SkillSet::parse(" Python, , NumPy ,Pandas");
        assert_eq!(skills.as_slice(), ["Python", "NumPy", "Pandas"]);
    }

    #[test]
    fn test_parse_keeps_duplicates_and_casing() {
        let skills = SkillSet::parse("sql, SQL, sql");
        assert_eq!(skills.as_slice(), ["sql", "SQL", "sql"]);
    }

    #[test]
    fn test_parse_only_separators_is_empty() {
        assert!(SkillSet::parse(" , ,, ").is_empty());
    }

    #[test]
    fn test_prompt_value_joins_in_order() {
        assert_eq!(SkillSet::parse("Python,SQL").to_prompt_value(), "Python, SQL");
    }

    #[test]
    fn test_skill_set_serializes_as_array() {
        let json = serde_json::to_value(SkillSet::parse("Rust, Go")).unwrap();
        assert_eq!(json, serde_json::json!(["Rust", "Go"]));
    }

    #[test]
    fn test_key_rejects_blank_role() {
        assert!(matches!(
            RequestKey::from_inputs("", "Python"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            RequestKey::from_inputs("   \t", "Python"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_key_rejects_blank_or_separator_only_skills() {
        assert!(RequestKey::from_inputs("ML Engineer", "  ").is_err());
        assert!(RequestKey::from_inputs("ML Engineer", ", ,").is_err());
    }

    #[test]
    fn test_key_equality_is_order_sensitive() {
        let a = RequestKey::from_inputs("ML Engineer", "Python, SQL").unwrap();
        let b = RequestKey::from_inputs("ML Engineer", "Python,SQL ").unwrap();
        let c = RequestKey::from_inputs("ML Engineer", "SQL, Python").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_key_role_compared_verbatim() {
        let a = RequestKey::from_inputs("ML Engineer", "Python").unwrap();
        let b = RequestKey::from_inputs("ml engineer", "Python").unwrap();
        let c = RequestKey::from_inputs("ML Engineer ", "Python").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(c.target_role(), "ML Engineer ");
    }
}
