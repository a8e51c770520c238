//! Prompt templates with named `{placeholder}` variables.
//!
//! Rendering is strict: every declared placeholder must be supplied and no
//! undeclared name may be supplied. `{{` and `}}` render literal braces.
//! Substitution is a single left-to-right pass, so braces inside a supplied
//! value are copied through untouched.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template '{template}' requires variable '{name}' which was not supplied")]
    MissingVariable { template: String, name: String },

    #[error("template '{template}' does not declare variable '{name}'")]
    UnknownVariable { template: String, name: String },

    #[error("template '{template}' is malformed at byte {position}: {reason}")]
    Malformed {
        template: String,
        position: usize,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A parsed prompt template. Placeholders are discovered at construction time.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: &'static str,
    segments: Vec<Segment>,
    input_variables: BTreeSet<String>,
}

impl PromptTemplate {
    pub fn new(name: &'static str, template: &str) -> Result<Self, TemplateError> {
        let segments = parse(name, template)?;
        let input_variables = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Variable(v) => Some(v.clone()),
                Segment::Literal(_) => None,
            })
            .collect();

        Ok(Self {
            name,
            segments,
            input_variables,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn input_variables(&self) -> impl Iterator<Item = &str> {
        self.input_variables.iter().map(String::as_str)
    }

    /// Substitutes every placeholder with its value from `vars`.
    pub fn render(&self, vars: &HashMap<&str, &str>) -> Result<String, TemplateError> {
        if let Some(unknown) = vars
            .keys()
            .filter(|k| !self.input_variables.contains(**k))
            .min()
        {
            return Err(TemplateError::UnknownVariable {
                template: self.name.to_string(),
                name: unknown.to_string(),
            });
        }

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(var) => {
                    let value =
                        vars.get(var.as_str())
                            .ok_or_else(|| TemplateError::MissingVariable {
                                template: self.name.to_string(),
                                name: var.clone(),
                            })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

fn parse(name: &str, template: &str) -> Result<Vec<Segment>, TemplateError> {
    let malformed = |position: usize, reason: &'static str| TemplateError::Malformed {
        template: name.to_string(),
        position,
        reason,
    };

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                literal.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut var = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    var.push(c);
                }
                if !closed {
                    return Err(malformed(pos, "unclosed placeholder"));
                }
                if var.is_empty() || !var.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    return Err(malformed(pos, "placeholder names must be [A-Za-z0-9_]+"));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(var));
            }
            '}' => return Err(malformed(pos, "unmatched '}'")),
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(pairs: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_render_substitutes_all_placeholders() {
        let t = PromptTemplate::new("t", "Role: {role}. Skills: {skills}. Again: {role}").unwrap();
        let out = t
            .render(&vars(&[("role", "ML Engineer"), ("skills", "Python, SQL")]))
            .unwrap();
        assert_eq!(out, "Role: ML Engineer. Skills: Python, SQL. Again: ML Engineer");
    }

    #[test]
    fn test_input_variables_discovered() {
        let t = PromptTemplate::new("t", "{b} and {a} and {b}").unwrap();
        let names: Vec<&str> = t.input_variables().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_variable() {
        let t = PromptTemplate::new("gap", "{target_role} / {skills}").unwrap();
        let err = t.render(&vars(&[("target_role", "x")])).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingVariable {
                template: "gap".to_string(),
                name: "skills".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let t = PromptTemplate::new("plan", "{gap_analysis}").unwrap();
        let err = t
            .render(&vars(&[("gap_analysis", "x"), ("extra", "y")]))
            .unwrap_err();
        assert!(matches!(err, TemplateError::UnknownVariable { ref name, .. } if name == "extra"));
    }

    #[test]
    fn test_escaped_braces_render_literally() {
        let t = PromptTemplate::new("t", "Return {{\"k\": \"{v}\"}}").unwrap();
        assert_eq!(t.input_variables().count(), 1);
        assert_eq!(t.render(&vars(&[("v", "1")])).unwrap(), "Return {\"k\": \"1\"}");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let t = PromptTemplate::new("t", "A {x} B").unwrap();
        assert_eq!(t.render(&vars(&[("x", "{x} {y}")])).unwrap(), "A {x} {y} B");
    }

    #[test]
    fn test_template_without_placeholders() {
        let t = PromptTemplate::new("t", "plain text").unwrap();
        assert_eq!(t.render(&HashMap::new()).unwrap(), "plain text");
    }

    #[test]
    fn test_unclosed_placeholder_is_malformed() {
        let err = PromptTemplate::new("t", "hello {name").unwrap_err();
        assert!(matches!(err, TemplateError::Malformed { position: 6, .. }));
    }

    #[test]
    fn test_stray_closing_brace_is_malformed() {
        assert!(PromptTemplate::new("t", "oops }").is_err());
    }

    #[test]
    fn test_invalid_placeholder_name() {
        assert!(PromptTemplate::new("t", "{not valid}").is_err());
        assert!(PromptTemplate::new("t", "{}").is_err());
    }

    #[test]
    fn test_unicode_literals_preserved() {
        let t = PromptTemplate::new("t", "2–4 tasks for {who} ✓").unwrap();
        assert_eq!(t.render(&vars(&[("who", "you")])).unwrap(), "2–4 tasks for you ✓");
    }
}
