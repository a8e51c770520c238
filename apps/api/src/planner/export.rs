//! Download variants of a generated plan. Both formats carry the plan text
//! byte-for-byte; only the file name and content type differ.

use std::str::FromStr;

use crate::errors::AppError;
use crate::planner::chain::LearningPlan;

const FILE_STEM: &str = "30_day_learning_plan";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Text,
    Markdown,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Markdown => "md",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain; charset=utf-8",
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
        }
    }

    pub fn file_name(self) -> String {
        format!("{FILE_STEM}.{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Text),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            other => Err(AppError::Validation(format!(
                "unsupported export format '{other}' (expected 'txt' or 'md')"
            ))),
        }
    }
}

/// A ready-to-serve download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

impl ExportFile {
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}

pub fn export_plan(plan: &LearningPlan, format: ExportFormat) -> ExportFile {
    ExportFile {
        file_name: format.file_name(),
        content_type: format.mime_type(),
        body: plan.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_aliases() {
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("TEXT".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!(" Markdown ".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_default_is_text() {
        assert_eq!(ExportFormat::default(), ExportFormat::Text);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(ExportFormat::Text.file_name(), "30_day_learning_plan.txt");
        assert_eq!(ExportFormat::Markdown.file_name(), "30_day_learning_plan.md");
    }

    #[test]
    fn test_mime_types_declare_utf8() {
        assert_eq!(ExportFormat::Text.mime_type(), "text/plain; charset=utf-8");
        assert_eq!(
            ExportFormat::Markdown.mime_type(),
            "text/markdown; charset=utf-8"
        );
    }

    #[test]
    fn test_content_disposition() {
        let file = ExportFile {
            file_name: ExportFormat::Markdown.file_name(),
            content_type: ExportFormat::Markdown.mime_type(),
            body: String::new(),
        };
        assert_eq!(
            file.content_disposition(),
            "attachment; filename=\"30_day_learning_plan.md\""
        );
    }
}
