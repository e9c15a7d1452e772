//! Document model for typeset promotional documents.
//!
//! A document is a front matter block plus ordered sections. Each section has
//! a heading and paragraphs, bullets, or both. Shape is checked once by
//! [`DocumentSpec::validate`]; the renderer trusts a validated document.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    pub title: String,
    pub subtitle: String,
    /// Running footer text, left-aligned on every page.
    pub footer: String,
    /// Line drawn after the last section.
    pub closing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    #[serde(default)]
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
}

impl Section {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            paragraphs: Vec::new(),
            bullets: Vec::new(),
        }
    }

    pub fn paragraph(mut self, text: impl Into<String>) -> Self {
        self.paragraphs.push(text.into());
        self
    }

    pub fn bullet(mut self, text: impl Into<String>) -> Self {
        self.bullets.push(text.into());
        self
    }

    /// Body blocks in render order: paragraphs first, then bullets.
    pub fn body(&self) -> SectionBody<'_> {
        match (self.paragraphs.is_empty(), self.bullets.is_empty()) {
            (false, true) => SectionBody::Paragraphs(&self.paragraphs),
            (true, false) => SectionBody::Bullets(&self.bullets),
            (false, false) => SectionBody::Both {
                paragraphs: &self.paragraphs,
                bullets: &self.bullets,
            },
            (true, true) => SectionBody::Empty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectionBody<'a> {
    Paragraphs(&'a [String]),
    Bullets(&'a [String]),
    Both {
        paragraphs: &'a [String],
        bullets: &'a [String],
    },
    /// Only reachable on an unvalidated document.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSpec {
    pub front: FrontMatter,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("document title is empty")]
    EmptyTitle,

    #[error("document has no sections")]
    NoSections,

    #[error("section {index} has an empty heading")]
    EmptyHeading { index: usize },

    #[error("section '{heading}' has neither paragraphs nor bullets")]
    EmptySection { heading: String },

    #[error("section '{heading}' contains a blank entry")]
    BlankEntry { heading: String },
}

impl DocumentSpec {
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.front.title.trim().is_empty() {
            return Err(DocumentError::EmptyTitle);
        }
        if self.sections.is_empty() {
            return Err(DocumentError::NoSections);
        }

        for (index, section) in self.sections.iter().enumerate() {
            if section.heading.trim().is_empty() {
                return Err(DocumentError::EmptyHeading { index });
            }
            if matches!(section.body(), SectionBody::Empty) {
                return Err(DocumentError::EmptySection {
                    heading: section.heading.clone(),
                });
            }
            let blank = section
                .paragraphs
                .iter()
                .chain(section.bullets.iter())
                .any(|s| s.trim().is_empty());
            if blank {
                return Err(DocumentError::BlankEntry {
                    heading: section.heading.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn sample_front() -> FrontMatter {
    FrontMatter {
        title: "Sample".into(),
        subtitle: "A short document".into(),
        footer: "Gatehouse | gatehouse.dev".into(),
        closing: "Questions? hello@gatehouse.dev".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_orders_paragraphs_before_bullets() {
        let section = Section::new("H").bullet("b1").paragraph("p1");
        match section.body() {
            SectionBody::Both { paragraphs, bullets } => {
                assert_eq!(paragraphs, ["p1".to_string()]);
                assert_eq!(bullets, ["b1".to_string()]);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_document() {
        let doc = DocumentSpec {
            front: sample_front(),
            sections: vec![Section::new("One").paragraph("text"), Section::new("Two").bullet("item")],
        };
        assert_eq!(doc.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_empty_section() {
        let doc = DocumentSpec {
            front: sample_front(),
            sections: vec![Section::new("Lonely")],
        };
        assert_eq!(
            doc.validate(),
            Err(DocumentError::EmptySection {
                heading: "Lonely".into()
            })
        );
    }

    #[test]
    fn test_validate_rejects_blank_heading_and_entries() {
        let doc = DocumentSpec {
            front: sample_front(),
            sections: vec![Section::new("  ").paragraph("x")],
        };
        assert_eq!(doc.validate(), Err(DocumentError::EmptyHeading { index: 0 }));

        let doc = DocumentSpec {
            front: sample_front(),
            sections: vec![Section::new("H").bullet("   ")],
        };
        assert!(matches!(doc.validate(), Err(DocumentError::BlankEntry { .. })));
    }

    #[test]
    fn test_validate_rejects_no_sections() {
        let doc = DocumentSpec {
            front: sample_front(),
            sections: vec![],
        };
        assert_eq!(doc.validate(), Err(DocumentError::NoSections));
    }

    #[test]
    fn test_sections_deserialize_with_optional_lists() {
        let section: Section = serde_json::from_str(r#"{"heading":"H","bullets":["a"]}"#).unwrap();
        assert!(section.paragraphs.is_empty());
        assert_eq!(section.bullets, vec!["a"]);
    }
}
