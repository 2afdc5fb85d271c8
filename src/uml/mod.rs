//! PlantUML diagram generation pipeline.
//!
//! Two paths produce a diagram document from a set of repository files:
//! 1. **Deterministic**: per-file regex extraction ([`parser`]) folded into a
//!    single class diagram ([`assembler`]).
//! 2. **AI-assisted**: files ranked by relevance ([`ranker`]) feed a
//!    chat-completion prompt; the raw response is repaired by [`normalizer`].
//!
//! Both paths end in [`normalizer::normalize`], which guarantees a
//! well-formed `@startuml`/`@enduml` document, and [`encoder`], which turns
//! it into a PlantUML server URL.

pub mod assembler;
pub mod encoder;
pub mod normalizer;
pub mod parser;
pub mod ranker;

use serde::{Deserialize, Serialize};

/// A source file retrieved from a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// File name including extension (e.g. `Customer.java`).
    pub name: String,
    /// Path relative to the repository root.
    pub path: String,
    /// Full text content.
    pub content: String,
    /// Size in bytes as reported by the hosting provider.
    #[serde(default)]
    pub size: u64,
}

/// A source file annotated with a relevance score in `[0.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct RankedFile {
    pub file: SourceFile,
    pub relevance_score: f64,
}

/// Types of UML diagrams that can be requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramType {
    /// Classes, attributes, methods, and relationships
    #[default]
    Class,
    /// Time-ordered interactions between components
    Sequence,
    /// Main application flow with decisions and transitions
    Activity,
    /// Major components and their dependencies
    Component,
}

impl DiagramType {
    /// Returns the string identifier for this diagram type (used on the wire)
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramType::Class => "class",
            DiagramType::Sequence => "sequence",
            DiagramType::Activity => "activity",
            DiagramType::Component => "component",
        }
    }
}

impl std::fmt::Display for DiagramType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagram_type_as_str() {
        assert_eq!(DiagramType::Class.as_str(), "class");
        assert_eq!(DiagramType::Sequence.as_str(), "sequence");
        assert_eq!(DiagramType::Activity.as_str(), "activity");
        assert_eq!(DiagramType::Component.as_str(), "component");
    }

    #[test]
    fn test_diagram_type_default_is_class() {
        assert_eq!(DiagramType::default(), DiagramType::Class);
    }

    #[test]
    fn test_diagram_type_deserializes_from_lowercase() {
        let parsed: DiagramType = serde_json::from_str("\"sequence\"").unwrap();
        assert_eq!(parsed, DiagramType::Sequence);
    }

    #[test]
    fn test_source_file_size_defaults_to_zero() {
        let json = r#"{"name": "A.java", "path": "src/A.java", "content": "class A {}"}"#;
        let file: SourceFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.size, 0);
    }
}
