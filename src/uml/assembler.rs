//! Deterministic class-diagram assembly.
//!
//! Folds per-file parse results into one PlantUML document. Classes are
//! deduplicated by name with last-write-wins semantics while keeping their
//! first insertion position; relationship edges are accumulated as-is, with
//! duplicates across files preserved as separate lines.

use std::fmt::Write as _;

use crate::uml::normalizer::normalize;
use crate::uml::parser::{self, ClassDescriptor, RelationshipEdge};
use crate::uml::SourceFile;

/// Fixed document header: title plus class styling directives.
const HEADER: &str = "title Class Diagram\n\n\
                      skinparam class {\n  \
                      BackgroundColor White\n  \
                      ArrowColor Black\n  \
                      BorderColor Black\n\
                      }\n";

/// Assemble a class diagram from source files in input order.
///
/// Files with empty content are skipped. The result is always passed
/// through the normalizer, so it is well-formed even when no file yields a
/// class.
pub fn assemble(files: &[SourceFile]) -> String {
    let mut classes: Vec<ClassDescriptor> = Vec::new();
    let mut relationships: Vec<RelationshipEdge> = Vec::new();

    for file in files {
        if file.content.is_empty() {
            tracing::debug!("Skipping {}: empty content", file.name);
            continue;
        }

        let unit = parser::parse(&file.name, &file.content);

        if let Some(class) = unit.class {
            // Last write wins on duplicate names, keeping the original slot.
            match classes.iter_mut().find(|c| c.name == class.name) {
                Some(existing) => *existing = class,
                None => classes.push(class),
            }
        }
        relationships.extend(unit.relationships);
    }

    let mut document = format!("@startuml\n\n{HEADER}\n");

    for class in &classes {
        let _ = writeln!(document, "class {} {{", class.name);
        for field in &class.fields {
            let _ = writeln!(
                document,
                "  {} {}: {}",
                field.visibility.as_str(),
                field.name,
                field.type_name
            );
        }
        for method in &class.methods {
            let _ = writeln!(
                document,
                "  {} {}({}): {}",
                method.visibility.as_str(),
                method.name,
                method.params,
                method.return_type
            );
        }
        document.push_str("}\n\n");
    }

    for edge in &relationships {
        let _ = writeln!(document, "{} {} {}", edge.from, edge.kind.arrow(), edge.to);
    }

    document.push_str("@enduml");
    normalize(&document)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content: &str) -> SourceFile {
        SourceFile {
            name: name.to_string(),
            path: format!("src/{name}"),
            content: content.to_string(),
            size: content.len() as u64,
        }
    }

    #[test]
    fn test_empty_input_yields_valid_document() {
        let document = assemble(&[]);
        assert!(document.starts_with("@startuml\n"));
        assert!(document.ends_with("\n@enduml"));
        assert!(document.contains("title Class Diagram"));
    }

    #[test]
    fn test_class_block_rendering() {
        let document = assemble(&[file(
            "Customer.java",
            "class Customer {\n  private String name;\n  public void rename(String next) {\n}",
        )]);

        assert!(document.contains("class Customer {"));
        assert!(document.contains("  private name: String"));
        assert!(document.contains("  public rename(String next): void"));
    }

    #[test]
    fn test_association_edge_rendering() {
        let document = assemble(&[file(
            "Customer.java",
            "class Customer {\n  private Account owner;\n}",
        )]);

        assert!(document.contains("Customer --> Account"));
    }

    #[test]
    fn test_inheritance_and_realization_edges() {
        let document = assemble(&[file(
            "Dog.java",
            "class Dog extends Animal implements Runnable, Comparable {}",
        )]);

        assert!(document.contains("Dog --|> Animal"));
        assert!(document.contains("Dog ..|> Runnable"));
        assert!(document.contains("Dog ..|> Comparable"));
    }

    #[test]
    fn test_duplicate_class_names_last_write_wins() {
        let document = assemble(&[
            file("Foo.java", "class Foo {\n  private String first;\n}"),
            file("Foo.ts", "class Foo {\n  private String second;\n}"),
        ]);

        assert_eq!(document.matches("class Foo {").count(), 1);
        assert!(!document.contains("first"));
        assert!(document.contains("second"));
    }

    #[test]
    fn test_duplicate_edges_are_preserved() {
        let content = "class A {\n  private Account x;\n}";
        let document = assemble(&[file("A.java", content), file("A.ts", content)]);

        // Same class (deduplicated) but both association lines survive.
        assert_eq!(document.matches("class A {").count(), 1);
        assert_eq!(document.matches("A --> Account").count(), 2);
    }

    #[test]
    fn test_empty_content_files_are_skipped() {
        let document = assemble(&[
            file("Empty.java", ""),
            file("Real.java", "class Real {\n  private int x;\n}"),
        ]);

        assert!(!document.contains("class Empty"));
        assert!(document.contains("class Real {"));
    }

    #[test]
    fn test_class_order_follows_input_order() {
        let document = assemble(&[
            file("B.java", "class B {}"),
            file("A.java", "class A {}"),
        ]);

        let b_pos = document.find("class B").unwrap();
        let a_pos = document.find("class A").unwrap();
        assert!(b_pos < a_pos);
    }
}
