//! Heuristic source-unit extraction.
//!
//! This is a best-effort regex extractor, not a syntactic parser: it scans
//! for single-line field declarations, method signatures, and
//! `extends`/`implements` clauses in Java-like source text. It will
//! mis-extract nested braces, multi-line signatures, generics, and lambda
//! bodies; downstream behavior depends on exactly these semantics, so do not
//! silently upgrade its accuracy (a future AST-based extractor would be a
//! separate variant).
//!
//! The class name comes from the file name, never from the content. This is
//! a deliberate simplification: one file maps to at most one class.

use once_cell::sync::Lazy;
use regex::Regex;

/// Member visibility in a class body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
    Protected,
    /// No modifier present (Java package-default).
    Package,
}

impl Visibility {
    fn from_keyword(keyword: Option<&str>) -> Self {
        match keyword {
            Some("public") => Visibility::Public,
            Some("private") => Visibility::Private,
            Some("protected") => Visibility::Protected,
            _ => Visibility::Package,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Package => "package",
        }
    }
}

/// A field declaration extracted from a class body.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub visibility: Visibility,
    pub type_name: String,
    pub name: String,
}

/// A method signature extracted from a class body. The parameter list is
/// kept verbatim, not decomposed.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub visibility: Visibility,
    pub return_type: String,
    pub name: String,
    pub params: String,
}

/// The parse result of one source file: a class with its members.
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    pub methods: Vec<MethodDescriptor>,
}

/// Kinds of relationships between classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// "has-a", derived from a non-builtin field type.
    Association,
    /// `extends`
    Inheritance,
    /// `implements`
    Realization,
}

impl RelationKind {
    /// The PlantUML arrow token for this relationship.
    pub fn arrow(&self) -> &'static str {
        match self {
            RelationKind::Association => "-->",
            RelationKind::Inheritance => "--|>",
            RelationKind::Realization => "..|>",
        }
    }
}

/// A directed relationship between two named classes or types.
#[derive(Debug, Clone)]
pub struct RelationshipEdge {
    pub from: String,
    pub to: String,
    pub kind: RelationKind,
}

/// Result of parsing a single source file.
#[derive(Debug, Clone, Default)]
pub struct ParsedUnit {
    pub class: Option<ClassDescriptor>,
    pub relationships: Vec<RelationshipEdge>,
}

/// Builtin/primitive types that never produce association edges.
/// Exact-case match against the Java canonical spellings.
const BUILTIN_TYPES: &[&str] = &[
    "String", "int", "boolean", "float", "double", "void", "byte", "short", "long", "char",
];

static SOURCE_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(java|ts|js)$").expect("extension pattern must compile"));

static FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(private|public|protected)?\s+(\w+)\s+(\w+)\s*;").expect("field pattern must compile")
});

static METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(private|public|protected)?\s+(\w+)\s+(\w+)\s*\((.*?)\)\s*\{")
        .expect("method pattern must compile")
});

static EXTENDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"class\s+(\w+)\s+extends\s+(\w+)").expect("extends pattern must compile")
});

static IMPLEMENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"class\s+(\w+)(?:\s+extends\s+\w+)?\s+implements\s+([\w,\s]+)")
        .expect("implements pattern must compile")
});

/// Extract a class descriptor and relationship edges from one source file.
///
/// Never fails: regex non-matches simply produce empty result sets. Empty
/// content yields no class descriptor at all.
pub fn parse(file_name: &str, content: &str) -> ParsedUnit {
    if content.is_empty() {
        return ParsedUnit::default();
    }

    let class_name = SOURCE_EXTENSION.replace(file_name, "").into_owned();

    let mut fields = Vec::new();
    let mut relationships = Vec::new();

    for caps in FIELD.captures_iter(content) {
        let visibility = Visibility::from_keyword(caps.get(1).map(|m| m.as_str()));
        let type_name = caps[2].to_string();
        let name = caps[3].to_string();

        if !BUILTIN_TYPES.contains(&type_name.as_str()) {
            relationships.push(RelationshipEdge {
                from: class_name.clone(),
                to: type_name.clone(),
                kind: RelationKind::Association,
            });
        }

        fields.push(FieldDescriptor {
            visibility,
            type_name,
            name,
        });
    }

    let mut methods = Vec::new();
    for caps in METHOD.captures_iter(content) {
        methods.push(MethodDescriptor {
            visibility: Visibility::from_keyword(caps.get(1).map(|m| m.as_str())),
            return_type: caps[2].to_string(),
            name: caps[3].to_string(),
            params: caps[4].trim().to_string(),
        });
    }

    // First match only: one inheritance edge per file at most. The endpoint
    // names come from the content here, not from the file name.
    if let Some(caps) = EXTENDS.captures(content) {
        relationships.push(RelationshipEdge {
            from: caps[1].to_string(),
            to: caps[2].to_string(),
            kind: RelationKind::Inheritance,
        });
    }

    if let Some(caps) = IMPLEMENTS.captures(content) {
        let from = caps[1].to_string();
        for interface in caps[2].split(',') {
            let interface = interface.trim();
            if interface.is_empty() {
                continue;
            }
            relationships.push(RelationshipEdge {
                from: from.clone(),
                to: interface.to_string(),
                kind: RelationKind::Realization,
            });
        }
    }

    ParsedUnit {
        class: Some(ClassDescriptor {
            name: class_name,
            fields,
            methods,
        }),
        relationships,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name_from_file_name() {
        let unit = parse("Customer.java", "class Customer {}");
        assert_eq!(unit.class.unwrap().name, "Customer");
    }

    #[test]
    fn test_class_name_keeps_unrecognized_extension() {
        let unit = parse("Customer.py", "x");
        assert_eq!(unit.class.unwrap().name, "Customer.py");
    }

    #[test]
    fn test_empty_content_yields_no_class() {
        let unit = parse("Customer.java", "");
        assert!(unit.class.is_none());
        assert!(unit.relationships.is_empty());
    }

    #[test]
    fn test_field_extraction() {
        let content = "class Customer {\n  private String name;\n  public int age;\n}";
        let unit = parse("Customer.java", content);
        let class = unit.class.unwrap();

        assert_eq!(class.fields.len(), 2);
        assert_eq!(class.fields[0].visibility, Visibility::Private);
        assert_eq!(class.fields[0].type_name, "String");
        assert_eq!(class.fields[0].name, "name");
        assert_eq!(class.fields[1].visibility, Visibility::Public);
        assert_eq!(class.fields[1].type_name, "int");
    }

    #[test]
    fn test_field_without_modifier_defaults_to_package() {
        let content = "class Customer {\n  String name;\n}";
        let unit = parse("Customer.java", content);
        let class = unit.class.unwrap();
        assert_eq!(class.fields.len(), 1);
        assert_eq!(class.fields[0].visibility, Visibility::Package);
    }

    #[test]
    fn test_builtin_field_type_produces_no_association() {
        let unit = parse("Customer.java", "class Customer {\n  private String name;\n}");
        assert!(unit.relationships.is_empty());
        assert_eq!(unit.class.unwrap().fields.len(), 1);
    }

    #[test]
    fn test_non_builtin_field_type_produces_association() {
        let unit = parse("Customer.java", "class Customer {\n  private Account owner;\n}");
        let class = unit.class.unwrap();
        assert_eq!(class.fields.len(), 1);

        assert_eq!(unit.relationships.len(), 1);
        let edge = &unit.relationships[0];
        assert_eq!(edge.from, "Customer");
        assert_eq!(edge.to, "Account");
        assert_eq!(edge.kind, RelationKind::Association);
    }

    #[test]
    fn test_builtin_match_is_case_sensitive() {
        // "string" is not the canonical spelling, so it counts as a class type
        let unit = parse("Customer.java", "class Customer {\n  private string name;\n}");
        assert_eq!(unit.relationships.len(), 1);
        assert_eq!(unit.relationships[0].to, "string");
    }

    #[test]
    fn test_method_extraction() {
        let content = "class Account {\n  public void deposit(int amount) {\n  }\n}";
        let unit = parse("Account.java", content);
        let class = unit.class.unwrap();

        assert_eq!(class.methods.len(), 1);
        let method = &class.methods[0];
        assert_eq!(method.visibility, Visibility::Public);
        assert_eq!(method.return_type, "void");
        assert_eq!(method.name, "deposit");
        assert_eq!(method.params, "int amount");
    }

    #[test]
    fn test_method_params_kept_verbatim() {
        let content = "class A {\n  private int sum(int a, int b) {\n}";
        let unit = parse("A.java", content);
        let class = unit.class.unwrap();
        assert_eq!(class.methods[0].params, "int a, int b");
    }

    #[test]
    fn test_inheritance_extraction() {
        let unit = parse("Dog.java", "class Dog extends Animal {}");
        assert_eq!(unit.relationships.len(), 1);
        let edge = &unit.relationships[0];
        assert_eq!(edge.from, "Dog");
        assert_eq!(edge.to, "Animal");
        assert_eq!(edge.kind, RelationKind::Inheritance);
    }

    #[test]
    fn test_inheritance_and_realization_together() {
        let content = "class Dog extends Animal implements Runnable, Comparable";
        let unit = parse("Dog.java", content);

        let inheritance: Vec<_> = unit
            .relationships
            .iter()
            .filter(|e| e.kind == RelationKind::Inheritance)
            .collect();
        assert_eq!(inheritance.len(), 1);
        assert_eq!(inheritance[0].to, "Animal");

        let realizations: Vec<_> = unit
            .relationships
            .iter()
            .filter(|e| e.kind == RelationKind::Realization)
            .collect();
        assert_eq!(realizations.len(), 2);
        assert_eq!(realizations[0].from, "Dog");
        assert_eq!(realizations[0].to, "Runnable");
        assert_eq!(realizations[1].to, "Comparable");
    }

    #[test]
    fn test_first_extends_match_only() {
        let content = "class A extends B {}\nclass C extends D {}";
        let unit = parse("A.java", content);
        let inheritance: Vec<_> = unit
            .relationships
            .iter()
            .filter(|e| e.kind == RelationKind::Inheritance)
            .collect();
        assert_eq!(inheritance.len(), 1);
        assert_eq!(inheritance[0].from, "A");
    }

    #[test]
    fn test_garbage_content_never_panics() {
        let unit = parse("Weird.java", "{{{;;;(((}}}\u{1F600} ;; class ;;");
        assert!(unit.class.is_some());
    }
}
