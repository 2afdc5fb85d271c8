//! Prompt templates for AI diagram generation.
//!
//! The prompt has three parts: a system message fixing the output contract
//! (PlantUML only, diagram-type-specific syntax), a context block built
//! from ranked file excerpts, and per-diagram-type instructions.

use crate::uml::{DiagramType, RankedFile};

/// Content length granted to a file whose relevance clears this threshold
/// in the focused path.
pub const HIGH_RELEVANCE_THRESHOLD: f64 = 0.7;

/// System message: fixes the assistant role and the output contract.
pub fn system_prompt(diagram_type: DiagramType) -> String {
    format!(
        "You are an expert software architect who specializes in creating concise UML diagrams. \n\
         Focus only on the most essential elements and relationships. Return ONLY valid last version of PlantUML code without any explanations.\n\
         You are generating a {diagram_type} diagram. Pay special attention to the diagram type syntax:\n\
         - For class diagrams: Use class definitions with attributes and methods, and relationship arrows\n\
         - For sequence diagrams: Use actor/participant definitions and arrows with messages between them showing time-ordered interactions\n\
         - For activity diagrams: Use start/stop nodes, activities, decisions, and transitions\n\
         - For component diagrams: Use components, interfaces, and dependencies\n\
         \n\
         Remember to use the specific PlantUML syntax required for {diagram_type} diagrams."
    )
}

/// Diagram-type-specific instructions appended after the file context.
pub fn instructions(diagram_type: DiagramType) -> &'static str {
    match diagram_type {
        DiagramType::Class => {
            "Create a concise class diagram showing only essential classes, attributes, methods, \
             and relationships. Focus on clarity over completeness."
        }
        DiagramType::Sequence => {
            "Create a sequence diagram showing key interactions between components. Be concise \
             and focus on main flow. Use proper PlantUML sequence diagram syntax with \
             participants and message arrows. DO NOT create a class diagram."
        }
        DiagramType::Activity => {
            "Create a simplified activity diagram showing the main application flow."
        }
        DiagramType::Component => {
            "Create a component diagram showing major components and dependencies only."
        }
    }
}

/// Final user message combining context and instructions.
pub fn user_prompt(context: &str, instructions: &str, diagram_type: DiagramType) -> String {
    format!(
        "{context}\n\n{instructions}\n\nCreate a minimal but accurate PlantUML {diagram_type} \
         diagram. Respond with valid PlantUML code only"
    )
}

/// Build the context block from ranked files with a flat per-file budget.
pub fn build_context(files: &[RankedFile], max_files: usize, content_length: usize) -> String {
    let mut context = String::from("Analyze these code files and create a PlantUML diagram:\n\n");
    append_file_excerpts(&mut context, files, max_files, |_| content_length);
    context
}

/// Build the context block for the focused path: the intro names the focus
/// area and highly relevant files get a larger excerpt.
pub fn build_focused_context(
    files: &[RankedFile],
    focus_phrase: &str,
    included_classes: &[String],
    max_files: usize,
    high_length: usize,
    low_length: usize,
) -> String {
    let mut context = String::from("Analyze these code files and create a PlantUML diagram");
    if !focus_phrase.is_empty() {
        context.push_str(&format!(
            " focusing specifically on the {focus_phrase} functionality"
        ));
    }
    context.push_str(":\n\n");

    append_file_excerpts(&mut context, files, max_files, |ranked| {
        if ranked.relevance_score > HIGH_RELEVANCE_THRESHOLD {
            high_length
        } else {
            low_length
        }
    });

    if !included_classes.is_empty() {
        context.push_str(&format!(
            "\nIMPORTANT: Include ONLY these classes in the diagram: {}\n\n",
            included_classes.join(", ")
        ));
    }

    context
}

fn append_file_excerpts(
    context: &mut String,
    files: &[RankedFile],
    max_files: usize,
    budget_for: impl Fn(&RankedFile) -> usize,
) {
    for ranked in files.iter().take(max_files) {
        let excerpt = truncate(&ranked.file.content, budget_for(ranked));
        context.push_str(&format!("--- {} ---\n{}\n\n", ranked.file.path, excerpt));
    }
}

/// Truncate content to at most `max_chars` characters, marking the cut.
fn truncate(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let head: String = content.chars().take(max_chars).collect();
    format!("{head}\n... (content truncated)")
}
