pub mod config;
pub mod coordinator;
pub mod edge_ast;
pub mod edge_parser;
pub mod plantuml;
pub mod render;
pub mod session;
pub mod visibility;

pub use coordinator::{RenderCoordinator, RenderOutcome, RenderSink, RequestId};
pub use edge_ast::{Direction, Edge};
pub use edge_parser::parse_edges;
pub use plantuml::{generate_plantuml, generate_plantuml_with};
pub use render::{OutputFormat, PlantUmlCommand, RenderError, RenderedImage, Renderer};
pub use session::GraphSession;
pub use visibility::{Visibility, derive_vertices};

/// Parse edge text and describe it with every vertex visible.
pub fn describe(input: &str) -> String {
    describe_with(input, Direction::TopDown)
}

pub fn describe_with(input: &str, direction: Direction) -> String {
    let edges = parse_edges(input);
    generate_plantuml_with(&edges, &derive_vertices(&edges), direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_empty_input() {
        let output = describe("");
        assert!(output.starts_with("@startuml\n"));
        assert!(output.ends_with("@enduml\n"));
        assert!(!output.contains("class"));
    }

    #[test]
    fn describe_enables_every_vertex() {
        let output = describe("A -> B\nC");
        assert!(output.contains("class A"));
        assert!(output.contains("class B"));
        assert!(output.contains("class C"));
        assert!(output.contains("A --> B"));
    }

    #[test]
    fn describe_ignores_malformed_lines() {
        let output = describe("A -> B -> C\n");
        assert!(!output.contains("class"));
    }
}
