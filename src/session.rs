use crate::edge_ast::{Direction, Edge};
use crate::edge_parser::parse_edges;
use crate::plantuml::generate_plantuml_with;
use crate::visibility::Visibility;

/// Owns the edge list and visibility flags behind an editor surface.
///
/// Text changes rebuild everything and reset every toggle; toggles only
/// regenerate the description.
#[derive(Debug, Clone, Default)]
pub struct GraphSession {
    direction: Direction,
    edges: Vec<Edge>,
    visibility: Visibility,
}

impl GraphSession {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn set_text(&mut self, text: &str) -> String {
        self.edges = parse_edges(text);
        self.visibility = Visibility::from_edges(&self.edges);
        self.description()
    }

    /// Returns `None` without regenerating when `vertex` is unknown.
    pub fn toggle(&mut self, vertex: &str, enabled: bool) -> Option<String> {
        self.visibility
            .set(vertex, enabled)
            .then(|| self.description())
    }

    pub fn description(&self) -> String {
        generate_plantuml_with(&self.edges, &self.visibility.enabled(), self.direction)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_session_is_empty() {
        let session = GraphSession::new(Direction::TopDown);
        assert!(session.edges().is_empty());
        assert_eq!(
            session.description(),
            "@startuml\ntop to bottom direction\n@enduml\n"
        );
    }

    #[test]
    fn set_text_rebuilds_edges_and_flags() {
        let mut session = GraphSession::default();
        let out = session.set_text("A -> B\nC");
        assert_eq!(session.edges(), &[Edge::new("A", "B"), Edge::vertex("C")]);
        assert_eq!(session.visibility().len(), 3);
        assert!(out.contains("class C"));
        assert!(out.contains("A --> B"));
    }

    #[test]
    fn toggle_regenerates_without_reparsing() {
        let mut session = GraphSession::default();
        session.set_text("A -> B\nB -> C");
        let out = session.toggle("B", false).unwrap();
        assert!(!out.contains("class B"));
        assert!(!out.contains("A --> B"));
        assert!(!out.contains("B --> C"));
        assert_eq!(session.edges().len(), 2);
    }

    #[test]
    fn toggle_unknown_vertex() {
        let mut session = GraphSession::default();
        session.set_text("A -> B");
        assert_eq!(session.toggle("Z", false), None);
    }

    #[test]
    fn text_change_resets_toggles() {
        let mut session = GraphSession::default();
        session.set_text("A -> B");
        session.toggle("A", false);
        let out = session.set_text("A -> B\nB -> C");
        assert!(session.visibility().is_enabled("A"));
        assert!(out.contains("A --> B"));
    }

    #[test]
    fn direction_is_used() {
        let mut session = GraphSession::new(Direction::LeftRight);
        let out = session.set_text("A -> B");
        assert!(out.contains("left to right direction"));
    }
}
