use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use crate::edge_ast::{Direction, Edge};

pub const START: &str = "@startuml";
pub const END: &str = "@enduml";

/// Build a PlantUML class diagram with the default top-to-bottom layout.
pub fn generate_plantuml(edges: &[Edge], enabled: &BTreeSet<String>) -> String {
    generate_plantuml_with(edges, enabled, Direction::TopDown)
}

/// Build a PlantUML class diagram.
///
/// Every enabled vertex is declared in sorted order, then every edge whose
/// endpoints are both enabled becomes a `-->` connection in input order.
/// Edges without a target never produce a connection.
pub fn generate_plantuml_with(
    edges: &[Edge],
    enabled: &BTreeSet<String>,
    direction: Direction,
) -> String {
    let ids = identifiers(enabled);
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{START}");
    let _ = writeln!(out, "{}", direction.directive());

    for (vertex, id) in &ids {
        if is_plain(vertex) {
            let _ = writeln!(out, "class {vertex}");
        } else {
            let _ = writeln!(out, "class \"{}\" as {id}", escape(vertex));
        }
    }

    for edge in edges {
        let Some(target) = edge.target.as_deref() else {
            continue;
        };
        if let (Some(from), Some(to)) = (ids.get(edge.source.as_str()), ids.get(target)) {
            let _ = writeln!(out, "{from} --> {to}");
        }
    }

    let _ = writeln!(out, "{END}");
    out
}

/// Identifier used for each enabled vertex in connection lines.
///
/// Plain names stand for themselves. Anything else, including dotted names
/// PlantUML would split into packages, gets a `vN` alias that no plain
/// vertex already uses.
fn identifiers(enabled: &BTreeSet<String>) -> BTreeMap<&str, Cow<'_, str>> {
    let mut next = 0usize;
    enabled
        .iter()
        .map(|vertex| {
            if is_plain(vertex) {
                return (vertex.as_str(), Cow::Borrowed(vertex.as_str()));
            }
            let alias = loop {
                next += 1;
                let alias = format!("v{next}");
                if !enabled.contains(&alias) {
                    break alias;
                }
            };
            (vertex.as_str(), Cow::Owned(alias))
        })
        .collect()
}

fn is_plain(vertex: &str) -> bool {
    vertex.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn escape(vertex: &str) -> String {
    vertex.replace('\\', "\\\\").replace('"', "\\\"")
}
