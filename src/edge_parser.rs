use winnow::combinator::{alt, separated};
use winnow::prelude::*;
use winnow::token::{rest, take_until};

use crate::edge_ast::Edge;

const ARROW: &str = "->";

/// Parse free-form edge text, one `source -> target` or bare `vertex` per line.
///
/// Never fails: blank lines and lines that do not split into one or two
/// pieces on `->` are dropped, so `A -> B -> C` contributes nothing.
pub fn parse_edges(text: &str) -> Vec<Edge> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Edge> {
    let pieces = line_pieces.parse(line).ok()?;
    match pieces.as_slice() {
        [source] => {
            let source = source.trim();
            (!source.is_empty()).then(|| Edge::vertex(source))
        }
        [source, target] => {
            let source = source.trim();
            let target = target.trim();
            // `-> B` names no source; unlike a bare `B` it declares nothing.
            if source.is_empty() {
                None
            } else if target.is_empty() {
                Some(Edge::vertex(source))
            } else {
                Some(Edge::new(source, target))
            }
        }
        _ => None,
    }
}

fn line_pieces<'s>(input: &mut &'s str) -> winnow::Result<Vec<&'s str>> {
    separated(1.., piece, ARROW).parse_next(input)
}

fn piece<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    alt((take_until(0.., ARROW), rest)).parse_next(input)
}
