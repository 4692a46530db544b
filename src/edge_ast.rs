#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: String,
    pub target: Option<String>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: Some(target.into()),
        }
    }

    /// An isolated vertex: a line naming a source with no outgoing edge.
    pub fn vertex(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    TopDown,
    LeftRight,
}

impl Direction {
    pub fn directive(self) -> &'static str {
        match self {
            Direction::TopDown => "top to bottom direction",
            Direction::LeftRight => "left to right direction",
        }
    }
}
