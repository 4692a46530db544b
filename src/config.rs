use std::path::PathBuf;

use crate::edge_ast::Direction;
use crate::render::{OutputFormat, PlantUmlCommand};

pub const DEFAULT_PLANTUML: &str = "plantuml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub plantuml: PathBuf,
    pub format: OutputFormat,
    pub direction: Direction,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            plantuml: PathBuf::from(DEFAULT_PLANTUML),
            format: OutputFormat::default(),
            direction: Direction::default(),
        }
    }
}

impl RenderConfig {
    pub fn renderer(&self) -> PlantUmlCommand {
        PlantUmlCommand::new(self.plantuml.clone(), self.format)
    }
}
