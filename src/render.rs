use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to start renderer `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("renderer i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("renderer exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
    #[error("renderer produced no output")]
    NoOutput,
}

/// Turns a diagram description into an image.
pub trait Renderer {
    fn render(&self, description: &str) -> Result<RenderedImage, RenderError>;
}

/// Runs an external PlantUML executable in pipe mode.
#[derive(Debug, Clone)]
pub struct PlantUmlCommand {
    program: PathBuf,
    format: OutputFormat,
}

impl PlantUmlCommand {
    pub fn new(program: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            program: program.into(),
            format,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn args(&self) -> [&'static str; 4] {
        let format = match self.format {
            OutputFormat::Png => "-tpng",
            OutputFormat::Svg => "-tsvg",
        };
        ["-pipe", format, "-charset", "UTF-8"]
    }
}

impl Renderer for PlantUmlCommand {
    fn render(&self, description: &str) -> Result<RenderedImage, RenderError> {
        let mut child = Command::new(&self.program)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RenderError::Spawn {
                program: self.program().display().to_string(),
                source,
            })?;

        // Dropped before waiting so the child sees EOF.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(description.as_bytes()) {
                // The renderer quit early; reap it before reporting.
                let _ = child.kill();
                let _ = child.wait();
                return Err(RenderError::Io(e));
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(RenderError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if output.stdout.is_empty() {
            return Err(RenderError::NoOutput);
        }
        Ok(RenderedImage {
            format: self.format,
            bytes: output.stdout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_select_format() {
        let png = PlantUmlCommand::new("plantuml", OutputFormat::Png);
        assert_eq!(png.args(), ["-pipe", "-tpng", "-charset", "UTF-8"]);
        let svg = PlantUmlCommand::new("plantuml", OutputFormat::Svg);
        assert_eq!(svg.args()[1], "-tsvg");
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let cmd = PlantUmlCommand::new("edgeview-no-such-renderer", OutputFormat::Png);
        let err = cmd.render("@startuml\n@enduml\n").unwrap_err();
        assert!(matches!(err, RenderError::Spawn { .. }), "got: {err}");
        assert!(err.to_string().contains("edgeview-no-such-renderer"));
    }

    #[cfg(unix)]
    #[test]
    fn renderer_that_ignores_input_is_reaped() {
        // `true` exits without reading, so a large write hits a closed pipe.
        let cmd = PlantUmlCommand::new("true", OutputFormat::Png);
        let description = "class A\n".repeat(1 << 17);
        let err = cmd.render(&description).unwrap_err();
        assert!(matches!(err, RenderError::Io(_)), "got: {err}");
    }

    #[test]
    fn extensions() {
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::Svg.extension(), "svg");
    }
}
