use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use crossbeam_channel::{Receiver, select, tick, unbounded};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use edgeview::config::{DEFAULT_PLANTUML, RenderConfig};
use edgeview::{Direction, GraphSession, OutputFormat, RenderCoordinator, RenderOutcome};

#[derive(Parser)]
#[command(
    name = "edgeview",
    about = "Turn a list of directed edges into a PlantUML diagram"
)]
struct Cli {
    /// Edge list file, one `A -> B` or `A` per line (reads from stdin if not provided)
    file: Option<PathBuf>,

    /// Hide a vertex and every edge touching it (repeatable)
    #[arg(long = "hide", value_name = "VERTEX")]
    hidden: Vec<String>,

    /// Layout direction
    #[arg(long, short = 'd', value_enum, default_value_t = DirectionArg::Td)]
    direction: DirectionArg,

    /// Render to this image file instead of printing the PlantUML source
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Image format (defaults to the output file extension, then png)
    #[arg(long, short = 'f', value_enum)]
    format: Option<FormatArg>,

    /// PlantUML executable
    #[arg(long, env = "EDGEVIEW_PLANTUML", default_value = DEFAULT_PLANTUML)]
    plantuml: PathBuf,

    /// Print the vertices and their visibility, then exit
    #[arg(long)]
    list_vertices: bool,

    /// Re-render whenever the input file changes
    #[arg(long, requires = "file", requires = "output")]
    watch: bool,

    /// Poll interval for --watch, in milliseconds
    #[arg(long, default_value_t = 300)]
    interval: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Td,
    Lr,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Svg,
}

impl Cli {
    fn config(&self) -> RenderConfig {
        let direction = match self.direction {
            DirectionArg::Td => Direction::TopDown,
            DirectionArg::Lr => Direction::LeftRight,
        };
        let format = match self.format {
            Some(FormatArg::Png) => OutputFormat::Png,
            Some(FormatArg::Svg) => OutputFormat::Svg,
            None => format_from_extension(self.output.as_deref()),
        };
        RenderConfig {
            plantuml: self.plantuml.clone(),
            format,
            direction,
        }
    }
}

fn format_from_extension(path: Option<&Path>) -> OutputFormat {
    let ext = path.and_then(Path::extension).and_then(|e| e.to_str());
    [OutputFormat::Png, OutputFormat::Svg]
        .into_iter()
        .find(|f| ext.is_some_and(|ext| ext.eq_ignore_ascii_case(f.extension())))
        .unwrap_or_default()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("ERROR: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config();
    let mut session = GraphSession::new(config.direction);
    let text = read_input(cli.file.as_deref())?;
    let description = load(&mut session, &text, &cli.hidden);

    if cli.list_vertices {
        for (vertex, enabled) in session.visibility().iter() {
            let mark = if enabled { 'x' } else { ' ' };
            println!("[{mark}] {vertex}");
        }
        return Ok(());
    }

    let Some(output) = cli.output.as_deref() else {
        print!("{description}");
        return Ok(());
    };

    let renderer = config.renderer();
    info!(
        plantuml = %renderer.program().display(),
        format = config.format.extension(),
        "rendering"
    );
    let (tx, outcomes) = unbounded::<RenderOutcome>();
    let mut coordinator =
        RenderCoordinator::spawn(renderer, tx).context("failed to start render worker")?;
    coordinator.submit(description);

    if cli.watch {
        let file = cli.file.as_deref().context("--watch needs an input file")?;
        watch(
            &mut session,
            &coordinator,
            &outcomes,
            file,
            output,
            text,
            &cli.hidden,
            Duration::from_millis(cli.interval),
        )?;
    } else {
        let outcome = outcomes
            .recv()
            .context("render worker stopped before finishing")?;
        apply_outcome(outcome, output)?;
    }
    coordinator.shutdown();
    Ok(())
}

/// Rebuild the session from `text`, then re-apply the command-line toggles.
fn load(session: &mut GraphSession, text: &str, hidden: &[String]) -> String {
    let mut description = session.set_text(text);
    for vertex in hidden {
        match session.toggle(vertex, false) {
            Some(updated) => description = updated,
            None => warn!(vertex = %vertex, "no such vertex to hide"),
        }
    }
    description
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn apply_outcome(outcome: RenderOutcome, output: &Path) -> Result<()> {
    match outcome {
        RenderOutcome::Rendered { request, image } => {
            std::fs::write(output, &image.bytes)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(request = request.0, path = %output.display(), "diagram written");
            Ok(())
        }
        RenderOutcome::Failed { error, .. } => bail!("rendering failed: {error}"),
    }
}

#[allow(clippy::too_many_arguments)]
fn watch(
    session: &mut GraphSession,
    coordinator: &RenderCoordinator,
    outcomes: &Receiver<RenderOutcome>,
    file: &Path,
    output: &Path,
    mut last_text: String,
    hidden: &[String],
    interval: Duration,
) -> Result<()> {
    info!(path = %file.display(), "watching for changes");
    let ticker = tick(interval);
    loop {
        select! {
            recv(outcomes) -> outcome => {
                let Ok(outcome) = outcome else {
                    bail!("render worker stopped");
                };
                // A submit may have landed after this outcome was queued.
                // Failures keep the previous image; the next edit retries.
                if let Some(outcome) = coordinator.accept(outcome) {
                    if let Err(e) = apply_outcome(outcome, output) {
                        warn!("{e:#}");
                    }
                }
            }
            recv(ticker) -> _ => {
                match std::fs::read_to_string(file) {
                    Ok(text) if text != last_text => {
                        let description = load(session, &text, hidden);
                        coordinator.submit(description);
                        last_text = text;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(path = %file.display(), error = %e, "failed to re-read input");
                    }
                }
            }
        }
    }
}
