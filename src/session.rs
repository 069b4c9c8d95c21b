use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::api::ProductLookup;
use crate::orchestrator::{Event, ScanOrchestrator};
use crate::view::ViewState;

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Text typed into the barcode field followed by Enter. Empty means Enter alone.
    Barcode(String),
    Check,
    Camera,
    Again,
    Quit,
}

pub fn parse_command(line: &str) -> Command {
    match line.trim() {
        ":check" => Command::Check,
        ":camera" | ":cam" => Command::Camera,
        ":again" | ":reset" => Command::Again,
        ":quit" | ":q" => Command::Quit,
        other => Command::Barcode(other.to_string()),
    }
}

pub const HELP: &str = "Type a barcode and press Enter. Commands: :check  :camera  :again  :quit";

/// Drives the orchestrator from terminal lines and decoder detections until
/// `:quit` or end of input. Lookups still running at end of input are awaited.
pub async fn run<L, R, W>(
    app: &mut ScanOrchestrator<L>,
    input: R,
    mut detections: mpsc::UnboundedReceiver<String>,
    out: &mut W,
) -> std::io::Result<()>
where
    L: ProductLookup,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut pending = FuturesUnordered::new();

    writeln!(out, "{HELP}\n")?;
    write!(out, "{}", app.view())?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = parse_command(&line);
                if command == Command::Quit {
                    return Ok(());
                }
                for event in events_for(app, command) {
                    if let Some(lookup) = app.dispatch(event) {
                        pending.push(lookup.resolve());
                    }
                }
            }
            Some(code) = detections.recv() => {
                if let Some(lookup) = app.dispatch(Event::Detected(code)) {
                    pending.push(lookup.resolve());
                }
            }
            Some((ticket, result)) = pending.next(), if !pending.is_empty() => {
                app.complete_scan(ticket, result);
            }
        }
        writeln!(out)?;
        write!(out, "{}", app.view())?;
        out.flush()?;
    }

    while let Some((ticket, result)) = pending.next().await {
        if app.complete_scan(ticket, result) {
            writeln!(out)?;
            write!(out, "{}", app.view())?;
        }
    }
    out.flush()
}

fn events_for<L: ProductLookup>(app: &mut ScanOrchestrator<L>, command: Command) -> Vec<Event> {
    match command {
        Command::Check => vec![Event::SubmitClicked],
        Command::Camera => vec![Event::ToggleCamera],
        Command::Again => vec![Event::Reset],
        Command::Quit => vec![],
        Command::Barcode(text) => {
            let mut events = Vec::new();
            // The field only exists on the input panel.
            if app.state() != &ViewState::Input {
                if text.is_empty() {
                    return vec![Event::Reset];
                }
                debug!("Leaving result panel for a new barcode");
                app.dispatch(Event::Reset);
            }
            if !text.is_empty() {
                app.type_input(&text);
            }
            events.push(Event::EnterPressed);
            events
        }
    }
}
