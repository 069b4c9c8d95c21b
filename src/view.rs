use serde::Serialize;
use std::fmt;

use crate::product::ProductRecord;
use crate::render::{ResultView, render_result};
use crate::scanner::ScannerAdapter;

pub const CHECK_LABEL: &str = "CHECK BARCODE";
pub const CHECKING_LABEL: &str = "Checking...";

/// State of the input controls. The camera and checking flags are set only by
/// the scanner adapter and the scan handler; everything else is derived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Controls {
    pub manual_input: String,
    camera_engaged: bool,
    checking: bool,
}

impl Controls {
    pub(crate) fn set_camera_engaged(&mut self, engaged: bool) {
        self.camera_engaged = engaged;
    }

    pub(crate) fn set_checking(&mut self, checking: bool) {
        self.checking = checking;
    }

    pub fn is_checking(&self) -> bool {
        self.checking
    }

    pub fn manual_field_enabled(&self) -> bool {
        !self.camera_engaged
    }

    pub fn manual_area_visible(&self) -> bool {
        !self.camera_engaged
    }

    pub fn viewport_visible(&self) -> bool {
        self.camera_engaged
    }

    pub fn submit_enabled(&self) -> bool {
        !self.camera_engaged && !self.checking
    }

    pub fn submit_label(&self) -> &'static str {
        if self.checking { CHECKING_LABEL } else { CHECK_LABEL }
    }

    pub fn camera_icon(&self) -> &'static str {
        if self.camera_engaged { "🛑" } else { "📷" }
    }

    pub fn camera_label(&self) -> &'static str {
        if self.camera_engaged { "Stop Scanning" } else { "Scan with Camera" }
    }
}

/// The one visible panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "panel", content = "data", rename_all = "lowercase")]
pub enum ViewState {
    Input,
    Result(ResultView),
    Error(String),
}

pub struct ViewController {
    state: ViewState,
    controls: Controls,
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewController {
    pub fn new() -> Self {
        Self {
            state: ViewState::Input,
            controls: Controls::default(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut Controls {
        &mut self.controls
    }

    pub fn show_input(&mut self, scanner: &mut ScannerAdapter) {
        scanner.stop(&mut self.controls);
        self.controls.manual_input.clear();
        self.state = ViewState::Input;
    }

    pub fn show_result(&mut self, scanner: &mut ScannerAdapter, record: &ProductRecord) {
        scanner.stop(&mut self.controls);
        self.state = ViewState::Result(render_result(record));
    }

    pub fn show_error(&mut self, scanner: &mut ScannerAdapter, message: impl Into<String>) {
        scanner.stop(&mut self.controls);
        self.state = ViewState::Error(message.into());
    }
}

/// Terminal rendering of the visible panel and its controls.
impl fmt::Display for ViewController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            ViewState::Input => {
                let c = &self.controls;
                if c.manual_area_visible() {
                    writeln!(f, "Barcode: {}", c.manual_input)?;
                    let state = if c.submit_enabled() { "" } else { " (disabled)" };
                    writeln!(f, "[{}]{state}", c.submit_label())?;
                }
                if c.viewport_visible() {
                    writeln!(f, "(camera live, waiting for a barcode)")?;
                }
                writeln!(f, "[{} {}]", c.camera_icon(), c.camera_label())
            }
            ViewState::Result(view) => write!(f, "{view}\n[Scan Another]\n"),
            ViewState::Error(message) => write!(f, "Error: {message}\n[Try Again]\n"),
        }
    }
}
