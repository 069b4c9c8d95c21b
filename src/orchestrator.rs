use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::api::{ApiError, ProductLookup};
use crate::error::ScanError;
use crate::product::ProductRecord;
use crate::scanner::{Notifier, ScannerAdapter};
use crate::view::{Controls, ViewController, ViewState};

/// User actions and decoder callbacks the scan handler reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SubmitClicked,
    EnterPressed,
    ToggleCamera,
    Detected(String),
    /// "Scan another" on the result panel, "try again" on the error panel.
    Reset,
}

/// Identifies one started lookup. Only the newest ticket's result is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTicket {
    generation: u64,
    pub barcode: String,
}

pub struct PendingLookup {
    pub ticket: ScanTicket,
    pub response: BoxFuture<'static, Result<ProductRecord, ApiError>>,
}

impl PendingLookup {
    pub async fn resolve(self) -> (ScanTicket, Result<ProductRecord, ApiError>) {
        let result = self.response.await;
        (self.ticket, result)
    }
}

pub struct ScanOrchestrator<L> {
    view: ViewController,
    scanner: ScannerAdapter,
    lookup: L,
    notifier: Box<dyn Notifier>,
    generation: u64,
    in_flight: bool,
}

impl<L: ProductLookup> ScanOrchestrator<L> {
    pub fn new(lookup: L, scanner: ScannerAdapter, notifier: Box<dyn Notifier>) -> Self {
        let mut app = Self {
            view: ViewController::new(),
            scanner,
            lookup,
            notifier,
            generation: 0,
            in_flight: false,
        };
        app.view.show_input(&mut app.scanner);
        app
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    pub fn state(&self) -> &ViewState {
        self.view.state()
    }

    pub fn controls(&self) -> &Controls {
        self.view.controls()
    }

    pub fn camera_active(&self) -> bool {
        self.scanner.is_active()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Replaces the manual field's text. Ignored while the field is disabled.
    pub fn type_input(&mut self, text: &str) {
        let controls = self.view.controls_mut();
        if controls.manual_field_enabled() {
            controls.manual_input = text.to_string();
        }
    }

    pub fn dispatch(&mut self, event: Event) -> Option<PendingLookup> {
        let input_control = matches!(
            event,
            Event::SubmitClicked | Event::EnterPressed | Event::ToggleCamera
        );
        // Those controls only exist on the input panel.
        if input_control && self.state() != &ViewState::Input {
            debug!("{event:?} ignored outside the input panel");
            return None;
        }

        match event {
            Event::SubmitClicked => {
                if !self.controls().submit_enabled() {
                    debug!("Submit ignored while disabled");
                    return None;
                }
                self.begin_scan(None)
            }
            Event::EnterPressed => {
                if !self.controls().manual_field_enabled() {
                    return None;
                }
                self.begin_scan(None)
            }
            Event::ToggleCamera => {
                // Failures were already alerted and the session left off.
                let notifier = self.notifier.as_ref();
                if let Err(e) = self.scanner.toggle(self.view.controls_mut(), notifier) {
                    warn!("{e}");
                }
                None
            }
            Event::Detected(code) => {
                let code = self.scanner.on_detected(self.view.controls_mut(), &code)?;
                self.begin_scan(Some(code))
            }
            Event::Reset => {
                self.view.show_input(&mut self.scanner);
                None
            }
        }
    }

    /// Starts a lookup for `supplied`, or for the manual field when nothing is
    /// supplied. Manual scans are refused while another lookup is in flight; a
    /// camera detection supersedes it.
    pub fn begin_scan(&mut self, supplied: Option<String>) -> Option<PendingLookup> {
        let from_camera = supplied.is_some();
        if self.in_flight && !from_camera {
            debug!("Lookup already in flight, ignoring manual submit");
            return None;
        }

        let barcode = supplied
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| self.controls().manual_input.trim().to_string());
        if barcode.is_empty() {
            self.view.show_error(&mut self.scanner, ScanError::EmptyInput.to_string());
            return None;
        }

        self.generation += 1;
        self.in_flight = true;
        self.view.controls_mut().set_checking(true);
        info!("Checking barcode {barcode}");

        let response = self.lookup.lookup(&barcode);
        Some(PendingLookup {
            ticket: ScanTicket { generation: self.generation, barcode },
            response,
        })
    }

    /// Applies a finished lookup. Returns false when a newer lookup has
    /// superseded it and the result was dropped.
    pub fn complete_scan(
        &mut self,
        ticket: ScanTicket,
        result: Result<ProductRecord, ApiError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!("Dropping stale result for {}", ticket.barcode);
            return false;
        }

        self.in_flight = false;
        self.view.controls_mut().set_checking(false);

        match result {
            Ok(record) => {
                info!("Rendering result for {}", ticket.barcode);
                self.view.show_result(&mut self.scanner, &record);
            }
            Err(e) => {
                warn!("Lookup for {} failed: {e:?}", ticket.barcode);
                self.view.show_error(&mut self.scanner, ScanError::from(e).to_string());
            }
        }
        true
    }

    /// Runs one scan to completion.
    pub async fn handle_scan(&mut self, supplied: Option<String>) {
        if let Some(pending) = self.begin_scan(supplied) {
            let (ticket, result) = pending.resolve().await;
            self.complete_scan(ticket, result);
        }
    }
}
