//! Barcode health checker: looks a packaged food up by barcode on the health
//! API and renders its score, indicators, nutrition and additives.

pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod product;
pub mod render;
pub mod scanner;
pub mod session;
pub mod view;

pub use api::{ApiError, HealthApi, ProductLookup};
pub use config::Config;
pub use error::ScanError;
pub use orchestrator::{Event, ScanOrchestrator};
pub use product::{NutritionFacts, ProductRecord};
pub use render::{ResultView, render_result};
pub use scanner::{BarcodeDecoder, LineFeedDecoder, ScannerAdapter};
pub use view::{ViewController, ViewState};
