//! Berth TUI - Standalone Terminal User Interface
//!
//! Launch the TUI directly with: berth-tui

use berth::config::BerthConfig;
use berth::error::Result;
use berth::registry::Registry;
use berth::tui::{self, App};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Log lines would corrupt the alternate screen
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = BerthConfig::load_default()?;
    let mut registry = Registry::from_config(&config)?;
    tui::open_session(&mut registry, &config)?;

    let mut app = App::new(registry);
    app.run()
}
