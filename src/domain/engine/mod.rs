//! Strategy engines: one signal per bar, strictly sequential.
//!
//! Each engine owns its bar window (and, for the adaptive variant, its
//! account), so independent engines never share state. A single engine must
//! be driven by one caller at a time; `update` takes `&mut self`.

pub mod adaptive;
pub mod crossover;

use crate::domain::bar_window::BarWindow;
use crate::domain::error::TraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::SignalRecord;
use crate::domain::strategy::{Strategy, StrategyKind};

pub use adaptive::AdaptiveEngine;
pub use crossover::CrossoverEngine;

pub trait SignalEngine {
    fn name(&self) -> &str;

    /// Appends `bar` to the window, recomputes indicators and returns the
    /// decision for this bar.
    fn update(&mut self, bar: &OhlcvBar) -> Result<SignalRecord, TraderError>;

    fn window(&self) -> &BarWindow;
}

pub fn build_engine(strategy: &Strategy) -> Box<dyn SignalEngine> {
    match strategy.kind {
        StrategyKind::Adaptive => Box::new(AdaptiveEngine::new(
            strategy.name.clone(),
            strategy.adaptive.clone(),
        )),
        StrategyKind::Crossover => Box::new(CrossoverEngine::new(
            strategy.name.clone(),
            strategy.crossover.clone(),
        )),
    }
}
