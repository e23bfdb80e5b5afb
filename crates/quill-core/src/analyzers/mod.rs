//! The seven dimensional analyzers.

pub mod conflict;
pub mod dialogue;
pub mod fiction;
pub mod readability;
pub mod scene;
pub mod sensory;
pub mod theme;

use crate::analyzer::DimensionAnalyzer;

pub use conflict::ConflictAnalyzer;
pub use dialogue::DialogueAnalyzer;
pub use fiction::FictionElementsAnalyzer;
pub use readability::ReadabilityAnalyzer;
pub use scene::SceneSequelAnalyzer;
pub use sensory::SensoryAnalyzer;
pub use theme::ThemeSymbolAnalyzer;

/// One analyzer per dimension, in `Dimension::ALL` order.
pub fn default_analyzers() -> Vec<Box<dyn DimensionAnalyzer>> {
    vec![
        Box::new(FictionElementsAnalyzer),
        Box::new(ThemeSymbolAnalyzer),
        Box::new(DialogueAnalyzer),
        Box::new(SceneSequelAnalyzer),
        Box::new(ConflictAnalyzer),
        Box::new(SensoryAnalyzer),
        Box::new(ReadabilityAnalyzer),
    ]
}
