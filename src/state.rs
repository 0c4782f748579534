use crate::zmanim::ZmanimData;

/// Everything a ready board needs from the two lookups: the day's times
/// plus the insight text (possibly still the placeholder).
#[derive(Debug, Clone, PartialEq)]
pub struct BoardData {
    pub zmanim: ZmanimData,
    pub insight: String,
}

/// State of the current orchestration run, as the presentation layer sees
/// it. A run only moves Loading → Ready or Loading → Failed; starting a new
/// run (a corrected coordinate) resets to Loading.
#[derive(Debug, Clone, PartialEq)]
pub enum OrchestrationState {
    Loading,
    Ready(BoardData),
    Failed(String),
}

impl Default for OrchestrationState {
    fn default() -> Self {
        OrchestrationState::Loading
    }
}
