use crate::settings::{BoardSettings, PrayerItem};
use crate::state::OrchestrationState;
use crate::zmanim::ZmanimTimes;

/// Candle-lighting / havdalah slot: a time near Shabbat, otherwise an
/// explicit not-applicable marker. Never an empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum ShabbatSlot {
    At(String),
    NotToday,
}

impl ShabbatSlot {
    fn from_time(time: Option<&String>) -> Self {
        match time {
            Some(t) => ShabbatSlot::At(t.clone()),
            None => ShabbatSlot::NotToday,
        }
    }
}

/// The full board, composed from the lookup results and the persisted
/// schedule settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadyBoard {
    pub hebrew_date: String,
    pub parasha: String,
    pub times: ZmanimTimes,
    pub insight: String,
    pub announcements: Vec<String>,
    pub prayers: Vec<PrayerItem>,
    pub lessons: Vec<PrayerItem>,
    pub candle_lighting: ShabbatSlot,
    pub havdalah: ShabbatSlot,
}

/// What the screen should show right now.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardView {
    /// Still waiting for authoritative times, or the last run failed —
    /// both look the same to the room, since recovery is automatic either
    /// way. The announcements banner keeps running meanwhile.
    Updating { announcements: Vec<String> },
    Board(ReadyBoard),
}

/// Derive the renderable view. Pure: same state and settings in, same view
/// out, no side effects.
pub fn derive(state: &OrchestrationState, settings: &BoardSettings) -> BoardView {
    match state {
        OrchestrationState::Loading | OrchestrationState::Failed(_) => BoardView::Updating {
            announcements: settings.announcements.clone(),
        },
        OrchestrationState::Ready(data) => BoardView::Board(ReadyBoard {
            hebrew_date: data.zmanim.hebrew.clone(),
            parasha: data.zmanim.parasha.clone(),
            candle_lighting: ShabbatSlot::from_time(data.zmanim.times.candle_lighting.as_ref()),
            havdalah: ShabbatSlot::from_time(data.zmanim.times.havdalah.as_ref()),
            times: data.zmanim.times.clone(),
            insight: data.insight.clone(),
            announcements: settings.announcements.clone(),
            prayers: settings.prayers.clone(),
            lessons: settings.lessons.clone(),
        }),
    }
}
