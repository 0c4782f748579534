pub mod board;
pub mod config;
pub mod insight;
pub mod location;
pub mod orchestrator;
pub mod settings;
pub mod state;
pub mod zmanim;

use std::sync::Arc;

use board::{BoardView, ShabbatSlot};
use config::AppConfig;
use insight::{InsightClient, InsightSettings};
use location::{LocationResolver, DEFAULT_COORDINATE};
use orchestrator::Orchestrator;
use settings::BoardSettings;
use zmanim::ZmanimClient;

/// Start the board engine: load the schedule, kick off a refresh on the
/// default coordinate, correct it once the live position resolves, and dump
/// the derived view. The worst case at every step is the updating view;
/// nothing in this flow exits the process.
pub async fn run() {
    env_logger::init();

    let config = AppConfig::new();
    if let Err(e) = config.ensure_dirs() {
        log::warn!("Failed to create data directory: {}", e);
    }

    let board_settings = BoardSettings::load(&config.data_dir);
    log::info!(
        "Loaded schedule: {} announcements, {} prayers, {} lessons",
        board_settings.announcements.len(),
        board_settings.prayers.len(),
        board_settings.lessons.len()
    );

    let http = reqwest::Client::new();
    let orchestrator = Arc::new(Orchestrator::new(
        ZmanimClient::new(http.clone(), config.zmanim_url.clone()),
        InsightClient::new(http.clone(), InsightSettings::from_env()),
    ));

    // The board shows the updating view (announcements still rolling)
    // until the first run commits.
    print_view(&board::derive(&orchestrator.state(), &board_settings));

    // The first run starts immediately on the default coordinate so the
    // screen is never blocked on the position lookup.
    let first = {
        let orch = orchestrator.clone();
        tokio::spawn(async move { orch.run(DEFAULT_COORDINATE).await })
    };

    let resolver = LocationResolver::new(http);
    let resolved = resolver.resolve().await;
    let corrected = if resolved == DEFAULT_COORDINATE {
        None
    } else {
        // A live reading arrived; restart the pipeline rather than patch
        // the in-flight run. The run sequencing keeps the stale result out.
        let orch = orchestrator.clone();
        Some(tokio::spawn(async move { orch.run(resolved).await }))
    };

    let _ = first.await;
    if let Some(handle) = corrected {
        let _ = handle.await;
    }

    print_view(&board::derive(&orchestrator.state(), &board_settings));
}

/// Plain-text dump of the derived view. The lobby screen proper renders
/// elsewhere; this only proves the pipeline end to end.
fn print_view(view: &BoardView) {
    match view {
        BoardView::Updating { announcements } => {
            println!("מעדכן נתונים למיקומך...");
            for announcement in announcements {
                println!("* {}", announcement);
            }
        }
        BoardView::Board(board) => {
            println!("{} | פרשת {}", board.hebrew_date, board.parasha);
            println!("\"{}\"", board.insight);
            let t = &board.times;
            println!(
                "עלות השחר {} | טלית ותפילין {} | הנץ החמה {} | סוף זמן ק\"ש (מג\"א) {} | סוף זמן ק\"ש (גר\"א) {} | סוף זמן תפילה {}",
                t.alot_ha_shachar,
                t.misheyakir,
                t.sunrise,
                t.sof_zman_shma_mga,
                t.sof_zman_shma_gra,
                t.sof_zman_tfilla_gra
            );
            println!(
                "חצות {} | מנחה גדולה {} | מנחה קטנה {} | פלג המנחה {} | שקיעה {} | צאת הכוכבים {}",
                t.chatzot,
                t.mincha_gedola,
                t.mincha_ketana,
                t.plag_ha_mincha,
                t.sunset,
                t.tzeit_ha_kochavim
            );
            match &board.candle_lighting {
                ShabbatSlot::At(time) => println!("הדלקת נרות שבת: {}", time),
                ShabbatSlot::NotToday => println!("זמני שבת יופיעו בימי שישי"),
            }
            if let ShabbatSlot::At(time) = &board.havdalah {
                println!("הבדלה: {}", time);
            }
            for prayer in &board.prayers {
                println!("{}: {}", prayer.name, prayer.time);
            }
            for lesson in &board.lessons {
                println!("{}: {}", lesson.name, lesson.time);
            }
            for announcement in &board.announcements {
                println!("* {}", announcement);
            }
        }
    }
}
