use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::insight::{InsightSource, INSIGHT_PLACEHOLDER};
use crate::location::Coordinate;
use crate::state::{BoardData, OrchestrationState};
use crate::zmanim::ZmanimSource;

/// Drives the two-stage refresh pipeline and owns the state the board
/// renders from.
///
/// Runs are tagged with a monotonically increasing sequence number; a
/// completing run commits its result only if it is still the latest run
/// started. That is the whole concurrency story: a slow run for a stale
/// coordinate can never clobber a faster run for a corrected one.
pub struct Orchestrator<Z, I> {
    zmanim: Z,
    insight: I,
    state: Mutex<OrchestrationState>,
    runs_started: AtomicU64,
}

impl<Z: ZmanimSource, I: InsightSource> Orchestrator<Z, I> {
    pub fn new(zmanim: Z, insight: I) -> Self {
        Self {
            zmanim,
            insight,
            state: Mutex::new(OrchestrationState::default()),
            runs_started: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current presentation-driving state.
    pub fn state(&self) -> OrchestrationState {
        self.state.lock().unwrap().clone()
    }

    /// One end-to-end refresh for `coord`: the time markers first, then the
    /// insight keyed by their parasha and Hebrew date. Returns the state the
    /// board is left in, which may belong to a newer run if this one was
    /// superseded while in flight.
    pub async fn run(&self, coord: Coordinate) -> OrchestrationState {
        let run_id = self.runs_started.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!(
            "Run {} started for ({:.4}, {:.4})",
            run_id,
            coord.latitude,
            coord.longitude
        );
        self.commit(run_id, OrchestrationState::Loading);

        // Stage 1 is authoritative: without the day's times there is
        // nothing to show, so the run fails closed.
        let zmanim = match self.zmanim.fetch(coord).await {
            Ok(data) => data,
            Err(e) => {
                log::error!("Run {}: zmanim lookup failed: {}", run_id, e);
                return self.commit(run_id, OrchestrationState::Failed(e.to_string()));
            }
        };

        // Stage 2 is supplementary: a failure keeps the placeholder and the
        // board still renders.
        let insight = match self.insight.generate(&zmanim.parasha, &zmanim.hebrew).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                log::warn!(
                    "Run {}: insight service returned empty text, keeping placeholder",
                    run_id
                );
                INSIGHT_PLACEHOLDER.to_string()
            }
            Err(e) => {
                log::warn!(
                    "Run {}: insight lookup failed: {}, keeping placeholder",
                    run_id,
                    e
                );
                INSIGHT_PLACEHOLDER.to_string()
            }
        };

        self.commit(run_id, OrchestrationState::Ready(BoardData { zmanim, insight }))
    }

    /// Accept `next` only if `run_id` is still the latest run started; a
    /// superseded run's late result is dropped on the floor.
    fn commit(&self, run_id: u64, next: OrchestrationState) -> OrchestrationState {
        let mut state = self.state.lock().unwrap();
        if run_id == self.runs_started.load(Ordering::SeqCst) {
            *state = next;
        } else {
            log::info!("Run {} superseded, discarding its result", run_id);
        }
        state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::insight::InsightError;
    use crate::location::DEFAULT_COORDINATE;
    use crate::zmanim::{ZmanimData, ZmanimError, ZmanimTimes};

    const TEL_AVIV: Coordinate = Coordinate {
        latitude: 32.0853,
        longitude: 34.7818,
    };

    fn sample_zmanim() -> ZmanimData {
        ZmanimData {
            date: "2024-04-22".to_string(),
            hebrew: "י״ד ניסן".to_string(),
            parasha: "צו".to_string(),
            times: ZmanimTimes {
                alot_ha_shachar: "04:48".to_string(),
                misheyakir: "05:12".to_string(),
                sunrise: "06:12".to_string(),
                sof_zman_shma_mga: "08:25".to_string(),
                sof_zman_shma_gra: "09:01".to_string(),
                sof_zman_tfilla_gra: "10:05".to_string(),
                chatzot: "12:29".to_string(),
                mincha_gedola: "13:02".to_string(),
                mincha_ketana: "16:13".to_string(),
                plag_ha_mincha: "17:29".to_string(),
                sunset: "18:45".to_string(),
                tzeit_ha_kochavim: "19:12".to_string(),
                candle_lighting: None,
                havdalah: None,
            },
        }
    }

    struct StubZmanim {
        data: Option<ZmanimData>,
        delay: Duration,
    }

    impl ZmanimSource for StubZmanim {
        async fn fetch(&self, _coord: Coordinate) -> Result<ZmanimData, ZmanimError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.data.clone().ok_or(ZmanimError::EmptyField("sunrise"))
        }
    }

    struct StubInsight {
        text: Option<String>,
        calls: AtomicUsize,
    }

    impl StubInsight {
        fn ok(text: &str) -> Self {
            Self {
                text: Some(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                text: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl InsightSource for StubInsight {
        async fn generate(
            &self,
            _parasha: &str,
            _hebrew_date: &str,
        ) -> Result<String, InsightError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.text.clone().ok_or(InsightError::NotConfigured)
        }
    }

    #[tokio::test]
    async fn successful_run_is_ready_with_both_results() {
        let orch = Orchestrator::new(
            StubZmanim {
                data: Some(sample_zmanim()),
                delay: Duration::ZERO,
            },
            StubInsight::ok("דבר תורה לדוגמה"),
        );

        let state = orch.run(DEFAULT_COORDINATE).await;

        match &state {
            OrchestrationState::Ready(board) => {
                assert_eq!(board.zmanim.times.sunrise, "06:12");
                assert_eq!(board.zmanim.times.sunset, "18:45");
                assert_eq!(board.zmanim.parasha, "צו");
                assert_eq!(board.insight, "דבר תורה לדוגמה");
            }
            other => panic!("expected Ready, got {:?}", other),
        }
        assert_eq!(orch.state(), state);
    }

    #[tokio::test]
    async fn failed_insight_still_yields_ready_with_placeholder() {
        let orch = Orchestrator::new(
            StubZmanim {
                data: Some(sample_zmanim()),
                delay: Duration::ZERO,
            },
            StubInsight::failing(),
        );

        let state = orch.run(DEFAULT_COORDINATE).await;

        match state {
            OrchestrationState::Ready(board) => {
                assert_eq!(board.insight, INSIGHT_PLACEHOLDER);
                assert!(!board.insight.is_empty());
            }
            other => panic!("expected Ready, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_insight_text_keeps_placeholder() {
        let orch = Orchestrator::new(
            StubZmanim {
                data: Some(sample_zmanim()),
                delay: Duration::ZERO,
            },
            StubInsight::ok(""),
        );

        let state = orch.run(DEFAULT_COORDINATE).await;
        match state {
            OrchestrationState::Ready(board) => assert_eq!(board.insight, INSIGHT_PLACEHOLDER),
            other => panic!("expected Ready, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn failed_zmanim_yields_failed_and_never_calls_insight() {
        let orch = Orchestrator::new(
            StubZmanim {
                data: None,
                delay: Duration::ZERO,
            },
            StubInsight::ok("דבר תורה לדוגמה"),
        );

        let state = orch.run(DEFAULT_COORDINATE).await;

        assert!(matches!(state, OrchestrationState::Failed(_)));
        assert!(matches!(orch.state(), OrchestrationState::Failed(_)));
        assert_eq!(orch.insight.calls.load(Ordering::SeqCst), 0);
    }

    /// Answers slowly for the default coordinate and fast for a corrected
    /// one, marking each response with a distinct parasha.
    struct RacingZmanim;

    impl ZmanimSource for RacingZmanim {
        async fn fetch(&self, coord: Coordinate) -> Result<ZmanimData, ZmanimError> {
            let mut data = sample_zmanim();
            if coord == DEFAULT_COORDINATE {
                tokio::time::sleep(Duration::from_millis(200)).await;
                data.parasha = "בראשית".to_string();
            } else {
                tokio::time::sleep(Duration::from_millis(10)).await;
                data.parasha = "נח".to_string();
            }
            Ok(data)
        }
    }

    #[tokio::test]
    async fn superseded_run_does_not_overwrite_newer_result() {
        let orch = Arc::new(Orchestrator::new(RacingZmanim, StubInsight::ok("טוב")));

        let slow = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.run(DEFAULT_COORDINATE).await })
        };
        // Let the stale-coordinate run start first.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let fast = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.run(TEL_AVIV).await })
        };

        fast.await.unwrap();
        // The slow run finishes after the fast one has committed; its
        // result must be discarded.
        let left_in = slow.await.unwrap();

        match orch.state() {
            OrchestrationState::Ready(board) => assert_eq!(board.zmanim.parasha, "נח"),
            other => panic!("expected Ready, got {:?}", other),
        }
        assert_eq!(left_in, orch.state());
    }

    #[tokio::test]
    async fn new_run_resets_ready_state_to_loading() {
        let orch = Arc::new(Orchestrator::new(
            StubZmanim {
                data: Some(sample_zmanim()),
                delay: Duration::from_millis(100),
            },
            StubInsight::ok("טוב"),
        ));

        // No runs yet: the board starts out loading.
        assert_eq!(orch.state(), OrchestrationState::Loading);

        orch.run(DEFAULT_COORDINATE).await;
        assert!(matches!(orch.state(), OrchestrationState::Ready(_)));

        // A corrected coordinate starts a fresh run; the board drops back
        // to loading until that run commits.
        let handle = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.run(TEL_AVIV).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(orch.state(), OrchestrationState::Loading);

        handle.await.unwrap();
        assert!(matches!(orch.state(), OrchestrationState::Ready(_)));
    }
}
