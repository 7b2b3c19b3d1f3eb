use crate::components::google_calendar::{Meeting, MeetingSource};
use crate::error::Error;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Shortest refresh period a watch runs with
pub const MIN_REFRESH_PERIOD: Duration = Duration::from_secs(1);

/// Latest state of the watched meeting list
#[derive(Debug, Clone, PartialEq)]
pub enum MeetingSnapshot {
    /// First fetch still in flight
    Loading,
    Ready(Vec<Meeting>),
    /// Last fetch failed; the list is refetched on the next tick
    Failed(String),
    /// The credential was rejected and the watch has stopped
    SignedOut,
}

/// Periodic meeting list refresh for one signed-in session.
///
/// The refresh task lives until [`MeetingWatch::stop`] is called, the watch
/// is dropped, or the calendar rejects the session's credential.
pub struct MeetingWatch {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    snapshots: watch::Receiver<MeetingSnapshot>,
}

impl MeetingWatch {
    /// Start refreshing immediately and then every `period`, at least [`MIN_REFRESH_PERIOD`]
    pub fn start(source: Arc<dyn MeetingSource>, access_token: String, period: Duration) -> Self {
        let period = period.max(MIN_REFRESH_PERIOD);
        let cancel = CancellationToken::new();
        let (tx, snapshots) = watch::channel(MeetingSnapshot::Loading);

        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            run_refresh_loop(source, access_token, period, tx, task_cancel).await;
        });

        Self {
            cancel,
            task: Some(task),
            snapshots,
        }
    }

    /// Receiver that sees every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<MeetingSnapshot> {
        self.snapshots.clone()
    }

    pub fn current(&self) -> MeetingSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancel the refresh task and wait for it to finish
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Meeting watch task failed: {}", e);
            }
        }
    }
}

impl Drop for MeetingWatch {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_refresh_loop(
    source: Arc<dyn MeetingSource>,
    access_token: String,
    period: Duration,
    tx: watch::Sender<MeetingSnapshot>,
    cancel: CancellationToken,
) {
    info!("Meeting watch started, refreshing every {:?}", period);
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        // A fetch that is still running when the session ends is abandoned
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = source.upcoming_meetings(&access_token) => result,
        };

        match result {
            Ok(meetings) => {
                tx.send_replace(MeetingSnapshot::Ready(meetings));
            }
            Err(Error::Unauthorized) => {
                warn!("Calendar rejected the session credential, stopping meeting watch");
                tx.send_replace(MeetingSnapshot::SignedOut);
                break;
            }
            Err(e) => {
                error!("Failed to refresh meetings: {}", e);
                tx.send_replace(MeetingSnapshot::Failed(
                    "Failed to fetch calendar events".to_string(),
                ));
            }
        }
    }

    info!("Meeting watch stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{upstream_error, PrepResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays scripted results, then repeats the last one
    struct ScriptedSource {
        script: Mutex<Vec<PrepResult<Vec<Meeting>>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(script: Vec<PrepResult<Vec<Meeting>>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl MeetingSource for ScriptedSource {
        async fn upcoming_meetings(&self, access_token: &str) -> PrepResult<Vec<Meeting>> {
            assert_eq!(access_token, "token");
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.remove(0)
            } else {
                clone_result(&script[0])
            }
        }
    }

    fn clone_result(result: &PrepResult<Vec<Meeting>>) -> PrepResult<Vec<Meeting>> {
        match result {
            Ok(meetings) => Ok(meetings.clone()),
            Err(Error::Unauthorized) => Err(Error::Unauthorized),
            Err(e) => Err(upstream_error(&e.to_string())),
        }
    }

    fn meeting(id: &str) -> Meeting {
        Meeting {
            id: id.to_string(),
            title: format!("Meeting {}", id),
            start: "2024-03-01T10:00:00Z".to_string(),
            end: "2024-03-01T11:00:00Z".to_string(),
            attendees: vec![],
            description: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_initial_fetch_and_refreshes_on_interval() {
        let source = ScriptedSource::new(vec![
            Ok(vec![meeting("1")]),
            Ok(vec![meeting("1"), meeting("2")]),
        ]);
        let watch = MeetingWatch::start(source.clone(), "token".into(), Duration::from_secs(300));
        let mut rx = watch.subscribe();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), MeetingSnapshot::Ready(vec![meeting("1")]));

        rx.changed().await.unwrap();
        assert_eq!(
            *rx.borrow_and_update(),
            MeetingSnapshot::Ready(vec![meeting("1"), meeting("2")])
        );
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        watch.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_published_and_polling_continues() {
        let source =
            ScriptedSource::new(vec![Err(upstream_error("down")), Ok(vec![meeting("1")])]);
        let watch = MeetingWatch::start(source.clone(), "token".into(), Duration::from_secs(300));
        let mut rx = watch.subscribe();

        rx.changed().await.unwrap();
        assert!(matches!(*rx.borrow_and_update(), MeetingSnapshot::Failed(_)));

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), MeetingSnapshot::Ready(vec![meeting("1")]));
        assert!(watch.is_running());

        watch.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn unauthorized_ends_the_watch() {
        let source = ScriptedSource::new(vec![Err(Error::Unauthorized)]);
        let watch = MeetingWatch::start(source.clone(), "token".into(), Duration::from_secs(300));
        let mut rx = watch.subscribe();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), MeetingSnapshot::SignedOut);

        // Sender is dropped once the task exits
        assert!(rx.changed().await.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(!watch.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_is_raised_to_the_minimum() {
        let source = ScriptedSource::new(vec![Ok(vec![meeting("1")]), Ok(vec![meeting("2")])]);
        let started = tokio::time::Instant::now();
        let watch = MeetingWatch::start(source.clone(), "token".into(), Duration::ZERO);
        let mut rx = watch.subscribe();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), MeetingSnapshot::Ready(vec![meeting("1")]));

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), MeetingSnapshot::Ready(vec![meeting("2")]));
        assert!(started.elapsed() >= MIN_REFRESH_PERIOD);
        assert!(watch.is_running());

        watch.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_further_refreshes() {
        let source = ScriptedSource::new(vec![Ok(vec![meeting("1")])]);
        let watch = MeetingWatch::start(source.clone(), "token".into(), Duration::from_secs(300));
        let mut rx = watch.subscribe();

        rx.changed().await.unwrap();
        watch.stop().await;

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_watch_cancels_the_task() {
        let source = ScriptedSource::new(vec![Ok(vec![])]);
        let watch = MeetingWatch::start(source.clone(), "token".into(), Duration::from_secs(300));
        let mut rx = watch.subscribe();

        rx.changed().await.unwrap();
        drop(watch);

        assert!(rx.changed().await.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
