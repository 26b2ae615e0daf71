use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use log::{info, warn};
#[cfg(test)]
use mockall::automock;
use tokio::{sync::watch, task::JoinHandle};

use super::{error::{ClientError, Result}, views::badge_text};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

pub type DynUnreadCountSource = Arc<dyn UnreadCountSource + Send + Sync>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UnreadCountSource {
    async fn unread_count(&self) -> Result<u64>;
}

#[derive(Debug, Clone, Default)]
pub struct PollState {
    /// Last successfully fetched count
    pub unread_count: u64,
    /// Most recent failure, kept after later polls succeed
    pub last_error: Option<Arc<ClientError>>,
    /// Whether the latest poll failed
    pub failing: bool,
}

impl PollState {
    pub fn badge_text(&self) -> Option<String> {
        badge_text(self.unread_count)
    }
}

///
/// Polls the unread notification count on a fixed interval. Polling stops
/// when the poller is dropped or the session expires.
/// 
pub struct NotificationPoller {
    handle: JoinHandle<()>,
    state_rx: watch::Receiver<PollState>,
}

impl NotificationPoller {
    pub fn spawn(source: DynUnreadCountSource) -> Self {
        Self::spawn_with_interval(source, DEFAULT_POLL_INTERVAL)
    }

    pub fn spawn_with_interval(source: DynUnreadCountSource, period: Duration) -> Self {
        let (state_tx, state_rx) = watch::channel(PollState::default());

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;

                match source.unread_count().await {
                    Ok(count) => state_tx.send_modify(|state| {
                        state.unread_count = count;
                        state.failing = false;
                    }),
                    Err(e) => {
                        warn!("Could not poll unread notifications: {}", e);
                        let expired = matches!(e, ClientError::SessionExpired { .. });
                        state_tx.send_modify(|state| {
                            state.last_error = Some(Arc::new(e));
                            state.failing = true;
                        });

                        if expired {
                            info!("Session expired, notification polling stopped");
                            break;
                        }
                    },
                }
            }
        });

        Self { handle, state_rx }
    }

    pub fn state(&self) -> PollState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state_rx.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for NotificationPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use reqwest::StatusCode;
    use tokio::time::timeout;

    use crate::client::SESSION_EXPIRED_REDIRECT;

    use super::*;

    const TEST_INTERVAL: Duration = Duration::from_millis(10);
    const WAIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_poll_failure_is_retained() -> anyhow::Result<()> {
        let calls = AtomicUsize::new(0);

        let mut source = MockUnreadCountSource::new();
        source.expect_unread_count().returning(move || {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 => Err(ClientError::StatusError(StatusCode::INTERNAL_SERVER_ERROR, String::from("down"))),
                _ => Ok(120),
            }
        });

        let poller = NotificationPoller::spawn_with_interval(Arc::new(source), TEST_INTERVAL);
        let mut state_rx = poller.subscribe();
        timeout(WAIT, state_rx.wait_for(|state| state.unread_count == 120)).await??;

        let state = poller.state();
        assert!(!state.failing);
        assert!(matches!(
            state.last_error.as_deref(), 
            Some(ClientError::StatusError(StatusCode::INTERNAL_SERVER_ERROR, _))
        ));
        assert_eq!(Some(String::from("99+")), state.badge_text());
        assert!(poller.is_running());

        Ok(())
    }

    #[tokio::test]
    async fn test_polling_stops_on_session_expiry() -> anyhow::Result<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_ref = calls.clone();

        let mut source = MockUnreadCountSource::new();
        source.expect_unread_count().returning(move || {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::SessionExpired { redirect: SESSION_EXPIRED_REDIRECT.to_string() })
        });

        let poller = NotificationPoller::spawn_with_interval(Arc::new(source), TEST_INTERVAL);
        let mut state_rx = poller.subscribe();
        timeout(WAIT, state_rx.wait_for(|state| state.failing)).await??;

        tokio::time::sleep(TEST_INTERVAL * 5).await;
        assert_eq!(1, calls.load(Ordering::SeqCst));
        assert!(!poller.is_running());
        assert_eq!(None, poller.state().badge_text());

        Ok(())
    }
}
