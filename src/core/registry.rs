//! # Poller registry — single authority for polling subscriptions.
//!
//! Maps [`PollerKey`] → handle of the spawned poll loop. Supports idempotent
//! register/unregister and a drain-style `cancel_all` for shutdown.
//!
//! ## Architecture
//! ```text
//! EventContext.register_poller(...)
//!         └─► Registry.register(key, poller, resource, interval)
//!                 └─► spawn poll_loop:
//!                       tick (immediately, then fixed period)
//!                         ├─► acquire poll-pool permit (cancellable)
//!                         ├─► poller.poll()
//!                         │     ├─ Ok(events) ─► EventManager::append
//!                         │     └─ Err(e)     ─► warn, keep schedule
//!                         └─► next tick
//! ```
//!
//! ## Rules
//! - Registry owns the subscription handles (JoinHandle + CancellationToken).
//! - `register` **overwrites** any prior handle for the same key; the old
//!   loop is implicitly orphaned (dropping a JoinHandle detaches). Callers
//!   are expected to unregister first; the registry does not enforce it.
//! - `unregister` is idempotent: a missing key is a logged no-op. It never
//!   awaits the loop; dropping the JoinHandle detaches it.
//! - Cancellation stops *future* ticks; a running invocation completes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::manager::EventManager;
use crate::events::{PollerKey, Resource};
use crate::pollers::PollerRef;

/// Handle to a running poll loop.
struct Handle {
    /// Join handle for the loop's execution.
    join: JoinHandle<()>,
    /// Individual cancellation token for this subscription.
    cancel: CancellationToken,
}

/// Registry of active polling subscriptions.
pub(crate) struct PollerRegistry {
    pollers: RwLock<HashMap<PollerKey, Handle>>,
}

impl PollerRegistry {
    /// Creates an empty registry.
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            pollers: RwLock::new(HashMap::new()),
        })
    }

    /// Schedules `poller` for recurring invocation and stores the handle.
    ///
    /// The first invocation is due immediately, subsequent ones at a fixed
    /// period of `interval`. Any prior handle under the same key is replaced
    /// and its loop orphaned.
    pub(crate) async fn register(
        &self,
        manager: Arc<EventManager>,
        key: PollerKey,
        poller: PollerRef,
        resource: Resource,
        interval: Duration,
    ) {
        let cancel = manager.runtime_token().child_token();
        let loop_token = cancel.clone();
        let join = tokio::spawn(poll_loop(manager, poller, resource, interval, loop_token));

        let mut pollers = self.pollers.write().await;
        if pollers.insert(key.clone(), Handle { join, cancel }).is_some() {
            warn!(
                ?key,
                "replaced existing poller registration; previous loop orphaned"
            );
        } else {
            debug!(?key, ?interval, "poller registered");
        }
    }

    /// Cancels and removes the subscription under `key`, if present.
    ///
    /// Missing keys are tolerated; the poller may have never been registered
    /// or already unregistered. Prevents future invocations only: an
    /// in-flight invocation runs to completion and the loop is detached,
    /// never joined. A poller that unregisters itself from inside `poll()`
    /// would otherwise await its own task.
    pub(crate) async fn unregister(&self, key: &PollerKey) {
        match self.take_handle(key).await {
            Some(handle) => {
                handle.cancel.cancel();
                drop(handle.join);
                debug!(?key, "poller unregistered");
            }
            None => debug!(?key, "unregister for unknown poller; ignoring"),
        }
    }

    /// Returns true when a subscription exists under `key`.
    #[allow(dead_code)]
    pub(crate) async fn contains(&self, key: &PollerKey) -> bool {
        self.pollers.read().await.contains_key(key)
    }

    /// Returns true if no subscriptions are active.
    #[allow(dead_code)]
    pub(crate) async fn is_empty(&self) -> bool {
        self.pollers.read().await.is_empty()
    }

    /// Cancels every subscription and waits for the loops to finish.
    ///
    /// Graceful drain: a loop that is mid-invocation completes its current
    /// poll before observing cancellation.
    pub(crate) async fn cancel_all(&self) {
        let handles: Vec<(PollerKey, Handle)> = {
            let mut pollers = self.pollers.write().await;
            pollers.drain().collect()
        };

        for (_, h) in &handles {
            h.cancel.cancel();
        }
        for (key, h) in handles {
            join_and_report(&key, h.join).await;
        }
    }

    /// Atomically removes the handle under `key`.
    async fn take_handle(&self, key: &PollerKey) -> Option<Handle> {
        let mut pollers = self.pollers.write().await;
        pollers.remove(key)
    }
}

/// Awaits a loop's join handle; a panicked loop is logged, never raised.
async fn join_and_report(key: &PollerKey, join: JoinHandle<()>) {
    if join.await.is_err() {
        warn!(?key, "poll loop panicked before shutdown");
    }
    debug!(?key, "poll loop drained");
}

/// Recurring poll loop for one subscription.
///
/// Invocations are gated by the shared poll-worker semaphore, so however
/// many pollers are registered, at most `poll_worker_pool_size` polls run
/// concurrently. A failed invocation is logged and the schedule continues.
async fn poll_loop(
    manager: Arc<EventManager>,
    poller: PollerRef,
    resource: Resource,
    interval: Duration,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                let permit_future = manager.poll_semaphore().clone().acquire_owned();
                tokio::pin!(permit_future);

                let _permit = tokio::select! {
                    res = &mut permit_future => match res {
                        Ok(permit) => permit,
                        Err(_closed) => break,
                    },
                    _ = token.cancelled() => break,
                };

                match poller.poll().await {
                    Ok(events) if !events.is_empty() => {
                        manager.append(events, &resource).await;
                    }
                    Ok(_) => {}
                    Err(e) => warn!(
                        resource = %resource.name,
                        event_type = poller.event_type(),
                        label = e.as_label(),
                        error = %e,
                        "poll invocation failed; schedule continues",
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::config::EventConfig;
    use crate::core::manager::EventManager;
    use crate::error::PollError;
    use crate::events::{Event, Severity, StaticResolver};
    use crate::pollers::PollerFn;

    fn quiet_config() -> EventConfig {
        EventConfig {
            // keep the sender inert for the duration of these tests
            send_initial_delay: Duration::from_secs(3600),
            min_polling_interval: Duration::from_millis(10),
            ..EventConfig::default()
        }
    }

    fn manager() -> Arc<EventManager> {
        let resolver = StaticResolver::new().declare("FileSystem", "logEntry");
        let m = EventManager::builder(quiet_config(), resolver).build();
        m.start();
        m
    }

    fn resource() -> Resource {
        Resource::new(5, "fs-root", "FileSystem")
    }

    #[tokio::test(start_paused = true)]
    async fn registered_poller_feeds_the_live_batch() {
        let m = manager();
        let key = PollerKey::new(5, "logEntry", Some("/var/log/syslog"));
        let poller = PollerFn::arc("logEntry", || async {
            Ok::<_, PollError>(vec![Event::new(
                "logEntry",
                Severity::Info,
                "line",
                "/var/log/syslog",
            )])
        });

        m.registry()
            .register(
                m.clone(),
                key.clone(),
                poller,
                resource(),
                Duration::from_secs(30),
            )
            .await;

        // First tick fires immediately; give the loop a chance to run it.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(m.swap_batch().await.len(), 1);

        // And again on the next period.
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(m.swap_batch().await.len() >= 1);

        m.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn unregister_is_idempotent_and_stops_future_ticks() {
        let m = manager();
        let key = PollerKey::new(5, "logEntry", None);
        let polls = Arc::new(AtomicU32::new(0));
        let seen = polls.clone();
        let poller = PollerFn::arc("logEntry", move || {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok::<Vec<Event>, PollError>(Vec::new())
            }
        });

        m.registry()
            .register(
                m.clone(),
                key.clone(),
                poller,
                resource(),
                Duration::from_secs(10),
            )
            .await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        let before = polls.load(Ordering::SeqCst);
        assert!(before >= 1);

        m.registry().unregister(&key).await;
        assert!(!m.registry().contains(&key).await);

        // Unregistering again, and a never-registered key, must not panic.
        m.registry().unregister(&key).await;
        m.registry()
            .unregister(&PollerKey::new(99, "logEntry", None))
            .await;

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(
            polls.load(Ordering::SeqCst),
            before,
            "no ticks after unregister"
        );

        m.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn poller_may_unregister_itself_mid_invocation() {
        let m = manager();
        let key = PollerKey::new(5, "logEntry", Some("/var/log/rotated.log"));
        let polls = Arc::new(AtomicU32::new(0));
        let poller = {
            let m = m.clone();
            let key = key.clone();
            let seen = polls.clone();
            PollerFn::arc("logEntry", move || {
                let m = m.clone();
                let key = key.clone();
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    m.registry().unregister(&key).await;
                    Ok::<Vec<Event>, PollError>(Vec::new())
                }
            })
        };

        m.registry()
            .register(
                m.clone(),
                key.clone(),
                poller,
                resource(),
                Duration::from_secs(10),
            )
            .await;

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(polls.load(Ordering::SeqCst), 1);
        assert!(!m.registry().contains(&key).await);

        // The invocation completed and its worker permit was released.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(
            polls.load(Ordering::SeqCst),
            1,
            "no ticks after self-unregister"
        );
        assert_eq!(
            m.poll_semaphore().available_permits(),
            quiet_config().poll_permits()
        );

        m.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_poll_keeps_the_schedule_alive() {
        let m = manager();
        let key = PollerKey::new(5, "logEntry", None);
        let polls = Arc::new(AtomicU32::new(0));
        let seen = polls.clone();
        let poller = PollerFn::arc("logEntry", move || {
            let seen = seen.clone();
            async move {
                let n = seen.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(PollError::fail("transient read error"))
                } else {
                    Ok(Vec::<Event>::new())
                }
            }
        });

        m.registry()
            .register(m.clone(), key, poller, resource(), Duration::from_secs(10))
            .await;

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert!(
            polls.load(Ordering::SeqCst) >= 2,
            "next tick still ran after a poll failure"
        );

        m.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn re_register_overwrites_the_previous_handle() {
        let m = manager();
        let key = PollerKey::new(5, "logEntry", Some("/var/log/app.log"));
        let mk = |polls: Arc<AtomicU32>| {
            PollerFn::arc("logEntry", move || {
                let polls = polls.clone();
                async move {
                    polls.fetch_add(1, Ordering::SeqCst);
                    Ok::<Vec<Event>, PollError>(Vec::new())
                }
            })
        };

        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        m.registry()
            .register(
                m.clone(),
                key.clone(),
                mk(first.clone()),
                resource(),
                Duration::from_secs(10),
            )
            .await;
        m.registry()
            .register(
                m.clone(),
                key.clone(),
                mk(second.clone()),
                resource(),
                Duration::from_secs(10),
            )
            .await;

        assert!(m.registry().contains(&key).await);
        m.registry().unregister(&key).await;
        assert!(m.registry().is_empty().await);

        m.shutdown().await;
    }
}
