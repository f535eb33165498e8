//! # Sender loop: swap the live batch and forward it, at a fixed rate.
//!
//! Runs as one background task spawned by [`EventManager::start`]. Each tick
//! spawns a send worker (swap, then forward) gated by the send-pool
//! semaphore, so a slow send neither delays the cadence nor blocks the
//! collection path — it only occupies one of the pool's permits.
//!
//! ## Rules
//! - Ticks are **fixed-rate**: anchored to the start instant, not to send
//!   completion (`scheduleAtFixedRate` semantics, including catch-up ticks
//!   after a stall).
//! - When every send worker is busy at a tick, the cycle is skipped with a
//!   warning; the live batch keeps accumulating, still capacity-bounded.
//! - Network I/O happens strictly after the swap; the batch lock is never
//!   held across a send.
//! - Cancellation drains: in-flight sends run to completion before the loop
//!   exits.

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::core::manager::EventManager;

/// Recurring swap-and-send loop; exits when `token` is cancelled.
pub(crate) async fn sender_loop(manager: Arc<EventManager>, token: CancellationToken) {
    let initial_delay = manager.cfg().send_initial_delay;
    let period = manager.cfg().send_period_clamped();
    let mut ticker = interval_at(Instant::now() + initial_delay, period);
    let mut inflight: JoinSet<()> = JoinSet::new();

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                reap_finished(&mut inflight);

                match manager.send_semaphore().clone().try_acquire_owned() {
                    Ok(permit) => {
                        let manager = Arc::clone(&manager);
                        inflight.spawn(async move {
                            let batch = manager.swap_batch().await;
                            manager.send_batch(batch).await;
                            drop(permit);
                        });
                    }
                    Err(_) => warn!("all send workers busy; skipping send cycle"),
                }
            }
        }
    }

    // Graceful drain: let in-flight sends finish, never hard-cancel them.
    while let Some(res) = inflight.join_next().await {
        if res.is_err() {
            error!("send worker panicked");
        }
    }
}

/// Reaps already-finished send workers without blocking.
fn reap_finished(inflight: &mut JoinSet<()>) {
    while let Some(res) = inflight.try_join_next() {
        if res.is_err() {
            error!("send worker panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Mutex as AsyncMutex;

    use crate::config::EventConfig;
    use crate::error::TransportError;
    use crate::events::{Event, EventSource, Resource, Severity, StaticResolver};
    use crate::transport::EventTransport;

    struct CountingTransport {
        sends: AsyncMutex<Vec<usize>>,
    }

    #[async_trait]
    impl EventTransport for CountingTransport {
        async fn send(
            &self,
            events_by_source: HashMap<EventSource, Vec<Event>>,
        ) -> Result<(), TransportError> {
            let total = events_by_source.values().map(Vec::len).sum();
            self.sends.lock().await.push(total);
            Ok(())
        }
    }

    struct SlowThenFastTransport {
        base: Instant,
        /// (seconds since `base` at send start, batch size) per send.
        starts: AsyncMutex<Vec<(u64, usize)>>,
        first_send_delay: Duration,
    }

    #[async_trait]
    impl EventTransport for SlowThenFastTransport {
        async fn send(
            &self,
            events_by_source: HashMap<EventSource, Vec<Event>>,
        ) -> Result<(), TransportError> {
            let total = events_by_source.values().map(Vec::len).sum();
            let first = {
                let mut starts = self.starts.lock().await;
                starts.push((self.base.elapsed().as_secs(), total));
                starts.len() == 1
            };
            if first {
                tokio::time::sleep(self.first_send_delay).await;
            }
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_sender_ships_accumulated_events() {
        let cfg = EventConfig {
            send_initial_delay: Duration::from_secs(10),
            send_period: Duration::from_secs(30),
            ..EventConfig::default()
        };
        let transport = Arc::new(CountingTransport {
            sends: AsyncMutex::new(Vec::new()),
        });
        let resolver = StaticResolver::new().declare("PostgresServer", "logEntry");
        let m = crate::EventManager::builder(cfg, resolver)
            .with_transport_arc(transport.clone())
            .build();
        m.start();

        let res = Resource::new(1, "postgres-main", "PostgresServer");
        m.append(
            vec![Event::new(
                "logEntry",
                Severity::Info,
                "hello",
                "/var/log/pg.log",
            )],
            &res,
        )
        .await;

        // Cross the initial delay; the first cycle should ship one event.
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(transport.sends.lock().await.as_slice(), &[1]);

        // An empty cycle ships nothing.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(transport.sends.lock().await.len(), 1);

        // More events, next cycle picks them up.
        m.append(
            vec![
                Event::new("logEntry", Severity::Info, "a", "/var/log/pg.log"),
                Event::new("logEntry", Severity::Info, "b", "/var/log/pg.log"),
            ],
            &res,
        )
        .await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(transport.sends.lock().await.as_slice(), &[1, 2]);

        m.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn slow_send_skips_busy_cycles_and_keeps_the_cadence_anchored() {
        let cfg = EventConfig {
            send_initial_delay: Duration::from_secs(10),
            send_period: Duration::from_secs(30),
            send_worker_pool_size: 1,
            ..EventConfig::default()
        };
        // First send stalls past two whole periods.
        let transport = Arc::new(SlowThenFastTransport {
            base: Instant::now(),
            starts: AsyncMutex::new(Vec::new()),
            first_send_delay: Duration::from_secs(70),
        });
        let resolver = StaticResolver::new().declare("PostgresServer", "logEntry");
        let m = crate::EventManager::builder(cfg, resolver)
            .with_transport_arc(transport.clone())
            .build();
        m.start();

        let res = Resource::new(1, "postgres-main", "PostgresServer");
        m.append(
            vec![Event::new(
                "logEntry",
                Severity::Info,
                "hello",
                "/var/log/pg.log",
            )],
            &res,
        )
        .await;

        // First cycle fires at t=10 and its send stalls until t=80.
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(transport.starts.lock().await.as_slice(), &[(10, 1)]);

        // Accumulates while the lone send worker is busy.
        m.append(
            vec![Event::new(
                "logEntry",
                Severity::Info,
                "later",
                "/var/log/pg.log",
            )],
            &res,
        )
        .await;

        // The ticks at t=40 and t=70 find the worker busy and are skipped,
        // not queued: nothing starts when the permit frees at t=80.
        tokio::time::sleep(Duration::from_secs(79)).await;
        assert_eq!(transport.starts.lock().await.len(), 1);

        // Next send starts at the anchored tick t=100, not t=110; it ships
        // what accumulated across the skipped cycles.
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(
            transport.starts.lock().await.as_slice(),
            &[(10, 1), (100, 1)]
        );

        m.shutdown().await;
    }
}
