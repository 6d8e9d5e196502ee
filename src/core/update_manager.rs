//! Update manager for scheduling source updates

use super::AppContext;
use jsens_core::CALENDAR_POLL_INTERVAL;
use log::{error, info, trace};
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

/// Drives every visible source on its own interval from a single task
#[derive(Debug, Default)]
pub struct UpdateManager {
    /// Last update per source id
    last_updates: HashMap<String, Instant>,
}

impl UpdateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update each visible source whose interval has elapsed.
    ///
    /// Returns whether anything was updated.
    pub fn tick(&mut self, ctx: &mut AppContext, now: Instant) -> bool {
        let mut updated = false;

        for source in ctx.visible_sources_mut() {
            let id = source.metadata().id.clone();
            let due = self.last_updates.get(&id).map_or(true, |last| {
                now.saturating_duration_since(*last) >= source.update_interval()
            });
            if !due {
                continue;
            }

            trace!("Updating source {}", id);
            if let Err(e) = source.update() {
                error!("Failed to update source {}: {}", id, e);
            }
            self.last_updates.insert(id, now);
            updated = true;
        }

        updated
    }

    /// Time until the next visible source is due
    pub fn next_due(&self, ctx: &AppContext, now: Instant) -> Duration {
        ctx.visible_sources()
            .iter()
            .map(|source| match self.last_updates.get(&source.metadata().id) {
                Some(last) => source
                    .update_interval()
                    .saturating_sub(now.saturating_duration_since(*last)),
                None => Duration::ZERO,
            })
            .min()
            .unwrap_or(CALENDAR_POLL_INTERVAL)
    }

    /// Poll until `shutdown` resolves, calling `on_update` after every tick
    /// that refreshed something.
    pub async fn run<F, S>(&mut self, ctx: &mut AppContext, mut on_update: F, shutdown: S)
    where
        F: FnMut(&AppContext),
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            if self.tick(ctx, Instant::now()) {
                on_update(ctx);
            }

            let wait = self.next_due(ctx, Instant::now());
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = &mut shutdown => {
                    info!("Stopping update loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::app_context::tests::context_in;
    use super::*;
    use crate::config::Panel;
    use jsens_core::DataSource;

    #[test]
    fn test_tick_respects_intervals() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_in(&dir);
        let mut manager = UpdateManager::new();
        let t0 = Instant::now();

        assert!(manager.tick(&mut ctx, t0));
        assert_eq!(ctx.network().get_text("status"), "baseline");
        assert!(!ctx.calendar().get_text("date_string").is_empty());

        // Nothing is due yet
        assert!(!manager.tick(&mut ctx, t0 + Duration::from_millis(500)));
        assert_eq!(
            manager.next_due(&ctx, t0 + Duration::from_millis(500)),
            Duration::from_millis(500)
        );

        // Network is due, calendar is not
        assert!(manager.tick(&mut ctx, t0 + Duration::from_millis(1000)));
        assert_eq!(ctx.network().get_text("status"), "rate");
        assert_eq!(
            manager.next_due(&ctx, t0 + Duration::from_millis(1000)),
            Duration::from_millis(1000)
        );
    }

    #[test]
    fn test_interval_change_applies_on_next_tick() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_in(&dir);
        let mut manager = UpdateManager::new();
        let t0 = Instant::now();
        manager.tick(&mut ctx, t0);

        ctx.set_polling_interval(3000);
        assert!(!manager.tick(&mut ctx, t0 + Duration::from_millis(1500)));
        assert!(manager.tick(&mut ctx, t0 + Duration::from_millis(3000)));
        assert_eq!(ctx.network().update_interval(), Duration::from_millis(3000));
    }

    #[test]
    fn test_hidden_panels_are_not_polled() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_in(&dir);
        ctx.toggle_panel(Panel::Network).unwrap();

        let mut manager = UpdateManager::new();
        let t0 = Instant::now();
        manager.tick(&mut ctx, t0);
        manager.tick(&mut ctx, t0 + Duration::from_secs(1));
        assert_eq!(ctx.network().get_text("status"), "baseline");
        assert_eq!(manager.next_due(&ctx, t0), CALENDAR_POLL_INTERVAL);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_in(&dir);
        let mut manager = UpdateManager::new();
        let mut renders = 0;

        manager
            .run(
                &mut ctx,
                |_| renders += 1,
                tokio::time::sleep(Duration::from_millis(1500)),
            )
            .await;

        assert!(renders >= 2);
        assert_eq!(ctx.network().get_text("status"), "rate");
    }
}
