use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    items_created: AtomicU64,
    pickups: AtomicU64,
    dropoffs: AtomicU64,
    scans: AtomicU64,
    registrations: AtomicU64,
    side_effect_failures: AtomicU64,
}

impl Metrics {
    pub fn record_item_created(&self) {
        self.items_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pickup(&self) {
        self.pickups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropoff(&self) {
        self.dropoffs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan(&self) {
        self.scans.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_registration(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_side_effect_failure(&self) {
        self.side_effect_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn side_effect_failures(&self) -> u64 {
        self.side_effect_failures.load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self) -> String {
        let items = self.items_created.load(Ordering::Relaxed);
        let pickups = self.pickups.load(Ordering::Relaxed);
        let dropoffs = self.dropoffs.load(Ordering::Relaxed);
        let scans = self.scans.load(Ordering::Relaxed);
        let registrations = self.registrations.load(Ordering::Relaxed);
        let failures = self.side_effect_failures.load(Ordering::Relaxed);

        format!(
            "# TYPE tradepost_items_created_total counter\n\
tradepost_items_created_total {}\n\
# TYPE tradepost_pickups_total counter\n\
tradepost_pickups_total {}\n\
# TYPE tradepost_dropoffs_total counter\n\
tradepost_dropoffs_total {}\n\
# TYPE tradepost_scans_total counter\n\
tradepost_scans_total {}\n\
# TYPE tradepost_registrations_total counter\n\
tradepost_registrations_total {}\n\
# TYPE tradepost_side_effect_failures_total counter\n\
tradepost_side_effect_failures_total {}\n",
            items, pickups, dropoffs, scans, registrations, failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prometheus_output_reflects_counters() {
        let metrics = Metrics::default();
        metrics.record_pickup();
        metrics.record_pickup();
        metrics.record_side_effect_failure();
        let text = metrics.render_prometheus();
        assert!(text.contains("tradepost_pickups_total 2\n"));
        assert!(text.contains("tradepost_side_effect_failures_total 1\n"));
        assert!(text.contains("tradepost_scans_total 0\n"));
    }
}
