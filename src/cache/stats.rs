/// Hit, miss and eviction counts collected since the previous call to
/// [`Cache::stats`](crate::Cache::stats).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Stats {
    pub miss_count: u64,
    pub hit_count: u64,
    pub eviction_count: u64,
    pub millis_elapsed: u128,
}

impl Stats {
    /// Fraction of lookups that were hits, or `None` if there were no lookups.
    pub fn hit_ratio(&self) -> Option<f64> {
        let lookups = self.hit_count + self.miss_count;
        if lookups == 0 {
            return None;
        }
        Some(self.hit_count as f64 / lookups as f64)
    }
}

/// Per-shard counters. Only touched while the shard lock is held.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    hit_count: u64,
    miss_count: u64,
    eviction_count: u64,
}

impl Counters {
    pub(crate) fn record_hit(&mut self) {
        self.hit_count += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.miss_count += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.eviction_count += 1;
    }

    /// Adds the counts to `stats` and resets them.
    pub(crate) fn drain_into(&mut self, stats: &mut Stats) {
        stats.hit_count += self.hit_count;
        stats.miss_count += self.miss_count;
        stats.eviction_count += self.eviction_count;
        *self = Counters::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_drains_and_resets_counters() {
        // given
        let mut counters = Counters::default();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();
        counters.record_eviction();
        let mut stats = Stats::default();

        // when
        counters.drain_into(&mut stats);
        counters.drain_into(&mut stats);

        // then
        assert_eq!(stats.hit_count, 2);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.eviction_count, 1);
    }

    #[test]
    fn it_computes_the_hit_ratio() {
        // given
        let stats = Stats {
            hit_count: 3,
            miss_count: 1,
            ..Stats::default()
        };

        // then
        assert_eq!(stats.hit_ratio(), Some(0.75));
        assert_eq!(Stats::default().hit_ratio(), None);
    }
}
