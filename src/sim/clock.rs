/// One simulated interval handed out by an [`IntervalClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// 1-based interval index.
    pub index: usize,
    /// Hour of day used for arrival sampling, `(index * interval_minutes / 60) % 24`.
    pub hour: u32,
}

/// A simulation clock that walks a run's intervals in order.
///
/// Intervals are numbered from 1; interval 0 is the empty station before any
/// vehicle has arrived and is never emitted.
///
/// # Examples
///
/// ```
/// use ev_load_sim::sim::clock::IntervalClock;
///
/// let mut clock = IntervalClock::new(3, 60);
/// let mut hours = Vec::new();
///
/// while let Some(tick) = clock.tick() {
///     hours.push(tick.hour);
/// }
/// assert_eq!(hours, vec![1, 2, 3]);
/// ```
pub struct IntervalClock {
    /// Last interval handed out (0 before the first tick).
    current: usize,
    /// Total intervals in the run.
    total: usize,
    interval_minutes: u32,
}

impl IntervalClock {
    /// Creates a clock covering `total` intervals of `interval_minutes` each.
    pub fn new(total: usize, interval_minutes: u32) -> Self {
        Self {
            current: 0,
            total,
            interval_minutes,
        }
    }

    /// Advances the clock by one interval.
    ///
    /// # Returns
    ///
    /// * `Some(tick)` - The next interval
    /// * `None` - If every interval has been handed out
    pub fn tick(&mut self) -> Option<Tick> {
        if self.current >= self.total {
            return None;
        }
        self.current += 1;
        let minutes = self.current as u64 * u64::from(self.interval_minutes);
        Some(Tick {
            index: self.current,
            hour: ((minutes / 60) % 24) as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clock() {
        let clock = IntervalClock::new(5, 15);
        assert_eq!(clock.current, 0);
        assert_eq!(clock.total, 5);
    }

    #[test]
    fn test_tick() {
        let mut clock = IntervalClock::new(2, 30);
        assert_eq!(clock.tick(), Some(Tick { index: 1, hour: 0 }));
        assert_eq!(clock.tick(), Some(Tick { index: 2, hour: 1 }));
        assert_eq!(clock.tick(), None);
    }

    #[test]
    fn test_hour_wraps_at_midnight() {
        let mut clock = IntervalClock::new(96 * 2, 15);
        let mut ticks = Vec::new();
        while let Some(tick) = clock.tick() {
            ticks.push(tick);
        }

        assert_eq!(ticks.len(), 192);
        // 95 * 15 min = 23:45, 96 * 15 min = 24:00 -> hour 0 of day 2
        assert_eq!(ticks[94].hour, 23);
        assert_eq!(ticks[95].hour, 0);
        assert_eq!(ticks[191].index, 192);
    }

    #[test]
    fn test_empty_clock() {
        let mut clock = IntervalClock::new(0, 15);
        assert_eq!(clock.tick(), None);
        assert_eq!(clock.tick(), None);
    }
}
