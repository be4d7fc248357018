//! Request correlation and baseline tracking for the event channel.

/// Wrapping 16-bit counter tagging each event request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestCounter(u16);

impl RequestCounter {
    /// Start counting from `value`.
    #[must_use]
    pub const fn starting_at(value: u16) -> Self { Self(value) }

    /// Return the counter for the next request and advance, wrapping at
    /// 65536.
    ///
    /// # Examples
    ///
    /// ```
    /// use scopeview::event::RequestCounter;
    ///
    /// let mut counter = RequestCounter::starting_at(u16::MAX);
    /// assert_eq!(counter.next_value(), u16::MAX);
    /// assert_eq!(counter.next_value(), 0);
    /// ```
    pub fn next_value(&mut self) -> u16 {
        let current = self.0;
        self.0 = current.wrapping_add(1);
        current
    }

    /// Counter the next request will carry.
    #[must_use]
    pub const fn peek(&self) -> u16 { self.0 }
}

/// Detects changes of the device's event counter.
///
/// The first observation only establishes the baseline so that a non-zero
/// counter at startup does not trigger a save.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventMonitor {
    baseline: Option<u16>,
}

impl EventMonitor {
    /// Create a monitor without a baseline.
    #[must_use]
    pub const fn new() -> Self { Self { baseline: None } }

    /// Record `server_counter`, returning `true` when it differs from the
    /// baseline.
    pub fn observe(&mut self, server_counter: u16) -> bool {
        match self.baseline.replace(server_counter) {
            None => false,
            Some(previous) => previous != server_counter,
        }
    }

    /// Last observed device counter.
    #[must_use]
    pub const fn baseline(&self) -> Option<u16> { self.baseline }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{EventMonitor, RequestCounter};

    #[rstest]
    #[case::unchanged_then_changed(&[100, 100, 101], &[false, false, true])]
    #[case::first_sample_never_signals(&[7], &[false])]
    #[case::each_change_signals(&[1, 2, 2, 3], &[false, true, false, true])]
    #[case::wrap_is_a_change(&[u16::MAX, 0], &[false, true])]
    fn signals_only_on_change(#[case] counters: &[u16], #[case] expected: &[bool]) {
        let mut monitor = EventMonitor::new();
        let signals: Vec<bool> = counters.iter().map(|&c| monitor.observe(c)).collect();
        assert_eq!(signals, expected);
        assert_eq!(monitor.baseline(), counters.last().copied());
    }

    #[test]
    fn request_counter_wraps() {
        let mut counter = RequestCounter::starting_at(65_534);
        assert_eq!(counter.next_value(), 65_534);
        assert_eq!(counter.next_value(), 65_535);
        assert_eq!(counter.next_value(), 0);
        assert_eq!(counter.peek(), 1);
    }
}
