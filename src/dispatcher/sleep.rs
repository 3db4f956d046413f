use std::time::Duration;

/// Pause requested by a sleep command, served after its result is delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeferredSleep {
    pending: Option<Duration>,
}

impl DeferredSleep {
    /// Arms the pause for a positive number of seconds; anything else clears it.
    pub fn arm(&mut self, seconds: i64) {
        self.pending = u64::try_from(seconds)
            .ok()
            .filter(|s| *s > 0)
            .map(Duration::from_secs);
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<Duration> {
        self.pending
    }

    /// Hands out the pending pause once.
    pub fn take(&mut self) -> Option<Duration> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_and_take_once() {
        let mut sleep = DeferredSleep::default();
        sleep.arm(3);
        assert_eq!(sleep.pending(), Some(Duration::from_secs(3)));
        assert_eq!(sleep.take(), Some(Duration::from_secs(3)));
        assert_eq!(sleep.take(), None);
    }

    #[test]
    fn test_non_positive_clears() {
        let mut sleep = DeferredSleep::default();
        sleep.arm(5);
        sleep.arm(0);
        assert_eq!(sleep.pending(), None);
        sleep.arm(5);
        sleep.arm(-2);
        assert_eq!(sleep.pending(), None);
    }
}
