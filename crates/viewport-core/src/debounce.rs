use instant::Instant;
use std::time::Duration;

/// Trailing-edge debouncer driven by the frame clock. Each `schedule` pushes
/// the deadline out; `poll` fires once after the input has been quiet for
/// the full delay.
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once, on the first poll at or after the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescheduling_pushes_the_deadline() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(150));
        d.schedule(t0);
        d.schedule(t0 + Duration::from_millis(100));
        assert!(!d.poll(t0 + Duration::from_millis(200)));
        assert!(d.poll(t0 + Duration::from_millis(250)));
        assert!(!d.poll(t0 + Duration::from_millis(400)));
    }

    #[test]
    fn cancel_drops_the_pending_fire() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(150));
        d.schedule(t0);
        d.cancel();
        assert!(!d.is_pending());
        assert!(!d.poll(t0 + Duration::from_secs(1)));
    }
}
