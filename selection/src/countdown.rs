/// Seconds left on the current hold.
///
/// Reaching zero never leaves the counter at zero: the tick that expires the
/// hold also resets it to the full hold length, ready for the next selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    hold: u32,
    remaining: u32,
}

impl Countdown {
    /// A zero hold is bumped to one second.
    pub fn new(hold_seconds: u32) -> Self {
        let hold = hold_seconds.max(1);
        Self {
            hold,
            remaining: hold,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn hold(&self) -> u32 {
        self.hold
    }

    pub fn restart(&mut self) {
        self.remaining = self.hold;
    }

    /// One second elapsed. Returns `true` when the hold just expired.
    pub fn tick(&mut self) -> bool {
        if self.remaining <= 1 {
            self.remaining = self.hold;
            true
        } else {
            self.remaining -= 1;
            false
        }
    }

    /// `m:ss`, as shown next to the seat count.
    pub fn display(&self) -> String {
        format!("{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_on_the_holdth_tick_and_resets() {
        let mut c = Countdown::new(300);

        for _ in 0..299 {
            assert!(!c.tick());
        }
        assert_eq!(c.remaining(), 1);

        assert!(c.tick());
        assert_eq!(c.remaining(), 300);
    }

    #[test]
    fn display_pads_seconds() {
        let mut c = Countdown::new(300);
        assert_eq!(c.display(), "5:00");

        for _ in 0..235 {
            c.tick();
        }
        assert_eq!(c.display(), "1:05");
    }

    #[test]
    fn zero_hold_is_one_second() {
        let mut c = Countdown::new(0);
        assert_eq!(c.hold(), 1);
        assert!(c.tick());
    }
}
