/// Wall clock in milliseconds, used for rate limiting only
pub trait Clock {
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
    use std::{cell::Cell, rc::Rc};

    use super::Clock;

    /// clock that only moves when told to; clones share the same time
    #[derive(Clone, Default)]
    pub struct ManualClock {
        now: Rc<Cell<i64>>,
    }

    impl ManualClock {
        pub fn at(millis: i64) -> Self {
            Self {
                now: Rc::new(Cell::new(millis)),
            }
        }

        pub fn advance(&self, millis: i64) {
            self.now.set(self.now.get() + millis);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            self.now.get()
        }
    }
}
