/// Host clock reading in whole milliseconds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(pub u64);

impl Time {
    pub fn ms(self) -> u64 {
        self.0
    }

    pub fn after(self, delay_ms: u64) -> Time {
        Time(self.0.saturating_add(delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::Time;

    #[test]
    fn after_saturates() {
        assert_eq!(Time(5).after(10), Time(15));
        assert_eq!(Time(u64::MAX).after(1), Time(u64::MAX));
    }
}
