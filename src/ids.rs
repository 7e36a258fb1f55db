use chrono::{Timelike, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

static GLOBAL: IdGenerator = IdGenerator::new();

/// Two-part id source: a clock/sequence prefix that is unique per generator,
/// followed by a random suffix so ids from separate generators don't collide.
#[derive(Debug)]
pub struct IdGenerator {
    seq: AtomicU64,
}

impl IdGenerator {
    pub const fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
        }
    }

    pub fn next_id(&self) -> String {
        let millis = Utc::now().timestamp_millis();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let suffix: u32 = rand::random();
        format!("{:x}-{:x}-{:08x}", millis, seq, suffix)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide id, no setup required.
pub fn next_id() -> String {
    GLOBAL.next_id()
}

/// Formats a time of day as `H:MM am|pm`.
pub fn display_timestamp<T: Timelike>(now: &T) -> String {
    let (pm, hour) = now.hour12();
    let meridiem = if pm { "pm" } else { "am" };
    format!("{}:{:02} {}", hour, now.minute(), meridiem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use std::collections::HashSet;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn tight_loop_ids_are_distinct() {
        let ids = IdGenerator::new();
        let seen: HashSet<String> = (0..5000).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 5000);
    }

    #[test]
    fn id_parts_are_separated() {
        let ids = IdGenerator::new();
        ids.seq.store(0x10000, Ordering::Relaxed);

        let id = ids.next_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1], "10000");
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn global_ids_are_distinct() {
        let seen: HashSet<String> = (0..1000).map(|_| next_id()).collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn midnight_wraps_to_twelve() {
        assert_eq!(display_timestamp(&at(0, 5)), "12:05 am");
    }

    #[test]
    fn afternoon_uses_pm() {
        assert_eq!(display_timestamp(&at(13, 0)), "1:00 pm");
        assert_eq!(display_timestamp(&at(23, 59)), "11:59 pm");
    }

    #[test]
    fn noon_is_pm() {
        assert_eq!(display_timestamp(&at(12, 30)), "12:30 pm");
        assert_eq!(display_timestamp(&at(11, 9)), "11:09 am");
    }
}
