use std::collections::HashMap;
use std::sync::Mutex;
use time::{OffsetDateTime, Duration};
use thiserror::Error;
use tracing::{warn, error};

#[derive(Debug, Error)]
#[error("Too many attempts. Please try again in {minutes} minutes.")]
pub struct RateLimited {
    pub minutes: i64,
}

#[derive(Debug)]
struct Window {
    attempts: u32,
    started: OffsetDateTime,
}

/// Fixed-window attempt counter keyed by caller.
#[derive(Debug)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    max_attempts: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window_minutes: i64) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_attempts: max_attempts.max(1),
            window: Duration::minutes(window_minutes.max(1)),
        }
    }

    pub fn check_rate_limit(&self, key: &str) -> Result<(), RateLimited> {
        self.check_at(key, OffsetDateTime::now_utc())
    }

    fn check_at(&self, key: &str, now: OffsetDateTime) -> Result<(), RateLimited> {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("Failed to acquire rate limit lock: {}", e);
                return Err(RateLimited { minutes: 1 });
            }
        };

        windows.retain(|_, w| now - w.started <= self.window * 2);

        let window = windows.entry(key.to_string()).or_insert(Window { attempts: 0, started: now });
        if now - window.started > self.window {
            *window = Window { attempts: 0, started: now };
        }

        if window.attempts >= self.max_attempts {
            let minutes = (window.started + self.window - now).whole_minutes().max(1);
            warn!("Rate limit triggered for key {}", key);
            return Err(RateLimited { minutes });
        }

        window.attempts += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_after_max_attempts() {
        let limiter = RateLimiter::new(2, 5);
        let now = OffsetDateTime::now_utc();
        assert!(limiter.check_at("a", now).is_ok());
        assert!(limiter.check_at("a", now).is_ok());
        let err = limiter.check_at("a", now).unwrap_err();
        assert_eq!(err.minutes, 5);
        assert!(limiter.check_at("b", now).is_ok(), "keys are independent");
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::new(1, 1);
        let now = OffsetDateTime::now_utc();
        assert!(limiter.check_at("a", now).is_ok());
        assert!(limiter.check_at("a", now + Duration::seconds(30)).is_err());
        assert!(limiter.check_at("a", now + Duration::seconds(61)).is_ok());
    }
}
