//! Per-user bid rate limiting
//!
//! Token bucket per user id. Bid submission is the only hot write path,
//! so the limiter keys on the bidder rather than the route.

use dashmap::DashMap;
use std::time::Instant;
use types::ids::UserId;

use crate::error::AppError;

struct Bucket {
    tokens: f64,
    last_update: Instant,
}

pub struct BidRateLimiter {
    capacity: u32,
    refill_per_sec: f64,
    buckets: DashMap<UserId, Bucket>,
}

impl BidRateLimiter {
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        Self {
            capacity,
            refill_per_sec,
            buckets: DashMap::new(),
        }
    }

    /// Consume one token for the user, refilling by elapsed time first.
    pub fn check_user(&self, user: UserId) -> Result<(), AppError> {
        let mut bucket = self.buckets.entry(user).or_insert_with(|| Bucket {
            tokens: self.capacity as f64,
            last_update: Instant::now(),
        });

        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_update).as_secs_f64();
        bucket.tokens = f64::min(
            self.capacity as f64,
            bucket.tokens + elapsed * self.refill_per_sec,
        );
        bucket.last_update = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            Err(AppError::RateLimited(user))
        }
    }
}
