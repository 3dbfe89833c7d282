use thiserror::Error;

/// Reasons a cache refuses to be constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The shard exponent is zero or would overflow the shard count.
    #[error("buckets_exp must be in 1..{max}, got {buckets_exp}", max = usize::BITS)]
    BucketsExp { buckets_exp: u32 },

    /// The capacity does not leave at least one slot per shard plus one.
    #[error("capacity {capacity} must be greater than the number of shards ({shards})")]
    CapacityTooSmall { capacity: usize, shards: usize },
}
