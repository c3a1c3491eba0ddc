//! Token→ciphertext storage tiers.

pub mod traits;
pub mod memory;
pub mod file;
pub mod redis;
pub mod tiered;

pub use traits::{ExternalTier, StoreError, WriteTier};
pub use memory::MemoryTier;
pub use file::FileTier;
pub use redis::RedisTier;
pub use tiered::TieredStore;
