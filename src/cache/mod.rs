//! Hotelier Cache System
//!
//! Query-keyed cache-aside layer for paginated, filterable resource
//! collections:
//!
//! - **Fingerprints**: stable 128-bit digests of query descriptors, used as
//!   collection key suffixes
//! - **Orchestrator**: read-through on miss, direct `put`/`invalidate` on
//!   mutation, fail-open on store errors
//! - **Store**: in-memory LRU with per-entry TTL enforced on read
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `hotelier.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! capacity = 1024
//! entity_ttl_seconds = 60
//! collection_ttl_seconds = 10
//! ```

mod aside;
mod config;
mod fingerprint;
mod keys;
mod lock;
mod registry;
mod store;

pub use aside::{CacheAside, Fetched};
pub use config::{CacheConfig, TtlPolicy};
pub use fingerprint::{FINGERPRINT_HEX_LEN, Fingerprint, FingerprintError};
pub use keys::{CacheKey, ResourceKind};
pub use registry::CollectionRegistry;
pub use store::{CacheEntry, CacheStore, CacheStoreError, MemoryStore, Ttl};
