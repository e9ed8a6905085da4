//! Property-based tests
//!
//! Property tests verify invariants that should hold for all inputs,
//! rather than testing specific cases.
//!
//! ## Running Property Tests
//!
//! Run all property tests:
//! ```sh
//! cargo test property --release
//! ```
//!
//! ## Test Modules
//!
//! - `filter_props`: Filter normalization invariants
//!   - Normalization is idempotent
//!   - Normalized values always satisfy the backend's constraints
//!   - Query serialization emits one `tags` pair per tag
//!
//! - `pagination_props`: Result accumulation invariants
//!   - Accumulated order equals backend order, for any page split
//!   - Overlapping pages never produce duplicates
//!   - The accumulated list never exceeds `total_count`
//!
//! ## Configuration
//!
//! Proptest runs 256 cases per property by default; override with the
//! `PROPTEST_CASES` environment variable:
//!
//! ```sh
//! PROPTEST_CASES=1000 cargo test property --release
//! ```

mod filter_props;
mod pagination_props;
