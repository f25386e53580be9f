//! # tradepost-exchange
//!
//! The barter core: decides whether a two-party trade may commit and
//! applies it atomically.
//!
//! ## Components
//!
//! 1. **catalog**: [`ResourceCatalog`], name → value weight, loaded once
//! 2. **eligibility**: [`EligibilityCache`] trait and the in-memory
//!    [`InMemoryEligibilityCache`]
//! 3. **validator**: [`validate`] sufficiency and equal-value checks
//! 4. **orchestrator**: [`TradeOrchestrator`] sequencing one trade
//! 5. **reply**: [`TradeReply`] mapping the outcome to a response
//!
//! Storage (locking read, transfer write, live quarantine query) lives in
//! `tradepost-store`.

pub mod catalog;
pub mod eligibility;
pub mod orchestrator;
pub mod reply;
pub mod validator;

pub use catalog::ResourceCatalog;
pub use eligibility::{EligibilityCache, InMemoryEligibilityCache};
pub use orchestrator::TradeOrchestrator;
pub use reply::TradeReply;
pub use validator::validate;
