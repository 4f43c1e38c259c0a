// Engagement: reaction toggles and comment threads shared by every community
// domain (interview experiences, referrals, resume templates, salaries).
// One generic implementation; the Domain selects the collection.

pub mod collections;
pub mod comments;
pub mod handlers;
pub mod memory;
pub mod reactions;
pub mod store;
pub mod targets;
pub mod toggle;

pub use memory::MemoryEngagementStore;
pub use store::{EngagementStore, PgEngagementStore};
