pub mod classifier;
pub mod store;

pub use classifier::classify;
pub use store::{InMemoryIntentStore, IntentStore};
