pub mod bot;
pub mod config;
pub mod error;
pub mod http;
pub mod intent;
pub mod llm;
pub mod location;
pub mod places;
pub mod reply;
pub mod types;

// Re-export primary types for convenience
pub use bot::{EventKind, InboundEvent, MoodBot};
pub use config::{BotConfig, PlacesBackend, TransportMode};
pub use error::{ConfigError, ProviderError, TransportError};
pub use reply::{KeyboardHint, ReplySink, TextFormat};
pub use types::{Coordinate, Intent, PlaceResult, Rating, UserId};
