//! Message routing: intent selection, location resolution, place search and
//! the conversational fallback.
//!
//! Every branch that talks to a provider ends with exactly one terminal
//! reply (places + closing prompt, "nothing found" or an apology). Provider
//! errors are logged here and never reach the user.

use reqwest::Client;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::config::BotConfig;
use crate::error::{ConfigError, TransportError};
use crate::intent::{classify, InMemoryIntentStore, IntentStore};
use crate::llm::{CompletionProvider, ConversationalFallback, OpenRouterProvider};
use crate::location::{Geocoder, LocationResolver, NominatimGeocoder, Resolution};
use crate::places::{build_places_provider, PlaceSearch, PlaceSearchProvider, SearchOutcome};
use crate::reply::{fit_message, messages, render_place, KeyboardHint, ReplySink, TextFormat};
use crate::types::{Coordinate, Intent, LocationQuery, UserId};

/// Category searched when a location arrives before any selection.
pub const DEFAULT_INTENT: Intent = Intent::Restaurant;

/// A transport-neutral inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub user_id: UserId,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// `/name args`, with any `@botname` suffix already stripped.
    Command { name: String, args: String },
    Text(String),
    /// Raw shared geolocation; validated before use.
    Location { latitude: f64, longitude: f64 },
}

impl InboundEvent {
    pub fn text(user_id: impl Into<UserId>, text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            kind: EventKind::Text(text.into()),
        }
    }

    pub fn location(user_id: impl Into<UserId>, latitude: f64, longitude: f64) -> Self {
        Self {
            user_id: user_id.into(),
            kind: EventKind::Location {
                latitude,
                longitude,
            },
        }
    }

    pub fn command(
        user_id: impl Into<UserId>,
        name: impl Into<String>,
        args: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind: EventKind::Command {
                name: name.into(),
                args: args.into(),
            },
        }
    }
}

/// The orchestration service. Cheap to share behind an `Arc`; all state
/// lives in the injected intent store.
pub struct MoodBot {
    store: Arc<dyn IntentStore>,
    resolver: LocationResolver,
    places: PlaceSearch,
    fallback: Option<ConversationalFallback>,
}

impl MoodBot {
    /// Assemble from explicit collaborators. Without a completion provider,
    /// unmatched text gets the "pick a category" guidance instead.
    pub fn new(
        store: Arc<dyn IntentStore>,
        geocoder: Arc<dyn Geocoder>,
        places: Arc<dyn PlaceSearchProvider>,
        radius_m: u32,
        completion: Option<Arc<dyn CompletionProvider>>,
    ) -> Self {
        Self {
            store,
            resolver: LocationResolver::new(geocoder),
            places: PlaceSearch::new(places, radius_m),
            fallback: completion.map(ConversationalFallback::new),
        }
    }

    /// Build the production wiring from a validated config.
    pub fn from_config(config: &BotConfig, client: Client) -> Result<Self, ConfigError> {
        let capacity = NonZeroUsize::new(config.store_capacity)
            .ok_or_else(|| ConfigError::Invalid("store_capacity must be > 0".into()))?;
        let store: Arc<dyn IntentStore> = Arc::new(InMemoryIntentStore::new(capacity));
        let geocoder: Arc<dyn Geocoder> = Arc::new(NominatimGeocoder::new(
            client.clone(),
            config.geocoder.base_url.clone(),
        ));
        let places = build_places_provider(config, client.clone())?;

        let completion = match &config.completion.api_key {
            Some(key) if !key.trim().is_empty() => {
                let provider: Arc<dyn CompletionProvider> = Arc::new(OpenRouterProvider::new(
                    client,
                    &config.completion.base_url,
                    key.clone(),
                    config.completion.model.clone(),
                ));
                Some(provider)
            }
            _ => {
                tracing::info!("No completion API key, conversational fallback disabled");
                None
            }
        };

        Ok(Self::new(
            store,
            geocoder,
            places,
            config.places.radius_m,
            completion,
        ))
    }

    pub async fn handle(&self, event: InboundEvent, sink: &dyn ReplySink) {
        let user = event.user_id;
        match event.kind {
            EventKind::Command { name, args } => {
                tracing::info!(user_id = %user, command = %name, "Command received");
                if name == "start" {
                    deliver(
                        user,
                        sink.answer(messages::GREETING, KeyboardHint::MainMenu).await,
                    );
                } else {
                    let text = if args.is_empty() {
                        format!("/{}", name)
                    } else {
                        format!("/{} {}", name, args)
                    };
                    self.handle_text(user, &text, sink).await;
                }
            }
            EventKind::Text(text) => self.handle_text(user, &text, sink).await,
            EventKind::Location {
                latitude,
                longitude,
            } => self.handle_location(user, latitude, longitude, sink).await,
        }
    }

    async fn handle_text(&self, user: UserId, text: &str, sink: &dyn ReplySink) {
        let intent = classify(text);
        tracing::info!(user_id = %user, intent = %intent, "Text classified");

        match intent {
            Intent::Restaurant | Intent::Cinema | Intent::Theatre | Intent::Museum => {
                self.store.set(user, intent);
                say(sink, user, &messages::location_prompt(intent)).await;
            }
            Intent::Bored => say(sink, user, messages::BORED).await,
            Intent::Unknown => match self.store.get(user) {
                Some(stored) => self.search_address(user, text, stored, sink).await,
                None => match &self.fallback {
                    Some(fallback) => self.converse(user, fallback, text, sink).await,
                    None => say(sink, user, messages::NO_CATEGORY).await,
                },
            },
        }
    }

    async fn handle_location(
        &self,
        user: UserId,
        latitude: f64,
        longitude: f64,
        sink: &dyn ReplySink,
    ) {
        let Some(coordinate) = Coordinate::new(latitude, longitude) else {
            tracing::warn!(user_id = %user, latitude, longitude, "Invalid geolocation");
            say(sink, user, messages::LOCATION_ERROR).await;
            return;
        };

        let intent = self.store.get(user).unwrap_or(DEFAULT_INTENT);
        let keyword = search_keyword(intent);
        tracing::info!(user_id = %user, intent = %intent, coordinate = %coordinate, "Location received");

        say(sink, user, &messages::searching(keyword)).await;
        self.search_and_reply(user, coordinate, keyword, sink).await;
    }

    async fn search_address(&self, user: UserId, address: &str, intent: Intent, sink: &dyn ReplySink) {
        let keyword = search_keyword(intent);
        let query = LocationQuery::Address(address.to_string());

        match self.resolver.resolve(&query).await {
            Resolution::Resolved(location) => {
                let label = location
                    .label
                    .unwrap_or_else(|| location.coordinate.to_string());
                say(sink, user, &messages::address_found(&label, keyword)).await;
                self.search_and_reply(user, location.coordinate, keyword, sink)
                    .await;
            }
            Resolution::NotFound => say(sink, user, messages::ADDRESS_NOT_FOUND).await,
            Resolution::Failed(_) => say(sink, user, messages::LOCATION_ERROR).await,
        }
    }

    async fn search_and_reply(
        &self,
        user: UserId,
        coordinate: Coordinate,
        keyword: &str,
        sink: &dyn ReplySink,
    ) {
        match self.places.search(coordinate, keyword).await {
            SearchOutcome::Found(places) => {
                for place in &places {
                    deliver(
                        user,
                        sink.reply(&render_place(place), TextFormat::Html, KeyboardHint::None)
                            .await,
                    );
                }
                deliver(
                    user,
                    sink.answer(messages::SEARCH_AGAIN, KeyboardHint::MainMenu)
                        .await,
                );
            }
            SearchOutcome::Empty => say(sink, user, messages::NOTHING_FOUND).await,
            SearchOutcome::Failed(_) => say(sink, user, messages::SEARCH_ERROR).await,
        }
    }

    async fn converse(
        &self,
        user: UserId,
        fallback: &ConversationalFallback,
        text: &str,
        sink: &dyn ReplySink,
    ) {
        match fallback.suggest(text).await {
            Ok(suggestion) if suggestion.trim().is_empty() => {
                tracing::warn!(user_id = %user, "Completion was blank");
                say(sink, user, messages::COMPLETION_ERROR).await;
            }
            Ok(suggestion) => {
                let sent = sink
                    .reply(&fit_message(&suggestion), TextFormat::Plain, KeyboardHint::MainMenu)
                    .await;
                if let Err(e) = sent {
                    tracing::warn!(user_id = %user, error = %e, "Failed to send suggestion");
                    say(sink, user, messages::COMPLETION_ERROR).await;
                }
            }
            Err(e) => {
                tracing::error!(user_id = %user, error = %e, "Completion failed");
                say(sink, user, messages::COMPLETION_ERROR).await;
            }
        }
    }
}

fn search_keyword(intent: Intent) -> &'static str {
    intent
        .search_keyword()
        .or_else(|| DEFAULT_INTENT.search_keyword())
        .unwrap_or("restaurant")
}

/// Plain reply with the main keyboard.
async fn say(sink: &dyn ReplySink, user: UserId, text: &str) {
    deliver(
        user,
        sink.reply(text, TextFormat::Plain, KeyboardHint::MainMenu)
            .await,
    );
}

fn deliver(user: UserId, result: Result<(), TransportError>) {
    if let Err(e) = result {
        tracing::warn!(user_id = %user, error = %e, "Failed to send reply");
    }
}
