#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

use mood_bot::intent::InMemoryIntentStore;
use mood_bot::llm::{ChatMessage, CompletionProvider};
use mood_bot::location::{GeocodeCandidate, Geocoder};
use mood_bot::places::PlaceSearchProvider;
use mood_bot::{
    Coordinate, KeyboardHint, MoodBot, PlaceResult, ProviderError, ReplySink, TextFormat,
    TransportError,
};

pub const RADIUS_M: u32 = 3000;

fn transport_failure(endpoint: &str) -> ProviderError {
    ProviderError::Request {
        endpoint: endpoint.to_string(),
        message: "connection reset by peer".to_string(),
    }
}

pub fn place(name: &str, lat: f64, lon: f64) -> PlaceResult {
    PlaceResult::new(Some(name.to_string()), Some(format!("{} street", name)))
        .with_coordinate(Coordinate::new(lat, lon))
}

#[derive(Default)]
pub struct FakeGeocoder {
    pub candidates: Vec<GeocodeCandidate>,
    pub fail: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn returning(label: &str, lat: f64, lon: f64) -> Self {
        Self {
            candidates: vec![GeocodeCandidate {
                coordinate: Coordinate::new(lat, lon).unwrap(),
                label: label.to_string(),
            }],
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(
        &self,
        query: &str,
        _limit: usize,
    ) -> Result<Vec<GeocodeCandidate>, ProviderError> {
        self.calls.lock().push(query.to_string());
        if self.fail {
            return Err(transport_failure("geocoder"));
        }
        Ok(self.candidates.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchCall {
    pub coordinate: Coordinate,
    pub keyword: String,
    pub radius_m: u32,
}

#[derive(Default)]
pub struct FakePlaces {
    pub results: Vec<PlaceResult>,
    pub fail: bool,
    pub calls: Mutex<Vec<SearchCall>>,
}

impl FakePlaces {
    pub fn returning(results: Vec<PlaceResult>) -> Self {
        Self {
            results,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl PlaceSearchProvider for FakePlaces {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn search(
        &self,
        coordinate: Coordinate,
        keyword: &str,
        radius_m: u32,
    ) -> Result<Vec<PlaceResult>, ProviderError> {
        self.calls.lock().push(SearchCall {
            coordinate,
            keyword: keyword.to_string(),
            radius_m,
        });
        if self.fail {
            return Err(transport_failure("places"));
        }
        Ok(self.results.clone())
    }
}

#[derive(Default)]
pub struct FakeCompletion {
    pub reply: Option<String>,
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeCompletion {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompletionProvider for FakeCompletion {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        self.calls.lock().push(messages.to_vec());
        self.reply
            .clone()
            .ok_or_else(|| ProviderError::Status {
                endpoint: "completion".to_string(),
                status: 401,
                body: "invalid key".to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendKind {
    Reply,
    Answer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub kind: SendKind,
    pub text: String,
    pub format: TextFormat,
    pub keyboard: KeyboardHint,
}

/// Records every outbound message; optionally fails each send after recording.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<Sent>>,
    pub fail_sends: bool,
    /// Reject texts longer than this many UTF-16 units, like the Bot API.
    pub max_len: Option<usize>,
}

impl RecordingSink {
    pub fn broken() -> Self {
        Self {
            fail_sends: true,
            ..Default::default()
        }
    }

    pub fn limited(max_len: usize) -> Self {
        Self {
            max_len: Some(max_len),
            ..Default::default()
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().iter().map(|s| s.text.clone()).collect()
    }

    pub fn html_count(&self) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|s| s.format == TextFormat::Html)
            .count()
    }

    fn record(&self, sent: Sent) -> Result<(), TransportError> {
        let units: usize = sent.text.chars().map(char::len_utf16).sum();
        self.sent.lock().push(sent);
        if self.fail_sends {
            return Err(TransportError("chat not found".to_string()));
        }
        if self.max_len.is_some_and(|max| units > max) {
            return Err(TransportError("message is too long".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn reply(
        &self,
        text: &str,
        format: TextFormat,
        keyboard: KeyboardHint,
    ) -> Result<(), TransportError> {
        self.record(Sent {
            kind: SendKind::Reply,
            text: text.to_string(),
            format,
            keyboard,
        })
    }

    async fn answer(&self, text: &str, keyboard: KeyboardHint) -> Result<(), TransportError> {
        self.record(Sent {
            kind: SendKind::Answer,
            text: text.to_string(),
            format: TextFormat::Plain,
            keyboard,
        })
    }
}

/// A bot wired to fakes, keeping handles to them for assertions.
pub struct Harness {
    pub bot: MoodBot,
    pub store: Arc<InMemoryIntentStore>,
    pub geocoder: Arc<FakeGeocoder>,
    pub places: Arc<FakePlaces>,
    pub completion: Option<Arc<FakeCompletion>>,
}

impl Harness {
    pub fn new(
        geocoder: FakeGeocoder,
        places: FakePlaces,
        completion: Option<FakeCompletion>,
    ) -> Self {
        let store = Arc::new(InMemoryIntentStore::new(NonZeroUsize::new(64).unwrap()));
        let geocoder = Arc::new(geocoder);
        let places = Arc::new(places);
        let completion = completion.map(Arc::new);

        let bot = MoodBot::new(
            store.clone(),
            geocoder.clone(),
            places.clone(),
            RADIUS_M,
            completion
                .clone()
                .map(|c| c as Arc<dyn CompletionProvider>),
        );
        Self {
            bot,
            store,
            geocoder,
            places,
            completion,
        }
    }
}
