//! Fixed user-facing texts.

use crate::types::Intent;

pub const GREETING: &str = "Привет! Что хочешь сегодня сделать?";
pub const BORED: &str = "Выбери что-нибудь из меню и проведи время с удовольствием!";
pub const NO_CATEGORY: &str = "Сначала выбери категорию досуга из меню выше ☝️";
pub const ADDRESS_NOT_FOUND: &str = "Не удалось найти такое место. Попробуй другой адрес 🗺";
pub const LOCATION_ERROR: &str = "Ошибка при определении местоположения 😞";
pub const NOTHING_FOUND: &str = "Ничего не найдено поблизости 😕";
pub const SEARCH_ERROR: &str = "Произошла ошибка при поиске 😞";
pub const SEARCH_AGAIN: &str = "🔁 Хочешь поискать ещё? Выбери категорию ниже 👇";
pub const COMPLETION_ERROR: &str = "Произошла ошибка при обращении к GPT 😕";

const PROMPT_PREFIX: &str = "Отправь геолокацию или напиши адрес — и я найду";

/// Prompt asking for a location after a category was picked.
pub fn location_prompt(intent: Intent) -> String {
    let target = match intent {
        Intent::Restaurant => "лучшие рестораны рядом 📍",
        Intent::Cinema => "кино рядом 🎬",
        Intent::Theatre => "театр рядом 🎭",
        Intent::Museum => "музей рядом 🖼",
        Intent::Bored | Intent::Unknown => "что-нибудь интересное рядом 📍",
    };
    format!("{} {}", PROMPT_PREFIX, target)
}

pub fn searching(keyword: &str) -> String {
    format!("🔎 Ищу поблизости: {}", keyword)
}

/// Echo of a geocoded address before the search starts.
pub fn address_found(label: &str, keyword: &str) -> String {
    format!("📍 Нашёл: {}\n{}", label, searching(keyword))
}
