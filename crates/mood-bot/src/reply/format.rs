//! HTML rendering of place results and message length fitting.

use crate::types::{Coordinate, PlaceResult};

/// Google Maps deep link for a point.
pub fn maps_link(coordinate: Coordinate) -> String {
    format!(
        "https://maps.google.com/?q={},{}",
        coordinate.latitude(),
        coordinate.longitude()
    )
}

/// Telegram's message length limit, counted in UTF-16 code units.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Cut `text` to fit in one message, ending with `…` when shortened.
pub fn fit_message(text: &str) -> String {
    let total: usize = text.chars().map(char::len_utf16).sum();
    if total <= MAX_MESSAGE_LEN {
        return text.to_string();
    }

    let budget = MAX_MESSAGE_LEN - '…'.len_utf16();
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        used += ch.len_utf16();
        if used > budget {
            break;
        }
        out.push(ch);
    }
    out.push('…');
    out
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// One message per place: bold name, then optional address, rating and link.
///
/// The vendor URL wins over a maps link built from the coordinate; with
/// neither, the link line is omitted.
pub fn render_place(place: &PlaceResult) -> String {
    let mut lines = vec![format!("📍 <b>{}</b>", escape_html(&place.name))];

    if let Some(address) = &place.address {
        lines.push(format!("📍 {}", escape_html(address)));
    }
    if let Some(rating) = &place.rating {
        lines.push(format!("⭐ Рейтинг: {}", escape_html(&rating.to_string())));
    }

    let link = place
        .external_url
        .clone()
        .or_else(|| place.coordinate.map(maps_link));
    if let Some(link) = link {
        lines.push(format!("<a href='{}'>Открыть на карте</a>", escape_html(&link)));
    }

    lines.join("\n")
}
