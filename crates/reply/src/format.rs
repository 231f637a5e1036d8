//! Reply rendering. Everything here is pure string building.

use mandi_feeds::{NewsDigest, RenderedNews, WeatherReport};
use mandi_rates::{display_price, ItemHistory, RateRecord};

/// Appended after every rate table.
pub const CLOSING_PROMPT: &str = "🌾Anything else I can assist with?🌾\n💬";

/// Sent when no city could be fetched.
pub const WEATHER_UNAVAILABLE: &str =
    "🌦 Sorry, weather information is not available right now. Please try again later.";

const DATE_WIDTH: usize = 10;
const PRICE_WIDTH: usize = 8;

/// Tabulate the recent entries of one item, newest first.
///
/// `piece_unit` is the unit token that marks count-priced produce; the
/// footer follows the unit of the latest entry.
pub fn render_rate_table(item: &str, entries: &[RateRecord], piece_unit: &str) -> String {
    let Some(latest) = entries.first() else {
        return render_no_recent_trades(item);
    };

    let header = format!(
        "{:<dw$} | {:<pw$} | {:<pw$}",
        "Date 📅",
        "Min 📉",
        "Max 📈",
        dw = DATE_WIDTH,
        pw = PRICE_WIDTH
    );
    let separator = "-".repeat(header.chars().count() + 2);

    let mut out = String::new();
    out.push_str(&format!("📊 Recent rates for {}:\n", item));
    out.push_str(&format!("Market: 📍{}📍\n\n", latest.market));
    out.push_str(&format!("{}\n{}\n", header, separator));

    for entry in entries {
        out.push_str(&format!(
            "{:<dw$} | {:<pw$} | {:<pw$}\n",
            entry.date.format("%d %b").to_string(),
            display_price(entry.min_price),
            display_price(entry.max_price),
            dw = DATE_WIDTH,
            pw = PRICE_WIDTH
        ));
    }

    let unit = if latest.unit.trim() == piece_unit { "Piece" } else { "Kg" };
    out.push_str(&format!("{}\n❗️Rates per 100 {}❗\n\n", separator, unit));
    out.push_str(CLOSING_PROMPT);
    out
}

/// The item is known but has no retained entries.
pub fn render_no_recent_trades(item: &str) -> String {
    format!(
        "No rate information found for {}. Perhaps it's not traded recently? Anything else?",
        item
    )
}

/// The item is not in the index at all.
pub fn render_unknown_item(item: &str) -> String {
    format!(
        "Could not find any rate information for {}. Are you sure it's a common crop? What else can I look up?",
        item
    )
}

/// Render a lookup result for a canonical item name.
pub fn render_lookup(item: &str, history: Option<&ItemHistory>, piece_unit: &str) -> String {
    match history {
        Some(history) => render_rate_table(item, history.entries(), piece_unit),
        None => render_unknown_item(item),
    }
}

pub fn render_clarification_prompt() -> String {
    "It seems you asked for a rate, but I couldn't identify the item. \
     Could you please specify it? For example: 'Rate of Kanda'"
        .to_string()
}

pub fn render_unrecognized_prompt() -> String {
    "I can share crop 🌾 rates, weather 🌤 and agriculture news 📰. \
     For example, you could ask 'What is the rate of tomato?'"
        .to_string()
}

/// Render the digest as HTML links and as plain text.
///
/// Categories without headlines are left out. An empty digest renders to
/// empty strings.
pub fn render_news(digest: &NewsDigest) -> RenderedNews {
    let groups: Vec<_> = digest.groups.iter().filter(|g| !g.headlines.is_empty()).collect();
    if groups.is_empty() {
        return RenderedNews::default();
    }

    let mut rich = String::from("📰 <b>Latest agriculture news</b>\n");
    let mut plain = String::from("📰 Latest agriculture news\n");

    for group in groups {
        rich.push_str(&format!("\n<b>{}</b>\n", escape_html(&group.category)));
        plain.push_str(&format!("\n{}\n", group.category));

        for (n, headline) in group.headlines.iter().enumerate() {
            rich.push_str(&format!(
                "{}. <a href=\"{}\">{}</a>\n",
                n + 1,
                escape_html(&headline.link),
                escape_html(&headline.title)
            ));
            plain.push_str(&format!("{}. {}\n   {}\n", n + 1, headline.title, headline.link));
        }
    }

    RenderedNews {
        rich: rich.trim_end().to_string(),
        plain: plain.trim_end().to_string(),
    }
}

/// One block per reported city, in input order.
pub fn render_weather(reports: &[WeatherReport]) -> String {
    if reports.is_empty() {
        return WEATHER_UNAVAILABLE.to_string();
    }

    let mut out = String::new();
    for report in reports {
        out.push_str(&format!(
            "☀️Weather in {}📍:\nTemperature: {}°C🌡 (Feels like {}°C🌡)\nWeather: {} \tHumidity: {}%\n\n",
            city_name(&report.city),
            report.temperature,
            report.feels_like,
            condition_phrase(&report.condition),
            report.humidity
        ));
    }
    out.trim_end().to_string()
}

/// Canned phrasing for the common condition labels.
pub fn condition_phrase(label: &str) -> &str {
    match label {
        "Rain" => "🌧Rain expected⛈",
        "Clear" => "☀️Sunny☀️",
        "Clouds" => "⛅️Cloudy🌤",
        other => other,
    }
}

/// "Pune,IN" -> "Pune"
fn city_name(query: &str) -> &str {
    query.split(',').next().unwrap_or(query).trim()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
