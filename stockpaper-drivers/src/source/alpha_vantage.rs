//! Alpha Vantage GLOBAL_QUOTE JSON

use heapless::String;
use serde::Deserialize;
use stockpaper_core::traits::{FetchError, Quote};

#[derive(Deserialize)]
struct Envelope<'a> {
    #[serde(rename = "Global Quote", borrow)]
    quote: GlobalQuote<'a>,
}

#[derive(Deserialize)]
struct GlobalQuote<'a> {
    #[serde(rename = "05. price")]
    price: &'a str,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: &'a str,
    #[serde(rename = "09. change")]
    change: &'a str,
    #[serde(rename = "10. change percent")]
    change_percent: &'a str,
}

/// Parse a GLOBAL_QUOTE response
///
/// Numbers arrive as strings; the percent carries a trailing `%`. A
/// throttled or unknown-symbol answer lacks the fields and is a parse
/// error, never a zero quote.
pub fn parse_quote(body: &[u8]) -> Result<Quote, FetchError> {
    let envelope: Envelope = serde_json::from_slice(body).map_err(|_| FetchError::Parse)?;
    let quote = envelope.quote;

    let percent = quote.change_percent.trim();
    let percent = percent.strip_suffix('%').unwrap_or(percent);

    let mut as_of = String::new();
    as_of
        .push_str(quote.latest_trading_day)
        .map_err(|_| FetchError::Parse)?;

    Ok(Quote {
        price: number(quote.price)?,
        change: number(quote.change)?,
        change_percent: number(percent)?,
        as_of: Some(as_of),
    })
}

fn number(text: &str) -> Result<f32, FetchError> {
    text.trim().parse().map_err(|_| FetchError::Parse)
}
