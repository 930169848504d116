//! World Time API timezone endpoint

use serde::Deserialize;
use stockpaper_core::traits::TimeText;

#[derive(Deserialize)]
struct WorldTime<'a> {
    datetime: &'a str,
}

/// Extract `datetime` from a `/api/timezone/{zone}` response
pub fn parse_datetime(body: &[u8]) -> Option<TimeText> {
    let time: WorldTime = serde_json::from_slice(body).ok()?;
    let mut text = TimeText::new();
    text.push_str(time.datetime).ok()?;
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime() {
        let body = br#"{"abbreviation":"GMT","client_ip":"1.2.3.4","datetime":"2024-01-15T14:30:00.123456+00:00","day_of_week":1,"timezone":"Europe/London"}"#;
        assert_eq!(
            parse_datetime(body).unwrap().as_str(),
            "2024-01-15T14:30:00.123456+00:00"
        );
    }

    #[test]
    fn test_missing_field() {
        assert!(parse_datetime(br#"{"error":"unknown location"}"#).is_none());
        assert!(parse_datetime(b"<html>").is_none());
    }
}
