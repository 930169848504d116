//! URL parsing for plain HTTP

use super::HttpError;

/// Default port for `http://`
const HTTP_PORT: u16 = 80;

/// Parsed `http://host[:port]/path` URL borrowing its source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Url<'a> {
    host: &'a str,
    port: u16,
    path: &'a str,
}

impl<'a> Url<'a> {
    /// Parse an absolute URL
    ///
    /// `https://` is rejected since the client has no TLS.
    pub fn parse(text: &'a str) -> Result<Self, HttpError> {
        let rest = match text.strip_prefix("http://") {
            Some(rest) => rest,
            None if text.starts_with("https://") => return Err(HttpError::UnsupportedScheme),
            None => return Err(HttpError::InvalidUrl),
        };

        let (authority, path) = match rest.find('/') {
            Some(at) => rest.split_at(at),
            None => (rest, "/"),
        };

        let (host, port) = match authority.split_once(':') {
            Some((host, port)) => (
                host,
                port.parse::<u16>().map_err(|_| HttpError::InvalidUrl)?,
            ),
            None => (authority, HTTP_PORT),
        };

        if host.is_empty() || port == 0 {
            return Err(HttpError::InvalidUrl);
        }

        Ok(Self { host, port, path })
    }

    pub fn host(&self) -> &'a str {
        self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Path including the query string
    pub fn path(&self) -> &'a str {
        self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let url = Url::parse("http://worldtimeapi.org:8080/api/timezone/Europe/Rome?x=1").unwrap();
        assert_eq!(url.host(), "worldtimeapi.org");
        assert_eq!(url.port(), 8080);
        assert_eq!(url.path(), "/api/timezone/Europe/Rome?x=1");
    }

    #[test]
    fn test_parse_defaults() {
        let url = Url::parse("http://terminal-stocks.dev").unwrap();
        assert_eq!(url.port(), 80);
        assert_eq!(url.path(), "/");
    }

    #[test]
    fn test_https_unsupported() {
        assert_eq!(
            Url::parse("https://www.alphavantage.co/query"),
            Err(HttpError::UnsupportedScheme)
        );
    }

    #[test]
    fn test_invalid() {
        assert_eq!(Url::parse("ftp://x/"), Err(HttpError::InvalidUrl));
        assert_eq!(Url::parse("http:///path"), Err(HttpError::InvalidUrl));
        assert_eq!(Url::parse("http://host:99999/"), Err(HttpError::InvalidUrl));
        assert_eq!(Url::parse("http://host:0/"), Err(HttpError::InvalidUrl));
    }
}
