//! Quote and time sources over HTTP
//!
//! Response parsers for each endpoint live in their own module and work on
//! raw body bytes, so they are testable without a network.

pub mod alpha_vantage;
pub mod terminal_stocks;
pub mod world_time;

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Write as _;

use heapless::String;
use stockpaper_core::config::QuoteProvider;
use stockpaper_core::traits::source::placeholder_time;
use stockpaper_core::traits::{DataSource, FetchError, Quote, TimeText};

use crate::http::{Connector, HttpClient, HttpError, Url};

/// Size of the response buffer
pub const RESPONSE_BUFFER_LEN: usize = 4096;

/// Longest request URL
const MAX_URL_LEN: usize = 192;

/// Data source backed by the HTTP client
pub struct HttpDataSource<C> {
    client: HttpClient<C>,
    provider: QuoteProvider,
    buffer: Vec<u8>,
}

impl<C: Connector> HttpDataSource<C> {
    /// Create a source for the configured quote provider
    pub fn new(connector: C, provider: QuoteProvider) -> Self {
        Self {
            client: HttpClient::new(connector),
            provider,
            buffer: vec![0; RESPONSE_BUFFER_LEN],
        }
    }
}

impl<C: Connector> DataSource for HttpDataSource<C> {
    async fn fetch_quote(&mut self, symbol: &str) -> Result<Quote, FetchError> {
        let url = quote_url(&self.provider, symbol).map_err(|_| FetchError::Transport)?;
        let body = get_body(&mut self.client, &url, &mut self.buffer)
            .await
            .map_err(|e| {
                warn!("Quote request failed: {}", e);
                FetchError::from(e)
            })?;

        let result = match &self.provider {
            QuoteProvider::TerminalStocks => terminal_stocks::parse_quote(body),
            QuoteProvider::AlphaVantage { .. } => alpha_vantage::parse_quote(body),
        };
        if result.is_err() {
            warn!("Unexpected quote response ({} bytes)", body.len());
        }
        result
    }

    async fn fetch_time(&mut self, timezone: &str) -> TimeText {
        let Ok(url) = time_url(timezone) else {
            return placeholder_time();
        };

        match get_body(&mut self.client, &url, &mut self.buffer).await {
            Ok(body) => world_time::parse_datetime(body).unwrap_or_else(placeholder_time),
            Err(e) => {
                debug!("Time request failed: {}", e);
                placeholder_time()
            }
        }
    }
}

/// GET `url` and return the body of a 200 response
async fn get_body<'b, C: Connector>(
    client: &mut HttpClient<C>,
    url: &str,
    buf: &'b mut [u8],
) -> Result<&'b [u8], HttpError> {
    let url = Url::parse(url)?;
    let response = client.get(&url, buf).await?;
    if !response.is_ok() {
        return Err(HttpError::Status(response.status));
    }
    Ok(response.body)
}

/// Endpoint for a quote lookup
pub fn quote_url(
    provider: &QuoteProvider,
    symbol: &str,
) -> Result<String<MAX_URL_LEN>, core::fmt::Error> {
    let mut url = String::new();
    match provider {
        QuoteProvider::TerminalStocks => write!(url, "http://terminal-stocks.dev/{}", symbol)?,
        QuoteProvider::AlphaVantage { api_key } => write!(
            url,
            "http://www.alphavantage.co/query?function=GLOBAL_QUOTE&symbol={}&datatype=json&apikey={}",
            symbol, api_key
        )?,
    }
    Ok(url)
}

/// Endpoint for a time lookup
pub fn time_url(timezone: &str) -> Result<String<MAX_URL_LEN>, core::fmt::Error> {
    let mut url = String::new();
    write!(url, "http://worldtimeapi.org/api/timezone/{}", timezone)?;
    Ok(url)
}

/// Body as text, dropping a character cut off at the buffer end
fn body_text(body: &[u8]) -> &str {
    match core::str::from_utf8(body) {
        Ok(text) => text,
        Err(e) => core::str::from_utf8(&body[..e.valid_up_to()]).unwrap_or_default(),
    }
}
