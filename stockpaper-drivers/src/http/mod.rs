//! Minimal HTTP/1.0 client
//!
//! One GET per connection, `Connection: close`, response read to EOF or
//! until the caller's buffer is full. No TLS and no chunked transfer.

mod url;

pub use url::Url;

use core::fmt::Write as _;

use embedded_io_async::{Read, Write};
use heapless::String;
use stockpaper_core::traits::FetchError;

/// Longest request head the client builds
const MAX_REQUEST_LEN: usize = 256;

/// HTTP client errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HttpError {
    /// Only plain `http://` is supported
    UnsupportedScheme,
    /// URL could not be parsed
    InvalidUrl,
    /// Host lookup or TCP connect failed
    Connect,
    /// Read or write on the connection failed
    Io,
    /// Request head does not fit
    RequestTooLong,
    /// No status line or header terminator
    MalformedResponse,
    /// Server answered with a non-200 status
    Status(u16),
}

impl From<HttpError> for FetchError {
    fn from(_: HttpError) -> Self {
        FetchError::Transport
    }
}

/// Trait for opening byte-stream connections
#[allow(async_fn_in_trait)]
pub trait Connector {
    /// Open connection, closed when dropped
    type Connection<'a>: Read + Write
    where
        Self: 'a;

    /// Resolve `host` and open a connection to `port`
    async fn connect<'a>(
        &'a mut self,
        host: &str,
        port: u16,
    ) -> Result<Self::Connection<'a>, HttpError>;
}

/// Parsed response borrowing the caller's buffer
#[derive(Debug, PartialEq, Eq)]
pub struct Response<'b> {
    /// Status code
    pub status: u16,
    /// Body bytes (possibly truncated at the buffer end)
    pub body: &'b [u8],
}

impl Response<'_> {
    /// Check for a 200 status
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// HTTP client over a connector
pub struct HttpClient<C> {
    connector: C,
}

impl<C: Connector> HttpClient<C> {
    /// Create a client
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Perform a GET, reading the whole response into `buf`
    pub async fn get<'b>(
        &mut self,
        url: &Url<'_>,
        buf: &'b mut [u8],
    ) -> Result<Response<'b>, HttpError> {
        let request = request_head(url)?;

        let mut conn = self.connector.connect(url.host(), url.port()).await?;
        conn.write_all(request.as_bytes())
            .await
            .map_err(|_| HttpError::Io)?;
        conn.flush().await.map_err(|_| HttpError::Io)?;

        let mut len = 0;
        while len < buf.len() {
            let n = conn.read(&mut buf[len..]).await.map_err(|_| HttpError::Io)?;
            if n == 0 {
                break;
            }
            len += n;
        }
        if len == buf.len() {
            debug!("Response truncated at {} bytes", len);
        }

        let buf: &'b [u8] = buf;
        parse_response(&buf[..len])
    }
}

/// Build the request head for a GET
fn request_head(url: &Url<'_>) -> Result<String<MAX_REQUEST_LEN>, HttpError> {
    let mut head = String::new();
    write!(
        head,
        "GET {} HTTP/1.0\r\nHost: {}\r\nUser-Agent: curl/8.5.0\r\nAccept: */*\r\nConnection: close\r\n\r\n",
        url.path(),
        url.host()
    )
    .map_err(|_| HttpError::RequestTooLong)?;
    Ok(head)
}

/// Split a raw response into status code and body
pub fn parse_response(raw: &[u8]) -> Result<Response<'_>, HttpError> {
    let head_end = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .ok_or(HttpError::MalformedResponse)?;

    let head = core::str::from_utf8(&raw[..head_end]).map_err(|_| HttpError::MalformedResponse)?;
    let status_line = head.lines().next().ok_or(HttpError::MalformedResponse)?;

    let mut parts = status_line.split_whitespace();
    let version = parts.next().ok_or(HttpError::MalformedResponse)?;
    if !version.starts_with("HTTP/") {
        return Err(HttpError::MalformedResponse);
    }
    let status = parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or(HttpError::MalformedResponse)?;

    Ok(Response {
        status,
        body: &raw[head_end + 4..],
    })
}
