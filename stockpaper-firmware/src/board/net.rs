//! TCP connector over embassy-net

use defmt::*;
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_time::Duration;

use stockpaper_drivers::http::{Connector, HttpError};

/// Socket receive buffer; holds a whole quote response
const RX_BUFFER_LEN: usize = 4096;

/// Socket transmit buffer; holds a request head
const TX_BUFFER_LEN: usize = 512;

/// Socket inactivity timeout
const SOCKET_TIMEOUT: Duration = Duration::from_secs(15);

/// Opens one TCP connection at a time on the network stack
pub struct TcpConnector {
    stack: Stack<'static>,
    rx: [u8; RX_BUFFER_LEN],
    tx: [u8; TX_BUFFER_LEN],
}

impl TcpConnector {
    pub fn new(stack: Stack<'static>) -> Self {
        Self {
            stack,
            rx: [0; RX_BUFFER_LEN],
            tx: [0; TX_BUFFER_LEN],
        }
    }
}

impl Connector for TcpConnector {
    type Connection<'a> = TcpSocket<'a>;

    async fn connect<'a>(&'a mut self, host: &str, port: u16) -> Result<TcpSocket<'a>, HttpError> {
        let addresses = self
            .stack
            .dns_query(host, DnsQueryType::A)
            .await
            .map_err(|e| {
                warn!("DNS lookup of {} failed: {}", host, e);
                HttpError::Connect
            })?;
        let address = addresses.first().copied().ok_or(HttpError::Connect)?;

        let mut socket = TcpSocket::new(self.stack, &mut self.rx, &mut self.tx);
        socket.set_timeout(Some(SOCKET_TIMEOUT));
        socket.connect((address, port)).await.map_err(|e| {
            warn!("Connect to {}:{} failed: {}", host, port, e);
            HttpError::Connect
        })?;

        debug!("Connected to {}:{}", host, port);
        Ok(socket)
    }
}
