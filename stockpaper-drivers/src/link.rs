//! Credential fallback link
//!
//! Joins the first network from an ordered candidate list that reports
//! "connected with an address" within a bounded wait. The radio itself
//! is abstracted behind [`Radio`] so the join/poll logic runs on the host.

use core::net::Ipv4Addr;

use embedded_hal_async::delay::DelayNs;
use stockpaper_core::traits::{CredentialList, LinkProvider, LinkState};

/// Poll period while waiting for the link
const POLL_MS: u32 = 1000;

/// Status reported by the radio while joining
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioStatus {
    /// Radio inactive or not joining
    Idle,
    /// Association or address assignment in progress
    Joining,
    /// Associated and holding an address
    Connected,
    /// Join rejected (wrong secret, no AP)
    Failed,
}

impl RadioStatus {
    /// Check if the join has finished one way or the other
    pub fn is_settled(&self) -> bool {
        matches!(self, RadioStatus::Connected | RadioStatus::Failed)
    }
}

/// Trait for a station-mode radio
#[allow(async_fn_in_trait)]
pub trait Radio {
    /// Power the radio up in station mode
    async fn activate(&mut self);

    /// Start joining a network; progress is observed through `status`
    async fn join(&mut self, ssid: &str, secret: &str);

    /// Current join status
    fn status(&self) -> RadioStatus;

    /// Assigned address, if any
    fn address(&self) -> Option<Ipv4Addr>;

    /// Leave the network and power the radio down
    async fn deactivate(&mut self);
}

/// Link provider trying each credential in order
pub struct CredentialLink<R, D> {
    radio: R,
    delay: D,
    /// Maximum 1 s polls per candidate
    max_polls: u8,
    state: LinkState,
}

impl<R: Radio, D: DelayNs> CredentialLink<R, D> {
    /// Create a link that waits at most `max_polls` seconds per candidate
    pub fn new(radio: R, delay: D, max_polls: u8) -> Self {
        Self {
            radio,
            delay,
            max_polls,
            state: LinkState::Disconnected,
        }
    }

    /// Access the radio
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Poll the radio until it settles or the wait runs out
    async fn wait_for_link(&mut self) -> RadioStatus {
        for poll in 0..self.max_polls {
            let status = self.radio.status();
            if status.is_settled() {
                return status;
            }
            trace!("Waiting for link ({})", poll);
            self.delay.delay_ms(POLL_MS).await;
        }
        self.radio.status()
    }
}

impl<R: Radio, D: DelayNs> LinkProvider for CredentialLink<R, D> {
    async fn connect(&mut self, credentials: &CredentialList) -> bool {
        for credential in credentials.iter() {
            self.state = LinkState::Connecting;
            info!("Joining {}", credential.ssid.as_str());

            self.radio.activate().await;
            self.radio.join(&credential.ssid, &credential.secret).await;

            match self.wait_for_link().await {
                RadioStatus::Connected => {
                    self.state = LinkState::Connected;
                    return true;
                }
                status => {
                    warn!("Join of {} failed: {}", credential.ssid.as_str(), status);
                    self.radio.deactivate().await;
                }
            }
        }

        self.state = LinkState::Failed;
        false
    }

    async fn disconnect(&mut self) {
        self.radio.deactivate().await;
        self.state = LinkState::Disconnected;
    }

    fn current_address(&self) -> Option<Ipv4Addr> {
        match self.state {
            LinkState::Connected => self.radio.address(),
            _ => None,
        }
    }

    fn link_state(&self) -> LinkState {
        self.state
    }
}
