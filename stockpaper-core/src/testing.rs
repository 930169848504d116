//! Recording doubles for the collaborator traits
//!
//! Every double appends to a shared journal so tests can check the order
//! of calls across the link, source, display and power handles.

use core::net::Ipv4Addr;
use core::time::Duration;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::traits::{
    CredentialList, DataSource, Emphasis, FetchError, LinkProvider, LinkState, PowerManager,
    PowerState, Quote, RenderError, Renderer, TimeText,
};

/// Observable side effect of a collaborator call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Connect,
    Disconnect,
    FetchQuote,
    FetchTime,
    Present,
    DisplaySleep,
    DisplayWake,
    LowPower,
    Active,
    Sleep(Duration),
}

impl Call {
    pub fn is_network(&self) -> bool {
        matches!(self, Call::Connect | Call::FetchQuote | Call::FetchTime)
    }
}

pub type Journal = Rc<RefCell<Vec<Call>>>;

/// Drawing primitive as seen by the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    Text {
        text: String,
        x: u16,
        y: u16,
        emphasis: Emphasis,
    },
    Rule {
        x: u16,
        y: u16,
        length: u16,
        emphasis: Emphasis,
    },
    Outline {
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        emphasis: Emphasis,
    },
    Gauge {
        percent: f32,
        emphasis: Emphasis,
    },
}

impl DrawOp {
    pub fn text(text: &str, x: u16, y: u16, emphasis: Emphasis) -> Self {
        DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            emphasis,
        }
    }
}

/// Check a presented frame for a text primitive
pub fn frame_has_text(frame: &[DrawOp], needle: &str) -> bool {
    frame
        .iter()
        .any(|op| matches!(op, DrawOp::Text { text, .. } if text == needle))
}

/// Renderer that keeps the current buffer and every presented frame
#[derive(Default)]
pub struct RecordingRenderer {
    pub ops: Vec<DrawOp>,
    pub frames: Vec<Vec<DrawOp>>,
    pub fail_present: bool,
    pub journal: Journal,
}

impl RecordingRenderer {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            ..Default::default()
        }
    }

    pub fn has_text(&self, needle: &str, emphasis: Emphasis) -> bool {
        self.ops.iter().any(|op| {
            matches!(op, DrawOp::Text { text, emphasis: e, .. } if text == needle && *e == emphasis)
        })
    }

    pub fn frames_with(&self, needle: &str) -> usize {
        self.frames
            .iter()
            .filter(|frame| frame_has_text(frame, needle))
            .count()
    }
}

impl Renderer for RecordingRenderer {
    fn clear_frame(&mut self) -> Result<(), RenderError> {
        self.ops.clear();
        self.ops.push(DrawOp::Clear);
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: u16,
        y: u16,
        emphasis: Emphasis,
    ) -> Result<(), RenderError> {
        self.ops.push(DrawOp::text(text, x, y, emphasis));
        Ok(())
    }

    fn draw_rule(
        &mut self,
        x: u16,
        y: u16,
        length: u16,
        emphasis: Emphasis,
    ) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Rule {
            x,
            y,
            length,
            emphasis,
        });
        Ok(())
    }

    fn draw_outline(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        emphasis: Emphasis,
    ) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Outline {
            x,
            y,
            width,
            height,
            emphasis,
        });
        Ok(())
    }

    fn draw_battery_gauge(&mut self, percent: f32, emphasis: Emphasis) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Gauge { percent, emphasis });
        Ok(())
    }

    async fn present(&mut self) -> Result<(), RenderError> {
        self.journal.borrow_mut().push(Call::Present);
        if self.fail_present {
            return Err(RenderError::Bus);
        }
        self.frames.push(self.ops.clone());
        Ok(())
    }

    async fn sleep(&mut self) -> Result<(), RenderError> {
        self.journal.borrow_mut().push(Call::DisplaySleep);
        Ok(())
    }

    async fn wake(&mut self) -> Result<(), RenderError> {
        self.journal.borrow_mut().push(Call::DisplayWake);
        Ok(())
    }
}

/// Link that replays scripted outcomes, then succeeds
pub struct MockLink {
    pub outcomes: VecDeque<bool>,
    pub state: LinkState,
    pub journal: Journal,
}

impl MockLink {
    pub fn new(journal: &Journal, outcomes: impl IntoIterator<Item = bool>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            state: LinkState::Disconnected,
            journal: journal.clone(),
        }
    }
}

impl LinkProvider for MockLink {
    async fn connect(&mut self, credentials: &CredentialList) -> bool {
        assert!(!credentials.is_empty());
        self.journal.borrow_mut().push(Call::Connect);
        let up = self.outcomes.pop_front().unwrap_or(true);
        self.state = if up {
            LinkState::Connected
        } else {
            LinkState::Failed
        };
        up
    }

    async fn disconnect(&mut self) {
        self.journal.borrow_mut().push(Call::Disconnect);
        self.state = LinkState::Disconnected;
    }

    fn current_address(&self) -> Option<Ipv4Addr> {
        (self.state == LinkState::Connected).then(|| Ipv4Addr::new(192, 168, 1, 50))
    }

    fn link_state(&self) -> LinkState {
        self.state
    }
}

pub fn sample_quote(change_percent: f32) -> Quote {
    let mut as_of = heapless::String::new();
    let _ = as_of.push_str("2024-01-15");
    Quote {
        price: 189.5,
        change: -2.3,
        change_percent,
        as_of: Some(as_of),
    }
}

/// Source that replays scripted quote results, then succeeds
pub struct MockSource {
    pub quotes: VecDeque<Result<Quote, FetchError>>,
    pub time: Option<&'static str>,
    pub journal: Journal,
}

impl MockSource {
    pub fn new(
        journal: &Journal,
        quotes: impl IntoIterator<Item = Result<Quote, FetchError>>,
    ) -> Self {
        Self {
            quotes: quotes.into_iter().collect(),
            time: Some("2024-01-15T14:30:00"),
            journal: journal.clone(),
        }
    }
}

impl DataSource for MockSource {
    async fn fetch_quote(&mut self, symbol: &str) -> Result<Quote, FetchError> {
        assert!(!symbol.is_empty());
        self.journal.borrow_mut().push(Call::FetchQuote);
        self.quotes
            .pop_front()
            .unwrap_or_else(|| Ok(sample_quote(1.0)))
    }

    async fn fetch_time(&mut self, _timezone: &str) -> TimeText {
        self.journal.borrow_mut().push(Call::FetchTime);
        let mut text = TimeText::new();
        let _ = text.push_str(self.time.unwrap_or(crate::traits::TIME_PLACEHOLDER));
        text
    }
}

/// Power manager that records transitions and sleeps without waiting
pub struct MockPower {
    pub state: PowerState,
    pub battery: Option<f32>,
    pub journal: Journal,
}

impl MockPower {
    pub fn new(journal: &Journal) -> Self {
        Self {
            state: PowerState::Active,
            battery: None,
            journal: journal.clone(),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.journal
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Sleep(d) => Some(*d),
                _ => None,
            })
            .collect()
    }
}

impl PowerManager for MockPower {
    async fn enter_low_power(&mut self) {
        self.journal.borrow_mut().push(Call::LowPower);
        self.state = PowerState::LowPower;
    }

    async fn enter_active(&mut self) {
        self.journal.borrow_mut().push(Call::Active);
        self.state = PowerState::Active;
    }

    async fn sleep_for(&mut self, duration: Duration) {
        self.journal.borrow_mut().push(Call::Sleep(duration));
    }

    async fn battery_percent(&mut self) -> Option<f32> {
        self.battery
    }

    fn power_state(&self) -> PowerState {
        self.state
    }
}
