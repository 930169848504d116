//! Run controller
//!
//! Drives the wake / connect / fetch / render / sleep cycle. Each `step`
//! performs the action owned by the current state, turns its outcome into
//! an [`Event`] and feeds it through [`State::transition`]. All acquisition
//! failures end here: they are charged to the retry budget and shown on
//! the display, never propagated.

use crate::config::DeviceConfig;
use crate::layout::{draw_data, draw_status, Reading, StatusFrame};
use crate::retry::{BudgetStatus, RetryBudget};
use crate::state::{Event, Interval, State};
use crate::traits::{DataSource, LinkProvider, PowerManager, RenderError, Renderer};


/// Owned handles to the device subsystems
pub struct Device<L, D, R, P> {
    pub link: L,
    pub source: D,
    pub renderer: R,
    pub power: P,
}

/// Controller for the device run loop
///
/// Owns every subsystem handle exclusively; nothing else touches them
/// while the controller runs.
pub struct RunController<L, D, R, P> {
    device: Device<L, D, R, P>,
    config: DeviceConfig,
    state: State,
    budget: RetryBudget,
    /// Successful cycles since power-on
    cycles: u32,
    /// Data of the cycle in progress
    reading: Option<Reading>,
    /// "Device is off" frame already shown
    halt_announced: bool,
}

impl<L, D, R, P> RunController<L, D, R, P>
where
    L: LinkProvider,
    D: DataSource,
    R: Renderer,
    P: PowerManager,
{
    /// Create a controller in the `Initializing` state with a full budget
    pub fn new(device: Device<L, D, R, P>, config: DeviceConfig) -> Self {
        let budget = RetryBudget::new(config.schedule.max_retries);
        Self {
            device,
            config,
            state: State::Initializing,
            budget,
            cycles: 0,
            reading: None,
            halt_announced: false,
        }
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Retry budget
    pub fn budget(&self) -> &RetryBudget {
        &self.budget
    }

    /// Successful cycles completed
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Data held for the cycle in progress
    pub fn reading(&self) -> Option<&Reading> {
        self.reading.as_ref()
    }

    /// Subsystem handles
    pub fn device(&self) -> &Device<L, D, R, P> {
        &self.device
    }

    /// Give the subsystem handles back
    pub fn into_device(self) -> Device<L, D, R, P> {
        self.device
    }

    /// Run the cycle forever
    pub async fn run(&mut self) -> ! {
        info!("Run loop started");
        loop {
            self.step().await;
        }
    }

    /// Perform the current state's action and advance
    pub async fn step(&mut self) -> State {
        let event = match self.state {
            State::Initializing => self.bring_up().await,
            State::CycleStart => self.begin_cycle().await,
            State::Connecting => self.connect().await,
            State::ConnectFailed => self.account_failure(StatusFrame::ConnectionError).await,
            State::Fetching => self.fetch().await,
            State::FetchFailed(_) => self.account_failure(StatusFrame::ApiError).await,
            State::Rendered => self.render().await,
            State::Sleeping(interval) => self.sleep(interval).await,
            State::Halted => {
                self.idle().await;
                return self.state;
            }
        };

        let next = self.state.transition(event);
        if next != self.state {
            debug!("State {} -> {}", self.state, next);
        }
        self.state = next;
        next
    }

    async fn bring_up(&mut self) -> Event {
        info!("Bringing up subsystems");
        self.device.power.enter_active().await;
        let renderer = &mut self.device.renderer;
        let result = match renderer.clear_frame() {
            Ok(()) => renderer.present().await,
            Err(e) => Err(e),
        };
        log_render_error(result);
        Event::DevicesReady
    }

    async fn begin_cycle(&mut self) -> Event {
        self.reading = None;
        self.show_status(StatusFrame::Connecting).await;
        Event::LinkRequested
    }

    async fn connect(&mut self) -> Event {
        debug_assert!(self.state.network_allowed());
        if self.device.link.connect(&self.config.networks).await {
            if let Some(address) = self.device.link.current_address() {
                let [a, b, c, d] = address.octets();
                info!("Link up, address {}.{}.{}.{}", a, b, c, d);
            }
            Event::LinkUp
        } else {
            warn!("No network could be joined");
            Event::LinkDown
        }
    }

    async fn fetch(&mut self) -> Event {
        debug_assert!(self.state.network_allowed());
        let source = &mut self.device.source;
        match source.fetch_quote(&self.config.quote.symbol).await {
            Ok(quote) => {
                let time = source.fetch_time(&self.config.clock.timezone).await;
                info!(
                    "Quote {} change {} ({}%)",
                    quote.price,
                    quote.change,
                    quote.change_percent
                );
                self.reading = Some(Reading { quote, time });
                Event::QuoteReceived
            }
            Err(e) => {
                warn!("Quote lookup failed: {}", e);
                Event::QuoteFailed(e)
            }
        }
    }

    async fn account_failure(&mut self, frame: StatusFrame) -> Event {
        match self.budget.consume() {
            BudgetStatus::Retry { remaining } => {
                warn!("Cycle failed, {} retries left", remaining);
                if self.budget.is_exhausted() {
                    warn!("Next failure halts the device");
                }
                self.show_status(frame).await;
                Event::RetryScheduled
            }
            BudgetStatus::Exhausted => {
                error!("Retry budget exhausted, halting");
                Event::BudgetExhausted
            }
        }
    }

    async fn render(&mut self) -> Event {
        self.budget.restore();
        self.cycles = self.cycles.wrapping_add(1);

        let battery = self.device.power.battery_percent().await;
        let Some(reading) = self.reading.as_ref() else {
            warn!("Nothing to render");
            return Event::FramePresented;
        };

        let quote = &self.config.quote;
        let renderer = &mut self.device.renderer;
        let result = match draw_data(
            renderer,
            &quote.exchange,
            &quote.symbol,
            reading,
            battery,
            self.config.schedule.battery_low_percent,
        ) {
            Ok(()) => renderer.present().await,
            Err(e) => Err(e),
        };
        log_render_error(result);

        debug!("Cycle {} complete", self.cycles);
        Event::FramePresented
    }

    async fn sleep(&mut self, interval: Interval) -> Event {
        let duration = self.config.schedule.interval(interval);
        self.power_down().await;
        info!("Sleeping {}s", duration.as_secs());
        self.device.power.sleep_for(duration).await;

        self.device.power.enter_active().await;
        log_render_error(self.device.renderer.wake().await);
        Event::Woke
    }

    async fn idle(&mut self) {
        if !self.halt_announced {
            self.halt_announced = true;
            self.show_status(StatusFrame::DeviceOff).await;
            self.power_down().await;
        }
        self.device
            .power
            .sleep_for(self.config.schedule.halted_interval())
            .await;
    }

    async fn power_down(&mut self) {
        self.device.link.disconnect().await;
        log_render_error(self.device.renderer.sleep().await);
        self.device.power.enter_low_power().await;
    }

    async fn show_status(&mut self, frame: StatusFrame) {
        let renderer = &mut self.device.renderer;
        let result = match draw_status(renderer, frame) {
            Ok(()) => renderer.present().await,
            Err(e) => Err(e),
        };
        log_render_error(result);
    }
}

fn log_render_error(result: Result<(), RenderError>) {
    if let Err(e) = result {
        warn!("Display error: {}", e);
    }
}
