//! SSD1680 e-paper controller
//!
//! Drives the 2.13" B V4 tri-color panel (122x250) over SPI with a
//! separate data/command line. Black RAM uses 0 for ink, red RAM uses
//! 1 for ink, so the black layer is inverted on the way out.
//!
//! The controller loses its configuration in deep sleep; the driver
//! re-runs the init sequence before the next update.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::SpiDevice;
use stockpaper_core::traits::RenderError;

use super::{Panel, BUFFER_LEN, PANEL_HEIGHT, PANEL_WIDTH};

/// SSD1680 command codes
pub mod cmd {
    pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;
    pub const DEEP_SLEEP: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const TEMPERATURE_SENSOR: u8 = 0x18;
    pub const MASTER_ACTIVATION: u8 = 0x20;
    pub const DISPLAY_UPDATE_CONTROL: u8 = 0x21;
    pub const WRITE_BLACK_RAM: u8 = 0x24;
    pub const WRITE_RED_RAM: u8 = 0x26;
    pub const BORDER_WAVEFORM: u8 = 0x3C;
    pub const RAM_X_RANGE: u8 = 0x44;
    pub const RAM_Y_RANGE: u8 = 0x45;
    pub const RAM_X_COUNTER: u8 = 0x4E;
    pub const RAM_Y_COUNTER: u8 = 0x4F;
}

/// Busy line poll period
const BUSY_POLL_MS: u32 = 10;

/// Longest a full refresh may take
const BUSY_TIMEOUT_MS: u32 = 20_000;

/// Bytes converted per SPI write
const CHUNK: usize = 64;

/// SSD1680 driver
pub struct Ssd1680<SPI, DC, RST, BUSY, D> {
    spi: SPI,
    dc: DC,
    rst: RST,
    busy: BUSY,
    delay: D,
    initialized: bool,
}

impl<SPI, DC, RST, BUSY, D> Ssd1680<SPI, DC, RST, BUSY, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    D: DelayNs,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY, delay: D) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            delay,
            initialized: false,
        }
    }

    async fn command(&mut self, command: u8) -> Result<(), RenderError> {
        self.dc.set_low().map_err(|_| RenderError::Bus)?;
        self.spi.write(&[command]).await.map_err(|_| RenderError::Bus)
    }

    async fn data(&mut self, data: &[u8]) -> Result<(), RenderError> {
        self.dc.set_high().map_err(|_| RenderError::Bus)?;
        self.spi.write(data).await.map_err(|_| RenderError::Bus)
    }

    async fn command_with(&mut self, command: u8, data: &[u8]) -> Result<(), RenderError> {
        self.command(command).await?;
        self.data(data).await
    }

    /// Wait for the busy line to drop
    async fn wait_idle(&mut self) -> Result<(), RenderError> {
        let mut waited = 0;
        while self.busy.is_high().map_err(|_| RenderError::Bus)? {
            if waited >= BUSY_TIMEOUT_MS {
                warn!("Panel busy for {} ms", waited);
                return Err(RenderError::Timeout);
            }
            self.delay.delay_ms(BUSY_POLL_MS).await;
            waited += BUSY_POLL_MS;
        }
        Ok(())
    }

    async fn hardware_reset(&mut self) -> Result<(), RenderError> {
        self.rst.set_high().map_err(|_| RenderError::Bus)?;
        self.delay.delay_ms(20).await;
        self.rst.set_low().map_err(|_| RenderError::Bus)?;
        self.delay.delay_ms(2).await;
        self.rst.set_high().map_err(|_| RenderError::Bus)?;
        self.delay.delay_ms(20).await;
        Ok(())
    }

    async fn init(&mut self) -> Result<(), RenderError> {
        self.hardware_reset().await?;
        self.wait_idle().await?;
        self.command(cmd::SW_RESET).await?;
        self.wait_idle().await?;

        let last_gate = (PANEL_HEIGHT - 1) as u16;
        let [gate_lo, gate_hi] = last_gate.to_le_bytes();
        self.command_with(cmd::DRIVER_OUTPUT_CONTROL, &[gate_lo, gate_hi, 0x00])
            .await?;
        // X and Y increment
        self.command_with(cmd::DATA_ENTRY_MODE, &[0x03]).await?;
        self.command_with(cmd::RAM_X_RANGE, &[0x00, ((PANEL_WIDTH - 1) >> 3) as u8])
            .await?;
        self.command_with(cmd::RAM_Y_RANGE, &[0x00, 0x00, gate_lo, gate_hi])
            .await?;
        self.command_with(cmd::BORDER_WAVEFORM, &[0x05]).await?;
        // Internal temperature sensor
        self.command_with(cmd::TEMPERATURE_SENSOR, &[0x80]).await?;
        self.command_with(cmd::DISPLAY_UPDATE_CONTROL, &[0x80, 0x80])
            .await?;
        self.wait_idle().await?;

        self.initialized = true;
        debug!("Panel initialized");
        Ok(())
    }

    async fn reset_counters(&mut self) -> Result<(), RenderError> {
        self.command_with(cmd::RAM_X_COUNTER, &[0x00]).await?;
        self.command_with(cmd::RAM_Y_COUNTER, &[0x00, 0x00]).await
    }

    async fn write_ram(&mut self, command: u8, layer: &[u8], invert: bool) -> Result<(), RenderError> {
        self.command(command).await?;
        let mut chunk = [0u8; CHUNK];
        for part in layer.chunks(CHUNK) {
            for (out, byte) in chunk.iter_mut().zip(part) {
                *out = if invert { !byte } else { *byte };
            }
            self.data(&chunk[..part.len()]).await?;
        }
        Ok(())
    }
}

impl<SPI, DC, RST, BUSY, D> Panel for Ssd1680<SPI, DC, RST, BUSY, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    D: DelayNs,
{
    async fn reset(&mut self) -> Result<(), RenderError> {
        self.init().await
    }

    async fn update(&mut self, black: &[u8], red: &[u8]) -> Result<(), RenderError> {
        if black.len() != BUFFER_LEN || red.len() != BUFFER_LEN {
            return Err(RenderError::OutOfBounds);
        }
        if !self.initialized {
            self.init().await?;
        }

        self.reset_counters().await?;
        self.write_ram(cmd::WRITE_BLACK_RAM, black, true).await?;
        self.reset_counters().await?;
        self.write_ram(cmd::WRITE_RED_RAM, red, false).await?;

        self.command(cmd::MASTER_ACTIVATION).await?;
        self.wait_idle().await
    }

    async fn sleep(&mut self) -> Result<(), RenderError> {
        if !self.initialized {
            return Ok(());
        }
        self.command_with(cmd::DEEP_SLEEP, &[0x01]).await?;
        self.initialized = false;
        self.delay.delay_ms(100).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use core::convert::Infallible;
    use embassy_futures::block_on;
    use embedded_hal_async::spi::Operation;
    use std::rc::Rc;

    /// Bytes sent while DC was low (command) or high (data)
    #[derive(Debug, Clone, PartialEq)]
    enum Frame {
        Command(u8),
        Data(Vec<u8>),
    }

    #[derive(Default)]
    struct Bus {
        dc_high: Cell<bool>,
        frames: RefCell<Vec<Frame>>,
    }

    impl Bus {
        fn commands(&self) -> Vec<u8> {
            self.frames
                .borrow()
                .iter()
                .filter_map(|f| match f {
                    Frame::Command(c) => Some(*c),
                    _ => None,
                })
                .collect()
        }

        /// Concatenated data following the last occurrence of `command`
        fn data_after(&self, command: u8) -> Vec<u8> {
            let frames = self.frames.borrow();
            let start = frames
                .iter()
                .rposition(|f| *f == Frame::Command(command))
                .unwrap();
            frames[start + 1..]
                .iter()
                .take_while(|f| matches!(f, Frame::Data(_)))
                .flat_map(|f| match f {
                    Frame::Data(d) => d.clone(),
                    _ => Vec::new(),
                })
                .collect()
        }
    }

    struct MockSpi(Rc<Bus>);

    impl embedded_hal_async::spi::ErrorType for MockSpi {
        type Error = Infallible;
    }

    impl SpiDevice for MockSpi {
        async fn transaction(
            &mut self,
            operations: &mut [Operation<'_, u8>],
        ) -> Result<(), Infallible> {
            for op in operations.iter() {
                if let Operation::Write(bytes) = op {
                    let frame = if self.0.dc_high.get() {
                        Frame::Data(bytes.to_vec())
                    } else {
                        assert_eq!(bytes.len(), 1);
                        Frame::Command(bytes[0])
                    };
                    self.0.frames.borrow_mut().push(frame);
                }
            }
            Ok(())
        }
    }

    struct DcPin(Rc<Bus>);

    impl embedded_hal::digital::ErrorType for DcPin {
        type Error = Infallible;
    }

    impl OutputPin for DcPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.dc_high.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.dc_high.set(true);
            Ok(())
        }
    }

    struct NoPin;

    impl embedded_hal::digital::ErrorType for NoPin {
        type Error = Infallible;
    }

    impl OutputPin for NoPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    /// Busy line that is never busy, or stuck busy
    struct BusyPin {
        stuck: bool,
    }

    impl embedded_hal::digital::ErrorType for BusyPin {
        type Error = Infallible;
    }

    impl InputPin for BusyPin {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.stuck)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.stuck)
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        async fn delay_ns(&mut self, _ns: u32) {}
    }

    type Driver = Ssd1680<MockSpi, DcPin, NoPin, BusyPin, NoDelay>;

    fn driver(stuck: bool) -> (Driver, Rc<Bus>) {
        let bus = Rc::new(Bus::default());
        let driver = Ssd1680::new(
            MockSpi(bus.clone()),
            DcPin(bus.clone()),
            NoPin,
            BusyPin { stuck },
            NoDelay,
        );
        (driver, bus)
    }

    #[test]
    fn test_init_sequence() {
        let (mut driver, bus) = driver(false);
        block_on(driver.reset()).unwrap();

        assert_eq!(
            bus.commands(),
            vec![
                cmd::SW_RESET,
                cmd::DRIVER_OUTPUT_CONTROL,
                cmd::DATA_ENTRY_MODE,
                cmd::RAM_X_RANGE,
                cmd::RAM_Y_RANGE,
                cmd::BORDER_WAVEFORM,
                cmd::TEMPERATURE_SENSOR,
                cmd::DISPLAY_UPDATE_CONTROL,
            ]
        );
        assert_eq!(bus.data_after(cmd::DRIVER_OUTPUT_CONTROL), vec![0xF9, 0x00, 0x00]);
        assert_eq!(bus.data_after(cmd::RAM_X_RANGE), vec![0x00, 0x0F]);
        assert_eq!(bus.data_after(cmd::RAM_Y_RANGE), vec![0x00, 0x00, 0xF9, 0x00]);
    }

    #[test]
    fn test_update_writes_both_rams() {
        let (mut driver, bus) = driver(false);
        let black = [0x0Fu8; BUFFER_LEN];
        let red = [0x01u8; BUFFER_LEN];

        block_on(driver.update(&black, &red)).unwrap();

        // Init runs first on a fresh driver
        assert_eq!(bus.commands()[0], cmd::SW_RESET);
        assert_eq!(bus.commands().last(), Some(&cmd::MASTER_ACTIVATION));

        let black_ram = bus.data_after(cmd::WRITE_BLACK_RAM);
        assert_eq!(black_ram.len(), BUFFER_LEN);
        assert!(black_ram.iter().all(|b| *b == 0xF0));

        let red_ram = bus.data_after(cmd::WRITE_RED_RAM);
        assert_eq!(red_ram.len(), BUFFER_LEN);
        assert!(red_ram.iter().all(|b| *b == 0x01));
    }

    #[test]
    fn test_sleep_forces_reinit() {
        let (mut driver, bus) = driver(false);
        let layer = [0u8; BUFFER_LEN];

        block_on(driver.update(&layer, &layer)).unwrap();
        block_on(driver.sleep()).unwrap();
        assert_eq!(bus.data_after(cmd::DEEP_SLEEP), vec![0x01]);

        bus.frames.borrow_mut().clear();
        block_on(driver.update(&layer, &layer)).unwrap();
        assert_eq!(bus.commands()[0], cmd::SW_RESET);
    }

    #[test]
    fn test_sleep_when_asleep_is_noop() {
        let (mut driver, bus) = driver(false);
        block_on(driver.sleep()).unwrap();
        assert!(bus.commands().is_empty());
    }

    #[test]
    fn test_stuck_busy_times_out() {
        let (mut driver, _) = driver(true);
        assert_eq!(block_on(driver.reset()), Err(RenderError::Timeout));
    }

    #[test]
    fn test_wrong_buffer_size() {
        let (mut driver, _) = driver(false);
        assert_eq!(
            block_on(driver.update(&[0; 10], &[0; 10])),
            Err(RenderError::OutOfBounds)
        );
    }
}
