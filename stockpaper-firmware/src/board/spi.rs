//! E-paper SPI device
//!
//! The panel is the only device on SPI1, so chip select is driven around
//! each transaction here.

use embassy_rp::gpio::Output;
use embassy_rp::spi::{Async, Error, Spi};
use embedded_hal_async::spi::{ErrorType, Operation, SpiBus, SpiDevice};

pub struct EpdSpi {
    bus: Spi<'static, embassy_rp::peripherals::SPI1, Async>,
    cs: Output<'static>,
}

impl EpdSpi {
    pub fn new(bus: Spi<'static, embassy_rp::peripherals::SPI1, Async>, cs: Output<'static>) -> Self {
        Self { bus, cs }
    }

    async fn run(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Error> {
        for op in operations {
            match op {
                Operation::Write(data) => self.bus.write(data).await?,
                Operation::Read(buf) => self.bus.read(buf).await?,
                Operation::Transfer(read, write) => self.bus.transfer(read, write).await?,
                Operation::TransferInPlace(buf) => self.bus.transfer_in_place(buf).await?,
                Operation::DelayNs(ns) => {
                    embassy_time::Timer::after_micros((*ns as u64).div_ceil(1000)).await
                }
            }
        }
        SpiBus::flush(&mut self.bus).await
    }
}

impl ErrorType for EpdSpi {
    type Error = Error;
}

impl SpiDevice for EpdSpi {
    async fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Error> {
        self.cs.set_low();
        let result = self.run(operations).await;
        self.cs.set_high();
        result
    }
}
