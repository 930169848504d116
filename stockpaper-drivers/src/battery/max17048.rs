//! MAX17048 fuel gauge (I2C)
//!
//! The gauge runs its ModelGauge algorithm on its own; the host only reads
//! results. Registers are 16-bit big-endian.
//!
//! - VCELL (0x02): 78.125 uV per LSB
//! - SOC (0x04): high byte is whole percent, low byte is 1/256 %

use embedded_hal_async::i2c::I2c;

use super::BatteryGauge;

/// Fixed 7-bit address
pub const ADDRESS: u8 = 0x36;

/// MAX17048 register addresses
pub mod reg {
    /// Cell voltage
    pub const VCELL: u8 = 0x02;
    /// State of charge
    pub const SOC: u8 = 0x04;
}

/// MAX17048 driver
pub struct Max17048<I> {
    i2c: I,
}

impl<I: I2c> Max17048<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    async fn read_register(&mut self, register: u8) -> Result<u16, I::Error> {
        let mut data = [0u8; 2];
        self.i2c.write_read(ADDRESS, &[register], &mut data).await?;
        Ok(u16::from_be_bytes(data))
    }

    /// State of charge in percent, clamped to 100
    pub async fn state_of_charge(&mut self) -> Result<f32, I::Error> {
        let raw = self.read_register(reg::SOC).await?;
        Ok(soc_percent(raw))
    }

    /// Cell voltage in millivolts
    pub async fn cell_voltage_mv(&mut self) -> Result<u16, I::Error> {
        let raw = self.read_register(reg::VCELL).await?;
        Ok(vcell_mv(raw))
    }
}

impl<I: I2c> BatteryGauge for Max17048<I> {
    async fn percent(&mut self) -> Option<f32> {
        match self.state_of_charge().await {
            Ok(percent) => {
                if let Ok(mv) = self.cell_voltage_mv().await {
                    debug!("Battery at {} mV", mv);
                }
                Some(percent)
            }
            Err(_) => {
                debug!("Fuel gauge not responding");
                None
            }
        }
    }
}

/// Convert a raw SOC reading
pub fn soc_percent(raw: u16) -> f32 {
    let whole = (raw >> 8) as f32;
    let fraction = (raw & 0xFF) as f32 / 256.0;
    (whole + fraction).min(100.0)
}

/// Convert a raw VCELL reading
pub fn vcell_mv(raw: u16) -> u16 {
    // 78.125 uV = 5/64 mV
    ((raw as u32 * 5) / 64) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::{ErrorKind, ErrorType, Operation};

    /// Bus serving fixed register contents
    struct MockBus {
        soc: u16,
        vcell: u16,
        present: bool,
    }

    impl ErrorType for MockBus {
        type Error = ErrorKind;
    }

    impl I2c for MockBus {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if !self.present || address != ADDRESS {
                return Err(ErrorKind::NoAcknowledge(
                    embedded_hal_async::i2c::NoAcknowledgeSource::Address,
                ));
            }

            let mut register = 0;
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => register = bytes[0],
                    Operation::Read(buf) => {
                        let value = match register {
                            reg::SOC => self.soc,
                            reg::VCELL => self.vcell,
                            _ => 0,
                        };
                        buf.copy_from_slice(&value.to_be_bytes());
                    }
                }
            }
            Ok(())
        }
    }

    fn gauge(soc: u16, present: bool) -> Max17048<MockBus> {
        Max17048::new(MockBus {
            soc,
            vcell: 0xC350,
            present,
        })
    }

    #[test]
    fn test_soc_conversion() {
        assert_eq!(soc_percent(0x5080), 80.5);
        assert_eq!(soc_percent(0x0000), 0.0);
        // Gauge may report slightly above full after charging
        assert_eq!(soc_percent(0x6600), 100.0);
    }

    #[test]
    fn test_vcell_conversion() {
        // 0xC350 = 50000 LSB = 3906.25 mV
        assert_eq!(vcell_mv(0xC350), 3906);
    }

    #[test]
    fn test_percent_reads_soc() {
        let mut gauge = gauge(0x3240, true);
        assert_eq!(block_on(gauge.percent()), Some(50.25));
        assert_eq!(block_on(gauge.cell_voltage_mv()), Ok(3906));
    }

    #[test]
    fn test_missing_sensor_is_none() {
        let mut gauge = gauge(0x3240, false);
        assert_eq!(block_on(gauge.percent()), None);
    }
}
