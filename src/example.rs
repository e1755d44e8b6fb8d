//! # Dummy structures for doc examples
//!
//! [ExampleSPIBus] plays the device side of the bring-up sequence: it reports
//! configuration mode on the first control register read, a ready oscillator
//! and the MCP2518FD device id.
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::convert::Infallible;
use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::OutputPin;
use embedded_time::clock::Error;
use embedded_time::duration::{Duration, Fraction};
use embedded_time::fixed_point::FixedPoint;
use embedded_time::timer::param::{Armed, OneShot};
use embedded_time::{Clock, Instant, Timer};

/// SPI bus double answering like a freshly reset device
#[derive(Default, Debug)]
pub struct ExampleSPIBus {
    read_calls: u32,
    ram_read: bool,
}

impl Transfer<u8> for ExampleSPIBus {
    type Error = u32;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Self::Error> {
        // write commands just echo
        if words[0] >> 4 == 0x2 {
            return Ok(words);
        }

        // RAM read command, the payload follows as a separate transfer
        if words.len() == 2 && words[0] >> 4 == 0x3 {
            self.ram_read = true;
            return Ok(words);
        }

        if self.ram_read && words.len() == 8 {
            self.ram_read = false;
            words.iter_mut().enumerate().for_each(|(i, val)| {
                *val = (i + 1) as u8;
            });
            return Ok(words);
        }

        // SFR read commands
        if words[0] == 0x30 {
            match words[1] {
                // C1CON byte 2: configuration mode on the first read,
                // normal CAN FD mode afterwards
                0x02 => {
                    if self.read_calls == 0 {
                        self.read_calls += 1;
                        words[2] = 0b1001_0100;
                    } else {
                        words[2] = 0b0000_0000;
                    }
                }
                // C1FIFOSTA1: RX FIFO not empty
                0x60 => words[2] = 0x1,
                // C1FIFOUA1: RX FIFO user address 0x47C
                0x64 => words[2..].copy_from_slice(&[0x7C, 0x04, 0x00, 0x00]),
                // C1FIFOCON2 byte 1: TXREQ cleared
                0x69 => words[2] = 0x0,
                // C1FIFOSTA2: TX FIFO not full
                0x6C => words[2] = 0x1,
                // C1FIFOUA2: TX FIFO user address 0x4A2
                0x70 => words[2..].copy_from_slice(&[0xA2, 0x04, 0x00, 0x00]),
                _ => {}
            }
            return Ok(words);
        }

        if words[0] == 0x3E {
            match words[1] {
                // OSC byte 1: oscillator and system clock ready
                0x01 => words[2] = 0b0001_0100,
                // DEVID: MCP2518FD, revision 1
                0x14 => words[2] = 0x11,
                _ => {}
            }
            return Ok(words);
        }

        Ok(words)
    }
}

/// Chip-select pin double, ignores all state changes
pub struct ExampleCSPin {}

impl OutputPin for ExampleCSPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Clock double returning a scripted list of microsecond instants
#[derive(Debug, PartialEq, Eq)]
pub struct ExampleClock {
    pub next_instants: RefCell<Vec<u64>>,
}

impl ExampleClock {
    pub fn new(next_instants: Vec<u64>) -> Self {
        Self {
            next_instants: RefCell::new(next_instants),
        }
    }
}

impl Default for ExampleClock {
    fn default() -> Self {
        Self::new(vec![
            100,   // Reset: settle timer start
            2_200, // Reset: settle time elapsed
            2_300, // Oscillator poll: timer start
        ])
    }
}

impl Clock for ExampleClock {
    type T = u64;
    const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

    fn try_now(&self) -> Result<Instant<Self>, Error> {
        if self.next_instants.borrow().len() == 0 {
            return Err(Error::Unspecified);
        }

        Ok(Instant::new(self.next_instants.borrow_mut().remove(0)))
    }

    fn new_timer<Dur: Duration + FixedPoint>(&self, duration: Dur) -> Timer<OneShot, Armed, Self, Dur> {
        Timer::new(self, duration)
    }
}
