//!# CAN controller device
//!
//!```
//!# use mcp2518fd::can::MCP2518FD;
//!# use mcp2518fd::config::Configuration;
//!# use mcp2518fd::example::*;
//!#
//! let sys_clk = ExampleClock::default();
//! let spi_bus = ExampleSPIBus::default();
//! let cs_pin = ExampleCSPin {};
//!
//! // Initialize controller object
//! let mut can_controller = MCP2518FD::new(spi_bus, cs_pin);
//!
//! // Use default configuration settings
//! let can_config = Configuration::default();
//!
//! // Reset device, verify identity and write configuration
//! can_controller.configure(&can_config, &sys_clk).unwrap();
//! ```

use crate::config::{ClockConfiguration, Configuration};
use crate::filter::Filter;
use crate::message::{MessageType, TxMessage};
use crate::registers::{FifoControlReg1, FifoStatusReg0};
use crate::status::{DeviceId, OperationMode, OperationStatus, OscillatorStatus};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use core::marker::PhantomData;
use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::OutputPin;
use embedded_time::duration::Milliseconds;
use embedded_time::Clock;
use log::debug;

/// CAN control register
const REGISTER_C1CON: u16 = 0x000;

/// Nominal bit time configuration register
const REGISTER_C1NBTCFG: u16 = 0x004;

/// Data bit time configuration register
const REGISTER_C1DBTCFG: u16 = 0x008;

/// Oscillator control register
const REGISTER_OSC: u16 = 0xE00;

/// Device ID register
const REGISTER_DEVID: u16 = 0xE14;

/// Device type field of the DEVID register expected for the MCP2518FD
const DEVICE_TYPE: u8 = 0x1;

/// First and last address of the message RAM region
const RAM_START: u16 = 0x400;
const RAM_END: u16 = 0xBFF;

/// FIFO index for receiving CAN messages
const FIFO_RX_INDEX: u8 = 1;

/// FIFO index for transmitting CAN messages
const FIFO_TX_INDEX: u8 = 2;

/// Settle time after a reset command, the oscillator needs to physically start
const RESET_SETTLE_MS: u32 = 2;

/// Maximum wait for a requested operation mode to be reported back
const MODE_TIMEOUT_MS: u32 = 2;

/// Maximum wait for the oscillator ready flag, covers worst case
/// crystal startup with margin
const OSC_TIMEOUT_MS: u32 = 10;

/// Low level SPI communication errors
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum BusError<B, CS> {
    /// SPI transfer failed
    TransferError(B),
    /// Setting the chip-select pin state failed
    CSError(CS),
}

/// Errors during device bring-up and configuration
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ConfigError<B, CS> {
    /// SPI bus error
    BusError(BusError<B, CS>),
    /// Time could not be read from the system clock
    ClockError,
    /// Device did not enter configuration mode within timeout
    ConfigurationModeTimeout,
    /// Device did not enter the requested mode within timeout
    RequestModeTimeout,
    /// Oscillator ready flag not set within timeout, device is likely
    /// unpowered, miswired or missing its crystal
    OscillatorTimeout,
    /// Device type field read from the DEVID register does not match the
    /// MCP2518FD, wrong chip or corrupted SPI link
    UnexpectedDeviceId(u8),
}

impl<B, CS> From<BusError<B, CS>> for ConfigError<B, CS> {
    fn from(value: BusError<B, CS>) -> Self {
        ConfigError::BusError(value)
    }
}

impl<B, CS> From<embedded_time::clock::Error> for ConfigError<B, CS> {
    fn from(_error: embedded_time::clock::Error) -> Self {
        ConfigError::ClockError
    }
}

/// Errors during message transmission and reception
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Error<B, CS> {
    /// SPI bus error
    BusError(BusError<B, CS>),
    /// Payload length is not valid for the current operation mode
    InvalidPayloadLength(usize),
    /// Message object address outside the device RAM region
    InvalidRamAddress(u16),
    /// RX buffer length is not a multiple of 4 bytes
    InvalidBufferSize(usize),
    /// TX FIFO is full
    TxFifoFull,
    /// RX FIFO contains no message
    RxFifoEmpty,
}

impl<B, CS> From<BusError<B, CS>> for Error<B, CS> {
    fn from(value: BusError<B, CS>) -> Self {
        Error::BusError(value)
    }
}

/// Trait for CAN controller
pub trait CanController {
    type Error;

    /// Transmit CAN message
    /// * `blocking`: if true, blocks until the TX FIFO has space and the message is sent
    fn transmit<T: MessageType<L>, const L: usize>(
        &mut self,
        message: &TxMessage<T, L>,
        blocking: bool,
    ) -> Result<(), Self::Error>;

    /// Receive CAN message
    /// * `blocking`: if true, blocks until the RX FIFO contains at least one message
    fn receive<const L: usize>(&mut self, data: &mut [u8; L], blocking: bool) -> Result<(), Self::Error>;

    /// Set corresponding filter and mask registers
    fn set_filter_object(&mut self, filter: Filter) -> Result<(), Self::Error>;
}

/// Main MCP2518FD CAN controller device
pub struct MCP2518FD<B: Transfer<u8>, CS: OutputPin, CLK: Clock> {
    /// SPI bus
    bus: B,

    /// Chip-select pin, active low
    pin_cs: CS,

    /// System clock
    clock: PhantomData<CLK>,
}

impl<B, CS, CLK> CanController for MCP2518FD<B, CS, CLK>
where
    B: Transfer<u8>,
    CS: OutputPin,
    CLK: Clock,
{
    type Error = Error<B::Error, CS::Error>;

    fn transmit<T: MessageType<L>, const L: usize>(
        &mut self,
        message: &TxMessage<T, L>,
        blocking: bool,
    ) -> Result<(), Self::Error> {
        let fifo_status_reg = Self::fifo_status_register(FIFO_TX_INDEX);

        while !self.fifo_tfnrfnif(fifo_status_reg)? {
            if !blocking {
                return Err(Error::TxFifoFull);
            }
        }

        // FD frames with more than 8 payload bytes require normal CAN FD mode
        let operation_status = self.read_operation_status()?;

        if message.payload().len() > 8 && operation_status.mode != OperationMode::NormalCANFD {
            return Err(Error::InvalidPayloadLength(message.payload().len()));
        }

        // address of the next free message object slot in RAM
        let user_address = self.read32(Self::fifo_user_address_register(FIFO_TX_INDEX))?;
        let address = RAM_START + user_address as u16;

        self.write_fifo(address, message)?;

        // request transmission (TXREQ) and increment the FIFO tail (UINC)
        let fifo_control_reg1 = Self::fifo_control_register(FIFO_TX_INDEX) + 1;
        self.write_register(fifo_control_reg1, 0x03)?;

        if blocking {
            while !self.txfifo_cleared(fifo_control_reg1)? {}
        }

        Ok(())
    }

    fn receive<const L: usize>(&mut self, data: &mut [u8; L], blocking: bool) -> Result<(), Self::Error> {
        let fifo_status_reg = Self::fifo_status_register(FIFO_RX_INDEX);

        while !self.fifo_tfnrfnif(fifo_status_reg)? {
            if !blocking {
                return Err(Error::RxFifoEmpty);
            }
        }

        let user_address = self.read32(Self::fifo_user_address_register(FIFO_RX_INDEX))?;
        let address = RAM_START + user_address as u16;

        self.read_fifo(address, data)?;

        // increment the FIFO head by a single message
        self.write_register(Self::fifo_control_register(FIFO_RX_INDEX) + 1, 0x01)?;

        Ok(())
    }

    fn set_filter_object(&mut self, filter: Filter) -> Result<(), Self::Error> {
        // filter must be disabled while its registers are modified
        self.disable_filter(filter.index)?;

        self.write32(Self::filter_object_register(filter.index), u32::from(filter.filter_bits))?;
        self.write32(Self::filter_mask_register(filter.index), u32::from(filter.mask_bits))?;

        let filter_control_reg = Self::filter_control_register_byte(filter.index);
        self.write_register(filter_control_reg, (1 << 7) | FIFO_RX_INDEX)?;

        Ok(())
    }
}

impl<B, CS, CLK> MCP2518FD<B, CS, CLK>
where
    B: Transfer<u8>,
    CS: OutputPin,
    CLK: Clock,
{
    pub fn new(bus: B, pin_cs: CS) -> Self {
        Self {
            bus,
            pin_cs,
            clock: Default::default(),
        }
    }

    /// Brings the device from an unknown state into the given configuration
    /// and requests the configured operation mode.
    ///
    /// The sequence is reset, configuration mode, oscillator ready,
    /// device identity check, then clock/bit timing/FIFO/filter setup while
    /// still in configuration mode. Aborts on the first failing step.
    pub fn configure(&mut self, config: &Configuration, clock: &CLK) -> Result<(), ConfigError<B::Error, CS::Error>> {
        self.reset(clock)?;

        self.enable_mode(OperationMode::Configuration, clock, ConfigError::ConfigurationModeTimeout)?;

        self.wait_for_oscillator(clock)?;

        self.verify_device_id()?;

        self.write_register(REGISTER_OSC, config.clock.as_register())?;

        self.write32(REGISTER_C1NBTCFG, config.bit_timing.nominal.as_register())?;
        self.write32(REGISTER_C1DBTCFG, config.bit_timing.data.as_register())?;

        self.write_register(
            Self::fifo_control_register(FIFO_RX_INDEX) + 3,
            config.fifo.as_rx_register_3(),
        )?;

        self.write_register(
            Self::fifo_control_register(FIFO_TX_INDEX) + 2,
            config.fifo.as_tx_register_2(),
        )?;

        self.write_register(
            Self::fifo_control_register(FIFO_TX_INDEX) + 3,
            config.fifo.as_tx_register_3(),
        )?;

        self.write_register(Self::fifo_control_register(FIFO_TX_INDEX), config.fifo.as_tx_register_0())?;

        self.enable_filter(FIFO_RX_INDEX, 0)?;

        self.enable_mode(config.mode.to_operation_mode(), clock, ConfigError::RequestModeTimeout)?;

        Ok(())
    }

    /// Resets the device, forcing all registers to their default values and
    /// the device into configuration mode, then waits for the oscillator to
    /// physically start.
    pub fn reset(&mut self, clock: &CLK) -> Result<(), ConfigError<B::Error, CS::Error>> {
        let mut buffer = self.cmd_header(0x000, Operation::Reset);
        self.transfer(&mut buffer)?;

        let settled = clock
            .try_now()?
            .checked_add(Milliseconds::new(RESET_SETTLE_MS))
            .ok_or(ConfigError::ClockError)?;

        while clock.try_now()? <= settled {}

        Ok(())
    }

    /// Disable corresponding filter
    pub fn disable_filter(&mut self, filter_index: u8) -> Result<(), BusError<B::Error, CS::Error>> {
        self.write_register(Self::filter_control_register_byte(filter_index), 0x00)?;

        Ok(())
    }

    /// Enable filter and connect it to the given RX FIFO
    pub fn enable_filter(&mut self, fifo_index: u8, filter_index: u8) -> Result<(), BusError<B::Error, CS::Error>> {
        let filter_control_reg = Self::filter_control_register_byte(filter_index);

        // filter must be disabled to modify the FIFO pointer
        self.disable_filter(filter_index)?;

        // FIFO where matching messages are stored
        self.write_register(filter_control_reg, fifo_index)?;

        // set FLTEN to enable the filter
        self.write_register(filter_control_reg, (1 << 7) | fifo_index)?;

        Ok(())
    }

    /// Reads and returns the operation status
    pub fn read_operation_status(&mut self) -> Result<OperationStatus, BusError<B::Error, CS::Error>> {
        let data = self.read_register(REGISTER_C1CON + 2)?;

        Ok(OperationStatus::from_register(data))
    }

    /// Reads and returns the oscillator status
    pub fn read_oscillator_status(&mut self) -> Result<OscillatorStatus, BusError<B::Error, CS::Error>> {
        let data = self.read_register(REGISTER_OSC + 1)?;

        Ok(OscillatorStatus::from_register(data))
    }

    /// Reads and returns the current clock configuration
    pub fn read_clock_configuration(&mut self) -> Result<ClockConfiguration, BusError<B::Error, CS::Error>> {
        let data = self.read_register(REGISTER_OSC)?;

        Ok(ClockConfiguration::from_register(data))
    }

    /// Reads and returns the device identity
    pub fn read_device_id(&mut self) -> Result<DeviceId, BusError<B::Error, CS::Error>> {
        let data = self.read_register(REGISTER_DEVID)?;

        Ok(DeviceId::from_register(data))
    }

    /// Requests the given operation mode and waits until the device reports
    /// it as the current mode.
    ///
    /// Returns immediately without issuing a request if the device already
    /// reports the target mode. The current mode field is polled rather than
    /// the request field, as the device only adopts a requested mode once its
    /// preconditions hold.
    fn enable_mode(
        &mut self,
        mode: OperationMode,
        clock: &CLK,
        timeout_error: ConfigError<B::Error, CS::Error>,
    ) -> Result<(), ConfigError<B::Error, CS::Error>> {
        if self.read_operation_status()?.mode == mode {
            return Ok(());
        }

        // request mode and abort all pending transmissions
        self.write_register(REGISTER_C1CON + 3, mode as u8 | (1 << 3))?;

        let deadline = clock
            .try_now()?
            .checked_add(Milliseconds::new(MODE_TIMEOUT_MS))
            .ok_or(ConfigError::ClockError)?;

        loop {
            if self.read_operation_status()?.mode == mode {
                return Ok(());
            }

            if clock.try_now()? > deadline {
                debug!("Device did not enter mode {mode:?} within timeout");
                return Err(timeout_error);
            }
        }
    }

    /// Polls the oscillator ready flag until set
    fn wait_for_oscillator(&mut self, clock: &CLK) -> Result<(), ConfigError<B::Error, CS::Error>> {
        let deadline = clock
            .try_now()?
            .checked_add(Milliseconds::new(OSC_TIMEOUT_MS))
            .ok_or(ConfigError::ClockError)?;

        loop {
            if self.read_oscillator_status()?.clock_ready {
                return Ok(());
            }

            if clock.try_now()? > deadline {
                debug!("Oscillator not ready within timeout");
                return Err(ConfigError::OscillatorTimeout);
            }
        }
    }

    /// Reads the device identity once and checks the device type field.
    /// The revision field is not checked.
    fn verify_device_id(&mut self) -> Result<(), ConfigError<B::Error, CS::Error>> {
        let id = self.read_device_id()?;

        if id.device_type != DEVICE_TYPE {
            debug!("Unexpected device type {}, revision {}", id.device_type, id.revision);
            return Err(ConfigError::UnexpectedDeviceId(id.device_type));
        }

        Ok(())
    }

    /// Writes a single register byte
    fn write_register(&mut self, register: u16, value: u8) -> Result<(), BusError<B::Error, CS::Error>> {
        let header = self.cmd_header(register, Operation::Write);
        let mut buffer = [header[0], header[1], value];

        self.transfer(&mut buffer)?;

        Ok(())
    }

    /// 4-byte SFR write, value transmitted in little endian byte order
    pub(crate) fn write32(&mut self, register: u16, value: u32) -> Result<(), BusError<B::Error, CS::Error>> {
        let mut buffer = [0u8; 6];
        let header = self.cmd_header(register, Operation::Write);

        buffer[..2].copy_from_slice(&header);
        buffer[2..].copy_from_slice(&value.to_le_bytes());

        self.transfer(&mut buffer)?;

        Ok(())
    }

    /// Reads a single register byte
    fn read_register(&mut self, register: u16) -> Result<u8, BusError<B::Error, CS::Error>> {
        let header = self.cmd_header(register, Operation::Read);
        let mut buffer = [header[0], header[1], 0];

        let response = self.transfer(&mut buffer)?;

        Ok(response[2])
    }

    /// 4-byte SFR read, the result is assembled from the last four received
    /// bytes in little endian order
    pub(crate) fn read32(&mut self, register: u16) -> Result<u32, BusError<B::Error, CS::Error>> {
        let mut buffer = [0u8; 6];
        let header = self.cmd_header(register, Operation::Read);

        buffer[..2].copy_from_slice(&header);

        let response = self.transfer(&mut buffer)?;

        Ok(LittleEndian::read_u32(&response[2..]))
    }

    /// Inserts a message object into the TX FIFO RAM
    fn write_fifo<T: MessageType<L>, const L: usize>(
        &mut self,
        register: u16,
        message: &TxMessage<T, L>,
    ) -> Result<(), Error<B::Error, CS::Error>> {
        self.verify_ram_address(register, message.payload().len())?;

        let mut buffer = [0u8; 10];
        let header = self.cmd_header(register, Operation::Write);

        buffer[..2].copy_from_slice(&header);
        buffer[2..].copy_from_slice(&message.header_bytes());

        // message object words are stored little endian in RAM
        for word in buffer[2..].chunks_exact_mut(4) {
            let num = BigEndian::read_u32(word);
            LittleEndian::write_u32(word, num);
        }

        let mut data = [0u8; L];
        data[..message.payload().len()].copy_from_slice(message.payload());

        // header and payload are exchanged back-to-back under a single
        // chip-select assertion
        self.pin_cs.set_low().map_err(BusError::CSError)?;

        let mut result = self.bus.transfer(&mut buffer).map(|_| ());
        if result.is_ok() {
            result = self.bus.transfer(&mut data).map(|_| ());
        }

        self.pin_cs.set_high().map_err(BusError::CSError)?;
        result.map_err(BusError::TransferError)?;

        Ok(())
    }

    /// Reads the payload of a received message object, skipping its header
    fn read_fifo<const L: usize>(&mut self, register: u16, data: &mut [u8; L]) -> Result<(), Error<B::Error, CS::Error>> {
        if L % 4 != 0 {
            return Err(Error::InvalidBufferSize(L));
        }

        // payload starts after the 8-byte receive message object header
        let mut header = self.cmd_header(register + 8, Operation::Read);
        let mut buffer = [0u8; L];

        self.pin_cs.set_low().map_err(BusError::CSError)?;

        let mut result = self.bus.transfer(&mut header).map(|_| ());
        if result.is_ok() {
            match self.bus.transfer(&mut buffer) {
                Ok(response) => data.copy_from_slice(response),
                Err(e) => result = Err(e),
            }
        }

        self.pin_cs.set_high().map_err(BusError::CSError)?;
        result.map_err(BusError::TransferError)?;

        Ok(())
    }

    /// Verify address within RAM bounds
    fn verify_ram_address(&self, addr: u16, data_length: usize) -> Result<(), Error<B::Error, CS::Error>> {
        if addr < RAM_START || (addr + data_length as u16) > RAM_END {
            return Err(Error::InvalidRamAddress(addr));
        }

        Ok(())
    }

    /// Executes a single full-duplex transfer, asserting the chip-select pin
    /// for its duration. The pin is released even if the transfer fails.
    fn transfer<'a>(&mut self, buffer: &'a mut [u8]) -> Result<&'a [u8], BusError<B::Error, CS::Error>> {
        self.pin_cs.set_low().map_err(BusError::CSError)?;

        let result = self.bus.transfer(buffer).map_err(BusError::TransferError);

        self.pin_cs.set_high().map_err(BusError::CSError)?;

        result
    }

    /// Creates the two byte command header for the given register.
    /// Byte 0 carries the opcode in the upper nibble and address bits 11:8 in
    /// the lower nibble, byte 1 carries address bits 7:0.
    fn cmd_header(&self, register: u16, operation: Operation) -> [u8; 2] {
        let command = (register & 0x0FFF) | ((operation as u16) << 12);

        [(command >> 8) as u8, (command & 0xFF) as u8]
    }

    /// Returns if the TX/RX FIFO not full/not empty flag is set
    fn fifo_tfnrfnif(&mut self, fifo_status_reg: u16) -> Result<bool, BusError<B::Error, CS::Error>> {
        let status_byte0 = self.read_register(fifo_status_reg)?;
        let status_reg0 = FifoStatusReg0::from(status_byte0);

        Ok(status_reg0.tfnrfnif())
    }

    /// Returns true if TXREQ is cleared, i.e. all queued messages are transmitted
    fn txfifo_cleared(&mut self, fifo_control_reg1: u16) -> Result<bool, BusError<B::Error, CS::Error>> {
        let control_byte1 = self.read_register(fifo_control_reg1)?;
        let control_reg1 = FifoControlReg1::from(control_byte1);

        Ok(!control_reg1.txreq())
    }

    /// Returns the control register address for the given FIFO index
    fn fifo_control_register(fifo_index: u8) -> u16 {
        0x05C + 12 * (fifo_index as u16 - 1)
    }

    /// Returns the status register address for the given FIFO index
    fn fifo_status_register(fifo_index: u8) -> u16 {
        0x060 + 12 * (fifo_index as u16 - 1)
    }

    /// Returns the user address register address for the given FIFO index
    fn fifo_user_address_register(fifo_index: u8) -> u16 {
        0x064 + 12 * (fifo_index as u16 - 1)
    }

    /// Returns the filter control register byte address of the given filter
    fn filter_control_register_byte(filter_index: u8) -> u16 {
        0x1D0 + filter_index as u16
    }

    /// Returns the filter object register address of the given filter
    fn filter_object_register(filter_index: u8) -> u16 {
        0x1F0 + 8 * (filter_index as u16)
    }

    /// Returns the filter mask register address of the given filter
    fn filter_mask_register(filter_index: u8) -> u16 {
        0x1F4 + 8 * (filter_index as u16)
    }
}

/// Register operation type
#[derive(Copy, Clone)]
enum Operation {
    Reset = 0b0000,
    Write = 0b0010,
    Read = 0b0011,
}
