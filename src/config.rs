//!# Controller configuration
//!
//! [Configuration] bundles everything `configure` writes to the device while it
//! is in configuration mode: oscillator/clock setup, nominal and data bit
//! timing, FIFO sizing and the operation mode requested once configuration is
//! done.
//!
//! Bit timing values are passed as raw register quantities (prescaler and time
//! segments in time quanta). Calculating them from a target baud rate is left
//! to the application, which knows the external crystal frequency.
use crate::registers::{DataBitTimeReg, FifoControlReg0, FifoControlReg2, FifoControlReg3, NominalBitTimeReg};
use crate::status::OperationMode;

/// Entire configuration currently supported
#[derive(Default, Clone, Debug)]
pub struct Configuration {
    /// Oscillator/clock configuration
    pub clock: ClockConfiguration,

    /// Nominal and data phase bit timing
    pub bit_timing: BitTimingConfiguration,

    /// TX/RX FIFO configuration
    pub fifo: FifoConfiguration,

    /// Operation mode requested at the end of configuration
    pub mode: RequestMode,
}

/// Oscillator/Clock configuration
#[derive(Copy, Clone, Debug, Default)]
pub struct ClockConfiguration {
    /// Divisor for clock output
    pub clock_output: ClockOutputDivisor,

    /// Divisor for system clock
    pub system_clock: SystemClockDivisor,

    /// Disable clock/oscillator?
    pub disable_clock: bool,

    /// PLL configuration
    pub pll: PLLSetting,
}

impl ClockConfiguration {
    /// Maps register values to configuration
    pub(crate) fn from_register(register: u8) -> Self {
        Self {
            clock_output: ClockOutputDivisor::from_register(register),
            system_clock: SystemClockDivisor::from_register(register),
            disable_clock: register & (1 << 2) != 0,
            pll: PLLSetting::from_register(register),
        }
    }

    /// Encodes the configuration to register byte
    pub(crate) fn as_register(&self) -> u8 {
        let mut register = 0x0;

        register |= (self.clock_output as u8) << 5;
        register |= (self.system_clock as u8) << 4;
        register |= (self.disable_clock as u8) << 2;
        register |= self.pll as u8;

        register
    }
}

/// Divisor for clock output
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClockOutputDivisor {
    DivideBy10 = 0b11,
    DivideBy4 = 0b10,
    DivideBy2 = 0b01,
    DivideBy1 = 0b00,
}

impl Default for ClockOutputDivisor {
    fn default() -> Self {
        Self::DivideBy1
    }
}

impl ClockOutputDivisor {
    /// Maps register values to configuration
    pub(crate) fn from_register(register: u8) -> Self {
        match register >> 5 {
            0b11 => Self::DivideBy10,
            0b10 => Self::DivideBy4,
            0b01 => Self::DivideBy2,
            _ => Self::DivideBy1,
        }
    }
}

/// Divisor for system clock
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SystemClockDivisor {
    DivideBy2 = 0b1,
    DivideBy1 = 0b0,
}

impl Default for SystemClockDivisor {
    fn default() -> Self {
        Self::DivideBy1
    }
}

impl SystemClockDivisor {
    /// Maps register values to configuration
    pub(crate) fn from_register(register: u8) -> Self {
        if register & (1 << 4) != 0 {
            Self::DivideBy2
        } else {
            Self::DivideBy1
        }
    }
}

/// PLL configuration
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PLLSetting {
    /// System clock from 10x PLL
    TenTimesPLL = 0b1,
    /// System clock comes directly from XTAL oscillator
    DirectXTALOscillator = 0b0,
}

impl Default for PLLSetting {
    fn default() -> Self {
        Self::DirectXTALOscillator
    }
}

impl PLLSetting {
    /// Maps register values to configuration
    pub(crate) fn from_register(register: u8) -> Self {
        if register & 1 != 0 {
            Self::TenTimesPLL
        } else {
            Self::DirectXTALOscillator
        }
    }
}

/// Bit timing for the arbitration and data phases
#[derive(Copy, Clone, Debug, Default)]
pub struct BitTimingConfiguration {
    /// Arbitration phase (nominal) bit timing
    pub nominal: NominalBitTiming,

    /// Data phase bit timing, used when bit rate switching is active
    pub data: DataBitTiming,
}

/// Nominal bit timing register values (C1NBTCFG)
///
/// All values are in time quanta minus one, as the hardware counts them.
/// The bit time is `1 + (tseg1 + 1) + (tseg2 + 1)` quanta.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NominalBitTiming {
    /// Baud rate prescaler, time quantum = (value + 1) / Fsys
    pub prescaler: u8,

    /// Time segment 1 (propagation + phase segment 1)
    pub tseg1: u8,

    /// Time segment 2 (phase segment 2), max 127
    pub tseg2: u8,

    /// Synchronization jump width, max 127
    pub sjw: u8,
}

impl Default for NominalBitTiming {
    /// Device reset values, 500 kbit/s with a 40 MHz system clock
    fn default() -> Self {
        Self {
            prescaler: 0,
            tseg1: 62,
            tseg2: 15,
            sjw: 15,
        }
    }
}

impl NominalBitTiming {
    /// Encodes the timing values to the register word
    pub(crate) fn as_register(&self) -> u32 {
        NominalBitTimeReg::new()
            .with_brp(self.prescaler)
            .with_tseg1(self.tseg1)
            .with_tseg2(self.tseg2 & 0x7F)
            .with_sjw(self.sjw & 0x7F)
            .into()
    }
}

/// Data phase bit timing register values (C1DBTCFG)
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DataBitTiming {
    /// Baud rate prescaler, time quantum = (value + 1) / Fsys
    pub prescaler: u8,

    /// Time segment 1 (propagation + phase segment 1), max 31
    pub tseg1: u8,

    /// Time segment 2 (phase segment 2), max 15
    pub tseg2: u8,

    /// Synchronization jump width, max 15
    pub sjw: u8,
}

impl Default for DataBitTiming {
    /// Device reset values
    fn default() -> Self {
        Self {
            prescaler: 0,
            tseg1: 14,
            tseg2: 3,
            sjw: 3,
        }
    }
}

impl DataBitTiming {
    /// Encodes the timing values to the register word
    pub(crate) fn as_register(&self) -> u32 {
        DataBitTimeReg::new()
            .with_brp(self.prescaler)
            .with_tseg1(self.tseg1 & 0x1F)
            .with_tseg2(self.tseg2 & 0xF)
            .with_sjw(self.sjw & 0xF)
            .into()
    }
}

/// TX/RX FIFO configuration
#[derive(Copy, Clone, Debug)]
pub struct FifoConfiguration {
    /// Size of the RX FIFO in messages (1-32)
    pub rx_size: u8,

    /// Size of the TX FIFO in messages (1-32)
    pub tx_size: u8,

    /// Payload size per message object
    pub pl_size: PayloadSize,

    /// Message transmit priority (0 = lowest, 31 = highest)
    pub tx_priority: u8,

    /// Retransmission attempts on lost arbitration or error frames
    pub tx_attempts: RetransmissionAttempts,

    /// Enables the TX FIFO
    pub tx_enable: bool,
}

impl Default for FifoConfiguration {
    fn default() -> Self {
        Self {
            rx_size: 16,
            tx_size: 16,
            pl_size: PayloadSize::EightBytes,
            tx_priority: 0,
            tx_attempts: RetransmissionAttempts::Three,
            tx_enable: true,
        }
    }
}

impl FifoConfiguration {
    /// Encodes the fourth RX FIFO control register byte
    pub(crate) fn as_rx_register_3(&self) -> u8 {
        FifoControlReg3::new()
            .with_plsize(self.pl_size as u8)
            .with_fifo_size(self.rx_size)
            .into()
    }

    /// Encodes the first TX FIFO control register byte
    pub(crate) fn as_tx_register_0(&self) -> u8 {
        FifoControlReg0::new().with_txen(self.tx_enable).into()
    }

    /// Encodes the third TX FIFO control register byte
    pub(crate) fn as_tx_register_2(&self) -> u8 {
        FifoControlReg2::new()
            .with_txat(self.tx_attempts as u8)
            .with_txpri(self.tx_priority.clamp(0, 31))
            .into()
    }

    /// Encodes the fourth TX FIFO control register byte
    pub(crate) fn as_tx_register_3(&self) -> u8 {
        FifoControlReg3::new()
            .with_plsize(self.pl_size as u8)
            .with_fifo_size(self.tx_size)
            .into()
    }
}

/// Payload size of a single message object in RAM
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PayloadSize {
    EightBytes = 0b000,
    TwelveBytes = 0b001,
    SixteenBytes = 0b010,
    TwentyBytes = 0b011,
    TwentyFourBytes = 0b100,
    ThirtyTwoBytes = 0b101,
    FortyEightBytes = 0b110,
    SixtyFourBytes = 0b111,
}

impl Default for PayloadSize {
    fn default() -> Self {
        Self::EightBytes
    }
}

/// Number of retransmission attempts for messages losing arbitration
/// or aborted by error frames
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RetransmissionAttempts {
    NoRetransmission = 0b00,
    Three = 0b01,
    Unlimited = 0b10,
}

impl Default for RetransmissionAttempts {
    fn default() -> Self {
        Self::Three
    }
}

/// Operation mode requested once configuration is written
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RequestMode {
    /// Mixed CAN FD and CAN 2.0 traffic
    NormalCANFD,
    /// Classic CAN 2.0 frames only
    NormalCAN2_0,
    /// Receive without acknowledging or transmitting
    ListenOnly,
    /// Frames are looped back internally without touching the bus
    InternalLoopback,
    /// Frames are transmitted on the bus and received back
    ExternalLoopback,
    /// Lowest power state, wake-up on bus activity
    Sleep,
}

impl Default for RequestMode {
    fn default() -> Self {
        Self::NormalCANFD
    }
}

impl RequestMode {
    pub(crate) fn to_operation_mode(self) -> OperationMode {
        match self {
            Self::NormalCANFD => OperationMode::NormalCANFD,
            Self::NormalCAN2_0 => OperationMode::NormalCAN2_0,
            Self::ListenOnly => OperationMode::ListenOnly,
            Self::InternalLoopback => OperationMode::InternalLoopback,
            Self::ExternalLoopback => OperationMode::ExternalLoopback,
            Self::Sleep => OperationMode::Sleep,
        }
    }
}
