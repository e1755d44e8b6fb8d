#![allow(unused_braces)]
use modular_bitfield_msb::prelude::*;

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Fourth byte of FIFO Control register
pub struct FifoControlReg3 {
    pub plsize: B3,
    fsize: B5,
}

impl FifoControlReg3 {
    /// set FIFO size (number of messages 1-32)
    pub fn with_fifo_size(mut self, value: u8) -> Self {
        let size = value.clamp(1, 32);
        self.set_fsize(size - 1);
        self
    }

    /// get FIFO size
    pub fn get_fifo_size(&self) -> u8 {
        self.fsize() + 1
    }
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Third byte of FIFO Control register
pub struct FifoControlReg2 {
    #[skip]
    __: B1,
    /// Retransmission attempts bits
    pub txat: B2,
    /// Message transmit priority bits
    pub txpri: B5,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Second byte of FIFO Control register
pub struct FifoControlReg1 {
    #[skip]
    __: B5,
    /// FIFO Reset bit
    pub freset: bool,
    /// Message Send Request bit
    pub txreq: bool,
    /// Increment FIFO Head/Tail bit
    pub uinc: bool,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// First byte of FIFO Control register
pub struct FifoControlReg0 {
    /// TX/RX FIFO Selection bit
    pub txen: bool,
    /// Auto RTR Enable bit
    pub rtren: bool,
    /// Received Message Time Stamp Enable bit
    pub rxtsen: bool,
    /// Transmit Attempts Exhausted Interrupt Enable bit
    pub txatie: bool,
    /// Overflow Interrupt Enable bit
    pub rxovie: bool,
    /// Transmit/Receive FIFO Empty/Full Interrupt Enable bit
    pub tferffie: bool,
    /// Transmit/Receive FIFO Half Empty/Half Full Interrupt Enable bit
    pub tfhrfhie: bool,
    /// Transmit/Receive FIFO Not Full/Not Empty Interrupt Enable bit
    pub tfnrfnie: bool,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Second byte of FIFO Status register
pub struct FifoStatusReg1 {
    #[skip]
    __: B3,
    /// FIFO Message Index bits
    pub fifoci: B5,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// First byte of FIFO Status register
pub struct FifoStatusReg0 {
    /// Message Aborted Status bit
    pub txabt: bool,
    /// Message Lost Arbitration Status bit
    pub txlarb: bool,
    /// Error Detected During Transmission bit
    pub txerr: bool,
    /// Transmit Attempts Exhausted Interrupt Pending bit
    pub txatif: bool,
    /// Receive FIFO Overflow Interrupt Flag bit
    pub rxovif: bool,
    /// Transmit/Receive FIFO Empty/Full Interrupt Flag bit
    pub tferffif: bool,
    /// Transmit/Receive FIFO Half Empty/Half Full Interrupt Flag bit
    pub tfhrfhif: bool,
    /// Transmit/Receive FIFO Not Full/Not Empty Interrupt Flag bit
    pub tfnrfnif: bool,
}

#[bitfield]
#[derive(Default)]
#[repr(u32)]
/// Nominal bit time configuration register (C1NBTCFG)
pub struct NominalBitTimeReg {
    /// Baud rate prescaler bits
    pub brp: B8,
    /// Time segment 1 bits (propagation + phase 1)
    pub tseg1: B8,
    #[skip]
    __: B1,
    /// Time segment 2 bits (phase 2)
    pub tseg2: B7,
    #[skip]
    __: B1,
    /// Synchronization jump width bits
    pub sjw: B7,
}

#[bitfield]
#[derive(Default)]
#[repr(u32)]
/// Data bit time configuration register (C1DBTCFG)
pub struct DataBitTimeReg {
    /// Baud rate prescaler bits
    pub brp: B8,
    #[skip]
    __: B3,
    /// Time segment 1 bits (propagation + phase 1)
    pub tseg1: B5,
    #[skip]
    __: B4,
    /// Time segment 2 bits (phase 2)
    pub tseg2: B4,
    #[skip]
    __: B4,
    /// Synchronization jump width bits
    pub sjw: B4,
}

#[bitfield]
#[derive(Default, Debug)]
#[repr(u32)]
/// Filter object register (C1FLTOBJ)
pub struct FilterObjectReg {
    #[skip]
    __: B1,
    /// Extended Identifier Enable bit, filter matches only extended frames if set
    pub exide: bool,
    /// Standard ID extension bit used in FD mode
    pub sid11: bool,
    /// Extended ID filter bits
    pub eid: B18,
    /// Standard ID filter bits
    pub sid: B11,
}

#[bitfield]
#[derive(Default, Debug)]
#[repr(u32)]
/// Filter mask register (C1MASK)
pub struct FilterMaskReg {
    #[skip]
    __: B1,
    /// Identifier Receive Mode bit, matches the frame IDE bit against `exide` if set
    pub mide: bool,
    /// Standard ID extension mask bit
    pub msid11: bool,
    /// Extended ID mask bits
    pub meid: B18,
    /// Standard ID mask bits
    pub msid: B11,
}
