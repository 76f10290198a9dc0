//! Memory-mapped devices.
//!
//! The device registers (KBSR, KBDR, DSR, DDR, MCR) are decoded by
//! [`DeviceHandler`], which the memory routes every load/store in the IO
//! region through. The keyboard is a one-byte latch fed by
//! [`Simulator::keyboard_interrupt`]; the display forwards bytes to a
//! pluggable [`DisplaySink`].
//!
//! Provided display sinks:
//! - [`NullDisplay`]: accepts and discards every byte.
//! - [`BufferedDisplay`]: appends bytes to a shared buffer.
//! - [`ChannelDisplay`]: sends bytes over a channel, for hosts that run the
//!   simulator on a worker thread.
//!
//! [`Simulator::keyboard_interrupt`]: super::Simulator::keyboard_interrupt

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockWriteGuard, TryLockError};

use crossbeam_channel::Sender;

pub(super) const KBSR: u16 = 0xFE00;
pub(super) const KBDR: u16 = 0xFE02;
pub(super) const DSR: u16  = 0xFE04;
pub(super) const DDR: u16  = 0xFE06;
pub(super) const MCR: u16  = 0xFFFE;

/// Keyboard interrupt vector.
pub(super) const KB_INTV: u8 = 0x80;
/// Keyboard interrupt priority.
pub(super) const KB_INTP: u8 = 0b100;

/// A pending vectored interrupt: the latch the CPU checks at every cycle
/// boundary.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Interrupt {
    vect: u8,
    priority: u8
}
impl Interrupt {
    /// Creates a new interrupt. The priority is truncated to 3 bits.
    pub fn new(vect: u8, priority: u8) -> Self {
        Interrupt { vect, priority: priority & 0b111 }
    }

    /// The 8-bit vector, indexing the interrupt vector table.
    pub fn vect(&self) -> u8 {
        self.vect
    }
    /// The priority, 0-7.
    pub fn priority(&self) -> u8 {
        self.priority
    }
}

/// A sink that accepts display output, one ASCII byte at a time.
pub trait DisplaySink: Send + Sync + 'static {
    /// Whether the display can take another byte (the DSR ready bit).
    fn ready(&self) -> bool;
    /// Sends a byte, returning whether it was accepted.
    fn send(&mut self, byte: u8) -> bool;
}

/// A display that accepts and discards every byte.
///
/// This is the display the simulator starts with, so that programs which
/// print are runnable before a real sink is attached.
#[derive(Default, Clone, Copy, PartialEq, Eq)]
pub struct NullDisplay;
impl DisplaySink for NullDisplay {
    fn ready(&self) -> bool {
        true
    }
    fn send(&mut self, _byte: u8) -> bool {
        true
    }
}

/// A display that appends its output to a shared buffer.
///
/// While a lock guard on the buffer is held, the display reports not-ready,
/// so a guard should never be leaked or the simulator's IO traps will hang.
#[derive(Default, Clone)]
pub struct BufferedDisplay {
    buffer: Arc<RwLock<Vec<u8>>>
}
impl BufferedDisplay {
    /// Creates a new display, wrapping it around a given buffer.
    pub fn new(buffer: Arc<RwLock<Vec<u8>>>) -> Self {
        Self { buffer }
    }

    /// Gets a reference to the internal buffer of this display.
    pub fn get_buffer(&self) -> &Arc<RwLock<Vec<u8>>> {
        &self.buffer
    }

    fn try_output(&self) -> Option<RwLockWriteGuard<'_, Vec<u8>>> {
        match self.buffer.try_write() {
            Ok(g) => Some(g),
            Err(TryLockError::Poisoned(e)) => Some(e.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}
impl DisplaySink for BufferedDisplay {
    fn ready(&self) -> bool {
        self.try_output().is_some()
    }

    fn send(&mut self, byte: u8) -> bool {
        match self.try_output() {
            Some(mut out) => {
                out.push(byte);
                true
            },
            None => false,
        }
    }
}

/// A display that sends its output over a channel.
///
/// This is meant for hosts that run the simulator on a worker thread and
/// render output elsewhere. A full channel reports not-ready rather than
/// blocking, so the simulator never stalls inside a cycle.
pub struct ChannelDisplay {
    tx: Sender<u8>
}
impl ChannelDisplay {
    /// Creates a new display that transmits on the given channel.
    pub fn new(tx: Sender<u8>) -> Self {
        Self { tx }
    }
}
impl DisplaySink for ChannelDisplay {
    fn ready(&self) -> bool {
        !self.tx.is_full()
    }

    fn send(&mut self, byte: u8) -> bool {
        self.tx.try_send(byte).is_ok()
    }
}

/// The hub for the memory-mapped device registers.
///
/// Reads and writes of the IO region (`xFE00..`) are decoded here;
/// everything else in that region reads as ordinary memory.
pub struct DeviceHandler {
    /// The KBDR latch.
    kbdr: u8,
    /// KBSR bit 15: a byte is latched and not yet consumed.
    kb_ready: bool,
    /// KBSR bit 14: keyboard interrupts enabled.
    kb_ie: bool,
    display: Box<dyn DisplaySink>,
    /// MCR bit 15 (clock-enable), shared with the host so a UI thread can
    /// halt a running simulator between cycles.
    mcr: Arc<AtomicBool>
}

impl DeviceHandler {
    pub(super) fn new(mcr: Arc<AtomicBool>) -> Self {
        Self {
            kbdr: 0,
            kb_ready: false,
            kb_ie: false,
            display: Box::new(NullDisplay),
            mcr
        }
    }

    /// Replaces the display sink.
    pub fn set_display(&mut self, display: impl DisplaySink) {
        self.display = Box::new(display);
    }

    /// Latches a keyboard byte and marks the keyboard ready.
    ///
    /// An unconsumed previous byte is overwritten.
    pub(super) fn latch_key(&mut self, byte: u8) {
        self.kbdr = byte;
        self.kb_ready = true;
    }

    pub(super) fn keyboard_interrupts_enabled(&self) -> bool {
        self.kb_ie
    }

    /// Reads a device register. `None` means the address has no device and
    /// the backing memory word is returned unchanged.
    pub(super) fn io_read(&mut self, addr: u16) -> Option<u16> {
        match addr {
            KBSR => Some(io_bool(self.kb_ready) | (u16::from(self.kb_ie) << 14)),
            KBDR => {
                // Reading the data register consumes the latch.
                self.kb_ready = false;
                Some(u16::from(self.kbdr))
            },
            DSR => Some(io_bool(self.display.ready())),
            MCR => Some(io_bool(self.mcr.load(Ordering::Relaxed))),
            _ => None
        }
    }

    /// Writes a device register, returning whether the write was accepted.
    pub(super) fn io_write(&mut self, addr: u16, data: u16) -> bool {
        match addr {
            KBSR => {
                self.kb_ie = (data >> 14) & 1 != 0;
                true
            },
            DDR => self.display.send(data as u8),
            MCR => {
                // Only the clock-enable bit is writable.
                self.mcr.store((data as i16) < 0, Ordering::Relaxed);
                true
            },
            _ => false
        }
    }

    /// Clears the keyboard latch and interrupt-enable state.
    pub(super) fn reset(&mut self) {
        self.kbdr = 0;
        self.kb_ready = false;
        self.kb_ie = false;
    }
}
impl std::fmt::Debug for DeviceHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceHandler")
            .field("kbdr", &self.kbdr)
            .field("kb_ready", &self.kb_ready)
            .field("kb_ie", &self.kb_ie)
            .field("mcr", &self.mcr)
            .finish_non_exhaustive()
    }
}

/// Converts a status bit to its register representation (bit 15).
fn io_bool(b: bool) -> u16 {
    match b {
        true  => 0x8000,
        false => 0x0000,
    }
}
