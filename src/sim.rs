//! Simulating and executing object images.
//!
//! This module is focused on executing fully assembled code (i.e., [`Assembly`]).
//! It consists of:
//! - [`Simulator`]: the struct that executes assembled code.
//! - [`mem`]: the memory and register file.
//! - [`device`]: the memory-mapped devices.
//! - [`debug`]: breakpoints.
//!
//! # Machine model
//!
//! One instruction cycle performs, in order: an exception check (reserved
//! opcode, or `RTI` in user mode), fetch, decode/execute, and an
//! interrupt-latch check. Exceptions and interrupts vector through the
//! interrupt vector table at `x0100`; there is no host-level error surface,
//! so every simulator operation is infallible.
//!
//! The machine boots with a small operating system occupying `x0000-x02FF`:
//! the trap vector table, the interrupt vector table, and the handlers for
//! the canonical traps (`GETC`, `OUT`, `PUTS`, `IN`, `PUTSP`, `HALT`).

pub mod debug;
pub mod device;
pub mod mem;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::asm::{assemble, Assembly, ObjectImage, SourceMap};
use crate::ast::reg_consts::{R6, R7};
use crate::ast::sim::SimInstr;
use crate::ast::ImmOrReg;

use self::debug::BreakpointSet;
use self::device::{DeviceHandler, DisplaySink, Interrupt};
use self::mem::{Mem, RegFile};

/// Start of user space; also the default supervisor stack base.
const USER_START: u16 = 0x3000;
/// Base of the interrupt vector table.
const INT_TABLE: u16 = 0x0100;
/// Exception vector for a privilege violation (`RTI` in user mode).
const IV_PRIVILEGE: u8 = 0x00;
/// Exception vector for the reserved opcode.
const IV_ILLEGAL: u8 = 0x01;

/// What happened during one instruction cycle.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CycleEvent {
    /// An ordinary instruction was executed.
    Stepped,
    /// An exception fired and execution vectored through the IVT.
    TookException(u8),
    /// The interrupt latch was serviced at the cycle boundary.
    TookInterrupt(u8)
}

/// Executes assembled code.
#[derive(Debug)]
pub struct Simulator {
    // ------------------ MACHINE STATE ------------------

    /// The simulator's memory (held in the heap, as it is too large for the stack).
    pub mem: Mem,

    /// The register file.
    pub reg_file: RegFile,

    /// The program counter.
    pub pc: u16,

    /// The processor status register. See [`PSR`] for the bit layout.
    psr: PSR,

    /// The inactive stack pointer.
    ///
    /// The active stack pointer always lives in R6; this slot shadows the
    /// one for the other privilege mode and is swapped on every transition.
    saved_sp: u16,

    /// Subroutine/trap/interrupt nesting depth, used by [`Simulator::step_over`]
    /// and [`Simulator::step_out`].
    depth: u64,

    /// The pending-interrupt latch, checked at every cycle boundary.
    int_latch: Option<Interrupt>,

    /// The number of instruction cycles run since this simulator was created.
    ///
    /// This can be set to 0 to reset the counter.
    pub instructions_run: u64,

    /// Whether the last run stopped at a breakpoint.
    hit_breakpoint: bool,

    // ------------------ LOADED PROGRAM ------------------

    /// The loaded image, retained for [`Simulator::reload`].
    img: Option<ObjectImage>,
    /// The loaded image's source map, if it came from an [`Assembly`].
    src_map: Option<SourceMap>,

    // ------------------ CONFIG/DEBUG STATE ------------------

    /// Machine control: the clock-enable bit. If cleared, execution stops.
    ///
    /// Shared with [`Simulator::mcr`] so another thread can stop a running
    /// simulator between cycles.
    mcr: Arc<AtomicBool>,

    /// Breakpoints: execution stops whenever the PC lands on one.
    pub breakpoints: BreakpointSet
}

/// The built-in OS, assembled once on first use.
fn os_assembly() -> &'static Assembly {
    static OS: OnceLock<Assembly> = OnceLock::new();

    OS.get_or_init(|| {
        assemble(include_str!("os.asm"))
            .unwrap_or_else(|e| unreachable!("OS should assemble: {e:?}"))
    })
}

impl Simulator {
    /// Creates a new simulator with the OS loaded but no object image.
    pub fn new() -> Self {
        let mcr = Arc::new(AtomicBool::new(false));

        let mut sim = Self {
            mem: Mem::new(DeviceHandler::new(Arc::clone(&mcr))),
            reg_file: RegFile::new(),
            pc: USER_START,
            psr: PSR::new(),
            saved_sp: USER_START,
            depth: 0,
            int_latch: None,
            instructions_run: 0,
            hit_breakpoint: false,
            img: None,
            src_map: None,
            mcr,
            breakpoints: BreakpointSet::new()
        };

        sim.reload_os();
        sim
    }

    /// Copies the built-in OS region into memory.
    fn reload_os(&mut self) {
        let os = os_assembly();
        self.mem.copy_block(os.image.origin(), os.image.program());
    }

    /// Attaches a display sink, which receives every byte written to the DDR.
    pub fn open_display(&mut self, display: impl DisplaySink) {
        self.mem.io.set_display(display);
    }

    /// Loads an assembled program, keeping its source map,
    /// and performs a [`Simulator::reload`].
    pub fn load(&mut self, assembly: &Assembly) {
        self.img = Some(assembly.image.clone());
        self.src_map = Some(assembly.source_map.clone());
        self.reload();
    }

    /// Loads a bare object image (no source map)
    /// and performs a [`Simulator::reload`].
    pub fn load_image(&mut self, image: &ObjectImage) {
        self.img = Some(image.clone());
        self.src_map = None;
        self.reload();
    }

    /// Reload: copies the retained object image into memory, resets the PC
    /// to its origin, and restores the machine defaults (user mode, priority
    /// 0, flags cleared, supervisor SP shadow at x3000, registers zeroed).
    pub fn reload(&mut self) {
        if let Some(img) = &self.img {
            self.mem.copy_block(img.origin(), img.program());
            self.pc = img.origin();
        }
        self.reg_file.clear();
        self.psr = PSR::new();
        self.saved_sp = USER_START;
        self.depth = 0;
        self.int_latch = None;
        self.mem.io.reset();
    }

    /// Restart: resets the PC to the image origin,
    /// leaving memory and the PSR untouched.
    pub fn restart(&mut self) {
        if let Some(img) = &self.img {
            self.pc = img.origin();
        }
    }

    /// Zeroes all of memory, then reloads the built-in OS region.
    pub fn reset_memory(&mut self) {
        self.mem.zero();
        self.reload_os();
    }

    /// Fills all of memory with uniformly random words,
    /// then reloads the built-in OS region.
    pub fn randomize_memory(&mut self) {
        self.randomize_memory_with(&mut StdRng::from_entropy());
    }

    /// Like [`Simulator::randomize_memory`], but deterministic from a seed.
    pub fn randomize_memory_seeded(&mut self, seed: u64) {
        self.randomize_memory_with(&mut StdRng::seed_from_u64(seed));
    }

    fn randomize_memory_with(&mut self, rng: &mut impl Rng) {
        self.mem.randomize(rng);
        self.reload_os();
    }

    /// Gets a reference to the PSR.
    pub fn psr(&self) -> &PSR {
        &self.psr
    }

    /// Overwrites the PSR wholesale.
    ///
    /// This is an inspection-API escape hatch; setting supervisor state from
    /// inside a handler can leave the shadow stack pointers inconsistent.
    pub fn set_psr(&mut self, value: u16) {
        self.psr = PSR(value);
    }

    /// Gets a reference to the MCR (the clock-enable bit).
    ///
    /// Clearing it stops a running simulator before its next cycle.
    pub fn mcr(&self) -> &Arc<AtomicBool> {
        &self.mcr
    }

    /// Whether the last run stopped at a breakpoint.
    pub fn hit_breakpoint(&self) -> bool {
        self.hit_breakpoint
    }

    /// The source map of the loaded program, if one was loaded via
    /// [`Simulator::load`].
    pub fn source_map(&self) -> Option<&SourceMap> {
        self.src_map.as_ref()
    }

    /// Renders a memory range for display: each row holds the hex address,
    /// hex value, decimal value, and the source line of the word (empty for
    /// data words and unmapped addresses).
    pub fn render_range(&self, start: u16, len: u16) -> Vec<[String; 4]> {
        (0..len)
            .map(|i| {
                let addr = start.wrapping_add(i);
                let val = self.mem.get_raw(addr);
                let src = self.src_map.as_ref()
                    .and_then(|m| m.source_at(addr))
                    .unwrap_or("");

                [
                    format!("x{addr:04X}"),
                    format!("x{val:04X}"),
                    val.to_string(),
                    src.to_string()
                ]
            })
            .collect()
    }

    /// Delivers a keyboard byte.
    ///
    /// The byte is latched into the KBDR and the KBSR ready bit is set. If
    /// keyboard interrupts are enabled (KBSR bit 14) and the current priority
    /// is below the keyboard's (4), the interrupt latch is raised and will be
    /// serviced at the next cycle boundary through IVT entry `x80`.
    ///
    /// This must be called between cycles, never during one.
    pub fn keyboard_interrupt(&mut self, byte: u8) {
        self.mem.io.latch_key(byte);

        if self.mem.io.keyboard_interrupts_enabled() && self.psr.priority() < device::KB_INTP {
            self.int_latch = Some(Interrupt::new(device::KB_INTV, device::KB_INTP));
        }
    }

    /// Sets the condition codes from the given result.
    fn set_cc(&mut self, result: u16) {
        match (result as i16).cmp(&0) {
            std::cmp::Ordering::Less    => self.psr.set_cc(0b100),
            std::cmp::Ordering::Equal   => self.psr.set_cc(0b010),
            std::cmp::Ordering::Greater => self.psr.set_cc(0b001),
        }
    }

    /// Switches to supervisor mode, swapping in the supervisor stack pointer
    /// if coming from user mode.
    fn enter_supervisor(&mut self) {
        if !self.psr.privileged() {
            std::mem::swap(&mut self.saved_sp, &mut self.reg_file[R6]);
            self.psr.set_privileged(true);
        }
    }

    /// Saves the current PSR and PC onto the supervisor stack
    /// (switching to supervisor mode first).
    fn push_context(&mut self) {
        let old_psr = self.psr.get();
        let old_pc = self.pc;

        self.enter_supervisor();

        let sp = self.reg_file[R6];
        self.mem.write(sp.wrapping_sub(1), old_psr);
        self.mem.write(sp.wrapping_sub(2), old_pc);
        self.reg_file[R6] = sp.wrapping_sub(2);
    }

    /// Enters an exception handler through the interrupt vector table.
    ///
    /// The PC saved on the supervisor stack is the address of the faulting
    /// word, since the exception check precedes fetch.
    fn enter_exception(&mut self, vect: u8) -> CycleEvent {
        self.push_context();
        self.pc = self.mem.read(INT_TABLE + u16::from(vect));
        self.depth += 1;
        CycleEvent::TookException(vect)
    }

    /// Services a pending interrupt at a cycle boundary.
    fn enter_interrupt(&mut self, intr: Interrupt) -> CycleEvent {
        self.push_context();
        self.psr.set_priority(intr.priority());
        self.psr.set_cc(0b000); // flags clear until the handler sets them
        self.pc = self.mem.read(INT_TABLE + u16::from(intr.vect()));
        self.depth += 1;
        CycleEvent::TookInterrupt(intr.vect())
    }

    /// Runs one instruction cycle: exception check, fetch, decode/execute,
    /// interrupt check.
    fn step(&mut self) -> CycleEvent {
        self.instructions_run = self.instructions_run.wrapping_add(1);

        // 1. Exception check, on the word at PC before it is fetched.
        let word = self.mem.read(self.pc);
        let instr = match SimInstr::decode(word) {
            None => return self.enter_exception(IV_ILLEGAL),
            Some(SimInstr::RTI) if !self.psr.privileged() => {
                return self.enter_exception(IV_PRIVILEGE);
            },
            Some(instr) => instr,
        };

        // 2. Fetch.
        self.pc = self.pc.wrapping_add(1);

        // 3. Decode and execute.
        match instr {
            SimInstr::BR(cc, off) => {
                if cc & self.psr.cc() != 0 {
                    self.pc = self.pc.wrapping_add_signed(off.get());
                }
            },
            SimInstr::ADD(dr, sr1, sr2) => {
                let val1 = self.reg_file[sr1];
                let val2 = match sr2 {
                    ImmOrReg::Imm(i2) => i2.get() as u16,
                    ImmOrReg::Reg(r2) => self.reg_file[r2],
                };

                let result = val1.wrapping_add(val2);
                self.reg_file[dr] = result;
                self.set_cc(result);
            },
            SimInstr::AND(dr, sr1, sr2) => {
                let val1 = self.reg_file[sr1];
                let val2 = match sr2 {
                    ImmOrReg::Imm(i2) => i2.get() as u16,
                    ImmOrReg::Reg(r2) => self.reg_file[r2],
                };

                let result = val1 & val2;
                self.reg_file[dr] = result;
                self.set_cc(result);
            },
            SimInstr::NOT(dr, sr) => {
                let result = !self.reg_file[sr];
                self.reg_file[dr] = result;
                self.set_cc(result);
            },
            SimInstr::LD(dr, off) => {
                let ea = self.pc.wrapping_add_signed(off.get());
                let val = self.mem.read(ea);
                self.reg_file[dr] = val;
                self.set_cc(val);
            },
            SimInstr::LDI(dr, off) => {
                let ind = self.pc.wrapping_add_signed(off.get());
                let ea = self.mem.read(ind);
                let val = self.mem.read(ea);
                self.reg_file[dr] = val;
                self.set_cc(val);
            },
            SimInstr::LDR(dr, br, off) => {
                let ea = self.reg_file[br].wrapping_add_signed(off.get());
                let val = self.mem.read(ea);
                self.reg_file[dr] = val;
                self.set_cc(val);
            },
            SimInstr::LEA(dr, off) => {
                self.reg_file[dr] = self.pc.wrapping_add_signed(off.get());
            },
            SimInstr::ST(sr, off) => {
                let ea = self.pc.wrapping_add_signed(off.get());
                self.mem.write(ea, self.reg_file[sr]);
            },
            SimInstr::STI(sr, off) => {
                let ind = self.pc.wrapping_add_signed(off.get());
                let ea = self.mem.read(ind);
                self.mem.write(ea, self.reg_file[sr]);
            },
            SimInstr::STR(sr, br, off) => {
                let ea = self.reg_file[br].wrapping_add_signed(off.get());
                self.mem.write(ea, self.reg_file[sr]);
            },
            SimInstr::JMP(br) => {
                // RET is JMP R7; returning closes the current frame.
                if br.reg_no() == 7 {
                    self.depth = self.depth.saturating_sub(1);
                }
                self.pc = self.reg_file[br];
            },
            SimInstr::JSR(op) => {
                // The target is computed before R7 is written,
                // so JSRR R7 jumps to the address in R7.
                let addr = match op {
                    ImmOrReg::Imm(off) => self.pc.wrapping_add_signed(off.get()),
                    ImmOrReg::Reg(br)  => self.reg_file[br],
                };

                self.reg_file[R7] = self.pc;
                self.pc = addr;
                self.depth += 1;
            },
            SimInstr::TRAP(vect) => {
                // R7 link, then supervisor entry, then the vector jump.
                self.reg_file[R7] = self.pc;
                self.enter_supervisor();
                self.pc = self.mem.read(vect.get());
                self.depth += 1;
            },
            SimInstr::RTI => {
                // The user-mode case was handled as a privilege violation.
                let sp = self.reg_file[R6];
                let pc = self.mem.read(sp);
                let psr = self.mem.read(sp.wrapping_add(1));
                self.reg_file[R6] = sp.wrapping_add(2);

                self.pc = pc;
                self.psr = PSR(psr);

                if !self.psr.privileged() {
                    std::mem::swap(&mut self.saved_sp, &mut self.reg_file[R6]);
                }

                self.depth = self.depth.saturating_sub(1);
            },
        }

        // 4. Interrupt check, at the cycle boundary.
        let eligible = self.int_latch
            .map_or(false, |i| i.priority() > self.psr.priority());
        if eligible {
            if let Some(intr) = self.int_latch.take() {
                return self.enter_interrupt(intr);
            }
        }

        CycleEvent::Stepped
    }

    /// Runs until the tripwire returns false, the clock is disabled,
    /// or the PC lands on a breakpoint.
    pub fn run_while(&mut self, mut tripwire: impl FnMut(&mut Simulator) -> bool) {
        self.hit_breakpoint = false;
        self.mcr.store(true, Ordering::Relaxed);

        while self.mcr.load(Ordering::Relaxed) && tripwire(self) {
            self.step();

            if self.breakpoints.contains(self.pc) {
                self.hit_breakpoint = true;
                break;
            }
        }

        self.mcr.store(false, Ordering::Release);
    }

    /// Runs until the clock is disabled (e.g., by `HALT`)
    /// or a breakpoint is hit.
    pub fn run(&mut self) {
        self.run_while(|_| true)
    }

    /// Runs with a limit on how many cycles to execute.
    pub fn run_with_limit(&mut self, max_cycles: u64) {
        let start = self.instructions_run;
        self.run_while(|sim| sim.instructions_run.wrapping_sub(start) < max_cycles)
    }

    /// Executes exactly one cycle.
    pub fn step_in(&mut self) -> CycleEvent {
        self.hit_breakpoint = false;
        self.mcr.store(true, Ordering::Relaxed);
        let event = self.step();
        self.mcr.store(false, Ordering::Release);
        event
    }

    /// Executes one cycle, running through entire subroutine, trap, and
    /// interrupt frames as a single step.
    pub fn step_over(&mut self) {
        let depth = self.depth;
        let mut first = Some(());

        // At least one cycle runs; after that, keep going until
        // execution lands back at the starting depth.
        self.run_while(|sim| first.take().is_some() || depth < sim.depth)
    }

    /// Runs until the current subroutine, trap, or interrupt frame returns.
    pub fn step_out(&mut self) {
        let depth = self.depth;
        let mut first = Some(());

        if depth != 0 {
            self.run_while(|sim| first.take().is_some() || depth <= sim.depth)
        }
    }
}
impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

/// A wrapper over `u16` to facilitate the PSR.
///
/// The word is encoded as follows:
/// - `PSR[15]`: privilege mode (1 = user, 0 = supervisor)
/// - `PSR[8..11]`: priority level (0-7)
/// - `PSR[0..3]`: condition codes (bit 2 = N, bit 1 = Z, bit 0 = P)
///
/// Note that the mode lives in bit 15, which differs from layouts that put
/// it at bit 0 of the high byte.
#[allow(clippy::upper_case_acronyms)]
#[derive(PartialEq, Eq, Clone, Copy)]
#[repr(transparent)]
pub struct PSR(pub u16);

impl PSR {
    /// The power-on PSR: user mode, priority 0, flags cleared.
    pub fn new() -> Self {
        PSR(0x8000)
    }

    /// The full 16-bit encoding.
    pub fn get(&self) -> u16 {
        self.0
    }
    /// Whether the machine is in supervisor mode
    /// (`true` = supervisor, `false` = user).
    pub fn privileged(&self) -> bool {
        (self.0 >> 15) == 0
    }
    /// The current priority level (0-7).
    pub fn priority(&self) -> u8 {
        ((self.0 >> 8) & 0b111) as u8
    }
    /// The condition codes, as an `n z p` bit triple.
    pub fn cc(&self) -> u8 {
        (self.0 & 0b111) as u8
    }

    /// Sets the privilege mode (`true` = supervisor).
    pub fn set_privileged(&mut self, privileged: bool) {
        self.0 &= 0x7FFF;
        self.0 |= u16::from(!privileged) << 15;
    }
    /// Sets the priority level (truncated to 3 bits).
    pub fn set_priority(&mut self, priority: u8) {
        self.0 &= 0xF8FF;
        self.0 |= u16::from(priority & 0b111) << 8;
    }
    /// Sets the condition codes (truncated to 3 bits).
    pub fn set_cc(&mut self, cc: u8) {
        self.0 &= 0xFFF8;
        self.0 |= u16::from(cc & 0b111);
    }
}
impl Default for PSR {
    fn default() -> Self {
        Self::new()
    }
}
impl std::fmt::Debug for PSR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;
        struct CC(u8);

        impl std::fmt::Debug for CC {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                if self.0 & 0b100 != 0 { f.write_char('N')?; }
                if self.0 & 0b010 != 0 { f.write_char('Z')?; }
                if self.0 & 0b001 != 0 { f.write_char('P')?; }
                Ok(())
            }
        }

        f.debug_struct("PSR")
            .field("privileged", &self.privileged())
            .field("priority", &self.priority())
            .field("cc", &CC(self.cc()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::{Arc, RwLock};

    use crate::asm::assemble;
    use crate::ast::reg_consts::{R0, R6};

    use super::device::BufferedDisplay;
    use super::{CycleEvent, Simulator, PSR};

    fn load_src(src: &str) -> Simulator {
        let asm = assemble(src).unwrap_or_else(|e| panic!("test program should assemble: {e:?}"));
        let mut sim = Simulator::new();
        sim.load(&asm);
        sim
    }

    #[test]
    fn test_run_minimal_program() {
        let mut sim = load_src("
            .ORIG x3000
            AND R0, R0, #0
            ADD R0, R0, #5
            HALT
            .END
        ");
        sim.run();

        assert_eq!(sim.reg_file[R0], 5);
        assert!(!sim.mcr().load(Ordering::Relaxed), "clock should be disabled after HALT");
        // The PC parked inside the OS HALT routine.
        assert!(sim.pc < 0x3000, "PC should be in the OS region, was x{:04X}", sim.pc);
    }

    #[test]
    fn test_privilege_violation() {
        let mut sim = load_src("
            .ORIG x3000
            RTI
            .END
        ");

        let event = sim.step_in();
        assert_eq!(event, CycleEvent::TookException(0x00));

        // Supervisor mode, on the supervisor stack, with old PC/PSR pushed.
        assert!(sim.psr().privileged());
        assert_eq!(sim.reg_file[R6], 0x2FFE);
        assert_eq!(sim.mem.get_raw(0x2FFF), 0x8000, "pushed PSR should be the old user PSR");
        assert_eq!(sim.mem.get_raw(0x2FFE), 0x3000, "pushed PC should be the faulting address");
        assert_eq!(sim.pc, sim.mem.get_raw(0x0100));
    }

    #[test]
    fn test_illegal_opcode() {
        let mut sim = load_src("
            .ORIG x3000
            .FILL xD000
            .END
        ");

        let event = sim.step_in();
        assert_eq!(event, CycleEvent::TookException(0x01));
        assert!(sim.psr().privileged());
        assert_eq!(sim.pc, sim.mem.get_raw(0x0101));
    }

    #[test]
    fn test_keyboard_interrupt() {
        let mut sim = load_src("
            .ORIG x3000
            AND R0, R0, #0
            AND R0, R0, #0
            HALT
            .END
        ");

        // Enable keyboard interrupts (KBSR bit 14), then deliver a byte.
        sim.mem.write(0xFE00, 0x4000);
        sim.keyboard_interrupt(0x41);
        assert_eq!(sim.mem.read(0xFE00) & 0x8000, 0x8000, "byte should be latched");

        // The interrupt is serviced at the next cycle boundary.
        let event = sim.step_in();
        assert_eq!(event, CycleEvent::TookInterrupt(0x80));
        assert_eq!(sim.pc, sim.mem.get_raw(0x0180));
        assert!(sim.psr().privileged());
        assert_eq!(sim.psr().priority(), 4);
        assert_eq!(sim.psr().cc(), 0);
        assert_eq!(sim.reg_file[R6], 0x2FFE);
        assert_eq!(sim.mem.get_raw(0x2FFF), 0x8002, "pushed PSR should hold the Z flag from the AND");
        assert_eq!(sim.mem.get_raw(0x2FFE), 0x3001);

        // Reading the KBDR consumes the latch.
        assert_eq!(sim.mem.read(0xFE02), 0x41);
        assert_eq!(sim.mem.read(0xFE00) & 0x8000, 0);
    }

    #[test]
    fn test_keyboard_interrupt_requires_enable() {
        let mut sim = load_src("
            .ORIG x3000
            AND R0, R0, #0
            HALT
            .END
        ");

        // IE clear: the byte latches, but no interrupt fires.
        sim.keyboard_interrupt(0x42);
        assert_eq!(sim.step_in(), CycleEvent::Stepped);
        assert_eq!(sim.mem.read(0xFE02), 0x42);
    }

    #[test]
    fn test_keyboard_interrupt_respects_priority() {
        let mut sim = load_src("
            .ORIG x3000
            AND R0, R0, #0
            HALT
            .END
        ");

        sim.mem.write(0xFE00, 0x4000);
        sim.set_psr(0x8400); // priority 4 masks the keyboard's priority 4
        sim.keyboard_interrupt(0x43);
        assert_eq!(sim.step_in(), CycleEvent::Stepped);
    }

    #[test]
    fn test_getc_trap() {
        let mut sim = load_src("
            .ORIG x3000
            GETC
            HALT
            .END
        ");

        sim.keyboard_interrupt(b'Z');
        sim.run();
        assert_eq!(sim.reg_file[R0], u16::from(b'Z'));
    }

    #[test]
    fn test_out_trap() {
        let mut sim = load_src("
            .ORIG x3000
            LD R0, CH
            OUT
            HALT
            CH .FILL x41
            .END
        ");

        let buf = Arc::new(RwLock::new(Vec::new()));
        sim.open_display(BufferedDisplay::new(Arc::clone(&buf)));
        sim.run();

        assert_eq!(*buf.read().unwrap(), b"A");
    }

    #[test]
    fn test_puts_trap() {
        let mut sim = load_src("
            .ORIG x3000
            LEA R0, MSG
            PUTS
            HALT
            MSG .STRINGZ \"OK\"
            .END
        ");

        let buf = Arc::new(RwLock::new(Vec::new()));
        sim.open_display(BufferedDisplay::new(Arc::clone(&buf)));
        sim.run();

        assert_eq!(*buf.read().unwrap(), b"OK");
    }

    #[test]
    fn test_putsp_trap() {
        // "Hi!" packed two characters per word, low byte first.
        let mut sim = load_src("
            .ORIG x3000
            LEA R0, MSG
            PUTSP
            HALT
            MSG .FILL x6948
            .FILL x0021
            .FILL x0000
            .END
        ");

        let buf = Arc::new(RwLock::new(Vec::new()));
        sim.open_display(BufferedDisplay::new(Arc::clone(&buf)));
        sim.run();

        assert_eq!(*buf.read().unwrap(), b"Hi!");
    }

    #[test]
    fn test_mcr_write_stops_run() {
        // Clearing the clock-enable bit stops the run loop
        // before any further cycle executes.
        let mut sim = load_src("
            .ORIG x3000
            AND R0, R0, #0
            STI R0, MCRP
            ADD R0, R0, #1
            MCRP .FILL xFFFE
            .END
        ");
        sim.run();

        assert_eq!(sim.reg_file[R0], 0, "the ADD after the MCR write must not execute");
        assert_eq!(sim.pc, 0x3002);
    }

    #[test]
    fn test_run_with_limit() {
        let mut sim = load_src("
            .ORIG x3000
            AND R0, R0, #0
            LOOP BRnzp LOOP
            .END
        ");

        sim.run_with_limit(100);
        assert_eq!(sim.instructions_run, 100);
    }

    #[test]
    fn test_breakpoint_stops_run() {
        let mut sim = load_src("
            .ORIG x3000
            ADD R0, R0, #1
            ADD R0, R0, #1
            HALT
            .END
        ");

        sim.breakpoints.add(0x3001);
        sim.run();

        assert!(sim.hit_breakpoint());
        assert_eq!(sim.pc, 0x3001);
        assert_eq!(sim.reg_file[R0], 1);
    }

    #[test]
    fn test_step_over_subroutine() {
        let mut sim = load_src("
            .ORIG x3000
            JSR BUMP
            HALT
            BUMP ADD R0, R0, #1
            RET
            .END
        ");

        sim.step_over();
        assert_eq!(sim.pc, 0x3001, "step over should land after the JSR");
        assert_eq!(sim.reg_file[R0], 1);
    }

    #[test]
    fn test_step_over_plain_instruction() {
        let mut sim = load_src("
            .ORIG x3000
            ADD R0, R0, #3
            HALT
            .END
        ");

        sim.step_over();
        assert_eq!(sim.pc, 0x3001);
        assert_eq!(sim.reg_file[R0], 3);
    }

    #[test]
    fn test_step_out_of_subroutine() {
        let mut sim = load_src("
            .ORIG x3000
            JSR BUMP
            HALT
            BUMP ADD R0, R0, #1
            RET
            .END
        ");

        sim.step_in(); // into BUMP
        assert_eq!(sim.pc, 0x3002);
        sim.step_out();
        assert_eq!(sim.pc, 0x3001, "step out should land after the JSR");
    }

    #[test]
    fn test_cc_exclusivity() {
        let mut sim = load_src("
            .ORIG x3000
            ADD R0, R0, #-5
            ADD R0, R0, #5
            ADD R0, R0, #7
            HALT
            .END
        ");

        sim.step_in();
        assert_eq!(sim.psr().cc(), 0b100); // negative
        sim.step_in();
        assert_eq!(sim.psr().cc(), 0b010); // zero
        sim.step_in();
        assert_eq!(sim.psr().cc(), 0b001); // positive
    }

    #[test]
    fn test_psr_roundtrip() {
        for bits in [0x8000u16, 0x0000, 0x8402, 0x0701, 0x8104] {
            assert_eq!(PSR(bits).get(), bits);
        }

        for privileged in [false, true] {
            for priority in 0..8 {
                for cc in [0b100, 0b010, 0b001] {
                    let mut psr = PSR::new();
                    psr.set_privileged(privileged);
                    psr.set_priority(priority);
                    psr.set_cc(cc);

                    assert_eq!(psr.privileged(), privileged);
                    assert_eq!(psr.priority(), priority);
                    assert_eq!(psr.cc(), cc);
                }
            }
        }
    }

    #[test]
    fn test_reload_determinism() {
        let asm = assemble("
            .ORIG x3000
            AND R0, R0, #0
            ADD R0, R0, #5
            HALT
            .END
        ").unwrap();

        let mut sim = Simulator::new();
        sim.load(&asm);

        let snapshot = |sim: &Simulator| {
            let region: Vec<_> = (0x3000..0x3003).map(|a| sim.mem.get_raw(a)).collect();
            (sim.pc, sim.psr().get(), sim.reg_file.clone(), region)
        };
        let initial = snapshot(&sim);

        sim.run();
        assert_ne!(snapshot(&sim), initial);

        sim.reload();
        assert_eq!(snapshot(&sim), initial);
    }

    #[test]
    fn test_restart_keeps_memory() {
        let mut sim = load_src("
            .ORIG x3000
            ST R0, SLOT
            HALT
            SLOT .FILL x1111
            .END
        ");

        sim.reg_file[R0] = 0x2222;
        sim.run();
        assert_eq!(sim.mem.get_raw(0x3002), 0x2222);

        sim.restart();
        assert_eq!(sim.pc, 0x3000);
        assert_eq!(sim.mem.get_raw(0x3002), 0x2222, "restart must not touch memory");
    }

    #[test]
    fn test_reset_memory() {
        let mut sim = load_src("
            .ORIG x3000
            HALT
            .END
        ");

        sim.reset_memory();
        assert_eq!(sim.mem.get_raw(0x3000), 0, "user program should be gone");
        assert_ne!(sim.mem.get_raw(0x0025), 0, "the HALT trap vector should be restored");
    }

    #[test]
    fn test_randomize_memory_seeded() {
        let mut a = Simulator::new();
        let mut b = Simulator::new();
        a.randomize_memory_seeded(99);
        b.randomize_memory_seeded(99);

        for addr in [0x3000u16, 0x4242, 0x9999, 0xFDFF] {
            assert_eq!(a.mem.get_raw(addr), b.mem.get_raw(addr));
        }
        // The OS region is reloaded over the noise.
        assert_eq!(a.mem.get_raw(0x0025), b.mem.get_raw(0x0025));
        assert_ne!(a.mem.get_raw(0x0025), 0);
    }

    #[test]
    fn test_render_range() {
        let sim = load_src("\
.ORIG x3000
AND R0, R0, #0
.FILL xBEEF
.END
");
        let rows = sim.render_range(0x3000, 2);

        assert_eq!(rows[0], ["x3000", "x5020", "20512", "AND R0, R0, #0"].map(String::from));
        assert_eq!(rows[1][0], "x3001");
        assert_eq!(rows[1][1], "xBEEF");
        assert_eq!(rows[1][2], "48879");
        assert_eq!(rows[1][3], "", "data words have no source text");
    }
}
