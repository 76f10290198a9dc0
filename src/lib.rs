//! A LC-3 assembler and cycle-accurate simulator core.
//!
//! This crate is the backend of an educational LC-3 environment: a two-pass
//! assembler that turns source text into an object image, and a simulator
//! that executes that image with memory-mapped IO, interrupts, and
//! debugger-style stepping. The editor and console surfaces are external;
//! they talk to this crate through the diagnostic sink, the keyboard and
//! display hooks, and the simulator's inspection API.
//!
//! # Usage
//!
//! Source code is assembled into an [`asm::Assembly`], which holds the
//! object image and its address-to-source map:
//!
//! ```
//! use lc3_forge::asm::assemble;
//!
//! let assembly = assemble("
//!     .ORIG x3000
//!     AND R0, R0, #0
//!     ADD R0, R0, #5
//!     HALT
//!     .END
//! ").unwrap();
//! assert_eq!(assembly.image.origin(), 0x3000);
//! ```
//!
//! An assembly can then be loaded and executed by the simulator:
//!
//! ```
//! # use lc3_forge::asm::assemble;
//! # let assembly = assemble(".ORIG x3000\nAND R0, R0, #0\nADD R0, R0, #5\nHALT\n.END").unwrap();
//! use lc3_forge::ast::reg_consts::R0;
//! use lc3_forge::sim::Simulator;
//!
//! let mut sim = Simulator::new();
//! sim.load(&assembly);
//! sim.run();
//!
//! assert_eq!(sim.reg_file[R0], 5);
//! ```
//!
//! If more granularity is needed, the simulator also provides breakpoints
//! and step-in/step-over/step-out execution. See the [`sim`] module.
#![warn(missing_docs)]

pub mod asm;
pub mod ast;
pub mod err;
pub mod parse;
pub mod sim;
