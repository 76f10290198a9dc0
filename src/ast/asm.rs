//! Source-level statements.
//!
//! A parsed program is a `Vec<`[`Stmt`]`>`; each statement holds its labels,
//! its instruction or directive, and its source span. These map one-to-one
//! to assembly source lines. For the bytecode-level representation, see
//! [`super::sim::SimInstr`].

use std::fmt::Write as _;
use std::ops::Range;

use super::{CondCode, IOffset, ImmOrReg, Offset, PCOffset, Reg, TrapVect8};

type PCOffset9 = PCOffset<i16, 9>;
type PCOffset11 = PCOffset<i16, 11>;

/// An instruction as it appears in source.
///
/// Unlike [`SimInstr`], this keeps aliases (`RET`, `NOP`, the trap aliases)
/// and unresolved label operands.
///
/// [`SimInstr`]: super::sim::SimInstr
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AsmInstr {
    #[allow(missing_docs)]
    ADD(Reg, Reg, ImmOrReg<5>),
    #[allow(missing_docs)]
    AND(Reg, Reg, ImmOrReg<5>),
    #[allow(missing_docs)]
    NOT(Reg, Reg),
    #[allow(missing_docs)]
    BR(CondCode, PCOffset9),
    #[allow(missing_docs)]
    JMP(Reg),
    #[allow(missing_docs)]
    JSR(PCOffset11),
    #[allow(missing_docs)]
    JSRR(Reg),
    #[allow(missing_docs)]
    LD(Reg, PCOffset9),
    #[allow(missing_docs)]
    LDI(Reg, PCOffset9),
    #[allow(missing_docs)]
    LDR(Reg, Reg, IOffset<6>),
    #[allow(missing_docs)]
    LEA(Reg, PCOffset9),
    #[allow(missing_docs)]
    ST(Reg, PCOffset9),
    #[allow(missing_docs)]
    STI(Reg, PCOffset9),
    #[allow(missing_docs)]
    STR(Reg, Reg, IOffset<6>),
    #[allow(missing_docs)]
    TRAP(TrapVect8),

    // Aliases:
    /// `RET` (`JMP R7`).
    RET,
    #[allow(missing_docs)]
    RTI,
    /// `GETC` (`TRAP x20`).
    GETC,
    /// `OUT` (`TRAP x21`).
    OUT,
    /// `PUTS` (`TRAP x22`).
    PUTS,
    /// `IN` (`TRAP x23`).
    IN,
    /// `PUTSP` (`TRAP x24`).
    PUTSP,
    /// `HALT` (`TRAP x25`).
    HALT
}
impl std::fmt::Display for AsmInstr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ADD(dr, sr1, sr2) => write!(f, "ADD {dr}, {sr1}, {sr2}"),
            Self::AND(dr, sr1, sr2) => write!(f, "AND {dr}, {sr1}, {sr2}"),
            Self::NOT(dr, sr)       => write!(f, "NOT {dr}, {sr}"),
            Self::BR(cc, off) => {
                f.write_str("BR")?;
                if cc & 0b100 != 0 { f.write_char('n')?; }
                if cc & 0b010 != 0 { f.write_char('z')?; }
                if cc & 0b001 != 0 { f.write_char('p')?; }
                write!(f, " {off}")
            },
            Self::JMP(br)          => write!(f, "JMP {br}"),
            Self::JSR(off)         => write!(f, "JSR {off}"),
            Self::JSRR(br)         => write!(f, "JSRR {br}"),
            Self::LD(dr, off)      => write!(f, "LD {dr}, {off}"),
            Self::LDI(dr, off)     => write!(f, "LDI {dr}, {off}"),
            Self::LDR(dr, br, off) => write!(f, "LDR {dr}, {br}, {off}"),
            Self::LEA(dr, off)     => write!(f, "LEA {dr}, {off}"),
            Self::ST(sr, off)      => write!(f, "ST {sr}, {off}"),
            Self::STI(sr, off)     => write!(f, "STI {sr}, {off}"),
            Self::STR(sr, br, off) => write!(f, "STR {sr}, {br}, {off}"),
            Self::TRAP(vect)       => write!(f, "TRAP {vect:X}"),
            Self::RET   => f.write_str("RET"),
            Self::RTI   => f.write_str("RTI"),
            Self::GETC  => f.write_str("GETC"),
            Self::OUT   => f.write_str("OUT"),
            Self::PUTS  => f.write_str("PUTS"),
            Self::IN    => f.write_str("IN"),
            Self::PUTSP => f.write_str("PUTSP"),
            Self::HALT  => f.write_str("HALT"),
        }
    }
}

/// An assembler directive.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Directive {
    /// `.orig ADDR`: declares the absolute load address of the program.
    Orig(Offset<u16, 16>),
    /// `.fill VALUE` or `.fill LABEL`: emits one word, either the literal
    /// value or the absolute address of the label.
    Fill(PCOffset<u16, 16>),
    /// `.blkw N` or `.blkw N FILL`: emits `N` words, zero-filled, or filled
    /// with the given value or the absolute address of the given label.
    Blkw(Offset<u16, 16>, Option<PCOffset<u16, 16>>),
    /// `.stringz "..."`: emits one word per character plus a NUL terminator.
    Stringz(String),
    /// `.end`: ends the program; the rest of the source is not scanned.
    End
}
impl std::fmt::Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Orig(addr)       => write!(f, ".orig {addr:X}"),
            Self::Fill(val)        => write!(f, ".fill {val}"),
            Self::Blkw(n, None)    => write!(f, ".blkw {n}"),
            Self::Blkw(n, Some(v)) => write!(f, ".blkw {n} {v}"),
            Self::Stringz(s)       => write!(f, ".stringz {s:?}"),
            Self::End              => f.write_str(".end"),
        }
    }
}

/// Either an instruction or a directive.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum StmtKind {
    #[allow(missing_docs)]
    Instr(AsmInstr),
    #[allow(missing_docs)]
    Directive(Directive)
}

/// A single statement: any labels on the line, the instruction or directive
/// itself, and the span of the line in source.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Stmt {
    /// The labels defined at this statement.
    pub labels: Vec<super::Label>,
    /// The instruction or directive.
    pub nucleus: StmtKind,
    /// The span of the statement in source.
    pub span: Range<usize>
}
