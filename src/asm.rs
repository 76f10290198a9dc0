//! Assembling source text into an object image.
//!
//! The assembler runs two passes over the parsed program:
//!
//! 1. **Emission**: a linear scan that records label addresses, encodes each
//!    instruction (with zero in any still-unresolved PC-offset field), emits
//!    data directives, and records a fixup for every label operand.
//! 2. **Fixup**: each recorded fixup is resolved against the label table and
//!    patched into the emitted words in place.
//!
//! The module notably consists of:
//! - [`assemble`] and [`assemble_report`]: the main entry points
//! - [`Assembly`]: the output — an [`ObjectImage`] plus its [`SourceMap`]
//! - [`Diagnostic`] and [`DiagnosticSink`]: the error-reporting surface
//!
//! Errors do not stop the scan: each broken line produces its own
//! [`Diagnostic`], and any diagnostic at all suppresses the output image.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use crate::ast::asm::{AsmInstr, Directive, Stmt, StmtKind};
use crate::ast::sim::SimInstr;
use crate::ast::{IOffset, ImmOrReg, Label, Offset, PCOffset};
use crate::ast::reg_consts::R7;
use crate::err::{ErrSpan, Error};
use crate::parse::parse_program;

/// Assembles source text into an object image and source map.
///
/// On success, this produces an [`Assembly`]. If *any* line fails, this
/// produces the full list of diagnostics (ordered by line) and no image.
///
/// # Example
/// ```
/// use lc3_forge::asm::assemble;
///
/// let asm = assemble("
///     .ORIG x3000
///     AND R0, R0, #0
///     ADD R0, R0, #5
///     HALT
///     .END
/// ").unwrap();
///
/// assert_eq!(asm.image.origin(), 0x3000);
/// assert_eq!(asm.image.program(), [0x5020, 0x1025, 0xF025]);
/// ```
pub fn assemble(src: &str) -> Result<Assembly, Vec<Diagnostic>> {
    let src_info = SourceInfo::new(src);
    let (stmts, parse_errs) = parse_program(src);

    let mut asm = Assembler::new(&src_info, stmts.is_empty() && parse_errs.is_empty());
    asm.pass_one(stmts);
    asm.pass_two();

    let Assembler { origin, words, line_map, errs, scan_end, .. } = asm;

    // Source text past a terminating .END is never scanned,
    // so any parse errors out there do not count.
    let parse_errs = parse_errs.into_iter()
        .filter(|e| scan_end.map_or(true, |end| e.span().map_or(0, |s| s.first().start) < end));

    let mut diags: Vec<_> = parse_errs
        .map(|e| Diagnostic::of(&e, &src_info))
        .chain(errs.iter().map(|e| Diagnostic::of(e, &src_info)))
        .collect();

    if !diags.is_empty() {
        diags.sort_by_key(|d| d.line);
        return Err(diags);
    }

    let map = line_map.into_iter()
        .map(|(off, line)| (origin.wrapping_add(off), line))
        .collect();

    Ok(Assembly {
        image: ObjectImage::new(origin, words),
        source_map: SourceMap { map, src_info },
    })
}

/// Assembles source text, reporting the outcome to a diagnostic sink.
///
/// Each diagnostic is rendered as `<file>:<line>: <message>`, followed by the
/// offending source line; a successful run reports `Assembly successful.`
pub fn assemble_report(src: &str, filename: &str, sink: &mut impl DiagnosticSink) -> Option<Assembly> {
    match assemble(src) {
        Ok(asm) => {
            sink.accept("Assembly successful.");
            Some(asm)
        },
        Err(diags) => {
            for d in &diags {
                sink.accept(&d.render(filename));
            }
            None
        }
    }
}

/// Kinds of errors that can occur from assembling given assembly code.
///
/// See [`AsmErr`] for this error type with span information included.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum AsmErrKind {
    /// The source has no statements at all.
    EmptySource,
    /// The first statement of the program is not `.ORIG`.
    FirstLineNotOrig,
    /// A second `.ORIG` appeared after the program start.
    SecondOrig,
    /// A label was defined more than once.
    DuplicateLabel,
    /// A referenced label was never defined.
    UndefinedLabel,
    /// A label's distance does not fit the instruction's PC-offset field.
    OffsetTooLarge(u32),
    /// The emitted words run past the end of memory.
    WrappingImage,
}
impl std::fmt::Display for AsmErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySource       => f.write_str("empty source"),
            Self::FirstLineNotOrig  => f.write_str("first line must be .ORIG"),
            Self::SecondOrig        => f.write_str("only one .ORIG is allowed"),
            Self::DuplicateLabel    => f.write_str("label was defined multiple times"),
            Self::UndefinedLabel    => f.write_str("undefined label"),
            Self::OffsetTooLarge(w) => write!(f, "label offset does not fit in {w}-bit field"),
            Self::WrappingImage     => f.write_str("program runs past the end of memory"),
        }
    }
}

/// Error from assembling given assembly code.
#[derive(Debug)]
pub struct AsmErr {
    /// The kind of error.
    pub kind: AsmErrKind,
    /// The span(s) in the source associated with this error.
    pub span: ErrSpan
}
impl AsmErr {
    /// Creates a new [`AsmErr`].
    pub fn new<E: Into<ErrSpan>>(kind: AsmErrKind, span: E) -> Self {
        AsmErr { kind, span: span.into() }
    }
}
impl std::fmt::Display for AsmErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}
impl std::error::Error for AsmErr {}
impl Error for AsmErr {
    fn span(&self) -> Option<ErrSpan> {
        Some(self.span.clone())
    }

    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match self.kind {
            AsmErrKind::EmptySource       => Some("the program needs at least an .ORIG and an .END".into()),
            AsmErrKind::FirstLineNotOrig  => Some("start the program with .ORIG followed by its load address".into()),
            AsmErrKind::SecondOrig        => Some("the load address can only be declared once".into()),
            AsmErrKind::DuplicateLabel    => Some("labels must be unique, try renaming one of them".into()),
            AsmErrKind::UndefinedLabel    => Some("try defining this label in front of an instruction or directive".into()),
            AsmErrKind::OffsetTooLarge(_) => Some("the target is too far from this instruction, try moving it closer".into()),
            AsmErrKind::WrappingImage     => Some("user programs typically start at x3000 and must end by xFFFF".into()),
        }
    }
}

/// A rendered, line-oriented error report.
///
/// Diagnostics carry everything the console surface needs to print a
/// readable message without going back to the source text.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Diagnostic {
    /// The 1-based source line number.
    pub line: usize,
    /// The text of the offending line, trimmed.
    pub source_line: String,
    /// The human-readable message.
    pub msg: String
}
impl Diagnostic {
    /// Builds a diagnostic from any crate error, locating its line in source.
    fn of(err: &dyn Error, src_info: &SourceInfo) -> Self {
        let index = err.span().map_or(0, |s| s.first().start);
        let line = src_info.get_line(index);

        Diagnostic {
            line: line + 1,
            source_line: src_info.read_line(line).unwrap_or("").to_string(),
            msg: err.to_string()
        }
    }

    /// Renders this diagnostic in the `<file>:<line>: <message>` form,
    /// with the offending source line indented beneath it.
    pub fn render(&self, filename: &str) -> String {
        format!("{}:{}: {}\n\t{}", filename, self.line, self.msg, self.source_line)
    }
}

/// The console surface's diagnostic sink: anything that accepts rendered
/// diagnostic lines.
pub trait DiagnosticSink {
    /// Accepts one rendered diagnostic string.
    fn accept(&mut self, diagnostic: &str);
}
impl DiagnosticSink for Vec<String> {
    fn accept(&mut self, diagnostic: &str) {
        self.push(diagnostic.to_string());
    }
}
impl DiagnosticSink for String {
    fn accept(&mut self, diagnostic: &str) {
        self.push_str(diagnostic);
        self.push('\n');
    }
}

/// A successfully assembled program.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// The object image.
    pub image: ObjectImage,
    /// The address-to-source mapping for the image.
    pub source_map: SourceMap
}

/// An object image: the origin word followed by the program words.
///
/// Word 0 is the load address; on load, words 1.. are copied to
/// `origin, origin + 1, ...` in memory.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ObjectImage {
    words: Vec<u16>
}
impl ObjectImage {
    fn new(origin: u16, mut body: Vec<u16>) -> Self {
        body.insert(0, origin);
        ObjectImage { words: body }
    }

    /// The load address of the image.
    pub fn origin(&self) -> u16 {
        self.words[0]
    }
    /// The program words (everything but the origin word).
    pub fn program(&self) -> &[u16] {
        &self.words[1..]
    }
    /// The whole image, origin word included.
    pub fn words(&self) -> &[u16] {
        &self.words
    }
}

/// A mapping from absolute memory addresses to source lines.
///
/// Only instructions populate this map; data directives are deliberately
/// omitted, so a data word has no source text.
#[derive(Debug, Clone)]
pub struct SourceMap {
    map: BTreeMap<u16, usize>,
    src_info: SourceInfo
}
impl SourceMap {
    /// The 0-based source line number of the instruction at `addr`, if any.
    pub fn line_at(&self, addr: u16) -> Option<usize> {
        self.map.get(&addr).copied()
    }
    /// The source text of the instruction at `addr`, if any.
    pub fn source_at(&self, addr: u16) -> Option<&str> {
        self.src_info.read_line(self.line_at(addr)?)
    }
    /// Accessors for the source the map was built from.
    pub fn source_info(&self) -> &SourceInfo {
        &self.src_info
    }
    /// Iterates over the `(address, line)` pairs of the map, in address order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, usize)> + '_ {
        self.map.iter().map(|(&a, &l)| (a, l))
    }
}

/// Helpers to index lines and query position information from a source string.
#[derive(PartialEq, Eq, Clone)]
pub struct SourceInfo {
    src: String,
    /// The index of each newline in the source.
    nl_indices: Vec<usize>
}
impl SourceInfo {
    /// Computes the source info for a given string.
    pub fn new(src: &str) -> Self {
        let nl_indices: Vec<_> = src
            .match_indices('\n')
            .map(|(i, _)| i)
            .chain([src.len()])
            .collect();

        Self { src: src.to_string(), nl_indices }
    }

    /// The entire source.
    pub fn source(&self) -> &str {
        &self.src
    }

    /// The number of lines in the source.
    pub fn count_lines(&self) -> usize {
        self.nl_indices.len()
    }

    /// The character range of the given 0-based line,
    /// including surrounding whitespace and the newline.
    fn raw_line_span(&self, line: usize) -> Option<Range<usize>> {
        if line >= self.count_lines() {
            return None;
        }

        let start = match line {
            0 => 0,
            _ => self.nl_indices[line - 1] + 1
        };
        let eof = self.src.len();
        let end = match self.nl_indices.get(line) {
            Some(i) => (i + 1).min(eof),
            None => eof,
        };

        Some(start..end)
    }

    /// The character range of the given 0-based line, excluding whitespace.
    pub fn line_span(&self, line: usize) -> Option<Range<usize>> {
        let Range { mut start, mut end } = self.raw_line_span(line)?;

        let text = &self.src[start..end];
        let trimmed_end = text.trim_end();
        end -= text.len() - trimmed_end.len();
        start += trimmed_end.len() - trimmed_end.trim_start().len();

        Some(start..end)
    }

    /// Reads the text of the given 0-based line.
    pub fn read_line(&self, line: usize) -> Option<&str> {
        self.line_span(line).map(|r| &self.src[r])
    }

    /// The 0-based line number containing the given character index.
    pub fn get_line(&self, index: usize) -> usize {
        self.nl_indices.partition_point(|&nl| nl < index)
    }
}
impl std::fmt::Debug for SourceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceInfo")
            .field("nl_indices", &self.nl_indices)
            .finish_non_exhaustive()
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
struct SymbolData {
    off: u16,
    src_start: usize
}
impl SymbolData {
    fn span(&self, label: &str) -> Range<usize> {
        self.src_start .. (self.src_start + label.len())
    }
}

/// A deferred write of a label-derived value into an already emitted word.
struct Fixup {
    /// Image offset of the (first) word to patch.
    loc: u16,
    /// The referenced label.
    label: Label,
    kind: FixupKind
}
enum FixupKind {
    /// OR the PC-relative offset to the label into the low `width` bits.
    PcRel {
        width: u32
    },
    /// Write the label's absolute address to `len` consecutive words.
    Absolute {
        len: u16
    }
}

/// State shared by the two assembler passes.
struct Assembler<'s> {
    src_info: &'s SourceInfo,
    origin: u16,
    /// The image body. The location counter is this vector's length.
    words: Vec<u16>,
    /// Label table: label name (uppercased) to image offset.
    labels: HashMap<String, SymbolData>,
    /// Fixups recorded by pass one, consumed by pass two.
    fixups: Vec<Fixup>,
    /// Image offset to 0-based source line, instructions only.
    line_map: BTreeMap<u16, usize>,
    /// Position in source where the scan stopped at `.END` (if it did).
    scan_end: Option<usize>,
    errs: Vec<AsmErr>
}

impl<'s> Assembler<'s> {
    fn new(src_info: &'s SourceInfo, empty: bool) -> Self {
        let mut errs = vec![];
        // A parse error means the source was not actually empty.
        if empty {
            errs.push(AsmErr::new(AsmErrKind::EmptySource, 0..0));
        }

        Assembler {
            src_info,
            origin: 0,
            words: vec![],
            labels: HashMap::new(),
            fixups: vec![],
            line_map: BTreeMap::new(),
            scan_end: None,
            errs
        }
    }

    /// Pass one: emission.
    fn pass_one(&mut self, stmts: Vec<Stmt>) {
        let mut stmts = stmts.into_iter();

        // The program must open with .ORIG. This one is unrecoverable,
        // since without an origin nothing that follows has an address.
        match stmts.next() {
            Some(Stmt { nucleus: StmtKind::Directive(Directive::Orig(addr)), .. }) => {
                self.origin = addr.get();
            },
            Some(stmt) => {
                self.errs.push(AsmErr::new(AsmErrKind::FirstLineNotOrig, stmt.span));
                return;
            },
            None => return,
        }

        for stmt in stmts {
            // Labels bind to the current location counter,
            // including labels sitting on an .END line.
            for label in &stmt.labels {
                self.add_label(label);
            }

            match stmt.nucleus {
                StmtKind::Directive(Directive::Orig(_)) => {
                    self.errs.push(AsmErr::new(AsmErrKind::SecondOrig, stmt.span));
                },
                StmtKind::Directive(Directive::End) => {
                    self.scan_end = Some(stmt.span.end);
                    break;
                },
                StmtKind::Directive(Directive::Fill(operand)) => {
                    let word = self.resolve_data_word(operand);
                    self.words.push(word);
                },
                StmtKind::Directive(Directive::Blkw(n, filler)) => {
                    let word = match filler {
                        Some(operand) => self.resolve_data_block(operand, n.get()),
                        None => 0,
                    };
                    self.words.extend(std::iter::repeat(word).take(usize::from(n.get())));
                },
                StmtKind::Directive(Directive::Stringz(s)) => {
                    self.words.extend(s.bytes().map(u16::from));
                    self.words.push(0);
                },
                StmtKind::Instr(instr) => {
                    let loc = self.loc();
                    self.line_map.insert(loc, self.src_info.get_line(stmt.span.start));
                    let word = self.lower_instr(instr, loc);
                    self.words.push(word);
                },
            }
        }

        if usize::from(self.origin) + self.words.len() > 1 << 16 {
            self.errs.push(AsmErr::new(AsmErrKind::WrappingImage, 0..0));
        }
    }

    /// Pass two: fixup.
    fn pass_two(&mut self) {
        for Fixup { loc, label, kind } in std::mem::take(&mut self.fixups) {
            let Some(&SymbolData { off: target, .. }) = self.labels.get(&label.name.to_uppercase()) else {
                self.errs.push(AsmErr::new(AsmErrKind::UndefinedLabel, label.span()));
                continue;
            };

            match kind {
                FixupKind::PcRel { width } => {
                    // The +1 accounts for the PC increment that precedes
                    // effective-address computation.
                    let off = i32::from(target) - (i32::from(loc) + 1);
                    if off < -(1 << (width - 1)) || off >= 1 << (width - 1) {
                        self.errs.push(AsmErr::new(AsmErrKind::OffsetTooLarge(width), label.span()));
                        continue;
                    }

                    let mask = (1u32 << width) - 1;
                    self.words[usize::from(loc)] |= (off as u32 & mask) as u16;
                },
                FixupKind::Absolute { len } => {
                    let addr = self.origin.wrapping_add(target);
                    for word in &mut self.words[usize::from(loc)..usize::from(loc) + usize::from(len)] {
                        *word = addr;
                    }
                },
            }
        }
    }

    /// The current location counter (as an image offset).
    fn loc(&self) -> u16 {
        self.words.len() as u16
    }

    fn add_label(&mut self, label: &Label) {
        let loc = self.loc();
        match self.labels.entry(label.name.to_uppercase()) {
            Entry::Occupied(e) => {
                let span1 = e.get().span(e.key());
                self.errs.push(AsmErr::new(AsmErrKind::DuplicateLabel, [span1, label.span()]));
            },
            Entry::Vacant(e) => {
                e.insert(SymbolData { off: loc, src_start: label.span().start });
            }
        }
    }

    /// Resolves a `.fill` operand: a literal is emitted directly, while a
    /// label emits zero now and records an absolute-address fixup.
    fn resolve_data_word(&mut self, operand: PCOffset<u16, 16>) -> u16 {
        self.resolve_data_block(operand, 1)
    }
    fn resolve_data_block(&mut self, operand: PCOffset<u16, 16>, len: u16) -> u16 {
        match operand {
            PCOffset::Offset(o) => o.get(),
            PCOffset::Label(label) => {
                self.fixups.push(Fixup {
                    loc: self.loc(),
                    label,
                    kind: FixupKind::Absolute { len }
                });
                0
            }
        }
    }

    /// Resolves a PC-offset operand during pass one: a known offset passes
    /// through, while a label encodes as zero and records a fixup.
    fn resolve_pc_offset<const N: u32>(&mut self, off: PCOffset<i16, N>, loc: u16) -> IOffset<N> {
        match off {
            PCOffset::Offset(o) => o,
            PCOffset::Label(label) => {
                self.fixups.push(Fixup {
                    loc,
                    label,
                    kind: FixupKind::PcRel { width: N }
                });
                Offset::new_trunc(0)
            }
        }
    }

    /// Encodes one instruction, erasing aliases and deferring labels.
    fn lower_instr(&mut self, instr: AsmInstr, loc: u16) -> u16 {
        let sim = match instr {
            AsmInstr::ADD(dr, sr1, sr2) => SimInstr::ADD(dr, sr1, sr2),
            AsmInstr::AND(dr, sr1, sr2) => SimInstr::AND(dr, sr1, sr2),
            AsmInstr::NOT(dr, sr)       => SimInstr::NOT(dr, sr),
            AsmInstr::BR(cc, off)       => SimInstr::BR(cc, self.resolve_pc_offset(off, loc)),
            AsmInstr::JMP(br)           => SimInstr::JMP(br),
            AsmInstr::JSR(off)          => SimInstr::JSR(ImmOrReg::Imm(self.resolve_pc_offset(off, loc))),
            AsmInstr::JSRR(br)          => SimInstr::JSR(ImmOrReg::Reg(br)),
            AsmInstr::LD(dr, off)       => SimInstr::LD(dr, self.resolve_pc_offset(off, loc)),
            AsmInstr::LDI(dr, off)      => SimInstr::LDI(dr, self.resolve_pc_offset(off, loc)),
            AsmInstr::LDR(dr, br, off)  => SimInstr::LDR(dr, br, off),
            AsmInstr::LEA(dr, off)      => SimInstr::LEA(dr, self.resolve_pc_offset(off, loc)),
            AsmInstr::ST(sr, off)       => SimInstr::ST(sr, self.resolve_pc_offset(off, loc)),
            AsmInstr::STI(sr, off)      => SimInstr::STI(sr, self.resolve_pc_offset(off, loc)),
            AsmInstr::STR(sr, br, off)  => SimInstr::STR(sr, br, off),
            AsmInstr::TRAP(vect)        => SimInstr::TRAP(vect),
            AsmInstr::RET               => SimInstr::JMP(R7),
            AsmInstr::RTI               => SimInstr::RTI,
            AsmInstr::GETC              => SimInstr::TRAP(Offset::new_trunc(0x20)),
            AsmInstr::OUT               => SimInstr::TRAP(Offset::new_trunc(0x21)),
            AsmInstr::PUTS              => SimInstr::TRAP(Offset::new_trunc(0x22)),
            AsmInstr::IN                => SimInstr::TRAP(Offset::new_trunc(0x23)),
            AsmInstr::PUTSP             => SimInstr::TRAP(Offset::new_trunc(0x24)),
            AsmInstr::HALT              => SimInstr::TRAP(Offset::new_trunc(0x25)),
        };

        sim.encode()
    }
}
