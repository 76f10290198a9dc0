//! Parsing assembly source code into an AST.
//!
//! This module converts assembly source into a `Vec<`[`Stmt`]`>` which the
//! assembler can scan. It consists of:
//! - [`lex`]: the tokenizer
//! - [`Parser`]: the main logic for the parser
//! - [`Parse`]/[`SimpleParse`]: the implementations to parse an AST component
//! - [`parse_program`]: the whole-program entry point, which recovers at line
//!   boundaries so that every malformed line is reported in one run
//!
//! [`SimpleParse`]: simple::SimpleParse

pub mod lex;

use std::borrow::Cow;

use logos::{Logos, Span};

use crate::ast::asm::{AsmInstr, Directive, Stmt, StmtKind};
use crate::ast::{IOffset, ImmOrReg, Label, Offset, PCOffset, Reg};
use lex::{Ident, LexErr, Token};
use simple::*;

/// Parses a program into a list of statements, recovering at line boundaries.
///
/// Rather than stopping at the first malformed line, this records its error,
/// resynchronizes at the next line terminator, and keeps parsing, so a single
/// run reports every line's error. A malformed line whose first significant
/// token is a recognized mnemonic still produces a placeholder statement
/// occupying one word, which keeps the addresses of all later labels intact.
pub fn parse_program(src: &str) -> (Vec<Stmt>, Vec<ParseErr>) {
    let mut parser = Parser::new(src);
    let mut stmts = vec![];
    let mut errs = vec![];

    loop {
        parser.skip_line_breaks();
        if parser.is_empty() { break; }

        let start = parser.index;
        match parser.parse::<Stmt>() {
            Ok(stmt) => stmts.push(stmt),
            Err(e) => {
                errs.push(e);

                // Resynchronize. If the broken line held an instruction,
                // hold its place with a one-word no-op statement so the
                // labels that follow keep their addresses.
                let (labels, span, instr_shaped) = parser.broken_line_info(start);
                parser.skip_to_line_break();

                if instr_shaped {
                    let nucleus = StmtKind::Instr(AsmInstr::BR(0b000, PCOffset::Offset(Offset::new_trunc(0))));
                    stmts.push(Stmt { labels, nucleus, span });
                }
            }
        }
    }

    (stmts, errs)
}

/// Any error that occurs during parsing tokens.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseErr {
    msg: Cow<'static, str>,
    span: Span
}
impl ParseErr {
    fn new<C: Into<Cow<'static, str>>>(msg: C, span: Span) -> Self {
        Self { msg: msg.into(), span }
    }
}
impl std::fmt::Display for ParseErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.msg)
    }
}
impl std::error::Error for ParseErr {}
impl crate::err::Error for ParseErr {
    fn span(&self) -> Option<crate::err::ErrSpan> {
        Some(self.span.clone().into())
    }

    fn help(&self) -> Option<Cow<str>> {
        None
    }
}

/// Components that can be constructed from a sequence of tokens.
pub trait Parse: Sized {
    /// Attempts to convert the next sequence of tokens
    /// in the parser's state into a component.
    ///
    /// If parsing fails, there are no guarantees about how much input the
    /// parser consumed.
    fn parse(parser: &mut Parser) -> Result<Self, ParseErr>;
}

/// The main parser struct, which holds the main logic for the parser.
pub struct Parser {
    tokens: Vec<(Result<Token, LexErr>, Span)>,
    index: usize
}
impl Parser {
    /// Creates a new parser from a given string.
    ///
    /// Tokenization errors do not fail the construction; they are kept in
    /// the stream and raised when the parser reaches them, so that the
    /// errors of every line can be accumulated.
    pub fn new(stream: &str) -> Self {
        let tokens = Token::lexer(stream).spanned()
            .filter(|t| !matches!(t, (Ok(Token::Comment), _)))
            .collect();

        Self { tokens, index: 0 }
    }

    fn peek_entry(&self) -> Option<&(Result<Token, LexErr>, Span)> {
        self.tokens[self.index..].first()
    }
    /// Advances the parser ahead by one token.
    pub fn advance(&mut self) {
        self.index = (self.index + 1).min(self.tokens.len());
    }
    /// The range of the next token to read (or an EOL range if there are no more tokens).
    pub fn cursor(&self) -> Span {
        match self.peek_entry().or_else(|| self.tokens.last()) {
            Some((_, span)) => span.clone(),
            None => 0..0
        }
    }
    /// The end of the most recently consumed token.
    fn prev_end(&self) -> usize {
        match self.index.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some((_, span)) => span.end,
            None => 0
        }
    }

    /// Parses the current token stream into a component, erroring if not possible.
    pub fn parse<P: Parse>(&mut self) -> Result<P, ParseErr> {
        P::parse(self)
    }

    /// Consumes the next token if it represents the corresponding component.
    ///
    /// This will not consume the next token if matching fails.
    pub fn match_<P: SimpleParse>(&mut self) -> Option<P> {
        // SimpleParse's contract assures failures do not consume input.
        self.parse().ok()
    }

    /// Applies the provided predicate to the next token in the input,
    /// consuming the token only if the predicate passes.
    ///
    /// A tokenization error at the cursor fails with that error's message.
    pub fn advance_if<T>(&mut self, pred: impl FnOnce(Option<&Token>, Span) -> Result<T, ParseErr>) -> Result<T, ParseErr> {
        let result = match self.peek_entry() {
            Some((Ok(tok), span)) => pred(Some(tok), span.clone()),
            Some((Err(err), span)) => Err(ParseErr::new(err.to_string(), span.clone())),
            None => pred(None, self.cursor()),
        };
        if result.is_ok() {
            self.advance();
        }
        result
    }

    /// Checks whether the input for the parser is empty.
    pub fn is_empty(&self) -> bool {
        self.tokens[self.index..].is_empty()
    }

    /// Checks whether the cursor sits at a line terminator or the end of input,
    /// without consuming anything.
    fn at_line_end(&self) -> bool {
        matches!(self.peek_entry(), None | Some((Ok(Token::NewLine), _)))
    }
    /// Consumes any line terminators at the cursor.
    fn skip_line_breaks(&mut self) {
        while matches!(self.peek_entry(), Some((Ok(Token::NewLine), _))) {
            self.advance();
        }
    }
    /// Consumes tokens up to and including the next line terminator.
    fn skip_to_line_break(&mut self) {
        loop {
            match self.peek_entry() {
                None => break,
                Some((Ok(Token::NewLine), _)) => {
                    self.advance();
                    break;
                },
                _ => self.advance(),
            }
        }
    }

    /// Replays a failed statement from `start`, collecting its leading labels
    /// and deciding whether its nucleus was an instruction.
    ///
    /// Returns the labels, the span of the statement, and whether the first
    /// significant token after the labels is a recognized mnemonic.
    fn broken_line_info(&mut self, start: usize) -> (Vec<Label>, Span, bool) {
        self.index = start;
        let span_start = self.cursor().start;
        let mut labels = vec![];

        loop {
            match self.peek_entry() {
                Some((Ok(Token::NewLine | Token::Colon), _)) => self.advance(),
                Some((Ok(Token::Ident(Ident::Label(name))), span)) => {
                    labels.push(Label::new(name.clone(), span.clone()));
                    self.advance();
                },
                _ => break
            }
        }

        let instr_shaped = matches!(
            self.peek_entry(),
            Some((Ok(Token::Ident(id)), _)) if id.is_mnemonic()
        );
        let span = span_start..self.cursor().end;

        (labels, span, instr_shaped)
    }
}

impl<const N: u32> Parse for ImmOrReg<N> {
    fn parse(parser: &mut Parser) -> Result<Self, ParseErr> {
        if let Some(reg) = parser.match_::<Reg>() {
            return Ok(ImmOrReg::Reg(reg));
        }
        match parser.match_() {
            Some(imm) => Ok(ImmOrReg::Imm(imm)),
            None => Err(ParseErr::new("expected register or immediate value", parser.cursor()))
        }
    }
}

impl<OFF, const N: u32> Parse for PCOffset<OFF, N>
    where Offset<OFF, N>: SimpleParse
{
    fn parse(parser: &mut Parser) -> Result<Self, ParseErr> {
        if let Some(LabelArg(label)) = parser.match_() {
            return Ok(PCOffset::Label(label));
        }
        match parser.match_() {
            Some(off) => Ok(PCOffset::Offset(off)),
            None => Err(ParseErr::new("expected offset or label", parser.cursor()))
        }
    }
}

/// Simple to parse components.
///
/// This module holds components that require only a single token and no
/// additional parser state. The key trait is [`SimpleParse`]; failures of a
/// simple parse are guaranteed not to consume input, which
/// [`Parser::match_`] takes advantage of.
pub mod simple {
    use logos::Span;

    use crate::ast::{Offset, Reg};

    use super::lex::{Ident, LexErr, Token};
    use super::{Parse, ParseErr, Parser};

    /// Components that can be constructed from a single token
    /// without additional parser state.
    pub trait SimpleParse: Sized {
        /// Tries to parse the provided token as this component.
        fn try_parse(m_token: Option<&Token>, span: Span) -> Result<Self, ParseErr>;
    }
    impl<S: SimpleParse> Parse for S {
        fn parse(parser: &mut Parser) -> Result<Self, ParseErr> {
            parser.advance_if(S::try_parse)
        }
    }

    /// Comma.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct Comma;
    impl SimpleParse for Comma {
        fn try_parse(m_token: Option<&Token>, span: Span) -> Result<Self, ParseErr> {
            match m_token {
                Some(Token::Comma) => Ok(Comma),
                _ => Err(ParseErr::new("expected comma", span))
            }
        }
    }

    /// Colon.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct Colon;
    impl SimpleParse for Colon {
        fn try_parse(m_token: Option<&Token>, span: Span) -> Result<Self, ParseErr> {
            match m_token {
                Some(Token::Colon) => Ok(Colon),
                _ => Err(ParseErr::new("expected colon", span))
            }
        }
    }

    /// A label operand.
    #[derive(Clone, PartialEq, Eq, Debug, Default)]
    pub struct LabelArg(pub crate::ast::Label);
    impl SimpleParse for LabelArg {
        fn try_parse(m_token: Option<&Token>, span: Span) -> Result<Self, ParseErr> {
            match m_token {
                Some(Token::Ident(Ident::Label(s))) => Ok(LabelArg(crate::ast::Label::new(s.to_string(), span))),
                _ => Err(ParseErr::new("expected label", span))
            }
        }
    }

    /// A string literal.
    #[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
    pub struct StrLiteral(pub String);
    impl SimpleParse for StrLiteral {
        fn try_parse(m_token: Option<&Token>, span: Span) -> Result<Self, ParseErr> {
            match m_token {
                Some(Token::String(s)) => Ok(StrLiteral(s.to_string())),
                _ => Err(ParseErr::new("expected string literal", span))
            }
        }
    }

    /// The end of a line or of the input.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct End;
    impl SimpleParse for End {
        fn try_parse(m_token: Option<&Token>, span: Span) -> Result<Self, ParseErr> {
            match m_token {
                None | Some(Token::NewLine) => Ok(End),
                _ => Err(ParseErr::new("expected end of line", span))
            }
        }
    }

    impl SimpleParse for Reg {
        fn try_parse(m_token: Option<&Token>, span: Span) -> Result<Self, ParseErr> {
            match m_token {
                Some(&Token::Reg(reg)) => Ok(Reg(reg)),
                _ => Err(ParseErr::new("expected register", span))
            }
        }
    }

    impl<const N: u32> SimpleParse for Offset<i16, N> {
        fn try_parse(m_token: Option<&Token>, span: Span) -> Result<Self, ParseErr> {
            let off_val = match m_token {
                Some(&Token::Unsigned(n)) => {
                    i16::try_from(n)
                        .map_err(|_| ParseErr::new(LexErr::DoesNotFitI16.to_string(), span.clone()))
                },
                Some(&Token::Signed(n)) => Ok(n),
                _ => Err(ParseErr::new("expected immediate value", span.clone()))
            }?;

            Self::new(off_val)
                .map_err(|e| ParseErr::new(e.to_string(), span))
        }
    }

    impl<const N: u32> SimpleParse for Offset<u16, N> {
        fn try_parse(m_token: Option<&Token>, span: Span) -> Result<Self, ParseErr> {
            let off_val = match m_token {
                Some(&Token::Unsigned(n)) => Ok(n),
                Some(&Token::Signed(n)) => {
                    u16::try_from(n)
                        .map_err(|_| ParseErr::new(LexErr::DoesNotFitU16.to_string(), span.clone()))
                },
                _ => Err(ParseErr::new("expected immediate value", span.clone()))
            }?;

            Self::new(off_val)
                .map_err(|e| ParseErr::new(e.to_string(), span))
        }
    }
}

/// Parses two comma-separated operands.
fn operand_pair<A: Parse, B: Parse>(parser: &mut Parser) -> Result<(A, B), ParseErr> {
    let a = parser.parse()?;
    parser.parse::<Comma>()?;
    let b = parser.parse()?;
    Ok((a, b))
}
/// Parses three comma-separated operands.
fn operand_triple<A: Parse, B: Parse, C: Parse>(parser: &mut Parser) -> Result<(A, B, C), ParseErr> {
    let (a, b) = operand_pair(parser)?;
    parser.parse::<Comma>()?;
    let c = parser.parse()?;
    Ok((a, b, c))
}

impl Parse for AsmInstr {
    fn parse(parser: &mut Parser) -> Result<Self, ParseErr> {
        let opcode = parser.advance_if(|mt, span| match mt {
            Some(Token::Ident(id)) if id.is_mnemonic() => Ok(id.clone()),
            _ => Err(ParseErr::new("expected instruction", span))
        })?;

        match opcode {
            Ident::ADD => {
                let (dr, sr1, sr2) = operand_triple(parser)?;
                Ok(Self::ADD(dr, sr1, sr2))
            },
            Ident::AND => {
                let (dr, sr1, sr2) = operand_triple(parser)?;
                Ok(Self::AND(dr, sr1, sr2))
            },
            Ident::NOT => {
                let (dr, sr) = operand_pair(parser)?;
                Ok(Self::NOT(dr, sr))
            },
            Ident::BR    => Ok(Self::BR(0b111, parser.parse()?)),
            Ident::BRP   => Ok(Self::BR(0b001, parser.parse()?)),
            Ident::BRZ   => Ok(Self::BR(0b010, parser.parse()?)),
            Ident::BRZP  => Ok(Self::BR(0b011, parser.parse()?)),
            Ident::BRN   => Ok(Self::BR(0b100, parser.parse()?)),
            Ident::BRNP  => Ok(Self::BR(0b101, parser.parse()?)),
            Ident::BRNZ  => Ok(Self::BR(0b110, parser.parse()?)),
            Ident::BRNZP => Ok(Self::BR(0b111, parser.parse()?)),
            Ident::JMP  => Ok(Self::JMP(parser.parse()?)),
            Ident::JSR  => Ok(Self::JSR(parser.parse()?)),
            Ident::JSRR => Ok(Self::JSRR(parser.parse()?)),
            Ident::LD => {
                let (dr, off) = operand_pair(parser)?;
                Ok(Self::LD(dr, off))
            },
            Ident::LDI => {
                let (dr, off) = operand_pair(parser)?;
                Ok(Self::LDI(dr, off))
            },
            Ident::LDR => {
                let (dr, br, off) = operand_triple(parser)?;
                Ok(Self::LDR(dr, br, off))
            },
            Ident::LEA => {
                let (dr, off) = operand_pair(parser)?;
                Ok(Self::LEA(dr, off))
            },
            Ident::ST => {
                let (sr, off) = operand_pair(parser)?;
                Ok(Self::ST(sr, off))
            },
            Ident::STI => {
                let (sr, off) = operand_pair(parser)?;
                Ok(Self::STI(sr, off))
            },
            Ident::STR => {
                let (sr, br, off) = operand_triple(parser)?;
                Ok(Self::STR(sr, br, off))
            },
            Ident::TRAP  => Ok(Self::TRAP(parser.parse()?)),
            Ident::RET   => Ok(Self::RET),
            Ident::RTI   => Ok(Self::RTI),
            Ident::GETC  => Ok(Self::GETC),
            Ident::OUT   => Ok(Self::OUT),
            Ident::PUTS  => Ok(Self::PUTS),
            Ident::IN    => Ok(Self::IN),
            Ident::PUTSP => Ok(Self::PUTSP),
            Ident::HALT  => Ok(Self::HALT),
            Ident::Label(_) => Err(ParseErr::new("expected instruction", parser.cursor())) // unreachable by the guard above
        }
    }
}

impl Parse for Directive {
    fn parse(parser: &mut Parser) -> Result<Self, ParseErr> {
        let directive = parser.advance_if(|mt, span| match mt {
            Some(Token::Directive(id)) => Ok(id.to_string()),
            _ => Err(ParseErr::new("expected directive", span))
        })?;

        match &*directive.to_uppercase() {
            "ORIG" => Ok(Self::Orig(parser.parse()?)),
            "FILL" => {
                // .fill accepts both unsigned and signed literals, so it
                // cannot reuse PCOffset's parser.
                let operand = parse_word_or_label(parser)?;
                Ok(Self::Fill(operand))
            },
            "BLKW" => {
                let block_size: Offset<_, 16> = parser.parse()?;
                if block_size.get() == 0 {
                    return Err(ParseErr::new("block size must be greater than 0", parser.cursor()));
                }

                // Optional second operand: a fill value or label.
                parser.match_::<Comma>();
                let filler = match parser.at_line_end() {
                    true  => None,
                    false => Some(parse_word_or_label(parser)?),
                };

                Ok(Self::Blkw(block_size, filler))
            },
            "STRINGZ" => {
                let StrLiteral(s) = parser.parse()?;
                Ok(Self::Stringz(s))
            },
            "END" => Ok(Self::End),
            _ => Err(ParseErr::new("unrecognized directive", parser.cursor()))
        }
    }
}

/// Parses a 16-bit literal (of either signedness) or a label.
fn parse_word_or_label(parser: &mut Parser) -> Result<PCOffset<u16, 16>, ParseErr> {
    if let Some(LabelArg(label)) = parser.match_() {
        return Ok(PCOffset::Label(label));
    }
    if let Some(off) = parser.match_::<Offset<u16, 16>>() {
        return Ok(PCOffset::Offset(off));
    }
    match parser.match_::<IOffset<16>>() {
        // Negative literals are reinterpreted as their bit pattern.
        Some(off) => Ok(PCOffset::Offset(Offset::new_trunc(off.get() as u16))),
        None => Err(ParseErr::new("expected numeric or label", parser.cursor()))
    }
}

impl Parse for StmtKind {
    fn parse(parser: &mut Parser) -> Result<Self, ParseErr> {
        match parser.peek_entry() {
            Some((Ok(Token::Directive(_)), _)) => Ok(StmtKind::Directive(parser.parse()?)),
            Some((Ok(Token::Ident(id)), _)) if id.is_mnemonic() => Ok(StmtKind::Instr(parser.parse()?)),
            Some((Err(err), span)) => Err(ParseErr::new(err.to_string(), span.clone())),
            _ => Err(ParseErr::new("expected instruction or directive", parser.cursor()))
        }
    }
}
impl Parse for Stmt {
    fn parse(parser: &mut Parser) -> Result<Self, ParseErr> {
        let mut labels = vec![];

        // Scan through labels and line breaks until the nucleus is found.
        while !parser.is_empty() {
            if let Some(LabelArg(label)) = parser.match_() {
                parser.match_::<Colon>(); // skip colon if it exists
                labels.push(label);
            } else if parser.match_::<End>().is_none() {
                break;
            }
        }

        let start = parser.cursor().start;
        let nucleus = parser.parse()?;
        let span = start..parser.prev_end();
        parser.parse::<End>()?;

        Ok(Self { labels, nucleus, span })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::asm::{AsmInstr, Directive, StmtKind};
    use crate::ast::reg_consts::{R0, R6};
    use crate::ast::{ImmOrReg, Offset, PCOffset};

    use super::parse_program;

    fn parse_one(line: &str) -> StmtKind {
        let (stmts, errs) = parse_program(line);
        assert!(errs.is_empty(), "unexpected parse errors: {errs:?}");
        assert_eq!(stmts.len(), 1, "expected a single statement");
        stmts.into_iter().next().unwrap().nucleus
    }

    #[test]
    fn test_instr_operands() {
        assert_eq!(
            parse_one("ADD R0, R0, #5"),
            StmtKind::Instr(AsmInstr::ADD(R0, R0, ImmOrReg::Imm(Offset::new(5).unwrap())))
        );
        assert_eq!(
            parse_one("and r6, r6, r0"),
            StmtKind::Instr(AsmInstr::AND(R6, R6, ImmOrReg::Reg(R0)))
        );
        assert_eq!(parse_one("HALT"), StmtKind::Instr(AsmInstr::HALT));
    }

    #[test]
    fn test_labeled_lines() {
        let (stmts, errs) = parse_program("LOOP: ADD R0, R0, #-1\nBRp LOOP");
        assert!(errs.is_empty());
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].labels.len(), 1);
        assert_eq!(stmts[0].labels[0].name, "LOOP");
        assert_eq!(
            stmts[1].nucleus,
            StmtKind::Instr(AsmInstr::BR(0b001, PCOffset::Label(stmts[0].labels[0].clone())))
        );
    }

    #[test]
    fn test_directives() {
        assert_eq!(parse_one(".orig x3000"), StmtKind::Directive(Directive::Orig(Offset::new_trunc(0x3000))));
        assert_eq!(parse_one(".fill xDEAD"), StmtKind::Directive(Directive::Fill(PCOffset::Offset(Offset::new_trunc(0xDEAD)))));
        assert_eq!(parse_one(".fill #-2"),   StmtKind::Directive(Directive::Fill(PCOffset::Offset(Offset::new_trunc(0xFFFE)))));
        assert_eq!(parse_one(".blkw 3"),     StmtKind::Directive(Directive::Blkw(Offset::new_trunc(3), None)));
        assert_eq!(parse_one(".stringz \"Hi\""), StmtKind::Directive(Directive::Stringz("Hi".to_string())));
        assert_eq!(parse_one(".end"), StmtKind::Directive(Directive::End));
    }

    #[test]
    fn test_blkw_filler() {
        let StmtKind::Directive(Directive::Blkw(n, Some(PCOffset::Label(l)))) = parse_one(".blkw 4 TABLE") else {
            panic!("expected .blkw with label filler");
        };
        assert_eq!(n.get(), 4);
        assert_eq!(l.name, "TABLE");
    }

    #[test]
    fn test_bad_operand_counts() {
        // One error per broken line, and parsing continues past each.
        let (stmts, errs) = parse_program("ADD R0, R0\nNOT R1\nHALT R2\nRET");
        assert_eq!(errs.len(), 3);
        // All four lines were instruction-shaped, so all four hold a slot.
        assert_eq!(stmts.len(), 4);
        assert_eq!(stmts[3].nucleus, StmtKind::Instr(AsmInstr::RET));
    }

    #[test]
    fn test_imm_too_wide() {
        let (_, errs) = parse_program("ADD R0, R0, #16");
        assert_eq!(errs.len(), 1);

        let (_, errs) = parse_program("ADD R0, R0, #-17");
        assert_eq!(errs.len(), 1);

        let (_, errs) = parse_program("LDR R0, R6, #40");
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn test_unknown_mnemonic() {
        // `FOO R0` parses as a label followed by junk; it is not
        // instruction-shaped, so it produces an error and no statement.
        let (stmts, errs) = parse_program("FOO R0, R0, R0");
        assert_eq!(errs.len(), 1);
        assert!(stmts.is_empty());
    }

    #[test]
    fn test_broken_line_placeholder() {
        // The broken ADD still occupies a slot, with its label attached.
        let (stmts, errs) = parse_program("A ADD R0, #5\nB HALT");
        assert_eq!(errs.len(), 1);
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].labels[0].name, "A");
        assert_eq!(stmts[1].labels[0].name, "B");
        assert_eq!(stmts[1].nucleus, StmtKind::Instr(AsmInstr::HALT));
    }
}
