//! Tokenizing LC-3 assembly.
//!
//! The key type here is the [`Token`] enum, which holds every token of
//! LC-3 assembly. The parser consumes a stream of these to build an AST.

use std::num::IntErrorKind;

use logos::{Lexer, Logos};

/// A unit of information in LC-3 source code.
///
/// Note that the numeric regexes deliberately span over text that is not a
/// valid literal (e.g., `23abc` matches the unsigned rule); the callback
/// then validates the whole unit, so that malformed literals produce a
/// literal error rather than splitting into surprising token pairs.
#[derive(Debug, Logos, PartialEq, Eq)]
#[logos(skip r"[ \t]+", error = LexErr)]
pub enum Token {
    /// An unsigned numeric literal (e.g., `9`, `#14`, `x7F`, `b1011`).
    #[regex(r"\d\w*", dec_unsigned)]
    #[regex(r"#\d?\w*", dec_unsigned)]
    #[regex(r"[Xx][\dA-Fa-f]\w*", hex_unsigned)]
    #[regex(r"[Bb][01]\w*", bin_unsigned)]
    Unsigned(u16),

    /// A signed numeric literal (e.g., `-9`, `#-14`, `x-7F`).
    #[regex(r"-\w*", dec_signed)]
    #[regex(r"#-\w*", dec_signed)]
    #[regex(r"[Xx]-\w*", hex_signed)]
    Signed(i16),

    /// A register (`R0`-`R7`).
    #[regex(r"[Rr]\d+", reg_no)]
    Reg(u8),

    /// An identifier: either a recognized mnemonic or a label.
    /// Case-insensitive.
    #[regex(r"[A-Za-z_]\w*", |lx| lx.slice().parse::<Ident>().expect("should be infallible"))]
    Ident(Ident),

    /// A directive (e.g., `.orig`, `.end`). The dot is not kept.
    #[regex(r"\.[A-Za-z_]\w*", |lx| lx.slice()[1..].to_string())]
    Directive(String),

    /// A string literal (e.g., `"Hello!"`).
    #[token(r#"""#, str_literal)]
    String(String),

    /// A colon, which may optionally follow a label.
    #[token(":")]
    Colon,

    /// A comma, which separates operands.
    #[token(",")]
    Comma,

    /// A comment: from `;` to the end of the line.
    #[regex(r";.*")]
    Comment,

    /// A line terminator.
    #[regex(r"\r?\n")]
    NewLine
}

macro_rules! ident_enum {
    ($($instr:ident),+) => {
        /// An identifier: either a recognized mnemonic or a label.
        /// Case-insensitive.
        #[derive(Debug, PartialEq, Eq, Clone)]
        pub enum Ident {
            $(
                #[allow(missing_docs)]
                $instr
            ),+,
            #[allow(missing_docs)]
            Label(String)
        }

        impl Ident {
            /// Whether this identifier is a recognized mnemonic.
            pub fn is_mnemonic(&self) -> bool {
                !matches!(self, Self::Label(_))
            }
        }

        impl std::str::FromStr for Ident {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match &*s.to_uppercase() {
                    $(stringify!($instr) => Ok(Self::$instr)),*,
                    _ => Ok(Self::Label(s.to_string()))
                }
            }
        }

        impl std::fmt::Display for Ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$instr => f.write_str(stringify!($instr))),*,
                    Self::Label(id) => f.write_str(id)
                }
            }
        }
    };
}
ident_enum! {
    ADD, AND, NOT, BR, BRP, BRZ, BRZP, BRN, BRNP, BRNZ, BRNZP,
    JMP, JSR, JSRR, LD, LDI, LDR, LEA, ST, STI, STR, TRAP,
    RET, RTI, GETC, OUT, PUTS, IN, PUTSP, HALT
}

/// Any error raised while tokenizing the input stream.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum LexErr {
    /// Numeric literal (unsigned dec, hex, or bin) does not fit in a u16.
    DoesNotFitU16,
    /// Numeric literal (signed dec or hex) does not fit in an i16.
    DoesNotFitI16,
    /// Hex literal (`x...`) has non-hex digits.
    InvalidHex,
    /// Binary literal (`b...`) has non-binary digits.
    InvalidBin,
    /// Decimal literal has non-decimal digits.
    InvalidNumeric,
    /// Hex literal (`x...`) has no digits.
    InvalidHexEmpty,
    /// Decimal literal (`#` or `#-`) has no digits.
    InvalidDecEmpty,
    /// Integer parsing failed for an unknown reason.
    UnknownIntErr,
    /// String literal is missing its closing quote.
    UnclosedStrLit,
    /// String literal does not fit in the image.
    StrLitTooBig,
    /// Token has the form `R<digits>`, but the digits are not 0-7.
    InvalidReg,
    /// A symbol which does not occur in any LC-3 token.
    #[default]
    InvalidSymbol
}
impl std::fmt::Display for LexErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErr::DoesNotFitU16   => f.write_str("numeric token does not fit 16-bit unsigned integer"),
            LexErr::DoesNotFitI16   => f.write_str("numeric token does not fit 16-bit signed integer"),
            LexErr::InvalidHex      => f.write_str("invalid hex literal"),
            LexErr::InvalidBin      => f.write_str("invalid binary literal"),
            LexErr::InvalidNumeric  => f.write_str("invalid decimal literal"),
            LexErr::InvalidHexEmpty => f.write_str("invalid hex literal"),
            LexErr::InvalidDecEmpty => f.write_str("invalid decimal literal"),
            LexErr::UnknownIntErr   => f.write_str("could not parse integer"),
            LexErr::UnclosedStrLit  => f.write_str("unclosed string literal"),
            LexErr::StrLitTooBig    => f.write_str("string literal is too large"),
            LexErr::InvalidReg      => f.write_str("invalid register"),
            LexErr::InvalidSymbol   => f.write_str("unrecognized symbol"),
        }
    }
}
impl std::error::Error for LexErr {}
impl crate::err::Error for LexErr {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match self {
            LexErr::DoesNotFitU16   => Some(format!("the range for a 16-bit unsigned integer is [{}, {}]", u16::MIN, u16::MAX).into()),
            LexErr::DoesNotFitI16   => Some(format!("the range for a 16-bit signed integer is [{}, {}]", i16::MIN, i16::MAX).into()),
            LexErr::InvalidHex      => Some("a hex literal starts with 'x' and consists of digits 0-9, A-F".into()),
            LexErr::InvalidBin      => Some("a binary literal starts with 'b' and consists of digits 0-1".into()),
            LexErr::InvalidNumeric  => Some("a decimal literal only consists of digits 0-9".into()),
            LexErr::InvalidHexEmpty => Some("there should be hex digits (0-9, A-F) here".into()),
            LexErr::InvalidDecEmpty => Some("there should be digits (0-9) here".into()),
            LexErr::UnknownIntErr   => None,
            LexErr::UnclosedStrLit  => Some("add a quote to the end of the string literal".into()),
            LexErr::StrLitTooBig    => Some(format!("string literals are limited to at most {} characters", u16::MAX - 1).into()),
            LexErr::InvalidReg      => Some("this must be R0-R7".into()),
            LexErr::InvalidSymbol   => Some("this character does not occur in any LC-3 assembly token".into()),
        }
    }
}

/// How a family of numeric literals reports its failures.
struct NumErrs {
    invalid: LexErr,
    empty: LexErr,
    too_big: LexErr
}
const DEC_U: NumErrs = NumErrs { invalid: LexErr::InvalidNumeric, empty: LexErr::InvalidDecEmpty, too_big: LexErr::DoesNotFitU16 };
const DEC_I: NumErrs = NumErrs { invalid: LexErr::InvalidNumeric, empty: LexErr::InvalidDecEmpty, too_big: LexErr::DoesNotFitI16 };
const HEX_U: NumErrs = NumErrs { invalid: LexErr::InvalidHex,     empty: LexErr::InvalidHexEmpty, too_big: LexErr::DoesNotFitU16 };
const HEX_I: NumErrs = NumErrs { invalid: LexErr::InvalidHex,     empty: LexErr::InvalidHexEmpty, too_big: LexErr::DoesNotFitI16 };
const BIN_U: NumErrs = NumErrs { invalid: LexErr::InvalidBin,     empty: LexErr::InvalidBin,      too_big: LexErr::DoesNotFitU16 };

impl NumErrs {
    /// Maps an int parsing failure onto this family's [`LexErr`]s.
    fn convert(&self, kind: &IntErrorKind, src: &str) -> LexErr {
        match kind {
            IntErrorKind::Empty => self.empty,
            // A lone minus sign is as good as no digits at all.
            IntErrorKind::InvalidDigit if src == "-" => self.empty,
            IntErrorKind::InvalidDigit => self.invalid,
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => self.too_big,
            _ => LexErr::UnknownIntErr,
        }
    }
}

fn parse_u16(src: &str, radix: u32, errs: NumErrs) -> Result<u16, LexErr> {
    u16::from_str_radix(src, radix).map_err(|e| errs.convert(e.kind(), src))
}
fn parse_i16(src: &str, radix: u32, errs: NumErrs) -> Result<i16, LexErr> {
    i16::from_str_radix(src, radix).map_err(|e| errs.convert(e.kind(), src))
}
/// Strips the optional `#` marker from a decimal literal.
fn strip_hash(src: &str) -> &str {
    src.strip_prefix('#').unwrap_or(src)
}
/// Strips the radix marker (`x`, `b`, ...) from a based literal.
fn strip_marker(src: &str) -> &str {
    &src[1..]
}

fn dec_unsigned(lx: &Lexer<'_, Token>) -> Result<u16, LexErr> {
    parse_u16(strip_hash(lx.slice()), 10, DEC_U)
}
fn dec_signed(lx: &Lexer<'_, Token>) -> Result<i16, LexErr> {
    parse_i16(strip_hash(lx.slice()), 10, DEC_I)
}
fn hex_unsigned(lx: &Lexer<'_, Token>) -> Result<u16, LexErr> {
    parse_u16(strip_marker(lx.slice()), 16, HEX_U)
}
fn hex_signed(lx: &Lexer<'_, Token>) -> Result<i16, LexErr> {
    parse_i16(strip_marker(lx.slice()), 16, HEX_I)
}
fn bin_unsigned(lx: &Lexer<'_, Token>) -> Result<u16, LexErr> {
    parse_u16(strip_marker(lx.slice()), 2, BIN_U)
}
fn reg_no(lx: &Lexer<'_, Token>) -> Result<u8, LexErr> {
    match lx.slice()[1..].parse::<u8>() {
        Ok(n) if n < 8 => Ok(n),
        _ => Err(LexErr::InvalidReg),
    }
}

fn str_literal(lx: &mut Lexer<'_, Token>) -> Result<String, LexErr> {
    let rest = lx.remainder()
        .lines()
        .next()
        .unwrap_or("");

    // Scan for the closing quote, hopping over backslash escapes.
    let bytes = rest.as_bytes();
    let mut i = 0;
    let close = loop {
        match bytes.get(i) {
            Some(b'"')  => break Some(i),
            Some(b'\\') => i += 2,
            Some(_)     => i += 1,
            None => break None,
        }
    };

    let Some(close) = close else {
        lx.bump(rest.len());
        return Err(LexErr::UnclosedStrLit);
    };
    lx.bump(close + 1);

    // Resolve the standard backslash escapes in the quoted body.
    let body = &lx.slice()[1..lx.slice().len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n')  => out.push('\n'),
            Some('r')  => out.push('\r'),
            Some('t')  => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('0')  => out.push('\0'),
            Some('"')  => out.push('\"'),
            // Unknown escapes pass through untouched.
            Some(other) => {
                out.push('\\');
                out.push(other);
            },
            None => out.push('\\'),
        }
    }

    match out.len() < usize::from(u16::MAX) {
        true  => Ok(out),
        false => Err(LexErr::StrLitTooBig),
    }
}

#[cfg(test)]
mod tests {
    use logos::Logos;

    use super::{Ident, LexErr, Token};

    fn label(s: &str) -> Token {
        Token::Ident(Ident::Label(s.to_string()))
    }
    fn str_literal(s: &str) -> Token {
        Token::String(s.to_string())
    }

    #[test]
    fn test_numeric_dec() {
        let mut tokens = Token::lexer("0 123 #100 #-300 -456");
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(123))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(100))));
        assert_eq!(tokens.next(), Some(Ok(Token::Signed(-300))));
        assert_eq!(tokens.next(), Some(Ok(Token::Signed(-456))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_numeric_hex() {
        let mut tokens = Token::lexer("x3000 XABCD xa x-7F");
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0x3000))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0xABCD))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0x000A))));
        assert_eq!(tokens.next(), Some(Ok(Token::Signed(-0x7F))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_numeric_bin() {
        let mut tokens = Token::lexer("b0 b101 B1111111111111111");
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0b101))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0xFFFF))));
        assert_eq!(tokens.next(), None);

        assert_eq!(Token::lexer("b012").next(), Some(Err(LexErr::InvalidBin)));
        assert_eq!(Token::lexer("b11111111111111111").next(), Some(Err(LexErr::DoesNotFitU16)));
    }

    #[test]
    fn test_numeric_overflow() {
        let mut tokens = Token::lexer("65535 -32768 x8000");
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(65535))));
        assert_eq!(tokens.next(), Some(Ok(Token::Signed(-32768))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0x8000))));
        assert_eq!(tokens.next(), None);

        assert_eq!(Token::lexer("65536").next(), Some(Err(LexErr::DoesNotFitU16)));
        assert_eq!(Token::lexer("-32769").next(), Some(Err(LexErr::DoesNotFitI16)));
        assert_eq!(Token::lexer("x-8001").next(), Some(Err(LexErr::DoesNotFitI16)));
    }

    #[test]
    fn test_numeric_invalid() {
        assert_eq!(Token::lexer("#Q").next(), Some(Err(LexErr::InvalidNumeric)));
        assert_eq!(Token::lexer("3Q").next(), Some(Err(LexErr::InvalidNumeric)));
        assert_eq!(Token::lexer("#").next(), Some(Err(LexErr::InvalidDecEmpty)));
        assert_eq!(Token::lexer("#-").next(), Some(Err(LexErr::InvalidDecEmpty)));
        assert_eq!(Token::lexer("x0Q").next(), Some(Err(LexErr::InvalidHex)));
        assert_eq!(Token::lexer("x-").next(), Some(Err(LexErr::InvalidHexEmpty)));
    }

    #[test]
    fn test_regs() {
        let mut tokens = Token::lexer("R0 r3 R7");
        assert_eq!(tokens.next(), Some(Ok(Token::Reg(0))));
        assert_eq!(tokens.next(), Some(Ok(Token::Reg(3))));
        assert_eq!(tokens.next(), Some(Ok(Token::Reg(7))));
        assert_eq!(tokens.next(), None);

        assert_eq!(Token::lexer("R8").next(), Some(Err(LexErr::InvalidReg)));
        assert_eq!(Token::lexer("R99").next(), Some(Err(LexErr::InvalidReg)));
    }

    #[test]
    fn test_str() {
        let mut tokens = Token::lexer(r#" "abc" "" "!@#$%^&*()" "#);
        assert_eq!(tokens.next(), Some(Ok(str_literal("abc"))));
        assert_eq!(tokens.next(), Some(Ok(str_literal(""))));
        assert_eq!(tokens.next(), Some(Ok(str_literal("!@#$%^&*()"))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_str_escape() {
        let mut tokens = Token::lexer(r#" "\n" "\t" "\\" "\"" "\0" "#);
        assert_eq!(tokens.next(), Some(Ok(str_literal("\n"))));
        assert_eq!(tokens.next(), Some(Ok(str_literal("\t"))));
        assert_eq!(tokens.next(), Some(Ok(str_literal("\\"))));
        assert_eq!(tokens.next(), Some(Ok(str_literal("\""))));
        assert_eq!(tokens.next(), Some(Ok(str_literal("\0"))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_str_unclosed() {
        assert_eq!(Token::lexer(r#"""#).next(), Some(Err(LexErr::UnclosedStrLit)));
        assert_eq!(Token::lexer("\"abc\ndef\"").next(), Some(Err(LexErr::UnclosedStrLit)));
    }

    #[test]
    fn test_keywords_labels() {
        let kws = stringify!(
            ADD AND NOT BR BRP BRZ BRZP BRN BRNP BRNZ BRNZP
            JMP JSR JSRR LD LDI LDR LEA ST STI STR TRAP
            RET RTI GETC OUT PUTS IN PUTSP HALT
        );
        for m_token in Token::lexer(kws) {
            let token = m_token.unwrap();
            if let Token::NewLine = token { continue; }
            assert!(
                matches!(&token, Token::Ident(id) if id.is_mnemonic()),
                "expected {token:?} to be a mnemonic"
            );
        }

        // Case insensitivity:
        let mut tokens = Token::lexer("halt HALT hAlT");
        assert_eq!(tokens.next(), Some(Ok(Token::Ident(Ident::HALT))));
        assert_eq!(tokens.next(), Some(Ok(Token::Ident(Ident::HALT))));
        assert_eq!(tokens.next(), Some(Ok(Token::Ident(Ident::HALT))));
        assert_eq!(tokens.next(), None);

        // Anything else is a label:
        let mut tokens = Token::lexer("LOOP done _");
        assert_eq!(tokens.next(), Some(Ok(label("LOOP"))));
        assert_eq!(tokens.next(), Some(Ok(label("done"))));
        assert_eq!(tokens.next(), Some(Ok(label("_"))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_punct_and_comment() {
        let mut tokens = Token::lexer("0\n1,2:3 ; comment text");
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0))));
        assert_eq!(tokens.next(), Some(Ok(Token::NewLine)));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(1))));
        assert_eq!(tokens.next(), Some(Ok(Token::Comma)));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(2))));
        assert_eq!(tokens.next(), Some(Ok(Token::Colon)));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(3))));
        assert_eq!(tokens.next(), Some(Ok(Token::Comment)));
        assert_eq!(tokens.next(), None);
    }
}
