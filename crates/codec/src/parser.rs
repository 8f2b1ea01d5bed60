//! Recursive-descent parser for ABI type strings.
//!
//! Grammar, suffix arrays binding left to right:
//!
//! ```text
//! type       := non_array ('[' digits? ']')*
//! non_array  := tuple | elementary
//! tuple      := '(' (type (',' type)*)? ')'
//! elementary := 'address' | 'bool' | 'string' | 'bytes' | 'bytes' digits
//!             | ('uint' | 'int') digits
//!             | ('ufixed' | 'fixed') digits 'x' digits
//! ```
//!
//! The canonical form requires explicit parameters: bare `uint`, `int`,
//! `fixed` and `ufixed` are rejected.

use crate::{
    error::ParseError,
    lexer::{self, Token},
    ty::AbiType,
};

/// Maximum nesting depth of a type tree, counting array suffixes and tuple
/// parentheses. Bounds recursion in the parser and, transitively, in the
/// encoder and decoder which walk the parsed tree.
pub(crate) const MAX_DEPTH: usize = 32;

/// Parses a type string into its [`AbiType`] tree.
pub(crate) fn parse(s: &str) -> Result<AbiType, ParseError> {
    let tokens = lexer::tokenize(s)?;
    let mut parser = Parser { tokens: &tokens, pos: 0 };
    let ty = parser.parse_type(0)?;
    if parser.pos != tokens.len() {
        return Err(ParseError::InvalidTypeString(format!("trailing input in `{s}`")));
    }
    Ok(ty)
}

struct Parser<'t, 's> {
    tokens: &'t [Token<'s>],
    pos: usize,
}

impl<'s> Parser<'_, 's> {
    fn peek(&self) -> Option<Token<'s>> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Result<Token<'s>, ParseError> {
        let token = self
            .peek()
            .ok_or_else(|| ParseError::InvalidTypeString("unexpected end of input".into()))?;
        self.pos += 1;
        Ok(token)
    }

    fn parse_type(&mut self, depth: usize) -> Result<AbiType, ParseError> {
        if depth >= MAX_DEPTH {
            return Err(ParseError::InvalidTypeString(format!(
                "nesting deeper than {MAX_DEPTH} levels"
            )));
        }
        let mut ty = match self.next()? {
            Token::LParen => self.parse_tuple_body(depth)?,
            Token::Word(word) => elementary(word)?,
            token => {
                return Err(ParseError::InvalidTypeString(format!("unexpected `{token:?}`")));
            }
        };

        // Suffix arrays: `T[2][3]` is three elements of `T[2]`.
        let mut depth = depth;
        while self.peek() == Some(Token::LBracket) {
            self.pos += 1;
            depth += 1;
            if depth >= MAX_DEPTH {
                return Err(ParseError::InvalidTypeString(format!(
                    "nesting deeper than {MAX_DEPTH} levels"
                )));
            }
            match self.next()? {
                Token::RBracket => ty = AbiType::Array(Box::new(ty)),
                Token::Word(word) => {
                    let n = digits(word)?;
                    if n == 0 {
                        return Err(ParseError::ParameterOutOfRange(
                            "fixed array length must be at least 1".into(),
                        ));
                    }
                    match self.next()? {
                        Token::RBracket => ty = AbiType::FixedArray(Box::new(ty), n),
                        token => {
                            return Err(ParseError::InvalidTypeString(format!(
                                "expected `]`, found `{token:?}`"
                            )));
                        }
                    }
                }
                token => {
                    return Err(ParseError::InvalidTypeString(format!(
                        "expected array length or `]`, found `{token:?}`"
                    )));
                }
            }
        }
        Ok(ty)
    }

    /// Parses the components after a consumed `(`.
    fn parse_tuple_body(&mut self, depth: usize) -> Result<AbiType, ParseError> {
        if self.peek() == Some(Token::RParen) {
            self.pos += 1;
            return Ok(AbiType::Tuple(Vec::new()));
        }
        let mut components = Vec::new();
        loop {
            components.push(self.parse_type(depth + 1)?);
            match self.next()? {
                Token::Comma => continue,
                Token::RParen => return Ok(AbiType::Tuple(components)),
                token => {
                    return Err(ParseError::InvalidTypeString(format!(
                        "expected `,` or `)`, found `{token:?}`"
                    )));
                }
            }
        }
    }
}

fn elementary(word: &str) -> Result<AbiType, ParseError> {
    match word {
        "address" => return Ok(AbiType::Address),
        "bool" => return Ok(AbiType::Bool),
        "string" => return Ok(AbiType::String),
        "bytes" => return Ok(AbiType::Bytes),
        // Canonical form only: the synonyms for uint256/int256 and
        // (u)fixed128x18 must be written out.
        "uint" | "int" | "fixed" | "ufixed" => {
            return Err(ParseError::InvalidTypeString(format!(
                "`{word}` requires explicit parameters"
            )));
        }
        _ => {}
    }
    if let Some(rest) = word.strip_prefix("bytes") {
        let m = digits(rest)?;
        if !(1..=32).contains(&m) {
            return Err(ParseError::ParameterOutOfRange(format!(
                "bytes{m}: width must be in 1..=32"
            )));
        }
        return Ok(AbiType::FixedBytes(m));
    }
    if let Some(rest) = word.strip_prefix("uint") {
        return Ok(AbiType::Int { signed: false, bits: int_bits(rest)? });
    }
    if let Some(rest) = word.strip_prefix("int") {
        return Ok(AbiType::Int { signed: true, bits: int_bits(rest)? });
    }
    if let Some(rest) = word.strip_prefix("ufixed") {
        let (bits, precision) = fixed_params(rest)?;
        return Ok(AbiType::Fixed { signed: false, bits, precision });
    }
    if let Some(rest) = word.strip_prefix("fixed") {
        let (bits, precision) = fixed_params(rest)?;
        return Ok(AbiType::Fixed { signed: true, bits, precision });
    }
    Err(ParseError::UnknownType(word.to_string()))
}

fn int_bits(s: &str) -> Result<usize, ParseError> {
    let bits = digits(s)?;
    if bits % 8 != 0 || !(8..=256).contains(&bits) {
        return Err(ParseError::ParameterOutOfRange(format!(
            "integer width {bits}: must be a multiple of 8 in 8..=256"
        )));
    }
    Ok(bits)
}

fn fixed_params(s: &str) -> Result<(usize, u32), ParseError> {
    let (bits, precision) = s.split_once('x').ok_or_else(|| {
        ParseError::InvalidTypeString(format!("`{s}`: expected <bits>x<precision>"))
    })?;
    let bits = digits(bits)?;
    if bits % 8 != 0 || !(8..=256).contains(&bits) {
        return Err(ParseError::ParameterOutOfRange(format!(
            "fixed-point width {bits}: must be a multiple of 8 in 8..=256"
        )));
    }
    let precision = digits(precision)?;
    if !(1..=80).contains(&precision) {
        return Err(ParseError::ParameterOutOfRange(format!(
            "fixed-point precision {precision}: must be in 1..=80"
        )));
    }
    Ok((bits, precision as u32))
}

/// Parses a canonical decimal run: non-empty, digits only, no leading zeros.
fn digits(s: &str) -> Result<usize, ParseError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidTypeString(format!("expected digits, found `{s}`")));
    }
    if s.len() > 1 && s.starts_with('0') {
        return Err(ParseError::InvalidTypeString(format!("leading zeros in `{s}`")));
    }
    s.parse()
        .map_err(|_| ParseError::ParameterOutOfRange(format!("`{s}` is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint(bits: usize) -> AbiType {
        AbiType::Int { signed: false, bits }
    }

    #[test]
    fn parses_elementary_types() {
        assert_eq!(parse("address").unwrap(), AbiType::Address);
        assert_eq!(parse("bool").unwrap(), AbiType::Bool);
        assert_eq!(parse("string").unwrap(), AbiType::String);
        assert_eq!(parse("bytes").unwrap(), AbiType::Bytes);
        assert_eq!(parse("bytes32").unwrap(), AbiType::FixedBytes(32));
        assert_eq!(parse("uint256").unwrap(), uint(256));
        assert_eq!(parse("int8").unwrap(), AbiType::Int { signed: true, bits: 8 });
        assert_eq!(
            parse("ufixed128x18").unwrap(),
            AbiType::Fixed { signed: false, bits: 128, precision: 18 }
        );
        assert_eq!(
            parse("fixed8x80").unwrap(),
            AbiType::Fixed { signed: true, bits: 8, precision: 80 }
        );
    }

    #[test]
    fn arrays_bind_left_to_right() {
        // Three elements, each a two-element array.
        assert_eq!(
            parse("uint8[2][3]").unwrap(),
            AbiType::FixedArray(Box::new(AbiType::FixedArray(Box::new(uint(8)), 2)), 3)
        );
        assert_eq!(
            parse("bool[][2]").unwrap(),
            AbiType::FixedArray(Box::new(AbiType::Array(Box::new(AbiType::Bool))), 2)
        );
    }

    #[test]
    fn parses_tuples() {
        assert_eq!(parse("()").unwrap(), AbiType::Tuple(vec![]));
        assert_eq!(
            parse("(uint256,(bool,string)[],bytes4)").unwrap(),
            AbiType::Tuple(vec![
                uint(256),
                AbiType::Array(Box::new(AbiType::Tuple(vec![AbiType::Bool, AbiType::String]))),
                AbiType::FixedBytes(4),
            ])
        );
    }

    #[test]
    fn rejects_bare_synonyms() {
        for s in ["uint", "int", "fixed", "ufixed"] {
            assert!(matches!(parse(s), Err(ParseError::InvalidTypeString(_))), "{s}");
        }
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        for s in ["uint7", "uint0", "uint264", "int12", "bytes0", "bytes33", "fixed128x0", "fixed128x81", "ufixed129x18", "uint8[0]"] {
            assert!(matches!(parse(s), Err(ParseError::ParameterOutOfRange(_))), "{s}");
        }
    }

    #[test]
    fn rejects_malformed_strings() {
        for s in ["", "(uint256", "uint256)", "uint256[", "uint256[2", "(uint256,)", "uint256 ", "uint8[02]", "uint0008", "uint256x", "fixed128", "fixedx18", "(,)"] {
            assert!(matches!(parse(s), Err(ParseError::InvalidTypeString(_))), "{s}");
        }
    }

    #[test]
    fn rejects_unknown_names() {
        for s in ["byte", "addres", "u256", "Uint256", "wagmi"] {
            assert!(matches!(parse(s), Err(ParseError::UnknownType(_))), "{s}");
        }
    }

    #[test]
    fn caps_nesting_depth() {
        let mut deep = String::from("uint8");
        deep.push_str(&"[]".repeat(MAX_DEPTH + 1));
        assert!(matches!(parse(&deep), Err(ParseError::InvalidTypeString(_))));

        let nested = format!("{}uint8{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert!(matches!(parse(&nested), Err(ParseError::InvalidTypeString(_))));
    }

    #[test]
    fn parse_is_pure() {
        let a = parse("(uint256,bytes)[2]").unwrap();
        let b = parse("(uint256,bytes)[2]").unwrap();
        assert_eq!(a, b);
    }
}
