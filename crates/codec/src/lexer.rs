//! Tokenizer for ABI type strings.

use crate::error::ParseError;

/// A single token of the type grammar. Words cover type names, widths and
/// the `x` separator of fixed-point types; the parser takes them apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Word(&'a str),
}

/// Splits `s` into tokens. Whitespace is not part of the grammar and is
/// rejected like any other stray byte.
pub(crate) fn tokenize(s: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let mut tokens = Vec::new();
    let bytes = s.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        let token = match bytes[pos] {
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'[' => Token::LBracket,
            b']' => Token::RBracket,
            b',' => Token::Comma,
            c if c.is_ascii_alphanumeric() => {
                let start = pos;
                while pos < bytes.len() && bytes[pos].is_ascii_alphanumeric() {
                    pos += 1;
                }
                tokens.push(Token::Word(&s[start..pos]));
                continue;
            }
            c => {
                return Err(ParseError::InvalidTypeString(format!(
                    "unexpected character {:?} at byte {pos}",
                    char::from(c)
                )));
            }
        };
        tokens.push(token);
        pos += 1;
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_nested_type() {
        let tokens = tokenize("(uint256,bytes)[2]").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LParen,
                Token::Word("uint256"),
                Token::Comma,
                Token::Word("bytes"),
                Token::RParen,
                Token::LBracket,
                Token::Word("2"),
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn rejects_whitespace() {
        assert!(matches!(tokenize("uint256, bool"), Err(ParseError::InvalidTypeString(_))));
        assert!(matches!(tokenize(" uint8"), Err(ParseError::InvalidTypeString(_))));
    }

    #[test]
    fn rejects_stray_bytes() {
        assert!(tokenize("uint256;").is_err());
        assert!(tokenize("uint256\u{1f980}").is_err());
    }

    #[test]
    fn empty_input_is_no_tokens() {
        assert_eq!(tokenize("").unwrap(), vec![]);
    }
}
