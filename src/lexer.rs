//! @ai:module:intent Tokenize signature files
//! @ai:module:layer infrastructure
//! @ai:module:public_api Token, Lexeme, LexError, tokenize
//! @ai:module:stateless true
//!
//! Whitespace and `//` comments are dropped here; the format header is read
//! separately by the parser before tokenizing.

use logos::Logos;

/// Raw token kinds. Keywords are plain identifiers and are recognised by the
/// parser from their text.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    #[regex(r"-?[0-9]([0-9A-Za-z_.]|[eE][+-])*")]
    Number,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    #[regex(r"'([^'\\\n]|\\.)*'")]
    Char,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token("...")]
    Ellipsis,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
    #[token("!")]
    Bang,
    #[token("@")]
    At,
    #[token("=")]
    Eq,
    #[token("&")]
    Amp,

    /// Operators that only appear inside constant values and annotation arguments.
    #[regex(r"[+\-*/%|^~:#]")]
    Symbol,
}

impl Token {
    /// @ai:intent Short description used in parse error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Token::Ident => "identifier",
            Token::Number => "number",
            Token::Str => "string literal",
            Token::Char => "character literal",
            Token::LBrace => "'{'",
            Token::RBrace => "'}'",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::Lt => "'<'",
            Token::Gt => "'>'",
            Token::LBracket => "'['",
            Token::RBracket => "']'",
            Token::Comma => "','",
            Token::Semi => "';'",
            Token::Ellipsis => "'...'",
            Token::Dot => "'.'",
            Token::Question => "'?'",
            Token::Bang => "'!'",
            Token::At => "'@'",
            Token::Eq => "'='",
            Token::Amp => "'&'",
            Token::Symbol => "operator",
        }
    }
}

/// @ai:intent A token with its source text, byte span and 1-based line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub token: Token,
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

/// @ai:intent A character sequence no token matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub line: usize,
    pub text: String,
}

/// @ai:intent Split signature text into lexemes
/// @ai:post lexemes are in source order with non-decreasing line numbers
/// @ai:effects pure
pub fn tokenize(source: &str) -> Result<Vec<Lexeme<'_>>, LexError> {
    let mut lexer = Token::lexer(source);
    let mut lexemes = Vec::new();
    let mut line = 1;
    let mut scanned = 0;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        line += count_newlines(&source[scanned..span.start]);
        scanned = span.start;

        match result {
            Ok(token) => lexemes.push(Lexeme {
                token,
                text: lexer.slice(),
                start: span.start,
                end: span.end,
                line,
            }),
            Err(()) => {
                return Err(LexError {
                    line,
                    text: lexer.slice().to_string(),
                })
            }
        }
    }

    Ok(lexemes)
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|l| l.token).collect()
    }

    #[test]
    fn test_member_line() {
        assert_eq!(
            kinds("method public String? get(int...);"),
            vec![
                Token::Ident,
                Token::Ident,
                Token::Ident,
                Token::Question,
                Token::Ident,
                Token::LParen,
                Token::Ident,
                Token::Ellipsis,
                Token::RParen,
                Token::Semi,
            ]
        );
    }

    #[test]
    fn test_comments_skipped_and_lines_tracked() {
        let lexemes = tokenize("// header\npackage a {\n  // note\n}\n").unwrap();
        let lines: Vec<_> = lexemes.iter().map(|l| (l.text, l.line)).collect();
        assert_eq!(lines, vec![("package", 2), ("a", 2), ("{", 2), ("}", 4)]);
    }

    #[test]
    fn test_constant_values() {
        let lexemes = tokenize(r#"= -1.5E+3f; = "a;b"; = 'x';"#).unwrap();
        let texts: Vec<_> = lexemes.iter().map(|l| l.text).collect();
        assert_eq!(
            texts,
            vec!["=", "-1.5E+3f", ";", "=", "\"a;b\"", ";", "=", "'x'", ";"]
        );
    }

    #[test]
    fn test_unknown_character() {
        let err = tokenize("package a {\n  `\n}").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.text, "`");
    }
}
