//! Tokenizer for the search query language.
//!
//! [`tokenize`] turns free-form user input into a flat list of [`Token`]s.
//! It never fails: malformed input degrades to plain words.
//!
//! ```text
//! name:"Jane Doe" OR -archived (draft | review)
//! ```
//!
//! becomes `FieldPrefix(name) Phrase(Jane Doe) Or Not Word(archived) LParen
//! Word(draft) Or Word(review) RParen`.

use std::iter::Peekable;
use std::str::CharIndices;

use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A bare word.
    Word,
    /// A double-quoted phrase, quotes stripped.
    Phrase,
    /// `field:` directly followed by a `Word` or `Phrase`. The text is the field name.
    FieldPrefix,
    /// `AND` keyword.
    And,
    /// `OR` keyword or `|`.
    Or,
    /// `NOT` keyword or a `-` attached to a term.
    Not,
    /// `(`
    LParen,
    /// `)`
    RParen,
}

/// A lexical token with its byte offset in the raw query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Token text: the word, the phrase contents, or the field name.
    pub text: String,
    /// Byte offset of the token in the input.
    pub position: usize,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
        }
    }

    /// Returns `true` if this token can carry a search value.
    pub fn is_value(&self) -> bool {
        matches!(self.kind, TokenKind::Word | TokenKind::Phrase)
    }
}

/// Returns `true` if `name` is a valid field identifier.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '"' | '(' | ')' | '|')
}

/// Splits a raw search string into tokens.
///
/// Empty or whitespace-only input yields no tokens.
///
/// # Example
///
/// ```
/// use scoped_search::{tokenize, TokenKind};
///
/// let kinds: Vec<TokenKind> = tokenize("age:30 bob").iter().map(|t| t.kind).collect();
/// assert_eq!(kinds, [TokenKind::FieldPrefix, TokenKind::Word, TokenKind::Word]);
/// ```
pub fn tokenize(raw: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = raw.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::new(TokenKind::LParen, "(", pos));
            }
            ')' => {
                chars.next();
                tokens.push(Token::new(TokenKind::RParen, ")", pos));
            }
            '|' => {
                chars.next();
                tokens.push(Token::new(TokenKind::Or, "|", pos));
            }
            '"' => {
                chars.next();
                let text = read_phrase(raw, &mut chars);
                tokens.push(Token::new(TokenKind::Phrase, text, pos));
            }
            '-' if starts_term(raw, pos + 1) => {
                chars.next();
                tokens.push(Token::new(TokenKind::Not, "-", pos));
            }
            _ => read_word(raw, &mut chars, &mut tokens),
        }
    }

    tokens
}

/// A `-` negates only when a term follows without whitespace.
fn starts_term(raw: &str, offset: usize) -> bool {
    match raw[offset..].chars().next() {
        Some(next) => !next.is_whitespace() && !matches!(next, ')' | '|' | '-'),
        None => false,
    }
}

/// Reads phrase contents after an opening quote. An unterminated phrase
/// runs to the end of the input.
fn read_phrase(raw: &str, chars: &mut Peekable<CharIndices<'_>>) -> String {
    let start = match chars.peek() {
        Some(&(pos, _)) => pos,
        None => return String::new(),
    };
    for (pos, ch) in chars.by_ref() {
        if ch == '"' {
            return raw[start..pos].to_string();
        }
    }
    raw[start..].to_string()
}

fn read_word(raw: &str, chars: &mut Peekable<CharIndices<'_>>, tokens: &mut Vec<Token>) {
    let start = match chars.peek() {
        Some(&(pos, _)) => pos,
        None => return,
    };
    let mut end = raw.len();
    while let Some(&(pos, ch)) = chars.peek() {
        if is_delimiter(ch) {
            end = pos;
            break;
        }
        chars.next();
    }
    let word = &raw[start..end];

    if let Some((field, value)) = word.split_once(':') {
        if is_identifier(field) {
            if !value.is_empty() {
                tokens.push(Token::new(TokenKind::FieldPrefix, field, start));
                tokens.push(Token::new(TokenKind::Word, value, start + field.len() + 1));
                return;
            }
            if let Some(&(quote_pos, '"')) = chars.peek() {
                chars.next();
                let phrase = read_phrase(raw, chars);
                tokens.push(Token::new(TokenKind::FieldPrefix, field, start));
                tokens.push(Token::new(TokenKind::Phrase, phrase, quote_pos));
                return;
            }
        }
    }

    let kind = if word.eq_ignore_ascii_case("and") {
        TokenKind::And
    } else if word.eq_ignore_ascii_case("or") {
        TokenKind::Or
    } else if word.eq_ignore_ascii_case("not") {
        TokenKind::Not
    } else {
        TokenKind::Word
    };
    tokens.push(Token::new(kind, word, start));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(raw: &str) -> Vec<TokenKind> {
        tokenize(raw).iter().map(|t| t.kind).collect()
    }

    fn texts(raw: &str) -> Vec<String> {
        tokenize(raw).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn empty_and_whitespace_yield_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n ").is_empty());
    }

    #[test]
    fn words_and_positions() {
        let tokens = tokenize("foo  bar");
        assert_eq!(tokens[0], Token::new(TokenKind::Word, "foo", 0));
        assert_eq!(tokens[1], Token::new(TokenKind::Word, "bar", 5));
    }

    #[test]
    fn phrases_keep_contents_verbatim() {
        let tokens = tokenize(r#"say "Hello,  World" now"#);
        assert_eq!(tokens[1], Token::new(TokenKind::Phrase, "Hello,  World", 4));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn unterminated_phrase_takes_the_rest() {
        let tokens = tokenize(r#"a "open ended"#);
        assert_eq!(tokens[1], Token::new(TokenKind::Phrase, "open ended", 2));
    }

    #[test]
    fn operators_are_case_insensitive() {
        assert_eq!(
            kinds("a and b Or c NOT d"),
            [
                TokenKind::Word,
                TokenKind::And,
                TokenKind::Word,
                TokenKind::Or,
                TokenKind::Word,
                TokenKind::Not,
                TokenKind::Word,
            ]
        );
    }

    #[test]
    fn quoted_operator_is_a_phrase() {
        assert_eq!(kinds(r#""OR""#), [TokenKind::Phrase]);
    }

    #[test]
    fn parens_and_pipe_split_words() {
        assert_eq!(
            kinds("(a|b)"),
            [
                TokenKind::LParen,
                TokenKind::Word,
                TokenKind::Or,
                TokenKind::Word,
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn field_prefix_binds_word() {
        let tokens = tokenize("age:30");
        assert_eq!(tokens[0], Token::new(TokenKind::FieldPrefix, "age", 0));
        assert_eq!(tokens[1], Token::new(TokenKind::Word, "30", 4));
    }

    #[test]
    fn field_prefix_binds_phrase() {
        let tokens = tokenize(r#"name:"Jane Doe""#);
        assert_eq!(tokens[0], Token::new(TokenKind::FieldPrefix, "name", 0));
        assert_eq!(tokens[1], Token::new(TokenKind::Phrase, "Jane Doe", 5));
    }

    #[test]
    fn field_value_keeps_operator_prefix() {
        assert_eq!(texts("age:>=30"), ["age", ">=30"]);
    }

    #[test]
    fn dangling_field_prefix_is_a_word() {
        assert_eq!(tokenize("name:"), [Token::new(TokenKind::Word, "name:", 0)]);
        assert_eq!(kinds("name: bob"), [TokenKind::Word, TokenKind::Word]);
        assert_eq!(kinds("name:(bob)")[0], TokenKind::Word);
    }

    #[test]
    fn invalid_identifier_is_a_word() {
        assert_eq!(kinds("9lives:cat"), [TokenKind::Word]);
        assert_eq!(kinds(":cat"), [TokenKind::Word]);
    }

    #[test]
    fn dash_negates_attached_terms() {
        assert_eq!(kinds("-foo"), [TokenKind::Not, TokenKind::Word]);
        assert_eq!(kinds(r#"-"a b""#), [TokenKind::Not, TokenKind::Phrase]);
        assert_eq!(
            kinds("-name:x"),
            [TokenKind::Not, TokenKind::FieldPrefix, TokenKind::Word]
        );
        assert_eq!(kinds("a - b"), [TokenKind::Word, TokenKind::Word, TokenKind::Word]);
        assert_eq!(kinds("a-b"), [TokenKind::Word]);
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("author_name"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }
}
