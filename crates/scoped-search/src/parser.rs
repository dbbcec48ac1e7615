//! Recursive-descent parser for the search query language.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr     := or_expr
//! or_expr  := and_expr (OR and_expr)*
//! and_expr := unary (AND? unary)*      adjacent terms are ANDed
//! unary    := NOT unary | primary
//! primary  := ( expr ) | term
//! term     := [field:] (WORD | PHRASE)
//! ```
//!
//! The parser is total. An unmatched `(` closes at end of input, a stray
//! `)` is dropped, and dangling operators contribute nothing. Groups nest
//! at most [`MAX_DEPTH`] deep; parentheses beyond that only delimit and
//! their contents join the enclosing group.

use std::fmt;

use crate::lexer::{tokenize, Token, TokenKind};

/// Deepest group nesting the parser builds.
pub const MAX_DEPTH: usize = 64;

/// A search term: an optional field qualifier and a raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// Field named by a `field:` prefix, `None` for a bare keyword.
    pub field: Option<String>,
    /// Raw value text, uncoerced.
    pub value: String,
    /// Whether the term is negated.
    pub negated: bool,
    /// Whether the value came from a quoted phrase.
    pub quoted: bool,
}

/// Parsed boolean structure of a search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionNode {
    /// A single search term.
    Leaf(Term),
    /// All children must match.
    And(Vec<ConditionNode>),
    /// At least one child must match.
    Or(Vec<ConditionNode>),
    /// Negation of a group.
    Not(Box<ConditionNode>),
    /// Nothing to filter on, e.g. `()` or an empty phrase.
    Empty,
}

impl ConditionNode {
    /// A bare keyword leaf.
    pub fn keyword(value: impl Into<String>) -> Self {
        ConditionNode::Leaf(Term {
            field: None,
            value: value.into(),
            negated: false,
            quoted: false,
        })
    }

    /// A field-qualified leaf.
    pub fn field(field: impl Into<String>, value: impl Into<String>) -> Self {
        ConditionNode::Leaf(Term {
            field: Some(field.into()),
            value: value.into(),
            negated: false,
            quoted: false,
        })
    }

    /// Marks a leaf's value as a quoted phrase. Other nodes are unchanged.
    pub fn quoted(self) -> Self {
        match self {
            ConditionNode::Leaf(mut term) => {
                term.quoted = true;
                ConditionNode::Leaf(term)
            }
            other => other,
        }
    }

    /// Returns `true` if this tree filters nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, ConditionNode::Empty)
    }

    /// Builds a normalized conjunction: nested `And`s are flattened, empty
    /// children dropped and single-child groups collapsed.
    pub fn and(children: Vec<ConditionNode>) -> Self {
        Self::group(children, true)
    }

    /// Builds a normalized disjunction, see [`ConditionNode::and`].
    pub fn or(children: Vec<ConditionNode>) -> Self {
        Self::group(children, false)
    }

    /// Negates a node. Leaves flip their flag and double negation cancels.
    pub fn negate(self) -> Self {
        match self {
            ConditionNode::Leaf(mut term) => {
                term.negated = !term.negated;
                ConditionNode::Leaf(term)
            }
            ConditionNode::Not(inner) => *inner,
            ConditionNode::Empty => ConditionNode::Empty,
            group => ConditionNode::Not(Box::new(group)),
        }
    }

    fn group(children: Vec<ConditionNode>, conjunction: bool) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                ConditionNode::Empty => {}
                ConditionNode::And(nested) if conjunction => flat.extend(nested),
                ConditionNode::Or(nested) if !conjunction => flat.extend(nested),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => ConditionNode::Empty,
            1 => flat.pop().unwrap_or(ConditionNode::Empty),
            _ if conjunction => ConditionNode::And(flat),
            _ => ConditionNode::Or(flat),
        }
    }
}

impl fmt::Display for ConditionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionNode::Leaf(term) => {
                if term.negated {
                    write!(f, "-")?;
                }
                if let Some(field) = &term.field {
                    write!(f, "{}:", field)?;
                }
                write!(f, "{:?}", term.value)
            }
            ConditionNode::And(children) => write_group(f, children, " AND "),
            ConditionNode::Or(children) => write_group(f, children, " OR "),
            ConditionNode::Not(inner) => write!(f, "NOT {}", inner),
            ConditionNode::Empty => write!(f, "()"),
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, children: &[ConditionNode], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", child)?;
    }
    write!(f, ")")
}

/// Parses a token stream into a normalized condition tree.
pub fn parse(tokens: &[Token]) -> ConditionNode {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        flattened: 0,
    };
    parser.parse_or()
}

/// Tokenizes and parses a raw search string.
///
/// ```
/// use scoped_search::{parse_query, ConditionNode};
///
/// let tree = parse_query("a OR b AND c");
/// assert_eq!(
///     tree,
///     ConditionNode::or(vec![
///         ConditionNode::keyword("a"),
///         ConditionNode::and(vec![ConditionNode::keyword("b"), ConditionNode::keyword("c")]),
///     ])
/// );
/// ```
pub fn parse_query(raw: &str) -> ConditionNode {
    parse(&tokenize(raw))
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    // `(` tokens past MAX_DEPTH still waiting for their `)`.
    flattened: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_or(&mut self) -> ConditionNode {
        let mut children = vec![self.parse_and()];
        while self.peek_kind() == Some(TokenKind::Or) {
            self.advance();
            children.push(self.parse_and());
        }
        ConditionNode::or(children)
    }

    fn parse_and(&mut self) -> ConditionNode {
        let mut children = Vec::new();
        loop {
            match self.peek_kind() {
                None | Some(TokenKind::Or) => break,
                Some(TokenKind::RParen) if self.flattened > 0 => {
                    self.advance();
                    self.flattened -= 1;
                }
                Some(TokenKind::RParen) if self.depth > 0 => break,
                Some(TokenKind::RParen) => {
                    self.advance();
                }
                Some(TokenKind::And) => {
                    self.advance();
                }
                Some(_) => children.push(self.parse_unary()),
            }
        }
        ConditionNode::and(children)
    }

    fn parse_unary(&mut self) -> ConditionNode {
        let mut negations = 0usize;
        while self.peek_kind() == Some(TokenKind::Not) {
            self.advance();
            negations += 1;
        }
        let node = self.parse_primary();
        if negations % 2 == 1 {
            node.negate()
        } else {
            node
        }
    }

    fn parse_primary(&mut self) -> ConditionNode {
        let token = match self.peek() {
            Some(token) => token,
            None => return ConditionNode::Empty,
        };
        match token.kind {
            TokenKind::LParen if self.depth >= MAX_DEPTH => {
                self.advance();
                self.flattened += 1;
                ConditionNode::Empty
            }
            TokenKind::LParen => {
                self.advance();
                self.depth += 1;
                let inner = self.parse_or();
                self.depth -= 1;
                if self.peek_kind() == Some(TokenKind::RParen) {
                    self.advance();
                }
                inner
            }
            TokenKind::FieldPrefix => {
                self.advance();
                match self.peek() {
                    Some(value) if value.is_value() => {
                        self.advance();
                        let node = leaf(Some(token.text.clone()), &value.text);
                        if value.kind == TokenKind::Phrase {
                            node.quoted()
                        } else {
                            node
                        }
                    }
                    _ => leaf(None, &format!("{}:", token.text)),
                }
            }
            TokenKind::Word => {
                self.advance();
                leaf(None, &token.text)
            }
            TokenKind::Phrase => {
                self.advance();
                leaf(None, &token.text).quoted()
            }
            // Operators and `)` are left for the enclosing rule.
            TokenKind::And | TokenKind::Or | TokenKind::Not | TokenKind::RParen => {
                ConditionNode::Empty
            }
        }
    }
}

fn leaf(field: Option<String>, value: &str) -> ConditionNode {
    if value.is_empty() {
        return ConditionNode::Empty;
    }
    ConditionNode::Leaf(Term {
        field,
        value: value.to_string(),
        negated: false,
        quoted: false,
    })
}
