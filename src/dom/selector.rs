//! CSS selector subset for querying snapshots
//!
//! Supported: type and universal selectors, `#id`, `.class`, attribute
//! selectors (`[a]`, `[a=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`, `[a~=v]`),
//! `:not(<compound>)`, descendant and child combinators, and selector
//! lists separated by commas. Anything else is rejected with
//! [`AuditError::InvalidSelector`] rather than silently matching nothing.

use crate::error::{AuditError, Result};

/// Read-only view of an element arena the matcher walks
pub trait ElementTree {
    fn tag_name(&self, node: usize) -> &str;
    fn attribute(&self, node: usize, name: &str) -> Option<&str>;
    fn parent(&self, node: usize) -> Option<usize>;
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

#[derive(Debug, Clone, PartialEq)]
struct Complex {
    compounds: Vec<Compound>,
    // combinators[i] sits between compounds[i] and compounds[i + 1]
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Id(String),
    Class(String),
    Attribute { name: String, test: Option<(AttrOp, String)> },
    Not(Box<Compound>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AttrOp {
    Equals,
    Prefix,
    Suffix,
    Contains,
    Word,
}

impl Selector {
    /// Parse a selector list
    pub fn parse(source: &str) -> Result<Self> {
        let mut parser = Parser {
            source,
            chars: source.chars().collect(),
            pos: 0,
        };

        let mut alternatives = Vec::new();
        loop {
            parser.skip_whitespace();
            alternatives.push(parser.complex()?);
            parser.skip_whitespace();
            match parser.peek() {
                None => break,
                Some(',') => parser.pos += 1,
                Some(c) => return Err(parser.unexpected(c)),
            }
        }

        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    /// The selector text this was parsed from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `node` matches any selector in the list
    pub fn matches<T: ElementTree + ?Sized>(&self, tree: &T, node: usize) -> bool {
        self.alternatives.iter().any(|c| c.matches_from(tree, node, c.compounds.len() - 1))
    }
}

impl Complex {
    fn matches_from<T: ElementTree + ?Sized>(&self, tree: &T, node: usize, i: usize) -> bool {
        if !self.compounds[i].matches(tree, node) {
            return false;
        }
        if i == 0 {
            return true;
        }

        match self.combinators[i - 1] {
            Combinator::Child => tree
                .parent(node)
                .is_some_and(|parent| self.matches_from(tree, parent, i - 1)),
            Combinator::Descendant => {
                let mut current = tree.parent(node);
                while let Some(ancestor) = current {
                    if self.matches_from(tree, ancestor, i - 1) {
                        return true;
                    }
                    current = tree.parent(ancestor);
                }
                false
            }
        }
    }
}

impl Compound {
    fn matches<T: ElementTree + ?Sized>(&self, tree: &T, node: usize) -> bool {
        if let Some(tag) = &self.tag
            && !tree.tag_name(node).eq_ignore_ascii_case(tag)
        {
            return false;
        }
        self.conditions.iter().all(|c| c.matches(tree, node))
    }
}

impl Condition {
    fn matches<T: ElementTree + ?Sized>(&self, tree: &T, node: usize) -> bool {
        match self {
            Condition::Id(id) => tree.attribute(node, "id") == Some(id.as_str()),
            Condition::Class(class) => tree
                .attribute(node, "class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class)),
            Condition::Attribute { name, test } => match (tree.attribute(node, name), test) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some((op, expected))) => match op {
                    AttrOp::Equals => actual == expected,
                    AttrOp::Prefix => !expected.is_empty() && actual.starts_with(expected.as_str()),
                    AttrOp::Suffix => !expected.is_empty() && actual.ends_with(expected.as_str()),
                    AttrOp::Contains => !expected.is_empty() && actual.contains(expected.as_str()),
                    AttrOp::Word => actual.split_whitespace().any(|w| w == expected),
                },
            },
            Condition::Not(inner) => !inner.matches(tree, node),
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn error(&self, reason: impl Into<String>) -> AuditError {
        AuditError::invalid_selector(self.source, reason)
    }

    fn unexpected(&self, c: char) -> AuditError {
        self.error(format!("unexpected '{}' at position {}", c, self.pos))
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.unexpected(c)),
            None => Err(self.error(format!("expected '{}' before end of input", expected))),
        }
    }

    fn complex(&mut self) -> Result<Complex> {
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_whitespace = self.skip_whitespace();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_whitespace => combinators.push(Combinator::Descendant),
                Some(c) => return Err(self.unexpected(c)),
            }
            compounds.push(self.compound()?);
        }

        Ok(Complex { compounds, combinators })
    }

    fn compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        let mut universal = false;

        match self.peek() {
            Some('*') => {
                self.pos += 1;
                universal = true;
            }
            Some(c) if is_ident_char(c) => compound.tag = Some(self.ident()?.to_ascii_lowercase()),
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.conditions.push(Condition::Id(self.ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    compound.conditions.push(Condition::Class(self.ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    compound.conditions.push(self.attribute()?);
                }
                Some(':') => {
                    self.pos += 1;
                    let name = self.ident()?;
                    if !name.eq_ignore_ascii_case("not") {
                        return Err(self.error(format!("unsupported pseudo-class ':{}'", name)));
                    }
                    self.expect('(')?;
                    self.skip_whitespace();
                    let inner = self.compound()?;
                    self.skip_whitespace();
                    self.expect(')')?;
                    compound.conditions.push(Condition::Not(Box::new(inner)));
                }
                _ => break,
            }
        }

        if !universal && compound.tag.is_none() && compound.conditions.is_empty() {
            return match self.peek() {
                Some(c) => Err(self.unexpected(c)),
                None => Err(self.error("expected a selector")),
            };
        }

        Ok(compound)
    }

    fn attribute(&mut self) -> Result<Condition> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        if self.peek() == Some(']') {
            self.pos += 1;
            return Ok(Condition::Attribute { name, test: None });
        }

        let op = match self.peek() {
            Some('=') => AttrOp::Equals,
            Some('^') => AttrOp::Prefix,
            Some('$') => AttrOp::Suffix,
            Some('*') => AttrOp::Contains,
            Some('~') => AttrOp::Word,
            Some(c) => return Err(self.unexpected(c)),
            None => return Err(self.error("unterminated attribute selector")),
        };
        self.pos += 1;
        if op != AttrOp::Equals {
            self.expect('=')?;
        }

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(self.error("unterminated string in attribute selector"));
                }
                let value: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                value
            }
            _ => self.ident()?,
        };
        self.skip_whitespace();

        match self.peek() {
            Some(']') => self.pos += 1,
            Some(c) => return Err(self.unexpected(c)),
            None => return Err(self.error("unterminated attribute selector")),
        }

        Ok(Condition::Attribute {
            name,
            test: Some((op, value)),
        })
    }

    fn ident(&mut self) -> Result<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return match self.peek() {
                Some(c) => Err(self.unexpected(c)),
                None => Err(self.error("unexpected end of input")),
            };
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}
