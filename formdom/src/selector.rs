//! A small CSS-like selector subset.
//!
//! Supported: type selectors (`input`, `*`), `#id`, `.class`, attribute
//! presence (`[required]`), attribute equality (`[type=radio]`,
//! `[name="a b"]`) and comma-separated lists. Combinators are not supported.

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

/// Errors produced while parsing a selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected '{found}' at offset {offset} in selector '{selector}'")]
    Unexpected {
        selector: String,
        found: char,
        offset: usize,
    },
    #[error("unterminated attribute filter in selector '{0}'")]
    Unterminated(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Filter {
    Id(String),
    Class(String),
    Has(String),
    Equals(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    /// `None` matches any tag.
    tag: Option<String>,
    filters: Vec<Filter>,
}

impl Compound {
    fn matches<'a>(&self, tag: &str, attr: &impl Fn(&str) -> Option<&'a str>) -> bool {
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        self.filters.iter().all(|filter| match filter {
            Filter::Id(id) => attr("id") == Some(id.as_str()),
            Filter::Class(class) => attr("class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class)),
            Filter::Has(name) => attr(name).is_some(),
            Filter::Equals(name, value) => attr(name) == Some(value.as_str()),
        })
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Compound>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser {
            input,
            chars: input.char_indices().peekable(),
        };

        let mut alternatives = Vec::new();
        loop {
            alternatives.push(parser.compound()?);
            parser.skip_whitespace();
            match parser.chars.next() {
                None => break,
                Some((_, ',')) => continue,
                Some((offset, found)) => return Err(parser.unexpected(found, offset)),
            }
        }

        Ok(Self {
            source: input.trim().to_string(),
            alternatives,
        })
    }

    /// The selector text as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match against an element given its tag and an attribute lookup.
    pub fn matches_with<'a>(&self, tag: &str, attr: impl Fn(&str) -> Option<&'a str>) -> bool {
        self.alternatives.iter().any(|c| c.matches(tag, &attr))
    }
}

impl std::str::FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl Parser<'_> {
    fn unexpected(&self, found: char, offset: usize) -> SelectorError {
        SelectorError::Unexpected {
            selector: self.input.to_string(),
            found,
            offset,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn ident(&mut self) -> String {
        let mut out = String::new();
        while let Some((_, c)) = self.chars.next_if(|(_, c)| is_ident(*c)) {
            out.push(c);
        }
        out
    }

    fn required_ident(&mut self) -> Result<String, SelectorError> {
        let ident = self.ident();
        if ident.is_empty() {
            return match self.chars.peek().copied() {
                Some((offset, found)) => Err(self.unexpected(found, offset)),
                None => Err(SelectorError::Unterminated(self.input.to_string())),
            };
        }
        Ok(ident)
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        self.skip_whitespace();
        let mut compound = Compound::default();

        let universal = self.chars.next_if(|(_, c)| *c == '*').is_some();
        if !universal {
            let tag = self.ident();
            if !tag.is_empty() {
                compound.tag = Some(tag.to_ascii_lowercase());
            }
        }

        while let Some((offset, c)) = self.chars.peek().copied() {
            match c {
                '#' => {
                    self.chars.next();
                    compound.filters.push(Filter::Id(self.required_ident()?));
                }
                '.' => {
                    self.chars.next();
                    compound.filters.push(Filter::Class(self.required_ident()?));
                }
                '[' => {
                    self.chars.next();
                    compound.filters.push(self.attribute()?);
                }
                c if c.is_whitespace() || c == ',' => break,
                found => return Err(self.unexpected(found, offset)),
            }
        }

        if !universal && compound.tag.is_none() && compound.filters.is_empty() {
            return Err(match self.chars.peek().copied() {
                Some((offset, found)) => self.unexpected(found, offset),
                None => SelectorError::Empty,
            });
        }

        Ok(compound)
    }

    fn attribute(&mut self) -> Result<Filter, SelectorError> {
        self.skip_whitespace();
        let name = self.required_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        match self.chars.next() {
            Some((_, ']')) => Ok(Filter::Has(name)),
            Some((_, '=')) => {
                self.skip_whitespace();
                let value = self.attribute_value()?;
                self.skip_whitespace();
                match self.chars.next() {
                    Some((_, ']')) => Ok(Filter::Equals(name, value)),
                    Some((offset, found)) => Err(self.unexpected(found, offset)),
                    None => Err(SelectorError::Unterminated(self.input.to_string())),
                }
            }
            Some((offset, found)) => Err(self.unexpected(found, offset)),
            None => Err(SelectorError::Unterminated(self.input.to_string())),
        }
    }

    fn attribute_value(&mut self) -> Result<String, SelectorError> {
        let Some((_, first)) = self.chars.peek().copied() else {
            return Err(SelectorError::Unterminated(self.input.to_string()));
        };

        if first == '"' || first == '\'' {
            self.chars.next();
            let mut value = String::new();
            for (_, c) in self.chars.by_ref() {
                if c == first {
                    return Ok(value);
                }
                value.push(c);
            }
            return Err(SelectorError::Unterminated(self.input.to_string()));
        }

        let mut value = String::new();
        while let Some((_, c)) = self
            .chars
            .next_if(|(_, c)| *c != ']' && !c.is_whitespace())
        {
            value.push(c);
        }
        Ok(value)
    }
}
