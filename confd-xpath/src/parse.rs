//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! A hand-written recursive-descent parser over the XPath 1.0 subset
//! spec.md §1 scopes this crate to ("generic SQL-like querying beyond
//! XPath 1.0 subset needed for configuration selection" is an explicit
//! non-goal) — location paths, equality predicates, and index predicates.
//! No generated-parser dependency, matching the teacher's preference for
//! hand-rolled recursive-descent over parser-combinator crates elsewhere
//! in this workspace.

use crate::ast::{Axis, Location, NodeTest, Predicate, Primary, Step};
use crate::error::Error;

pub fn parse(input: &str) -> Result<Location, Error> {
    let mut p = Parser { chars: input.chars().collect(), pos: 0 };
    let loc = p.parse_location()?;
    p.skip_ws();
    if p.pos != p.chars.len() {
        return Err(Error::Syntax(format!("trailing input at {}", p.pos)));
    }
    Ok(loc)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, c: char) -> Result<(), Error> {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(Error::Syntax(format!("expected '{c}' at {}", self.pos)))
        }
    }

    fn try_eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn try_eat_str(&mut self, s: &str) -> bool {
        self.skip_ws();
        let remaining: String = self.chars[self.pos..].iter().collect();
        if remaining.starts_with(s) {
            self.pos += s.chars().count();
            true
        } else {
            false
        }
    }

    fn parse_location(&mut self) -> Result<Location, Error> {
        self.skip_ws();
        let absolute = self.try_eat('/');
        let mut steps = Vec::new();

        if absolute && self.peek().is_none() {
            return Ok(Location { absolute, steps });
        }

        steps.push(self.parse_step()?);
        loop {
            self.skip_ws();
            if self.try_eat_str("//") {
                let mut step = self.parse_step()?;
                step.axis = Axis::DescendantOrSelf;
                steps.push(step);
            } else if self.peek() == Some('/') {
                self.pos += 1;
                steps.push(self.parse_step()?);
            } else {
                break;
            }
        }
        Ok(Location { absolute, steps })
    }

    fn parse_step(&mut self) -> Result<Step, Error> {
        self.skip_ws();
        let axis;
        let test;
        if self.try_eat_str("..") {
            axis = Axis::Parent;
            test = NodeTest::Wildcard;
        } else if self.try_eat('.') {
            axis = Axis::SelfAxis;
            test = NodeTest::Wildcard;
        } else {
            axis = Axis::Child;
            test = self.parse_node_test()?;
        }

        let mut predicates = Vec::new();
        while self.try_eat('[') {
            predicates.push(self.parse_predicate()?);
            self.eat(']')?;
        }
        Ok(Step { axis, test, predicates })
    }

    fn parse_predicates_tail(&mut self) -> Result<Vec<Predicate>, Error> {
        let mut predicates = Vec::new();
        while self.try_eat('[') {
            predicates.push(self.parse_predicate()?);
            self.eat(']')?;
        }
        Ok(predicates)
    }

    fn parse_node_test(&mut self) -> Result<NodeTest, Error> {
        self.skip_ws();
        if self.try_eat('*') {
            return Ok(NodeTest::Wildcard);
        }
        let first = self.parse_ident()?;
        if self.try_eat(':') {
            let local = self.parse_ident()?;
            Ok(NodeTest::Name { prefix: Some(first), local })
        } else {
            Ok(NodeTest::Name { prefix: None, local: first })
        }
    }

    fn parse_ident(&mut self) -> Result<String, Error> {
        self.skip_ws();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '-' || c == '.') {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(Error::Syntax(format!("expected identifier at {start}")));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_predicate(&mut self) -> Result<Predicate, Error> {
        self.skip_ws();
        if matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            let n = self.parse_number()?;
            return Ok(Predicate::Index(n as usize));
        }

        let lhs = self.parse_primary()?;
        self.skip_ws();
        if self.try_eat('=') {
            let rhs = self.parse_primary()?;
            Ok(Predicate::Eq(lhs, rhs))
        } else if let Primary::Path(loc) = lhs {
            Ok(Predicate::Existence(loc))
        } else {
            Err(Error::Syntax("predicate must be an equality or a path".to_string()))
        }
    }

    fn parse_primary(&mut self) -> Result<Primary, Error> {
        self.skip_ws();
        match self.peek() {
            Some('\'') | Some('"') => self.parse_string_lit(),
            Some(c) if c.is_ascii_digit() => Ok(Primary::NumberLit(self.parse_number()?)),
            _ => {
                let first = self.parse_ident()?;
                let (prefix, local) = if self.try_eat(':') {
                    (Some(first), self.parse_ident()?)
                } else {
                    (None, first)
                };

                self.skip_ws();
                if prefix.is_none() && self.try_eat('(') {
                    let mut args = Vec::new();
                    if !self.try_eat(')') {
                        loop {
                            args.push(self.parse_primary()?);
                            if !self.try_eat(',') {
                                break;
                            }
                        }
                        self.eat(')')?;
                    }
                    return Ok(Primary::FuncCall(local, args));
                }

                // A relative location path whose first step's node test we
                // already consumed above; parse the remaining `/step` chain.
                let first_step = Step {
                    axis: Axis::Child,
                    test: NodeTest::Name { prefix, local },
                    predicates: self.parse_predicates_tail()?,
                };
                let mut steps = vec![first_step];
                loop {
                    self.skip_ws();
                    if self.try_eat_str("//") {
                        let mut step = self.parse_step()?;
                        step.axis = Axis::DescendantOrSelf;
                        steps.push(step);
                    } else if self.peek() == Some('/') {
                        self.pos += 1;
                        steps.push(self.parse_step()?);
                    } else {
                        break;
                    }
                }
                Ok(Primary::Path(Location { absolute: false, steps }))
            }
        }
    }

    fn parse_string_lit(&mut self) -> Result<Primary, Error> {
        let quote = self.bump().unwrap();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c != quote) {
            self.pos += 1;
        }
        let s: String = self.chars[start..self.pos].iter().collect();
        self.eat(quote)?;
        Ok(Primary::StringLit(s))
    }

    fn parse_number(&mut self) -> Result<f64, Error> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        self.chars[start..self.pos]
            .iter()
            .collect::<String>()
            .parse()
            .map_err(|_| Error::Syntax(format!("bad number at {start}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_child_path() {
        let loc = parse("interfaces/interface").unwrap();
        assert!(!loc.absolute);
        assert_eq!(loc.steps.len(), 2);
    }

    #[test]
    fn parses_absolute_path() {
        let loc = parse("/config/interfaces").unwrap();
        assert!(loc.absolute);
        assert_eq!(loc.steps.len(), 2);
    }

    #[test]
    fn parses_key_predicate_as_equality() {
        let loc = parse("interface[name='eth0']").unwrap();
        assert_eq!(loc.steps.len(), 1);
        let step = &loc.steps[0];
        assert_eq!(step.predicates.len(), 1);
        match &step.predicates[0] {
            Predicate::Eq(Primary::Path(key_path), Primary::StringLit(value)) => {
                assert_eq!(key_path.steps.len(), 1);
                assert_eq!(value, "eth0");
            }
            other => panic!("unexpected predicate: {other:?}"),
        }
    }

    #[test]
    fn parses_index_predicate() {
        let loc = parse("interface[3]").unwrap();
        match &loc.steps[0].predicates[0] {
            Predicate::Index(3) => {}
            other => panic!("unexpected predicate: {other:?}"),
        }
    }

    #[test]
    fn parses_multiple_key_predicates() {
        let loc = parse("entry[k1='a'][k2='b']").unwrap();
        assert_eq!(loc.steps[0].predicates.len(), 2);
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(parse("interface]bad").is_err());
    }
}
