//! Linear constraints over boolean decision variables

use super::VarId;
use std::fmt;

/// Integer-coefficient linear combination of variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, i64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of the given variables, each with coefficient 1
    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1)).collect(),
        }
    }

    /// Append `coefficient * var`
    pub fn term(mut self, var: VarId, coefficient: i64) -> Self {
        self.terms.push((var, coefficient));
        self
    }

    pub fn add_term(&mut self, var: VarId, coefficient: i64) {
        self.terms.push((var, coefficient));
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn variables(&self) -> impl Iterator<Item = VarId> + '_ {
        self.terms.iter().map(|&(v, _)| v)
    }

    /// Value of the expression under a 0/1 assignment
    pub fn evaluate<F: Fn(VarId) -> bool>(&self, value_of: F) -> i64 {
        self.terms
            .iter()
            .map(|&(v, c)| if value_of(v) { c } else { 0 })
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEq,
    GreaterEq,
    Equal,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Relation::LessEq => "<=",
            Relation::GreaterEq => ">=",
            Relation::Equal => "==",
        };
        write!(f, "{}", symbol)
    }
}

/// `expr (<= | >= | ==) rhs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: i64,
}

impl Constraint {
    pub fn new(expr: LinearExpr, relation: Relation, rhs: i64) -> Self {
        Self { expr, relation, rhs }
    }

    pub fn at_most<I: IntoIterator<Item = VarId>>(vars: I, bound: i64) -> Self {
        Self::new(LinearExpr::sum(vars), Relation::LessEq, bound)
    }

    pub fn at_least<I: IntoIterator<Item = VarId>>(vars: I, bound: i64) -> Self {
        Self::new(LinearExpr::sum(vars), Relation::GreaterEq, bound)
    }

    pub fn exactly<I: IntoIterator<Item = VarId>>(vars: I, count: i64) -> Self {
        Self::new(LinearExpr::sum(vars), Relation::Equal, count)
    }

    /// Pin a single variable to 0 or 1
    pub fn fix(var: VarId, value: bool) -> Self {
        Self::new(LinearExpr::sum([var]), Relation::Equal, i64::from(value))
    }

    /// `a == b`
    pub fn equal(a: VarId, b: VarId) -> Self {
        Self::new(LinearExpr::new().term(a, 1).term(b, -1), Relation::Equal, 0)
    }

    pub fn is_satisfied_by<F: Fn(VarId) -> bool>(&self, value_of: F) -> bool {
        let lhs = self.expr.evaluate(value_of);
        match self.relation {
            Relation::LessEq => lhs <= self.rhs,
            Relation::GreaterEq => lhs >= self.rhs,
            Relation::Equal => lhs == self.rhs,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.expr.is_empty() {
            write!(f, "0")?;
        }
        for (i, (var, coefficient)) in self.expr.terms.iter().enumerate() {
            let sign = if *coefficient < 0 { "-" } else if i > 0 { "+" } else { "" };
            if i > 0 {
                write!(f, " {} ", sign)?;
            } else {
                write!(f, "{}", sign)?;
            }
            match coefficient.abs() {
                1 => write!(f, "x{}", var.index())?,
                c => write!(f, "{}*x{}", c, var.index())?,
            }
        }
        write!(f, " {} {}", self.relation, self.rhs)
    }
}
