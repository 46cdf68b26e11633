//! Runtime parameters for parametric programs.
//!
//! Gate angles are [`ParameterExpression`]s that may refer to slots of a
//! declared memory region (`params[2]`). The values of those regions are
//! supplied per execution as [`RegisterValues`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crate::error::{IrError, IrResult};

/// Runtime values for named memory regions (`name → values`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterValues {
    regions: BTreeMap<String, Vec<f64>>,
}

impl RegisterValues {
    /// Create an empty set of register values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, values: impl Into<Vec<f64>>) -> Self {
        self.insert(name, values);
        self
    }

    /// Set the values of region `name`, replacing any previous values.
    pub fn insert(&mut self, name: impl Into<String>, values: impl Into<Vec<f64>>) {
        self.regions.insert(name.into(), values.into());
    }

    /// All values of region `name`.
    pub fn region(&self, name: &str) -> Option<&[f64]> {
        self.regions.get(name).map(Vec::as_slice)
    }

    /// The value of `name[index]`.
    pub fn get(&self, name: &str, index: usize) -> IrResult<f64> {
        let values = self
            .region(name)
            .ok_or_else(|| IrError::UnboundParameter(name.to_string()))?;
        values
            .get(index)
            .copied()
            .ok_or_else(|| IrError::RegisterIndexOutOfBounds {
                register: name.to_string(),
                index,
                size: values.len(),
            })
    }

    /// Iterate regions in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.regions.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// A parameter expression over constants and memory references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A constant numeric value.
    Constant(f64),
    /// The constant π.
    Pi,
    /// A slot of a declared memory region, bound at run time.
    Ref {
        /// Region name.
        register: String,
        /// Slot index.
        index: usize,
    },
    /// Negation.
    Neg(Box<ParameterExpression>),
    /// Addition.
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Subtraction.
    Sub(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Multiplication.
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
}

impl ParameterExpression {
    /// Create a constant parameter.
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    /// Create a π constant.
    pub fn pi() -> Self {
        ParameterExpression::Pi
    }

    /// Reference `register[index]`.
    pub fn reference(register: impl Into<String>, index: usize) -> Self {
        ParameterExpression::Ref {
            register: register.into(),
            index,
        }
    }

    /// Check if this expression depends on runtime memory.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Ref { .. } => true,
            ParameterExpression::Constant(_) | ParameterExpression::Pi => false,
            ParameterExpression::Neg(e) => e.is_symbolic(),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b) => a.is_symbolic() || b.is_symbolic(),
        }
    }

    /// Try to evaluate without runtime values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterExpression::Constant(v) => Some(*v),
            ParameterExpression::Pi => Some(PI),
            ParameterExpression::Ref { .. } => None,
            ParameterExpression::Neg(e) => e.as_f64().map(|v| -v),
            ParameterExpression::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            ParameterExpression::Sub(a, b) => Some(a.as_f64()? - b.as_f64()?),
            ParameterExpression::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
        }
    }

    /// Evaluate against runtime register values.
    pub fn evaluate(&self, values: &RegisterValues) -> IrResult<f64> {
        match self {
            ParameterExpression::Constant(v) => Ok(*v),
            ParameterExpression::Pi => Ok(PI),
            ParameterExpression::Ref { register, index } => values.get(register, *index),
            ParameterExpression::Neg(e) => Ok(-e.evaluate(values)?),
            ParameterExpression::Add(a, b) => Ok(a.evaluate(values)? + b.evaluate(values)?),
            ParameterExpression::Sub(a, b) => Ok(a.evaluate(values)? - b.evaluate(values)?),
            ParameterExpression::Mul(a, b) => Ok(a.evaluate(values)? * b.evaluate(values)?),
        }
    }

    /// Visit every memory reference in this expression.
    pub fn for_each_reference(&self, f: &mut impl FnMut(&str, usize)) {
        match self {
            ParameterExpression::Constant(_) | ParameterExpression::Pi => {}
            ParameterExpression::Ref { register, index } => f(register, *index),
            ParameterExpression::Neg(e) => e.for_each_reference(f),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b) => {
                a.for_each_reference(f);
                b.for_each_reference(f);
            }
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self {
        ParameterExpression::Neg(Box::new(self))
    }
}

impl<T: Into<ParameterExpression>> Add<T> for ParameterExpression {
    type Output = Self;

    fn add(self, rhs: T) -> Self {
        ParameterExpression::Add(Box::new(self), Box::new(rhs.into()))
    }
}

impl<T: Into<ParameterExpression>> Sub<T> for ParameterExpression {
    type Output = Self;

    fn sub(self, rhs: T) -> Self {
        ParameterExpression::Sub(Box::new(self), Box::new(rhs.into()))
    }
}

impl<T: Into<ParameterExpression>> Mul<T> for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        ParameterExpression::Mul(Box::new(self), Box::new(rhs.into()))
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Pi => write!(f, "pi"),
            ParameterExpression::Ref { register, index } => write!(f, "{register}[{index}]"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Sub(a, b) => write!(f, "({a} - {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "({a} * {b})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_reference() {
        let values = RegisterValues::new().with("params", vec![0.5, 1.5]);
        let expr = ParameterExpression::reference("params", 1) * 2.0;
        assert!((expr.evaluate(&values).unwrap() - 3.0).abs() < 1e-12);
        assert!(expr.is_symbolic());
        assert_eq!(expr.as_f64(), None);
    }

    #[test]
    fn test_unbound_region() {
        let expr = ParameterExpression::reference("gammas", 0);
        let err = expr.evaluate(&RegisterValues::new()).unwrap_err();
        assert!(matches!(err, IrError::UnboundParameter(name) if name == "gammas"));
    }

    #[test]
    fn test_short_region() {
        let values = RegisterValues::new().with("params", vec![0.1]);
        let err = ParameterExpression::reference("params", 3)
            .evaluate(&values)
            .unwrap_err();
        assert!(matches!(
            err,
            IrError::RegisterIndexOutOfBounds { index: 3, size: 1, .. }
        ));
    }

    #[test]
    fn test_constant_folding() {
        let expr = -(ParameterExpression::pi() * 0.5);
        assert!((expr.as_f64().unwrap() + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_references_collected() {
        let expr = ParameterExpression::reference("a", 0) + ParameterExpression::reference("b", 2);
        let mut seen = vec![];
        expr.for_each_reference(&mut |r, i| seen.push((r.to_string(), i)));
        assert_eq!(seen, vec![("a".to_string(), 0), ("b".to_string(), 2)]);
    }

    #[test]
    fn test_register_values_serde() {
        let values = RegisterValues::new().with("params", vec![1.0, 2.0]);
        let json = serde_json::to_string(&values).unwrap();
        let back: RegisterValues = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }
}
