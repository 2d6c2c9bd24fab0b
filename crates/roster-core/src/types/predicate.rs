//! Structural predicates over record shapes.
//!
//! A [`Predicate<S>`] is a small tree of comparisons combined with AND/OR/NOT
//! and tagged with the record shape `S` it was written against. The tag is
//! only a compile-time marker; moving a predicate to another shape goes
//! through a [`FieldMap`](super::field_map::FieldMap).

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact equality.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// SQL `LIKE` pattern match (`%` and `_`, ASCII case-insensitive).
    Like,
    /// List membership.
    In,
    /// Null check.
    IsNull,
    /// Non-null check.
    IsNotNull,
}

impl FilterOp {
    /// The SQL spelling of the operator.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "LIKE",
            Self::In => "IN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }
}

/// A dynamic value that can represent the scalar types stored by Roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A string value.
    String(String),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A boolean value.
    Boolean(bool),
    /// A list of string values (for `IN`).
    StringList(Vec<String>),
    /// A list of integer values (for `IN`).
    IntegerList(Vec<i64>),
    /// Null / no value.
    Null,
}

impl FilterValue {
    /// Returns `true` for [`FilterValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn order(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    fn contains(&self, needle: &Self) -> bool {
        match (self, needle) {
            (Self::StringList(items), Self::String(s)) => items.iter().any(|item| item == s),
            (Self::IntegerList(items), Self::Integer(i)) => items.contains(i),
            (Self::StringList(_) | Self::IntegerList(_), _) => false,
            (scalar, needle) => scalar.order(needle) == Some(Ordering::Equal),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "'{s}'"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::StringList(items) => write!(f, "{items:?}"),
            Self::IntegerList(items) => write!(f, "{items:?}"),
            Self::Null => write!(f, "NULL"),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(value: Vec<String>) -> Self {
        Self::StringList(value)
    }
}

impl From<Vec<i64>> for FilterValue {
    fn from(value: Vec<i64>) -> Self {
        Self::IntegerList(value)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// The left-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// A field path; nested records use dots (`country.name`).
    Field(String),
    /// `LOWER(operand)`.
    Lower(Box<Operand>),
    /// `UPPER(operand)`.
    Upper(Box<Operand>),
    /// `LENGTH(operand)` in characters.
    Length(Box<Operand>),
    /// A random number. Never deterministic.
    Random,
    /// The current time. Never deterministic.
    Now,
}

impl Operand {
    /// A plain field reference.
    pub fn field(path: impl Into<String>) -> Self {
        Self::Field(path.into())
    }

    /// Wrap in `LOWER`.
    pub fn lower(self) -> Self {
        Self::Lower(Box::new(self))
    }

    /// Wrap in `UPPER`.
    pub fn upper(self) -> Self {
        Self::Upper(Box::new(self))
    }

    /// Wrap in `LENGTH`.
    pub fn length(self) -> Self {
        Self::Length(Box::new(self))
    }

    /// Whether evaluating this operand twice on the same record always
    /// yields the same value.
    pub fn is_deterministic(&self) -> bool {
        match self {
            Self::Field(_) => true,
            Self::Lower(inner) | Self::Upper(inner) | Self::Length(inner) => {
                inner.is_deterministic()
            }
            Self::Random | Self::Now => false,
        }
    }

    fn resolve<R: FieldSource + ?Sized>(&self, record: &R) -> FilterValue {
        match self {
            Self::Field(path) => record.field_value(path).unwrap_or(FilterValue::Null),
            Self::Lower(inner) => match inner.resolve(record) {
                FilterValue::String(s) => FilterValue::String(s.to_lowercase()),
                _ => FilterValue::Null,
            },
            Self::Upper(inner) => match inner.resolve(record) {
                FilterValue::String(s) => FilterValue::String(s.to_uppercase()),
                _ => FilterValue::Null,
            },
            Self::Length(inner) => match inner.resolve(record) {
                FilterValue::String(s) => FilterValue::Integer(s.chars().count() as i64),
                _ => FilterValue::Null,
            },
            // Non-deterministic operands never match in memory.
            Self::Random | Self::Now => FilterValue::Null,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(path) => write!(f, "{path}"),
            Self::Lower(inner) => write!(f, "lower({inner})"),
            Self::Upper(inner) => write!(f, "upper({inner})"),
            Self::Length(inner) => write!(f, "length({inner})"),
            Self::Random => write!(f, "random()"),
            Self::Now => write!(f, "now()"),
        }
    }
}

/// A node of a predicate tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Always true or always false.
    Constant(bool),
    /// `operand op value`.
    Compare {
        /// Left-hand side.
        operand: Operand,
        /// Comparison operator.
        op: FilterOp,
        /// Right-hand side.
        value: FilterValue,
    },
    /// Negation.
    Not(Box<Condition>),
    /// Conjunction; empty is true.
    All(Vec<Condition>),
    /// Disjunction; empty is false.
    Any(Vec<Condition>),
}

impl Condition {
    fn evaluate<R: FieldSource + ?Sized>(&self, record: &R) -> bool {
        match self {
            Self::Constant(value) => *value,
            Self::Compare { operand, op, value } => compare(&operand.resolve(record), *op, value),
            Self::Not(inner) => !inner.evaluate(record),
            Self::All(items) => items.iter().all(|c| c.evaluate(record)),
            Self::Any(items) => items.iter().any(|c| c.evaluate(record)),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[Condition], sep: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, " {sep} ")?;
                }
                write!(f, "{item}")?;
            }
            write!(f, ")")
        }

        match self {
            Self::Constant(value) => write!(f, "{value}"),
            Self::Compare {
                operand,
                op: op @ (FilterOp::IsNull | FilterOp::IsNotNull),
                ..
            } => write!(f, "{operand} {}", op.as_sql()),
            Self::Compare { operand, op, value } => write!(f, "{operand} {} {value}", op.as_sql()),
            Self::Not(inner) => write!(f, "NOT {inner}"),
            Self::All(items) => join(f, items, "AND"),
            Self::Any(items) => join(f, items, "OR"),
        }
    }
}

fn compare(lhs: &FilterValue, op: FilterOp, rhs: &FilterValue) -> bool {
    match op {
        FilterOp::IsNull => lhs.is_null(),
        FilterOp::IsNotNull => !lhs.is_null(),
        FilterOp::Eq if rhs.is_null() => lhs.is_null(),
        FilterOp::Ne if rhs.is_null() => !lhs.is_null(),
        _ if lhs.is_null() => false,
        FilterOp::Eq => lhs.order(rhs) == Some(Ordering::Equal),
        FilterOp::Ne => matches!(lhs.order(rhs), Some(o) if o != Ordering::Equal),
        FilterOp::Gt => lhs.order(rhs) == Some(Ordering::Greater),
        FilterOp::Gte => matches!(lhs.order(rhs), Some(Ordering::Greater | Ordering::Equal)),
        FilterOp::Lt => lhs.order(rhs) == Some(Ordering::Less),
        FilterOp::Lte => matches!(lhs.order(rhs), Some(Ordering::Less | Ordering::Equal)),
        FilterOp::In => rhs.contains(lhs),
        FilterOp::Like => match (lhs, rhs) {
            (FilterValue::String(text), FilterValue::String(pattern)) => like(text, pattern),
            _ => false,
        },
    }
}

/// SQLite `LIKE` semantics: `%` any run, `_` one character, ASCII
/// case-insensitive.
fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();
    let pattern: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();

    // matches[j] == pattern[..j] matches text[..i]
    let mut matches = vec![false; pattern.len() + 1];
    matches[0] = true;
    for j in 1..=pattern.len() {
        matches[j] = matches[j - 1] && pattern[j - 1] == '%';
    }
    for &t in &text {
        let mut next = vec![false; pattern.len() + 1];
        for j in 1..=pattern.len() {
            next[j] = match pattern[j - 1] {
                '%' => next[j - 1] || matches[j],
                '_' => matches[j - 1],
                p => matches[j - 1] && p == t,
            };
        }
        matches = next;
    }
    matches[pattern.len()]
}

/// Read access to a record's fields by path.
pub trait FieldSource {
    /// The value at `path`, or `None` when the record has no such field.
    fn field_value(&self, path: &str) -> Option<FilterValue>;
}

/// A boolean condition over records of shape `S`.
pub struct Predicate<S> {
    condition: Condition,
    shape: PhantomData<fn() -> S>,
}

impl<S> Predicate<S> {
    /// Wrap an untyped condition.
    pub fn from_condition(condition: Condition) -> Self {
        Self {
            condition,
            shape: PhantomData,
        }
    }

    /// A predicate matching every record.
    pub fn always() -> Self {
        Self::from_condition(Condition::Constant(true))
    }

    /// A predicate matching no record.
    pub fn never() -> Self {
        Self::from_condition(Condition::Constant(false))
    }

    /// Start a comparison on a field.
    pub fn field(path: impl Into<String>) -> FieldCondition<S> {
        Self::operand(Operand::field(path))
    }

    /// Start a comparison on an arbitrary operand.
    pub fn operand(operand: Operand) -> FieldCondition<S> {
        FieldCondition {
            operand,
            shape: PhantomData,
        }
    }

    /// Both conditions must hold.
    pub fn and(self, other: Self) -> Self {
        let items = match (self.condition, other.condition) {
            (Condition::All(mut left), Condition::All(right)) => {
                left.extend(right);
                left
            }
            (Condition::All(mut left), right) => {
                left.push(right);
                left
            }
            (left, right) => vec![left, right],
        };
        Self::from_condition(Condition::All(items))
    }

    /// Either condition must hold.
    pub fn or(self, other: Self) -> Self {
        let items = match (self.condition, other.condition) {
            (Condition::Any(mut left), Condition::Any(right)) => {
                left.extend(right);
                left
            }
            (Condition::Any(mut left), right) => {
                left.push(right);
                left
            }
            (left, right) => vec![left, right],
        };
        Self::from_condition(Condition::Any(items))
    }

    /// Negate the condition.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::from_condition(Condition::Not(Box::new(self.condition)))
    }

    /// The underlying condition tree.
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// `Some(value)` when the predicate is a constant.
    pub fn as_constant(&self) -> Option<bool> {
        match self.condition {
            Condition::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Evaluate against a record in memory.
    pub fn evaluate<R: FieldSource + ?Sized>(&self, record: &R) -> bool {
        self.condition.evaluate(record)
    }
}

impl<S> Clone for Predicate<S> {
    fn clone(&self) -> Self {
        Self::from_condition(self.condition.clone())
    }
}

impl<S> fmt::Debug for Predicate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.condition).finish()
    }
}

impl<S> fmt::Display for Predicate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.condition.fmt(f)
    }
}

impl<S> PartialEq for Predicate<S> {
    fn eq(&self, other: &Self) -> bool {
        self.condition == other.condition
    }
}

/// Builder returned by [`Predicate::field`].
pub struct FieldCondition<S> {
    operand: Operand,
    shape: PhantomData<fn() -> S>,
}

impl<S> FieldCondition<S> {
    /// Compare with an explicit operator.
    pub fn compare(self, op: FilterOp, value: impl Into<FilterValue>) -> Predicate<S> {
        Predicate::from_condition(Condition::Compare {
            operand: self.operand,
            op,
            value: value.into(),
        })
    }

    /// `field = value`.
    pub fn eq(self, value: impl Into<FilterValue>) -> Predicate<S> {
        self.compare(FilterOp::Eq, value)
    }

    /// `field <> value`.
    pub fn ne(self, value: impl Into<FilterValue>) -> Predicate<S> {
        self.compare(FilterOp::Ne, value)
    }

    /// `field > value`.
    pub fn gt(self, value: impl Into<FilterValue>) -> Predicate<S> {
        self.compare(FilterOp::Gt, value)
    }

    /// `field >= value`.
    pub fn gte(self, value: impl Into<FilterValue>) -> Predicate<S> {
        self.compare(FilterOp::Gte, value)
    }

    /// `field < value`.
    pub fn lt(self, value: impl Into<FilterValue>) -> Predicate<S> {
        self.compare(FilterOp::Lt, value)
    }

    /// `field <= value`.
    pub fn lte(self, value: impl Into<FilterValue>) -> Predicate<S> {
        self.compare(FilterOp::Lte, value)
    }

    /// `field LIKE pattern`.
    pub fn like(self, pattern: impl Into<String>) -> Predicate<S> {
        self.compare(FilterOp::Like, FilterValue::String(pattern.into()))
    }

    /// `field IN (values)`.
    pub fn is_in(self, values: impl Into<FilterValue>) -> Predicate<S> {
        self.compare(FilterOp::In, values)
    }

    /// `field IS NULL`.
    pub fn is_null(self) -> Predicate<S> {
        self.compare(FilterOp::IsNull, FilterValue::Null)
    }

    /// `field IS NOT NULL`.
    pub fn is_not_null(self) -> Predicate<S> {
        self.compare(FilterOp::IsNotNull, FilterValue::Null)
    }
}
