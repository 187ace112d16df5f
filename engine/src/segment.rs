//! Segment conditions: free-text product filters.
//!
//! A condition string is scanned for a fixed set of independent triggers.
//! Every trigger that matches contributes one [`Clause`]; clauses are combined
//! with logical AND. There is no OR, negation or grouping, and text that
//! matches nothing compiles to an empty condition which selects every product.
//!
//! | Trigger                          | Clause                          |
//! |----------------------------------|---------------------------------|
//! | `on sale`, `sale`                | `onSale = true`                 |
//! | `in stock`, `instock`            | `stockStatus = instock`         |
//! | `out of stock`, `outofstock`     | `stockStatus = outofstock`      |
//! | `price <op> <number>`            | `price <op> number`             |
//! | `category:"value"`               | category contains value         |
//! | `tag:"value"`                    | tags contains value             |
//!
//! Triggers are not mutually exclusive. `"in stock out of stock"` yields two
//! stock clauses whose conjunction matches nothing.

use crate::{error::Result, LocalProduct, ProductStore, StockStatus};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

const ON_SALE_TRIGGERS: &[&str] = &["on sale", "sale"];
const IN_STOCK_TRIGGERS: &[&str] = &["in stock", "instock"];
const OUT_OF_STOCK_TRIGGERS: &[&str] = &["out of stock", "outofstock"];

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)price\s*(<=|>=|<|>|=)\s*(\d+(?:\.\d+)?)").expect("Invalid regex")
});

static CATEGORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)category\s*[:=]\s*["']?([^"'\s]+)["']?"#).expect("Invalid regex")
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)tag\s*[:=]\s*["']?([^"'\s]+)["']?"#).expect("Invalid regex")
});

/// Comparison operator of a price clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Comparator {
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,
    Equal,
}

/// The only operator spellings a condition may use.
const COMPARATORS: [(&str, Comparator); 5] = [
    ("<", Comparator::LessThan),
    (">", Comparator::GreaterThan),
    ("<=", Comparator::LessOrEqual),
    (">=", Comparator::GreaterOrEqual),
    ("=", Comparator::Equal),
];

impl Comparator {
    /// Look up an operator by its symbol. Anything outside the table is rejected.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        COMPARATORS
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, op)| *op)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::LessThan => "<",
            Comparator::GreaterThan => ">",
            Comparator::LessOrEqual => "<=",
            Comparator::GreaterOrEqual => ">=",
            Comparator::Equal => "=",
        }
    }

    /// SQL spelling of the operator. Always a static string.
    pub fn as_sql(&self) -> &'static str {
        self.symbol()
    }

    /// Evaluate `lhs <op> rhs`.
    pub fn compare<T: PartialOrd>(&self, lhs: &T, rhs: &T) -> bool {
        match self {
            Comparator::LessThan => lhs < rhs,
            Comparator::GreaterThan => lhs > rhs,
            Comparator::LessOrEqual => lhs <= rhs,
            Comparator::GreaterOrEqual => lhs >= rhs,
            Comparator::Equal => lhs == rhs,
        }
    }
}

/// One atomic predicate on a product field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "camelCase")]
pub enum Clause {
    /// `onSale = true`
    OnSale,
    /// `stockStatus = status`
    StockStatus { status: StockStatus },
    /// `price <op> value`
    Price { op: Comparator, value: Decimal },
    /// Case-insensitive substring match on `category`
    Category { contains: String },
    /// Case-insensitive substring match on `tags`
    Tag { contains: String },
}

impl Clause {
    /// Check whether a product satisfies this clause.
    pub fn matches(&self, product: &LocalProduct) -> bool {
        match self {
            Clause::OnSale => product.on_sale,
            Clause::StockStatus { status } => product.stock_status == *status,
            Clause::Price { op, value } => op.compare(&product.price, value),
            Clause::Category { contains } => contains_ignore_case(&product.category, contains),
            Clause::Tag { contains } => contains_ignore_case(&product.tags, contains),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// An ordered conjunction of clauses compiled from one condition string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SegmentCondition {
    clauses: Vec<Clause>,
}

impl SegmentCondition {
    pub fn new(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// An empty condition selects every product.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Check whether a product satisfies every clause.
    pub fn matches(&self, product: &LocalProduct) -> bool {
        self.clauses.iter().all(|c| c.matches(product))
    }
}

impl<'a> IntoIterator for &'a SegmentCondition {
    type Item = &'a Clause;
    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}

/// Compile a free-text condition into clauses.
///
/// Never fails: unrecognised text simply produces no clause. Only the first
/// price, category and tag expression in the text is used.
pub fn compile(text: &str) -> SegmentCondition {
    let lower = text.to_lowercase();
    let mut clauses = Vec::new();

    if contains_any(&lower, ON_SALE_TRIGGERS) {
        clauses.push(Clause::OnSale);
    }

    if contains_any(&lower, IN_STOCK_TRIGGERS) {
        clauses.push(Clause::StockStatus {
            status: StockStatus::InStock,
        });
    }

    if contains_any(&lower, OUT_OF_STOCK_TRIGGERS) {
        clauses.push(Clause::StockStatus {
            status: StockStatus::OutOfStock,
        });
    }

    if let Some(clause) = price_clause(text) {
        clauses.push(clause);
    }

    if let Some(caps) = CATEGORY_RE.captures(text) {
        clauses.push(Clause::Category {
            contains: caps[1].to_string(),
        });
    }

    if let Some(caps) = TAG_RE.captures(text) {
        clauses.push(Clause::Tag {
            contains: caps[1].to_string(),
        });
    }

    SegmentCondition::new(clauses)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn price_clause(text: &str) -> Option<Clause> {
    let caps = PRICE_RE.captures(text)?;
    let op = Comparator::from_symbol(&caps[1])?;
    // Out-of-range numbers are dropped like any other unrecognised text.
    let value = Decimal::from_str(&caps[2]).ok()?;
    Some(Clause::Price { op, value })
}

/// Compile `text` and fetch every product that satisfies it.
///
/// Empty or whitespace-only text returns the whole catalog. Ordering is
/// whatever the store returns.
pub async fn evaluate(store: &dyn ProductStore, text: &str) -> Result<Vec<LocalProduct>> {
    evaluate_condition(store, &compile(text)).await
}

/// Fetch every product that satisfies an already compiled condition.
pub async fn evaluate_condition(
    store: &dyn ProductStore,
    condition: &SegmentCondition,
) -> Result<Vec<LocalProduct>> {
    tracing::debug!(clauses = condition.len(), "evaluating segment");
    store.query(condition).await
}
