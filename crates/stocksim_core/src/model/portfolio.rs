use std::fmt;

use serde::Serialize;

use crate::error::{PortfolioError, ValidationError};

/// Maximum number of holdings in one portfolio
pub const MAX_HOLDINGS: usize = 10;
/// Longest accepted ticker symbol at submission
pub const MAX_TICKER_LEN: usize = 5;
/// A portfolio is balanced when its total weight is within this distance of 1.0
pub const BALANCE_TOLERANCE: f64 = 0.01;

/// One stock position: ticker, fractional weight and display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    ticker: String,
    weight: f64,
    name: String,
}

impl Holding {
    pub fn new(ticker: impl Into<String>, weight: f64, name: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            weight: clamp_weight(weight),
            name: name.into(),
        }
    }

    fn blank() -> Self {
        Self::new("", 0.0, "")
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Editable fields of a [`Holding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldingField {
    Ticker,
    Weight,
    Name,
}

/// Immutable view of a portfolio, in the shape the simulation service expects
/// (`{ "stocks": [{ "ticker", "weight", "name" }] }`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Portfolio {
    pub stocks: Vec<Holding>,
}

impl Portfolio {
    pub fn total_weight(&self) -> f64 {
        self.stocks.iter().map(Holding::weight).sum()
    }

    /// Tickers joined for labels, e.g. `"AAPL/GOOGL/MSFT"`.
    pub fn label(&self) -> String {
        self.stocks
            .iter()
            .map(Holding::ticker)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Handle returned by [`PortfolioModel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&Portfolio) + Send>;

/// Owns the holdings of a session and enforces their invariants.
///
/// The list always contains between 1 and [`MAX_HOLDINGS`] holdings and every
/// weight stays in `[0, 1]`. Balance (weights summing to ~1) is a soft invariant,
/// checked by [`PortfolioModel::validate`] before submission.
///
/// Every successful mutation notifies the registered observers with a fresh
/// [`Portfolio`] snapshot. Rejected calls leave the model untouched and notify nobody.
pub struct PortfolioModel {
    holdings: Vec<Holding>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl fmt::Debug for PortfolioModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortfolioModel")
            .field("holdings", &self.holdings)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for PortfolioModel {
    /// The starter portfolio shown at the beginning of a session.
    fn default() -> Self {
        Self {
            holdings: vec![
                Holding::new("AAPL", 0.4, "Apple Inc."),
                Holding::new("GOOGL", 0.3, "Alphabet Inc."),
                Holding::new("MSFT", 0.3, "Microsoft Corp."),
            ],
            observers: Vec::new(),
            next_subscription: 0,
        }
    }
}

impl PortfolioModel {
    /// A portfolio with a single blank holding.
    pub fn new() -> Self {
        Self {
            holdings: vec![Holding::blank()],
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Build a model from existing holdings.
    ///
    /// Fails with `LastHolding` for an empty list and `CapacityExceeded` above
    /// [`MAX_HOLDINGS`].
    pub fn from_holdings(holdings: Vec<Holding>) -> Result<Self, PortfolioError> {
        if holdings.is_empty() {
            return Err(PortfolioError::LastHolding);
        }
        if holdings.len() > MAX_HOLDINGS {
            return Err(PortfolioError::CapacityExceeded { max: MAX_HOLDINGS });
        }
        Ok(Self {
            holdings,
            observers: Vec::new(),
            next_subscription: 0,
        })
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.holdings.len() >= MAX_HOLDINGS
    }

    pub fn snapshot(&self) -> Portfolio {
        Portfolio {
            stocks: self.holdings.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------------

    /// Register a callback invoked with a new snapshot after every mutation.
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&Portfolio) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, observer) in &mut self.observers {
            observer(&snapshot);
        }
    }

    // ------------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------------

    /// Append a blank holding and return its index.
    pub fn add_holding(&mut self) -> Result<usize, PortfolioError> {
        if self.is_full() {
            return Err(PortfolioError::CapacityExceeded { max: MAX_HOLDINGS });
        }
        self.holdings.push(Holding::blank());
        self.notify();
        Ok(self.holdings.len() - 1)
    }

    /// Remove the holding at `index`.
    ///
    /// The last remaining holding can never be removed; that check wins over the
    /// index check so a single-holding portfolio always reports `LastHolding`.
    pub fn remove_holding(&mut self, index: usize) -> Result<Holding, PortfolioError> {
        if self.holdings.len() <= 1 {
            return Err(PortfolioError::LastHolding);
        }
        self.check_index(index)?;
        let removed = self.holdings.remove(index);
        self.notify();
        Ok(removed)
    }

    /// Update one field of a holding from raw user input.
    ///
    /// `Weight` input goes through [`coerce_weight`]. `Ticker` and `Name` are
    /// stored verbatim; upper-casing tickers is the caller's job.
    pub fn update_holding(
        &mut self,
        index: usize,
        field: HoldingField,
        raw: &str,
    ) -> Result<(), PortfolioError> {
        self.check_index(index)?;
        let holding = &mut self.holdings[index];
        match field {
            HoldingField::Ticker => holding.ticker = raw.to_string(),
            HoldingField::Name => holding.name = raw.to_string(),
            HoldingField::Weight => holding.weight = coerce_weight(raw),
        }
        self.notify();
        Ok(())
    }

    /// Set a weight from an already-numeric value (slider, nudge keys).
    pub fn set_weight(&mut self, index: usize, weight: f64) -> Result<(), PortfolioError> {
        self.check_index(index)?;
        self.holdings[index].weight = clamp_weight(weight);
        self.notify();
        Ok(())
    }

    /// Rescale all weights so they sum to 1.
    pub fn normalize(&mut self) -> Result<(), PortfolioError> {
        let total = self.total_weight();
        if total <= 0.0 {
            return Err(PortfolioError::NothingToNormalize);
        }
        for holding in &mut self.holdings {
            holding.weight /= total;
        }
        self.notify();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn total_weight(&self) -> f64 {
        self.holdings.iter().map(Holding::weight).sum()
    }

    pub fn is_balanced(&self) -> bool {
        (self.total_weight() - 1.0).abs() < BALANCE_TOLERANCE
    }

    /// Submission gate. Returns the snapshot to send when the portfolio is acceptable.
    ///
    /// Checks, in order: every ticker is non-blank and at most [`MAX_TICKER_LEN`]
    /// characters, every weight is positive, and the weights are balanced.
    pub fn validate(&self) -> Result<Portfolio, ValidationError> {
        for (index, holding) in self.holdings.iter().enumerate() {
            let ticker = holding.ticker.trim();
            if ticker.is_empty() {
                return Err(ValidationError::EmptyTicker { index });
            }
            if ticker.chars().count() > MAX_TICKER_LEN {
                return Err(ValidationError::TickerTooLong {
                    ticker: ticker.to_string(),
                    max: MAX_TICKER_LEN,
                });
            }
            if holding.weight <= 0.0 {
                return Err(ValidationError::ZeroWeight {
                    ticker: ticker.to_string(),
                });
            }
        }

        if !self.is_balanced() {
            return Err(ValidationError::Unbalanced {
                total: self.total_weight(),
            });
        }

        Ok(self.snapshot())
    }

    fn check_index(&self, index: usize) -> Result<(), PortfolioError> {
        if index >= self.holdings.len() {
            return Err(PortfolioError::IndexOutOfRange {
                index,
                len: self.holdings.len(),
            });
        }
        Ok(())
    }
}

/// Clamp a weight into `[0, 1]`. NaN becomes 0.
pub fn clamp_weight(value: f64) -> f64 {
    if value.is_nan() || value <= 0.0 {
        0.0
    } else if value >= 1.0 {
        1.0
    } else {
        value
    }
}

/// Coerce raw weight input (a fraction, e.g. `"0.25"`) into `[0, 1]`.
///
/// The trimmed input must parse as a whole decimal number; anything else counts
/// as 0. Out-of-range numbers clamp to the nearest bound.
pub fn coerce_weight(raw: &str) -> f64 {
    clamp_weight(raw.trim().parse::<f64>().unwrap_or(0.0))
}

/// Coerce raw percentage input (e.g. `"25"` or `"25%"`) into a weight in `[0, 1]`.
pub fn coerce_percent(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    clamp_weight(number.parse::<f64>().unwrap_or(0.0) / 100.0)
}
