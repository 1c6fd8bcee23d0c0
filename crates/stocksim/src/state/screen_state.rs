/// Per-screen state structs.

use stocksim_core::HoldingField;

/// In-progress text entry for one holding field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEditor {
    pub field: HoldingField,
    pub buffer: String,
}

impl FieldEditor {
    pub fn new(field: HoldingField, initial: impl Into<String>) -> Self {
        Self {
            field,
            buffer: initial.into(),
        }
    }

    pub fn push(&mut self, c: char) {
        match self.field {
            HoldingField::Ticker => {
                // Tickers are stored upper-case and have no spaces
                if !c.is_whitespace() {
                    self.buffer.extend(c.to_uppercase());
                }
            }
            HoldingField::Weight => {
                if c.is_ascii_digit() || matches!(c, '.' | '%' | '-') {
                    self.buffer.push(c);
                }
            }
            HoldingField::Name => self.buffer.push(c),
        }
    }

    pub fn pop(&mut self) {
        self.buffer.pop();
    }
}

#[derive(Debug, Default)]
pub struct PortfolioState {
    pub selected_index: usize,
    pub editor: Option<FieldEditor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulationField {
    #[default]
    Horizon,
    Days,
    SimulationPreset,
    Simulations,
}

impl SimulationField {
    pub const ALL: [SimulationField; 4] = [
        SimulationField::Horizon,
        SimulationField::Days,
        SimulationField::SimulationPreset,
        SimulationField::Simulations,
    ];

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Default)]
pub struct SimulationState {
    pub focused_field: SimulationField,
    /// Text typed into the days field, while it is being edited
    pub days_input: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultsView {
    #[default]
    Overview,
    Distribution,
    Paths,
    RiskReturn,
}

impl ResultsView {
    pub const ALL: [ResultsView; 4] = [
        ResultsView::Overview,
        ResultsView::Distribution,
        ResultsView::Paths,
        ResultsView::RiskReturn,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResultsView::Overview => "Overview",
            ResultsView::Distribution => "Distribution",
            ResultsView::Paths => "Paths",
            ResultsView::RiskReturn => "Risk / Return",
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Default)]
pub struct ResultsState {
    pub view: ResultsView,
}
