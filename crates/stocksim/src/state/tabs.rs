/// Tab identifiers for the TUI application.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabId {
    Portfolio,
    Simulation,
    Results,
}

impl TabId {
    pub const ALL: [TabId; 3] = [TabId::Portfolio, TabId::Simulation, TabId::Results];

    pub fn name(&self) -> &'static str {
        match self {
            TabId::Portfolio => "Portfolio",
            TabId::Simulation => "Simulation",
            TabId::Results => "Results",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            TabId::Portfolio => 0,
            TabId::Simulation => 1,
            TabId::Results => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}
