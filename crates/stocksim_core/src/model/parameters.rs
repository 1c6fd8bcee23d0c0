use std::ops::RangeInclusive;

use crate::error::ParameterError;

/// Accepted horizon in trading days (about ten trading years at the top end)
pub const DAYS_RANGE: RangeInclusive<u32> = 1..=2520;
/// Accepted number of Monte Carlo trials
pub const SIMULATIONS_RANGE: RangeInclusive<u32> = 100..=10_000;
/// Slider granularity for the simulation count
pub const SIMULATION_STEP: u32 = 100;

const DEFAULT_DAYS: u32 = 252;
const DEFAULT_SIMULATIONS: u32 = 1000;

/// Named investment horizons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizonPreset {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
}

impl HorizonPreset {
    pub const ALL: [HorizonPreset; 6] = [
        HorizonPreset::OneMonth,
        HorizonPreset::ThreeMonths,
        HorizonPreset::SixMonths,
        HorizonPreset::OneYear,
        HorizonPreset::TwoYears,
        HorizonPreset::FiveYears,
    ];

    pub fn days(&self) -> u32 {
        match self {
            HorizonPreset::OneMonth => 21,
            HorizonPreset::ThreeMonths => 63,
            HorizonPreset::SixMonths => 126,
            HorizonPreset::OneYear => 252,
            HorizonPreset::TwoYears => 504,
            HorizonPreset::FiveYears => 1260,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HorizonPreset::OneMonth => "1 Month",
            HorizonPreset::ThreeMonths => "3 Months",
            HorizonPreset::SixMonths => "6 Months",
            HorizonPreset::OneYear => "1 Year",
            HorizonPreset::TwoYears => "2 Years",
            HorizonPreset::FiveYears => "5 Years",
        }
    }
}

/// Named simulation counts, from a quick look to a precise run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationPreset {
    Quick,
    Standard,
    Detailed,
    Precise,
}

impl SimulationPreset {
    pub const ALL: [SimulationPreset; 4] = [
        SimulationPreset::Quick,
        SimulationPreset::Standard,
        SimulationPreset::Detailed,
        SimulationPreset::Precise,
    ];

    pub fn simulations(&self) -> u32 {
        match self {
            SimulationPreset::Quick => 100,
            SimulationPreset::Standard => 1000,
            SimulationPreset::Detailed => 5000,
            SimulationPreset::Precise => 10_000,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SimulationPreset::Quick => "Quick",
            SimulationPreset::Standard => "Standard",
            SimulationPreset::Detailed => "Detailed",
            SimulationPreset::Precise => "Precise",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Horizon(HorizonPreset),
    Simulations(SimulationPreset),
}

/// Horizon and trial count for one simulation request.
///
/// Both fields are always inside their ranges: the setters reject out-of-range
/// values with [`ParameterError::InvalidParameter`] and keep the previous value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationParameters {
    days: u32,
    simulations: u32,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            simulations: DEFAULT_SIMULATIONS,
        }
    }
}

impl SimulationParameters {
    pub fn new(days: u32, simulations: u32) -> Result<Self, ParameterError> {
        let mut params = Self::default();
        params.set_days(days)?;
        params.set_simulations(simulations)?;
        Ok(params)
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn simulations(&self) -> u32 {
        self.simulations
    }

    pub fn set_days(&mut self, days: u32) -> Result<(), ParameterError> {
        self.days = check_range("days", days, &DAYS_RANGE)?;
        Ok(())
    }

    pub fn set_simulations(&mut self, simulations: u32) -> Result<(), ParameterError> {
        self.simulations = check_range("simulations", simulations, &SIMULATIONS_RANGE)?;
        Ok(())
    }

    /// Direct horizon entry from a text field.
    ///
    /// Input that is not an integer resets the horizon to the 252-day default.
    /// Integers (including negative ones) are range-checked like [`set_days`](Self::set_days).
    pub fn set_days_from_input(&mut self, raw: &str) -> Result<(), ParameterError> {
        match raw.trim().parse::<i64>() {
            Ok(value) => {
                let days = u32::try_from(value).map_err(|_| invalid("days", value, &DAYS_RANGE))?;
                self.set_days(days)
            }
            Err(_) => {
                self.days = DEFAULT_DAYS;
                Ok(())
            }
        }
    }

    /// Move the simulation count by whole slider steps, stopping at the range ends.
    pub fn step_simulations(&mut self, steps: i32) {
        let target = self.simulations as i64 + steps as i64 * SIMULATION_STEP as i64;
        let clamped = target.clamp(
            *SIMULATIONS_RANGE.start() as i64,
            *SIMULATIONS_RANGE.end() as i64,
        );
        self.simulations = clamped as u32;
    }

    pub fn apply_preset(&mut self, preset: Preset) {
        match preset {
            Preset::Horizon(horizon) => self.days = horizon.days(),
            Preset::Simulations(count) => self.simulations = count.simulations(),
        }
    }

    pub fn active_horizon_preset(&self) -> Option<HorizonPreset> {
        HorizonPreset::ALL
            .into_iter()
            .find(|preset| preset.days() == self.days)
    }

    pub fn active_simulation_preset(&self) -> Option<SimulationPreset> {
        SimulationPreset::ALL
            .into_iter()
            .find(|preset| preset.simulations() == self.simulations)
    }

    /// Rough wall-clock estimate shown next to the run button (one second per thousand trials).
    pub fn estimated_seconds(&self) -> u32 {
        (self.simulations as f64 / 1000.0).round() as u32
    }
}

fn check_range(
    field: &'static str,
    value: u32,
    range: &RangeInclusive<u32>,
) -> Result<u32, ParameterError> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(invalid(field, value as i64, range))
    }
}

fn invalid(field: &'static str, value: i64, range: &RangeInclusive<u32>) -> ParameterError {
    ParameterError::InvalidParameter {
        field,
        value,
        min: *range.start(),
        max: *range.end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = SimulationParameters::default();
        assert_eq!(params.days(), 252);
        assert_eq!(params.simulations(), 1000);
        assert_eq!(params.active_horizon_preset(), Some(HorizonPreset::OneYear));
        assert_eq!(
            params.active_simulation_preset(),
            Some(SimulationPreset::Standard)
        );
    }

    #[test]
    fn test_set_days_bounds() {
        let mut params = SimulationParameters::default();
        assert!(params.set_days(1).is_ok());
        assert!(params.set_days(2520).is_ok());
        assert_eq!(
            params.set_days(0),
            Err(ParameterError::InvalidParameter {
                field: "days",
                value: 0,
                min: 1,
                max: 2520
            })
        );
        assert!(params.set_days(2521).is_err());
        assert_eq!(params.days(), 2520);
    }

    #[test]
    fn test_set_simulations_bounds() {
        let mut params = SimulationParameters::default();
        assert!(params.set_simulations(99).is_err());
        assert!(params.set_simulations(10_001).is_err());
        assert_eq!(params.simulations(), 1000);
        params.set_simulations(2_350).unwrap();
        assert_eq!(params.simulations(), 2_350);
        assert_eq!(params.active_simulation_preset(), None);
    }

    #[test]
    fn test_days_from_input() {
        let mut params = SimulationParameters::new(63, 100).unwrap();
        params.set_days_from_input(" 504 ").unwrap();
        assert_eq!(params.days(), 504);

        params.set_days_from_input("soon").unwrap();
        assert_eq!(params.days(), 252);

        params.set_days(21).unwrap();
        assert!(params.set_days_from_input("-5").is_err());
        assert!(params.set_days_from_input("9999").is_err());
        assert_eq!(params.days(), 21);
    }

    #[test]
    fn test_step_simulations_clamps() {
        let mut params = SimulationParameters::default();
        params.step_simulations(3);
        assert_eq!(params.simulations(), 1300);
        params.step_simulations(-100);
        assert_eq!(params.simulations(), 100);
        params.step_simulations(500);
        assert_eq!(params.simulations(), 10_000);
    }

    #[test]
    fn test_apply_preset() {
        let mut params = SimulationParameters::default();
        params.apply_preset(Preset::Horizon(HorizonPreset::FiveYears));
        params.apply_preset(Preset::Simulations(SimulationPreset::Detailed));
        assert_eq!(params.days(), 1260);
        assert_eq!(params.simulations(), 5000);
        assert_eq!(params.active_horizon_preset(), Some(HorizonPreset::FiveYears));
    }

    #[test]
    fn test_presets_are_in_range() {
        for preset in HorizonPreset::ALL {
            assert!(DAYS_RANGE.contains(&preset.days()), "{}", preset.label());
        }
        for preset in SimulationPreset::ALL {
            assert!(SIMULATIONS_RANGE.contains(&preset.simulations()));
        }
    }

    #[test]
    fn test_estimated_seconds() {
        assert_eq!(SimulationParameters::new(252, 100).unwrap().estimated_seconds(), 0);
        assert_eq!(SimulationParameters::new(252, 5000).unwrap().estimated_seconds(), 5);
        assert_eq!(SimulationParameters::new(252, 1500).unwrap().estimated_seconds(), 2);
    }
}
