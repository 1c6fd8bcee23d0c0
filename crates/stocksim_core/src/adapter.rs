//! Validation of raw simulation responses.
//!
//! The service answers with loosely typed JSON. [`ResultsAdapter`] checks every
//! required field before building a [`SimulationResult`], so a malformed payload
//! never yields a half-filled result.

use serde_json::{Map, Value};

use crate::error::MalformedResult;
use crate::model::{SharpeRating, SimulationResult, classify_sharpe};

pub struct ResultsAdapter;

impl ResultsAdapter {
    /// Parse and validate a JSON response body.
    pub fn adapt_slice(body: &[u8]) -> Result<SimulationResult, MalformedResult> {
        let raw: Value = serde_json::from_slice(body)
            .map_err(|e| MalformedResult::InvalidJson(e.to_string()))?;
        Self::adapt(&raw)
    }

    /// Validate an already-parsed response.
    pub fn adapt(raw: &Value) -> Result<SimulationResult, MalformedResult> {
        let root = raw
            .as_object()
            .ok_or_else(|| MalformedResult::NotAnObject("response".into()))?;

        let expected_return = number(root, "expected_return")?;
        let volatility = number(root, "volatility")?;
        let sharpe_ratio = number(root, "sharpe_ratio")?;
        let var_95 = number(root, "var_95")?;

        let data = root
            .get("simulation_data")
            .ok_or_else(|| MalformedResult::MissingField("simulation_data".into()))?
            .as_object()
            .ok_or_else(|| MalformedResult::NotAnObject("simulation_data".into()))?;

        let final_values = number_list(
            list(data, "simulation_data.final_values", "final_values")?,
            "simulation_data.final_values",
        )?;
        let paths_sample = paths(list(data, "simulation_data.paths_sample", "paths_sample")?)?;

        Ok(SimulationResult::from_validated(
            expected_return,
            volatility,
            sharpe_ratio,
            var_95,
            final_values,
            paths_sample,
        ))
    }

    pub fn classify_sharpe(sharpe: f64) -> SharpeRating {
        classify_sharpe(sharpe)
    }
}

fn number(object: &Map<String, Value>, key: &str) -> Result<f64, MalformedResult> {
    object
        .get(key)
        .ok_or_else(|| MalformedResult::MissingField(key.to_string()))?
        .as_f64()
        .ok_or_else(|| MalformedResult::NotNumeric(key.to_string()))
}

fn list<'a>(
    object: &'a Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<&'a Vec<Value>, MalformedResult> {
    object
        .get(key)
        .ok_or_else(|| MalformedResult::MissingField(path.to_string()))?
        .as_array()
        .ok_or_else(|| MalformedResult::NotAList(path.to_string()))
}

fn number_list(values: &[Value], path: &str) -> Result<Vec<f64>, MalformedResult> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_f64()
                .ok_or_else(|| MalformedResult::NotNumeric(format!("{path}[{i}]")))
        })
        .collect()
}

fn paths(raw: &[Value]) -> Result<Vec<Vec<f64>>, MalformedResult> {
    if raw.is_empty() {
        return Err(MalformedResult::EmptyPaths);
    }

    let mut out = Vec::with_capacity(raw.len());
    let mut expected = None;
    for (index, entry) in raw.iter().enumerate() {
        let field = format!("simulation_data.paths_sample[{index}]");
        let points = entry
            .as_array()
            .ok_or_else(|| MalformedResult::NotAList(field.clone()))?;
        let path = number_list(points, &field)?;

        if path.is_empty() {
            return Err(MalformedResult::EmptyPath { index });
        }
        match expected {
            None => expected = Some(path.len()),
            Some(len) if len != path.len() => {
                return Err(MalformedResult::RaggedPaths {
                    index,
                    expected: len,
                    found: path.len(),
                });
            }
            Some(_) => {}
        }
        out.push(path);
    }
    Ok(out)
}
