//! Joins the four sources into one row per vaccination record.

use crate::borders::BorderRecord;
use crate::error::{Error, Result};
use crate::sources::{LocationRecord, PopulationRecord, VaccinationRecord};
use crate::state::normalize_state_name;
use chrono::NaiveDate;
use geojson::Geometry;
use polars::prelude::*;
use std::collections::HashMap;
use tracing::warn;

/// Label of the countrywide aggregate at the top of the population table.
pub const NATIONAL_AGGREGATE: &str = "Malaysia";

const ROW: &str = "row";
const DATE: &str = "date";
const STATE: &str = "state";
const CUMUL_FULL: &str = "cumul_full";
const POP: &str = "pop";
const LAT: &str = "lat";
const LNG: &str = "lng";
const CAPITAL: &str = "capital";
const PERCENT: &str = "percent_vaccinated";

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    /// Seconds since the Unix epoch, UTC midnight.
    pub date: i64,
    pub state: String,
    /// Cumulative full vaccinations, in thousands.
    pub cumul_full: f64,
    pub pop: Option<f64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub geometry: Option<Geometry>,
    pub percent_vaccinated: Option<f64>,
}

/// States that lost a column to a failed join.
#[derive(Debug, Default, PartialEq)]
pub struct Unmatched {
    pub population: Vec<String>,
    pub location: Vec<String>,
    pub geometry: Vec<String>,
}

impl Unmatched {
    pub fn is_empty(&self) -> bool {
        self.population.is_empty() && self.location.is_empty() && self.geometry.is_empty()
    }
}

pub fn merge(
    vaccinations: &[VaccinationRecord],
    population: &[PopulationRecord],
    locations: &[LocationRecord],
    borders: &[BorderRecord],
) -> Result<Vec<JoinedRow>> {
    let vax = vaccination_frame(vaccinations)?;
    let pop = population_frame(population)?;
    let capitals = capital_frame(locations)?;

    let joined = vax
        .join(&pop, [STATE], [STATE], JoinType::Left.into())?
        .join(&capitals, [STATE], [STATE], JoinType::Left.into())?;

    // Both expressions read the raw count, so the percentage is unscaled.
    let joined = joined
        .lazy()
        .with_columns([
            (col(CUMUL_FULL) / col(POP)).alias(PERCENT),
            (col(CUMUL_FULL) / lit(1000.0)).alias(CUMUL_FULL),
        ])
        .collect()?;

    let mut geometry_by_state: HashMap<String, &Geometry> = HashMap::new();
    for border in borders {
        geometry_by_state
            .entry(normalize_state_name(&border.name))
            .or_insert(&border.geometry);
    }

    rows_from_frame(&joined, vaccinations.len(), &geometry_by_state)
}

/// `{row, date, state, cumul_full}` with normalized names and epoch dates.
fn vaccination_frame(vaccinations: &[VaccinationRecord]) -> Result<DataFrame> {
    let rows: Vec<u32> = (0..vaccinations.len() as u32).collect();
    let dates = vaccinations
        .iter()
        .map(|r| epoch_seconds(r.date))
        .collect::<Result<Vec<i64>>>()?;
    let states: Vec<String> = vaccinations
        .iter()
        .map(|r| normalize_state_name(&r.state))
        .collect();
    let counts: Vec<f64> = vaccinations.iter().map(|r| r.cumul_full).collect();

    Ok(DataFrame::new(vec![
        Series::new(ROW, rows),
        Series::new(DATE, dates),
        Series::new(STATE, states),
        Series::new(CUMUL_FULL, counts),
    ])?)
}

/// `{state, pop}` without the leading aggregate row, one row per state.
fn population_frame(population: &[PopulationRecord]) -> Result<DataFrame> {
    if let Some(first) = population.first() {
        if first.state.trim() != NATIONAL_AGGREGATE {
            warn!(state = %first.state, "dropping first population row, which is not the national aggregate");
        }
    }

    let states: Vec<String> = population
        .iter()
        .map(|r| normalize_state_name(&r.state))
        .collect();
    let pops: Vec<Option<f64>> = population.iter().map(|r| r.pop).collect();
    let df = DataFrame::new(vec![Series::new(STATE, states), Series::new(POP, pops)])?;

    let df = df.slice(1, df.height());
    Ok(df.unique_stable(Some(&[STATE.to_string()][..]), UniqueKeepStrategy::First, None)?)
}

/// `{state, lat, lng}` for admin and primary capitals, first one per state.
fn capital_frame(locations: &[LocationRecord]) -> Result<DataFrame> {
    let states: Vec<String> = locations
        .iter()
        .map(|r| normalize_state_name(&r.admin_name))
        .collect();
    let lats: Vec<f64> = locations.iter().map(|r| r.lat).collect();
    let lngs: Vec<f64> = locations.iter().map(|r| r.lng).collect();
    let capitals: Vec<String> = locations.iter().map(|r| r.capital.clone()).collect();
    let df = DataFrame::new(vec![
        Series::new(STATE, states),
        Series::new(LAT, lats),
        Series::new(LNG, lngs),
        Series::new(CAPITAL, capitals),
    ])?;

    let capital = df.column(CAPITAL)?.str()?;
    let mask = capital.equal("admin") | capital.equal("primary");
    let df = df.filter(&mask)?.select([STATE, LAT, LNG])?;
    Ok(df.unique_stable(Some(&[STATE.to_string()][..]), UniqueKeepStrategy::First, None)?)
}

/// Back to typed rows, in the vaccination table's original order.
fn rows_from_frame(
    df: &DataFrame,
    expected: usize,
    geometry_by_state: &HashMap<String, &Geometry>,
) -> Result<Vec<JoinedRow>> {
    let rows = df.column(ROW)?.u32()?;
    let dates = df.column(DATE)?.i64()?;
    let states = df.column(STATE)?.str()?;
    let counts = df.column(CUMUL_FULL)?.f64()?;
    let pops = df.column(POP)?.f64()?;
    let lats = df.column(LAT)?.f64()?;
    let lngs = df.column(LNG)?.f64()?;
    let percents = df.column(PERCENT)?.f64()?;

    let mut out: Vec<Option<JoinedRow>> = (0..expected).map(|_| None).collect();
    for i in 0..df.height() {
        let (Some(row), Some(date)) = (rows.get(i), dates.get(i)) else {
            continue;
        };
        let state = states.get(i).unwrap_or_default().to_string();
        let geometry = geometry_by_state.get(&state).map(|g| (*g).clone());
        let joined = JoinedRow {
            date,
            cumul_full: counts.get(i).unwrap_or(f64::NAN),
            pop: pops.get(i),
            lat: lats.get(i),
            lng: lngs.get(i),
            geometry,
            // Null or zero population leaves the percentage empty.
            percent_vaccinated: percents.get(i).filter(|p| p.is_finite()),
            state,
        };
        if let Some(slot) = out.get_mut(row as usize) {
            slot.get_or_insert(joined);
        }
    }
    Ok(out.into_iter().flatten().collect())
}

pub fn epoch_seconds(date: NaiveDate) -> Result<i64> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| Error::Date(date.to_string()))
}

/// Distinct states, in first-appearance order, missing each joined column.
pub fn unmatched_states(rows: &[JoinedRow]) -> Unmatched {
    fn push(list: &mut Vec<String>, state: &str) {
        if !list.iter().any(|s| s == state) {
            list.push(state.to_string());
        }
    }

    let mut unmatched = Unmatched::default();
    for row in rows {
        if row.pop.is_none() {
            push(&mut unmatched.population, &row.state);
        }
        if row.lat.is_none() || row.lng.is_none() {
            push(&mut unmatched.location, &row.state);
        }
        if row.geometry.is_none() {
            push(&mut unmatched.geometry, &row.state);
        }
    }
    unmatched
}
