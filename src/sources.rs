//! Typed rows for the tabular inputs and their CSV readers.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One state's cumulative full vaccinations on one day.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VaccinationRecord {
    #[serde(with = "ymd_date_format")]
    pub date: NaiveDate,
    pub state: String,
    pub cumul_full: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopulationRecord {
    pub state: String,
    pub pop: Option<f64>,
}

/// A city row; only administrative and primary capitals are used for markers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationRecord {
    pub admin_name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub capital: String,
}

impl LocationRecord {
    pub fn is_state_capital(&self) -> bool {
        matches!(self.capital.as_str(), "admin" | "primary")
    }
}

mod ymd_date_format {
    use serde::{self, Deserialize, Deserializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn deserialize<'de, D>(deserializer: D) -> Result<chrono::NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        chrono::NaiveDate::parse_from_str(s.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}

fn parse_csv<T, R>(reader: R, origin: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    rdr.deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|source| Error::Csv {
            origin: origin.to_string(),
            source,
        })
}

pub fn parse_vaccinations<R: Read>(reader: R, origin: &str) -> Result<Vec<VaccinationRecord>> {
    parse_csv(reader, origin)
}

pub fn parse_population<R: Read>(reader: R, origin: &str) -> Result<Vec<PopulationRecord>> {
    parse_csv(reader, origin)
}

pub fn parse_locations<R: Read>(reader: R, origin: &str) -> Result<Vec<LocationRecord>> {
    parse_csv(reader, origin)
}

/// Read the local city/state coordinates file.
pub fn read_locations(path: &Path) -> Result<Vec<LocationRecord>> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_locations(file, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VAX_CSV: &str = "\
date,state,daily_partial,daily_full,cumul_partial,cumul_full
2021-08-01,Johor,100,50,2000,1500
2021-08-01,W.P. Labuan,10,5,200,150
";

    #[test]
    fn vaccinations_keep_needed_columns() {
        let rows = parse_vaccinations(VAX_CSV.as_bytes(), "test").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2021, 8, 1).unwrap());
        assert_eq!(rows[0].state, "Johor");
        assert_eq!(rows[0].cumul_full, 1500.0);
        assert_eq!(rows[1].state, "W.P. Labuan");
    }

    #[test]
    fn bad_date_fails() {
        let csv = "date,state,cumul_full\n01/08/2021,Johor,10\n";
        let err = parse_vaccinations(csv.as_bytes(), "vax").unwrap_err();
        assert!(matches!(err, Error::Csv { ref origin, .. } if origin == "vax"));
    }

    #[test]
    fn non_numeric_count_fails() {
        let csv = "date,state,cumul_full\n2021-08-01,Johor,lots\n";
        assert!(parse_vaccinations(csv.as_bytes(), "vax").is_err());
    }

    #[test]
    fn empty_population_is_missing() {
        let csv = "state,idxs,pop\nMalaysia,0,32657400\nPerlis,9,\n";
        let rows = parse_population(csv.as_bytes(), "pop").unwrap();
        assert_eq!(rows[0].pop, Some(32_657_400.0));
        assert_eq!(rows[1].pop, None);
    }

    #[test]
    fn capitals_are_recognized() {
        let csv = "\
city,lat,lng,country,admin_name,capital
Kuala Lumpur,3.1478,101.6953,Malaysia,Kuala Lumpur,primary
Shah Alam,3.0733,101.5185,Malaysia,Selangor,admin
Klang,3.0333,101.4500,Malaysia,Selangor,
";
        let rows = parse_locations(csv.as_bytes(), "geo").unwrap();
        let capitals: Vec<_> = rows.iter().filter(|r| r.is_state_capital()).collect();
        assert_eq!(capitals.len(), 2);
        assert_eq!(capitals[1].admin_name, "Selangor");
    }

    #[test]
    fn missing_locations_file_fails() {
        let err = read_locations(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
