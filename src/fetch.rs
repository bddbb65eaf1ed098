use crate::error::{Error, Result};
use crate::sources::{self, PopulationRecord, VaccinationRecord};
use tracing::{debug, info};

/// Blocking GET of a text resource. Anything but HTTP 200 fails.
pub fn fetch_text(url: &str) -> Result<String> {
    debug!(url, "fetching");
    let response = ureq::get(url).call().map_err(|e| match e {
        ureq::Error::Status(status, _) => Error::Status {
            url: url.to_string(),
            status,
        },
        other => Error::Transport {
            url: url.to_string(),
            source: Box::new(other),
        },
    })?;

    check_status(url, response.status())?;

    response.into_string().map_err(|source| Error::Body {
        url: url.to_string(),
        source,
    })
}

fn check_status(url: &str, status: u16) -> Result<()> {
    if status == 200 {
        Ok(())
    } else {
        Err(Error::Status {
            url: url.to_string(),
            status,
        })
    }
}

pub fn fetch_vaccinations(url: &str) -> Result<Vec<VaccinationRecord>> {
    let body = fetch_text(url)?;
    let rows = sources::parse_vaccinations(body.as_bytes(), url)?;
    info!(rows = rows.len(), "vaccination time series fetched");
    Ok(rows)
}

pub fn fetch_population(url: &str) -> Result<Vec<PopulationRecord>> {
    let body = fetch_text(url)?;
    let rows = sources::parse_population(body.as_bytes(), url)?;
    info!(rows = rows.len(), "population table fetched");
    Ok(rows)
}
