//! File-format collaborators for the reference pipeline: record files,
//! query manifests, and response sinks.
//!
//! The core treats these formats as opaque defaults, not contracts. A
//! record file is a header line followed by `lon,lat` CSV rows; a query
//! manifest holds one `<identifier> <threshold>` pair per line; a response
//! file lists matched record identifiers in result order. I/O and parse
//! failures are returned as [`GeodexError`]s; nothing is retried.

use crate::error::{GeodexError, Result};
use crate::types::{Point, Query, Record, Response};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Reads a record from disk: a header line, then one `lon,lat` row per
/// point. The record id is the path itself.
pub fn read_record(path: &Path) -> Result<Record> {
    let content = fs::read_to_string(path)?;
    let mut points = Vec::new();
    for (number, line) in content.lines().enumerate().skip(1) {
        let mut fields = line.split(',');
        let (Some(lon), Some(lat)) = (fields.next(), fields.next()) else {
            return Err(GeodexError::InvalidFormat(format!(
                "{}:{}: expected \"lon,lat\"",
                path.display(),
                number + 1
            )));
        };
        let lon: f64 = lon.trim().parse().map_err(|_| {
            GeodexError::InvalidFormat(format!(
                "{}:{}: invalid longitude {lon:?}",
                path.display(),
                number + 1
            ))
        })?;
        let lat: f64 = lat.trim().parse().map_err(|_| {
            GeodexError::InvalidFormat(format!(
                "{}:{}: invalid latitude {lat:?}",
                path.display(),
                number + 1
            ))
        })?;
        points.push(Point::new(lon, lat));
    }
    Ok(Record::new(path.display().to_string(), points))
}

/// Reads the records listed in a manifest, one record file name per line,
/// resolved relative to the manifest's directory.
pub fn read_dataset(path: &Path) -> Result<Vec<Record>> {
    let directory = path.parent().unwrap_or_else(|| Path::new(""));
    let content = fs::read_to_string(path)?;
    let mut records = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        records.push(read_record(&directory.join(line))?);
    }
    log::debug!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Reads a query manifest: one `<identifier> <threshold>` pair per line,
/// whitespace separated, the identifier resolved relative to the manifest's
/// directory. Query ids are the zero-based line indexes.
pub fn read_queries(path: &Path) -> Result<Vec<Query>> {
    let directory = path.parent().unwrap_or_else(|| Path::new(""));
    let content = fs::read_to_string(path)?;
    let mut queries = Vec::new();
    for (id, line) in content.lines().enumerate() {
        let mut fields = line.split_whitespace();
        let (Some(file), Some(threshold)) = (fields.next(), fields.next()) else {
            return Err(GeodexError::InvalidFormat(format!(
                "{}:{}: expected \"<identifier> <threshold>\"",
                path.display(),
                id + 1
            )));
        };
        let distance: f64 = threshold.parse().map_err(|_| {
            GeodexError::InvalidFormat(format!(
                "{}:{}: invalid threshold {threshold:?}",
                path.display(),
                id + 1
            ))
        })?;
        let record = read_record(&directory.join(file))?;
        queries.push(Query::new(id as u32, record, distance));
    }
    log::debug!("loaded {} queries from {}", queries.len(), path.display());
    Ok(queries)
}

/// Writes a response into `directory` as `response-{id:05}.txt`: one
/// matched record id per line, preserving the response's sort order.
pub fn write_response(directory: &Path, response: &Response) -> Result<()> {
    let name = format!("response-{:05}.txt", response.query.id);
    let file = fs::File::create(directory.join(name))?;
    let mut writer = BufWriter::new(file);
    for result in &response.results {
        writeln!(writer, "{}", result.record.id)?;
    }
    writer.flush()?;
    Ok(())
}
