// Reading the electoral results table.

use std::io::Read;

use csv::ReaderBuilder;
use log::debug;
use snafu::prelude::*;

use circuit_tally::VoteRecord;

use crate::pipeline::*;

pub const DISTRICT_COLUMN: &str = "circuito_id";
pub const OFFICE_COLUMN: &str = "cargo_nombre";
pub const PARTY_COLUMN: &str = "agrupacion_nombre";
pub const COUNT_COLUMN: &str = "votos_cantidad";

/// Reads the vote table from a path, going through the archive layer when
/// the input is zipped.
pub fn read_votes_path(
    path: &str,
    entry: Option<&str>,
    limit: Option<usize>,
) -> MapResult<Vec<VoteRecord>> {
    if io_archive::is_archive(path) {
        let bytes = io_archive::read_archive_entry_path(path, entry, ".csv")?;
        read_votes(bytes.as_slice(), path, limit)
    } else {
        let rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .context(CsvOpenSnafu { path })?;
        read_votes_records(rdr, path, limit)
    }
}

pub fn read_votes<R: Read>(input: R, path: &str, limit: Option<usize>) -> MapResult<Vec<VoteRecord>> {
    let rdr = ReaderBuilder::new().has_headers(true).from_reader(input);
    read_votes_records(rdr, path, limit)
}

fn read_votes_records<R: Read>(
    mut rdr: csv::Reader<R>,
    path: &str,
    limit: Option<usize>,
) -> MapResult<Vec<VoteRecord>> {
    let headers = rdr.headers().context(CsvOpenSnafu { path })?.clone();
    debug!("read_votes_records: header: {:?}", headers);
    let (district_idx, office_idx, party_idx, count_idx) = resolve_columns(&headers, path)?;

    let mut res: Vec<VoteRecord> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        if let Some(max) = limit {
            if res.len() >= max {
                debug!("read_votes_records: stopping after {} rows", max);
                break;
            }
        }
        // The header occupies line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let district_id = get_field(&line, district_idx, DISTRICT_COLUMN, lineno)?;
        let office_name = get_field(&line, office_idx, OFFICE_COLUMN, lineno)?;
        let party_name = get_field(&line, party_idx, PARTY_COLUMN, lineno)?;
        let raw_count = get_field(&line, count_idx, COUNT_COLUMN, lineno)?;
        let vote_count = parse_count(&raw_count, lineno)?;
        res.push(VoteRecord {
            district_id,
            office_name,
            party_name,
            vote_count,
        });
    }
    Ok(res)
}

fn resolve_columns(
    headers: &csv::StringRecord,
    path: &str,
) -> MapResult<(usize, usize, usize, usize)> {
    let mut missing: Vec<String> = Vec::new();
    let mut find = |name: &str| match headers.iter().position(|h| h == name) {
        Some(idx) => idx,
        None => {
            missing.push(name.to_string());
            usize::MAX
        }
    };
    let district = find(DISTRICT_COLUMN);
    let office = find(OFFICE_COLUMN);
    let party = find(PARTY_COLUMN);
    let count = find(COUNT_COLUMN);
    ensure!(missing.is_empty(), VotesSchemaMismatchSnafu { path, missing });
    Ok((district, office, party, count))
}

fn get_field(
    line: &csv::StringRecord,
    idx: usize,
    column: &str,
    lineno: usize,
) -> MapResult<String> {
    line.get(idx)
        .map(|s| s.trim().to_string())
        .context(CsvLineTooShortSnafu { lineno, column })
}

/// Counts are integers in the published tables, but some exports render them
/// as floats with a zero fractional part.
fn parse_count(value: &str, lineno: usize) -> MapResult<u64> {
    if let Ok(n) = value.parse::<u64>() {
        return Ok(n);
    }
    match value.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
        _ => BadVoteCountSnafu { value, lineno }.fail(),
    }
}
