//! Dataset preparation for the Aids2 export.
//!
//! This module owns the raw source layout (header names, code vocabularies),
//! the fixed code→label lookup tables, the cleaned [`Record`] type, and
//! [`prepare()`] which converts raw string rows into records. The cleaned
//! table is built once at startup and never mutated afterwards; everything
//! downstream borrows it.
//!
//! The source file is the classic Aids2 CSV export: a leading unnamed
//! running-index column followed by `state,sex,diag,death,status,T.categ,age`.
//! Dates are day offsets on the study's shared timeline.

use std::path::Path;

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::info;

use crate::{error::DataFormatError, io_utils};

/// Day offset recorded as `date_of_death` for patients still alive at the
/// study cutoff (1992-07-01 on the dataset's timeline). Also the last day on
/// which actual deaths were recorded, so censoring is decided by `status`,
/// not by this value alone.
pub const STUDY_CUTOFF_DAY: i64 = 11504;

const COL_REGION: &str = "state";
const COL_SEX: &str = "sex";
const COL_DIAGNOSIS: &str = "diag";
const COL_DEATH: &str = "death";
const COL_STATUS: &str = "status";
const COL_TRANSMISSION: &str = "T.categ";
const COL_AGE: &str = "age";

/// Geographic reporting regions of the study. The source collapses every
/// state outside New South Wales, Queensland, and Victoria into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    NewSouthWales,
    Queensland,
    Victoria,
    Others,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::NewSouthWales,
        Region::Queensland,
        Region::Victoria,
        Region::Others,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "NSW" => Some(Region::NewSouthWales),
            "QLD" => Some(Region::Queensland),
            "VIC" => Some(Region::Victoria),
            "Other" => Some(Region::Others),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Region::NewSouthWales => "New South Wales",
            Region::Queensland => "Queensland",
            Region::Victoria => "Victoria",
            Region::Others => "Others",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Sex::Male),
            "F" => Some(Sex::Female),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Alive,
    Deceased,
}

impl Status {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(Status::Alive),
            "D" => Some(Status::Deceased),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Alive => "alive",
            Status::Deceased => "deceased",
        }
    }
}

/// Reported mode of transmission, de-abbreviated per the study's codebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transmission {
    HomosexualContact,
    HomosexualIdu,
    Idu,
    Heterosexual,
    Haemophilia,
    BloodProduct,
    Mother,
    OtherUnknown,
}

impl Transmission {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "hs" => Some(Transmission::HomosexualContact),
            "hsid" => Some(Transmission::HomosexualIdu),
            "id" => Some(Transmission::Idu),
            "het" => Some(Transmission::Heterosexual),
            "haem" => Some(Transmission::Haemophilia),
            "blood" => Some(Transmission::BloodProduct),
            "mother" => Some(Transmission::Mother),
            "other" => Some(Transmission::OtherUnknown),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Transmission::HomosexualContact => "male homosexual/bisexual contact",
            Transmission::HomosexualIdu => {
                "male homosexual/bisexual intravenous drug user"
            }
            Transmission::Idu => "female or heterosexual male intravenous drug user",
            Transmission::Heterosexual => "heterosexual contact",
            Transmission::Haemophilia => "haemophilia/coagulation disorder",
            Transmission::BloodProduct => "receipt of blood, blood components or tissue",
            Transmission::Mother => "mother with or at risk of HIV infection",
            Transmission::OtherUnknown => "other/unknown",
        }
    }
}

/// One cleaned row of the study table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub region: Region,
    pub sex: Sex,
    pub date_of_diagnosis: i64,
    pub date_of_death: i64,
    /// Always `date_of_death - date_of_diagnosis`, sentinel rows included;
    /// only semantically valid for deceased records.
    pub days_after_diagnosis: i64,
    pub status: Status,
    pub transmission_mode: Transmission,
    pub age_at_diagnosis: i64,
}

impl Record {
    /// True when the recorded death date is the study-cutoff sentinel rather
    /// than an actual death.
    pub fn death_is_censored(&self) -> bool {
        self.status == Status::Alive && self.date_of_death == STUDY_CUTOFF_DAY
    }

    /// Fixed display column order. Presentation only; carries no semantics.
    pub fn display_headers() -> Vec<String> {
        [
            "region",
            "sex",
            "date_of_diagnosis",
            "date_of_death",
            "days_after_diagnosis",
            "status",
            "transmission_mode",
            "age_at_diagnosis",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect()
    }

    pub fn display_row(&self) -> Vec<String> {
        vec![
            self.region.label().to_string(),
            self.sex.code().to_string(),
            self.date_of_diagnosis.to_string(),
            self.date_of_death.to_string(),
            self.days_after_diagnosis.to_string(),
            self.status.label().to_string(),
            self.transmission_mode.label().to_string(),
            self.age_at_diagnosis.to_string(),
        ]
    }
}

struct SourceColumns {
    region: usize,
    sex: usize,
    diagnosis: usize,
    death: usize,
    status: usize,
    transmission: usize,
    age: usize,
}

impl SourceColumns {
    fn resolve(headers: &[String]) -> Result<Self, DataFormatError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(DataFormatError::MissingColumn(name))
        };
        // Resolving by name also discards the unnamed running-index column
        // some exports carry as their first field.
        Ok(SourceColumns {
            region: find(COL_REGION)?,
            sex: find(COL_SEX)?,
            diagnosis: find(COL_DIAGNOSIS)?,
            death: find(COL_DEATH)?,
            status: find(COL_STATUS)?,
            transmission: find(COL_TRANSMISSION)?,
            age: find(COL_AGE)?,
        })
    }

    fn width(&self) -> usize {
        [
            self.region,
            self.sex,
            self.diagnosis,
            self.death,
            self.status,
            self.transmission,
            self.age,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

/// Converts raw string rows into cleaned records.
///
/// Pure: the input is not mutated and no I/O happens here. Row numbers in
/// errors are file line numbers, counting the header as line 1.
pub fn prepare(headers: &[String], rows: &[Vec<String>]) -> Result<Vec<Record>, DataFormatError> {
    let columns = SourceColumns::resolve(headers)?;
    let width = columns.width();
    let mut records = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let line = idx + 2;
        if row.len() < width {
            return Err(DataFormatError::ShortRow {
                row: line,
                expected: width,
                found: row.len(),
            });
        }
        records.push(parse_record(&columns, row, line)?);
    }
    Ok(records)
}

fn parse_record(
    columns: &SourceColumns,
    row: &[String],
    line: usize,
) -> Result<Record, DataFormatError> {
    let region_code = row[columns.region].trim();
    let region =
        Region::from_code(region_code).ok_or_else(|| unmapped(line, "region", region_code))?;
    let sex_code = row[columns.sex].trim();
    let sex = Sex::from_code(sex_code).ok_or_else(|| unmapped(line, "sex", sex_code))?;
    let status_code = row[columns.status].trim();
    let status =
        Status::from_code(status_code).ok_or_else(|| unmapped(line, "status", status_code))?;
    let transmission_code = row[columns.transmission].trim();
    let transmission_mode = Transmission::from_code(transmission_code)
        .ok_or_else(|| unmapped(line, "transmission mode", transmission_code))?;

    let date_of_diagnosis = parse_day(line, "date of diagnosis", &row[columns.diagnosis])?;
    let date_of_death = parse_day(line, "date of death", &row[columns.death])?;
    let age_at_diagnosis = parse_day(line, "age at diagnosis", &row[columns.age])?;

    Ok(Record {
        region,
        sex,
        date_of_diagnosis,
        date_of_death,
        days_after_diagnosis: date_of_death - date_of_diagnosis,
        status,
        transmission_mode,
        age_at_diagnosis,
    })
}

fn unmapped(row: usize, field: &'static str, code: &str) -> DataFormatError {
    DataFormatError::UnmappedCode {
        row,
        field,
        code: code.to_string(),
    }
}

fn parse_day(row: usize, field: &'static str, value: &str) -> Result<i64, DataFormatError> {
    value
        .trim()
        .parse()
        .map_err(|_| DataFormatError::InvalidNumber {
            row,
            field,
            value: value.trim().to_string(),
        })
}

/// Reads a CSV file (or stdin via `-`) and prepares the cleaned table.
pub fn load_records(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<Vec<Record>> {
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)?;
    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        rows.push(io_utils::decode_record(&record, encoding)?);
    }
    let records =
        prepare(&headers, &rows).with_context(|| format!("Preparing dataset from {path:?}"))?;
    info!("Loaded {} record(s) from {:?}", records.len(), path);
    Ok(records)
}
