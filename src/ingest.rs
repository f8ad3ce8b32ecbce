use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::info;

use crate::error::{DashboardError, Result};
use crate::models::{
    COHORT_COLUMN, GENDER_COLUMN, GRADE_COLUMN, HIGH_SCHOOL_COLUMN, INSTRUCTOR_COLUMN,
    PROGRAM_COLUMN, STUDENT_COLUMN, SUBJECT_COLUMN,
};
use crate::table::{Cell, Table};

pub fn read_path(path: &Path) -> Result<Table> {
    let name = source_name(path);
    let bytes = std::fs::read(path).map_err(|err| DashboardError::ingestion(&name, err))?;
    read_bytes(&name, &bytes)
}

/// Parses a workbook (first sheet) or a delimited export, whichever the payload is.
pub fn read_bytes(name: &str, bytes: &[u8]) -> Result<Table> {
    let (headers, rows) = if is_workbook(name, bytes) {
        read_workbook(name, bytes)?
    } else {
        read_delimited(name, bytes)?
    };

    let table = Table::new(headers, rows);
    info!(
        source = name,
        rows = table.len(),
        columns = table.columns().len(),
        "parsed records"
    );
    Ok(table)
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0";
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

fn is_workbook(name: &str, bytes: &[u8]) -> bool {
    if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
        return true;
    }
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.contains(&ext.as_str()))
}

type RawRows = (Vec<String>, Vec<Vec<Cell>>);

fn read_workbook(name: &str, bytes: &[u8]) -> Result<RawRows> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|err| DashboardError::ingestion(name, err))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DashboardError::ingestion(name, "workbook has no sheets"))?
        .map_err(|err| DashboardError::ingestion(name, err))?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .map(|row| {
            row.iter()
                .map(|data| cell_from_data(data).label().unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();
    if headers.iter().all(|header| header.trim().is_empty()) {
        return Err(DashboardError::ingestion(name, "no header row found"));
    }

    let rows = sheet_rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    Ok((headers, rows))
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Null,
        Data::String(text) => Cell::parse(text),
        Data::Float(value) => Cell::number(*value),
        Data::Int(value) => Cell::Number {
            value: *value as f64,
            raw: value.to_string(),
        },
        other => Cell::parse(&other.to_string()),
    }
}

/// Parses a delimited export (comma or semicolon) with a header row.
fn read_delimited(name: &str, bytes: &[u8]) -> Result<RawRows> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(bytes))
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|err| DashboardError::ingestion(name, err))?
        .iter()
        .map(|header| header.to_string())
        .collect();
    if headers.iter().all(|header| header.trim().is_empty()) {
        return Err(DashboardError::ingestion(name, "no header row found"));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| DashboardError::ingestion(name, err))?;
        rows.push(record.iter().map(Cell::parse).collect());
    }
    Ok((headers, rows))
}

pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let commas = header.iter().filter(|b| **b == b',').count();
    let semicolons = header.iter().filter(|b| **b == b';').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

const PROGRAMS: [&str; 6] = ["ISC", "IGE", "IIND", "IMEC", "ARQ", "CP"];
const HIGH_SCHOOLS: [&str; 8] = [
    "CBTIS 37", "COBACH 1", "CECYT 4", "CONALEP", "Prepa UAS", "CBTA 93", "COBACH 12",
    "Colegio Sinaloa",
];
const SUBJECTS: [&str; 7] = [
    "Calculo Diferencial",
    "Algebra Lineal",
    "Fisica",
    "Quimica",
    "Programacion",
    "Contabilidad",
    "Etica",
];
const INSTRUCTORS: [&str; 5] = ["Lopez", "Ramirez", "Soto", "Valdez", "Zamora"];
const GENDERS: [&str; 4] = ["H", "M", "Hombre", "Mujer"];

/// Writes a deterministic demo dataset: one row per student per enrolled subject.
pub fn write_sample(path: &Path, students: usize) -> anyhow::Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        STUDENT_COLUMN,
        COHORT_COLUMN,
        GENDER_COLUMN,
        PROGRAM_COLUMN,
        HIGH_SCHOOL_COLUMN,
        SUBJECT_COLUMN,
        INSTRUCTOR_COLUMN,
        GRADE_COLUMN,
    ])?;

    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move |bound: usize| {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((state >> 33) as usize) % bound
    };

    let mut written = 0usize;
    for student in 0..students {
        let control = format!("{:08}", 19_000_000 + student);
        let cohort = (2018 + next(7)).to_string();
        let gender = GENDERS[next(GENDERS.len())];
        let program = PROGRAMS[next(PROGRAMS.len())];
        let high_school = HIGH_SCHOOLS[next(HIGH_SCHOOLS.len())];

        for _ in 0..(2 + next(4)) {
            let subject = SUBJECTS[next(SUBJECTS.len())];
            let instructor = INSTRUCTORS[next(INSTRUCTORS.len())];
            let grade = match next(20) {
                0 => String::new(),
                1 => "NP".to_string(),
                _ => (40 + next(61)).to_string(),
            };
            writer.write_record([
                control.as_str(),
                cohort.as_str(),
                gender,
                program,
                high_school,
                subject,
                instructor,
                grade.as_str(),
            ])?;
            written += 1;
        }
    }

    writer.flush()?;
    Ok(written)
}
