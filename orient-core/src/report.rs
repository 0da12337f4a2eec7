/// Tabular records for export, one row per analysed file.
///
/// The column layout is consumed by spreadsheets downstream and must not
/// change: file, X, Y, Z, volume, surface area, overhang area, machines.
use std::io::{self, Write};

use serde::Serialize;

use crate::analysis::AnalysisResult;

/// Column titles, in export order.
pub const REPORT_HEADERS: [&str; 8] = [
    "File",
    "X (mm)",
    "Y (mm)",
    "Z (mm)",
    "Volume (mm³)",
    "Surface Area (mm²)",
    "Overhang Area (mm²)",
    "Best Fit Machine",
];

/// Written in place of the machine list when nothing fits.
pub const NO_MACHINE: &str = "None";

/// Round to 2 decimals, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One exported line; every number is already rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub file: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub volume: f64,
    pub surface_area: f64,
    pub overhang_area: f64,
    pub machines: String,
}

impl ReportRow {
    fn fields(&self) -> [String; 8] {
        [
            self.file.clone(),
            self.x.to_string(),
            self.y.to_string(),
            self.z.to_string(),
            self.volume.to_string(),
            self.surface_area.to_string(),
            self.overhang_area.to_string(),
            self.machines.clone(),
        ]
    }
}

impl From<&AnalysisResult> for ReportRow {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            file: result.file_name.clone(),
            x: round2(result.extents.x),
            y: round2(result.extents.y),
            z: round2(result.extents.z),
            volume: round2(result.volume),
            surface_area: round2(result.surface_area),
            overhang_area: round2(result.overhang_area),
            machines: result.machine_list(),
        }
    }
}

fn write_csv_line<W: Write>(writer: &mut W, fields: &[impl AsRef<str>]) -> io::Result<()> {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }
        let field = field.as_ref();
        if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
            write!(writer, "\"{}\"", field.replace('"', "\"\""))?;
        } else {
            writer.write_all(field.as_bytes())?;
        }
    }
    writer.write_all(b"\r\n")
}

/// Write a header line and one line per row, quoting where needed.
pub fn write_csv<W: Write>(rows: &[ReportRow], mut writer: W) -> io::Result<()> {
    write_csv_line(&mut writer, &REPORT_HEADERS[..])?;
    for row in rows {
        write_csv_line(&mut writer, &row.fields()[..])?;
    }
    writer.flush()
}

pub fn write_json<W: Write>(rows: &[ReportRow], mut writer: W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
