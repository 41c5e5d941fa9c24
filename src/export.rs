use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::record::{Field, Record};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// Writes `records` to `path`, creating or truncating it.
    pub fn write(self, path: &Path, records: &[Record]) -> Result<()> {
        match self {
            ExportFormat::Csv => write_csv(path, records),
            ExportFormat::Json => write_json(path, records),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plain header line, then every value quoted. Absent fields become `""`.
fn write_csv(path: &Path, records: &[Record]) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    let header = Field::ALL.map(Field::as_str).join(",");
    writeln!(file, "{header}")?;

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(file);
    for record in records {
        writer.write_record(record.row())?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(path: &Path, records: &[Record]) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut file, records)?;
    file.flush()?;
    Ok(())
}
