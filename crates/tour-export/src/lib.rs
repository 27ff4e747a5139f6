#![deny(warnings)]

//! Presentation formats for forecast rows: CSV export/import and a plain
//! text table.
//!
//! Currency labels only ever appear in headers; cell values stay unlabeled
//! decimals so the CSV parses back into the same numbers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tour_core::{AllocationPolicy, ForecastRow};
use tracing::info;

/// File name offered for forecast downloads.
pub const DEFAULT_FILE_NAME: &str = "tour_sales_forecast.csv";

/// Number of columns in the forecast layout.
pub const COLUMNS: usize = 5;

/// Errors produced while writing or reading forecast CSV.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("expected 5 columns, found {0}")]
    ColumnCount(usize),
    #[error("row {row}: invalid {column} value {value:?}")]
    Parse {
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// How rows are labelled and formatted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Layout {
    /// Policy the rows were computed with; decides cell precision.
    pub policy: AllocationPolicy,
    /// Optional currency label for monetary headers, e.g. "£".
    pub currency: Option<String>,
}

impl Layout {
    pub fn new(policy: AllocationPolicy, currency: Option<String>) -> Self {
        Self { policy, currency }
    }

    /// Column headers, with the currency label folded into the money columns.
    pub fn headers(&self) -> [String; COLUMNS] {
        let money = |name: &str| match self.currency.as_deref() {
            Some(c) if !c.trim().is_empty() => format!("{name} ({}, Cumulative)", c.trim()),
            _ => format!("{name} (Cumulative)"),
        };
        [
            "Week".to_string(),
            "Week Start Date".to_string(),
            "Tickets Sold (Cumulative)".to_string(),
            money("Gross Revenue"),
            money("Net Profit/Loss"),
        ]
    }

    /// Ticket cell text: whole numbers stay whole, fractions keep full precision.
    pub fn format_tickets(&self, tickets: Decimal) -> String {
        tickets.normalize().to_string()
    }

    /// Money cell text: exactly two places under integer allocation.
    pub fn format_money(&self, amount: Decimal) -> String {
        if self.policy.rounds_money() {
            let mut v = amount.round_dp(2);
            if v.is_zero() {
                v.set_sign_positive(true);
            }
            v.rescale(2);
            v.to_string()
        } else {
            amount.normalize().to_string()
        }
    }

    fn cells(&self, r: &ForecastRow) -> [String; COLUMNS] {
        [
            r.week.to_string(),
            r.week_start_date.to_string(),
            self.format_tickets(r.cumulative_tickets),
            self.format_money(r.cumulative_gross_revenue),
            self.format_money(r.cumulative_net),
        ]
    }
}

/// Write rows as CSV (header first) to any writer.
pub fn write_csv(rows: &[ForecastRow], layout: &Layout, writer: impl Write) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(layout.headers())?;
    for r in rows {
        wtr.write_record(layout.cells(r))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render rows as an in-memory CSV document.
pub fn to_csv_string(rows: &[ForecastRow], layout: &Layout) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(rows, layout, &mut buf)?;
    // The csv writer only emits what we hand it, which is valid UTF-8.
    String::from_utf8(buf).map_err(|e| ExportError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Write rows to a CSV file at `path`.
pub fn export_csv(rows: &[ForecastRow], layout: &Layout, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_csv(rows, layout, io::BufWriter::new(file))?;
    info!(path = %path.display(), rows = rows.len(), "exported forecast csv");
    Ok(())
}

/// Parse forecast rows back from CSV produced by [`write_csv`].
///
/// Header labels are not checked beyond the column count, so files written
/// with any currency label are accepted.
pub fn read_csv(reader: impl Read) -> Result<Vec<ForecastRow>, ExportError> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(reader);
    let width = rdr.headers()?.len();
    if width != COLUMNS {
        return Err(ExportError::ColumnCount(width));
    }
    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let rec = record?;
        let row = i + 1;
        rows.push(ForecastRow {
            week: parse_cell(&rec, row, 0, "week")?,
            week_start_date: parse_cell::<NaiveDate>(&rec, row, 1, "week start date")?,
            cumulative_tickets: parse_cell(&rec, row, 2, "tickets")?,
            cumulative_gross_revenue: parse_cell(&rec, row, 3, "gross revenue")?,
            cumulative_net: parse_cell(&rec, row, 4, "net profit/loss")?,
        });
    }
    Ok(rows)
}

fn parse_cell<T: FromStr>(
    rec: &csv::StringRecord,
    row: usize,
    idx: usize,
    column: &'static str,
) -> Result<T, ExportError> {
    let raw = rec.get(idx).unwrap_or("").trim();
    raw.parse().map_err(|_| ExportError::Parse {
        row,
        column,
        value: raw.to_string(),
    })
}

/// Render rows as a right-aligned text table.
pub fn render_table(rows: &[ForecastRow], layout: &Layout) -> String {
    let headers = layout.headers();
    let body: Vec<[String; COLUMNS]> = rows.iter().map(|r| layout.cells(r)).collect();
    let mut widths = headers.clone().map(|h| h.chars().count());
    for cells in &body {
        for (w, c) in widths.iter_mut().zip(cells) {
            *w = (*w).max(c.chars().count());
        }
    }

    let mut out = String::new();
    let line = |cells: &[String; COLUMNS], out: &mut String| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:>w$}"))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    };
    line(&headers, &mut out);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for cells in &body {
        line(cells, &mut out);
    }
    out
}
