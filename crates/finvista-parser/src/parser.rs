//! Statement CSV parser implementation

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ParseError;
use crate::record::{IngestStats, ParseOutcome, StatementRecord, DEFAULT_CATEGORY};

/// Header names the export must carry, matched exactly after trimming
const POSTED_HEADER: &str = "Fecha contable";
const AMOUNT_HEADER: &str = "Importe";

/// One raw CSV row, keyed by the exact (trimmed) header names of the export.
///
/// The CSV layer cannot distinguish an empty cell from an absent column,
/// so column presence is checked against the header row instead.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRow {
    #[serde(rename = "Fecha contable")]
    posted: String,
    #[serde(rename = "Fecha valor")]
    value_date: String,
    #[serde(rename = "Concepto")]
    description: String,
    #[serde(rename = "Importe")]
    amount: String,
    #[serde(rename = "Moneda")]
    currency: String,
    #[serde(rename = "Saldo")]
    balance: String,
    #[serde(rename = "Concepto ampliado")]
    extended_description: String,
    #[serde(rename = "Categoria")]
    category: String,
    #[serde(rename = "Subcategoria")]
    subcategory: String,
    #[serde(rename = "cuenta")]
    account: String,
}

/// Line-based parser for `;`-delimited bank statement exports
pub struct StatementParser;

impl StatementParser {
    /// Parse raw statement text into normalized records.
    ///
    /// Row-level defects (missing required fields, unparseable posted dates,
    /// undecodable rows) are dropped and counted, never surfaced as errors.
    /// Only structural failures of the CSV layer itself return `Err`.
    pub fn parse(content: &str) -> Result<ParseOutcome, ParseError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(content.as_bytes());

        // Header problems are structural, not row-level
        let headers = rdr.headers()?.clone();
        let has_posted = headers.iter().any(|h| h == POSTED_HEADER);
        let has_amount = headers.iter().any(|h| h == AMOUNT_HEADER);
        if !has_posted || !has_amount {
            log::warn!("statement is missing the {:?} or {:?} column", POSTED_HEADER, AMOUNT_HEADER);
        }

        let mut records = Vec::new();
        let mut stats = IngestStats::default();

        for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
            // header occupies line 1
            let line = idx + 2;
            stats.rows_read += 1;

            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    stats.rows_malformed += 1;
                    log::warn!("line {}: undecodable row: {}", line, e);
                    continue;
                }
            };

            // Required: a posted date column with a non-empty cell and a
            // present amount column. An empty amount cell is fine and
            // resolves to 0.
            let posted_cell = row.posted.trim();
            if !has_posted || !has_amount || posted_cell.is_empty() {
                stats.rows_missing_fields += 1;
                continue;
            }

            let posted = match parse_date(posted_cell) {
                Some(date) => date,
                None => {
                    stats.rows_bad_date += 1;
                    log::warn!("line {}: unparseable posted date {:?}", line, posted_cell);
                    continue;
                }
            };

            records.push(StatementRecord {
                line,
                posted,
                value_date: parse_date(&row.value_date),
                description: trimmed(row.description),
                amount: parse_number(&row.amount),
                currency: trimmed(row.currency),
                balance: parse_number(&row.balance),
                extended_description: trimmed(row.extended_description),
                category: non_empty_or(row.category, DEFAULT_CATEGORY),
                subcategory: trimmed(row.subcategory),
                account: trimmed(row.account),
            });
        }

        // Most recent first; sort_by is stable so equal dates keep file order
        records.sort_by(|a, b| b.posted.cmp(&a.posted));

        log::debug!(
            "parsed {} records from {} rows ({} rejected)",
            records.len(),
            stats.rows_read,
            stats.rows_rejected()
        );

        Ok(ParseOutcome { records, stats })
    }
}

/// Parse a `DD/MM/YYYY` or `DD-MM-YYYY` date cell.
fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.contains('/') {
        NaiveDate::parse_from_str(cell, "%d/%m/%Y").ok()
    } else if cell.contains('-') {
        NaiveDate::parse_from_str(cell, "%d-%m-%Y").ok()
    } else {
        None
    }
}

/// Parse a comma-decimal number cell; empty or unparseable cells resolve to 0.
fn parse_number(cell: &str) -> Decimal {
    let cell = cell.trim();
    if cell.is_empty() {
        return Decimal::ZERO;
    }
    cell.replacen(',', ".", 1).parse().unwrap_or(Decimal::ZERO)
}

fn trimmed(cell: String) -> String {
    cell.trim().to_string()
}

fn non_empty_or(cell: String, fallback: &str) -> String {
    let value = trimmed(cell);
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Fecha contable;Fecha valor;Concepto;Importe;Moneda;Saldo;Concepto ampliado;Categoria;Subcategoria;cuenta";

    fn statement(rows: &[&str]) -> String {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn test_parse_well_formed_row() {
        let text = statement(&[
            "01-03-2024;02-03-2024;NOMINA MARZO;1000,50;EUR;2500,00;Transferencia nomina;Ingresos;Nomina;A",
        ]);
        let outcome = StatementParser::parse(&text).unwrap();
        assert_eq!(outcome.records.len(), 1);

        let rec = &outcome.records[0];
        assert_eq!(rec.posted, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(rec.value_date, NaiveDate::from_ymd_opt(2024, 3, 2));
        assert_eq!(rec.description, "NOMINA MARZO");
        assert_eq!(rec.amount, "1000.50".parse::<Decimal>().unwrap());
        assert_eq!(rec.currency, "EUR");
        assert_eq!(rec.balance, "2500.00".parse::<Decimal>().unwrap());
        assert_eq!(rec.category, "Ingresos");
        assert_eq!(rec.subcategory, "Nomina");
        assert_eq!(rec.account, "A");
        assert_eq!(rec.line, 2);
    }

    #[test]
    fn test_round_trip_count_and_order() {
        let text = statement(&[
            "05-01-2024;05-01-2024;A;1,00;EUR;10,00;;Cat;;A",
            "20-02-2024;20-02-2024;B;2,00;EUR;12,00;;Cat;;A",
            "10-01-2024;10-01-2024;C;3,00;EUR;15,00;;Cat;;A",
        ]);
        let outcome = StatementParser::parse(&text).unwrap();
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.stats.rows_read, 3);
        assert_eq!(outcome.stats.rows_rejected(), 0);

        let descriptions: Vec<&str> = outcome
            .records
            .iter()
            .map(|r| r.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_both_date_formats() {
        let text = statement(&[
            "01/03/2024;01/03/2024;slash;1,00;EUR;1,00;;;;A",
            "02-03-2024;02-03-2024;dash;1,00;EUR;1,00;;;;A",
        ]);
        let outcome = StatementParser::parse(&text).unwrap();
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(
            outcome.records[1].posted,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(
            outcome.records[0].posted,
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
    }

    #[test]
    fn test_empty_amount_cell_defaults_to_zero() {
        let text = statement(&["01-03-2024;01-03-2024;sin importe;;EUR;5,00;;;;A"]);
        let outcome = StatementParser::parse(&text).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].amount, Decimal::ZERO);
    }

    #[test]
    fn test_unparseable_number_defaults_to_zero() {
        let text = statement(&["01-03-2024;01-03-2024;raro;no es numero;EUR;x;;;;A"]);
        let outcome = StatementParser::parse(&text).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].amount, Decimal::ZERO);
        assert_eq!(outcome.records[0].balance, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_unparseable_posted_date() {
        let text = statement(&[
            "2024.03.01;01-03-2024;mala fecha;1,00;EUR;1,00;;;;A",
            "99-99-2024;01-03-2024;fecha invalida;1,00;EUR;1,00;;;;A",
            "01-03-2024;01-03-2024;buena;1,00;EUR;1,00;;;;A",
        ]);
        let outcome = StatementParser::parse(&text).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.stats.rows_bad_date, 2);
        assert_eq!(outcome.records[0].description, "buena");
    }

    #[test]
    fn test_rejects_missing_posted_date() {
        let text = statement(&[";01-03-2024;sin fecha;1,00;EUR;1,00;;;;A"]);
        let outcome = StatementParser::parse(&text).unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.stats.rows_missing_fields, 1);
    }

    #[test]
    fn test_missing_amount_column_rejects_all_rows() {
        let text = "Fecha contable;Concepto;cuenta\n01-03-2024;sin importe;A";
        let outcome = StatementParser::parse(text).unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.stats.rows_missing_fields, 1);
    }

    #[test]
    fn test_invalid_value_date_is_kept_as_none() {
        let text = statement(&["01-03-2024;no date;x;1,00;EUR;1,00;;;;A"]);
        let outcome = StatementParser::parse(&text).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].value_date, None);
    }

    #[test]
    fn test_category_defaults() {
        let text = statement(&["01-03-2024;01-03-2024;compra;-10,00;EUR;90,00;;;;A"]);
        let outcome = StatementParser::parse(&text).unwrap();
        assert_eq!(outcome.records[0].category, DEFAULT_CATEGORY);
        assert_eq!(outcome.records[0].subcategory, "");
    }

    #[test]
    fn test_header_padding_is_trimmed() {
        let text = " Fecha contable ; Fecha valor ; Concepto ; Importe ; Moneda ; Saldo ; Concepto ampliado ; Categoria ; Subcategoria ; cuenta \n01-03-2024;01-03-2024;pad;7,50;EUR;7,50;;;;A";
        let outcome = StatementParser::parse(text).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].amount, "7.5".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_fields_are_trimmed() {
        let text = statement(&["01-03-2024;01-03-2024;  spaced  ;1,00; EUR ;1,00;;  Ocio  ;;  B "]);
        let outcome = StatementParser::parse(&text).unwrap();
        let rec = &outcome.records[0];
        assert_eq!(rec.description, "spaced");
        assert_eq!(rec.currency, "EUR");
        assert_eq!(rec.category, "Ocio");
        assert_eq!(rec.account, "B");
    }

    #[test]
    fn test_empty_input_yields_no_records() {
        let outcome = StatementParser::parse("").unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.stats.rows_read, 0);
    }
}
