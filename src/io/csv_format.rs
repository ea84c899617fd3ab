//! CSV format handling for customer input and results output
//!
//! This module centralizes all delimited-text concerns, providing:
//! - Parsing of raw input text into a validated [`Batch`]
//! - Serialization of finished records into the results report
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{Batch, CustomerRecord, FormatError, InputMode, RecordId, SenderError};
use chrono::SecondsFormat;
use csv::{ReaderBuilder, StringRecord, Terminator, Trim, Writer, WriterBuilder};
use rust_decimal::Decimal;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Header of the results report
pub const RESULTS_HEADER: [&str; 6] = ["name", "phone", "invoice", "status", "timestamp", "message"];

/// Column positions for one input mode, resolved from the header row
#[derive(Debug, Clone, Copy)]
enum RowShape {
    Invoice {
        name: usize,
        phone: usize,
        amount: usize,
        invoice: usize,
    },
    Document {
        name: usize,
        phone: usize,
        pdf: usize,
    },
}

impl RowShape {
    fn locate(mode: InputMode, headers: &[String]) -> Option<Self> {
        let position = |column: &str| headers.iter().position(|h| h == column);
        match mode {
            InputMode::Invoice => Some(RowShape::Invoice {
                name: position(mode.name_column())?,
                phone: position(mode.phone_column())?,
                amount: position("amount")?,
                invoice: position("invoice")?,
            }),
            InputMode::Document => Some(RowShape::Document {
                name: position(mode.name_column())?,
                phone: position(mode.phone_column())?,
                pdf: position("pdf filename")?,
            }),
        }
    }

    /// Build a record from a row, or `None` if a mandatory field is empty
    fn shape(&self, id: RecordId, row: &StringRecord) -> Option<CustomerRecord> {
        let field = |index: usize| row.get(index).unwrap_or_default();
        match *self {
            RowShape::Invoice {
                name,
                phone,
                amount,
                invoice,
            } => {
                let (name, phone) = mandatory(field(name), field(phone))?;
                let invoice = field(invoice);
                let amount = parse_amount(field(amount));
                Some(
                    CustomerRecord::new(
                        id,
                        InputMode::Invoice,
                        name,
                        phone,
                        invoice,
                        format!("{}.pdf", invoice),
                    )
                    .with_amount(amount),
                )
            }
            RowShape::Document { name, phone, pdf } => {
                let (name, phone) = mandatory(field(name), field(phone))?;
                let pdf = field(pdf);
                let stem = Path::new(pdf)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| pdf.to_string());
                Some(CustomerRecord::new(
                    id,
                    InputMode::Document,
                    name,
                    phone,
                    stem,
                    pdf,
                ))
            }
        }
    }
}

fn mandatory<'a>(name: &'a str, phone: &'a str) -> Option<(&'a str, &'a str)> {
    if name.is_empty() || phone.is_empty() {
        None
    } else {
        Some((name, phone))
    }
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    if raw.is_empty() {
        return None;
    }
    match Decimal::from_str(raw) {
        Ok(amount) => Some(amount),
        Err(_) => {
            debug!(amount = raw, "ignoring unparseable amount");
            None
        }
    }
}

/// Whether a line ends inside a quoted field
///
/// A quote opens a quoted field only at the start of a field; elsewhere it is
/// a literal character. Inside a quoted field `""` is an escaped quote.
fn has_unterminated_quote(line: &str) -> bool {
    let mut in_quotes = false;
    let mut field_start = true;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' && chars.next_if_eq(&'"').is_none() {
                in_quotes = false;
            }
            continue;
        }
        match c {
            ',' => {
                field_start = true;
                continue;
            }
            '"' if field_start => in_quotes = true,
            _ => {}
        }
        field_start = false;
    }
    in_quotes
}

/// Parse raw delimited text into a batch of customer records
///
/// The first non-empty line is the header: comma-separated, case-insensitive
/// and whitespace-trimmed. The input mode is inferred from which required
/// column set the header contains.
///
/// Rows whose field count differs from the header, or whose name or phone is
/// empty after trimming, are dropped without failing the parse. Every
/// surviving row gets a fresh id, unique within the batch and increasing in
/// load order.
///
/// # Errors
///
/// * `FormatError::TooFewLines` - fewer than two non-empty lines
/// * `FormatError::MissingColumns` - the header satisfies neither input mode
/// * `FormatError::Malformed` - a line leaves a quoted field open, or the
///   text could not be read as delimited records
pub fn parse_customers(text: &str) -> Result<Batch, FormatError> {
    let non_empty = text.lines().filter(|line| !line.trim().is_empty()).count();
    if non_empty < 2 {
        return Err(FormatError::TooFewLines { found: non_empty });
    }

    // one record per line: a quoted field may not run into the next line
    if let Some(index) = text.lines().position(has_unterminated_quote) {
        return Err(FormatError::Malformed {
            line: Some(index as u64 + 1),
            message: "unterminated quoted field".to_string(),
        });
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut header: Option<(InputMode, RowShape, usize)> = None;
    let mut records = Vec::new();
    let mut dropped = 0usize;

    for result in reader.records() {
        let row = result?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let Some((_, shape, width)) = header else {
            let headers: Vec<String> = row.iter().map(str::to_lowercase).collect();
            let located = InputMode::detect(&headers)
                .and_then(|mode| RowShape::locate(mode, &headers).map(|shape| (mode, shape)));
            let Some((mode, shape)) = located else {
                return Err(FormatError::MissingColumns {
                    found: headers.join(", "),
                });
            };
            header = Some((mode, shape, headers.len()));
            continue;
        };

        if row.len() != width {
            debug!(line, expected = width, found = row.len(), "dropping row with mismatched field count");
            dropped += 1;
            continue;
        }

        let id = RecordId(records.len() as u64 + 1);
        match shape.shape(id, &row) {
            Some(record) => records.push(record),
            None => {
                debug!(line, "dropping row with empty name or phone");
                dropped += 1;
            }
        }
    }

    let Some((mode, _, _)) = header else {
        return Err(FormatError::TooFewLines { found: non_empty });
    };

    if records.is_empty() {
        warn!(%mode, dropped, "input contained no usable rows");
    }
    info!(%mode, loaded = records.len(), dropped, "parsed customer batch");

    Ok(Batch::new(mode, records))
}

/// Write per-record outcomes in the results report format
///
/// Writes one row per record, in load order, with columns:
/// name, phone, invoice, status, timestamp, message.
/// The message is always quoted; the other fields only when they need it.
/// Quote characters inside fields are doubled per standard CSV escaping.
///
/// # Arguments
///
/// * `records` - Records to report, in load order
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(SenderError::OutputError)` if a write error occurred
pub fn write_results_csv(records: &[CustomerRecord], output: &mut dyn Write) -> Result<(), SenderError> {
    let mut header = Writer::from_writer(&mut *output);
    header
        .write_record(RESULTS_HEADER)
        .map_err(SenderError::output)?;
    header.flush().map_err(SenderError::output)?;
    drop(header);

    for record in records {
        // leading fields, terminated by the delimiter before the message
        let mut leading = WriterBuilder::new()
            .terminator(Terminator::Any(b','))
            .from_writer(Vec::new());

        let (timestamp, message) = match &record.result {
            Some(result) => (
                result.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                result.message.as_str(),
            ),
            None => (String::new(), ""),
        };

        leading
            .write_record([
                record.name.as_str(),
                record.phone.as_str(),
                record.invoice_ref.as_str(),
                record.status.report_label(),
                timestamp.as_str(),
            ])
            .map_err(SenderError::output)?;
        leading.flush().map_err(SenderError::output)?;
        let leading = leading
            .into_inner()
            .map_err(|e| SenderError::output(e.into_error()))?;

        output
            .write_all(&leading)
            .map_err(SenderError::output)?;
        writeln!(output, "\"{}\"", message.replace('"', "\"\""))
            .map_err(SenderError::output)?;
    }

    output.flush().map_err(SenderError::output)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeliveryStatus, FailureReason, SendResult};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    #[test]
    fn test_parse_invoice_mode() {
        let text = "name,phone,amount,invoice\n\
                    John Mensah,233244123456,500.00,INV-001\n\
                    Grace Adu,233201234567,750.00,INV-002\n";

        let batch = parse_customers(text).unwrap();

        assert_eq!(batch.mode(), InputMode::Invoice);
        assert_eq!(batch.len(), 2);
        let first = &batch.records()[0];
        assert_eq!(first.id, RecordId(1));
        assert_eq!(first.name, "John Mensah");
        assert_eq!(first.phone, "233244123456");
        assert_eq!(first.amount, Some(Decimal::new(50000, 2)));
        assert_eq!(first.invoice_ref, "INV-001");
        assert_eq!(first.expected_attachment, "INV-001.pdf");
        assert!(first.attachment.is_none());
        assert_eq!(first.status, DeliveryStatus::Waiting);
        assert_eq!(batch.records()[1].id, RecordId(2));
    }

    #[test]
    fn test_parse_document_mode() {
        let text = "Customer Name , Customer Number, PDF Filename\n\
                    Kwame Osei,233551234567,statement_march.PDF\n";

        let batch = parse_customers(text).unwrap();

        assert_eq!(batch.mode(), InputMode::Document);
        let record = &batch.records()[0];
        assert_eq!(record.name, "Kwame Osei");
        assert_eq!(record.invoice_ref, "statement_march");
        assert_eq!(record.expected_attachment, "statement_march.PDF");
        assert!(record.amount.is_none());
    }

    #[test]
    fn test_parse_header_columns_in_any_order() {
        let text = "invoice,amount,phone,name,email\nINV-9,12.5,0244000000,Efua,efua@example.com\n";

        let batch = parse_customers(text).unwrap();

        let record = &batch.records()[0];
        assert_eq!(record.name, "Efua");
        assert_eq!(record.phone, "0244000000");
        assert_eq!(record.invoice_ref, "INV-9");
    }

    #[rstest]
    #[case::wrong_field_count("name,phone,amount,invoice\nA,1,2,INV-1\nB,2,INV-2\nC,3,4,INV-3,extra\n", &["A"])]
    #[case::empty_name("name,phone,amount,invoice\n  ,1,2,INV-1\nB,2,3,INV-2\n", &["B"])]
    #[case::empty_phone("name,phone,amount,invoice\nA, ,2,INV-1\nB,2,3,INV-2\n", &["B"])]
    #[case::blank_lines("\n\nname,phone,amount,invoice\n\nA,1,2,INV-1\n   \nB,2,3,INV-2\n\n", &["A", "B"])]
    #[case::all_rows_dropped("name,phone,amount,invoice\n,,,\n", &[])]
    #[case::quoted_fields("name,phone,amount,invoice\n\"Mensah, John\",1,2,INV-1\n\"Ama \"\"Queen\"\" Asante\",2,3,INV-2\n", &["Mensah, John", "Ama \"Queen\" Asante"])]
    #[case::literal_quote_inside_field("name,phone,amount,invoice\nKofi O\"Neil,1,2,INV-1\n", &["Kofi O\"Neil"])]
    fn test_parse_drops_invalid_rows(#[case] text: &str, #[case] expected_names: &[&str]) {
        let batch = parse_customers(text).unwrap();
        let names: Vec<&str> = batch.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, expected_names);
    }

    #[rstest]
    #[case::opening_quote_never_closed(
        "name,phone,amount,invoice\n\"Ama Asante,233209876543,1500.00,INV-004\nKofi Boateng,233245678901,10.00,INV-005\nGrace Adu,233201234567,750.00,INV-002\n",
        2
    )]
    #[case::after_blank_line("name,phone,amount,invoice\n\nA,1,2,INV-1\nB,\"2,3,INV-2\n", 4)]
    #[case::escaped_quote_at_end("name,phone,amount,invoice\nA,1,2,\"INV-1\"\"\n", 2)]
    #[case::in_header("\"name,phone,amount,invoice\nA,1,2,INV-1\n", 1)]
    fn test_parse_unterminated_quote_is_malformed(#[case] text: &str, #[case] line: u64) {
        assert_eq!(
            parse_customers(text),
            Err(FormatError::Malformed {
                line: Some(line),
                message: "unterminated quoted field".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_ids_are_unique_and_ordered() {
        let text = "name,phone,amount,invoice\nA,1,2,I1\n,2,3,I2\nC,3,4,I3\nD,4,5,I4\n";

        let batch = parse_customers(text).unwrap();

        let ids: Vec<u64> = batch.records().iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[rstest]
    #[case::empty("", 0)]
    #[case::header_only("name,phone,amount,invoice\n", 1)]
    #[case::header_and_blank_lines("name,phone,amount,invoice\n \n\n", 1)]
    fn test_parse_too_few_lines(#[case] text: &str, #[case] found: usize) {
        assert_eq!(parse_customers(text), Err(FormatError::TooFewLines { found }));
    }

    #[rstest]
    #[case::missing_invoice("name,phone,amount\nA,1,2\n")]
    #[case::partial_document("customer name,pdf filename\nA,a.pdf\n")]
    #[case::unrelated("foo,bar\n1,2\n")]
    fn test_parse_missing_columns(#[case] text: &str) {
        let result = parse_customers(text);
        assert!(matches!(result, Err(FormatError::MissingColumns { .. })));
    }

    #[rstest]
    #[case::plain("12.50", Some(Decimal::new(1250, 2)))]
    #[case::empty("", None)]
    #[case::garbage("twelve", None)]
    fn test_parse_amount(#[case] raw: &str, #[case] expected: Option<Decimal>) {
        let text = format!("name,phone,amount,invoice\nA,1,{},INV-1\n", raw);
        let batch = parse_customers(&text).unwrap();
        assert_eq!(batch.records()[0].amount, expected);
    }

    fn finished(name: &str, status: DeliveryStatus, message: Option<&str>) -> CustomerRecord {
        let mut record = CustomerRecord::new(
            RecordId(1),
            InputMode::Invoice,
            name,
            "233244123456",
            "INV-001",
            "INV-001.pdf",
        );
        record.status = status;
        record.result = message.map(|m| SendResult {
            succeeded: status == DeliveryStatus::Sent,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 3).unwrap(),
            message: m.to_string(),
        });
        record
    }

    #[rstest]
    #[case::sent(
        vec![finished("John", DeliveryStatus::Sent, Some("Hi John, hello"))],
        "name,phone,invoice,status,timestamp,message\nJohn,233244123456,INV-001,SUCCESS,2024-01-01T09:00:03Z,\"Hi John, hello\"\n"
    )]
    #[case::missing_attachment(
        vec![finished("John", DeliveryStatus::Failed(FailureReason::MissingAttachment), Some("Failed: Missing PDF Attachment"))],
        "name,phone,invoice,status,timestamp,message\nJohn,233244123456,INV-001,FAILED,2024-01-01T09:00:03Z,\"Failed: Missing PDF Attachment\"\n"
    )]
    #[case::pending(
        vec![finished("John", DeliveryStatus::Waiting, None)],
        "name,phone,invoice,status,timestamp,message\nJohn,233244123456,INV-001,PENDING,,\"\"\n"
    )]
    #[case::quotes_doubled(
        vec![finished("John", DeliveryStatus::Sent, Some("Say \"hi\""))],
        "name,phone,invoice,status,timestamp,message\nJohn,233244123456,INV-001,SUCCESS,2024-01-01T09:00:03Z,\"Say \"\"hi\"\"\"\n"
    )]
    #[case::name_with_comma(
        vec![finished("Mensah, John", DeliveryStatus::Sent, Some("ok"))],
        "name,phone,invoice,status,timestamp,message\n\"Mensah, John\",233244123456,INV-001,SUCCESS,2024-01-01T09:00:03Z,\"ok\"\n"
    )]
    #[case::empty(vec![], "name,phone,invoice,status,timestamp,message\n")]
    fn test_write_results_csv(#[case] records: Vec<CustomerRecord>, #[case] expected_output: &str) {
        let mut output = Vec::new();
        write_results_csv(&records, &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(output_str, expected_output);
    }

    #[test]
    fn test_write_results_csv_preserves_order_and_count() {
        let records = vec![
            finished("A", DeliveryStatus::Sent, Some("a")),
            finished("B", DeliveryStatus::Failed(FailureReason::SendRejected), Some("b")),
            finished("C", DeliveryStatus::Cancelled, None),
        ];
        let mut output = Vec::new();
        write_results_csv(&records, &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        let names: Vec<&str> = output_str
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }
}
