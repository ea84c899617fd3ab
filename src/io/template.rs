//! Built-in sample data and input templates
//!
//! The sample batch lets a simulation run without any input file. The
//! template writer produces a blank input file for either input mode,
//! pre-filled with the same sample customers.

use crate::types::{Batch, CustomerRecord, InputMode, RecordId, SenderError};
use csv::Writer;
use rust_decimal::Decimal;
use std::io::Write;

/// (name, phone, amount in pesewas, invoice)
const SAMPLE_CUSTOMERS: [(&str, &str, i64, &str); 5] = [
    ("John Mensah", "233244123456", 50000, "INV-001"),
    ("Grace Adu", "233201234567", 75000, "INV-002"),
    ("Kwame Osei", "233551234567", 120000, "INV-003"),
    ("Ama Asante", "233209876543", 150000, "INV-004"),
    ("Kofi Boateng", "233245678901", 89000, "INV-005"),
];

/// The built-in sample batch: five invoice-mode customers, no attachments bound
pub fn sample_batch() -> Batch {
    let records = SAMPLE_CUSTOMERS
        .iter()
        .enumerate()
        .map(|(i, (name, phone, amount, invoice))| {
            CustomerRecord::new(
                RecordId(i as u64 + 1),
                InputMode::Invoice,
                *name,
                *phone,
                *invoice,
                format!("{}.pdf", invoice),
            )
            .with_amount(Some(Decimal::new(*amount, 2)))
        })
        .collect();

    Batch::new(InputMode::Invoice, records)
}

/// Write a blank input template for the given mode
///
/// The header matches the mode's required columns; the rows are the sample
/// customers, so the file can be loaded as-is.
pub fn write_template_csv(mode: InputMode, output: &mut dyn Write) -> Result<(), SenderError> {
    let mut writer = Writer::from_writer(output);

    writer
        .write_record(mode.required_columns())
        .map_err(SenderError::output)?;

    for (name, phone, amount, invoice) in SAMPLE_CUSTOMERS {
        let row = match mode {
            InputMode::Invoice => vec![
                name.to_string(),
                phone.to_string(),
                Decimal::new(amount, 2).to_string(),
                invoice.to_string(),
            ],
            InputMode::Document => {
                vec![name.to_string(), phone.to_string(), format!("{}.pdf", invoice)]
            }
        };
        writer.write_record(&row).map_err(SenderError::output)?;
    }

    writer.flush().map_err(SenderError::output)?;

    Ok(())
}
