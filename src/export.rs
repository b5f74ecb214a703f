// export.rs - booking spreadsheets (CSV and XLSX)
use chrono::SecondsFormat;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;

use crate::database::models::{Booking, PaymentType};

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Most rows a single export returns.
pub const EXPORT_LIMIT: i64 = 5000;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX export failed: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("export buffer error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Anything other than "csv" (case-insensitive) means XLSX.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(f) if f.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Xlsx,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_CONTENT_TYPE,
            ExportFormat::Xlsx => XLSX_CONTENT_TYPE,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "bookings.csv",
            ExportFormat::Xlsx => "bookings.xlsx",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

/// One worksheet: a header row followed by data rows.
#[derive(Debug, Clone)]
pub struct Table {
    pub sheet_name: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

const BOOKING_HEADERS: &[&str] = &[
    "createdAt",
    "status",
    "email",
    "shift",
    "childFullName",
    "dob",
    "age",
    "gender",
    "parentFullName",
    "parentPhone",
    "parent2FullName",
    "parent2Phone",
    "address",
    "roommates",
    "district",
    "paymentType",
    "allergies",
    "transfer",
    "agree",
];

const LEGACY_HEADERS: &[&str] = &[
    "№",
    "Дата заявки",
    "Email",
    "Смена",
    "Ребёнок",
    "Дата рождения",
    "Возраст",
    "Пол",
    "Родитель",
    "Телефон",
    "Второй родитель",
    "Телефон 2",
    "Адрес",
    "Район школы",
    "Друзья",
    "Оплата",
    "Аллергии",
    "Трансфер",
    "Статус",
];

/// Fixed English columns used by `/api/bookings/export`.
pub fn bookings_table(bookings: &[Booking]) -> Table {
    let rows = bookings
        .iter()
        .map(|b| {
            vec![
                Cell::from(b.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
                Cell::from(b.status.as_str()),
                Cell::from(b.email.as_str()),
                Cell::from(b.shift_title.as_str()),
                Cell::from(b.child_full_name.as_str()),
                Cell::from(b.dob.format("%Y-%m-%d").to_string()),
                Cell::Int(b.age.into()),
                Cell::from(b.gender.as_str()),
                Cell::from(b.parent_full_name.as_str()),
                Cell::from(b.parent_phone.as_str()),
                Cell::from(b.parent2_full_name.as_str()),
                Cell::from(b.parent2_phone.as_str()),
                Cell::from(b.address.as_str()),
                Cell::from(b.roommates.as_str()),
                Cell::from(b.district.as_str()),
                Cell::from(b.payment_type.as_str()),
                Cell::from(b.allergies.as_str()),
                Cell::from(b.transfer.as_str()),
                Cell::Bool(b.agree),
            ]
        })
        .collect();

    Table {
        sheet_name: "Bookings",
        headers: BOOKING_HEADERS.to_vec(),
        rows,
    }
}

/// Russian sheet used by the admin panel's "download Excel" button.
pub fn legacy_bookings_table(bookings: &[Booking]) -> Table {
    let rows = bookings
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let payment = match b.payment_type {
                PaymentType::Certificate => "Сертификат",
                PaymentType::Full => "Полная",
            };
            vec![
                Cell::Int(i as i64 + 1),
                Cell::from(b.created_at.format("%d.%m.%Y").to_string()),
                Cell::from(b.email.as_str()),
                Cell::from(b.shift_title.as_str()),
                Cell::from(b.child_full_name.as_str()),
                Cell::from(b.dob.format("%d.%m.%Y").to_string()),
                Cell::Int(b.age.into()),
                Cell::from(b.gender.as_str()),
                Cell::from(b.parent_full_name.as_str()),
                Cell::from(b.parent_phone.as_str()),
                Cell::from(b.parent2_full_name.as_str()),
                Cell::from(b.parent2_phone.as_str()),
                Cell::from(b.address.as_str()),
                Cell::from(b.district.as_str()),
                Cell::from(b.roommates.as_str()),
                Cell::from(payment),
                Cell::from(b.allergies.as_str()),
                Cell::from(b.transfer.as_str()),
                Cell::from(b.status.as_str()),
            ]
        })
        .collect();

    Table {
        sheet_name: "Заявки",
        headers: LEGACY_HEADERS.to_vec(),
        rows,
    }
}

/// Every field quoted, `\n` line endings.
pub fn to_csv(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(Cell::render))?;
    }

    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

pub fn to_xlsx(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(table.sheet_name)?;

    for (col, header) in table.headers.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *header, &bold)?;
        sheet.set_column_width(col, 22)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let r = r as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(s) => sheet.write_string(r, col, s)?,
                Cell::Int(n) => sheet.write_number(r, col, *n as f64)?,
                Cell::Bool(b) => sheet.write_boolean(r, col, *b)?,
            };
        }
    }

    Ok(workbook.save_to_buffer()?)
}

pub fn render(table: &Table, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Csv => to_csv(table),
        ExportFormat::Xlsx => to_xlsx(table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{BookingStatus, Gender, Transfer};
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn booking() -> Booking {
        let created = Utc.with_ymd_and_hms(2026, 1, 2, 10, 0, 0).unwrap();
        Booking {
            id: Uuid::new_v4(),
            email: "parent@mail.ru".into(),
            shift_id: None,
            shift_title: "Зимняя смена".into(),
            child_full_name: "Иванов \"Пётр\"".into(),
            dob: NaiveDate::from_ymd_opt(2015, 5, 1).unwrap(),
            age: 10,
            gender: Gender::Male,
            parent_full_name: "Иванова Анна".into(),
            parent_phone: "+79991234567".into(),
            parent2_full_name: String::new(),
            parent2_phone: String::new(),
            address: "Томск".into(),
            roommates: "нет".into(),
            district: "Советский".into(),
            payment_type: PaymentType::Full,
            allergies: "нет".into(),
            transfer: Transfer::Yes,
            agree: true,
            status: BookingStatus::Active,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn csv_quotes_everything_and_keeps_column_order() {
        let bytes = to_csv(&bookings_table(&[booking()])).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("\"createdAt\",\"status\",\"email\",\"shift\""));
        assert!(header.ends_with("\"transfer\",\"agree\""));

        let row = lines.next().unwrap();
        assert!(row.starts_with("\"2026-01-02T10:00:00.000Z\",\"active\""));
        assert!(row.contains("\"Иванов \"\"Пётр\"\"\""));
        assert!(row.ends_with("\"Да\",\"true\""));
    }

    #[test]
    fn empty_export_still_has_headers() {
        let text = String::from_utf8(to_csv(&bookings_table(&[])).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn legacy_sheet_localizes_payment_and_numbers_rows() {
        let table = legacy_bookings_table(&[booking(), booking()]);
        assert_eq!(table.sheet_name, "Заявки");
        assert_eq!(table.headers[0], "№");
        assert_eq!(table.rows[1][0], Cell::Int(2));
        assert_eq!(table.rows[0][1], Cell::from("02.01.2026"));
        assert_eq!(table.rows[0][15], Cell::from("Полная"));
    }

    #[test]
    fn xlsx_is_a_zip_container() {
        let bytes = to_xlsx(&legacy_bookings_table(&[booking()])).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn format_defaults_to_xlsx() {
        assert_eq!(ExportFormat::parse(None), ExportFormat::Xlsx);
        assert_eq!(ExportFormat::parse(Some("CSV")), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse(Some("pdf")), ExportFormat::Xlsx);
    }
}
