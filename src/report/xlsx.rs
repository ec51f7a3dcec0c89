use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, XlsxError};
use unicode_width::UnicodeWidthStr;

use crate::model::time_entry::TimeEntry;

pub const SHEET_NAME: &str = "Time tracking";

pub const HEADERS: [&str; 8] = [
    "Date", "Employee", "Email", "Project", "Activity", "Hours", "Comment", "Created",
];

const HOURS_COL: usize = 5;

pub fn export_filename(today: NaiveDate) -> String {
    format!("timetracker_{}.xlsx", today.format("%Y-%m-%d"))
}

/// Text cells of one row, in `HEADERS` order. Hours are kept as text here only for width fitting.
pub fn entry_row(entry: &TimeEntry) -> [String; 8] {
    [
        entry.entry_date.format("%d.%m.%Y").to_string(),
        entry.user_name.clone(),
        entry.user_email.clone(),
        entry.project_name.clone(),
        entry.activity_name.clone(),
        entry.hours.to_string(),
        entry.comment.clone().unwrap_or_default(),
        entry.created_at.format("%d.%m.%Y %H:%M").to_string(),
    ]
}

/// Builds the report workbook in memory.
pub fn build_workbook(entries: &[TimeEntry]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x2F75B5))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_with_format(0, col as u16, *header, &header_format)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    let mut col_widths: Vec<usize> = HEADERS.iter().map(|h| h.width()).collect();

    let band1 = Color::RGB(0xEAF3FB);
    let band2 = Color::RGB(0xFFFFFF);

    for (index, entry) in entries.iter().enumerate() {
        let row = (index + 1) as u32;
        let band = if index % 2 == 0 { band1 } else { band2 };

        let text_format = Format::new()
            .set_background_color(band)
            .set_pattern(FormatPattern::Solid)
            .set_border(FormatBorder::Thin);
        let hours_format = text_format
            .clone()
            .set_align(FormatAlign::Right)
            .set_num_format("0.0#");

        for (col, value) in entry_row(entry).iter().enumerate() {
            if col == HOURS_COL {
                worksheet.write_with_format(row, col as u16, entry.hours, &hours_format)?;
            } else {
                worksheet.write_with_format(row, col as u16, value.as_str(), &text_format)?;
            }
            col_widths[col] = col_widths[col].max(value.width());
        }
    }

    for (col, width) in col_widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width as f64 + 2.0)?;
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use std::io::Read;

    fn sample() -> TimeEntry {
        TimeEntry {
            id: 1,
            user_id: 1,
            user_email: "anna@company.com".to_string(),
            user_name: "Анна Иванова".to_string(),
            project_id: 1,
            project_name: "Billing".to_string(),
            activity_id: 1,
            activity_name: "Development".to_string(),
            entry_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            hours: 7.5,
            comment: None,
            created_at: NaiveDateTime::parse_from_str("2026-01-05 17:45:10", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn row_formats_dates_and_blank_comment() {
        let row = entry_row(&sample());

        assert_eq!(row[0], "05.01.2026");
        assert_eq!(row[1], "Анна Иванова");
        assert_eq!(row[5], "7.5");
        assert_eq!(row[6], "");
        assert_eq!(row[7], "05.01.2026 17:45");
    }

    #[test]
    fn filename_carries_the_date() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(export_filename(day), "timetracker_2026-10-16.xlsx");
    }

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut xml).unwrap();
        xml
    }

    fn cell<'a>(sheet: &'a str, reference: &str) -> &'a str {
        let start = sheet.find(&format!("<c r=\"{reference}\"")).unwrap();
        let end = start + sheet[start..].find("</c>").unwrap();
        &sheet[start..end]
    }

    #[test]
    fn workbook_holds_named_sheet_header_and_rows() {
        let mut second = sample();
        second.hours = 2.5;
        second.comment = Some("Invoice export".to_string());

        let bytes = build_workbook(&[sample(), second]).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let workbook = part(&bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"<sheet name="Time tracking""#));

        let strings = part(&bytes, "xl/sharedStrings.xml");
        for header in HEADERS {
            assert!(strings.contains(&format!(">{header}</t>")), "missing header {header}");
        }
        assert!(strings.contains(">Invoice export</t>"));
        assert!(strings.contains(">05.01.2026</t>"));

        let sheet = part(&bytes, "xl/worksheets/sheet1.xml");
        assert_eq!(sheet.matches("<row ").count(), 3);
        assert!(sheet.contains(r#"state="frozen""#));

        // hours are real numbers, not shared strings
        let hours = cell(&sheet, "F3");
        assert!(!hours.contains(r#"t="s""#), "{hours}");
        assert!(hours.contains("<v>2.5</v>"), "{hours}");
        assert!(cell(&sheet, "A2").contains(r#"t="s""#));
    }

    #[test]
    fn empty_set_still_builds() {
        let bytes = build_workbook(&[]).unwrap();
        let sheet = part(&bytes, "xl/worksheets/sheet1.xml");
        assert_eq!(sheet.matches("<row ").count(), 1);
    }
}
