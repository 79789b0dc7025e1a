use crate::core::format::normalize_headers;
use crate::domain::model::{CellValue, Column, Table};
use crate::utils::error::{Result, SweepError};
use calamine::{Data, Reader, Xlsx};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

const SHEET_NAME: &str = "Sheet1";
const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// 讀取第一個工作表，第一列為欄名
pub fn read_xlsx(bytes: &[u8], file_name: &str) -> Result<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SweepError::ParseError {
            file: file_name.to_string(),
            message: "No worksheet found".to_string(),
        })??;

    let mut rows = range.rows();
    let header_row = match rows.next() {
        Some(row) if !range.is_empty() => row,
        _ => {
            return Err(SweepError::ParseError {
                file: file_name.to_string(),
                message: "No columns to parse from file".to_string(),
            })
        }
    };

    let headers = normalize_headers(
        header_row
            .iter()
            .map(|cell| cell_value(cell).to_string())
            .collect(),
    );
    let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];

    for row in rows {
        for (index, column) in values.iter_mut().enumerate() {
            column.push(row.get(index).map(cell_value).unwrap_or(CellValue::Null));
        }
    }

    Table::new(
        headers
            .into_iter()
            .zip(values)
            .map(|(name, values)| Column::new(name, values))
            .collect(),
    )
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => float_cell(*f),
        other => CellValue::Text(other.to_string()),
    }
}

/// xlsx 的數字一律存成浮點數，整數值轉回 Int
fn float_cell(value: f64) -> CellValue {
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        CellValue::Int(value as i64)
    } else {
        CellValue::Float(value)
    }
}

/// 產生單一工作表的 xlsx，內容全部在記憶體中組成
pub fn write_xlsx(table: &Table) -> Result<Vec<u8>> {
    let mut strings = SharedStrings::default();
    let sheet = sheet_xml(table, &mut strings);
    package_workbook(sheet, &strings)
}

fn package_workbook(sheet: String, strings: &SharedStrings) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let parts: [(&str, String); 7] = [
        ("[Content_Types].xml", content_types_xml()),
        ("_rels/.rels", package_rels_xml()),
        ("xl/workbook.xml", workbook_xml()),
        ("xl/_rels/workbook.xml.rels", workbook_rels_xml()),
        ("xl/styles.xml", styles_xml()),
        ("xl/sharedStrings.xml", strings.to_xml()),
        ("xl/worksheets/sheet1.xml", sheet),
    ];

    for (name, body) in parts {
        zip.start_file(name, SimpleFileOptions::default())?;
        zip.write_all(body.as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[derive(Default)]
struct SharedStrings {
    index: HashMap<String, usize>,
    values: Vec<String>,
    references: usize,
}

impl SharedStrings {
    fn intern(&mut self, value: &str) -> usize {
        self.references += 1;
        if let Some(&i) = self.index.get(value) {
            return i;
        }
        let i = self.values.len();
        self.values.push(value.to_string());
        self.index.insert(value.to_string(), i);
        i
    }

    fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"{}<sst xmlns="{}" count="{}" uniqueCount="{}">"#,
            XML_DECL,
            MAIN_NS,
            self.references,
            self.values.len()
        );
        for value in &self.values {
            xml.push_str(r#"<si><t xml:space="preserve">"#);
            xml.push_str(&escape_xml(value));
            xml.push_str("</t></si>");
        }
        xml.push_str("</sst>");
        xml
    }
}

fn sheet_xml(table: &Table, strings: &mut SharedStrings) -> String {
    let mut xml = format!(r#"{}<worksheet xmlns="{}"><sheetData>"#, XML_DECL, MAIN_NS);

    xml.push_str(r#"<row r="1">"#);
    for (col, column) in table.columns().iter().enumerate() {
        let idx = strings.intern(&column.name);
        xml.push_str(&format!(
            r#"<c r="{}1" t="s"><v>{}</v></c>"#,
            column_letter(col),
            idx
        ));
    }
    xml.push_str("</row>");

    for (row_index, row) in table.rows().enumerate() {
        let r = row_index + 2;
        xml.push_str(&format!(r#"<row r="{}">"#, r));
        for (col, cell) in row.into_iter().enumerate() {
            let reference = format!("{}{}", column_letter(col), r);
            match cell {
                CellValue::Null => {}
                CellValue::Int(i) => {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, i))
                }
                CellValue::Float(f) if f.is_finite() => {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, f))
                }
                CellValue::Bool(b) => xml.push_str(&format!(
                    r#"<c r="{}" t="b"><v>{}</v></c>"#,
                    reference,
                    u8::from(*b)
                )),
                // inf 無法以數字儲存，改存文字
                other => {
                    let idx = strings.intern(&other.to_string());
                    xml.push_str(&format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, reference, idx));
                }
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

/// 0 -> A, 25 -> Z, 26 -> AA
fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // XML 1.0 不允許的控制字元直接略過
            '\t' | '\n' | '\r' => out.push(ch),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

fn content_types_xml() -> String {
    format!(
        concat!(
            "{}",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
            r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
            r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
            "</Types>"
        ),
        XML_DECL
    )
}

fn package_rels_xml() -> String {
    format!(
        r#"{}<Relationships xmlns="{}"><Relationship Id="rId1" Type="{}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
        XML_DECL, PKG_REL_NS, REL_NS
    )
}

fn workbook_xml() -> String {
    format!(
        r#"{}<workbook xmlns="{}" xmlns:r="{}"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        XML_DECL, MAIN_NS, REL_NS, SHEET_NAME
    )
}

fn workbook_rels_xml() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<Relationships xmlns="{pkg}">"#,
            r#"<Relationship Id="rId1" Type="{rel}/worksheet" Target="worksheets/sheet1.xml"/>"#,
            r#"<Relationship Id="rId2" Type="{rel}/styles" Target="styles.xml"/>"#,
            r#"<Relationship Id="rId3" Type="{rel}/sharedStrings" Target="sharedStrings.xml"/>"#,
            "</Relationships>"
        ),
        decl = XML_DECL,
        pkg = PKG_REL_NS,
        rel = REL_NS
    )
}

fn styles_xml() -> String {
    format!(
        concat!(
            "{}",
            r#"<styleSheet xmlns="{}">"#,
            r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>"#,
            r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
            r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
            r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
            r#"<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>"#,
            r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
            "</styleSheet>"
        ),
        XML_DECL, MAIN_NS
    )
}
