//! Workbook relationships and the workbook descriptor (`xl/workbook.xml`).

use std::collections::{HashMap, HashSet};
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::Result;
use crate::types::{DefinedName, SheetState};
use crate::xml_helpers::{attr_bool, attr_string, attr_string_local, attr_usize};

/// Workbook relationships parsed from xl/_rels/workbook.xml.rels
///
/// Paths are resolved relative to the xl/ directory and stored as full
/// archive member names.
#[derive(Default, Debug)]
pub(super) struct WorkbookRelationships {
    /// Map of rId -> full path for worksheet relationships
    /// e.g., "rId1" -> "xl/worksheets/sheet1.xml"
    pub worksheets: HashMap<String, String>,
    /// Ids of chart sheets, which hold no cells.
    pub chartsheets: HashSet<String>,
    pub shared_strings: Option<String>,
    pub styles: Option<String>,
    pub theme: Option<String>,
}

/// A `<sheet>` entry of the workbook descriptor.
#[derive(Debug, Clone)]
pub(super) struct SheetInfo {
    pub name: String,
    pub r_id: String,
    pub state: SheetState,
}

/// Everything decode needs from xl/workbook.xml.
#[derive(Debug, Default)]
pub(super) struct WorkbookInfo {
    pub sheets: Vec<SheetInfo>,
    pub date1904: bool,
    pub defined_names: Vec<DefinedName>,
}

fn resolve_target(target: &str) -> String {
    if let Some(stripped) = target.strip_prefix('/') {
        stripped.to_string()
    } else {
        format!("xl/{target}")
    }
}

/// Parse workbook relationships from xl/_rels/workbook.xml.rels
pub(super) fn parse_workbook_relationships<R: BufRead>(reader: R) -> Result<WorkbookRelationships> {
    let mut rels = WorkbookRelationships::default();
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = attr_string(e, b"Id").unwrap_or_default();
                let target = attr_string(e, b"Target").unwrap_or_default();
                let rel_type = attr_string(e, b"Type").unwrap_or_default();
                let full_path = resolve_target(&target);

                // Categorize by relationship type
                if rel_type.ends_with("/worksheet") {
                    if id.is_empty() || !target.ends_with(".xml") {
                        log::warn!("skipping worksheet relationship {id:?} -> {target:?}");
                    } else {
                        rels.worksheets.insert(id, full_path);
                    }
                } else if rel_type.ends_with("/sharedStrings") {
                    rels.shared_strings = Some(full_path);
                } else if rel_type.ends_with("/styles") {
                    rels.styles = Some(full_path);
                } else if rel_type.ends_with("/theme") {
                    rels.theme = Some(full_path);
                } else if rel_type.ends_with("/chartsheet") {
                    rels.chartsheets.insert(id);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

fn read_defined_name(e: &BytesStart) -> DefinedName {
    DefinedName {
        name: attr_string(e, b"name").unwrap_or_default(),
        data: String::new(),
        local_sheet_id: attr_usize(e, b"localSheetId"),
        hidden: attr_bool(e, b"hidden").unwrap_or(false),
        comment: attr_string(e, b"comment").unwrap_or_default(),
    }
}

/// Sheet entries, the date1904 flag and defined names from xl/workbook.xml
pub(super) fn parse_workbook<R: BufRead>(reader: R) -> Result<WorkbookInfo> {
    let mut info = WorkbookInfo::default();
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);
    let mut buf = Vec::new();
    let mut current_name: Option<DefinedName> = None;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) if e.local_name().as_ref() == b"definedName" => {
                current_name = Some(read_defined_name(e));
            }
            Event::Empty(ref e) if e.local_name().as_ref() == b"definedName" => {
                info.defined_names.push(read_defined_name(e));
            }
            Event::Empty(ref e) | Event::Start(ref e) => match e.local_name().as_ref() {
                b"workbookPr" => {
                    info.date1904 = attr_bool(e, b"date1904").unwrap_or(false);
                }
                b"sheet" => {
                    let name = attr_string(e, b"name").unwrap_or_default();
                    if !name.is_empty() {
                        info.sheets.push(SheetInfo {
                            name,
                            // r:id attribute (namespace prefixed)
                            r_id: attr_string_local(e, b"id").unwrap_or_default(),
                            state: attr_string(e, b"state")
                                .map_or(SheetState::Visible, |s| SheetState::from_xml(&s)),
                        });
                    }
                }
                _ => {}
            },
            Event::Text(ref e) => {
                if let Some(defined) = current_name.as_mut() {
                    defined.data.push_str(&e.unescape()?);
                }
            }
            Event::End(ref e) if e.local_name().as_ref() == b"definedName" => {
                if let Some(defined) = current_name.take() {
                    info.defined_names.push(defined);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(info)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/data.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
  <Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/>
  <Relationship Id="rId6" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chartsheet" Target="chartsheets/sheet1.xml"/>
</Relationships>"#;

    #[test]
    fn test_relationships_resolve_paths() {
        let rels = parse_workbook_relationships(RELS.as_bytes()).unwrap();
        assert_eq!(rels.worksheets.len(), 2);
        assert_eq!(rels.worksheets["rId1"], "xl/worksheets/sheet1.xml");
        assert_eq!(rels.worksheets["rId2"], "xl/worksheets/data.xml");
        assert_eq!(rels.shared_strings.as_deref(), Some("xl/sharedStrings.xml"));
        assert_eq!(rels.styles.as_deref(), Some("xl/styles.xml"));
        assert_eq!(rels.theme.as_deref(), Some("xl/theme/theme1.xml"));
        assert!(rels.chartsheets.contains("rId6"));
    }

    #[test]
    fn test_workbook_sheets_and_names() {
        let xml = r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <workbookPr date1904="1"/>
  <sheets>
    <sheet name="First" sheetId="1" r:id="rId1"/>
    <sheet name="Secret" sheetId="2" state="veryHidden" r:id="rId2"/>
  </sheets>
  <definedNames>
    <definedName name="_xlnm.Print_Area" localSheetId="0">First!$A$1:$B$2</definedName>
    <definedName name="Rate" hidden="1" comment="tax">0.2</definedName>
  </definedNames>
</workbook>"#;
        let info = parse_workbook(xml.as_bytes()).unwrap();
        assert!(info.date1904);
        assert_eq!(info.sheets.len(), 2);
        assert_eq!(info.sheets[0].r_id, "rId1");
        assert_eq!(info.sheets[1].state, SheetState::VeryHidden);
        assert_eq!(info.defined_names.len(), 2);
        assert_eq!(info.defined_names[0].data, "First!$A$1:$B$2");
        assert_eq!(info.defined_names[0].local_sheet_id, Some(0));
        assert!(info.defined_names[1].hidden);
        assert_eq!(info.defined_names[1].comment, "tax");
    }
}
