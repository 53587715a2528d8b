//! Package parts that only depend on the sheet list.

use crate::types::{DefinedName, Sheet};
use crate::xml_helpers::{flag_attr, xml_escape, XML_HEADER};

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub(crate) const SHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";

/// Archive member name of the 1-based sheet `n`.
pub(crate) fn sheet_part_name(n: usize) -> String {
    format!("xl/worksheets/sheet{n}.xml")
}

pub(crate) fn content_types(sheet_count: usize) -> String {
    let mut xml = String::with_capacity(1200 + sheet_count * 150);
    xml.push_str(XML_HEADER);
    xml.push_str(
        "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
<Default Extension=\"xml\" ContentType=\"application/xml\"/>\
<Override PartName=\"/_rels/.rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
<Override PartName=\"/docProps/app.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.extended-properties+xml\"/>\
<Override PartName=\"/docProps/core.xml\" ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>\
<Override PartName=\"/xl/_rels/workbook.xml.rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
<Override PartName=\"/xl/sharedStrings.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml\"/>\
<Override PartName=\"/xl/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml\"/>\
<Override PartName=\"/xl/theme/theme1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.theme+xml\"/>\
<Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>",
    );
    for n in 1..=sheet_count {
        xml.push_str(&format!(
            "<Override PartName=\"/{}\" ContentType=\"{SHEET_CONTENT_TYPE}\"/>",
            sheet_part_name(n)
        ));
    }
    xml.push_str("</Types>");
    xml
}

pub(crate) fn root_rels() -> String {
    format!(
        "{XML_HEADER}<Relationships xmlns=\"{PKG_REL_NS}\">\
<Relationship Id=\"rId1\" Type=\"{REL_NS}/officeDocument\" Target=\"xl/workbook.xml\"/>\
<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties\" Target=\"docProps/core.xml\"/>\
<Relationship Id=\"rId3\" Type=\"{REL_NS}/extended-properties\" Target=\"docProps/app.xml\"/>\
</Relationships>"
    )
}

pub(crate) fn app_xml(sheet_names: &[&str]) -> String {
    let titles: String = sheet_names
        .iter()
        .map(|name| format!("<vt:lpstr>{}</vt:lpstr>", xml_escape(name)))
        .collect();
    format!(
        "{XML_HEADER}<Properties xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\" \
xmlns:vt=\"http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes\">\
<TotalTime>0</TotalTime><Application>xlstream</Application>\
<HeadingPairs><vt:vector size=\"2\" baseType=\"variant\">\
<vt:variant><vt:lpstr>Worksheets</vt:lpstr></vt:variant>\
<vt:variant><vt:i4>{count}</vt:i4></vt:variant>\
</vt:vector></HeadingPairs>\
<TitlesOfParts><vt:vector size=\"{count}\" baseType=\"lpstr\">{titles}</vt:vector></TitlesOfParts>\
</Properties>",
        count = sheet_names.len()
    )
}

pub(crate) fn core_xml() -> String {
    format!(
        "{XML_HEADER}<cp:coreProperties xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
xmlns:dc=\"http://purl.org/dc/elements/1.1/\" \
xmlns:dcmitype=\"http://purl.org/dc/dcmitype/\" \
xmlns:dcterms=\"http://purl.org/dc/terms/\" \
xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\
<dc:creator>xlstream</dc:creator>\
<cp:revision>0</cp:revision>\
</cp:coreProperties>"
    )
}

/// Workbook relationships: worksheets take `rId1..=rIdN`, then shared
/// strings, theme and styles follow.
pub(crate) fn workbook_rels(sheet_count: usize) -> String {
    let mut xml = String::with_capacity(600 + sheet_count * 150);
    xml.push_str(XML_HEADER);
    xml.push_str(&format!("<Relationships xmlns=\"{PKG_REL_NS}\">"));
    for n in 1..=sheet_count {
        xml.push_str(&format!(
            "<Relationship Id=\"rId{n}\" Target=\"worksheets/sheet{n}.xml\" Type=\"{REL_NS}/worksheet\"/>"
        ));
    }
    let base = sheet_count;
    xml.push_str(&format!(
        "<Relationship Id=\"rId{}\" Target=\"sharedStrings.xml\" Type=\"{REL_NS}/sharedStrings\"/>\
<Relationship Id=\"rId{}\" Target=\"theme/theme1.xml\" Type=\"{REL_NS}/theme\"/>\
<Relationship Id=\"rId{}\" Target=\"styles.xml\" Type=\"{REL_NS}/styles\"/>",
        base + 1,
        base + 2,
        base + 3
    ));
    xml.push_str("</Relationships>");
    xml
}

/// The workbook descriptor: sheet list, views, calc settings and defined names.
pub(crate) fn workbook_xml(sheets: &[Sheet], date1904: bool, defined_names: &[DefinedName]) -> String {
    let mut xml = String::with_capacity(1024 + sheets.len() * 100);
    xml.push_str(XML_HEADER);
    xml.push_str(&format!(
        "<workbook xmlns=\"{MAIN_NS}\" xmlns:r=\"{REL_NS}\">\
<fileVersion appName=\"xlstream\"/>\
<workbookPr showObjects=\"all\"{}/>\
<bookViews><workbookView showHorizontalScroll=\"true\" showVerticalScroll=\"true\" showSheetTabs=\"true\" \
tabRatio=\"204\" windowHeight=\"8192\" windowWidth=\"16384\" xWindow=\"0\" yWindow=\"0\"/></bookViews>",
        flag_attr("date1904", date1904)
    ));

    xml.push_str("<sheets>");
    for (idx, sheet) in sheets.iter().enumerate() {
        let n = idx + 1;
        xml.push_str(&format!(
            "<sheet name=\"{}\" sheetId=\"{n}\" r:id=\"rId{n}\" state=\"{}\"/>",
            xml_escape(&sheet.name),
            sheet.state.as_str()
        ));
    }
    xml.push_str("</sheets>");

    if !defined_names.is_empty() {
        xml.push_str("<definedNames>");
        for defined in defined_names {
            xml.push_str(&format!("<definedName name=\"{}\"", xml_escape(&defined.name)));
            if let Some(local) = defined.local_sheet_id {
                xml.push_str(&format!(" localSheetId=\"{local}\""));
            }
            xml.push_str(&flag_attr("hidden", defined.hidden));
            if !defined.comment.is_empty() {
                xml.push_str(&format!(" comment=\"{}\"", xml_escape(&defined.comment)));
            }
            xml.push('>');
            xml.push_str(&xml_escape(&defined.data));
            xml.push_str("</definedName>");
        }
        xml.push_str("</definedNames>");
    }

    xml.push_str(
        "<calcPr iterateCount=\"100\" refMode=\"A1\" iterate=\"false\" iterateDelta=\"0.001\"/></workbook>",
    );
    xml
}

/// A minimal Office theme: colour, font and format schemes.
pub(crate) fn theme_xml() -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_HEADER);
    xml.push_str(
        "<a:theme xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" name=\"Office Theme\">\
<a:themeElements>\
<a:clrScheme name=\"Office\">\
<a:dk1><a:sysClr val=\"windowText\" lastClr=\"000000\"/></a:dk1>\
<a:lt1><a:sysClr val=\"window\" lastClr=\"FFFFFF\"/></a:lt1>\
<a:dk2><a:srgbClr val=\"1F497D\"/></a:dk2>\
<a:lt2><a:srgbClr val=\"EEECE1\"/></a:lt2>\
<a:accent1><a:srgbClr val=\"4F81BD\"/></a:accent1>\
<a:accent2><a:srgbClr val=\"C0504D\"/></a:accent2>\
<a:accent3><a:srgbClr val=\"9BBB59\"/></a:accent3>\
<a:accent4><a:srgbClr val=\"8064A2\"/></a:accent4>\
<a:accent5><a:srgbClr val=\"4BACC6\"/></a:accent5>\
<a:accent6><a:srgbClr val=\"F79646\"/></a:accent6>\
<a:hlink><a:srgbClr val=\"0000FF\"/></a:hlink>\
<a:folHlink><a:srgbClr val=\"800080\"/></a:folHlink>\
</a:clrScheme>\
<a:fontScheme name=\"Office\">\
<a:majorFont><a:latin typeface=\"Cambria\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:majorFont>\
<a:minorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:minorFont>\
</a:fontScheme>\
<a:fmtScheme name=\"Office\">\
<a:fillStyleLst>\
<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>\
<a:solidFill><a:schemeClr val=\"phClr\"><a:tint val=\"50000\"/></a:schemeClr></a:solidFill>\
<a:solidFill><a:schemeClr val=\"phClr\"><a:shade val=\"80000\"/></a:schemeClr></a:solidFill>\
</a:fillStyleLst>\
<a:lnStyleLst>\
<a:ln w=\"9525\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>\
<a:ln w=\"25400\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>\
<a:ln w=\"38100\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>\
</a:lnStyleLst>\
<a:effectStyleLst>\
<a:effectStyle><a:effectLst/></a:effectStyle>\
<a:effectStyle><a:effectLst/></a:effectStyle>\
<a:effectStyle><a:effectLst/></a:effectStyle>\
</a:effectStyleLst>\
<a:bgFillStyleLst>\
<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>\
<a:solidFill><a:schemeClr val=\"phClr\"><a:tint val=\"95000\"/></a:schemeClr></a:solidFill>\
<a:solidFill><a:schemeClr val=\"phClr\"><a:shade val=\"90000\"/></a:schemeClr></a:solidFill>\
</a:bgFillStyleLst>\
</a:fmtScheme>\
</a:themeElements>\
<a:objectDefaults/><a:extraClrSchemeLst/>\
</a:theme>",
    );
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SheetState;

    #[test]
    fn test_workbook_rels_ids() {
        let xml = workbook_rels(2);
        assert!(xml.contains(r#"Id="rId2" Target="worksheets/sheet2.xml""#));
        assert!(xml.contains(r#"Id="rId3" Target="sharedStrings.xml""#));
        assert!(xml.contains(r#"Id="rId4" Target="theme/theme1.xml""#));
        assert!(xml.contains(r#"Id="rId5" Target="styles.xml""#));
    }

    #[test]
    fn test_workbook_xml_lists_sheets() {
        let mut hidden = Sheet::new("B&C");
        hidden.state = SheetState::Hidden;
        let sheets = vec![Sheet::new("A"), hidden];
        let names = vec![DefinedName {
            name: "Total".to_string(),
            data: "A!$A$1".to_string(),
            ..DefinedName::default()
        }];
        let xml = workbook_xml(&sheets, true, &names);
        assert!(xml.contains(r#"<workbookPr showObjects="all" date1904="1"/>"#));
        assert!(xml.contains(r#"<sheet name="A" sheetId="1" r:id="rId1" state="visible"/>"#));
        assert!(xml.contains(r#"<sheet name="B&amp;C" sheetId="2" r:id="rId2" state="hidden"/>"#));
        assert!(xml.contains(r#"<definedName name="Total">A!$A$1</definedName>"#));
        assert!(xml.contains(r#"tabRatio="204""#));
    }

    #[test]
    fn test_content_types_cover_sheets() {
        let xml = content_types(3);
        assert!(xml.contains("/xl/worksheets/sheet3.xml"));
        assert!(!xml.contains("/xl/worksheets/sheet4.xml"));
    }
}
