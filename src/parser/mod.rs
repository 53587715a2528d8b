//! Main XLSX parser
//!
//! Reads the package parts out of the ZIP archive, builds the shared string
//! table and style registry, then parses every worksheet against those
//! read-only tables. Worksheets are independent of each other and are parsed
//! on the rayon pool; results come back in workbook order.

mod formula;
mod relationships;
mod truncate;
mod worksheet;

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use zip::ZipArchive;

use crate::error::{Result, XlstreamError};
use crate::options::{DecodeOptions, RowLimit};
use crate::shared_strings::{parse_shared_strings, SharedStringTable};
use crate::styles::{parse_styles_with_theme, StyleRegistry};
use crate::theme::{parse_theme, Theme};
use crate::types::{Document, Sheet, SheetState, Style};

pub use formula::shift_formula;

use relationships::{parse_workbook, parse_workbook_relationships};
use truncate::truncate_sheet_xml;
use worksheet::{parse_sheet, SheetContext};

const WORKBOOK: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const STYLES: &str = "xl/styles.xml";
const THEME: &str = "xl/theme/theme1.xml";
const WORKSHEETS_DIR: &str = "xl/worksheets/";

/// One worksheet to parse: its tab name, state and raw XML.
struct SheetJob {
    name: String,
    state: SheetState,
    xml: Vec<u8>,
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<Vec<u8>>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut data = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
    file.read_to_end(&mut data)?;
    Ok(Some(data))
}

/// Decode an XLSX archive held in memory.
pub fn decode(data: &[u8], row_limit: RowLimit) -> Result<Document> {
    decode_archive(Cursor::new(data), row_limit, 0)
}

/// Decode with explicit options (row limit and thread count).
pub fn decode_with_options(data: &[u8], options: &DecodeOptions) -> Result<Document> {
    decode_archive(Cursor::new(data), options.row_limit(), options.num_threads)
}

/// Read and decode an XLSX file from disk.
pub fn open_file<P: AsRef<Path>>(path: P, row_limit: RowLimit) -> Result<Document> {
    let file = std::fs::File::open(path.as_ref())?;
    decode_archive(std::io::BufReader::new(file), row_limit, 0)
}

fn decode_archive<R: Read + Seek>(
    reader: R,
    row_limit: RowLimit,
    num_threads: usize,
) -> Result<Document> {
    let mut archive = ZipArchive::new(reader)?;

    let has_worksheets = archive
        .file_names()
        .any(|name| name.starts_with(WORKSHEETS_DIR) && name.ends_with(".xml"));

    let rels_xml = read_part(&mut archive, WORKBOOK_RELS)?
        .ok_or_else(|| XlstreamError::MissingPart(WORKBOOK_RELS.to_string()))?;
    let relationships = parse_workbook_relationships(rels_xml.as_slice())?;
    if !has_worksheets {
        return Err(XlstreamError::NoWorksheets);
    }

    // A workbook without strings may have no shared strings part.
    let sst_path = relationships
        .shared_strings
        .as_deref()
        .unwrap_or(SHARED_STRINGS);
    let shared_strings = match read_part(&mut archive, sst_path)? {
        Some(xml) => parse_shared_strings(xml.as_slice())?,
        None => SharedStringTable::new(),
    };

    // Style colors may name theme slots; without a theme part the Office one applies.
    let theme_path = relationships.theme.as_deref().unwrap_or(THEME);
    let theme = match read_part(&mut archive, theme_path)? {
        Some(xml) => parse_theme(xml.as_slice())?,
        None => Theme::default(),
    };

    let styles_path = relationships.styles.as_deref().unwrap_or(STYLES);
    let styles = match read_part(&mut archive, styles_path)? {
        Some(xml) => Some(parse_styles_with_theme(xml.as_slice(), &theme)?),
        None => None,
    };

    let workbook_xml = read_part(&mut archive, WORKBOOK)?
        .ok_or_else(|| XlstreamError::MissingPart(WORKBOOK.to_string()))?;
    let workbook = parse_workbook(workbook_xml.as_slice())?;

    // Chart sheets hold no cells and are skipped; any other sheet must resolve.
    let mut jobs = Vec::with_capacity(workbook.sheets.len());
    for info in &workbook.sheets {
        if relationships.chartsheets.contains(&info.r_id) {
            log::debug!("skipping chart sheet {:?}", info.name);
            continue;
        }
        let path = relationships.worksheets.get(&info.r_id).ok_or_else(|| {
            XlstreamError::CorruptInput(format!(
                "sheet {:?} refers to unknown relationship {:?}",
                info.name, info.r_id
            ))
        })?;
        let xml = read_part(&mut archive, path)?
            .ok_or_else(|| XlstreamError::MissingPart(path.clone()))?;
        jobs.push(SheetJob {
            name: info.name.clone(),
            state: info.state,
            xml,
        });
    }
    if jobs.is_empty() {
        return Err(XlstreamError::NoSheets);
    }
    log::debug!(
        "located {} sheets, {} shared strings, styles part {}",
        jobs.len(),
        shared_strings.len(),
        if styles.is_some() { "present" } else { "absent" }
    );

    let shared_styles: Vec<Arc<Style>> = styles
        .as_ref()
        .map(StyleRegistry::shared_styles)
        .unwrap_or_default();
    let num_fmts: Vec<String> = styles.as_ref().map_or_else(Vec::new, |registry| {
        (0..registry.cell_xfs().len())
            .map(|idx| registry.num_fmt_for_xf(idx))
            .collect()
    });
    let ctx = SheetContext {
        shared_strings: &shared_strings,
        styles: &shared_styles,
        num_fmts: &num_fmts,
        date1904: workbook.date1904,
        row_limit,
    };

    let sheets = parse_sheets(&jobs, &ctx, num_threads)?;

    let mut document = Document::new();
    document.date1904 = workbook.date1904;
    document.defined_names = workbook.defined_names;
    let mut names: HashMap<String, usize> = HashMap::with_capacity(sheets.len());
    for (idx, mut sheet) in sheets.into_iter().enumerate() {
        sheet.selected = idx == 0;
        if names.insert(sheet.name.clone(), idx).is_some() {
            return Err(XlstreamError::DuplicateSheetName(sheet.name));
        }
        document.sheets.push(sheet);
    }
    document.shared_strings = shared_strings;
    document.styles = styles.unwrap_or_default();
    Ok(document)
}

fn parse_one(job: &SheetJob, ctx: &SheetContext<'_>) -> Result<Sheet> {
    let xml = match ctx.row_limit {
        RowLimit::Rows(limit) => truncate_sheet_xml(&job.xml, limit)?,
        RowLimit::Unlimited => std::borrow::Cow::Borrowed(job.xml.as_slice()),
    };
    parse_sheet(&xml, &job.name, job.state, ctx)
}

/// Parse every sheet, keeping workbook order and stopping at the first error.
fn parse_sheets(
    jobs: &[SheetJob],
    ctx: &SheetContext<'_>,
    num_threads: usize,
) -> Result<Vec<Sheet>> {
    if num_threads == 1 || jobs.len() == 1 {
        return jobs.iter().map(|job| parse_one(job, ctx)).collect();
    }
    if num_threads == 0 {
        return jobs.par_iter().map(|job| parse_one(job, ctx)).collect();
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| XlstreamError::ThreadPool(e.to_string()))?;
    pool.install(|| jobs.par_iter().map(|job| parse_one(job, ctx)).collect())
}

impl Document {
    /// Read an XLSX file from disk with no row limit.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        open_file(path, RowLimit::Unlimited)
    }
}
