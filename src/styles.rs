//! Style registry backed by `xl/styles.xml`
//!
//! Fonts, fills, borders and cell formats (xf) are stored in index order and
//! deduplicated by their serialized form, so equal records share one index.
//! Custom number formats get ids from 164 upwards.

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::color::{resolve_color, ColorSpec};
use crate::error::Result;
use crate::numfmt::{self, builtin_format, builtin_format_id, FIRST_CUSTOM_NUM_FMT_ID, GENERAL};
use crate::theme::Theme;
use crate::types::{Alignment, Border, BorderStyle, Fill, Font, HAlign, PatternType, Style, VAlign};
use crate::xml_helpers::{attr_string, attr_usize, attr_val, flag_attr, xml_escape, XML_HEADER};

const STYLES_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// One `xf` record from `cellXfs` or `cellStyleXfs`.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellXf {
    pub font_id: usize,
    pub fill_id: usize,
    pub border_id: usize,
    pub num_fmt_id: u32,
    /// Index of the named style this format derives from.
    pub xf_id: Option<usize>,
    pub apply_font: bool,
    pub apply_fill: bool,
    pub apply_border: bool,
    pub apply_alignment: bool,
    pub apply_number_format: bool,
    pub alignment: Option<Alignment>,
}

/// Deduplicating store of style records for one document.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    fonts: Vec<Font>,
    font_keys: HashMap<String, usize>,
    fills: Vec<Fill>,
    fill_keys: HashMap<String, usize>,
    borders: Vec<Border>,
    border_keys: HashMap<String, usize>,
    cell_style_xfs: Vec<CellXf>,
    cell_xfs: Vec<CellXf>,
    xf_keys: HashMap<String, usize>,
    num_fmts: Vec<(u32, String)>,
    num_fmt_ids: HashMap<String, u32>,
    next_num_fmt_id: u32,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleRegistry {
    /// A registry holding the default font, border and cell format plus
    /// the `none` and `lightGray` fills.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.add_font(&Font::default());
        registry.add_fill(&Fill::default());
        registry.add_fill(&light_gray_fill());
        registry.add_border(&Border::default());
        registry.cell_style_xfs.push(CellXf::default());
        registry.add_cell_xf(&CellXf::default());
        registry
    }

    fn empty() -> Self {
        Self {
            fonts: Vec::new(),
            font_keys: HashMap::new(),
            fills: Vec::new(),
            fill_keys: HashMap::new(),
            borders: Vec::new(),
            border_keys: HashMap::new(),
            cell_style_xfs: Vec::new(),
            cell_xfs: Vec::new(),
            xf_keys: HashMap::new(),
            num_fmts: Vec::new(),
            num_fmt_ids: HashMap::new(),
            next_num_fmt_id: FIRST_CUSTOM_NUM_FMT_ID,
        }
    }

    pub fn fonts(&self) -> &[Font] {
        &self.fonts
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    pub fn borders(&self) -> &[Border] {
        &self.borders
    }

    pub fn cell_xfs(&self) -> &[CellXf] {
        &self.cell_xfs
    }

    /// Custom number formats as `(numFmtId, formatCode)`.
    pub fn num_fmts(&self) -> &[(u32, String)] {
        &self.num_fmts
    }

    pub fn add_font(&mut self, font: &Font) -> usize {
        intern(&mut self.fonts, &mut self.font_keys, font_xml(font), font)
    }

    pub fn add_fill(&mut self, fill: &Fill) -> usize {
        intern(&mut self.fills, &mut self.fill_keys, fill_xml(fill), fill)
    }

    pub fn add_border(&mut self, border: &Border) -> usize {
        intern(&mut self.borders, &mut self.border_keys, border_xml(border), border)
    }

    pub fn add_cell_xf(&mut self, xf: &CellXf) -> usize {
        intern(&mut self.cell_xfs, &mut self.xf_keys, xf_xml(xf), xf)
    }

    /// The id for a format code. Built-in codes keep their reserved id;
    /// empty and `general` codes map to 0.
    pub fn add_number_format(&mut self, code: &str) -> u32 {
        if numfmt::is_general(code) {
            return 0;
        }
        if let Some(id) = builtin_format_id(code) {
            return id;
        }
        if let Some(&id) = self.num_fmt_ids.get(code) {
            return id;
        }
        let id = self.next_num_fmt_id;
        self.next_num_fmt_id += 1;
        self.num_fmt_ids.insert(code.to_string(), id);
        self.num_fmts.push((id, code.to_string()));
        id
    }

    /// Register every part of `style` and return the cell format index.
    pub fn add_style(&mut self, style: &Style, num_fmt_id: u32) -> usize {
        let font_id = self.add_font(&style.font);
        let fill_id = self.add_fill(&style.fill);
        // registries read from a file may lack it
        self.add_fill(&light_gray_fill());
        let xf = CellXf {
            font_id,
            fill_id,
            border_id: self.add_border(&style.border),
            num_fmt_id,
            xf_id: style.named_style_index,
            apply_font: style.apply_font,
            apply_fill: style.apply_fill,
            apply_border: style.apply_border,
            apply_alignment: style.apply_alignment,
            apply_number_format: num_fmt_id > 0,
            alignment: Some(style.alignment.clone()),
        };
        self.add_cell_xf(&xf)
    }

    /// A cell format that only carries a number format.
    pub fn add_num_fmt_xf(&mut self, num_fmt_id: u32) -> usize {
        self.add_cell_xf(&CellXf {
            num_fmt_id,
            apply_number_format: num_fmt_id > 0,
            ..CellXf::default()
        })
    }

    /// Rebuild the [`Style`] a cell format describes.
    pub fn style_for_xf(&self, idx: usize) -> Option<Style> {
        let xf = self.cell_xfs.get(idx)?;
        Some(Style {
            font: self.fonts.get(xf.font_id).cloned().unwrap_or_default(),
            fill: self.fills.get(xf.fill_id).cloned().unwrap_or_default(),
            border: self.borders.get(xf.border_id).cloned().unwrap_or_default(),
            alignment: xf.alignment.clone().unwrap_or_default(),
            apply_border: xf.apply_border,
            apply_fill: xf.apply_fill,
            apply_font: xf.apply_font,
            apply_alignment: xf.apply_alignment,
            named_style_index: xf.xf_id,
        })
    }

    /// Styles for every cell format, shared so cells can point at them.
    pub(crate) fn shared_styles(&self) -> Vec<Arc<Style>> {
        (0..self.cell_xfs.len())
            .filter_map(|idx| self.style_for_xf(idx).map(Arc::new))
            .collect()
    }

    /// Format code for a cell format, `general` when it names no known format.
    pub fn num_fmt_for_xf(&self, idx: usize) -> String {
        let Some(xf) = self.cell_xfs.get(idx) else {
            return GENERAL.to_string();
        };
        self.num_fmt_code(xf.num_fmt_id)
    }

    /// Format code for a number format id.
    pub fn num_fmt_code(&self, id: u32) -> String {
        if let Some((_, code)) = self.num_fmts.iter().find(|(i, _)| *i == id) {
            return code.clone();
        }
        builtin_format(id).unwrap_or(GENERAL).to_string()
    }

    /// Serialize as a `styleSheet` part.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(2048);
        xml.push_str(XML_HEADER);
        xml.push_str(&format!("<styleSheet xmlns=\"{STYLES_NS}\">"));

        if !self.num_fmts.is_empty() {
            xml.push_str(&format!("<numFmts count=\"{}\">", self.num_fmts.len()));
            for (id, code) in &self.num_fmts {
                xml.push_str(&format!(
                    "<numFmt numFmtId=\"{id}\" formatCode=\"{}\"/>",
                    xml_escape(code)
                ));
            }
            xml.push_str("</numFmts>");
        }

        push_section(&mut xml, "fonts", self.fonts.iter().map(font_xml));
        push_section(&mut xml, "fills", self.fills.iter().map(fill_xml));
        push_section(&mut xml, "borders", self.borders.iter().map(border_xml));
        if self.cell_style_xfs.is_empty() {
            push_section(&mut xml, "cellStyleXfs", std::iter::once(xf_xml(&CellXf::default())));
        } else {
            push_section(&mut xml, "cellStyleXfs", self.cell_style_xfs.iter().map(xf_xml));
        }
        push_section(&mut xml, "cellXfs", self.cell_xfs.iter().map(xf_xml));
        xml.push_str(
            "<cellStyles count=\"1\"><cellStyle name=\"Normal\" xfId=\"0\" builtinId=\"0\"/></cellStyles>",
        );
        xml.push_str("</styleSheet>");
        xml
    }

    /// Append a record read from a file. Index positions follow the file.
    fn push_read_font(&mut self, font: Font) {
        let idx = self.fonts.len();
        self.font_keys.entry(font_xml(&font)).or_insert(idx);
        self.fonts.push(font);
    }

    fn push_read_fill(&mut self, fill: Fill) {
        let idx = self.fills.len();
        self.fill_keys.entry(fill_xml(&fill)).or_insert(idx);
        self.fills.push(fill);
    }

    fn push_read_border(&mut self, border: Border) {
        let idx = self.borders.len();
        self.border_keys.entry(border_xml(&border)).or_insert(idx);
        self.borders.push(border);
    }

    fn push_read_xf(&mut self, xf: CellXf) {
        let idx = self.cell_xfs.len();
        self.xf_keys.entry(xf_xml(&xf)).or_insert(idx);
        self.cell_xfs.push(xf);
    }

    fn push_read_num_fmt(&mut self, id: u32, code: String) {
        self.num_fmt_ids.entry(code.clone()).or_insert(id);
        self.next_num_fmt_id = self.next_num_fmt_id.max(id.saturating_add(1));
        self.num_fmts.push((id, code));
    }

    /// Store a resolved color on the record it was read from.
    fn set_read_color(&mut self, target: ColorTarget, argb: String) {
        match target {
            ColorTarget::Font(idx) => {
                if let Some(font) = self.fonts.get_mut(idx) {
                    font.color = argb;
                }
            }
            ColorTarget::FillFg(idx) => {
                if let Some(fill) = self.fills.get_mut(idx) {
                    fill.fg_color = argb;
                }
            }
            ColorTarget::FillBg(idx) => {
                if let Some(fill) = self.fills.get_mut(idx) {
                    fill.bg_color = argb;
                }
            }
            ColorTarget::Border(idx, side) => {
                if let Some(border) = self.borders.get_mut(idx) {
                    *side_mut(border, side).1 = argb;
                }
            }
        }
    }

    /// Recompute the dedup keys after read records changed.
    fn rekey_read_records(&mut self) {
        self.font_keys.clear();
        for (idx, font) in self.fonts.iter().enumerate() {
            self.font_keys.entry(font_xml(font)).or_insert(idx);
        }
        self.fill_keys.clear();
        for (idx, fill) in self.fills.iter().enumerate() {
            self.fill_keys.entry(fill_xml(fill)).or_insert(idx);
        }
        self.border_keys.clear();
        for (idx, border) in self.borders.iter().enumerate() {
            self.border_keys.entry(border_xml(border)).or_insert(idx);
        }
    }
}

/// Record a color element points at, by index in the registry.
#[derive(Clone, Copy)]
enum ColorTarget {
    Font(usize),
    FillFg(usize),
    FillBg(usize),
    Border(usize, Side),
}

fn light_gray_fill() -> Fill {
    Fill::new(PatternType::LightGray, "", "")
}

fn intern<T: Clone>(items: &mut Vec<T>, keys: &mut HashMap<String, usize>, key: String, item: &T) -> usize {
    *keys.entry(key).or_insert_with(|| {
        items.push(item.clone());
        items.len() - 1
    })
}

fn push_section(xml: &mut String, tag: &str, parts: impl ExactSizeIterator<Item = String>) {
    xml.push_str(&format!("<{tag} count=\"{}\">", parts.len()));
    for part in parts {
        xml.push_str(&part);
    }
    xml.push_str(&format!("</{tag}>"));
}

fn color_xml(tag: &str, rgb: &str) -> String {
    if rgb.is_empty() {
        String::new()
    } else {
        format!("<{tag} rgb=\"{}\"/>", xml_escape(rgb))
    }
}

fn font_xml(font: &Font) -> String {
    let mut xml = String::from("<font>");
    if font.bold {
        xml.push_str("<b/>");
    }
    if font.italic {
        xml.push_str("<i/>");
    }
    if font.underline {
        xml.push_str("<u/>");
    }
    xml.push_str(&format!("<sz val=\"{}\"/>", numfmt::shortest_fixed(font.size)));
    xml.push_str(&color_xml("color", &font.color));
    xml.push_str(&format!(
        "<name val=\"{}\"/><family val=\"{}\"/><charset val=\"{}\"/></font>",
        xml_escape(&font.name),
        font.family,
        font.charset
    ));
    xml
}

fn fill_xml(fill: &Fill) -> String {
    let colors = format!(
        "{}{}",
        color_xml("fgColor", &fill.fg_color),
        color_xml("bgColor", &fill.bg_color)
    );
    let pattern = fill.pattern_type.as_str();
    if colors.is_empty() {
        format!("<fill><patternFill patternType=\"{pattern}\"/></fill>")
    } else {
        format!("<fill><patternFill patternType=\"{pattern}\">{colors}</patternFill></fill>")
    }
}

fn border_side_xml(tag: &str, style: BorderStyle, color: &str) -> String {
    let attr = if style == BorderStyle::None {
        String::new()
    } else {
        format!(" style=\"{}\"", style.as_str())
    };
    let color = color_xml("color", color);
    if color.is_empty() {
        format!("<{tag}{attr}/>")
    } else {
        format!("<{tag}{attr}>{color}</{tag}>")
    }
}

fn border_xml(border: &Border) -> String {
    format!(
        "<border>{}{}{}{}<diagonal/></border>",
        border_side_xml("left", border.left, &border.left_color),
        border_side_xml("right", border.right, &border.right_color),
        border_side_xml("top", border.top, &border.top_color),
        border_side_xml("bottom", border.bottom, &border.bottom_color),
    )
}

fn alignment_xml(a: &Alignment) -> String {
    let mut xml = format!(
        "<alignment horizontal=\"{}\" vertical=\"{}\"",
        a.horizontal.as_str(),
        a.vertical.as_str()
    );
    if a.indent > 0 {
        xml.push_str(&format!(" indent=\"{}\"", a.indent));
    }
    if a.text_rotation != 0 {
        xml.push_str(&format!(" textRotation=\"{}\"", a.text_rotation));
    }
    xml.push_str(&flag_attr("shrinkToFit", a.shrink_to_fit));
    xml.push_str(&flag_attr("wrapText", a.wrap_text));
    xml.push_str("/>");
    xml
}

fn xf_xml(xf: &CellXf) -> String {
    let mut xml = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\"",
        xf.num_fmt_id, xf.font_id, xf.fill_id, xf.border_id
    );
    if let Some(xf_id) = xf.xf_id {
        xml.push_str(&format!(" xfId=\"{xf_id}\""));
    }
    xml.push_str(&flag_attr("applyNumberFormat", xf.apply_number_format));
    xml.push_str(&flag_attr("applyFont", xf.apply_font));
    xml.push_str(&flag_attr("applyFill", xf.apply_fill));
    xml.push_str(&flag_attr("applyBorder", xf.apply_border));
    xml.push_str(&flag_attr("applyAlignment", xf.apply_alignment));
    match &xf.alignment {
        Some(alignment) => {
            xml.push('>');
            xml.push_str(&alignment_xml(alignment));
            xml.push_str("</xf>");
        }
        None => xml.push_str("/>"),
    }
    xml
}

fn read_xf(e: &BytesStart) -> CellXf {
    CellXf {
        font_id: attr_usize(e, b"fontId").unwrap_or(0),
        fill_id: attr_usize(e, b"fillId").unwrap_or(0),
        border_id: attr_usize(e, b"borderId").unwrap_or(0),
        num_fmt_id: attr_string(e, b"numFmtId")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0),
        xf_id: attr_usize(e, b"xfId"),
        apply_font: is_true(e, b"applyFont"),
        apply_fill: is_true(e, b"applyFill"),
        apply_border: is_true(e, b"applyBorder"),
        apply_alignment: is_true(e, b"applyAlignment"),
        apply_number_format: is_true(e, b"applyNumberFormat"),
        alignment: None,
    }
}

fn read_alignment(e: &BytesStart) -> Alignment {
    Alignment {
        horizontal: attr_string(e, b"horizontal").map_or(HAlign::General, |s| HAlign::from_xml(&s)),
        vertical: attr_string(e, b"vertical").map_or(VAlign::Bottom, |s| VAlign::from_xml(&s)),
        indent: attr_string(e, b"indent")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0),
        shrink_to_fit: is_true(e, b"shrinkToFit"),
        text_rotation: attr_string(e, b"textRotation")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0),
        wrap_text: is_true(e, b"wrapText"),
    }
}

fn is_true(e: &BytesStart, key: &[u8]) -> bool {
    matches!(attr_string(e, key).as_deref(), Some("1" | "true"))
}

/// Which border edge is being read.
#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

fn side_mut(border: &mut Border, side: Side) -> (&mut BorderStyle, &mut String) {
    match side {
        Side::Left => (&mut border.left, &mut border.left_color),
        Side::Right => (&mut border.right, &mut border.right_color),
        Side::Top => (&mut border.top, &mut border.top_color),
        Side::Bottom => (&mut border.bottom, &mut border.bottom_color),
    }
}

/// Parse styles.xml content, resolving theme colors against the Office theme.
pub fn parse_styles<R: BufRead>(reader: R) -> Result<StyleRegistry> {
    parse_styles_with_theme(reader, &Theme::default())
}

/// Parse styles.xml content.
///
/// `theme`, `indexed` and `tint` color references are resolved to ARGB once
/// the whole part is read, since a custom `indexedColors` palette comes
/// after the records that use it. Automatic colors stay empty.
#[allow(clippy::too_many_lines)]
pub fn parse_styles_with_theme<R: BufRead>(reader: R, theme: &Theme) -> Result<StyleRegistry> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut registry = StyleRegistry::empty();
    let mut buf = Vec::new();

    // State tracking
    let mut in_num_fmts = false;
    let mut in_fonts = false;
    let mut in_fills = false;
    let mut in_borders = false;
    let mut in_cell_xfs = false;
    let mut in_cell_style_xfs = false;

    let mut current_font: Option<Font> = None;
    let mut current_fill: Option<Fill> = None;
    let mut current_border: Option<Border> = None;
    let mut current_side: Option<Side> = None;
    let mut current_xf: Option<CellXf> = None;
    let mut font_scheme: Option<String> = None;
    let mut in_indexed_colors = false;
    let mut palette: Vec<String> = Vec::new();
    let mut colors: Vec<(ColorTarget, ColorSpec)> = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            ref event @ (Event::Start(ref e) | Event::Empty(ref e)) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"numFmts" => in_num_fmts = !is_empty,
                    b"fonts" => in_fonts = !is_empty,
                    b"fills" => in_fills = !is_empty,
                    b"borders" => in_borders = !is_empty,
                    b"cellXfs" => in_cell_xfs = !is_empty,
                    b"cellStyleXfs" => in_cell_style_xfs = !is_empty,

                    b"numFmt" if in_num_fmts => {
                        let id = attr_string(e, b"numFmtId").and_then(|s| s.trim().parse().ok());
                        if let Some(id) = id {
                            let code = attr_string(e, b"formatCode").unwrap_or_default();
                            registry.push_read_num_fmt(id, code);
                        }
                    }

                    b"font" if in_fonts => {
                        let font = Font {
                            size: 0.0,
                            name: String::new(),
                            ..Font::default()
                        };
                        font_scheme = None;
                        if is_empty {
                            registry.push_read_font(font);
                        } else {
                            current_font = Some(font);
                        }
                    }
                    b"b" => {
                        if let Some(font) = current_font.as_mut() {
                            font.bold = attr_val(e).map_or(true, |v| v != "0" && v != "false");
                        }
                    }
                    b"i" => {
                        if let Some(font) = current_font.as_mut() {
                            font.italic = attr_val(e).map_or(true, |v| v != "0" && v != "false");
                        }
                    }
                    b"u" => {
                        if let Some(font) = current_font.as_mut() {
                            font.underline = attr_val(e).map_or(true, |v| v != "none");
                        }
                    }
                    b"sz" => {
                        if let Some(font) = current_font.as_mut() {
                            font.size = attr_val(e)
                                .and_then(|v| v.trim().parse().ok())
                                .unwrap_or(0.0);
                        }
                    }
                    b"name" => {
                        if let Some(font) = current_font.as_mut() {
                            font.name = attr_val(e).unwrap_or_default();
                        }
                    }
                    b"family" => {
                        if let Some(font) = current_font.as_mut() {
                            font.family = attr_val(e)
                                .and_then(|v| v.trim().parse().ok())
                                .unwrap_or(0);
                        }
                    }
                    b"scheme" if current_font.is_some() => font_scheme = attr_val(e),
                    b"charset" => {
                        if let Some(font) = current_font.as_mut() {
                            font.charset = attr_val(e)
                                .and_then(|v| v.trim().parse().ok())
                                .unwrap_or(0);
                        }
                    }

                    b"fill" if in_fills => {
                        let fill = Fill::new(PatternType::None, "", "");
                        if is_empty {
                            registry.push_read_fill(fill);
                        } else {
                            current_fill = Some(fill);
                        }
                    }
                    b"patternFill" => {
                        if let Some(fill) = current_fill.as_mut() {
                            fill.pattern_type = attr_string(e, b"patternType")
                                .map_or(PatternType::None, |s| PatternType::from_xml(&s));
                        }
                    }
                    b"fgColor" if current_fill.is_some() => {
                        colors.push((ColorTarget::FillFg(registry.fills.len()), ColorSpec::from_element(e)));
                    }
                    b"bgColor" if current_fill.is_some() => {
                        colors.push((ColorTarget::FillBg(registry.fills.len()), ColorSpec::from_element(e)));
                    }

                    b"border" if in_borders => {
                        if is_empty {
                            registry.push_read_border(Border::default());
                        } else {
                            current_border = Some(Border::default());
                        }
                    }
                    tag @ (b"left" | b"right" | b"top" | b"bottom" | b"start" | b"end") => {
                        if let Some(border) = current_border.as_mut() {
                            let side = match tag {
                                b"right" | b"end" => Side::Right,
                                b"top" => Side::Top,
                                b"bottom" => Side::Bottom,
                                _ => Side::Left,
                            };
                            let (style, _) = side_mut(border, side);
                            *style = attr_string(e, b"style")
                                .map_or(BorderStyle::None, |s| BorderStyle::from_xml(&s));
                            current_side = if is_empty { None } else { Some(side) };
                        }
                    }
                    b"color" => {
                        let target = if let (Some(_), Some(side)) = (&current_border, current_side) {
                            Some(ColorTarget::Border(registry.borders.len(), side))
                        } else if current_font.is_some() {
                            Some(ColorTarget::Font(registry.fonts.len()))
                        } else {
                            None
                        };
                        if let Some(target) = target {
                            colors.push((target, ColorSpec::from_element(e)));
                        }
                    }
                    b"indexedColors" => in_indexed_colors = !is_empty,
                    b"rgbColor" if in_indexed_colors => {
                        let rgb = attr_string(e, b"rgb").unwrap_or_default();
                        // ARGB in the file, RRGGBB in the palette
                        let start = rgb.len().saturating_sub(6);
                        palette.push(rgb.get(start..).unwrap_or_default().to_string());
                    }

                    b"xf" if in_cell_xfs || in_cell_style_xfs => {
                        let xf = read_xf(e);
                        if is_empty {
                            if in_cell_xfs {
                                registry.push_read_xf(xf);
                            } else {
                                registry.cell_style_xfs.push(xf);
                            }
                        } else {
                            current_xf = Some(xf);
                        }
                    }
                    b"alignment" => {
                        if let Some(xf) = current_xf.as_mut() {
                            xf.alignment = Some(read_alignment(e));
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"numFmts" => in_num_fmts = false,
                b"fonts" => in_fonts = false,
                b"fills" => in_fills = false,
                b"borders" => in_borders = false,
                b"cellXfs" => in_cell_xfs = false,
                b"cellStyleXfs" => in_cell_style_xfs = false,
                b"font" => {
                    if let Some(mut font) = current_font.take() {
                        if font.name.is_empty() {
                            let themed = match font_scheme.as_deref() {
                                Some("major") => theme.major_font.clone(),
                                Some("minor") => theme.minor_font.clone(),
                                _ => None,
                            };
                            font.name = themed.unwrap_or_default();
                        }
                        registry.push_read_font(font);
                    }
                }
                b"indexedColors" => in_indexed_colors = false,
                b"fill" => {
                    if let Some(fill) = current_fill.take() {
                        registry.push_read_fill(fill);
                    }
                }
                b"border" => {
                    if let Some(border) = current_border.take() {
                        registry.push_read_border(border);
                    }
                }
                b"left" | b"right" | b"top" | b"bottom" | b"start" | b"end" => current_side = None,
                b"xf" => {
                    if let Some(xf) = current_xf.take() {
                        if in_cell_xfs {
                            registry.push_read_xf(xf);
                        } else if in_cell_style_xfs {
                            registry.cell_style_xfs.push(xf);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    for (target, spec) in colors {
        if spec.rgb.is_none() && spec.theme.is_none() && spec.indexed.is_none() {
            continue;
        }
        match resolve_color(&spec, &theme.colors, &palette) {
            Some(argb) => registry.set_read_color(target, argb),
            None => log::debug!("unresolved style color {spec:?}"),
        }
    }
    registry.rekey_read_records();

    log::debug!(
        "read styles: {} fonts, {} fills, {} borders, {} cell formats, {} number formats",
        registry.fonts.len(),
        registry.fills.len(),
        registry.borders.len(),
        registry.cell_xfs.len(),
        registry.num_fmts.len()
    );
    Ok(registry)
}
