//! Theme colors and fonts from `xl/theme/theme1.xml`.

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::color::DEFAULT_THEME_COLORS;
use crate::error::Result;
use crate::xml_helpers::attr_string;

/// Scheme slot names in style index order (`lt1` before `dk1`).
const COLOR_SLOTS: [&str; 12] = [
    "lt1", "dk1", "lt2", "dk2", "accent1", "accent2", "accent3", "accent4", "accent5",
    "accent6", "hlink", "folHlink",
];

/// Workbook theme: twelve `RRGGBB` colors plus the heading and body fonts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub colors: Vec<String>,
    pub major_font: Option<String>,
    pub minor_font: Option<String>,
}

impl Default for Theme {
    /// The Office theme.
    fn default() -> Self {
        Self {
            colors: DEFAULT_THEME_COLORS.iter().map(|s| (*s).to_string()).collect(),
            major_font: None,
            minor_font: None,
        }
    }
}

/// Parse a theme part. Slots the scheme leaves out keep their Office color.
pub fn parse_theme<R: BufRead>(reader: R) -> Result<Theme> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut theme = Theme::default();
    let mut buf = Vec::new();
    let mut slot: Option<usize> = None;
    let mut in_major = false;
    let mut in_minor = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"majorFont" => in_major = true,
                b"minorFont" => in_minor = true,
                b"latin" => {
                    let typeface = attr_string(e, b"typeface").filter(|t| !t.is_empty());
                    if in_major {
                        theme.major_font = typeface;
                    } else if in_minor {
                        theme.minor_font = typeface;
                    }
                }
                b"srgbClr" | b"sysClr" => {
                    let key: &[u8] = if e.local_name().as_ref() == b"sysClr" {
                        b"lastClr"
                    } else {
                        b"val"
                    };
                    if let (Some(idx), Some(rgb)) = (slot, attr_string(e, key)) {
                        if let Some(color) = theme.colors.get_mut(idx) {
                            *color = rgb.to_ascii_uppercase();
                        }
                    }
                }
                name => {
                    if let Some(idx) = COLOR_SLOTS
                        .iter()
                        .position(|s| s.as_bytes() == name)
                    {
                        slot = Some(idx);
                    }
                }
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"majorFont" => in_major = false,
                b"minorFont" => in_minor = false,
                name if COLOR_SLOTS.iter().any(|s| s.as_bytes() == name) => slot = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    log::debug!(
        "read theme: major font {:?}, minor font {:?}",
        theme.major_font,
        theme.minor_font
    );
    Ok(theme)
}
