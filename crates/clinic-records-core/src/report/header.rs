//! Clinic letterhead and page footer.

use serde::{Deserialize, Serialize};

use super::layout::{
    text_width, wrap_text, FontFace, PageDecoration, PageGeometry, Rgb, Rule, TextRun,
    TextStyle,
};

const CLINIC_NAME: TextStyle = TextStyle::new(FontFace::Bold, 20.0, Rgb::RED);
const PRACTITIONER: TextStyle = TextStyle::new(FontFace::Bold, 10.0, Rgb::NAVY);
const DETAIL: TextStyle = TextStyle::new(FontFace::Regular, 8.5, Rgb::BLACK);
const FOOTER: TextStyle = TextStyle::new(FontFace::Oblique, 8.0, Rgb::BLACK);

/// Space between the top edge of the page and the letterhead.
const TOP_CLEARANCE: f32 = 25.0;

/// Fixed identity printed at the top of every report page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicHeader {
    pub clinic_name: String,
    pub practitioner_name: String,
    pub credentials: String,
    pub registration_no: String,
    pub address: String,
    pub contact: String,
}

impl Default for ClinicHeader {
    fn default() -> Self {
        Self {
            clinic_name: "Shradha Homoeo Clinic".to_string(),
            practitioner_name: "Dr. Ramesh Ramrao Mustare".to_string(),
            credentials: "D.H.M.S., C.C.M.P.(C.C.H.)".to_string(),
            registration_no: "Reg. No: 20702".to_string(),
            address: "Kamtha(BK), Tq Ardhapur, Dist Nanded, 431704".to_string(),
            contact: "Contact: +91 9420911808".to_string(),
        }
    }
}

/// Baseline distance between letterhead detail lines.
const DETAIL_LEADING: f32 = 10.0;
/// Most lines the address or registration cell may take.
const DETAIL_MAX_LINES: usize = 2;
/// Space kept between the address and registration cells.
const CELL_GUTTER: f32 = 6.0;

/// Wrap `text` to `width`, keeping at most `max_lines`. Anything beyond is
/// cut and marked with "...".
fn fit_lines(text: &str, style: &TextStyle, width: f32, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = wrap_text(text.trim(), style, width)
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect();
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            while !last.is_empty() && text_width(&format!("{last}..."), style) > width {
                last.pop();
            }
            last.push_str("...");
        }
    }
    lines
}

impl ClinicHeader {
    /// "Dr. Name, Degrees", or whichever half is set.
    pub fn practitioner_line(&self) -> String {
        [self.practitioner_name.trim(), self.credentials.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Letterhead and footer for page `page_number`.
    ///
    /// Address and registration number each get half the content width,
    /// like two table cells; a long value wraps onto a second line and
    /// pushes the contact line and divider down.
    pub fn decorate(&self, page_number: usize, geometry: &PageGeometry) -> PageDecoration {
        let left = geometry.margin_left;
        let right = geometry.width - geometry.margin_right;
        let top = geometry.height - TOP_CLEARANCE;
        let cell = geometry.content_width() / 2.0 - CELL_GUTTER;

        let centred = |text: String, style: TextStyle, y: f32| TextRun {
            x: (geometry.width - text_width(&text, &style)) / 2.0,
            text,
            y,
            style,
        };

        let mut runs = vec![centred(self.clinic_name.to_uppercase(), CLINIC_NAME, top - 18.0)];

        let practitioner = self.practitioner_line();
        if !practitioner.is_empty() {
            runs.push(centred(practitioner, PRACTITIONER, top - 38.0));
        }

        let address = fit_lines(&self.address, &DETAIL, cell, DETAIL_MAX_LINES);
        let registration = fit_lines(&self.registration_no, &DETAIL, cell, DETAIL_MAX_LINES);
        for (i, line) in address.iter().enumerate() {
            runs.push(TextRun {
                text: line.clone(),
                x: left,
                y: top - 51.0 - i as f32 * DETAIL_LEADING,
                style: DETAIL,
            });
        }
        for (i, line) in registration.iter().enumerate() {
            runs.push(TextRun {
                x: right - text_width(line, &DETAIL),
                text: line.clone(),
                y: top - 51.0 - i as f32 * DETAIL_LEADING,
                style: DETAIL,
            });
        }
        let shift = address.len().max(registration.len()).saturating_sub(1) as f32 * DETAIL_LEADING;

        if let Some(contact) = fit_lines(&self.contact, &DETAIL, right - left, 1).pop() {
            runs.push(TextRun {
                text: contact,
                x: left,
                y: top - 61.0 - shift,
                style: DETAIL,
            });
        }

        runs.push(centred(
            footer_text(page_number),
            FOOTER,
            geometry.margin_bottom / 2.0,
        ));

        PageDecoration {
            runs,
            rules: vec![Rule {
                x1: left,
                x2: right,
                y: top - 67.0 - shift,
                thickness: 1.5,
                color: Rgb::TEAL,
            }],
        }
    }
}

pub fn footer_text(page_number: usize) -> String {
    format!("Page {page_number}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> ClinicHeader {
        ClinicHeader {
            clinic_name: "Sunrise Clinic".into(),
            practitioner_name: "Dr. A. Rao".into(),
            credentials: "D.H.M.S.".into(),
            registration_no: "Reg. No: 1234".into(),
            address: "Main Road, Pune".into(),
            contact: "Contact: 555 0100".into(),
        }
    }

    #[test]
    fn test_decoration_contents() {
        let geometry = PageGeometry::letter();
        let decoration = header().decorate(3, &geometry);
        let texts: Vec<&str> = decoration.runs.iter().map(|r| r.text.as_str()).collect();

        assert!(texts.contains(&"SUNRISE CLINIC"));
        assert!(texts.contains(&"Dr. A. Rao, D.H.M.S."));
        assert!(texts.contains(&"Page 3"));
        assert_eq!(decoration.rules.len(), 1);
    }

    #[test]
    fn test_header_sits_above_body() {
        let geometry = PageGeometry::letter();
        let decoration = header().decorate(1, &geometry);
        let rule = decoration.rules[0];
        assert!(rule.y > geometry.body_top());

        let footer = decoration.runs.iter().find(|r| r.text == "Page 1").unwrap();
        assert!(footer.y < geometry.body_bottom());
    }

    #[test]
    fn test_registration_is_right_aligned() {
        let geometry = PageGeometry::letter();
        let decoration = header().decorate(1, &geometry);
        let reg = decoration.runs.iter().find(|r| r.text.starts_with("Reg.")).unwrap();
        let end = reg.x + text_width(&reg.text, &reg.style);
        assert!((end - (geometry.width - geometry.margin_right)).abs() < 0.01);
    }

    #[test]
    fn test_partial_header_from_json() {
        let header: ClinicHeader =
            serde_json::from_str(r#"{"clinic_name": "Hill Clinic", "credentials": "BHMS"}"#).unwrap();
        assert_eq!(header.clinic_name, "Hill Clinic");
        assert_eq!(header.practitioner_line(), "Dr. Ramesh Ramrao Mustare, BHMS");
        assert_eq!(header.contact, ClinicHeader::default().contact);
    }

    #[test]
    fn test_default_letterhead_is_complete() {
        let geometry = PageGeometry::letter();
        let decoration = ClinicHeader::default().decorate(1, &geometry);
        let texts: Vec<&str> = decoration.runs.iter().map(|r| r.text.as_str()).collect();

        assert!(texts.contains(&"SHRADHA HOMOEO CLINIC"));
        assert!(texts.contains(&"Dr. Ramesh Ramrao Mustare, D.H.M.S., C.C.M.P.(C.C.H.)"));
        assert!(texts.contains(&"Reg. No: 20702"));
        assert!(texts.contains(&"Kamtha(BK), Tq Ardhapur, Dist Nanded, 431704"));
        assert!(texts.contains(&"Contact: +91 9420911808"));
        assert!(decoration.rules[0].y > geometry.body_top());
    }

    #[test]
    fn test_long_address_stays_clear_of_registration() {
        let geometry = PageGeometry::letter();
        let mut header = header();
        header.address = "Plot 14, Behind Old Market Yard, Near Water Tank, Shivaji Nagar, \
                          Kamtha Budruk, Taluka Ardhapur, District Nanded, Maharashtra 431704, \
                          India, Landmark Opposite Government Primary School"
            .into();
        header.registration_no = "Reg. No: MH/HOM/2003/20702 (Maharashtra Council of Homoeopathy)".into();
        let decoration = header.decorate(1, &geometry);

        let detail_y = geometry.height - TOP_CLEARANCE - 51.0;
        let detail_rows: Vec<&TextRun> = decoration
            .runs
            .iter()
            .filter(|r| r.style == DETAIL && r.y <= detail_y && r.y > detail_y - 2.0 * DETAIL_LEADING)
            .collect();
        let (address, registration): (Vec<&TextRun>, Vec<&TextRun>) =
            detail_rows.into_iter().partition(|r| r.x == geometry.margin_left);

        assert_eq!(address.len(), DETAIL_MAX_LINES);
        assert!(address.last().unwrap().text.ends_with("..."));
        assert!(!registration.is_empty());
        let middle = geometry.margin_left + geometry.content_width() / 2.0;
        for run in &address {
            assert!(run.x + text_width(&run.text, &run.style) <= middle);
        }
        for run in &registration {
            assert!(run.x >= middle);
        }

        let contact = decoration.runs.iter().find(|r| r.text.starts_with("Contact")).unwrap();
        assert!(contact.y < address.last().unwrap().y);
        assert!(decoration.rules[0].y < contact.y);
        assert!(decoration.rules[0].y > geometry.body_top());
    }
}
