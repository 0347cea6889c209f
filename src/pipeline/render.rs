// Choropleth rendering as a standalone SVG document.
//
// The output is deterministic: the same view renders to identical bytes.

use circuit_tally::{ColoredDistrict, MapView};
use geo_types::LineString;
use log::debug;

const PADDING: f64 = 10.0;
const TITLE_BAND: f64 = 40.0;

pub fn render_svg(view: &MapView, title: &str, width: u32) -> String {
    let bbox = bounding_box(&view.districts);
    let (min_x, min_y, max_x, max_y) = match bbox {
        Some(b) => b,
        None => return empty_svg(title, width),
    };
    debug!(
        "render_svg: {} districts, bbox ({}, {}) to ({}, {})",
        view.districts.len(),
        min_x,
        min_y,
        max_x,
        max_y
    );

    let span_x = (max_x - min_x).max(f64::EPSILON);
    let span_y = (max_y - min_y).max(f64::EPSILON);
    let scale = (width as f64 - 2.0 * PADDING) / span_x;
    let height = (span_y * scale + 2.0 * PADDING + TITLE_BAND).ceil() as u32;

    let mut buf = String::with_capacity(32 * 1024);
    buf.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">\n",
        width, height, width, height
    ));
    push_title(&mut buf, title, width);
    for district in view.districts.iter() {
        push_district(&mut buf, district, min_x, max_y, scale);
    }
    buf.push_str("</svg>\n");
    buf
}

fn empty_svg(title: &str, width: u32) -> String {
    let mut buf = String::new();
    buf.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"200\" viewBox=\"0 0 {} 200\">\n",
        width, width
    ));
    push_title(&mut buf, title, width);
    buf.push_str(&format!(
        "<text x=\"{}\" y=\"110\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"14\" fill=\"#555\">Sin datos para esta selecci\u{f3}n</text>\n",
        width / 2
    ));
    buf.push_str("</svg>\n");
    buf
}

fn push_title(buf: &mut String, title: &str, width: u32) {
    buf.push_str(&format!(
        "<text x=\"{}\" y=\"26\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"16\">{}</text>\n",
        width / 2,
        escape(title)
    ));
}

fn push_district(buf: &mut String, district: &ColoredDistrict, min_x: f64, max_y: f64, scale: f64) {
    let mut data = String::new();
    for polygon in district.shape.0.iter() {
        push_ring(&mut data, polygon.exterior(), min_x, max_y, scale);
        for interior in polygon.interiors() {
            push_ring(&mut data, interior, min_x, max_y, scale);
        }
    }
    let label = match &district.winner {
        Some(winner) => format!("{}: {}", district.district_code, winner),
        None => format!("{}: sin datos", district.district_code),
    };
    buf.push_str(&format!(
        "<path d=\"{}\" fill=\"{}\" stroke=\"black\" stroke-width=\"0.5\" fill-rule=\"evenodd\"><title>{}</title></path>\n",
        data.trim_end(),
        escape(&district.display_color),
        escape(&label)
    ));
}

fn push_ring(data: &mut String, ring: &LineString<f64>, min_x: f64, max_y: f64, scale: f64) {
    for (idx, c) in ring.0.iter().enumerate() {
        let (x, y) = project(c.x, c.y, min_x, max_y, scale);
        if idx == 0 {
            data.push_str(&format!("M{:.2} {:.2}", x, y));
        } else {
            data.push_str(&format!(" L{:.2} {:.2}", x, y));
        }
    }
    data.push_str(" Z ");
}

// Latitude grows upwards, SVG y grows downwards.
fn project(x: f64, y: f64, min_x: f64, max_y: f64, scale: f64) -> (f64, f64) {
    (
        PADDING + (x - min_x) * scale,
        PADDING + TITLE_BAND + (max_y - y) * scale,
    )
}

// The exterior rings are enough: holes always lie inside them.
fn bounding_box(districts: &[ColoredDistrict]) -> Option<(f64, f64, f64, f64)> {
    let mut bbox: Option<(f64, f64, f64, f64)> = None;
    for district in districts {
        for polygon in district.shape.0.iter() {
            for c in polygon.exterior().0.iter() {
                bbox = Some(match bbox {
                    None => (c.x, c.y, c.x, c.y),
                    Some((x0, y0, x1, y1)) => {
                        (x0.min(c.x), y0.min(c.y), x1.max(c.x), y1.max(c.y))
                    }
                });
            }
        }
    }
    bbox
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
