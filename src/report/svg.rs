//! Minimal SVG chart writer
//!
//! Two chart shapes: a line over ordered points and vertical bars per
//! label. Output is a standalone `<svg>` element that can be inlined into
//! HTML.

use std::fmt::Write as _;

use super::charts::{GroupTotal, SalesPoint};

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 320.0;
const MARGIN_LEFT: f64 = 72.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 36.0;
const MARGIN_BOTTOM: f64 = 72.0;

const LINE_COLOR: &str = "#2563eb";
const BAR_COLOR: &str = "#16a34a";
const NEGATIVE_BAR_COLOR: &str = "#dc2626";

fn plot_width() -> f64 {
    WIDTH - MARGIN_LEFT - MARGIN_RIGHT
}

fn plot_height() -> f64 {
    HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
}

/// Vertical value range with zero always included
struct Scale {
    lo: f64,
    hi: f64,
}

impl Scale {
    fn from_values(values: impl Iterator<Item = f64>) -> Self {
        let (mut lo, mut hi) = (0.0_f64, 0.0_f64);
        for v in values.filter(|v| v.is_finite()) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if hi - lo < f64::EPSILON {
            hi = lo + 1.0;
        }
        Self { lo, hi }
    }

    fn y(&self, value: f64) -> f64 {
        MARGIN_TOP + (self.hi - value) / (self.hi - self.lo) * plot_height()
    }
}

/// Escapes text for use in SVG/HTML content and attributes
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn open_svg(out: &mut String, title: &str) {
    let _ = write!(
        out,
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" width="{WIDTH}" height="{HEIGHT}" role="img" aria-label="{t}">"##,
        t = escape_xml(title)
    );
    let _ = write!(
        out,
        r##"<text x="{x}" y="20" text-anchor="middle" font-size="15" font-weight="bold">{t}</text>"##,
        x = WIDTH / 2.0,
        t = escape_xml(title)
    );
}

fn no_data(out: &mut String) {
    let _ = write!(
        out,
        r##"<text x="{x}" y="{y}" text-anchor="middle" fill="#6b7280">No data</text></svg>"##,
        x = WIDTH / 2.0,
        y = HEIGHT / 2.0
    );
}

fn axes(out: &mut String, scale: &Scale) {
    let x0 = MARGIN_LEFT;
    let x1 = WIDTH - MARGIN_RIGHT;
    let zero = scale.y(0.0);
    let _ = write!(
        out,
        r##"<line x1="{x0}" y1="{MARGIN_TOP}" x2="{x0}" y2="{b}" stroke="#9ca3af"/><line x1="{x0}" y1="{zero:.1}" x2="{x1}" y2="{zero:.1}" stroke="#9ca3af"/>"##,
        b = HEIGHT - MARGIN_BOTTOM
    );

    let mut ticks = vec![scale.hi, 0.0];
    if scale.lo < 0.0 {
        ticks.push(scale.lo);
    }
    for tick in ticks {
        let _ = write!(
            out,
            r##"<text x="{x}" y="{y:.1}" text-anchor="end" font-size="11" dominant-baseline="middle">{label}</text>"##,
            x = x0 - 6.0,
            y = scale.y(tick),
            label = short_number(tick)
        );
    }
}

/// Compact axis label: 1234 -> 1.2k, 2500000 -> 2.5M
fn short_number(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        format!("{:.0}", value)
    }
}

/// Line chart of order totals in date order
pub fn line_chart(title: &str, points: &[SalesPoint]) -> String {
    let mut out = String::new();
    open_svg(&mut out, title);
    if points.is_empty() {
        no_data(&mut out);
        return out;
    }

    let scale = Scale::from_values(points.iter().map(|p| p.order_total));
    axes(&mut out, &scale);

    let step = if points.len() > 1 {
        plot_width() / (points.len() - 1) as f64
    } else {
        0.0
    };
    let x_at = |i: usize| {
        if points.len() > 1 {
            MARGIN_LEFT + step * i as f64
        } else {
            MARGIN_LEFT + plot_width() / 2.0
        }
    };

    let coords: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{:.1},{:.1}", x_at(i), scale.y(p.order_total)))
        .collect();
    let _ = write!(
        out,
        r##"<polyline fill="none" stroke="{LINE_COLOR}" stroke-width="1.5" points="{}"/>"##,
        coords.join(" ")
    );

    let label_y = HEIGHT - MARGIN_BOTTOM + 18.0;
    let first = &points[0];
    let last = &points[points.len() - 1];
    let _ = write!(
        out,
        r##"<text x="{x}" y="{label_y}" font-size="11" text-anchor="start">{d}</text>"##,
        x = MARGIN_LEFT,
        d = escape_xml(&first.order_date)
    );
    if points.len() > 1 {
        let _ = write!(
            out,
            r##"<text x="{x}" y="{label_y}" font-size="11" text-anchor="end">{d}</text>"##,
            x = WIDTH - MARGIN_RIGHT,
            d = escape_xml(&last.order_date)
        );
    }

    out.push_str("</svg>");
    out
}

/// Bar chart with one bar per group
pub fn bar_chart(title: &str, groups: &[GroupTotal]) -> String {
    let mut out = String::new();
    open_svg(&mut out, title);
    if groups.is_empty() {
        no_data(&mut out);
        return out;
    }

    let scale = Scale::from_values(groups.iter().map(|g| g.total_sales));
    axes(&mut out, &scale);

    let slot = plot_width() / groups.len() as f64;
    let bar_width = (slot * 0.7).max(1.0);
    let zero = scale.y(0.0);

    for (i, group) in groups.iter().enumerate() {
        let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_width) / 2.0;
        let y = scale.y(group.total_sales.max(0.0));
        let height = (scale.y(group.total_sales.min(0.0)) - y).abs();
        let color = if group.total_sales < 0.0 {
            NEGATIVE_BAR_COLOR
        } else {
            BAR_COLOR
        };
        let label = escape_xml(&group.label);
        let _ = write!(
            out,
            r##"<rect x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{height:.1}" fill="{color}"><title>{label}: {v:.2}</title></rect>"##,
            v = group.total_sales
        );

        let cx = x + bar_width / 2.0;
        let ly = HEIGHT - MARGIN_BOTTOM + 12.0;
        let _ = write!(
            out,
            r##"<text x="{cx:.1}" y="{ly:.1}" font-size="10" text-anchor="end" transform="rotate(-35 {cx:.1} {ly:.1})">{label}</text>"##
        );
    }

    // Keep the zero line above the bars
    let _ = write!(
        out,
        r##"<line x1="{MARGIN_LEFT}" y1="{zero:.1}" x2="{x1}" y2="{zero:.1}" stroke="#374151"/>"##,
        x1 = WIDTH - MARGIN_RIGHT
    );

    out.push_str("</svg>");
    out
}
