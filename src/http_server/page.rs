//! Server-rendered dashboard page
//!
//! A single HTML document: filter form, KPI tiles, one panel per rule and
//! the three charts as inline SVG. No scripts.

use std::fmt::Write as _;

use crate::report::svg::{bar_chart, escape_xml, line_chart};
use crate::report::{format_count, format_currency, DashboardData, DashboardFilters, FindingStatus, FindingView};
use crate::store::cell_text;

/// Rows rendered per rule panel; the CSV export always has all of them
const MAX_PANEL_ROWS: usize = 200;

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0 auto;max-width:1100px;padding:16px;color:#111827}
h1{margin-bottom:4px}
.kpis{display:flex;gap:16px;margin:16px 0}
.kpi{flex:1;border:1px solid #e5e7eb;border-radius:8px;padding:12px}
.kpi .label{color:#6b7280;font-size:13px}
.kpi .value{font-size:26px;font-weight:600}
.panel{border:1px solid #e5e7eb;border-radius:8px;padding:12px;margin:12px 0}
.panel.fail{border-color:#f59e0b}
.panel.error{border-color:#dc2626}
.scroll{max-height:320px;overflow:auto}
table{border-collapse:collapse;font-size:13px}
th,td{border-bottom:1px solid #e5e7eb;padding:4px 8px;text-align:left}
form{display:flex;gap:12px;flex-wrap:wrap;align-items:end}
form label{display:flex;flex-direction:column;font-size:13px}
.muted{color:#6b7280}";

/// Renders the full dashboard document
pub fn render_dashboard(data: &DashboardData, filters: &DashboardFilters) -> String {
    let mut html = String::with_capacity(64 * 1024);
    html.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str("<title>Revenue Leakage Dashboard</title>");
    let _ = write!(html, "<style>{STYLE}</style></head><body>");
    html.push_str("<h1>Revenue Leakage Dashboard</h1>");
    html.push_str("<p class=\"muted\">Audit of pricing, order, inventory and delivery data.</p>");

    render_filters(&mut html, filters);
    render_kpis(&mut html, data);

    html.push_str("<h2>Leakage Findings</h2>");
    for finding in &data.findings {
        render_finding(&mut html, finding);
    }

    html.push_str("<h2>Charts</h2>");
    html.push_str(&line_chart("Sales Over Time", &data.charts.sales_over_time));
    html.push_str(&bar_chart("Sales by Category", &data.charts.category_sales));
    html.push_str(&bar_chart("Sales by Brand", &data.charts.brand_sales));

    html.push_str("</body></html>");
    html
}

fn render_filters(html: &mut String, filters: &DashboardFilters) {
    html.push_str("<form method=\"get\" action=\"/\">");
    for (name, label, kind) in [
        ("start", "Start date", "date"),
        ("end", "End date", "date"),
        ("category", "Category contains", "text"),
        ("brand", "Brand contains", "text"),
    ] {
        let _ = write!(
            html,
            "<label>{label}<input type=\"{kind}\" name=\"{name}\" value=\"{}\"></label>",
            escape_xml(filters.field(name))
        );
    }
    html.push_str("<button type=\"submit\">Apply</button><a href=\"/\">Reset</a></form>");
}

fn render_kpis(html: &mut String, data: &DashboardData) {
    let avg = data
        .kpis
        .avg_order_value
        .map(format_currency)
        .unwrap_or_else(|| "n/a".to_string());

    html.push_str("<div class=\"kpis\">");
    for (label, value) in [
        ("Total Orders", format_count(data.kpis.total_orders)),
        ("Total Sales", format_currency(data.kpis.total_sales)),
        ("Avg Order Value", avg),
    ] {
        let _ = write!(
            html,
            "<div class=\"kpi\"><div class=\"label\">{label}</div><div class=\"value\">{}</div></div>",
            escape_xml(&value)
        );
    }
    html.push_str("</div>");
}

fn render_finding(html: &mut String, finding: &FindingView) {
    let _ = write!(
        html,
        "<section class=\"panel {}\" id=\"{}\"><h3>{}</h3><p class=\"muted\">{}</p>",
        finding.status.as_str(),
        escape_xml(&finding.rule),
        escape_xml(&finding.title),
        escape_xml(&finding.description)
    );

    match finding.status {
        FindingStatus::Pass => html.push_str("<p>✅ No issues found</p>"),
        FindingStatus::Error => {
            let _ = write!(
                html,
                "<p>❌ Rule could not run: <code>{}</code></p>",
                escape_xml(finding.error.as_deref().unwrap_or(""))
            );
        }
        FindingStatus::Fail => {
            let _ = write!(
                html,
                "<p>⚠️ {} issues found. <a href=\"/api/findings/{}/export\" download>Download CSV</a></p>",
                format_count(finding.issue_count as u64),
                escape_xml(&finding.rule)
            );
            render_table(html, finding);
        }
    }

    html.push_str("</section>");
}

fn render_table(html: &mut String, finding: &FindingView) {
    html.push_str("<div class=\"scroll\"><table><thead><tr>");
    for column in &finding.columns {
        let _ = write!(html, "<th>{}</th>", escape_xml(column));
    }
    html.push_str("</tr></thead><tbody>");

    for row in finding.rows.iter().take(MAX_PANEL_ROWS) {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_xml(&cell_text(cell)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table></div>");

    if finding.rows.len() > MAX_PANEL_ROWS {
        let _ = write!(
            html,
            "<p class=\"muted\">Showing first {MAX_PANEL_ROWS} of {} rows.</p>",
            finding.rows.len()
        );
    }
}
