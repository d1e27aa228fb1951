//! Self-contained HTML for the printable report.
//!
//! Everything the page needs is inlined so the headless browser never makes a
//! network request while loading it.

use crate::domains::report::types::{ReportSummary, ReportType};
use chrono::{DateTime, Utc};

const STYLES: &str = r#"
    * { box-sizing: border-box; }
    body {
        font-family: "Helvetica Neue", Arial, sans-serif;
        color: #1f2933;
        margin: 0;
        padding: 0;
        -webkit-print-color-adjust: exact;
    }
    header { border-bottom: 3px solid #0b5394; padding-bottom: 12px; margin-bottom: 24px; }
    h1 { font-size: 24px; margin: 0 0 4px 0; color: #0b5394; }
    .generated { font-size: 12px; color: #616e7c; }
    .cards { display: grid; grid-template-columns: repeat(3, 1fr); gap: 16px; margin-bottom: 28px; }
    .card { background: #f0f4f8; border-radius: 8px; padding: 16px; border-left: 4px solid #0b5394; }
    .card .label { font-size: 12px; text-transform: uppercase; letter-spacing: 0.04em; color: #52606d; }
    .card .value { font-size: 32px; font-weight: 700; margin-top: 8px; }
    table { width: 100%; border-collapse: collapse; font-size: 14px; }
    th, td { text-align: left; padding: 10px 12px; border-bottom: 1px solid #d9e2ec; }
    th { background: #0b5394; color: #ffffff; }
    tr:nth-child(even) td { background: #f8fafc; }
"#;

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn range_value(value: Option<&str>) -> String {
    match value {
        Some(v) => html_escape(v),
        None => "Sin límite".to_string(),
    }
}

fn metric_card(label: &str, value: u64) -> String {
    format!(
        r#"<div class="card"><div class="label">{}</div><div class="value">{}</div></div>"#,
        html_escape(label),
        value
    )
}

fn table_row(key: &str, value: &str) -> String {
    format!("<tr><td>{}</td><td>{}</td></tr>", html_escape(key), value)
}

/// Compose the printable HTML for a summary.
pub fn compose_document(summary: &ReportSummary, report_type: ReportType, generated_at: DateTime<Utc>) -> String {
    let title = html_escape(report_type.title());

    let cards = [
        metric_card("Beneficiarios asignados", summary.beneficiaries_assigned),
        metric_card("Programas activos", summary.active_programs),
        metric_card("Trámites pendientes", summary.pending_procedures),
    ]
    .join("\n");

    let rows = [
        table_row("Beneficiarios asignados", &summary.beneficiaries_assigned.to_string()),
        table_row("Programas activos", &summary.active_programs.to_string()),
        table_row("Trámites pendientes", &summary.pending_procedures.to_string()),
        table_row("Desde", &range_value(summary.date_range.from.as_deref())),
        table_row("Hasta", &range_value(summary.date_range.to.as_deref())),
    ]
    .join("\n");

    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{styles}</style>
</head>
<body>
<header>
<h1>{title}</h1>
<div class="generated">Generado el {generated}</div>
</header>
<section class="cards">
{cards}
</section>
<table>
<thead><tr><th>Indicador</th><th>Valor</th></tr></thead>
<tbody>
{rows}
</tbody>
</table>
</body>
</html>"#,
        title = title,
        styles = STYLES,
        generated = generated_at.format("%Y-%m-%d %H:%M UTC"),
        cards = cards,
        rows = rows,
    )
}
