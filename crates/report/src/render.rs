//! HTML artifact rendering
//!
//! Two renderings of the same record: a browsable timeline and a
//! print-ready paginated document (`@page` CSS, fixed number of
//! messages per page).

use honeypot_core::TurnRole;

use crate::generator::IntelligenceReport;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn speaker_label(role: TurnRole) -> &'static str {
    match role {
        TurnRole::Counterparty => "Counterparty",
        TurnRole::Agent => "Agent",
    }
}

/// Render the conversation timeline
pub fn timeline_html(report: &IntelligenceReport) -> String {
    let rows: String = report
        .conversation
        .iter()
        .map(|turn| {
            format!(
                "<p class=\"{}\"><b>{}:</b> {}</p>\n",
                turn.role,
                speaker_label(turn.role),
                escape(&turn.content)
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>Scam Conversation Timeline</title>
<style>
body {{ font-family: Arial, sans-serif; background: #f4f4f4; }}
.box {{ background: white; padding: 20px; max-width: 800px; margin: auto; }}
p.counterparty {{ color: #7a1f1f; }}
p.agent {{ color: #1f3d7a; }}
</style>
</head>
<body>
<div class="box">
<h2>Scam Conversation Timeline</h2>
<p><b>Session:</b> {session}</p>
<p><b>Generated:</b> {generated}</p>
<hr>
{rows}</div>
</body>
</html>
"#,
        session = escape(&report.session_id),
        generated = report.generated_at.format("%Y-%m-%d %H:%M:%S"),
        rows = rows,
    )
}

/// Render the paginated printable document
pub fn printable_html(report: &IntelligenceReport, page_size: usize) -> String {
    let page_size = page_size.max(1);
    let pages: String = report
        .conversation
        .chunks(page_size)
        .enumerate()
        .map(|(i, chunk)| {
            let rows: String = chunk
                .iter()
                .map(|turn| {
                    format!(
                        "<p><b>{}:</b> {}</p>\n",
                        speaker_label(turn.role),
                        escape(&turn.content)
                    )
                })
                .collect();
            format!(
                "<section class=\"page\">\n<h3>Page {}</h3>\n{}</section>\n",
                i + 1,
                rows
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>Scam Conversation Report</title>
<style>
@page {{ size: A4; margin: 2cm; }}
body {{ font-family: Arial, sans-serif; }}
section.page {{ page-break-after: always; }}
section.page:last-child {{ page-break-after: auto; }}
</style>
</head>
<body>
<h2>Scam Conversation Report</h2>
<p><b>Session:</b> {session}</p>
<p><b>Generated:</b> {generated}</p>
<p><b>Messages:</b> {messages}</p>
<hr>
{pages}</body>
</html>
"#,
        session = escape(&report.session_id),
        generated = report.generated_at.format("%Y-%m-%d %H:%M:%S"),
        messages = report.total_messages,
        pages = pages,
    )
}
