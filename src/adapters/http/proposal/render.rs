//! Server-rendered trade board.
//!
//! The page is rendered from the board state at request time. A small inline
//! script sends toggles and new proposals to the JSON API and reloads when the
//! live feed reports a change.

use std::fmt::Write;

use crate::application::BoardState;
use crate::domain::proposal::Proposal;

/// Escape text for HTML display. Newlines become line breaks.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            '\n' => escaped.push_str("<br/>"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; background: #0f1320; color: #e8ecf4; margin: 0; padding: 1.5rem; }
main { max-width: 40rem; margin: 0 auto; }
.card { background: #171c2e; border: 1px solid #262d45; border-radius: 12px; padding: 1rem; margin-bottom: 1rem; }
.muted { color: #9aa3b8; }
.badge { display: inline-block; padding: .15rem .6rem; border-radius: 999px; border: 1px solid #3a4366; margin-right: .5rem; }
.ready { background: rgba(47,209,161,.15); border-color: rgba(47,209,161,.3); }
.stale { background: rgba(232,93,93,.15); border-color: rgba(232,93,93,.3); }
.kv div { margin: .35rem 0; }
label { display: block; margin: .4rem 0; }
textarea { width: 100%; min-height: 3rem; }
"#;

const SCRIPT: &str = r#"
document.querySelectorAll("input[data-participant]").forEach(function (cb) {
  cb.addEventListener("change", function () {
    fetch("/api/proposal/approvals/" + encodeURIComponent(cb.dataset.participant), {
      method: "PUT",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify({ approved: cb.checked })
    });
  });
});
var form = document.getElementById("tradeForm");
form.addEventListener("submit", function (e) {
  e.preventDefault();
  fetch("/api/proposal", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ weSend: form.weSend.value, weReceive: form.weReceive.value })
  }).then(function (r) { if (r.ok) { form.reset(); } });
});
var scheme = location.protocol === "https:" ? "wss://" : "ws://";
var live = new WebSocket(scheme + location.host + "/api/proposal/live");
var first = true;
live.onmessage = function (e) {
  var msg = JSON.parse(e.data);
  if (msg.type !== "board") { return; }
  if (first) { first = false; return; }
  location.reload();
};
"#;

/// Render the full board page.
pub fn render_board(state: &BoardState) -> String {
    let mut html = String::new();
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\"/>\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>\n");
    html.push_str("<title>Trade Approvals</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<main>\n<h1>Trade Approvals</h1>\n");

    if let BoardState::Stale { reason, .. } = state {
        let _ = write!(
            html,
            "<div class=\"card\"><span class=\"badge stale\">Offline</span><span class=\"muted\">{}</span></div>\n",
            escape_html(reason)
        );
    }

    html.push_str("<section id=\"tradeBox\" class=\"card\">\n");
    match state.view() {
        None => html.push_str("<div class=\"muted\">Connecting to the trade board…</div>\n"),
        Some(view) => match &view.proposal {
            None => html.push_str(
                "<div class=\"muted\">No trade proposal yet. Enter a new trade proposal below.</div>\n",
            ),
            Some(proposal) => {
                render_proposal(&mut html, proposal, view.approved_count, view.total, view.is_ready)
            }
        },
    }
    html.push_str("</section>\n");

    render_form(&mut html);
    html.push_str("</main>\n<script>");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

fn render_proposal(
    html: &mut String,
    proposal: &Proposal,
    approved_count: usize,
    total: usize,
    is_ready: bool,
) {
    html.push_str("<div class=\"tradeLine\">\n<span class=\"badge\">Active Trade</span>\n");
    let _ = writeln!(
        html,
        "<span class=\"muted\">Approvals: <b>{}/{}</b></span>",
        approved_count, total
    );
    if is_ready {
        html.push_str("<span class=\"badge ready\">✅ Trade ready to send</span>\n");
    }
    html.push_str("</div>\n<div class=\"kv\">\n");
    let _ = writeln!(
        html,
        "<div><b>We send:</b> {}</div>",
        proposal.description_outbound().map(escape_html).unwrap_or_default()
    );
    let _ = writeln!(
        html,
        "<div><b>We receive:</b> {}</div>",
        proposal.description_inbound().map(escape_html).unwrap_or_default()
    );
    html.push_str("</div>\n<div id=\"confirm\">\n");
    for approval in proposal.approvals() {
        let name = escape_html(approval.participant.as_str());
        let _ = writeln!(
            html,
            "<label><input type=\"checkbox\" data-participant=\"{}\"{}/> {}</label>",
            name,
            if approval.approved { " checked" } else { "" },
            name
        );
    }
    html.push_str("</div>\n");
}

fn render_form(html: &mut String) {
    html.push_str(
        "<form id=\"tradeForm\" class=\"card\">\n\
         <label>We send<textarea name=\"weSend\" required></textarea></label>\n\
         <label>We receive<textarea name=\"weReceive\" required></textarea></label>\n\
         <button type=\"submit\">Enter new Trade Proposal</button>\n\
         </form>\n",
    );
}
