//! Comment rendering: one HTML table per record

use std::borrow::Cow;

use serde::Serialize;

use crate::record::ExpandedRecord;

/// JSON body of the create-comment call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentBody {
    pub text: String,
}

fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Render a record as a two-row table captioned by its title.
///
/// Header cells are the non-reserved column names in CSV order, body cells
/// their values. Pure and deterministic.
pub fn render_comment(record: &ExpandedRecord) -> CommentBody {
    let span = record.fields.len().max(1);
    let mut html = String::with_capacity(128 + record.fields.len() * 32);

    html.push_str("<table style=\"width:100%\">\n<thead>\n<tr>\n");
    html.push_str(&format!(
        "<th colspan=\"{span}\">{}</th>\n",
        escape_html(&record.title)
    ));
    html.push_str("</tr>\n<tr>\n");
    for name in record.fields.keys() {
        html.push_str(&format!("<th>{}</th>\n", escape_html(name)));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n<tr>\n");
    for value in record.fields.values() {
        html.push_str(&format!("<td>{}</td>\n", escape_html(value)));
    }
    html.push_str("</tr>\n</tbody>\n</table>");

    CommentBody { text: html }
}
