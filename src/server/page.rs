// page.rs
//
// The single HTML page served at `/`: a form for the four inputs and, after a
// submission, either the predicted volume or the error message.

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Prediction(i64),
    Error(String),
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Traffic Volume Predictor</title>
</head>
<body>
  <h1>Traffic Volume Predictor</h1>
  <form method="post" action="/">
    <label>Temperature <input type="text" name="temperature" inputmode="decimal" required></label><br>
    <label>Day of the Week <input type="text" name="day_of_week" required></label><br>
    <label>Location <input type="text" name="location" required></label><br>
    <label>Time of Day <input type="text" name="time_of_day" required></label><br>
    <button type="submit">Predict</button>
  </form>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

pub fn render(outcome: Option<&PageOutcome>) -> String {
    let mut html = String::from(PAGE_HEAD);
    match outcome {
        Some(PageOutcome::Prediction(volume)) => {
            html.push_str(&format!(
                "  <p id=\"prediction\">Predicted traffic volume: {}</p>\n",
                volume
            ));
        }
        Some(PageOutcome::Error(message)) => {
            html.push_str(&format!(
                "  <p id=\"error\">Error: {}</p>\n",
                escape_html(message)
            ));
        }
        None => {}
    }
    html.push_str(PAGE_TAIL);
    html
}

// Error messages can echo user input back.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_has_the_form_only() {
        let html = render(None);
        assert!(html.contains("<form method=\"post\" action=\"/\">"));
        assert!(!html.contains("id=\"prediction\""));
        assert!(!html.contains("id=\"error\""));
    }

    #[test]
    fn prediction_is_embedded() {
        let html = render(Some(&PageOutcome::Prediction(120)));
        assert!(html.contains("Predicted traffic volume: 120"));
    }

    #[test]
    fn errors_are_escaped() {
        let html = render(Some(&PageOutcome::Error(
            "Found unknown category '<script>' for field 'location'".into(),
        )));
        assert!(html.contains("&#39;&lt;script&gt;&#39;"));
        assert!(!html.contains("<script>"));
    }
}
