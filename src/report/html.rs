//! HTML report with D3.js visualizations
//!
//! The page template is shared with the interactive server. A static report
//! embeds one rendered [`ChartData`]; selectors are disabled but brushing and
//! tooltips still work offline.

use crate::chart::ChartData;
use std::io::{self, Write};

const PAGE_TEMPLATE: &str = include_str!("chart.html");

pub fn write<W: Write>(writer: &mut W, data: &ChartData) -> io::Result<()> {
    let html = render_page(data, false)?;
    writer.write_all(html.as_bytes())
}

/// Fill the page template. `live` pages re-query `/api/chart` on every
/// selector change.
pub fn render_page(data: &ChartData, live: bool) -> io::Result<String> {
    let json_data = embed_json(data)?;
    Ok(PAGE_TEMPLATE
        .replace("__LIVE_MODE__", if live { "true" } else { "false" })
        .replace("__GENERATED__", &chrono::Local::now().format("%Y-%m-%d %H:%M").to_string())
        .replace("__CHART_DATA__", &json_data))
}

/// Serialize for a `<script>` block; `</` would end the script early
fn embed_json(data: &ChartData) -> io::Result<String> {
    let json = serde_json::to_string(data)?;
    Ok(json.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{render, ChartParams};
    use crate::config::Config;
    use crate::dataset::{parse_rows, Dataset};

    fn chart_data(track: &str) -> ChartData {
        let csv = format!(
            "Track Name,Artist Name,genre,track_genre,Spotify_Hit,Spotify Streams\n{},X,pop,pop,True,100\n",
            track
        );
        let config = Config::default();
        let dataset = Dataset::from_rows(parse_rows(csv.as_bytes()).unwrap(), &config);
        render(&dataset, &ChartParams::default(), &config).unwrap()
    }

    #[test]
    fn test_page_embeds_data_and_mode() {
        let html = render_page(&chart_data("Song"), true).unwrap();
        assert!(html.contains("const LIVE_MODE = true;"));
        assert!(html.contains("\"track_name\":\"Song\""));
        assert!(!html.contains("__CHART_DATA__"));
        assert!(!html.contains("__GENERATED__"));
    }

    #[test]
    fn test_static_report_disables_live_mode() {
        let mut out = Vec::new();
        write(&mut out, &chart_data("Song")).unwrap();
        let html = String::from_utf8(out).unwrap();
        assert!(html.contains("const LIVE_MODE = false;"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_script_close_tag_is_escaped() {
        let html = render_page(&chart_data("</script><b>x"), false).unwrap();
        assert!(html.contains("<\\/script><b>x"));
        assert_eq!(html.matches("</script>").count(), 3);
    }

    #[test]
    fn test_template_draws_both_charts() {
        assert!(PAGE_TEMPLATE.contains("function drawSankey("));
        assert!(PAGE_TEMPLATE.contains("function drawParallel("));
        assert!(PAGE_TEMPLATE.contains("d3.brushY()"));
    }
}
