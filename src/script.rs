//! Control script generation
//!
//! The renderer is driven by a short script: create a page, apply either the
//! paper size (PDF) or the viewport (raster), open the URL, wait for the
//! configured delay, render to the target and exit. Generation is kept apart
//! from process handling so the text can be asserted directly.

use crate::capture::CaptureMode;
use crate::{PaperSize, RenderConfig, Result};
use std::path::Path;

/// Build the control script for one capture
pub fn control_script(config: &RenderConfig, url: &str, target: &Path, mode: CaptureMode) -> Result<String> {
    let paper = match mode {
        CaptureMode::Pdf => format!("{}\n", paper_size_directive(&config.paper_size)?),
        CaptureMode::Raster => String::new(),
    };
    let viewport = match mode {
        CaptureMode::Raster => format!("{}\n", viewport_directive(config.width, config.height)),
        CaptureMode::Pdf => String::new(),
    };

    Ok(format!(
        "var page = require('webpage').create();\n\
         {paper}\
         page.settings.javascriptEnabled = true;\n\
         {viewport}\
         page.open({url}, function() {{\n    \
             window.setTimeout(function() {{\n        \
                 page.render({target});\n        \
                 phantom.exit();\n    \
             }}, {timeout});\n\
         }});\n",
        paper = paper,
        viewport = viewport,
        url = js_string(url),
        target = js_string(&target.to_string_lossy()),
        timeout = config.timeout_ms,
    ))
}

/// `page.viewportSize = { width: W, height: H };`, height omitted when 0
pub fn viewport_directive(width: u32, height: u32) -> String {
    if height == 0 {
        format!("page.viewportSize = {{ width: {} }};", width)
    } else {
        format!("page.viewportSize = {{ width: {}, height: {} }};", width, height)
    }
}

/// `page.paperSize = {...};` with the paper settings as a JSON object
pub fn paper_size_directive(paper: &PaperSize) -> Result<String> {
    Ok(format!("page.paperSize = {};", serde_json::to_string(paper)?))
}

/// Quote `s` as a single-quoted JavaScript string literal
fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Margin;

    fn config(width: u32, height: u32) -> RenderConfig {
        RenderConfig {
            width,
            height,
            timeout_ms: 750,
            ..Default::default()
        }
    }

    #[test]
    fn raster_script_sets_viewport() {
        let script = control_script(&config(100, 200), "https://example.com", Path::new("out.png"), CaptureMode::Raster).unwrap();
        assert!(script.contains("viewportSize = { width: 100, height: 200 }"));
        assert!(!script.contains("paperSize"));
        assert!(script.contains("page.open('https://example.com', function() {"));
        assert!(script.contains("page.render('out.png');"));
        assert!(script.contains("}, 750);"));
        assert!(script.contains("phantom.exit();"));
        assert!(script.starts_with("var page = require('webpage').create();\n"));
    }

    #[test]
    fn full_page_omits_height() {
        let script = control_script(&config(320, 0), "https://example.com", Path::new("out.jpg"), CaptureMode::Raster).unwrap();
        assert!(script.contains("page.viewportSize = { width: 320 };"));
        assert!(!script.contains("height"));
    }

    #[test]
    fn pdf_script_sets_paper_size_only() {
        let mut cfg = config(100, 200);
        cfg.paper_size = PaperSize {
            format: "A4".into(),
            orientation: "portrait".into(),
            margin: Margin::uniform("1cm"),
        };
        let script = control_script(&cfg, "https://example.com", Path::new("out.pdf"), CaptureMode::Pdf).unwrap();
        assert!(script.contains(
            r#"page.paperSize = {"format":"A4","orientation":"portrait","margin":{"left":"1cm","right":"1cm","top":"1cm","bottom":"1cm"}};"#
        ));
        assert!(!script.contains("viewportSize"));
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(js_string("it's"), r"'it\'s'");
        assert_eq!(js_string(r"C:\shots\a.png"), r"'C:\\shots\\a.png'");
        assert_eq!(js_string("a\nb"), r"'a\nb'");
    }
}
