//! Embedding rendered plots into a page at the size the decorations need.

use crate::models::EmbeddingGeometry;

/// Force a white page background so the plot reads the same in dark viewers.
///
/// An existing inline body style is kept after the background color.
pub fn whiten_body(html: &str) -> String {
    if html.contains("<body>") {
        html.replacen("<body>", r#"<body style="background-color:white;">"#, 1)
    } else {
        html.replacen(r#"<body style=""#, r#"<body style="background-color:white;"#, 1)
    }
}

/// Escape text for use inside a double-quoted HTML attribute.
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Page embedding `plot_html` in an iframe of exactly `geometry`'s size.
pub fn embed_page(plot_html: &str, geometry: &EmbeddingGeometry, title: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
</head>
<body>
<div id="page_top"></div>
<h1>{title}</h1>
<p class="status" style="color:green;font-size:20pt"><b>PLOT READY !</b> <a href="#plot_top">GO TO PLOT TOP</a></p>
<div id="plot_top"></div>
<iframe title="heatmap" width="{w}" height="{h}" style="border:none" srcdoc="{src}"></iframe>
<p style="text-align:right;"><a href="#plot_top">BACK TO PLOT TOP</a></p>
<p style="text-align:right;"><a href="#page_top">BACK TO PAGE TOP</a></p>
</body>
</html>
"##,
        title = escape_attr(title),
        w = geometry.total_width,
        h = geometry.total_height,
        src = escape_attr(plot_html),
    )
}
