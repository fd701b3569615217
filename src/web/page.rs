//! The single page served at `/`: upload form plus the result area.

use crate::structure::escape_html;

/// What the page shows besides the form.
#[derive(Debug, Default, Clone)]
pub struct PageContext {
    /// Message shown above the form (e.g. no file chosen).
    pub error: Option<String>,
    /// Converted fragment, shown rendered and as copyable source.
    pub html_snippet: Option<String>,
    /// Storage name of an uploaded PDF, embedded from `/uploads/{name}`.
    pub pdf_filename: Option<String>,
}

const STYLE: &str = r#"
    body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 72rem; padding: 0 1rem; color: #222; }
    h1.title { font-size: 1.6rem; }
    form { margin: 1.5rem 0; padding: 1rem; border: 1px solid #ddd; border-radius: 6px; }
    .error { color: #b00020; }
    .result { display: flex; gap: 1.5rem; align-items: flex-start; }
    .result > section { flex: 1; min-width: 0; }
    .preview { border: 1px solid #ddd; border-radius: 6px; padding: 1rem; }
    textarea { width: 100%; min-height: 16rem; font-family: monospace; }
    iframe { width: 100%; height: 40rem; border: 1px solid #ddd; }
"#;

/// Render the full page document.
///
/// The snippet is inserted verbatim in the preview and escaped inside the
/// `<textarea>`, so copying the box yields exactly the fragment.
pub fn render_page(ctx: &PageContext) -> String {
    let mut body = String::new();

    if let Some(ref error) = ctx.error {
        body.push_str(&format!("<p class=\"error\">{}</p>\n", escape_html(error)));
    }

    if let Some(ref snippet) = ctx.html_snippet {
        body.push_str("<div class=\"result\">\n");
        if let Some(ref name) = ctx.pdf_filename {
            body.push_str(&format!(
                "<section>\n<h2>Dokumen Asli</h2>\n<iframe src=\"/uploads/{}\" title=\"PDF\"></iframe>\n</section>\n",
                escape_html(name)
            ));
        }
        body.push_str(&format!(
            "<section>\n<h2>Pratinjau</h2>\n<div class=\"preview\">\n{snippet}\n</div>\n\
             <h2>Kode HTML</h2>\n<textarea readonly onclick=\"this.select()\">{}</textarea>\n</section>\n",
            escape_html(snippet)
        ));
        body.push_str("</div>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="id">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Konversi Dokumen ke HTML</title>
<style>{STYLE}</style>
</head>
<body>
<h1 class="title">Konversi Dokumen ke HTML</h1>
<form method="post" enctype="multipart/form-data">
<label for="file_upload">Pilih file PDF atau gambar (PNG, JPG):</label>
<input type="file" id="file_upload" name="file_upload" accept=".pdf,.png,.jpg,.jpeg">
<button type="submit">Konversi</button>
</form>
{body}</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_has_form_only() {
        let page = render_page(&PageContext::default());
        assert!(page.contains(r#"name="file_upload""#));
        assert!(!page.contains("<textarea"));
        assert!(!page.contains("<iframe"));
    }

    #[test]
    fn snippet_is_rendered_and_escaped() {
        let page = render_page(&PageContext {
            html_snippet: Some("<h1>FAQ</h1>".to_string()),
            ..Default::default()
        });
        assert!(page.contains("<div class=\"preview\">\n<h1>FAQ</h1>\n</div>"));
        assert!(page.contains("&lt;h1&gt;FAQ&lt;/h1&gt;</textarea>"));
    }

    #[test]
    fn pdf_is_embedded() {
        let page = render_page(&PageContext {
            html_snippet: Some(String::new()),
            pdf_filename: Some("abc.pdf".to_string()),
            ..Default::default()
        });
        assert!(page.contains(r#"<iframe src="/uploads/abc.pdf""#));
    }

    #[test]
    fn error_is_shown() {
        let page = render_page(&PageContext {
            error: Some("Silakan pilih file terlebih dahulu.".to_string()),
            ..Default::default()
        });
        assert!(page.contains("<p class=\"error\">Silakan pilih file terlebih dahulu.</p>"));
    }
}
