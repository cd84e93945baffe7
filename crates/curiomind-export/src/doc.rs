//! Pure fallback document synthesis.
//!
//! When the backend cannot render a Word document, the client builds a
//! legacy `.doc` file itself: an HTML shell that word processors open
//! natively. Synthesis is a pure function of the note collection so it can
//! be tested without any network in the picture.

use curiomind_core::types::Explanation;

/// Download name for a backend-rendered PDF.
pub const PDF_FILENAME: &str = "curiomindai-notes.pdf";
/// Download name for a backend-rendered DOCX.
pub const DOCX_FILENAME: &str = "curiomindai-notes.docx";
/// Download name for the client-synthesized fallback document.
pub const FALLBACK_DOC_FILENAME: &str = "curiomindai-notes.doc";

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const FALLBACK_DOC_MEDIA_TYPE: &str = "application/msword";

/// Escape note text for embedding in the fallback document body.
///
/// Four rewrites: `&` to `&amp;`, `<` to `&lt;`, `>` to `&gt;`, and
/// newlines to `<br/>`. Ampersand goes first so it never double-escapes
/// the output of the other rules.
pub fn escape_doc_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\n', "<br/>")
}

/// Synthesize the full fallback document from a note collection.
///
/// Each note becomes a numbered question heading, its answer paragraph,
/// and a separator, in collection order, wrapped in a minimal styled HTML
/// shell titled "CurioMindAI Notes".
pub fn synthesize_fallback_doc(notes: &[Explanation]) -> Vec<u8> {
    let mut body = String::new();
    for (i, note) in notes.iter().enumerate() {
        body.push_str(&format!(
            "<h3>Q{}: {}</h3>\n<p>{}</p>\n<hr/>\n",
            i + 1,
            escape_doc_text(&note.question),
            escape_doc_text(&note.text)
        ));
    }

    let html = format!(
        "<!DOCTYPE html>\n\
         <html><head><meta charset=\"utf-8\"/>\n\
         <title>CurioMindAI Notes</title>\n\
         <style>\n\
         body{{font-family:Segoe UI, Roboto, Helvetica, Arial, sans-serif;}}\n\
         h1{{font-size:22px;margin:0 0 12px}}\n\
         h3{{font-size:16px;margin:16px 0 6px}}\n\
         p{{font-size:14px;line-height:1.5;margin:0 0 10px}}\n\
         hr{{border:none;border-top:1px solid #ddd;margin:12px 0}}\n\
         </style></head>\n\
         <body>\n\
         <h1>CurioMindAI Notes</h1>\n\
         {body}\n\
         </body></html>"
    );

    html.into_bytes()
}
