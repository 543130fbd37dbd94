use std::fmt::Write;

use crate::layout::{Block, escape};

const STYLE: &str = r#"
body { margin: 0; background: #e8e8e8; font-family: Helvetica, Arial, sans-serif; font-size: 11pt; color: #111; }
.page { box-sizing: border-box; width: 8.5in; min-height: 11in; margin: 0.25in auto; padding: 1in; background: #fff; page-break-after: always; }
.page:last-child { page-break-after: auto; }
h1.title { font-size: 20pt; text-align: center; margin: 0 0 12pt; }
h1 { font-size: 16pt; margin: 12pt 0 6pt; }
h2 { font-size: 13pt; margin: 10pt 0 6pt; }
h3 { font-size: 11pt; margin: 8pt 0 6pt; }
p { margin: 0 0 12pt; line-height: 1.35; }
pre.code { font-family: Courier, monospace; font-size: 8pt; line-height: 10pt; background: #d3d3d3; border: 1px solid #000; padding: 5pt; margin: 0 0 12pt; white-space: pre-wrap; word-break: break-all; }
@media print { body { background: none; } .page { margin: 0; min-height: auto; } }
"#;

fn emit_block(out: &mut String, block: &Block) {
  // writing to a String cannot fail
  let _ = match block {
    Block::Title { markup, .. } => writeln!(out, "<h1 class=\"title\">{}</h1>", markup),
    Block::Heading { style, markup, .. } => writeln!(out, "<h{0}>{1}</h{0}>", style, markup),
    Block::Paragraph { markup, .. } => writeln!(out, "<p>{}</p>", markup),
    Block::Code { markup, .. } => writeln!(out, "<pre class=\"code\">{}</pre>", markup),
  };
}

/// Standalone HTML page set, one `<section class="page">` per page
pub(crate) fn emit(title: &str, pages: &[Vec<&Block>]) -> String {
  let head_title = if title.is_empty() { "Document" } else { title };

  let mut out = String::new();
  out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n");
  let _ = writeln!(out, "<title>{}</title>", escape(head_title));
  let _ = writeln!(out, "<style>{}</style>", STYLE);
  out.push_str("</head>\n<body>\n");

  for (number, page) in pages.iter().enumerate() {
    let _ = writeln!(out, "<section class=\"page\" data-page=\"{}\">", number + 1);
    for block in page {
      emit_block(&mut out, block);
    }
    out.push_str("</section>\n");
  }

  out.push_str("</body>\n</html>\n");
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Layout;

  #[test]
  fn test_emit_pages_and_blocks() {
    let layout = Layout::default()
      .push(Block::title("A & B"))
      .push(Block::heading(2, "Usage"))
      .push(Block::code("print('<hi>')"));

    let html = emit("A & B", &layout.paginate(48));
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>A &amp; B</title>"));
    assert!(html.contains("<h1 class=\"title\">A &amp; B</h1>"));
    assert!(html.contains("<h2>Usage</h2>"));
    assert!(html.contains("<pre class=\"code\">print('&lt;hi&gt;')</pre>"));
    assert_eq!(html.matches("<section class=\"page\"").count(), 1);
  }

  #[test]
  fn test_untitled_document_head() {
    let html = emit("", &[Vec::new()]);
    assert!(html.contains("<title>Document</title>"));
  }
}
