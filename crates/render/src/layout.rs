use docsmith_core::{Document, Section};

/// Characters per rendered line of body text
const TEXT_WIDTH: usize = 90;
/// Characters per rendered line inside a code box
const CODE_WIDTH: usize = 100;
/// Deepest heading style
const MAX_HEADING_STYLE: u8 = 3;

/// Escape text for HTML element content
pub(crate) fn escape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      _ => out.push(c),
    }
  }
  out
}

fn wrapped_lines(text: &str, width: usize) -> usize {
  text
    .split('\n')
    .map(|line| line.chars().count().div_ceil(width).max(1))
    .sum()
}

/// A laid-out block; text is already escaped markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
  Title { markup: String, lines: usize },
  Heading { style: u8, markup: String, lines: usize },
  Paragraph { markup: String, lines: usize },
  Code { markup: String, lines: usize },
}

impl Block {
  pub fn title(text: &str) -> Self {
    Block::Title {
      markup: escape(text),
      lines: wrapped_lines(text, TEXT_WIDTH / 2) + 1,
    }
  }

  /// Levels deeper than 3 share the level-3 style
  pub fn heading(level: u8, text: &str) -> Self {
    Block::Heading {
      style: level.clamp(1, MAX_HEADING_STYLE),
      markup: escape(text),
      lines: wrapped_lines(text, TEXT_WIDTH) + 1,
    }
  }

  /// Newlines become explicit line breaks
  pub fn paragraph(text: &str) -> Self {
    Block::Paragraph {
      markup: escape(text).replace('\n', "<br/>"),
      lines: wrapped_lines(text, TEXT_WIDTH) + 1,
    }
  }

  /// Newlines are kept; the block is emitted preformatted
  pub fn code(text: &str) -> Self {
    Block::Code {
      markup: escape(text),
      lines: wrapped_lines(text, CODE_WIDTH) + 2,
    }
  }

  pub fn from_section(section: &Section) -> Self {
    match section {
      Section::Heading { level, text } => Block::heading(*level, text),
      Section::Paragraph { text } => Block::paragraph(text),
      Section::CodeBlock { text } => Block::code(text),
    }
  }

  /// Estimated height in text lines, including trailing spacing
  pub fn lines(&self) -> usize {
    match self {
      Block::Title { lines, .. } | Block::Heading { lines, .. } | Block::Paragraph { lines, .. } | Block::Code { lines, .. } => {
        *lines
      }
    }
  }
}

/// Immutable sequence of blocks; `push` returns a new layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
  blocks: Vec<Block>,
}

impl Layout {
  pub fn push(self, block: Block) -> Self {
    let mut blocks = self.blocks;
    blocks.push(block);
    Self { blocks }
  }

  /// Fold a document into blocks; an empty title adds no title block
  pub fn from_document(document: &Document) -> Self {
    let initial = if document.title.is_empty() {
      Layout::default()
    } else {
      Layout::default().push(Block::title(&document.title))
    };

    document
      .sections
      .iter()
      .fold(initial, |layout, section| layout.push(Block::from_section(section)))
  }

  pub fn blocks(&self) -> &[Block] {
    &self.blocks
  }

  /// Assign blocks to pages of `lines_per_page` estimated lines
  ///
  /// A block that does not fit starts a new page; one taller than a whole
  /// page gets a page to itself. Always yields at least one page.
  pub fn paginate(&self, lines_per_page: usize) -> Vec<Vec<&Block>> {
    let capacity = lines_per_page.max(1);
    let mut pages: Vec<Vec<&Block>> = vec![Vec::new()];
    let mut used = 0usize;

    for block in &self.blocks {
      let lines = block.lines();
      if let Some(page) = pages.last()
        && !page.is_empty()
        && used + lines > capacity
      {
        pages.push(Vec::new());
        used = 0;
      }
      if let Some(page) = pages.last_mut() {
        page.push(block);
      }
      used += lines;
    }

    pages
  }
}
