//! # Token adapter
//!
//! Flattens `pulldown-cmark` events into the small [`Token`] vocabulary the
//! tree builder understands. Grammar decisions (what counts as emphasis, a
//! list, a table) all belong to `pulldown-cmark`; this module only names the
//! resulting elements and their attributes.
//!
//! Fenced and indented code blocks are collapsed into a single
//! [`Token::Code`], and images into a childless `img` tag carrying the alt
//! text as an attribute. Raw HTML is passed through as plain text so it is
//! displayed, never interpreted.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use pulldown_cmark::{
    Alignment, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
    TextMergeStream,
};
use regex::Regex;

/// Attribute map shared by tokens, tree nodes and output nodes.
pub type Attrs = BTreeMap<String, String>;

/// One lexical unit of the flat stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Open { tag_name: String, attrs: Attrs },
    Close { tag_name: String },
    Text(String),
    SoftBreak,
    Code {
        content: String,
        language: Option<String>,
    },
}

impl Token {
    pub fn open(tag_name: impl Into<String>) -> Self {
        Self::open_with(tag_name, Attrs::new())
    }

    pub fn open_with(tag_name: impl Into<String>, attrs: Attrs) -> Self {
        Self::Open {
            tag_name: tag_name.into(),
            attrs,
        }
    }

    pub fn close(tag_name: impl Into<String>) -> Self {
        Self::Close {
            tag_name: tag_name.into(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }
}

/// Switches for the token adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizeOptions {
    /// Turn bare `http(s)://` URLs in running text (outside links and code)
    /// into `a` tags.
    pub linkify: bool,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self { linkify: true }
    }
}

/// Parse markdown and flatten it into tokens.
pub fn tokenize(source: &str, options: &TokenizeOptions) -> Vec<Token> {
    let parser = Parser::new_ext(source, parser_options());
    let mut tokenizer = Tokenizer::new(options.linkify);
    for event in TextMergeStream::new(parser) {
        tokenizer.event(event);
    }
    log::debug!("tokenized {} bytes into {} tokens", source.len(), tokenizer.out.len());
    tokenizer.out
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

struct CodeCapture {
    language: Option<String>,
    content: String,
}

struct ImageCapture {
    src: String,
    title: String,
    alt: String,
    // Images may nest inside alt text; only the outermost one is emitted.
    depth: usize,
}

struct Tokenizer {
    linkify: bool,
    out: Vec<Token>,
    /// Element names opened for each pulldown tag still open, innermost last.
    /// An empty entry means the tag was dropped.
    open: Vec<Vec<&'static str>>,
    code: Option<CodeCapture>,
    image: Option<ImageCapture>,
    link_depth: usize,
    alignments: Vec<Alignment>,
    cell_index: usize,
    in_table_head: bool,
    in_table_body: bool,
}

impl Tokenizer {
    fn new(linkify: bool) -> Self {
        Self {
            linkify,
            out: Vec::new(),
            open: Vec::new(),
            code: None,
            image: None,
            link_depth: 0,
            alignments: Vec::new(),
            cell_index: 0,
            in_table_head: false,
            in_table_body: false,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        if self.code.is_some() {
            self.code_event(event);
            return;
        }
        if self.image.is_some() {
            self.image_event(event);
            return;
        }

        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                self.code = Some(CodeCapture {
                    language: code_language(&kind),
                    content: String::new(),
                });
            }
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                self.image = Some(ImageCapture {
                    src: dest_url.to_string(),
                    title: title.to_string(),
                    alt: String::new(),
                    depth: 1,
                });
            }
            Event::Start(tag) => self.start(tag),
            Event::End(TagEnd::Link) => {
                self.link_depth = self.link_depth.saturating_sub(1);
                self.end();
            }
            Event::End(TagEnd::TableHead) => {
                self.in_table_head = false;
                self.end();
            }
            Event::End(TagEnd::Table) => {
                self.in_table_body = false;
                self.alignments.clear();
                self.end();
            }
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                self.out.push(Token::open("code"));
                self.out.push(Token::text(code.to_string()));
                self.out.push(Token::close("code"));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.out.push(Token::text(html.to_string()));
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.out.push(Token::text(math.to_string()));
            }
            Event::FootnoteReference(label) => {
                let label: &str = &label;
                self.out.push(Token::text(format!("[^{label}]")));
            }
            Event::SoftBreak => self.out.push(Token::SoftBreak),
            Event::HardBreak => self.void("br", Attrs::new()),
            Event::Rule => self.void("hr", Attrs::new()),
            Event::TaskListMarker(checked) => {
                let mut attrs = Attrs::new();
                attrs.insert("type".to_string(), "checkbox".to_string());
                attrs.insert("disabled".to_string(), String::new());
                if checked {
                    attrs.insert("checked".to_string(), String::new());
                }
                self.void("input", attrs);
            }
        }
    }

    fn code_event(&mut self, event: Event<'_>) {
        match event {
            Event::Text(text) => {
                if let Some(code) = self.code.as_mut() {
                    code.content.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(code) = self.code.take() {
                    self.out.push(Token::Code {
                        content: code.content,
                        language: code.language,
                    });
                }
            }
            _ => {}
        }
    }

    fn image_event(&mut self, event: Event<'_>) {
        let Some(image) = self.image.as_mut() else {
            return;
        };
        match event {
            Event::Start(Tag::Image { .. }) => image.depth += 1,
            Event::End(TagEnd::Image) => {
                image.depth -= 1;
                if image.depth == 0
                    && let Some(image) = self.image.take()
                {
                    let mut attrs = Attrs::new();
                    attrs.insert("src".to_string(), image.src);
                    attrs.insert("alt".to_string(), image.alt);
                    if !image.title.is_empty() {
                        attrs.insert("title".to_string(), image.title);
                    }
                    self.void("img", attrs);
                }
            }
            Event::Text(text) | Event::Code(text) => image.alt.push_str(&text),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let mut attrs = Attrs::new();
        let names: Vec<&'static str> = match tag {
            Tag::Paragraph => vec!["p"],
            Tag::Heading {
                level, id, classes, ..
            } => {
                if let Some(id) = id {
                    attrs.insert("id".to_string(), id.to_string());
                }
                if !classes.is_empty() {
                    attrs.insert("class".to_string(), join_classes(&classes));
                }
                vec![heading_tag(level)]
            }
            Tag::BlockQuote(_) => vec!["blockquote"],
            Tag::List(Some(start)) => {
                if start != 1 {
                    attrs.insert("start".to_string(), start.to_string());
                }
                vec!["ol"]
            }
            Tag::List(None) => vec!["ul"],
            Tag::Item => vec!["li"],
            Tag::Emphasis => vec!["em"],
            Tag::Strong => vec!["strong"],
            Tag::Strikethrough => vec!["del"],
            Tag::Link {
                dest_url, title, ..
            } => {
                self.link_depth += 1;
                attrs.insert("href".to_string(), dest_url.to_string());
                if !title.is_empty() {
                    attrs.insert("title".to_string(), title.to_string());
                }
                vec!["a"]
            }
            Tag::Table(alignments) => {
                self.alignments = alignments;
                vec!["table"]
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.cell_index = 0;
                // pulldown puts header cells directly under the head
                vec!["thead", "tr"]
            }
            Tag::TableRow => {
                self.cell_index = 0;
                if !self.in_table_body {
                    self.in_table_body = true;
                    self.out.push(Token::open("tbody"));
                    // tbody closes together with its table
                    if let Some(table) = self.open.last_mut() {
                        table.push("tbody");
                    }
                }
                vec!["tr"]
            }
            Tag::TableCell => {
                if let Some(style) = self.alignments.get(self.cell_index).and_then(align_style) {
                    attrs.insert("style".to_string(), style.to_string());
                }
                self.cell_index += 1;
                vec![if self.in_table_head { "th" } else { "td" }]
            }
            _ => vec![],
        };

        // Attributes belong to the outermost element of the group.
        for (i, name) in names.iter().enumerate() {
            let attrs = if i == 0 {
                std::mem::take(&mut attrs)
            } else {
                Attrs::new()
            };
            self.out.push(Token::open_with(*name, attrs));
        }
        self.open.push(names);
    }

    fn end(&mut self) {
        if let Some(names) = self.open.pop() {
            for name in names.into_iter().rev() {
                self.out.push(Token::close(name));
            }
        }
    }

    fn void(&mut self, tag_name: &'static str, attrs: Attrs) {
        self.out.push(Token::open_with(tag_name, attrs));
        self.out.push(Token::close(tag_name));
    }

    fn text(&mut self, text: &str) {
        if self.linkify && self.link_depth == 0 {
            self.out.extend(linkify_text(text));
        } else {
            self.out.push(Token::text(text));
        }
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn join_classes(classes: &[CowStr<'_>]) -> String {
    classes
        .iter()
        .map(|class| class.as_ref())
        .collect::<Vec<&str>>()
        .join(" ")
}

fn align_style(alignment: &Alignment) -> Option<&'static str> {
    match alignment {
        Alignment::None => None,
        Alignment::Left => Some("text-align:left"),
        Alignment::Center => Some("text-align:center"),
        Alignment::Right => Some("text-align:right"),
    }
}

/// The first word of a fence's info string, exactly as written.
fn code_language(kind: &CodeBlockKind<'_>) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
        CodeBlockKind::Indented => None,
    }
}

fn url_regex() -> &'static Regex {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    URL_REGEX.get_or_init(|| Regex::new(r"https?://[^\s<>\[\]]+").expect("Invalid URL regex"))
}

/// Split a run of text into plain text and `a` tags around bare URLs.
fn linkify_text(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current_pos = 0;

    for url_match in url_regex().find_iter(text) {
        let start = url_match.start();
        // Trailing punctuation usually ends the sentence, not the URL
        let href = url_match
            .as_str()
            .trim_end_matches(['.', ',', ':', ';', '!', '?', ')', ']', '}']);
        let end = start + href.len();

        if current_pos < start {
            tokens.push(Token::text(&text[current_pos..start]));
        }
        let mut attrs = Attrs::new();
        attrs.insert("href".to_string(), href.to_string());
        tokens.push(Token::open_with("a", attrs));
        tokens.push(Token::text(href));
        tokens.push(Token::close("a"));

        current_pos = end;
    }

    if current_pos < text.len() {
        tokens.push(Token::text(&text[current_pos..]));
    }
    tokens
}
