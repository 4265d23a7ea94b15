//! Markdown conversion and base-template wrapping.
//!
//! Markdown pages are converted to HTML with [pulldown-cmark], then wrapped
//! so the page renders as an extension of a base layout:
//!
//! ```text
//! {% extends "base.html" %}{% block post_content %}<p>converted html</p>{% endblock post_content %}
//! ```
//!
//! The page can choose its layout with `extends:` in front matter while the
//! converted HTML stays intact inside the `post_content` block. Template
//! syntax in markdown text is still live, so `{{ site.title }}` in a post
//! expands at render time.
//!
//! ## Code blocks
//!
//! Fenced code blocks are highlighted by [syntect] from the language named
//! after the fence. Highlighting emits class names only, so the site's
//! stylesheet chooses the colours:
//!
//! ```text
//! <div class="code"><pre class="highlight"><code class="language-rust">
//! <span class="source rust"><span class="storage type function rust">fn</span> ...
//! </code></pre></div>
//! ```
//!
//! An unknown or missing language is rendered as escaped plain text in the
//! same wrapper. Blocks tagged `jinja`, `jinja2` or `tera` are additionally
//! emitted inside `{% raw %}` so template code shown as an example is printed
//! rather than executed.
//!
//! [pulldown-cmark]: https://docs.rs/pulldown-cmark
//! [syntect]: https://docs.rs/syntect

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};
use std::sync::LazyLock;
use syntect::escape::Escape;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::warn;

/// Name of the block markdown bodies are placed in.
pub const CONTENT_BLOCK: &str = "post_content";

const RAW_LANGUAGES: &[&str] = &["jinja", "jinja2", "tera"];
const RAW_START: &str = "{% raw %}";
const RAW_END: &str = "{% endraw %}";

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options
}

/// A fenced block collected between its start and end events.
struct FencedBlock {
    language: String,
    code: String,
}

impl FencedBlock {
    fn new(info: &str) -> Self {
        Self {
            language: info.split_whitespace().next().unwrap_or_default().to_string(),
            code: String::new(),
        }
    }

    fn to_html(&self) -> String {
        let body = highlight(&self.code, &self.language).unwrap_or_else(|e| {
            warn!("cannot highlight {} block: {e}", self.language);
            Escape(&self.code).to_string()
        });

        let mut out = String::from("<div class=\"code\">");
        let raw = is_template_language(&self.language);
        if raw {
            out.push_str(RAW_START);
        }
        out.push_str("<pre class=\"highlight\"><code");
        if !self.language.is_empty() {
            out.push_str(&format!(" class=\"language-{}\"", Escape(&self.language)));
        }
        out.push('>');
        out.push_str(&body);
        out.push_str("</code></pre>");
        if raw {
            out.push_str(RAW_END);
        }
        out.push_str("</div>\n");
        out
    }
}

/// Class-annotated HTML for `code`, plain text when the language is unknown.
fn highlight(code: &str, language: &str) -> Result<String, syntect::Error> {
    let syntax = SYNTAXES
        .find_syntax_by_token(language)
        .filter(|_| !language.is_empty())
        .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text());

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAXES, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    Ok(generator.finalize())
}

/// Convert a markdown body to HTML.
pub fn to_html(markdown: &str) -> String {
    let mut events = Vec::new();
    let mut fenced: Option<FencedBlock> = None;

    for event in Parser::new_ext(markdown, options()) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                fenced = Some(FencedBlock::new(&info));
            }
            Event::Text(text) if fenced.is_some() => {
                if let Some(block) = fenced.as_mut() {
                    block.code.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) if fenced.is_some() => {
                if let Some(block) = fenced.take() {
                    events.push(Event::Html(CowStr::from(block.to_html())));
                }
            }
            event => events.push(event),
        }
    }

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    output
}

fn is_template_language(language: &str) -> bool {
    language
        .split_whitespace()
        .next()
        .is_some_and(|lang| RAW_LANGUAGES.contains(&lang))
}

/// Wrap converted HTML as an extension of `base_template`.
///
/// The HTML is placed verbatim inside [`CONTENT_BLOCK`]. Template names
/// containing quotes are rejected when metadata is read.
pub fn wrap_in_base(html: &str, base_template: &str) -> String {
    format!(
        "{{% extends \"{base_template}\" %}}{{% block {CONTENT_BLOCK} %}}{html}{{% endblock {CONTENT_BLOCK} %}}"
    )
}
