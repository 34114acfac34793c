//! Markdown to HTML rendering with syntax-highlighted code blocks.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// Renders markdown bodies to HTML.
///
/// Holds the loaded syntax and theme sets; construct once and share, the
/// default syntax set is expensive to load.
pub struct MarkdownRenderer {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let theme = ThemeSet::load_defaults().themes["base16-ocean.dark"].clone();
        Self { syntaxes, theme }
    }

    /// Convert a markdown body to HTML.
    ///
    /// Tables, strikethrough, task lists, and footnotes are enabled. Fenced
    /// code blocks are replaced with pre-highlighted HTML; the fence language
    /// picks the grammar, unknown or missing languages fall back to plain
    /// text.
    pub fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);

        let mut events = Vec::new();
        let mut code_lang: Option<String> = None;
        let mut code_buf = String::new();
        let mut in_code_block = false;

        for event in Parser::new_ext(markdown, options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_buf.clear();
                    code_lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                            Some(lang.to_string())
                        }
                        _ => None,
                    };
                }
                Event::Text(text) if in_code_block => code_buf.push_str(&text),
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    let html = self.highlight(code_lang.take().as_deref(), &code_buf);
                    events.push(Event::Html(html.into()));
                }
                other => events.push(other),
            }
        }

        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, events.into_iter());
        html
    }

    fn highlight(&self, lang: Option<&str>, code: &str) -> String {
        let syntax = lang
            .and_then(|token| self.syntaxes.find_syntax_by_token(token))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());
        highlighted_html_for_string(code, &self.syntaxes, syntax, &self.theme)
            .unwrap_or_else(|_| format!("<pre><code>{}</code></pre>", html_escape(code)))
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
