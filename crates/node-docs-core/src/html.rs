//! HTML to Markdown conversion for documentation descriptions.
//!
//! Output matches Turndown's defaults with fenced code blocks: blocks separated by
//! blank lines, `**strong**`, `_em_`, backtick code spans, inline links, and
//! Markdown metacharacters escaped in text nodes.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\r\n]+").expect("whitespace run regex"));
static BLANK_LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]*\n(?:[ \t]*\n)+").expect("blank lines regex"));
static FENCE_IN_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^`{3,}").expect("fence in code regex"));
static BACKTICK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`+").expect("backtick run regex"));

/// Applied in order to every text node outside of code.
static ESCAPES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\\", r"\\"),
        (r"\*", r"\*"),
        (r"^-", r"\-"),
        (r"^\+ ", r"\+ "),
        (r"^(=+)", r"\${1}"),
        (r"^(#{1,6}) ", r"\${1} "),
        (r"`", r"\`"),
        (r"^~~~", r"\~~~"),
        (r"\[", r"\["),
        (r"\]", r"\]"),
        (r"^>", r"\>"),
        (r"_", r"\_"),
        (r"^(\d+)\. ", r"${1}\. "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("escape regex"), replacement))
    .collect()
});

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "body", "center", "dd", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "header", "hgroup", "html", "main", "menu", "nav",
    "output", "section", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
];

/// Converts an HTML fragment to Markdown.
pub fn html_to_markdown(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(html);
    let raw = render_children(&fragment.root_element());
    BLANK_LINES_RE.replace_all(&raw, "\n\n").trim().to_string()
}

/// First block of the converted Markdown, i.e. everything before the first blank line.
pub fn first_block(markdown: &str) -> &str {
    markdown.split("\n\n").next().unwrap_or_default()
}

fn render_children(element: &ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            out.push_str(&render_element(&child_element));
        } else if let Some(text) = child.value().as_text() {
            out.push_str(&escape_text(&WHITESPACE_RUN_RE.replace_all(text, " ")));
        }
    }
    out
}

fn render_element(element: &ElementRef<'_>) -> String {
    let name = element.value().name();
    match name {
        "p" => block(render_children(element).trim()),
        "br" => "  \n".to_string(),
        "h1" | "h2" => {
            let content = render_children(element).trim().to_string();
            let marker = if name == "h1" { "=" } else { "-" };
            let underline = marker.repeat(content.chars().count());
            block(&format!("{content}\n{underline}"))
        }
        "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(3);
            let content = render_children(element).trim().to_string();
            block(&format!("{} {content}", "#".repeat(level)))
        }
        "strong" | "b" => delimit(&render_children(element), "**"),
        "em" | "i" => delimit(&render_children(element), "_"),
        "code" => code_span(&element.text().collect::<String>()),
        "pre" => code_block(element),
        "a" => link(element),
        "img" => image(element),
        "ul" | "ol" => list(element, name == "ol"),
        "blockquote" => {
            let content = render_children(element);
            let quoted = BLANK_LINES_RE
                .replace_all(content.trim(), "\n\n")
                .lines()
                .map(|line| format!("> {line}"))
                .collect::<Vec<_>>()
                .join("\n");
            block(&quoted)
        }
        "hr" => block("* * *"),
        "script" | "style" | "template" => String::new(),
        _ if BLOCK_ELEMENTS.contains(&name) => block(&render_children(element)),
        _ => render_children(element),
    }
}

fn block(content: &str) -> String {
    format!("\n\n{content}\n\n")
}

fn delimit(content: &str, delimiter: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }
    format!("{delimiter}{content}{delimiter}")
}

fn escape_text(text: &str) -> String {
    ESCAPES
        .iter()
        .fold(text.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}

fn code_span(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let content = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
    let padded = content.starts_with('`')
        || content.ends_with('`')
        || (content.len() > 1
            && content.starts_with(' ')
            && content.ends_with(' ')
            && !content.trim().is_empty());
    let extra = if padded { " " } else { "" };

    let runs: Vec<usize> = BACKTICK_RUN_RE
        .find_iter(&content)
        .map(|run| run.as_str().len())
        .collect();
    let mut fence_len = 1;
    while runs.contains(&fence_len) {
        fence_len += 1;
    }
    let fence = "`".repeat(fence_len);

    format!("{fence}{extra}{content}{extra}{fence}")
}

fn code_block(element: &ElementRef<'_>) -> String {
    let code_child = element
        .children()
        .find_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "code");

    let language = code_child
        .and_then(|code| {
            code.value()
                .classes()
                .find_map(|class| class.strip_prefix("language-").map(str::to_string))
        })
        .unwrap_or_default();
    let code = code_child
        .map_or_else(|| element.text().collect::<String>(), |code| code.text().collect());

    let mut fence_len = 3;
    for found in FENCE_IN_CODE_RE.find_iter(&code) {
        if found.as_str().len() >= fence_len {
            fence_len = found.as_str().len() + 1;
        }
    }
    let fence = "`".repeat(fence_len);
    let body = code.strip_suffix('\n').unwrap_or(&code);

    block(&format!("{fence}{language}\n{body}\n{fence}"))
}

fn link(element: &ElementRef<'_>) -> String {
    let content = render_children(element);
    let Some(href) = element.value().attr("href").filter(|href| !href.is_empty()) else {
        return content;
    };

    let href = href.replace('(', r"\(").replace(')', r"\)");
    format!("[{content}]({href}{})", title_suffix(element))
}

fn image(element: &ElementRef<'_>) -> String {
    let Some(src) = element.value().attr("src").filter(|src| !src.is_empty()) else {
        return String::new();
    };
    let alt = element
        .value()
        .attr("alt")
        .map(clean_attribute)
        .unwrap_or_default();
    format!("![{alt}]({src}{})", title_suffix(element))
}

fn title_suffix(element: &ElementRef<'_>) -> String {
    element
        .value()
        .attr("title")
        .map(clean_attribute)
        .filter(|title| !title.is_empty())
        .map(|title| format!(" \"{}\"", title.replace('"', "\\\"")))
        .unwrap_or_default()
}

fn clean_attribute(value: &str) -> String {
    BLANK_LINES_RE.replace_all(value, "\n").into_owned()
}

fn list(element: &ElementRef<'_>, ordered: bool) -> String {
    let mut index = element
        .value()
        .attr("start")
        .and_then(|start| start.parse::<usize>().ok())
        .unwrap_or(1);

    let mut items = Vec::new();
    for item in element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
    {
        let rendered = render_children(&item);
        let content = BLANK_LINES_RE.replace_all(rendered.trim(), "\n\n");
        let prefix = if ordered {
            format!("{index}.  ")
        } else {
            "*   ".to_string()
        };
        items.push(format!("{prefix}{}", content.replace('\n', "\n    ")));
        index += 1;
    }

    block(&items.join("\n"))
}
