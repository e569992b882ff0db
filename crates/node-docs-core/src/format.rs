use node_docs_client::NodeKind;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::html::{first_block, html_to_markdown};
use crate::markdown::{
    bold, hide_link_embed, hyperlink, inline_code, italic, underscore, user_mention,
};
use crate::search::SearchHit;

static SOURCE_PAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+/api/(.+)\..*$").expect("source page regex"));
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(.+?)\]\((.+?)\)").expect("markdown link regex"));
static BOLD_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`\*\*(.*)\*\*`").expect("bold code regex"));

const FALLBACK_EMOJI: &str = "📗";

/// URL-safe rendering of a display string, matching the anchors on the docs site.
pub fn slug(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | ')' | '[' | ']' | '`'))
        .map(|c| if matches!(c, '(' | ',' | '.' | ':') { '_' } else { c })
        .collect()
}

/// Page path encoded in a source hint: `doc/api/fs.md` is `fs`.
pub fn page_from_source(source: Option<&str>) -> Option<&str> {
    SOURCE_PAGE_RE
        .captures(source?)
        .and_then(|captures| captures.get(1))
        .map(|page| page.as_str())
}

/// Same-page anchor for an entry; pages themselves (modules, misc) get none.
pub fn anchor(kind: NodeKind, title: &str, module_name: &str) -> String {
    if kind.is_page() {
        return String::new();
    }
    format!("#{}_{}", slug(module_name), slug(title))
}

/// Everything derived from a hit that goes into the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySummary {
    pub title: String,
    pub module_name: String,
    pub module_url: String,
    pub anchor: String,
    pub full_url: String,
    pub intro: String,
}

impl EntrySummary {
    pub fn build(hit: &SearchHit<'_>, api_base: &str, version: &str) -> Self {
        let node = hit.node;
        let title = node.title().to_string();
        let module_name = hit.module.clone().unwrap_or_else(|| {
            node.name
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
        });

        let page = page_from_source(hit.source).map_or_else(|| slug(&module_name), str::to_string);
        let module_url = format!("{api_base}/docs/{version}/api/{page}");
        let anchor = anchor(hit.kind, &title, &module_name);
        let full_url = format!("{module_url}.html{anchor}");

        let markdown = html_to_markdown(node.desc.as_deref().unwrap_or_default());
        let intro = bold_code_spans(&resolve_links(first_block(&markdown), api_base, version));

        Self {
            title,
            module_name,
            module_url,
            anchor,
            full_url,
            intro,
        }
    }

    /// Header line, then the intro; prefixed with a suggestion line when aimed at someone.
    pub fn render(&self, emoji_id: Option<&str>, target: Option<&str>) -> String {
        let emoji = emoji_id.map_or_else(|| FALLBACK_EMOJI.to_string(), |id| format!("<:node:{id}>"));
        let header = format!(
            "{emoji}  {}",
            underscore(&bold(&hyperlink(&self.title, &hide_link_embed(&self.full_url))))
        );

        let prefix = target
            .map(|target| {
                format!(
                    "{}\n",
                    italic(&format!("Documentation suggestion for {}:", user_mention(target)))
                )
            })
            .unwrap_or_default();

        format!("{prefix}{header}\n{}", self.intro)
    }
}

/// Rewrites `[label](link)` into preview-suppressed links; relative links resolve
/// against the API pages of `version`.
pub fn resolve_links(text: &str, api_base: &str, version: &str) -> String {
    LINK_RE
        .replace_all(text, |captures: &Captures<'_>| {
            let label = &captures[1];
            let link = &captures[2];
            let resolved = if link.starts_with("http") {
                link.to_string()
            } else {
                format!("{api_base}/docs/{version}/api/{link}")
            };
            hyperlink(label, &hide_link_embed(&resolved))
        })
        .into_owned()
}

/// `` `**x**` `` becomes `` **`x`** ``.
pub fn bold_code_spans(text: &str) -> String {
    BOLD_CODE_RE
        .replace_all(text, |captures: &Captures<'_>| bold(&inline_code(&captures[1])))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use node_docs_client::DocNode;

    const BASE: &str = "https://nodejs.org";

    fn hit<'a>(
        node: &'a DocNode,
        kind: NodeKind,
        module: Option<&str>,
        source: Option<&'a str>,
    ) -> SearchHit<'a> {
        SearchHit {
            node,
            kind,
            module: module.map(str::to_string),
            source,
        }
    }

    #[test]
    fn slug_strips_and_replaces_punctuation() {
        assert_eq!(
            slug("fs.readFile(path[, options], callback)"),
            "fs_readfile_path_options_callback"
        );
        assert_eq!(slug("Class: `fs.Stats`"), "class_fs_stats");
        assert_eq!(slug("Event: `'close'`"), "event_'close'");
    }

    #[test]
    fn slug_is_idempotent_and_clean() {
        for text in ["fs.readFile(path[, options], callback)", "Class: `fs.Stats`", "A (b) [c] `d`"] {
            let once = slug(text);
            assert_eq!(slug(&once), once);
            assert!(!once.contains(['[', ']', '(', ')', ' ', '`']));
        }
    }

    #[test]
    fn page_from_source_takes_path_after_api() {
        assert_eq!(page_from_source(Some("doc/api/fs.md")), Some("fs"));
        assert_eq!(
            page_from_source(Some("/home/node/doc/api/fs/promises.md")),
            Some("fs/promises")
        );
        assert_eq!(page_from_source(Some("README.md")), None);
        assert_eq!(page_from_source(None), None);
    }

    #[test]
    fn anchor_is_empty_only_for_pages() {
        assert_eq!(anchor(NodeKind::Module, "File system", "fs"), "");
        assert_eq!(anchor(NodeKind::Misc, "About this documentation", "documentation"), "");
        for kind in [
            NodeKind::Class,
            NodeKind::ClassMethod,
            NodeKind::Method,
            NodeKind::Event,
            NodeKind::Global,
        ] {
            assert!(anchor(kind, "x", "fs").starts_with('#'));
        }
        assert_eq!(anchor(NodeKind::Method, "readFile", "fs"), "#fs_readfile");
    }

    #[test]
    fn summary_uses_source_page_and_module_anchor() {
        let node = DocNode {
            name: Some("readFile".to_string()),
            text_raw: Some("fs.readFile(path[, options], callback)".to_string()),
            desc: Some("<p>Asynchronously reads the entire contents of a file.</p><p>More.</p>".to_string()),
            ..DocNode::default()
        };
        let summary = EntrySummary::build(
            &hit(&node, NodeKind::Method, Some("fs"), Some("doc/api/fs.md")),
            BASE,
            "latest-v18.x",
        );

        assert_eq!(summary.module_name, "fs");
        assert_eq!(summary.module_url, "https://nodejs.org/docs/latest-v18.x/api/fs");
        assert_eq!(
            summary.full_url,
            "https://nodejs.org/docs/latest-v18.x/api/fs.html#fs_fs_readfile_path_options_callback"
        );
        assert_eq!(summary.intro, "Asynchronously reads the entire contents of a file.");
    }

    #[test]
    fn summary_without_source_slugs_the_entry_name() {
        let node = DocNode {
            name: Some("Buffer".to_string()),
            text_raw: Some("Buffer".to_string()),
            ..DocNode::default()
        };
        let summary = EntrySummary::build(&hit(&node, NodeKind::Module, None, None), BASE, "v20.0.0");

        assert_eq!(summary.module_name, "buffer");
        assert_eq!(summary.anchor, "");
        assert_eq!(summary.full_url, "https://nodejs.org/docs/v20.0.0/api/buffer.html");
        assert_eq!(summary.intro, "");
    }

    #[test]
    fn relative_and_absolute_links_are_resolved() {
        let text = "See [`fs.Stats`](fs.html#fs_class_fs_stats) and [MDN](https://developer.mozilla.org).";
        assert_eq!(
            resolve_links(text, BASE, "v18.0.0"),
            "See [`fs.Stats`](<https://nodejs.org/docs/v18.0.0/api/fs.html#fs_class_fs_stats>) \
             and [MDN](<https://developer.mozilla.org>)."
        );
    }

    #[test]
    fn bold_code_spans_are_flipped() {
        assert_eq!(bold_code_spans("Use `**flag**` here"), "Use **`flag`** here");
        assert_eq!(bold_code_spans("`plain`"), "`plain`");
    }

    #[test]
    fn render_adds_header_and_optional_suggestion() {
        let summary = EntrySummary {
            title: "fs.readFile()".to_string(),
            module_name: "fs".to_string(),
            module_url: "https://nodejs.org/docs/v18.0.0/api/fs".to_string(),
            anchor: "#fs_fs_readfile".to_string(),
            full_url: "https://nodejs.org/docs/v18.0.0/api/fs.html#fs_fs_readfile".to_string(),
            intro: "Reads a file.".to_string(),
        };

        assert_eq!(
            summary.render(Some("123"), None),
            "<:node:123>  __**[fs.readFile()](<https://nodejs.org/docs/v18.0.0/api/fs.html#fs_fs_readfile>)**__\nReads a file."
        );

        let suggested = summary.render(None, Some("42"));
        let mut lines = suggested.lines();
        assert_eq!(lines.next(), Some("_Documentation suggestion for <@42>:_"));
        assert!(lines.next().is_some_and(|line| line.starts_with("📗  __**[fs.readFile()]")));
        assert_eq!(lines.next(), Some("Reads a file."));
    }
}
