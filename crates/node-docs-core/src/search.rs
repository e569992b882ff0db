use node_docs_client::{DocNode, DocumentTree, NodeKind};

/// A matching entry plus the context resolved on the way down to it.
///
/// The tree is never annotated; module and source travel as arguments, so any
/// number of searches can share one cached tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit<'tree> {
    pub node: &'tree DocNode,
    pub kind: NodeKind,
    /// Lowercased name of the outermost enclosing module (the entry itself if it is a
    /// top-level module). Section modules nested inside a page never replace it.
    pub module: Option<String>,
    /// The entry's own `source`, else the nearest ancestor's.
    pub source: Option<&'tree str>,
}

/// Two-pass lookup: the trimmed query as a whole, then only its last
/// `.`/`#`/whitespace-separated token (`fs.readFile` retries as `readFile`).
pub fn search<'tree>(tree: &'tree DocumentTree, query: &str) -> Option<SearchHit<'tree>> {
    let trimmed = query.trim();
    if let Some(hit) = find_entry(tree, trimmed) {
        return Some(hit);
    }

    let last_token = last_token(trimmed);
    if last_token == trimmed {
        return None;
    }
    find_entry(tree, last_token)
}

/// First hit across categories, in [`NodeKind::SEARCH_ORDER`].
pub fn find_entry<'tree>(tree: &'tree DocumentTree, name: &str) -> Option<SearchHit<'tree>> {
    NodeKind::SEARCH_ORDER
        .into_iter()
        .find_map(|kind| find_in_category(tree, name, kind))
}

/// Depth-first, pre-order search for an entry of `kind` named `name` (case-insensitive).
pub fn find_in_category<'tree>(
    tree: &'tree DocumentTree,
    name: &str,
    kind: NodeKind,
) -> Option<SearchHit<'tree>> {
    let lowered = name.to_lowercase();
    find_rec(tree.root(), &lowered, kind, None, None)
}

fn find_rec<'tree>(
    node: &'tree DocNode,
    lowered: &str,
    kind: NodeKind,
    module: Option<&'tree str>,
    source: Option<&'tree str>,
) -> Option<SearchHit<'tree>> {
    let module = module.or_else(|| {
        if node.kind == Some(NodeKind::Module) {
            node.name.as_deref()
        } else {
            None
        }
    });
    let source = node.source.as_deref().or(source);

    if node.kind == Some(kind) && node.name_matches(lowered) {
        return Some(SearchHit {
            node,
            kind,
            module: module.map(str::to_lowercase),
            source,
        });
    }

    node.children
        .iter()
        .find_map(|child| find_rec(child, lowered, kind, module, source))
}

fn last_token(query: &str) -> &str {
    query
        .rsplit(|c: char| c.is_whitespace() || c == '#' || c == '.')
        .next()
        .unwrap_or(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> DocumentTree {
        DocumentTree::from_value(&json!({
            "modules": [
                {
                    "name": "fs",
                    "type": "module",
                    "textRaw": "File system",
                    "source": "doc/api/fs.md",
                    "methods": [
                        {"name": "readFile", "type": "method", "textRaw": "fs.readFile(path[, options], callback)"}
                    ],
                    "classes": [
                        {
                            "name": "fs.Stats",
                            "type": "class",
                            "textRaw": "Class: `fs.Stats`",
                            "methods": [
                                {"name": "isFile", "type": "method", "textRaw": "stats.isFile()"}
                            ]
                        }
                    ],
                    "modules": [
                        {
                            "name": "promises",
                            "type": "module",
                            "textRaw": "Promises API",
                            "source": "doc/api/fs/promises.md",
                            "methods": [
                                {"name": "open", "type": "method", "textRaw": "fsPromises.open(path)"}
                            ]
                        }
                    ]
                },
                {
                    "name": "events",
                    "type": "module",
                    "textRaw": "Events",
                    "events": [
                        {"name": "close", "type": "event", "textRaw": "Event: `'close'`"}
                    ],
                    "methods": [
                        {"name": "close", "type": "method", "textRaw": "emitter.close()"}
                    ]
                }
            ],
            "globals": [
                {"name": "process", "type": "global", "textRaw": "`process`", "source": "doc/api/globals.md"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn resolves_enclosing_module_and_inherited_source() {
        let tree = tree();
        let hit = find_entry(&tree, "readfile").unwrap();
        assert_eq!(hit.kind, NodeKind::Method);
        assert_eq!(hit.node.name.as_deref(), Some("readFile"));
        assert_eq!(hit.module.as_deref(), Some("fs"));
        assert_eq!(hit.source, Some("doc/api/fs.md"));
    }

    #[test]
    fn outer_module_is_kept_while_source_follows_nearest() {
        let tree = tree();
        let hit = find_entry(&tree, "open").unwrap();
        assert_eq!(hit.module.as_deref(), Some("fs"));
        assert_eq!(hit.source, Some("doc/api/fs/promises.md"));
    }

    #[test]
    fn section_modules_do_not_replace_the_page_module() {
        let tree = DocumentTree::from_value(&json!({
            "modules": [
                {
                    "name": "fs",
                    "type": "module",
                    "source": "doc/api/fs.md",
                    "modules": [
                        {
                            "name": "callback_api",
                            "type": "module",
                            "methods": [
                                {"name": "readFile", "type": "method", "textRaw": "fs.readFile(path[, options], callback)"}
                            ]
                        }
                    ]
                }
            ]
        }))
        .unwrap();

        let hit = find_entry(&tree, "readFile").unwrap();
        assert_eq!(hit.module.as_deref(), Some("fs"));
        assert_eq!(hit.source, Some("doc/api/fs.md"));

        let section = find_entry(&tree, "callback_api").unwrap();
        assert_eq!(section.kind, NodeKind::Module);
        assert_eq!(section.module.as_deref(), Some("fs"));
    }

    #[test]
    fn module_entry_is_its_own_module() {
        let tree = tree();
        let hit = find_entry(&tree, "FS").unwrap();
        assert_eq!(hit.kind, NodeKind::Module);
        assert_eq!(hit.module.as_deref(), Some("fs"));
    }

    #[test]
    fn earlier_category_wins_over_document_order() {
        let tree = tree();
        // `close` appears as an event before it appears as a method, but methods rank higher.
        let hit = find_entry(&tree, "close").unwrap();
        assert_eq!(hit.kind, NodeKind::Method);
        assert_eq!(hit.node.title(), "emitter.close()");
        assert_eq!(hit.module.as_deref(), Some("events"));
        assert_eq!(hit.source, None);
    }

    #[test]
    fn entries_outside_modules_have_no_module() {
        let tree = tree();
        let hit = find_entry(&tree, "process").unwrap();
        assert_eq!(hit.kind, NodeKind::Global);
        assert_eq!(hit.module, None);
    }

    #[test]
    fn category_restricts_matches() {
        let tree = tree();
        assert!(find_in_category(&tree, "readFile", NodeKind::ClassMethod).is_none());
        assert!(find_in_category(&tree, "close", NodeKind::Event).is_some());
    }

    #[test]
    fn falls_back_to_last_token() {
        let tree = tree();
        let hit = search(&tree, "  fs.readFile ").unwrap();
        assert_eq!(hit.node.name.as_deref(), Some("readFile"));

        let hit = search(&tree, "Stats#isFile").unwrap();
        assert_eq!(hit.node.name.as_deref(), Some("isFile"));
    }

    #[test]
    fn full_query_is_preferred_over_last_token() {
        let tree = tree();
        let hit = search(&tree, "fs.Stats").unwrap();
        assert_eq!(hit.kind, NodeKind::Class);
    }

    #[test]
    fn unknown_queries_find_nothing() {
        let tree = tree();
        assert!(search(&tree, "doesNotExist123").is_none());
        assert!(search(&tree, "fs.doesNotExist123").is_none());
        assert!(search(&tree, "").is_none());
    }

    #[test]
    fn last_token_splits_on_separators() {
        assert_eq!(last_token("fs.readFile"), "readFile");
        assert_eq!(last_token("Stats#isFile"), "isFile");
        assert_eq!(last_token("new Buffer"), "Buffer");
        assert_eq!(last_token("trailing."), "");
        assert_eq!(last_token("plain"), "plain");
    }
}
