//! Discord-flavoured markup builders.

pub fn bold(text: &str) -> String {
    format!("**{text}**")
}

pub fn italic(text: &str) -> String {
    format!("_{text}_")
}

pub fn underscore(text: &str) -> String {
    format!("__{text}__")
}

pub fn inline_code(text: &str) -> String {
    format!("`{text}`")
}

pub fn hyperlink(label: &str, url: &str) -> String {
    format!("[{label}]({url})")
}

/// Wraps a URL so the client does not render a link preview for it.
pub fn hide_link_embed(url: &str) -> String {
    format!("<{url}>")
}

pub fn user_mention(id: &str) -> String {
    format!("<@{id}>")
}
