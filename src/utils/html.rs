//! 简单的HTML处理：转义、去标签、按名称查找开始标签及其属性

use regex::Regex;
use std::sync::LazyLock;

static OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<([a-z][a-z0-9]*)\b([^>]*)>").expect("valid regex"));

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:][a-z0-9_:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid regex")
});

/// 转义文本中的HTML特殊字符
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// 去掉所有标签，返回渲染后的纯文本
pub fn strip_tags(html: &str) -> String {
    let text = ANY_TAG.replace_all(html, " ");
    unescape(&text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// 一个开始标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    attributes: String,
}

impl Tag {
    /// 读取属性值，属性不存在时返回 None
    pub fn attr(&self, name: &str) -> Option<String> {
        ATTRIBUTE
            .captures_iter(&self.attributes)
            .find(|caps| caps[1].eq_ignore_ascii_case(name))
            .map(|caps| {
                caps.get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))
                    .map(|m| unescape(m.as_str()))
                    .unwrap_or_default()
            })
    }
}

/// 按出现顺序返回指定名称的所有开始标签
pub fn find_tags(html: &str, name: &str) -> Vec<Tag> {
    OPEN_TAG
        .captures_iter(html)
        .filter(|caps| caps[1].eq_ignore_ascii_case(name))
        .map(|caps| Tag {
            name: caps[1].to_ascii_lowercase(),
            attributes: caps[2].to_string(),
        })
        .collect()
}
