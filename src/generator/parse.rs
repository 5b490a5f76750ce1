//! 模型输出的解析工具

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 去掉模型经常包裹在外层的 markdown 代码块
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // 跳过语言标记所在的第一行
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// 从模型输出中提取 JSON，允许前后夹带说明文字
pub fn extract_json(text: &str) -> Option<Value> {
    let body = strip_code_fence(text);
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return Some(value);
    }

    let start = body.find(['{', '['])?;
    let close = match body.as_bytes()[start] {
        b'{' => '}',
        _ => ']',
    };
    let end = body.rfind(close)?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&body[start..=end]).ok()
}

/// 解析为指定类型，失败时返回可读的原因
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    let value = extract_json(text).ok_or_else(|| "输出不是合法的JSON".to_string())?;
    serde_json::from_value(value).map_err(|e| format!("JSON结构不符合要求: {}", e))
}

/// 把“每行一个候选”的输出整理成列表：去编号、去引号、去重
pub fn parse_candidate_lines(text: &str, max: usize) -> Vec<String> {
    let body = strip_code_fence(text);

    // 有的模型会直接返回字符串数组
    if let Ok(items) = serde_json::from_str::<Vec<String>>(body) {
        return dedupe(items.into_iter().map(|s| clean_line(&s)), max);
    }

    dedupe(body.lines().map(clean_line), max)
}

fn dedupe(items: impl Iterator<Item = String>, max: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .filter(|item| !item.is_empty())
        .filter(|item| seen.insert(item.to_lowercase()))
        .take(max)
        .collect()
}

fn clean_line(line: &str) -> String {
    let mut line = line.trim();
    line = line.trim_start_matches(['-', '*', '•']).trim_start();

    // "1." "2)" "3:" 之类的编号
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = line[digits..].trim_start();
        if let Some(stripped) = rest
            .strip_prefix('.')
            .or_else(|| rest.strip_prefix(')'))
            .or_else(|| rest.strip_prefix(':'))
        {
            line = stripped.trim_start();
        }
    }

    line.trim_matches(|c: char| c == '"' || c == '“' || c == '”' || c == '*')
        .trim()
        .to_string()
}

/// 附加到prompt中的JSON结构说明
pub fn json_schema_instruction<T: JsonSchema>() -> String {
    let schema = schemars::schema_for!(T);
    format!(
        "Return JSON that matches this schema:\n{}",
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    )
}

/// 去掉正文开头与章节标题重复的 `<h2>`，章节标题由组装器统一输出
pub fn strip_leading_heading(html: &str) -> &str {
    let trimmed = html.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("<h2") {
        if let Some(end) = lower.find("</h2>") {
            return trimmed[end + "</h2>".len()..].trim_start();
        }
    }
    trimmed
}
