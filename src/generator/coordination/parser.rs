//! 子问题列表解析
//!
//! 把模型返回的自由文本切分成子问题列表。规则：
//!
//! 1. 代码围栏行、水平分隔线视为空行；标题行去掉 `#` 后若是列表项则保留，否则视为空行。
//! 2. 行首带项目符号（`-` `*` `+` `•`）或编号（`1.` `1)` `(1)` `1:` `1 -` `Q1:` `Sub-question 1:`）
//!    的行是列表项。
//! 3. 只要存在列表项：紧跟在列表项之后、中间没有空行的普通行视为换行续写，用一个空格拼接；
//!    但若该列表项已以句末标点（`?` `.` `!` `？` `。` `！`）结束，这一行是结语，列表项就此结束。
//!    第一个列表项之前或空行之后的普通行是前言/结语，丢弃。
//! 4. 没有列表项且有多行时，每个非空行是一个子问题，以 `:` 结尾的引导句丢弃。
//! 5. 只有一行时：内嵌编号（`1. A 2. B`）按编号切分；否则含两个及以上 `?` 时按 `?` 切分；
//!    否则含 `;` 时按 `;` 切分；否则行首没有列表标记、不含 `?` 且以 `.` `!` `。` `！` 结尾的
//!    整句是说明文字（例如拒绝拆解的回答），不产生子问题；否则不含 `?` 且含 `,` 时按 `,` 切分；
//!    否则整行是一个子问题。一行只有裸编号（`1.`、`-`）时同样不产生子问题。
//! 6. 每项去掉包裹的 `**` `__` 引号和反引号，丢弃空项，忽略大小写去重并保持原有顺序。

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[-*+•](?:\s+|$)|\*{0,2}\(?\d{1,3}\)\*{0,2}\s*|\*{0,2}\d{1,3}[.:]\*{0,2}(?:\s+|$)|\d{1,3}\s+-(?:\s+|$)|(?i:q|sub-?question\s*)\d{1,3}[.:)]\s*)",
    )
    .unwrap()
});

static INLINE_NUMBERING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\(?\d{1,3}[.)]\s+").unwrap());

static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#{1,6}(?:\s+|$)").unwrap());

static RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:[-*_=]\s*){3,}$").unwrap());

const SENTENCE_END: [char; 6] = ['?', '.', '!', '？', '。', '！'];

#[derive(Debug, PartialEq)]
enum Line<'a> {
    Blank,
    Item(&'a str),
    Text(&'a str),
}

fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with("```") || RULE.is_match(line) {
        return Line::Blank;
    }

    if let Some(heading) = HEADING.find(line) {
        let rest = line[heading.end()..].trim();
        return match LIST_MARKER.find(rest) {
            Some(marker) => Line::Item(&rest[marker.end()..]),
            None => Line::Blank,
        };
    }

    match LIST_MARKER.find(line) {
        Some(marker) => Line::Item(&line[marker.end()..]),
        None => Line::Text(line),
    }
}

/// 去掉包裹的强调符号与引号
fn clean_item(item: &str) -> String {
    let mut text = item.trim();
    loop {
        let before = text;
        for (open, close) in [
            ("**", "**"),
            ("__", "__"),
            ("\"", "\""),
            ("“", "”"),
            ("'", "'"),
            ("`", "`"),
        ] {
            if text.len() >= open.len() + close.len()
                && text.starts_with(open)
                && text.ends_with(close)
            {
                text = text[open.len()..text.len() - close.len()].trim();
            }
        }
        if text == before {
            break;
        }
    }
    text.to_string()
}

fn split_single_line(line: &str, marked: bool) -> Vec<String> {
    let line = match LIST_MARKER.find(line) {
        Some(marker) => &line[marker.end()..],
        None => line,
    };

    let numbered: Vec<&str> = INLINE_NUMBERING.split(line).collect();
    if numbered.len() >= 2 {
        return numbered.into_iter().map(str::to_string).collect();
    }

    let question_marks = line.matches('?').count();
    if question_marks >= 2 {
        return line
            .split_inclusive('?')
            .map(|part| part.trim_start_matches([',', ';', ' ', '\t']).to_string())
            .collect();
    }
    if line.contains(';') {
        return line.split(';').map(str::to_string).collect();
    }
    if !marked && question_marks == 0 && clean_item(line).ends_with(['.', '!', '。', '！']) {
        return Vec::new();
    }
    if question_marks == 0 && line.contains(',') {
        return line.split(',').map(str::to_string).collect();
    }
    vec![line.to_string()]
}

fn collect_list_items(lines: &[Line<'_>]) -> Vec<String> {
    let mut items = Vec::new();
    let mut current: Option<String> = None;

    for line in lines {
        match line {
            Line::Item(text) => {
                items.extend(current.take());
                current = Some(text.to_string());
            }
            Line::Text(text) => {
                let closed = current
                    .as_deref()
                    .is_some_and(|item| clean_item(item).ends_with(SENTENCE_END));
                if closed {
                    items.extend(current.take());
                } else if let Some(item) = current.as_mut() {
                    item.push(' ');
                    item.push_str(text);
                }
            }
            Line::Blank => {
                items.extend(current.take());
            }
        }
    }
    items.extend(current);
    items
}

/// 把模型输出解析为有序、去重、非空的子问题列表。无法识别任何子问题时返回空列表
pub fn parse_sub_questions(text: &str) -> Vec<String> {
    let lines: Vec<Line<'_>> = text.lines().map(classify).collect();
    let content_lines = lines.iter().filter(|l| **l != Line::Blank).count();

    let raw_items: Vec<String> = if content_lines == 1 {
        let single = lines.iter().find_map(|line| match line {
            Line::Item(text) => Some((*text, true)),
            Line::Text(text) => Some((*text, false)),
            Line::Blank => None,
        });
        single
            .map(|(text, marked)| split_single_line(text, marked))
            .unwrap_or_default()
    } else if lines.iter().any(|l| matches!(l, Line::Item(_))) {
        collect_list_items(&lines)
    } else {
        lines
            .iter()
            .filter_map(|line| match line {
                Line::Text(text) if !text.ends_with(':') => Some(text.to_string()),
                _ => None,
            })
            .collect()
    };

    let mut seen = HashSet::new();
    raw_items
        .iter()
        .map(|item| clean_item(item))
        .filter(|item| !item.is_empty())
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}
