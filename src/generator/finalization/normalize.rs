//! 最终报告的markdown规范化与校验
//!
//! 规范化后的报告保证：没有外层代码围栏、有一级标题、有来源章节，并且能被解析为mdast。

use std::sync::LazyLock;

use markdown::mdast::Node;
use markdown::{ParseOptions, to_mdast};
use regex::Regex;

use crate::error::{ResearchError, ResearchResult};
use crate::generator::state::SearchHit;
use crate::i18n::TargetLanguage;

/// 识别为来源章节的标题（小写，整体匹配）
const SOURCE_HEADINGS: [&str; 8] = [
    "sources",
    "source",
    "references",
    "reference",
    "bibliography",
    "citations",
    "works cited",
    "sources and references",
];

static HEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}(?:\.\d{1,2})*[.)]?\s+").unwrap());

/// 去掉包裹整篇文本的 ```markdown / ```md / ``` 围栏
pub fn strip_outer_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(first_line_end) = text.find('\n') else {
        return text;
    };
    let opening = text[..first_line_end].trim();
    let is_markdown_fence = matches!(opening, "```" | "```markdown" | "```md" | "```Markdown");
    if !is_markdown_fence || !text.ends_with("```") {
        return text;
    }

    let body = &text[first_line_end + 1..text.len() - 3];
    // 内部还有围栏时说明结尾的 ``` 属于内部代码块
    if body.lines().any(|line| line.trim_start().starts_with("```")) {
        return text;
    }
    body.trim()
}

fn parse(text: &str) -> ResearchResult<Node> {
    to_mdast(text, &ParseOptions::gfm())
        .map_err(|e| ResearchError::model_call(format!("报告不是合法的markdown: {}", e)))
}

fn plain_text(node: &Node) -> String {
    match node {
        Node::Text(text) => text.value.clone(),
        Node::InlineCode(code) => code.value.clone(),
        other => other
            .children()
            .map(|children| children.iter().map(plain_text).collect())
            .unwrap_or_default(),
    }
}

/// 按文档顺序收集所有标题：(级别, 纯文本)
fn collect_headings(node: &Node, headings: &mut Vec<(u8, String)>) {
    if let Node::Heading(heading) = node {
        headings.push((heading.depth, plain_text(node)));
        return;
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_headings(child, headings);
        }
    }
}

/// 标题去掉编号和结尾冒号后与来源章节名完全一致才算来源章节
fn is_sources_heading(text: &str, language: TargetLanguage) -> bool {
    let text = text.trim().to_lowercase();
    let text = HEADING_NUMBER.replace(&text, "");
    let text = text.trim_end_matches([':', '：']).trim();
    text == language.sources_heading().to_lowercase() || SOURCE_HEADINGS.contains(&text)
}

/// 渲染来源章节
pub fn render_sources_section(sources: &[SearchHit], language: TargetLanguage) -> String {
    let mut section = format!("## {}\n\n", language.sources_heading());
    if sources.is_empty() {
        section.push_str(language.no_sources_notice());
        section.push('\n');
        return section;
    }
    for (index, hit) in sources.iter().enumerate() {
        let title = hit.title.trim();
        if title.is_empty() || title == hit.url {
            section.push_str(&format!("{}. <{}>\n", index + 1, hit.url));
        } else {
            section.push_str(&format!("{}. {}: <{}>\n", index + 1, title, hit.url));
        }
    }
    section
}

/// 把模型输出规范化为最终报告，并校验其可被解析
pub fn normalize_report(
    text: &str,
    query: &str,
    sources: &[SearchHit],
    language: TargetLanguage,
) -> ResearchResult<String> {
    let body = strip_outer_fence(text);
    if body.is_empty() {
        return Err(ResearchError::model_call("报告内容为空"));
    }

    let mut headings = Vec::new();
    collect_headings(&parse(body)?, &mut headings);

    let mut report = String::new();
    if !headings.iter().any(|(depth, _)| *depth == 1) {
        report.push_str(&format!("# {}\n\n", query.trim()));
    }
    report.push_str(body);

    if !headings
        .iter()
        .any(|(_, text)| is_sources_heading(text, language))
    {
        report.push_str("\n\n");
        report.push_str(&render_sources_section(sources, language));
    }

    if !report.ends_with('\n') {
        report.push('\n');
    }

    parse(&report)?;
    Ok(report)
}
