// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Markdown rendering with diagram interception.
//!
//! pulldown-cmark parses the text; paragraphs, code blocks, HTML blocks and inline code inside
//! paragraphs are offered to [`RULES`] in order, wherever they sit in the document. The first
//! rule that applies renders the element. Anything no rule claims is rendered to HTML unchanged.

use std::ops::Range;

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use super::graph::{graph_attribute, parse_graph_div, parse_graph_payload};
use super::{ChemNotation, DiagramError, RenderContext, RenderNode};
use crate::classify::{is_bare_mermaid, is_mermaid_content};
use crate::extract::{parse_placeholder, DiagramKind};
use crate::segment::parse_flow_lines;

/// Block-level elements the dispatcher can intercept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element<'a> {
    /// Source text of a paragraph.
    Paragraph { text: &'a str },
    /// `lang` is the lowercased first word of the info string; `None` for untagged fences and
    /// indented code.
    CodeBlock { lang: Option<String>, content: String },
    InlineCode { code: &'a str },
    HtmlBlock { html: String },
}

pub struct DispatchRule {
    pub name: &'static str,
    pub applies: fn(&Element<'_>, &RenderContext<'_>) -> bool,
    pub render: fn(&Element<'_>, &RenderContext<'_>) -> RenderNode,
}

/// Dispatch order; first match wins.
pub static RULES: &[DispatchRule] = &[
    DispatchRule { name: "graph-div", applies: is_graph_div, render: render_graph_div },
    DispatchRule {
        name: "flow-tagged-mermaid",
        applies: is_flow_tagged_mermaid,
        render: render_code_as_mermaid,
    },
    DispatchRule {
        name: "diagram-code-block",
        applies: is_diagram_code_block,
        render: render_diagram_code_block,
    },
    DispatchRule { name: "placeholder", applies: is_placeholder, render: render_placeholder },
    DispatchRule {
        name: "bare-mermaid",
        applies: is_bare_mermaid_element,
        render: render_bare_mermaid,
    },
];

const DIAGRAM_LANGUAGES: &[&str] = &["mermaid", "reactflow", "flow", "chem", "equation"];

pub fn rule_names() -> impl Iterator<Item = &'static str> {
    RULES.iter().map(|rule| rule.name)
}

/// Renders `element` with the first applicable rule. `None` means default rendering.
pub fn dispatch(element: &Element<'_>, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    let rule = RULES.iter().find(|rule| (rule.applies)(element, ctx))?;
    tracing::trace!(rule = rule.name, "dispatching element");
    Some((rule.render)(element, ctx))
}

fn code_lang<'e>(element: &'e Element<'_>) -> Option<(&'e str, &'e str)> {
    match element {
        Element::CodeBlock { lang: Some(lang), content } => Some((lang.as_str(), content.as_str())),
        _ => None,
    }
}

fn is_graph_div(element: &Element<'_>, _ctx: &RenderContext<'_>) -> bool {
    matches!(element, Element::HtmlBlock { html } if graph_attribute(html).is_some())
}

fn render_graph_div(element: &Element<'_>, _ctx: &RenderContext<'_>) -> RenderNode {
    let Element::HtmlBlock { html } = element else {
        return RenderNode::error(DiagramError::new("reactflow", "expected an HTML block"));
    };
    match parse_graph_div(html) {
        Some(Ok(payload)) => RenderNode::Graph { payload },
        Some(Err(err)) => RenderNode::error(DiagramError::new("reactflow", err).with_source(html)),
        None => RenderNode::error(DiagramError::new("reactflow", "missing graph attribute")),
    }
}

fn is_flow_tagged_mermaid(element: &Element<'_>, _ctx: &RenderContext<'_>) -> bool {
    code_lang(element).is_some_and(|(lang, content)| lang == "flow" && is_mermaid_content(content))
}

fn render_code_as_mermaid(element: &Element<'_>, _ctx: &RenderContext<'_>) -> RenderNode {
    match element {
        Element::CodeBlock { content, .. } => mermaid_node(content),
        _ => RenderNode::error(DiagramError::new("mermaid", "expected a code block")),
    }
}

fn is_diagram_code_block(element: &Element<'_>, _ctx: &RenderContext<'_>) -> bool {
    code_lang(element).is_some_and(|(lang, _)| DIAGRAM_LANGUAGES.contains(&lang))
}

fn render_diagram_code_block(element: &Element<'_>, ctx: &RenderContext<'_>) -> RenderNode {
    let Some((lang, content)) = code_lang(element) else {
        return RenderNode::error(DiagramError::new("diagram", "expected a tagged code block"));
    };
    if parse_placeholder(content).is_some() {
        return resolve_placeholder(content, ctx);
    }
    match lang {
        "mermaid" => mermaid_node(content),
        "reactflow" => graph_node(content),
        "flow" => {
            let lines = parse_flow_lines(&content.lines().collect::<Vec<_>>());
            if lines.is_empty() {
                return RenderNode::error(
                    DiagramError::new("flow", "no flow steps found").with_source(content),
                );
            }
            RenderNode::FlowPipeline { lines }
        }
        "chem" => chemistry_node(ChemNotation::Chem, content),
        "equation" => chemistry_node(ChemNotation::Equation, content),
        other => RenderNode::error(DiagramError::new(other, "unsupported diagram language")),
    }
}

fn is_placeholder(element: &Element<'_>, _ctx: &RenderContext<'_>) -> bool {
    match element {
        Element::Paragraph { text } => parse_placeholder(text).is_some(),
        Element::InlineCode { code } => parse_placeholder(code).is_some(),
        Element::CodeBlock { lang: None, content } => parse_placeholder(content).is_some(),
        _ => false,
    }
}

fn render_placeholder(element: &Element<'_>, ctx: &RenderContext<'_>) -> RenderNode {
    match element {
        Element::Paragraph { text } => resolve_placeholder(text, ctx),
        Element::InlineCode { code } => resolve_placeholder(code, ctx),
        Element::CodeBlock { content, .. } => resolve_placeholder(content, ctx),
        Element::HtmlBlock { .. } => {
            RenderNode::error(DiagramError::new("diagram", "expected a placeholder"))
        }
    }
}

fn is_bare_mermaid_element(element: &Element<'_>, _ctx: &RenderContext<'_>) -> bool {
    match element {
        Element::Paragraph { text } => is_bare_mermaid(text),
        Element::CodeBlock { lang: None, content } => is_mermaid_content(content),
        _ => false,
    }
}

fn render_bare_mermaid(element: &Element<'_>, _ctx: &RenderContext<'_>) -> RenderNode {
    match element {
        Element::Paragraph { text } => mermaid_node(text),
        Element::CodeBlock { content, .. } => mermaid_node(content),
        _ => RenderNode::error(DiagramError::new("mermaid", "expected mermaid text")),
    }
}

fn resolve_placeholder(token: &str, ctx: &RenderContext<'_>) -> RenderNode {
    let block = parse_placeholder(token).map_or("diagram", |found| found.kind.as_str());
    match ctx.blocks().try_resolve(token) {
        Ok((DiagramKind::Mermaid, source)) => mermaid_node(source),
        Ok((DiagramKind::ReactFlow, json)) => graph_node(json),
        Err(err) => RenderNode::error(DiagramError::new(block, err).with_source(token.trim())),
    }
}

fn mermaid_node(source: &str) -> RenderNode {
    let source = source.trim();
    if source.is_empty() {
        return RenderNode::error(DiagramError::new("mermaid", "empty diagram"));
    }
    RenderNode::Mermaid { source: source.to_owned() }
}

fn graph_node(json: &str) -> RenderNode {
    match parse_graph_payload(json) {
        Ok(payload) => RenderNode::Graph { payload },
        Err(err) => RenderNode::error(DiagramError::new("reactflow", err).with_source(json.trim())),
    }
}

fn chemistry_node(notation: ChemNotation, source: &str) -> RenderNode {
    let source = source.trim();
    if source.is_empty() {
        let block = match notation {
            ChemNotation::Chem => "chem",
            ChemNotation::Equation => "equation",
        };
        return RenderNode::error(DiagramError::new(block, "empty block"));
    }
    RenderNode::Chemistry { notation, source: source.to_owned() }
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_GFM
}

/// Accumulates default-rendered events and the nodes produced so far.
struct Output<'a> {
    nodes: Vec<RenderNode>,
    pending: Vec<Event<'a>>,
}

impl<'a> Output<'a> {
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let mut out = String::new();
        html::push_html(&mut out, self.pending.drain(..));
        if !out.trim().is_empty() {
            self.nodes.push(RenderNode::Html { html: out });
        }
    }

    fn push_node(&mut self, node: RenderNode) {
        self.flush();
        self.nodes.push(node);
    }
}

/// Index of the event closing the element opened at `start`.
fn closing_index(events: &[(Event<'_>, Range<usize>)], start: usize) -> usize {
    let mut depth = 0usize;
    for (idx, (event, _)) in events.iter().enumerate().skip(start) {
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return idx;
                }
            }
            _ => {}
        }
    }
    events.len() - 1
}

fn text_of(events: &[(Event<'_>, Range<usize>)]) -> String {
    let mut text = String::new();
    for (event, _) in events {
        match event {
            Event::Text(chunk)
            | Event::Html(chunk)
            | Event::InlineHtml(chunk)
            | Event::Code(chunk) => text.push_str(chunk),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            _ => {}
        }
    }
    text
}

fn code_block_lang(kind: &CodeBlockKind<'_>) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => {
            info.split_whitespace().next().map(|lang| lang.to_ascii_lowercase())
        }
        CodeBlockKind::Indented => None,
    }
}

/// Renders markdown to nodes, intercepting diagram-bearing elements at any depth.
///
/// An element claimed inside a list item or blockquote splits the surrounding HTML: the
/// container's opening tags end one `Html` node and its closing tags start the next.
pub fn render_markdown(markdown: &str, ctx: &RenderContext<'_>) -> Vec<RenderNode> {
    let events =
        Parser::new_ext(markdown, markdown_options()).into_offset_iter().collect::<Vec<_>>();
    let mut out = Output { nodes: Vec::new(), pending: Vec::new() };
    let mut depth = 0usize;
    let mut idx = 0;

    while idx < events.len() {
        let (event, range) = &events[idx];
        let intercepted = match event {
            Event::Start(Tag::Paragraph) => {
                let end = closing_index(&events, idx);
                let inner = &events[idx + 1..end];
                // Nested source carries container markers (`> `, list indent); use parsed text.
                let nested;
                let text = if depth == 0 {
                    markdown[range.clone()].trim()
                } else {
                    nested = text_of(inner);
                    nested.trim()
                };
                match dispatch(&Element::Paragraph { text }, ctx) {
                    Some(node) => out.push_node(node),
                    None => push_paragraph(inner, ctx, &mut out),
                }
                Some(end)
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                let end = closing_index(&events, idx);
                let element = Element::CodeBlock {
                    lang: code_block_lang(kind),
                    content: text_of(&events[idx + 1..end]),
                };
                dispatch(&element, ctx).map(|node| {
                    out.push_node(node);
                    end
                })
            }
            Event::Start(Tag::HtmlBlock) => {
                let end = closing_index(&events, idx);
                let element = Element::HtmlBlock { html: text_of(&events[idx + 1..end]) };
                dispatch(&element, ctx).map(|node| {
                    out.push_node(node);
                    end
                })
            }
            _ => None,
        };
        if let Some(end) = intercepted {
            idx = end + 1;
            continue;
        }

        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        out.pending.push(event.clone());
        idx += 1;
    }

    out.flush();
    out.nodes
}

/// Default paragraph rendering, split around inline-code placeholders.
fn push_paragraph<'a>(
    inner: &[(Event<'a>, Range<usize>)],
    ctx: &RenderContext<'_>,
    out: &mut Output<'a>,
) {
    let mut open = false;
    for (event, _) in inner {
        if let Event::Code(code) = event {
            if let Some(node) = dispatch_inline_code(code, ctx) {
                if open {
                    out.pending.push(Event::End(TagEnd::Paragraph));
                    open = false;
                }
                out.push_node(node);
                continue;
            }
        }
        if !open {
            out.pending.push(Event::Start(Tag::Paragraph));
            open = true;
        }
        out.pending.push(event.clone());
    }
    if open {
        out.pending.push(Event::End(TagEnd::Paragraph));
    }
}

fn dispatch_inline_code(code: &str, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    dispatch(&Element::InlineCode { code }, ctx)
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use rstest::rstest;

    use super::{dispatch, render_markdown, rule_names, Element};
    use crate::config::PipelineConfig;
    use crate::extract::BlockTables;
    use crate::render::{ChemNotation, RenderContext, RenderNode};

    const GRAPH: &str = r#"{"nodes":[{"id":"a","label":"A"},{"id":"b","label":"B"}],"edges":[{"source":"a","target":"b"}]}"#;

    fn tables() -> BlockTables {
        BlockTables::new(vec!["flowchart TD\nA-->B".to_owned()], vec![GRAPH.to_owned()])
    }

    fn render(markdown: &str) -> Vec<RenderNode> {
        let blocks = tables();
        let config = PipelineConfig::default();
        render_markdown(markdown, &RenderContext::new(&blocks, &config))
    }

    fn code(lang: Option<&str>, content: &str) -> Element<'static> {
        Element::CodeBlock { lang: lang.map(str::to_owned), content: content.to_owned() }
    }

    #[test]
    fn rule_order_is_fixed() {
        assert_eq!(
            rule_names().collect::<Vec<_>>(),
            vec!["graph-div", "flow-tagged-mermaid", "diagram-code-block", "placeholder", "bare-mermaid"]
        );
    }

    #[test]
    fn flow_tagged_mermaid_is_redirected() {
        let blocks = tables();
        let config = PipelineConfig::default();
        let ctx = RenderContext::new(&blocks, &config);
        let node = dispatch(&code(Some("flow"), "flowchart TD\nA-->B\n"), &ctx);
        assert_eq!(node, Some(RenderNode::Mermaid { source: "flowchart TD\nA-->B".to_owned() }));

        let node = dispatch(&code(Some("flow"), "[A] → [B] → [C]\n"), &ctx);
        assert!(matches!(node, Some(RenderNode::FlowPipeline { lines }) if lines.len() == 1));
    }

    #[rstest]
    #[case(Some("chem"), "\\ce{CaCO3 -> CaO + CO2}", ChemNotation::Chem)]
    #[case(Some("equation"), "E = mc^2", ChemNotation::Equation)]
    fn chemistry_blocks(#[case] lang: Option<&str>, #[case] source: &str, #[case] notation: ChemNotation) {
        let blocks = BlockTables::default();
        let config = PipelineConfig::default();
        let node = dispatch(&code(lang, source), &RenderContext::new(&blocks, &config));
        assert_eq!(node, Some(RenderNode::Chemistry { notation, source: source.to_owned() }));
    }

    #[test]
    fn untagged_and_unknown_code_blocks_render_by_default() {
        let blocks = BlockTables::default();
        let config = PipelineConfig::default();
        let ctx = RenderContext::new(&blocks, &config);
        assert_eq!(dispatch(&code(Some("rust"), "fn main() {}"), &ctx), None);
        assert_eq!(dispatch(&code(None, "ls -la"), &ctx), None);
    }

    #[test]
    fn invalid_reactflow_block_becomes_error() {
        let nodes = render("```reactflow\n{\"nodes\": 1}\n```");
        match nodes.as_slice() {
            [RenderNode::Error(error)] => {
                assert_eq!(error.block, "reactflow");
                assert!(error.message.contains("nodes"));
                assert_eq!(error.source.as_deref(), Some("{\"nodes\": 1}"));
            }
            other => panic!("unexpected nodes: {other:?}"),
        }
    }

    #[test]
    fn placeholders_resolve_in_paragraphs_and_inline_code() {
        let nodes = render("Antes.\n\n:::reactflow-placeholder-0:::\n\nTexto `:::mermaid-placeholder-0:::` fin.");
        assert_eq!(nodes.len(), 5);
        assert!(matches!(&nodes[0], RenderNode::Html { html } if html.contains("Antes.")));
        assert!(matches!(&nodes[1], RenderNode::Graph { payload } if payload.nodes.len() == 2));
        assert!(matches!(&nodes[2], RenderNode::Html { html } if html == "<p>Texto </p>\n"));
        assert!(matches!(&nodes[3], RenderNode::Mermaid { .. }));
        assert!(matches!(&nodes[4], RenderNode::Html { html } if html == "<p> fin.</p>\n"));
    }

    #[test]
    fn unresolvable_placeholder_renders_visible_error() {
        let nodes = render("Intro\n\n:::reactflow-placeholder-5:::\n\nOutro");
        assert_eq!(nodes.len(), 3);
        match &nodes[1] {
            RenderNode::Error(error) => {
                assert_eq!(error.block, "reactflow");
                assert!(error.message.contains("out of range"));
            }
            other => panic!("unexpected node: {other:?}"),
        }
        assert!(matches!(&nodes[2], RenderNode::Html { html } if html.contains("Outro")));
    }

    #[test]
    fn bare_mermaid_paragraph_is_rendered() {
        let nodes = render("graph TD\nA[Pozo] --> B[Tanque]");
        assert_eq!(
            nodes,
            vec![RenderNode::Mermaid { source: "graph TD\nA[Pozo] --> B[Tanque]".to_owned() }]
        );
    }

    #[test]
    fn graph_div_is_decoded() {
        let markdown = format!("<div data-reactflow=\"{}\"></div>\n\nDone.", STANDARD.encode(GRAPH));
        let nodes = render(&markdown);
        assert!(matches!(&nodes[0], RenderNode::Graph { payload } if payload.edges.len() == 1));
        assert!(matches!(&nodes[1], RenderNode::Html { html } if html.contains("Done.")));

        let broken = render("<div data-reactflow=\"e30=\"></div>");
        assert!(matches!(broken.as_slice(), [RenderNode::Error(error)] if error.block == "reactflow"));
    }

    fn html_of(nodes: &[RenderNode]) -> String {
        nodes
            .iter()
            .map(|node| match node {
                RenderNode::Html { html } => html.as_str(),
                _ => "",
            })
            .collect()
    }

    #[test]
    fn nested_diagram_fences_are_intercepted() {
        let nodes = render("1. Tren propuesto:\n\n   ```flow\n   [Pozo] → [UF] → [RO]\n   ```\n2. Siguiente paso");
        assert_eq!(nodes.len(), 3, "{nodes:#?}");
        assert!(matches!(&nodes[0], RenderNode::Html { html } if html.contains("<ol>")));
        assert!(matches!(&nodes[1], RenderNode::FlowPipeline { lines } if lines[0].steps().len() == 3));
        assert!(matches!(&nodes[2], RenderNode::Html { html } if html.contains("Siguiente paso")));
        assert!(html_of(&nodes).contains("</ol>"));

        let nodes = render("> ```chem\n> \\ce{CaCO3 -> CaO + CO2}\n> ```");
        assert!(nodes.iter().any(|node| matches!(
            node,
            RenderNode::Chemistry { notation: ChemNotation::Chem, source } if source == "\\ce{CaCO3 -> CaO + CO2}"
        )));
    }

    #[test]
    fn nested_flow_fence_with_mermaid_is_redirected() {
        let nodes = render("- Diagrama:\n\n  ```flow\n  flowchart TD\n  A-->B\n  ```");
        assert!(nodes
            .iter()
            .any(|n| matches!(n, RenderNode::Mermaid { source } if source == "flowchart TD\nA-->B")));
        assert!(!html_of(&nodes).contains("language-flow"));
    }

    #[test]
    fn nested_placeholder_paragraph_resolves() {
        let nodes = render("- item\n\n  :::mermaid-placeholder-0:::\n\n| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(nodes.iter().any(|node| matches!(node, RenderNode::Mermaid { .. })));
        assert!(html_of(&nodes).contains("<table>"));
    }

    #[test]
    fn genuine_flow_fence_is_not_taken_for_mermaid() {
        let nodes = render("```flow\nBlock A → Block B → Drain\n```");
        assert!(matches!(nodes.as_slice(), [RenderNode::FlowPipeline { lines }] if lines[0].steps().len() == 3));
    }
}
