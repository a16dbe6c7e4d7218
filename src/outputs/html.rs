//! Interactive HTML report (Bootstrap 5 from the jsDelivr CDN).
//!
//! Every piece of article or model text is escaped with `html-escape` before
//! it is interpolated; the only markup that survives from model text is what
//! [`markdown_to_html`] produces itself.

use html_escape::{encode_double_quoted_attribute as attr, encode_text};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{FieldValue, Report};

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"));
static ORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+[.)]\s+(.*)$").expect("valid regex"));
static BULLET_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[*•-]\s+(.*)$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Ordered,
    Bullet,
    Text,
    Blank,
}

fn classify(line: &str) -> (LineKind, &str) {
    if line.trim().is_empty() {
        return (LineKind::Blank, "");
    }
    if let Some(c) = ORDERED_ITEM.captures(line).and_then(|c| c.get(1)) {
        return (LineKind::Ordered, c.as_str());
    }
    if let Some(c) = BULLET_ITEM.captures(line).and_then(|c| c.get(1)) {
        return (LineKind::Bullet, c.as_str());
    }
    (LineKind::Text, line.trim())
}

/// Escape one line and turn `**bold**` into `<strong>`.
fn inline(text: &str) -> String {
    BOLD.replace_all(&encode_text(text), "<strong>$1</strong>")
        .into_owned()
}

/// Minimal Markdown to HTML: bold, numbered lists, bullet lists, paragraphs.
///
/// Consecutive plain lines form one paragraph; blank lines end it.
pub fn markdown_to_html(text: &str) -> String {
    let mut blocks = Vec::new();
    for (kind, group) in &text.lines().map(classify).chunk_by(|(kind, _)| *kind) {
        let items: Vec<String> = group.map(|(_, line)| inline(line)).collect();
        match kind {
            LineKind::Ordered => blocks.push(format!(
                "<ol>\n{}\n</ol>",
                items.iter().map(|i| format!("<li>{i}</li>")).join("\n")
            )),
            LineKind::Bullet => blocks.push(format!(
                "<ul>\n{}\n</ul>",
                items.iter().map(|i| format!("<li>{i}</li>")).join("\n")
            )),
            LineKind::Text => blocks.push(format!("<p>{}</p>", items.join("\n"))),
            LineKind::Blank => {}
        }
    }
    blocks.join("\n")
}

fn muted(note: &str) -> String {
    format!(r#"<p class="text-muted">{}</p>"#, encode_text(note))
}

/// Prose fields: text through the converter, lists joined into a paragraph.
fn prose(value: &FieldValue, empty_note: &str) -> String {
    if value.is_empty() {
        return muted(empty_note);
    }
    match value {
        FieldValue::PlainText(text) => markdown_to_html(text),
        FieldValue::BulletList(_) => format!("<p>{}</p>", inline(&value.joined())),
    }
}

/// List fields: one `<li class=item_class>` per entry, text through the converter.
fn list(value: &FieldValue, ul_class: &str, item_class: &str, empty_note: &str) -> String {
    if value.is_empty() {
        return muted(empty_note);
    }
    match value {
        FieldValue::BulletList(items) => format!(
            "<ul class=\"{}\">\n{}\n</ul>",
            attr(ul_class),
            items
                .iter()
                .map(|i| format!("<li class=\"{}\">{}</li>", attr(item_class), inline(i)))
                .join("\n")
        ),
        FieldValue::PlainText(text) => markdown_to_html(text),
    }
}

fn card(html: &mut String, title: &str, body: &str) {
    html.push_str(&format!(
        r#"
<div class="card mb-4">
  <div class="card-header bg-light"><h3 class="mb-0">{}</h3></div>
  <div class="card-body">
{}
  </div>
</div>
"#,
        encode_text(title),
        body
    ));
}

fn headline_body(report: &Report) -> String {
    let headline = &report.headline;
    let score = headline.score.score.min(100);
    let mut body = String::new();
    if let Some(commentary) = &headline.commentary {
        body.push_str(&markdown_to_html(commentary));
        body.push('\n');
    }
    body.push_str(&format!(
        r#"<div class="d-flex align-items-center my-3">
  <strong class="me-2">Sensationalism Score:</strong>
  <div class="progress flex-grow-1" style="height: 20px;">
    <div class="progress-bar bg-warning" role="progressbar" style="width: {score}%;" aria-valuenow="{score}" aria-valuemin="0" aria-valuemax="100">{score}/100</div>
  </div>
</div>"#
    ));
    if !headline.score.indicators.is_empty() {
        body.push_str(&format!(
            "\n<strong>Clickbait Indicators:</strong>\n<ul class=\"list-group mt-2\">\n{}\n</ul>",
            headline
                .score
                .indicators
                .iter()
                .map(|i| format!("<li class=\"list-group-item\">{}</li>", encode_text(i)))
                .join("\n")
        ));
    }
    body
}

fn entities_body(value: &FieldValue) -> String {
    match value {
        FieldValue::BulletList(items) if !items.is_empty() => format!(
            r#"<div class="row">
  <div class="col-md-8">
    <ul class="list-group" id="entity-list">
{}
    </ul>
  </div>
  <div class="col-md-4">
    <div class="card">
      <div class="card-header">Entity Information</div>
      <div class="card-body" id="entity-info"><p class="text-muted">Click on an entity to see research suggestions</p></div>
    </div>
  </div>
</div>"#,
            items
                .iter()
                .map(|e| format!(
                    "      <li class=\"list-group-item entity\" data-entity=\"{}\">{}</li>",
                    attr(e),
                    encode_text(e)
                ))
                .join("\n")
        ),
        other => list(other, "", "", "No key entities identified."),
    }
}

fn questions_body(value: &FieldValue) -> String {
    match value {
        FieldValue::BulletList(items) if !items.is_empty() => {
            let entries = items
                .iter()
                .enumerate()
                .map(|(i, q)| {
                    let n = i + 1;
                    format!(
                        r##"<div class="accordion-item">
  <h2 class="accordion-header" id="question-heading-{n}">
    <button class="accordion-button collapsed" type="button" data-bs-toggle="collapse" data-bs-target="#question-collapse-{n}" aria-expanded="false" aria-controls="question-collapse-{n}">{n}. {q}</button>
  </h2>
  <div id="question-collapse-{n}" class="accordion-collapse collapse" aria-labelledby="question-heading-{n}" data-bs-parent="#verificationQuestions">
    <div class="accordion-body">
      <p>To answer this question, you might want to:</p>
      <ul>
        <li>Check reliable sources like academic papers or official statistics</li>
        <li>Look for primary sources mentioned in the article</li>
        <li>Search for alternative perspectives from other experts</li>
      </ul>
    </div>
  </div>
</div>"##,
                        q = inline(q)
                    )
                })
                .join("\n");
            format!("<div class=\"accordion\" id=\"verificationQuestions\">\n{entries}\n</div>")
        }
        other => list(other, "", "", "No verification questions generated."),
    }
}

fn comparison_body(report: &Report) -> Option<String> {
    let comparison = report.comparison.as_ref()?;
    let mut body = markdown_to_html(&comparison.perspective_analysis);
    if !comparison.related_articles.is_empty() {
        body.push_str(&format!(
            "\n<h5 class=\"mt-3\">Related Articles Analyzed</h5>\n<ul class=\"list-group\">\n{}\n</ul>",
            comparison
                .related_articles
                .iter()
                .map(|r| format!(
                    "<li class=\"list-group-item\"><a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a> <span class=\"text-muted\">({})</span></li>",
                    attr(&r.url),
                    encode_text(&r.title),
                    encode_text(&r.source)
                ))
                .join("\n")
        ));
    }
    Some(body)
}

const STYLE: &str = r#"
    .entity { cursor: pointer; text-decoration: underline; color: #0d6efd; }
    .red-flag { background-color: #ffebee; border-left: 3px solid #f44336; padding-left: 15px; margin: 5px 0; }
    .counter-argument { background-color: #e8f5e9; border-left: 3px solid #4caf50; padding: 15px; margin-top: 10px; }
"#;

const SCRIPT: &str = r#"
    document.querySelectorAll('.entity').forEach(function (entity) {
      entity.addEventListener('click', function () {
        document.querySelectorAll('.entity').forEach(function (e) { e.classList.remove('active'); });
        this.classList.add('active');
        var text = this.getAttribute('data-entity');
        var name = text.split(/[-:]/)[0].trim();
        var info = document.getElementById('entity-info');
        info.replaceChildren();
        var h = document.createElement('h5');
        h.textContent = name;
        var p = document.createElement('p');
        p.textContent = text;
        var sub = document.createElement('h6');
        sub.textContent = 'Research Suggestions:';
        var ul = document.createElement('ul');
        ['Search for "' + name + '" in reliable news sources',
         'Look for "' + name + '" background and affiliations',
         'Check for potential conflicts of interest'].forEach(function (s) {
          var li = document.createElement('li');
          li.textContent = s;
          ul.appendChild(li);
        });
        info.append(h, p, sub, ul);
      });
    });
    var toggle = document.getElementById('toggle-counter');
    toggle.addEventListener('click', function () {
      var c = document.getElementById('counter-argument-content');
      var hidden = c.style.display === 'none';
      c.style.display = hidden ? 'block' : 'none';
      this.textContent = hidden ? 'Hide' : 'Show';
    });
"#;

/// Render the full report as a standalone HTML page.
pub fn render_html(report: &Report) -> String {
    let article = &report.article;
    let analysis = &report.analysis;

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Analysis: {title}</title>
  <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css" rel="stylesheet">
  <style>{STYLE}</style>
</head>
<body>
<div class="container mt-4 mb-5">
<div class="card shadow">
<div class="card-header bg-primary text-white">
  <h2>{title}</h2>
  <p class="mb-0">Source: <a href="{href}" class="text-white" target="_blank" rel="noopener">{url}</a></p>
</div>
<div class="card-body">
"#,
        title = encode_text(&article.title),
        href = attr(&article.url),
        url = encode_text(&article.url),
    );

    if article.author.is_some() || article.date.is_some() {
        html.push_str("<div class=\"row mb-4\">\n");
        if let Some(author) = &article.author {
            html.push_str(&format!(
                "  <div class=\"col\"><strong>Author:</strong> {}</div>\n",
                encode_text(author)
            ));
        }
        if let Some(date) = &article.date {
            html.push_str(&format!(
                "  <div class=\"col\"><strong>Date:</strong> {}</div>\n",
                encode_text(date)
            ));
        }
        html.push_str("</div>\n");
    }

    card(&mut html, "Headline Analysis", &headline_body(report));
    card(
        &mut html,
        "Core Claims",
        &list(
            &analysis.core_claims,
            "list-group list-group-flush",
            "list-group-item",
            "No core claims identified.",
        ),
    );
    card(
        &mut html,
        "Language & Tone Analysis",
        &prose(&analysis.language_tone, "No language analysis available."),
    );
    card(
        &mut html,
        "Potential Red Flags",
        &list(&analysis.red_flags, "list-unstyled", "red-flag mb-2", "No red flags identified."),
    );
    card(
        &mut html,
        "Key Entities to Investigate",
        &entities_body(&analysis.key_entities),
    );
    card(
        &mut html,
        "Verification Questions",
        &questions_body(&analysis.verification_questions),
    );

    html.push_str(&format!(
        r#"
<div class="card mb-4">
  <div class="card-header bg-light d-flex justify-content-between align-items-center">
    <h3 class="mb-0">Counter-Argument Perspective</h3>
    <button class="btn btn-sm btn-outline-primary" id="toggle-counter">Hide</button>
  </div>
  <div class="card-body">
    <div class="counter-argument" id="counter-argument-content">
{}
    </div>
  </div>
</div>
"#,
        prose(
            &analysis.counter_argument,
            "No counter-argument perspective generated."
        )
    ));

    let credibility = &report.credibility;
    card(
        &mut html,
        "Source Credibility Factors",
        &format!(
            "<p><strong>Domain:</strong> {}</p>\n<ul class=\"list-group list-group-flush\">\n{}\n</ul>",
            encode_text(&credibility.domain),
            credibility
                .factors
                .iter()
                .map(|f| format!("<li class=\"list-group-item\">{}</li>", encode_text(f)))
                .join("\n")
        ),
    );

    if let Some(body) = comparison_body(report) {
        card(&mut html, "Comparative Analysis", &body);
    }

    html.push_str(&format!(
        r#"</div>
<div class="card-footer text-center text-muted">
  Generated by Digital Skeptic on {generated} ({source})
</div>
</div>
</div>
<script src="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/js/bootstrap.bundle.min.js"></script>
<script>{SCRIPT}</script>
</body>
</html>
"#,
        generated = encode_text(&report.generated_at),
        source = encode_text(&report.analysis_source.describe()),
    ));
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::sample_report;

    #[test]
    fn test_markdown_to_html_blocks() {
        let html = markdown_to_html("Intro with **bold** text\n\n1. First\n2. Second\n\n* One\n- Two\nClosing");
        assert_eq!(
            html,
            "<p>Intro with <strong>bold</strong> text</p>\n\
             <ol>\n<li>First</li>\n<li>Second</li>\n</ol>\n\
             <ul>\n<li>One</li>\n<li>Two</li>\n</ul>\n\
             <p>Closing</p>"
        );
    }

    #[test]
    fn test_markdown_to_html_escapes() {
        assert_eq!(
            markdown_to_html("<b>x</b> & **y**"),
            "<p>&lt;b&gt;x&lt;/b&gt; &amp; <strong>y</strong></p>"
        );
        assert_eq!(markdown_to_html(""), "");
    }

    #[test]
    fn test_render_html_escapes_article_text() {
        let mut report = sample_report();
        report.article.title = "<script>alert(1)</script>".to_string();
        report.article.url = "https://example.com/?a=1&b=\"2\"".to_string();
        let html = render_html(&report);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("href=\"https://example.com/?a=1&amp;b=&quot;2&quot;\""));
    }

    #[test]
    fn test_render_html_sections() {
        let html = render_html(&sample_report());
        assert!(html.contains("style=\"width: 15%;\""));
        assert!(html.contains("id=\"question-collapse-2\""));
        assert!(html.contains("data-entity=\"City Council\""));
        assert!(html.contains("<li class=\"red-flag mb-2\">Single source</li>"));
        assert!(html.contains("<strong>Author:</strong> Jane Reporter"));
        assert!(!html.contains("<strong>Date:</strong>"));
        assert!(html.contains("Related Articles Analyzed"));
        assert!(html.contains("id=\"toggle-counter\""));
    }
}
