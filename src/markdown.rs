//! Lesson → Markdown.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::lesson::Lesson;

/// Render a lesson as a Markdown document. Empty lists produce no
/// section at all; the `## Lesson` heading is always present.
pub fn render_markdown(title: &str, lesson: &Lesson) -> String {
    let mut out = format!("# {title}\n\n");

    if !lesson.meta.question.is_empty() {
        out.push_str(&format!("> **User Question:** {}\n\n", lesson.meta.question));
    }

    push_bullets(&mut out, "Objectives", &lesson.objectives);

    out.push_str("## Lesson\n");
    out.push_str(&lesson.content);
    out.push_str("\n\n");

    push_bullets(&mut out, "Key Takeaways", &lesson.key_takeaways);

    if !lesson.references.is_empty() {
        out.push_str("## References\n");
        let links: Vec<String> = lesson
            .references
            .iter()
            .map(|r| {
                let text = if r.label.is_empty() { &r.url } else { &r.label };
                let href = if r.url.is_empty() { "#" } else { &r.url };
                format!("- [{text}]({href})")
            })
            .collect();
        out.push_str(&links.join("\n"));
        out.push('\n');
    }

    out
}

fn push_bullets(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("## {heading}\n"));
    let bullets: Vec<String> = items.iter().map(|item| format!("- {item}")).collect();
    out.push_str(&bullets.join("\n"));
    out.push_str("\n\n");
}

/// A `data:` URL carrying the document, base64 encoded.
pub fn markdown_data_url(markdown: &str) -> String {
    format!("data:text/markdown;base64,{}", STANDARD.encode(markdown.as_bytes()))
}

/// File name for a Markdown download: runs of characters outside
/// `[A-Za-z0-9_-]` collapse to `_`, capped at 64 characters.
pub fn export_file_name(title: &str) -> String {
    let mut safe = String::with_capacity(title.len());
    let mut in_run = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            safe.push(c);
            in_run = false;
        } else if !in_run {
            safe.push('_');
            in_run = true;
        }
    }
    let safe: String = safe.chars().take(64).collect();
    if safe.is_empty() {
        "lesson.md".to_string()
    } else {
        format!("{safe}.md")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::{LessonMeta, Reference};

    fn full_lesson() -> Lesson {
        Lesson {
            title: "ignored".to_string(),
            objectives: vec!["Obj one".to_string(), "Obj two".to_string()],
            content: "The body.".to_string(),
            key_takeaways: vec!["Take one".to_string(), "Take two".to_string()],
            references: vec![
                Reference {
                    label: "Primer".to_string(),
                    url: "https://example.com/primer".to_string(),
                },
                Reference {
                    label: String::new(),
                    url: "https://example.com/bare".to_string(),
                },
                Reference {
                    label: "No link".to_string(),
                    url: String::new(),
                },
            ],
            meta: LessonMeta {
                question: "How?".to_string(),
            },
        }
    }

    #[test]
    fn full_lesson_renders_every_section_in_order() {
        let md = render_markdown("My Title", &full_lesson());
        let order = [
            "# My Title",
            "> **User Question:** How?",
            "## Objectives",
            "## Lesson",
            "## Key Takeaways",
            "## References",
        ];
        let mut last = 0;
        for marker in order {
            let pos = md.find(marker).unwrap_or_else(|| panic!("missing {marker}"));
            assert!(pos >= last, "{marker} out of order");
            last = pos;
        }
    }

    #[test]
    fn exact_layout() {
        let md = render_markdown("T", &full_lesson());
        let expected = "# T\n\n\
            > **User Question:** How?\n\n\
            ## Objectives\n- Obj one\n- Obj two\n\n\
            ## Lesson\nThe body.\n\n\
            ## Key Takeaways\n- Take one\n- Take two\n\n\
            ## References\n\
            - [Primer](https://example.com/primer)\n\
            - [https://example.com/bare](https://example.com/bare)\n\
            - [No link](#)\n";
        assert_eq!(md, expected);
    }

    #[test]
    fn one_link_per_reference() {
        let md = render_markdown("T", &full_lesson());
        let links = md.lines().filter(|l| l.starts_with("- [")).count();
        assert_eq!(links, 3);
    }

    #[test]
    fn empty_lesson_has_only_title_and_lesson_heading() {
        let md = render_markdown("Lesson", &Lesson::default());
        assert_eq!(md, "# Lesson\n\n## Lesson\n\n\n");
        assert!(!md.contains("## Objectives"));
        assert!(!md.contains("## Key Takeaways"));
        assert!(!md.contains("## References"));
        assert!(!md.contains("User Question"));
    }

    #[test]
    fn data_url_round_trips() {
        let url = markdown_data_url("# Hi\n");
        let b64 = url.strip_prefix("data:text/markdown;base64,").unwrap();
        let decoded = STANDARD.decode(b64).unwrap();
        assert_eq!(decoded, b"# Hi\n");
    }

    #[test]
    fn file_name_sanitized() {
        assert_eq!(export_file_name("My Lesson: Part 1!"), "My_Lesson_Part_1_.md");
        assert_eq!(export_file_name("already-safe_name"), "already-safe_name.md");
        assert_eq!(export_file_name(""), "lesson.md");
    }

    #[test]
    fn file_name_capped() {
        let name = export_file_name(&"a".repeat(200));
        assert_eq!(name.len(), 64 + ".md".len());
    }
}
