//! Markdown helpers shared by plan and RCA artifacts.
//!
//! Artifacts are plain Markdown with a YAML front-matter header. The body is
//! free-form prose written by an agent, so parsing here is deliberately
//! forgiving: a section that cannot be found yields nothing rather than an
//! error.

use crate::error::Result;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

const FENCE: &str = "---";

/// Render `meta` as a YAML front-matter block followed by `body`.
pub fn render_with_front_matter<T: Serialize>(meta: &T, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(meta)?;
    let mut out = String::with_capacity(yaml.len() + body.len() + 16);
    out.push_str(FENCE);
    out.push('\n');
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(FENCE);
    out.push_str("\n\n");
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Split a document into `(front_matter_yaml, body)`.
///
/// Returns `None` when the document does not open with a `---` fence or the
/// closing fence is missing.
pub fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let rest = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))?;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let yaml = &rest[..offset];
            let body = rest[offset + line.len()..].trim_start_matches(['\r', '\n']);
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

fn heading_level(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_end();
    let hashes = trimmed.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let title = trimmed[hashes..].strip_prefix(' ')?;
    Some((hashes, title.trim()))
}

/// Body text of the first heading whose title equals `title` (case-insensitive),
/// up to the next heading of the same or higher level.
pub fn section(body: &str, title: &str) -> Option<String> {
    let mut lines = body.lines();
    let level = loop {
        let line = lines.next()?;
        if let Some((level, heading)) = heading_level(line) {
            if heading.eq_ignore_ascii_case(title) {
                break level;
            }
        }
    };

    let mut out = Vec::new();
    let mut in_fence = false;
    for line in lines {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }
        if !in_fence {
            if let Some((next_level, _)) = heading_level(line) {
                if next_level <= level {
                    break;
                }
            }
        }
        out.push(line);
    }
    Some(out.join("\n").trim().to_string())
}

static NUMBERED_RE: OnceLock<Regex> = OnceLock::new();
static TASK_HEADING_RE: OnceLock<Regex> = OnceLock::new();
static CHECKBOX_RE: OnceLock<Regex> = OnceLock::new();

fn numbered_re() -> &'static Regex {
    NUMBERED_RE.get_or_init(|| Regex::new(r"^\d+[.)]\s+(.+)$").expect("static regex"))
}

fn task_heading_re() -> &'static Regex {
    TASK_HEADING_RE.get_or_init(|| {
        Regex::new(r"^#{3,4}\s+(?:(?i:task)\s+)?\d+[.:)]?\s+(.+)$").expect("static regex")
    })
}

fn checkbox_re() -> &'static Regex {
    CHECKBOX_RE.get_or_init(|| Regex::new(r"^[-*]\s+\[[ xX]\]\s+(.+)$").expect("static regex"))
}

/// Ordered top-level items of a section: numbered lines, numbered `###`
/// headings, or checkbox bullets. Indented detail lines are skipped.
pub fn ordered_items(section: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut in_fence = false;
    for line in section.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence || line.starts_with(' ') || line.starts_with('\t') {
            continue;
        }
        let caps = numbered_re()
            .captures(line)
            .or_else(|| task_heading_re().captures(line))
            .or_else(|| checkbox_re().captures(line));
        if let Some(caps) = caps {
            items.push(caps[1].trim().to_string());
        }
    }
    items
}

/// Shell commands listed in a section, either as lines of fenced code blocks
/// or as bullets wrapping a single inline code span.
pub fn commands(section: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut in_fence = false;
    for line in section.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                out.push(trimmed.to_string());
            }
            continue;
        }
        let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        else {
            continue;
        };
        let item = item.trim();
        if let Some(cmd) = item.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
            if !cmd.is_empty() && !cmd.contains('`') {
                out.push(cmd.to_string());
            }
        }
    }
    out
}

/// Render a fenced `bash` block, or `placeholder` when `cmds` is empty.
pub fn code_block(cmds: &[String], placeholder: &str) -> String {
    if cmds.is_empty() {
        return format!("_{placeholder}_\n");
    }
    let mut out = String::from("```bash\n");
    for c in cmds {
        out.push_str(c);
        out.push('\n');
    }
    out.push_str("```\n");
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "---\nfeature: auth\n---\n\n# Plan\n\n## Step-by-Step Tasks\n\n### Task 1: Add model\n\n  details here\n\n### 2. Wire routes\n\n## Validation Commands\n\n```bash\n# lint first\ncargo clippy\ncargo test\n```\n\n- `npm run lint`\n- not a command\n";

    #[test]
    fn front_matter_split() {
        let (yaml, body) = split_front_matter(DOC).unwrap();
        assert_eq!(yaml, "feature: auth\n");
        assert!(body.starts_with("# Plan"));
        assert!(split_front_matter("# no header").is_none());
        assert!(split_front_matter("---\nunterminated: true\n").is_none());
    }

    #[test]
    fn front_matter_render_parses_back() {
        #[derive(Serialize)]
        struct Meta {
            issue: u64,
        }
        let doc = render_with_front_matter(&Meta { issue: 3 }, "# Body").unwrap();
        let (yaml, body) = split_front_matter(&doc).unwrap();
        assert_eq!(yaml.trim(), "issue: 3");
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn section_stops_at_sibling_heading() {
        let tasks = section(DOC, "step-by-step tasks").unwrap();
        assert!(tasks.contains("Add model"));
        assert!(!tasks.contains("cargo test"));
        assert!(section(DOC, "Missing").is_none());
    }

    #[test]
    fn ordered_items_from_headings_and_lists() {
        let tasks = section(DOC, "Step-by-Step Tasks").unwrap();
        assert_eq!(ordered_items(&tasks), vec!["Add model", "Wire routes"]);

        let list = "1. First\n   - nested\n2) Second\n- [x] Third\n- plain bullet";
        assert_eq!(ordered_items(list), vec!["First", "Second", "Third"]);
    }

    #[test]
    fn commands_from_fences_and_inline_code() {
        let validation = section(DOC, "Validation Commands").unwrap();
        assert_eq!(
            commands(&validation),
            vec!["cargo clippy", "cargo test", "npm run lint"]
        );
    }

    #[test]
    fn placeholders_render_in_italics() {
        assert_eq!(code_block(&[], "none yet"), "_none yet_\n");
        assert_eq!(
            code_block(&["make test".to_string()], "x"),
            "```bash\nmake test\n```\n"
        );
    }
}
