//! Slash-command templates installed into `.claude/commands/` by `handoff init`
//! and printed by `handoff prompt`.

use handoff_core::types::Step;

/// Placeholder the agent host replaces with the command's arguments.
pub const ARGUMENTS: &str = "$ARGUMENTS";

pub fn filename(step: Step) -> String {
    format!("{}.md", step.as_str())
}

pub fn template(step: Step) -> &'static str {
    match step {
        Step::Prime => PRIME_COMMAND,
        Step::Planning => PLANNING_COMMAND,
        Step::Execute => EXECUTE_COMMAND,
        Step::Commit => COMMIT_COMMAND,
        Step::Rca => RCA_COMMAND,
        Step::ImplementFix => IMPLEMENT_FIX_COMMAND,
    }
}

/// The template with `$ARGUMENTS` replaced by `arguments`.
pub fn render(step: Step, arguments: &str) -> String {
    template(step).replace(ARGUMENTS, arguments.trim())
}

const PRIME_COMMAND: &str = r#"---
description: Load project context before starting work
allowed-tools: Bash, Read, Glob, Grep
---

# prime

Build a working picture of this repository before changing anything.

## Steps

### 1. Load the summary

```bash
handoff prime
```

### 2. Read what it points at

- Read every key doc listed (README.md, CLAUDE.md, AGENTS.md).
- Skim the main entry points under the listed top-level directories.
- If plans or RCAs are listed, read the ones related to the user's request.

### 3. Report

Summarize in a few bullets: what the project is, how it is laid out, which
work is in flight (`handoff status`), and anything that looks broken.
"#;

const PLANNING_COMMAND: &str = r#"---
description: Write an implementation plan for a feature
argument-hint: <feature>
allowed-tools: Bash, Read, Write, Edit, Glob, Grep
---

# planning

Produce `plans/$ARGUMENTS.md`. Do not implement anything in this step.

## Steps

### 1. Create the plan artifact

```bash
handoff planning $ARGUMENTS --title "<short title>" --description "<one paragraph>"
```

If it reports that the plan already exists, stop and tell the user. Plans are
never overwritten.

### 2. Research

Find the code the feature touches, the patterns it must follow, and the tests
that cover the area. Record file paths under **Context References**.

### 3. Fill in the plan

Edit the placeholder sections of `plans/$ARGUMENTS.md`. Under
**Step-by-Step Tasks** write an ordered, numbered list; each task names the
files it changes. Under **Validation Commands** list shell commands in a
fenced `bash` block.

### 4. Hand off

Tell the user the plan is ready for `/execute $ARGUMENTS`.
"#;

const EXECUTE_COMMAND: &str = r#"---
description: Implement a feature from its plan
argument-hint: <feature>
allowed-tools: Bash, Read, Write, Edit, Glob, Grep
---

# execute

Implement the plan in `plans/$ARGUMENTS.md`.

## Steps

### 1. Load the plan

```bash
handoff execute $ARGUMENTS --dry-run
```

If it reports `plan not found`, stop: run `/planning $ARGUMENTS` first.

### 2. Work through the tasks in order

Complete each listed task, including its tests. Do not skip or reorder tasks
without telling the user why.

### 3. Validate and hand off

```bash
handoff execute $ARGUMENTS --validate
```

Fix anything that fails and re-run. When it passes, continue with `/commit`.
"#;

const COMMIT_COMMAND: &str = r#"---
description: Commit working-tree changes with a derived message
argument-hint: [files...]
allowed-tools: Bash
---

# commit

## Steps

### 1. Review the changes

```bash
git status
git diff
```

### 2. Commit

```bash
handoff commit $ARGUMENTS
```

With no files, every change is committed. The message is derived from the
pending execute or implement-fix handoff, or from the changed paths. Pass
`-m "<type>(<scope>): <subject>"` to override it.

If it reports `nothing to commit` or unresolved conflicts, stop and report.
"#;

const RCA_COMMAND: &str = r#"---
description: Investigate an issue and write a root-cause analysis
argument-hint: <issue-id>
allowed-tools: Bash, Read, Write, Edit, Glob, Grep
---

# rca

Produce `docs/rca/issue-$ARGUMENTS.md`. Do not fix anything in this step.

## Steps

### 1. Fetch the issue and create the artifact

```bash
handoff rca $ARGUMENTS
```

If the tracker is not authenticated, ask the user to run `gh auth login`.

### 2. Investigate

Reproduce the problem, trace the failing code path, and check recent history
(`git log -p` on the suspect files).

### 3. Fill in the analysis

Edit the placeholder sections: Reproduction Steps, Root Cause, Impact
Assessment, Proposed Fix (files and the change for each), Testing
Requirements, and Validation Commands as a fenced `bash` block.

### 4. Hand off

Tell the user the analysis is ready for `/implement-fix $ARGUMENTS`.
"#;

const IMPLEMENT_FIX_COMMAND: &str = r#"---
description: Implement the fix described in a root-cause analysis
argument-hint: <issue-id>
allowed-tools: Bash, Read, Write, Edit, Glob, Grep
---

# implement-fix

Fix issue #$ARGUMENTS as described in `docs/rca/issue-$ARGUMENTS.md`.

## Steps

### 1. Load the analysis

```bash
handoff implement-fix $ARGUMENTS --dry-run
```

If it reports `RCA not found`, stop: run `/rca $ARGUMENTS` first.

### 2. Fix and test

Apply the proposed fix. Add a regression test that fails without the fix.

### 3. Validate and commit

```bash
handoff implement-fix $ARGUMENTS --validate --commit
```
"#;
