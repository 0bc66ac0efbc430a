use crate::output::print_json;
use crate::templates;
use handoff_core::types::Step;

pub fn run(step: &str, argument: Option<&str>, json: bool) -> anyhow::Result<()> {
    let step: Step = step.parse()?;
    if let (None, Some(hint)) = (argument, step.argument_hint()) {
        tracing::warn!(%step, "no {hint} given; $ARGUMENTS is left empty");
    }
    let prompt = templates::render(step, argument.unwrap_or_default());

    if json {
        print_json(&serde_json::json!({
            "step": step,
            "role": step.role(),
            "file": templates::filename(step),
            "prompt": prompt,
        }))?;
    } else {
        print!("{prompt}");
    }
    Ok(())
}
