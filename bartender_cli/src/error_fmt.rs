//! Human-readable error descriptions and structured JSON error formatting.

use bartender_core::ApplianceError;

/// Map an eyre::Report to a what/why/fix explanation.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(ae) = err.downcast_ref::<ApplianceError>() {
        return match ae {
            ApplianceError::UnknownDrink(name) => format!(
                "What happened: No drink named '{name}' in the catalog.\nLikely causes: A typo, or a custom catalog that does not list it.\nHow to fix: Check the spelling, or pass --drinks with the right catalog file."
            ),
            ApplianceError::Unpourable(ingredient) => format!(
                "What happened: No pump is currently assigned '{ingredient}'.\nLikely causes: The pump configuration does not cover this recipe.\nHow to fix: Assign the ingredient to a pump in the configuration menu, or edit the pump JSON."
            ),
            ApplianceError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values.\nHow to fix: Edit the file and rerun."
            ),
            ApplianceError::State(msg) => format!(
                "What happened: {msg}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from startup loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("pump configuration") {
        return format!(
            "What happened: The pump configuration could not be loaded.\nLikely causes: The JSON file is missing or malformed; the appliance cannot run without known pump assignments.\nHow to fix: Create or repair the file passed via --pumps. Original: {msg}"
        );
    }

    if lower.contains("drink catalog") {
        return format!(
            "What happened: The drink catalog could not be loaded.\nLikely causes: Malformed [[drinks]]/[[options]] tables in the TOML.\nHow to fix: Fix the file passed via --drinks, or drop the flag to use the built-in list. Original: {msg}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.chain().nth(1) {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes for scripted callers; generic errors return 2.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(ae) = err.downcast_ref::<ApplianceError>() {
        return match ae {
            ApplianceError::UnknownDrink(_) => 3,
            ApplianceError::Unpourable(_) => 4,
            ApplianceError::Config(_) => 5,
            ApplianceError::State(_) => 6,
        };
    }
    2
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = match err.downcast_ref::<ApplianceError>() {
        Some(ApplianceError::UnknownDrink(_)) => "UnknownDrink",
        Some(ApplianceError::Unpourable(_)) => "Unpourable",
        Some(ApplianceError::Config(_)) => "Config",
        Some(ApplianceError::State(_)) => "State",
        None => "Error",
    };
    json!({ "reason": reason, "message": humanize(err) }).to_string()
}
