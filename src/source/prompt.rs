//! Prompts sent to the report-generation service.

const ROLE: &str = "You are acting as a Lead QA Analyst and Release Risk Assessor.";

const STRUCTURE: &str = "Overall Release Risk Level: [provide level based on your analysis]
• Provide a 1-3 sentence summary explaining the risk level and key drivers

P0 — Top QA Focus Areas (Must Test)
• List only the highest-risk changes with ticket numbers and brief reasoning

Other Notable Changes
• List any concerns (e.g., lack of tests, large diff, unclear intent, multiple PRs touching same area)

No Code Changes (Zero Risk)
• List areas/features with no code changes in a single bullet point, separated by commas

Style Guidelines:
• Use bullet points only
• Be concise and scannable
• Include ticket numbers (e.g., VOICE-827, NUX-1844)
• Focus on P0 items only - do not include P1 or P2 sections
• Assume the audience is QA + Engineering leadership";

/// Prompt that points the service at a compare page it must read itself.
pub fn for_compare_url(compare_url: &str) -> String {
    format!(
        "{ROLE} Review the RC changelog at this link: {compare_url}. \
         Generate a concise QA risk summary based on all commits with the following structure:\n\n{STRUCTURE}"
    )
}

/// Prompt with the changelog embedded.
pub fn for_changelog(changelog: &str) -> String {
    format!(
        "{ROLE} Review the RC changelog below and generate a concise QA risk summary \
         based on all commits with the following structure:\n\n{STRUCTURE}\n\n\
         === CHANGELOG DATA ===\n{changelog}\n==================="
    )
}
