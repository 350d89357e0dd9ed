//! Static registry of psychological trigger templates, keyed by tone.
//!
//! The registry is versioned so persisted strategies can record exactly
//! which vintage of templates shaped their prompt.

use crate::domain::models::Tone;

/// Bumped whenever any template text changes.
pub const TEMPLATE_VERSION: u32 = 1;

/// One psychological lever the downstream model is instructed to apply.
#[derive(Debug, Clone, Copy)]
pub struct TriggerTemplate {
    /// Stable identifier recorded in strategy metadata.
    pub id: &'static str,
    /// Instruction text injected into the prompt.
    pub instruction: &'static str,
}

const CURIOSITY: &[TriggerTemplate] = &[
    TriggerTemplate {
        id: "open_loop",
        instruction: "Open a loop the viewer can only close by watching: hint at an outcome without revealing it.",
    },
    TriggerTemplate {
        id: "information_gap",
        instruction: "Name something the audience does not know yet and imply the video fills that exact gap.",
    },
    TriggerTemplate {
        id: "pattern_interrupt",
        instruction: "Subvert a familiar expectation ('everyone does X; here is why that fails').",
    },
];

const AUTHORITY: &[TriggerTemplate] = &[
    TriggerTemplate {
        id: "credentials",
        instruction: "Lead with concrete experience markers: years, project counts, outcomes achieved.",
    },
    TriggerTemplate {
        id: "numbers_proof",
        instruction: "Prefer precise numbers over adjectives (e.g. '7 steps', '15,420 views').",
    },
    TriggerTemplate {
        id: "definitive_claim",
        instruction: "State one definitive, testable claim instead of hedged generalities.",
    },
];

const FEAR: &[TriggerTemplate] = &[
    TriggerTemplate {
        id: "loss_aversion",
        instruction: "Frame inaction as a concrete loss the viewer is already incurring.",
    },
    TriggerTemplate {
        id: "mistake_warning",
        instruction: "Warn about a specific, common mistake and its consequence.",
    },
    TriggerTemplate {
        id: "urgency",
        instruction: "Anchor the stakes to the present moment without fabricating deadlines.",
    },
];

const PERSUASIVE: &[TriggerTemplate] = &[
    TriggerTemplate {
        id: "social_proof",
        instruction: "Reference what a large or respected group already does or believes.",
    },
    TriggerTemplate {
        id: "benefit_stacking",
        instruction: "Stack two or three tangible benefits in a single promise.",
    },
    TriggerTemplate {
        id: "call_to_action",
        instruction: "End descriptions with one unambiguous next step.",
    },
];

const ENGAGING: &[TriggerTemplate] = &[
    TriggerTemplate {
        id: "direct_address",
        instruction: "Speak to one viewer ('you'), never an audience.",
    },
    TriggerTemplate {
        id: "story_hook",
        instruction: "Open with a moment in time, not a topic summary.",
    },
    TriggerTemplate {
        id: "vivid_language",
        instruction: "Choose sensory, concrete words over abstract ones.",
    },
];

/// Trigger templates for a tone, in application order.
pub fn triggers_for(tone: Tone) -> &'static [TriggerTemplate] {
    match tone {
        Tone::Curiosity => CURIOSITY,
        Tone::Authority => AUTHORITY,
        Tone::Fear => FEAR,
        Tone::Persuasive => PERSUASIVE,
        Tone::Engaging => ENGAGING,
    }
}

/// Ids only, for strategy metadata.
pub fn trigger_ids(tone: Tone) -> Vec<String> {
    triggers_for(tone)
        .iter()
        .map(|t| t.id.to_string())
        .collect()
}
