//! Canned guidance: recommendations, follow-up questions, suggested
//! questions, fallback answers and the prompt context assembled for
//! providers.

use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;

use super::{KnowledgeSnippet, Medication, PetContext};
use crate::domain::{Species, Urgency};

/// Snippets kept after ranking gathered knowledge.
pub const KNOWLEDGE_LIMIT: usize = 8;
/// Snippets quoted in the prompt context.
pub const CONTEXT_SOURCES: usize = 5;
/// Characters quoted from each snippet.
pub const CONTEXT_SNIPPET_CHARS: usize = 300;
/// Medications quoted in the prompt context.
pub const CONTEXT_MEDICATIONS: usize = 3;
/// Sources returned to chat clients.
pub const REPLY_SOURCES: usize = 3;

/// Provider name reported on fallback answers.
pub const FALLBACK_PROVIDER: &str = "Fallback System";
/// Confidence reported on fallback answers.
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

const BASE_RECOMMENDATIONS: [&str; 5] = [
    "Consult with a qualified veterinarian for proper diagnosis",
    "Monitor your pet's symptoms closely",
    "Ensure your pet has access to fresh water",
    "Keep your pet comfortable and stress-free",
    "Follow up if symptoms worsen or persist",
];

const EMERGENCY_RECOMMENDATION: &str = "Seek immediate emergency veterinary care";
const HIGH_URGENCY_RECOMMENDATION: &str = "Schedule a veterinary appointment within 24 hours";

const FOLLOW_UP_QUESTIONS: [&str; 5] = [
    "How long have you noticed these symptoms?",
    "Has your pet's appetite or behavior changed recently?",
    "Are there any other symptoms you've observed?",
    "Has your pet been exposed to anything unusual?",
    "Is your pet up to date on vaccinations?",
];

const FALLBACK_RECOMMENDATIONS: [&str; 3] = [
    "Consult a veterinarian immediately if this is an emergency",
    "Monitor your pet closely",
    "Ensure your pet is comfortable",
];

const FALLBACK_FOLLOW_UPS: [&str; 2] = [
    "Is this an emergency situation?",
    "How long have you noticed these symptoms?",
];

/// Recommendations attached to a chat failure response.
pub const FAILURE_RECOMMENDATIONS: [&str; 2] =
    ["Consult a veterinarian", "Monitor your pet closely"];

const DOG_SUGGESTIONS: [&str; 5] = [
    "My dog is losing hair, what could be causing this?",
    "My dog has been vomiting, should I be worried?",
    "What are the signs of hip dysplasia in dogs?",
    "My dog is not eating, what should I do?",
    "How often should I bathe my dog?",
];

const CAT_SUGGESTIONS: [&str; 5] = [
    "My cat is not using the litter box, why?",
    "My cat has been hiding, is this normal?",
    "What are the symptoms of kidney disease in cats?",
    "My cat is coughing, what could it be?",
    "How can I tell if my cat is in pain?",
];

const BIRD_SUGGESTIONS: [&str; 5] = [
    "My bird is plucking its feathers, why?",
    "What are signs of respiratory problems in birds?",
    "My bird is not singing, should I be concerned?",
    "What is the proper diet for my bird?",
    "How can I tell if my bird is sick?",
];

/// Recommendations for an answer of the given urgency, most pressing first.
#[must_use]
pub fn recommendations_for(urgency: Urgency) -> Vec<String> {
    let lead = match urgency {
        Urgency::Emergency => Some(EMERGENCY_RECOMMENDATION),
        Urgency::High => Some(HIGH_URGENCY_RECOMMENDATION),
        Urgency::Medium | Urgency::Low => None,
    };
    lead.into_iter()
        .chain(BASE_RECOMMENDATIONS)
        .map(str::to_owned)
        .collect()
}

/// Standard follow-up questions.
#[must_use]
pub fn follow_up_questions() -> Vec<String> {
    FOLLOW_UP_QUESTIONS.map(str::to_owned).to_vec()
}

/// Suggested starter questions; species without a list use the dog list.
#[must_use]
pub fn suggested_questions(species: Species) -> Vec<String> {
    let list = match species {
        Species::Cat => CAT_SUGGESTIONS,
        Species::Bird => BIRD_SUGGESTIONS,
        _ => DOG_SUGGESTIONS,
    };
    list.map(str::to_owned).to_vec()
}

/// Answer given when the pipeline fails part-way.
#[must_use]
pub fn fallback_answer(species: Species) -> String {
    format!(
        "I apologize, but I'm experiencing technical difficulties processing your question \
         about your {species}. Please consult with a qualified veterinarian who can provide \
         proper diagnosis and treatment. Your pet's health is important, and professional \
         veterinary care is always the best option."
    )
}

/// Answer embedded in an HTTP failure payload.
#[must_use]
pub fn failure_answer(species: Species) -> String {
    format!(
        "I apologize, but I'm experiencing technical difficulties. For your {species}'s health \
         concern, please consult with a qualified veterinarian who can provide proper diagnosis \
         and treatment."
    )
}

/// Fallback recommendations.
#[must_use]
pub fn fallback_recommendations() -> Vec<String> {
    FALLBACK_RECOMMENDATIONS.map(str::to_owned).to_vec()
}

/// Fallback follow-up questions.
#[must_use]
pub fn fallback_follow_ups() -> Vec<String> {
    FALLBACK_FOLLOW_UPS.map(str::to_owned).to_vec()
}

static MEDICATION_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn medication_regex() -> Option<&'static Regex> {
    MEDICATION_RE
        .get_or_init(|| {
            Regex::new(
                r"(?i)\b(medicine|medication|drug|pill|tablet|treatment|dose|dosage|antibiotic|painkiller|vaccine)\b",
            )
            .ok()
        })
        .as_ref()
}

/// Whether a question asks about medication.
#[must_use]
pub fn mentions_medication(query: &str) -> bool {
    medication_regex().is_some_and(|re| re.is_match(query))
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => text.get(..index).unwrap_or(text),
        None => text,
    }
}

/// Assemble the background text handed to the AI provider.
#[must_use]
pub fn build_prompt_context(
    query: &str,
    species: Species,
    knowledge: &[KnowledgeSnippet],
    medications: &[Medication],
    pet: &PetContext,
) -> String {
    let mut context = format!("Veterinary query about a {species}: \"{query}\"\n\n");

    if !knowledge.is_empty() {
        context.push_str("RELEVANT VETERINARY INFORMATION:\n");
        for (index, snippet) in knowledge.iter().take(CONTEXT_SOURCES).enumerate() {
            let excerpt = truncate_chars(&snippet.content, CONTEXT_SNIPPET_CHARS);
            let _ = writeln!(context, "{}. {}: {excerpt}...", index + 1, snippet.title);
        }
        context.push('\n');
    }

    if !medications.is_empty() {
        context.push_str("RELEVANT MEDICATIONS:\n");
        for (index, medication) in medications.iter().take(CONTEXT_MEDICATIONS).enumerate() {
            let _ = writeln!(
                context,
                "{}. {}: {}",
                index + 1,
                medication.name,
                medication.description
            );
            if let Some(dosage) = &medication.dosage {
                let _ = writeln!(context, "   Dosage: {dosage}");
            }
            if !medication.side_effects.is_empty() {
                let _ = writeln!(
                    context,
                    "   Side effects: {}",
                    medication.side_effects.join(", ")
                );
            }
        }
        context.push('\n');
    }

    if let Some(age) = &pet.pet_age {
        let _ = writeln!(context, "Pet age: {age}");
    }
    if let Some(breed) = &pet.pet_breed {
        let _ = writeln!(context, "Pet breed: {breed}");
    }
    if !pet.symptoms.is_empty() {
        let _ = writeln!(context, "Reported symptoms: {}", pet.symptoms.join(", "));
    }

    context
}
