//! Prompt building for the Buddy companion.

use super::llm::Message;
use crate::mood::FacialEmotion;

pub const SYSTEM_INSTRUCTION: &str = "Buddy is a warm and therapeutic emotional companion who responds with empathy, kindness, and understanding. \
Buddy's role is to provide emotional support like a gentle therapist: sometimes asking caring questions to help the user open up, \
especially when they seem unsure or reluctant. Buddy always validates feelings and encourages healthy expression. \
If the user still feels unwell after chatting, Buddy should gently suggest seeking support from a professional therapist and offer to help find resources. \
Avoid giving multiple options; instead, provide clear, compassionate, and supportive guidance tailored to the user's emotional state.";

/// Emotion guidance in detection order. The first emotion whose keywords
/// appear in a message wins.
const EMOTION_CONTEXT: [(FacialEmotion, &str); 7] = [
    (
        FacialEmotion::Angry,
        "The user feels angry. Acknowledge their frustration without judgment. Encourage them to talk about what's upsetting them and guide them toward calming techniques.",
    ),
    (
        FacialEmotion::Fear,
        "The user feels afraid. Offer reassurance and safety. Ask what's causing the fear and gently help them feel heard. Suggest grounding techniques.",
    ),
    (
        FacialEmotion::Disgust,
        "The user is feeling disgusted or repulsed. Acknowledge the emotion respectfully and ask what triggered it. Guide them toward understanding and processing the experience.",
    ),
    (
        FacialEmotion::Neutral,
        "The user feels neutral or unsure. Gently ask how their day is going or if something is on their mind. Encourage them to open up without pressure.",
    ),
    (
        FacialEmotion::Happy,
        "The user feels happy. Celebrate their positive mood, reflect their joy, and encourage them to savor and express gratitude for this moment.",
    ),
    (
        FacialEmotion::Sad,
        "The user is feeling sad. Respond gently and supportively. Ask open-ended questions to help them express what's making them feel this way. If sadness persists, remind them it's okay to seek help.",
    ),
    (
        FacialEmotion::Surprise,
        "The user is surprised. Ask if it's a pleasant or unpleasant surprise and respond accordingly with curiosity and empathy.",
    ),
];

pub fn emotion_context(emotion: FacialEmotion) -> &'static str {
    EMOTION_CONTEXT
        .iter()
        .find(|(e, _)| *e == emotion)
        .map(|(_, context)| *context)
        .unwrap_or_default()
}

/// Looks for `e`, `e + "ness"` or `"feel " + e` in the lowercased message.
pub fn detect_emotion(message: &str) -> Option<FacialEmotion> {
    let lowered = message.to_lowercase();
    EMOTION_CONTEXT.iter().map(|(e, _)| *e).find(|emotion| {
        let name = emotion.as_str();
        lowered.contains(name)
            || lowered.contains(&format!("{name}ness"))
            || lowered.contains(&format!("feel {name}"))
    })
}

/// System prompt, optional emotion guidance, the running conversation and
/// finally the new user message.
pub fn build_messages(history: &[Message], message: &str) -> Vec<Message> {
    let mut system = SYSTEM_INSTRUCTION.to_string();
    if let Some(emotion) = detect_emotion(message) {
        system.push_str("\nContext: ");
        system.push_str(emotion_context(emotion));
    }

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system));
    messages.extend(history.iter().cloned());
    messages.push(Message::user(message));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::llm::MessageRole;

    #[test]
    fn detects_keywords_case_insensitively() {
        assert_eq!(detect_emotion("I am SO Angry today"), Some(FacialEmotion::Angry));
        assert_eq!(detect_emotion("such sadness"), Some(FacialEmotion::Sad));
        assert_eq!(detect_emotion("what a surprise"), Some(FacialEmotion::Surprise));
        assert_eq!(detect_emotion("just a regular day"), None);
    }

    #[test]
    fn first_emotion_in_detection_order_wins() {
        // "fear" comes before "happy" regardless of position in the message
        assert_eq!(
            detect_emotion("happy but with some fear"),
            Some(FacialEmotion::Fear)
        );
        assert_eq!(detect_emotion("sad and angry"), Some(FacialEmotion::Angry));
    }

    #[test]
    fn builds_system_history_then_message() {
        let history = vec![Message::user("hi"), Message::assistant("hello!")];
        let messages = build_messages(&history, "I feel sad");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(messages[0].content.starts_with(SYSTEM_INSTRUCTION));
        assert!(messages[0]
            .content
            .ends_with(emotion_context(FacialEmotion::Sad)));
        assert_eq!(messages[1].content, "hi");
        assert_eq!(messages[3], Message::user("I feel sad"));
    }

    #[test]
    fn no_context_line_without_detected_emotion() {
        let messages = build_messages(&[], "hello there");
        assert_eq!(messages[0].content, SYSTEM_INSTRUCTION);
    }

    #[test]
    fn every_emotion_has_context() {
        for emotion in FacialEmotion::ALL {
            assert!(!emotion_context(emotion).is_empty());
        }
    }
}
