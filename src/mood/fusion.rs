use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use lazy_static::lazy_static;
use serde::Serialize;
use tracing::warn;

use super::eeg::{resolve_band_state, EegBand};
use super::{FacialEmotion, MoodIndicator};

/// One row of the fusion table. The facial emotion is the surface
/// expression, the indicator is the underlying EEG reading.
#[derive(Debug)]
pub struct FusionRecord {
    pub facial: FacialEmotion,
    pub indicator: MoodIndicator,
    pub title: &'static str,
    pub interpretation: &'static str,
    pub chat_ask: &'static str,
    pub chatbot_prompt: &'static str,
}

/// Interpretation of a (facial, indicator) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FusionEntry {
    pub title: Cow<'static, str>,
    pub interpretation: Cow<'static, str>,
    pub chat_ask: Cow<'static, str>,
    pub chatbot_prompt: Cow<'static, str>,
    /// True when the pair had no row and the entry was synthesized.
    #[serde(skip)]
    pub fallback: bool,
}

impl FusionEntry {
    fn from_record(record: &'static FusionRecord) -> Self {
        Self {
            title: Cow::Borrowed(record.title),
            interpretation: Cow::Borrowed(record.interpretation),
            chat_ask: Cow::Borrowed(record.chat_ask),
            chatbot_prompt: Cow::Borrowed(record.chatbot_prompt),
            fallback: false,
        }
    }

    fn synthesized(facial: FacialEmotion, indicator: MoodIndicator) -> Self {
        let state = indicator_phrase(indicator);
        Self {
            title: Cow::Borrowed("Complex Emotional State"),
            interpretation: Cow::Owned(format!(
                "Your {} expression combined with {} brain patterns.",
                facial, state
            )),
            chat_ask: Cow::Borrowed("How are you feeling today?"),
            chatbot_prompt: Cow::Owned(format!(
                "You appear {}, and your brain patterns suggest a sense of {}. How are you feeling right now?",
                facial, state
            )),
            fallback: true,
        }
    }
}

// Indicators reached through a band read as that band's state, the others
// as the bare emotion.
fn indicator_phrase(indicator: MoodIndicator) -> String {
    EegBand::SCAN_ORDER
        .into_iter()
        .map(resolve_band_state)
        .find(|state| state.mood_indicator == indicator)
        .map(|state| state.emotional_state.to_lowercase())
        .unwrap_or_else(|| indicator.as_str().to_string())
}

/// Key stored in the journal for a fused reading, e.g. `sad_angry`.
pub fn combined_mood_key(facial: FacialEmotion, indicator: MoodIndicator) -> String {
    format!("{}_{}", facial, indicator)
}

static FUSION_GAPS: AtomicU64 = AtomicU64::new(0);

/// Number of lookups that fell back to a synthesized entry since start.
pub fn fusion_gap_count() -> u64 {
    FUSION_GAPS.load(Ordering::Relaxed)
}

pub struct FusionTable {
    entries: HashMap<(FacialEmotion, MoodIndicator), &'static FusionRecord>,
}

lazy_static! {
    static ref STANDARD_TABLE: FusionTable = FusionTable::from_records(&FUSION_RECORDS);
}

impl FusionTable {
    pub fn from_records(records: &'static [FusionRecord]) -> Self {
        let entries = records
            .iter()
            .map(|record| ((record.facial, record.indicator), record))
            .collect();
        Self { entries }
    }

    /// The full 7x7 table.
    pub fn standard() -> &'static FusionTable {
        &STANDARD_TABLE
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(
        &self,
        facial: FacialEmotion,
        indicator: MoodIndicator,
    ) -> Option<&'static FusionRecord> {
        self.entries.get(&(facial, indicator)).copied()
    }

    /// Pairs of the closed 7x7 domain that have no row.
    pub fn missing_pairs(&self) -> Vec<(FacialEmotion, MoodIndicator)> {
        FacialEmotion::ALL
            .into_iter()
            .flat_map(|facial| FacialEmotion::ALL.into_iter().map(move |ind| (facial, ind)))
            .filter(|key| !self.entries.contains_key(key))
            .collect()
    }

    pub fn fuse(&self, facial: FacialEmotion, indicator: MoodIndicator) -> FusionEntry {
        match self.get(facial, indicator) {
            Some(record) => FusionEntry::from_record(record),
            None => {
                FUSION_GAPS.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Fusion table has no entry for ({}, {}), using a synthesized one",
                    facial, indicator
                );
                FusionEntry::synthesized(facial, indicator)
            }
        }
    }
}

/// Looks up the standard table.
pub fn fuse(facial: FacialEmotion, indicator: MoodIndicator) -> FusionEntry {
    FusionTable::standard().fuse(facial, indicator)
}

static FUSION_RECORDS: [FusionRecord; 49] = [
    FusionRecord {
        facial: FacialEmotion::Happy,
        indicator: FacialEmotion::Happy,
        title: "Authentic Joy",
        interpretation: "Your happiness is genuine and aligns with positive brain patterns.",
        chat_ask: "What's making you so happy?",
        chatbot_prompt: "Your happiness shines through! What’s been making you smile lately?",
    },
    FusionRecord {
        facial: FacialEmotion::Happy,
        indicator: FacialEmotion::Sad,
        title: "Masked Depression",
        interpretation: "You're showing happiness on the surface, but your brain patterns suggest underlying sadness or emotional processing.",
        chat_ask: "How are you really feeling?",
        chatbot_prompt: "You look cheerful, but I sense something deeper. How are you really feeling?",
    },
    FusionRecord {
        facial: FacialEmotion::Happy,
        indicator: FacialEmotion::Angry,
        title: "Stressed Smile",
        interpretation: "You appear happy, but your brain shows signs of stress or mental agitation underneath.",
        chat_ask: "What's stressing you out lately?",
        chatbot_prompt: "You appear upbeat, but is there something bothering you underneath?",
    },
    FusionRecord {
        facial: FacialEmotion::Happy,
        indicator: FacialEmotion::Neutral,
        title: "Genuine Serenity",
        interpretation: "Your happiness aligns with a calm and peaceful brain state.",
        chat_ask: "What's bringing you peace today?",
        chatbot_prompt: "You seem at peace today. What’s bringing you this calmness?",
    },
    FusionRecord {
        facial: FacialEmotion::Happy,
        indicator: FacialEmotion::Fear,
        title: "Anxious Optimism",
        interpretation: "You seem happy, but your brain indicates intense processing or underlying anxiety.",
        chat_ask: "What's worrying you right now?",
        chatbot_prompt: "You seem happy, yet I feel some tension. Is something worrying you?",
    },
    FusionRecord {
        facial: FacialEmotion::Happy,
        indicator: FacialEmotion::Disgust,
        title: "Polite Facade",
        interpretation: "You look happy, but your brain patterns suggest some level of aversion or discomfort.",
        chat_ask: "What's bothering you underneath?",
        chatbot_prompt: "You’re smiling, but I sense discomfort. Want to talk about what’s bothering you?",
    },
    FusionRecord {
        facial: FacialEmotion::Happy,
        indicator: FacialEmotion::Surprise,
        title: "Delighted Wonder",
        interpretation: "You appear happy with an alert and surprised brain state.",
        chat_ask: "What surprised you today?",
        chatbot_prompt: "You seem pleasantly surprised! What unexpected joy came your way?",
    },
    FusionRecord {
        facial: FacialEmotion::Sad,
        indicator: FacialEmotion::Happy,
        title: "Hidden Strength",
        interpretation: "You look sad, but your brain patterns suggest underlying contentment or peace.",
        chat_ask: "What made you felt like that?",
        chatbot_prompt: "Even in sadness, I feel a quiet strength. What made you feel this way?",
    },
    FusionRecord {
        facial: FacialEmotion::Sad,
        indicator: FacialEmotion::Sad,
        title: "Deep Sorrow",
        interpretation: "Your sadness is authentic and aligns with emotional vulnerability in your brain patterns.",
        chat_ask: "What's making you feel sad?",
        chatbot_prompt: "You seem truly sad. I’m here for you. Want to talk about what’s hurting you?",
    },
    FusionRecord {
        facial: FacialEmotion::Sad,
        indicator: FacialEmotion::Angry,
        title: "Frustrated Grief",
        interpretation: "You appear sad, but your brain shows signs of anger or mental agitation.",
        chat_ask: "What's frustrating you most?",
        chatbot_prompt: "I sense sadness mixed with frustration. What’s been getting to you?",
    },
    FusionRecord {
        facial: FacialEmotion::Sad,
        indicator: FacialEmotion::Neutral,
        title: "Peaceful Melancholy",
        interpretation: "You look sad, but your brain patterns suggest inner peace and subconscious processing.",
        chat_ask: "What's going through your mind?",
        chatbot_prompt: "You seem a bit down, but calm. What’s been on your mind lately?",
    },
    FusionRecord {
        facial: FacialEmotion::Sad,
        indicator: FacialEmotion::Fear,
        title: "Overwhelmed Despair",
        interpretation: "You seem sad and your brain indicates intense emotional processing or anxiety.",
        chat_ask: "What's overwhelming you today?",
        chatbot_prompt: "You feel deeply overwhelmed. Would you like to share what’s causing this?",
    },
    FusionRecord {
        facial: FacialEmotion::Sad,
        indicator: FacialEmotion::Disgust,
        title: "Bitter Disappointment",
        interpretation: "You look sad, but your brain patterns suggest disgust or aversion.",
        chat_ask: "What disappointed you recently?",
        chatbot_prompt: "It sounds like something has really let you down. Want to talk about it?",
    },
    FusionRecord {
        facial: FacialEmotion::Sad,
        indicator: FacialEmotion::Surprise,
        title: "Shocked Sadness",
        interpretation: "You appear sad, but your brain is in an alert and processing state.",
        chat_ask: "What shocked you today?",
        chatbot_prompt: "You seem both sad and surprised. Did something unexpected happen?",
    },
    FusionRecord {
        facial: FacialEmotion::Angry,
        indicator: FacialEmotion::Happy,
        title: "Playful Aggression",
        interpretation: "You look angry, but your brain shows patterns of contentment or peace.",
        chat_ask: "Are you just playing around?",
        chatbot_prompt: "Are you just teasing, or is something really on your mind?",
    },
    FusionRecord {
        facial: FacialEmotion::Angry,
        indicator: FacialEmotion::Sad,
        title: "Hurt Anger",
        interpretation: "You appear angry, but your brain patterns suggest underlying sadness rather than rage.",
        chat_ask: "What hurt you today?",
        chatbot_prompt: "You seem angry, but I sense some pain too. What happened?",
    },
    FusionRecord {
        facial: FacialEmotion::Angry,
        indicator: FacialEmotion::Angry,
        title: "Pure Fury",
        interpretation: "Your anger is genuine and aligns with agitated brain patterns.",
        chat_ask: "What made you so angry?",
        chatbot_prompt: "You seem truly upset. Want to talk about what triggered this?",
    },
    FusionRecord {
        facial: FacialEmotion::Angry,
        indicator: FacialEmotion::Neutral,
        title: "Controlled Rage",
        interpretation: "You show anger outwardly, but your brain patterns suggest you're actually quite calm inside.",
        chat_ask: "What's frustrating you right now?",
        chatbot_prompt: "You’re holding something in. What’s been frustrating you?",
    },
    FusionRecord {
        facial: FacialEmotion::Angry,
        indicator: FacialEmotion::Fear,
        title: "Defensive Rage",
        interpretation: "You seem angry, but your brain indicates intense processing or underlying fear.",
        chat_ask: "What's making you feel threatened?",
        chatbot_prompt: "You seem guarded. What’s making you feel unsafe or attacked?",
    },
    FusionRecord {
        facial: FacialEmotion::Angry,
        indicator: FacialEmotion::Disgust,
        title: "Repulsed Fury",
        interpretation: "You appear angry, and your brain patterns suggest disgust or aversion.",
        chat_ask: "What disgusts you so much?",
        chatbot_prompt: "I sense strong anger and revulsion. What’s been bothering you so deeply?",
    },
    FusionRecord {
        facial: FacialEmotion::Angry,
        indicator: FacialEmotion::Surprise,
        title: "Startled Aggression",
        interpretation: "You look angry, but your brain is in an alert and surprised state.",
        chat_ask: "What caught you off guard?",
        chatbot_prompt: "Something seems to have caught you off guard. Want to share what happened?",
    },
    FusionRecord {
        facial: FacialEmotion::Neutral,
        indicator: FacialEmotion::Happy,
        title: "Quiet Contentment",
        interpretation: "You maintain a neutral expression, but your brain patterns suggest happiness or contentment.",
        chat_ask: "What's quietly making you happy?",
        chatbot_prompt: "You seem quietly happy. What’s been going well for you lately?",
    },
    FusionRecord {
        facial: FacialEmotion::Neutral,
        indicator: FacialEmotion::Sad,
        title: "Hidden Sorrow",
        interpretation: "You appear neutral, but your brain indicates emotional vulnerability or underlying sadness.",
        chat_ask: "What's secretly bothering you?",
        chatbot_prompt: "You look composed, but I sense some sadness. Want to talk about it?",
    },
    FusionRecord {
        facial: FacialEmotion::Neutral,
        indicator: FacialEmotion::Angry,
        title: "Suppressed Anger",
        interpretation: "You look neutral, but your brain shows signs of anger or mental agitation.",
        chat_ask: "What's secretly irritating you?",
        chatbot_prompt: "You seem calm, but I sense irritation. Want to get it off your chest?",
    },
    FusionRecord {
        facial: FacialEmotion::Neutral,
        indicator: FacialEmotion::Neutral,
        title: "Perfect Balance",
        interpretation: "You maintain a neutral expression and your brain patterns show calm, balanced processing.",
        chat_ask: "How are you feeling today?",
        chatbot_prompt: "You seem very centered today. How are you feeling inside?",
    },
    FusionRecord {
        facial: FacialEmotion::Neutral,
        indicator: FacialEmotion::Fear,
        title: "Masked Anxiety",
        interpretation: "You appear neutral, but your brain indicates intense processing or underlying anxiety.",
        chat_ask: "What's secretly worrying you?",
        chatbot_prompt: "You seem okay on the outside, but I sense worry underneath. What’s troubling you?",
    },
    FusionRecord {
        facial: FacialEmotion::Neutral,
        indicator: FacialEmotion::Disgust,
        title: "Concealed Distaste",
        interpretation: "You maintain a neutral expression, but your brain patterns suggest disgust or aversion.",
        chat_ask: "What's secretly bothering you?",
        chatbot_prompt: "You seem neutral, but something feels off. Want to talk about it?",
    },
    FusionRecord {
        facial: FacialEmotion::Neutral,
        indicator: FacialEmotion::Surprise,
        title: "Controlled Amazement",
        interpretation: "You appear neutral, but your brain is in an alert and processing state.",
        chat_ask: "What's quietly surprising you?",
        chatbot_prompt: "You look calm but slightly surprised. Did something unexpected happen?",
    },
    FusionRecord {
        facial: FacialEmotion::Fear,
        indicator: FacialEmotion::Happy,
        title: "Nervous Excitement",
        interpretation: "You look fearful, but your brain patterns suggest underlying contentment.",
        chat_ask: "What's got you nervous?",
        chatbot_prompt: "Are you excited or anxious—or maybe both? What’s going on?",
    },
    FusionRecord {
        facial: FacialEmotion::Fear,
        indicator: FacialEmotion::Sad,
        title: "Vulnerable Anxiety",
        interpretation: "You appear fearful and your brain indicates emotional vulnerability or sadness.",
        chat_ask: "What's making you anxious?",
        chatbot_prompt: "You’re carrying a lot. What’s been weighing on your heart?",
    },
    FusionRecord {
        facial: FacialEmotion::Fear,
        indicator: FacialEmotion::Angry,
        title: "Agitated Terror",
        interpretation: "You seem fearful, but your brain shows signs of anger or mental agitation.",
        chat_ask: "What's terrifying and angering you?",
        chatbot_prompt: "You seem both afraid and upset. Want to talk about what’s causing this storm?",
    },
    FusionRecord {
        facial: FacialEmotion::Fear,
        indicator: FacialEmotion::Neutral,
        title: "Brave Composure",
        interpretation: "You seem fearful, but your brain patterns suggest inner calm and peace.",
        chat_ask: "What's scaring you today?",
        chatbot_prompt: "You seem scared but calm. What’s been making you feel uneasy?",
    },
    FusionRecord {
        facial: FacialEmotion::Fear,
        indicator: FacialEmotion::Fear,
        title: "Genuine Panic",
        interpretation: "Your fear is authentic and aligns with intense processing in your brain.",
        chat_ask: "What's causing this panic?",
        chatbot_prompt: "You seem truly panicked. Let’s slow down together. What’s happening?",
    },
    FusionRecord {
        facial: FacialEmotion::Fear,
        indicator: FacialEmotion::Disgust,
        title: "Repulsed Fear",
        interpretation: "You appear fearful, but your brain patterns suggest disgust or aversion.",
        chat_ask: "What's both scary and disgusting?",
        chatbot_prompt: "You seem afraid and disturbed. What’s making you feel this way?",
    },
    FusionRecord {
        facial: FacialEmotion::Fear,
        indicator: FacialEmotion::Surprise,
        title: "Startled Fright",
        interpretation: "You look fearful with an alert and processing brain state.",
        chat_ask: "What startled you just now?",
        chatbot_prompt: "You seem alarmed. Did something just happen suddenly?",
    },
    FusionRecord {
        facial: FacialEmotion::Disgust,
        indicator: FacialEmotion::Happy,
        title: "Amused Disgust",
        interpretation: "You appear disgusted, but your brain patterns suggest underlying contentment.",
        chat_ask: "What's grossly amusing you?",
        chatbot_prompt: "Something seems gross but maybe funny too? What’s happening?",
    },
    FusionRecord {
        facial: FacialEmotion::Disgust,
        indicator: FacialEmotion::Sad,
        title: "Sorrowful Revulsion",
        interpretation: "You seem disgusted and your brain indicates emotional vulnerability or sadness.",
        chat_ask: "What's making you feel sick?",
        chatbot_prompt: "You seem hurt and turned off by something. Want to talk about it?",
    },
    FusionRecord {
        facial: FacialEmotion::Disgust,
        indicator: FacialEmotion::Angry,
        title: "Furious Revulsion",
        interpretation: "You look disgusted, and your brain shows signs of anger or mental agitation.",
        chat_ask: "What's disgusting and infuriating you?",
        chatbot_prompt: "You seem deeply upset. What’s been pushing you away emotionally?",
    },
    FusionRecord {
        facial: FacialEmotion::Disgust,
        indicator: FacialEmotion::Neutral,
        title: "Composed Distaste",
        interpretation: "You look disgusted, but your brain patterns suggest inner peace and calm processing.",
        chat_ask: "What's bothering you today?",
        chatbot_prompt: "Something seems to be bothering you. What’s on your mind?",
    },
    FusionRecord {
        facial: FacialEmotion::Disgust,
        indicator: FacialEmotion::Fear,
        title: "Terrified Aversion",
        interpretation: "You seem disgusted, but your brain indicates intense processing or anxiety.",
        chat_ask: "What's scary and gross?",
        chatbot_prompt: "You seem afraid and disturbed. What’s made you feel this way?",
    },
    FusionRecord {
        facial: FacialEmotion::Disgust,
        indicator: FacialEmotion::Disgust,
        title: "Pure Revulsion",
        interpretation: "Your disgust is genuine and aligns with aversive brain patterns.",
        chat_ask: "What's completely disgusting you?",
        chatbot_prompt: "You look completely disgusted. Want to talk about what caused that?",
    },
    FusionRecord {
        facial: FacialEmotion::Disgust,
        indicator: FacialEmotion::Surprise,
        title: "Shocked Disgust",
        interpretation: "You appear disgusted, but your brain is in an alert and surprised state.",
        chat_ask: "What disgusting thing surprised you?",
        chatbot_prompt: "You seem surprised and disgusted. What shocked you so badly?",
    },
    FusionRecord {
        facial: FacialEmotion::Surprise,
        indicator: FacialEmotion::Happy,
        title: "Joyful Amazement",
        interpretation: "You seem surprised, and your brain patterns suggest underlying contentment.",
        chat_ask: "What amazing thing happened?",
        chatbot_prompt: "You seem thrilled! What amazing thing just happened?",
    },
    FusionRecord {
        facial: FacialEmotion::Surprise,
        indicator: FacialEmotion::Sad,
        title: "Melancholic Surprise",
        interpretation: "You look surprised and your brain indicates emotional vulnerability or sadness.",
        chat_ask: "What sad thing surprised you?",
        chatbot_prompt: "You seem surprised and a little sad. What happened?",
    },
    FusionRecord {
        facial: FacialEmotion::Surprise,
        indicator: FacialEmotion::Angry,
        title: "Indignant Shock",
        interpretation: "You appear surprised, but your brain shows signs of anger or mental agitation.",
        chat_ask: "What shocked and angered you?",
        chatbot_prompt: "You seem shocked and frustrated. Want to unpack it together?",
    },
    FusionRecord {
        facial: FacialEmotion::Surprise,
        indicator: FacialEmotion::Neutral,
        title: "Peaceful Wonder",
        interpretation: "You appear surprised, but your brain patterns suggest calm and peaceful processing.",
        chat_ask: "What's amazingly peaceful today?",
        chatbot_prompt: "Something caught your attention gently. What was it?",
    },
    FusionRecord {
        facial: FacialEmotion::Surprise,
        indicator: FacialEmotion::Fear,
        title: "Alarmed Surprise",
        interpretation: "You look surprised, and your brain indicates intense processing or anxiety.",
        chat_ask: "What alarming thing happened?",
        chatbot_prompt: "Something startled you. Want to tell me what happened?",
    },
    FusionRecord {
        facial: FacialEmotion::Surprise,
        indicator: FacialEmotion::Disgust,
        title: "Appalled Shock",
        interpretation: "You seem surprised, but your brain patterns suggest disgust or aversion.",
        chat_ask: "What appalling thing happened?",
        chatbot_prompt: "You seem shocked and disgusted. What upset you that much?",
    },
    FusionRecord {
        facial: FacialEmotion::Surprise,
        indicator: FacialEmotion::Surprise,
        title: "Pure Astonishment",
        interpretation: "Your surprise is authentic and aligns with alert brain patterns.",
        chat_ask: "What completely astonished you?",
        chatbot_prompt: "Wow, you seem totally amazed! What surprised you like that?",
    },
];
