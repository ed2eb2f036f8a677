use anyhow::{bail, Result};
use mizan_core::types::Language;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisorReply {
    pub response: String,
    pub disclaimer: String,
}

const RESPONSES_EN: &[&str] = &[
    "Based on the facts you describe, the first step is to gather every written \
     agreement and piece of correspondence related to the dispute.",
    "Your situation may involve statutory deadlines. Check the limitation period \
     that applies before taking any further action.",
    "In similar matters, parties often reach a negotiated settlement before \
     litigation. Consider sending a formal written notice first.",
    "The outcome will depend on the evidence available. Keep copies of payments, \
     messages, and any witness details in one place.",
];

const RESPONSES_AR: &[&str] = &[
    "بناءً على الوقائع التي ذكرتها، فإن الخطوة الأولى هي جمع جميع الاتفاقيات \
     والمراسلات المكتوبة المتعلقة بالنزاع.",
    "قد تخضع حالتك لمواعيد نظامية محددة، لذا تحقق من مدة التقادم المطبقة قبل \
     اتخاذ أي إجراء آخر.",
    "في القضايا المشابهة يتوصل الأطراف غالباً إلى تسوية ودية قبل التقاضي، فننصح \
     بتوجيه إنذار كتابي رسمي أولاً.",
    "تعتمد النتيجة على الأدلة المتاحة، فاحتفظ بنسخ من المدفوعات والرسائل وبيانات \
     الشهود في مكان واحد.",
];

const DISCLAIMER_EN: &str =
    "This is general information, not legal advice. Consult a licensed lawyer about your case.";
const DISCLAIMER_AR: &str =
    "هذه معلومات عامة وليست استشارة قانونية. يرجى مراجعة محامٍ مرخص بشأن قضيتك.";

pub fn responses(language: Language) -> &'static [&'static str] {
    match language {
        Language::En => RESPONSES_EN,
        Language::Ar => RESPONSES_AR,
    }
}

pub fn disclaimer(language: Language) -> &'static str {
    match language {
        Language::En => DISCLAIMER_EN,
        Language::Ar => DISCLAIMER_AR,
    }
}

/// Canned advisor reply picked with the thread-local RNG.
pub fn reply(message: &str, language: Language) -> Result<AdvisorReply> {
    reply_with(message, language, &mut rand::thread_rng())
}

pub fn reply_with<R: Rng + ?Sized>(
    message: &str,
    language: Language,
    rng: &mut R,
) -> Result<AdvisorReply> {
    if message.trim().is_empty() {
        bail!("Message is required");
    }
    let response = responses(language)
        .choose(rng)
        .copied()
        .unwrap_or_default()
        .to_string();
    Ok(AdvisorReply {
        response,
        disclaimer: disclaimer(language).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn reply_comes_from_language_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let r = reply_with("My landlord kept my deposit", Language::En, &mut rng).unwrap();
            assert!(RESPONSES_EN.contains(&r.response.as_str()));
            assert_eq!(r.disclaimer, DISCLAIMER_EN);

            let r = reply_with("صاحب العمل لم يدفع راتبي", Language::Ar, &mut rng).unwrap();
            assert!(RESPONSES_AR.contains(&r.response.as_str()));
            assert_eq!(r.disclaimer, DISCLAIMER_AR);
        }
    }

    #[test]
    fn same_seed_same_reply() {
        let a = reply_with("hi", Language::En, &mut StdRng::seed_from_u64(1)).unwrap();
        let b = reply_with("hi", Language::En, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn blank_message_is_rejected() {
        assert!(reply("   ", Language::En).is_err());
    }
}
