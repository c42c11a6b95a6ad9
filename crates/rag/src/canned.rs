//! Static answers used when retrieval is unavailable.

/// Topic tag plus the canned text served for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CannedAnswer {
    pub topic: &'static str,
    pub answer: &'static str,
}

const RETURN_KEYWORDS: [&str; 4] = ["return", "refund", "exchange", "policy"];
const CONTACT_KEYWORDS: [&str; 6] = ["contact", "phone", "email", "support", "address", "reach"];
const OFFER_KEYWORDS: [&str; 6] = ["offer", "discount", "sale", "promotion", "deal", "coupon"];

const RETURN_POLICY_ANSWER: &str = "Our standard return/exchange window is 7-14 days for unused \
    items with original tags and receipt. Certain items may be non-returnable. For exact policy \
    details, please refer to our Return Policy page or contact support.";
const CONTACT_ANSWER: &str = "You can reach support via email at support@example.com or phone at \
    +1-000-000-0000. Business hours: Mon-Fri, 9am-6pm IST.";
const OFFERS_ANSWER: &str = "Current promotions vary by season. Please check the Offers page or \
    sign up for our newsletter/app notifications for the latest discounts and coupon codes.";
const GENERAL_ANSWER: &str = "I can help with return policy, contact details, or current offers. \
    Please specify your question.";

/// Pick the canned answer for a question by keyword membership. Checks run
/// in a fixed priority order; anything unmatched lands on the general
/// answer.
pub fn fallback_answer(message: &str) -> CannedAnswer {
    let message_lower = message.to_lowercase();
    let contains_any =
        |keywords: &[&str]| keywords.iter().any(|keyword| message_lower.contains(keyword));

    if contains_any(&RETURN_KEYWORDS) {
        CannedAnswer { topic: "return_policy", answer: RETURN_POLICY_ANSWER }
    } else if contains_any(&CONTACT_KEYWORDS) {
        CannedAnswer { topic: "contact_details", answer: CONTACT_ANSWER }
    } else if contains_any(&OFFER_KEYWORDS) {
        CannedAnswer { topic: "current_offers", answer: OFFERS_ANSWER }
    } else {
        CannedAnswer { topic: "general", answer: GENERAL_ANSWER }
    }
}
