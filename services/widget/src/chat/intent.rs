//! Keyword-based intent classification.

use regex::Regex;
use std::sync::OnceLock;
use storefront_chat_core::{domain::Intent, ports::IntentClassifier};

const PRODUCT_KEYWORDS: [&str; 3] = ["price", "stock", "discount"];
const ORDER_KEYWORDS: [&str; 3] = ["order", "shipment", "delivery"];

fn order_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // One letter followed by one or more digits, as a whole word.
    PATTERN.get_or_init(|| Regex::new(r"\b[A-Za-z][0-9]+\b").expect("order id pattern is valid"))
}

/// Returns the first order identifier found in `text`.
pub fn extract_order_id(text: &str) -> Option<String> {
    order_id_pattern()
        .find(text)
        .map(|m| m.as_str().to_string())
}

/// Classifies by lowercase substring match. Product keywords win over order keywords.
#[derive(Clone, Debug)]
pub struct KeywordIntentClassifier {
    product_keywords: Vec<String>,
    order_keywords: Vec<String>,
}

impl KeywordIntentClassifier {
    pub fn new(product_keywords: Vec<String>, order_keywords: Vec<String>) -> Self {
        let lower = |words: Vec<String>| words.into_iter().map(|w| w.to_lowercase()).collect();
        Self {
            product_keywords: lower(product_keywords),
            order_keywords: lower(order_keywords),
        }
    }
}

impl Default for KeywordIntentClassifier {
    fn default() -> Self {
        let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
        Self::new(owned(&PRODUCT_KEYWORDS), owned(&ORDER_KEYWORDS))
    }
}

impl IntentClassifier for KeywordIntentClassifier {
    fn classify(&self, text: &str) -> Intent {
        let lowered = text.to_lowercase();
        let mentions = |words: &[String]| words.iter().any(|w| lowered.contains(w.as_str()));

        if mentions(&self.product_keywords) {
            Intent::ProductInquiry
        } else if mentions(&self.order_keywords) {
            Intent::OrderInquiry {
                order_id: extract_order_id(text),
            }
        } else {
            Intent::Conversation
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_keywords_are_case_insensitive() {
        let classifier = KeywordIntentClassifier::default();
        assert_eq!(
            classifier.classify("What's the PRICE of the knife set?"),
            Intent::ProductInquiry
        );
        assert_eq!(classifier.classify("any discounts?"), Intent::ProductInquiry);
    }

    #[test]
    fn product_wins_over_order() {
        let classifier = KeywordIntentClassifier::default();
        assert_eq!(
            classifier.classify("is delivery included in the price?"),
            Intent::ProductInquiry
        );
    }

    #[test]
    fn order_intent_carries_extracted_id() {
        let classifier = KeywordIntentClassifier::default();
        assert_eq!(
            classifier.classify("where is my order B2002?"),
            Intent::OrderInquiry {
                order_id: Some("B2002".to_string())
            }
        );
        assert_eq!(
            classifier.classify("when will my shipment arrive"),
            Intent::OrderInquiry { order_id: None }
        );
    }

    #[test]
    fn order_id_must_be_a_whole_word() {
        assert_eq!(extract_order_id("order12 please"), None);
        assert_eq!(extract_order_id("track x7 now"), Some("x7".to_string()));
        assert_eq!(extract_order_id("order AB12"), None);
    }

    #[test]
    fn everything_else_is_conversation() {
        let classifier = KeywordIntentClassifier::default();
        assert_eq!(classifier.classify("do you sell woks?"), Intent::Conversation);
    }

    #[test]
    fn custom_keywords_replace_defaults() {
        let classifier =
            KeywordIntentClassifier::new(vec!["Cost".to_string()], vec!["parcel".to_string()]);
        assert_eq!(classifier.classify("what does it cost"), Intent::ProductInquiry);
        assert_eq!(classifier.classify("price?"), Intent::Conversation);
        assert_eq!(
            classifier.classify("my parcel c3"),
            Intent::OrderInquiry {
                order_id: Some("c3".to_string())
            }
        );
    }
}
