//! Keyword intent classification
//!
//! A fixed, ordered decision table: the query is lowercased and tested for
//! substring matches against each rule's keywords in turn. The first rule that
//! matches wins; queries matching nothing land in [`IntentBucket::Curated`].

use serde::{Deserialize, Serialize};

/// Intent category a query was sorted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentBucket {
    Phone,
    Headphones,
    Accessories,
    Jacket,
    Dress,
    Shoes,
    Curated,
}

impl IntentBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentBucket::Phone => "phone",
            IntentBucket::Headphones => "headphones",
            IntentBucket::Accessories => "accessories",
            IntentBucket::Jacket => "jacket",
            IntentBucket::Dress => "dress",
            IntentBucket::Shoes => "shoes",
            IntentBucket::Curated => "curated",
        }
    }
}

/// Canned attributes shown for an intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub title: String,
    pub attrs: Vec<String>,
    pub pic_url: String,
}

/// Response body of the intent endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentResponse {
    pub intent: Intent,
    pub message: String,
    pub status: i32,
}

/// Outcome of classifying a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub bucket: IntentBucket,
    pub response: IntentResponse,
}

struct IntentRule {
    bucket: IntentBucket,
    keywords: &'static [&'static str],
    title: &'static str,
    attrs: &'static [&'static str],
    pic_url: &'static str,
    /// `{query}` is replaced with the user's query
    message: &'static str,
}

impl IntentRule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
    }

    fn respond(&self, query: &str) -> IntentResponse {
        IntentResponse {
            intent: Intent {
                title: self.title.to_string(),
                attrs: self.attrs.iter().map(|a| a.to_string()).collect(),
                pic_url: self.pic_url.to_string(),
            },
            message: self.message.replace("{query}", query),
            status: 0,
        }
    }
}

const RULES: &[IntentRule] = &[
    IntentRule {
        bucket: IntentBucket::Phone,
        keywords: &["手機", "phone", "iphone"],
        title: "手機系列",
        attrs: &["高效", "創新", "智能", "便攜", "Advanced", "High-Performance", "User-Friendly", "Cutting-Edge"],
        pic_url: "https://source.unsplash.com/400x300?smartphone,technology&sig=intent1",
        message: "為您找到最新的手機產品，根據您的搜尋「{query}」為您推薦最適合的選擇。",
    },
    IntentRule {
        bucket: IntentBucket::Headphones,
        keywords: &["耳機", "headphone", "audio"],
        title: "耳機系列",
        attrs: &["音質", "降噪", "舒適", "無線", "Premium Audio", "Noise-Cancelling", "Wireless", "Comfortable"],
        pic_url: "https://source.unsplash.com/400x300?headphones,audio&sig=intent2",
        message: "為您精選高品質耳機產品，根據您的搜尋「{query}」為您推薦音質絕佳的選擇。",
    },
    IntentRule {
        bucket: IntentBucket::Accessories,
        keywords: &["配件", "keyboard", "mouse"],
        title: "配件系列",
        attrs: &["效率", "人體工學", "響應", "耐用", "Ergonomic", "Responsive", "Durable", "Professional"],
        pic_url: "https://source.unsplash.com/400x300?keyboard,workspace&sig=intent3",
        message: "為您推薦專業配件產品，根據您的搜尋「{query}」為您提升工作效率。",
    },
    IntentRule {
        bucket: IntentBucket::Jacket,
        keywords: &["jacket", "coat", "外套"],
        title: "外套系列",
        attrs: &["保暖", "防風", "時尚", "多層次", "Lightweight", "Professional", "Wrinkle-Resistant", "Versatile"],
        pic_url: "https://source.unsplash.com/400x300?jacket,fashion&sig=intent4",
        message: "為您挑選時尚外套，根據您的搜尋「{query}」為您推薦最適合的款式。",
    },
    IntentRule {
        bucket: IntentBucket::Dress,
        keywords: &["dress", "連身裙"],
        title: "連身裙系列",
        attrs: &["優雅", "舒適", "百搭", "氣質", "Elegant", "Breathable", "Flowy", "Feminine"],
        pic_url: "https://source.unsplash.com/400x300?dress,fashion&sig=intent5",
        message: "為您精選優雅連身裙，根據您的搜尋「{query}」為您推薦最美的款式。",
    },
    IntentRule {
        bucket: IntentBucket::Shoes,
        keywords: &["shoes", "boot", "鞋"],
        title: "鞋履系列",
        attrs: &["舒適", "耐磨", "時尚", "透氣", "Durable", "Non-slip", "Cushioned", "Flexible"],
        pic_url: "https://source.unsplash.com/400x300?shoes,footwear&sig=intent6",
        message: "為您推薦舒適鞋履，根據您的搜尋「{query}」為您找到最合適的鞋款。",
    },
];

const FALLBACK: IntentRule = IntentRule {
    bucket: IntentBucket::Curated,
    keywords: &[],
    title: "精選商品",
    attrs: &["精選", "品質", "設計", "實用", "Premium", "Curated", "Trending", "Best-seller"],
    pic_url: "https://source.unsplash.com/400x300?shopping,products&sig=intent_default",
    message: "為您精選優質商品，根據您的搜尋「{query}」為您推薦最適合的選擇。",
};

/// Static keyword-to-intent lookup
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Bucket for `query` without building the response
    pub fn bucket_for(&self, query: &str) -> IntentBucket {
        self.rule_for(query).bucket
    }

    /// Classify `query` and build the canned response for it
    pub fn classify(&self, query: &str) -> Classification {
        let rule = self.rule_for(query);
        Classification {
            bucket: rule.bucket,
            response: rule.respond(query),
        }
    }

    fn rule_for(&self, query: &str) -> &'static IntentRule {
        let lowered = query.to_lowercase();
        RULES
            .iter()
            .find(|rule| rule.matches(&lowered))
            .unwrap_or(&FALLBACK)
    }
}
