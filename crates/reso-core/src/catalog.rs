//! Mock product catalog
//!
//! Backs the product listing and product detail ("thread") endpoints. The
//! built-in data mirrors the demo storefront; a JSON file with the same shape
//! can replace it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub pic_url: String,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DChain {
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadDetail {
    pub title: String,
    pub pic_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dchain: Option<DChain>,
    pub reference_links: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    threads: BTreeMap<String, ThreadDetail>,
}

impl Catalog {
    pub fn new(products: Vec<Product>, threads: BTreeMap<String, ThreadDetail>) -> Self {
        Self { products, threads }
    }

    /// Load a catalog from a JSON file with `products` and `threads` keys
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&contents)
            .map_err(|e| Error::Catalog(format!("{}: {}", path.display(), e)))?;

        if catalog.products.is_empty() && catalog.threads.is_empty() {
            return Err(Error::Catalog(format!("{}: catalog is empty", path.display())));
        }

        Ok(catalog)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn thread(&self, id: &str) -> Option<&ThreadDetail> {
        self.threads.get(id)
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    /// The demo storefront data
    pub fn builtin() -> Self {
        let products = vec![
            Product {
                id: 1,
                title: "Apple iPhone 15 Pro Max".to_string(),
                pic_url: "https://source.unsplash.com/random/400x400?sig=1".to_string(),
                price: "429.90".to_string(),
            },
            Product {
                id: 2,
                title: "Keychron K8 Mechanical Keyboard".to_string(),
                pic_url: "https://source.unsplash.com/random/400x400?sig=2".to_string(),
                price: "29.90".to_string(),
            },
            Product {
                id: 3,
                title: "Sony WH-1000XM5".to_string(),
                pic_url: "https://source.unsplash.com/random/400x400?sig=3".to_string(),
                price: "89.90".to_string(),
            },
        ];

        let thread = |title: &str, pic_url: &str, dchain: Option<(&str, &str)>, link: &str| ThreadDetail {
            title: title.to_string(),
            pic_url: pic_url.to_string(),
            dchain: dchain.map(|(id, description)| DChain {
                id: id.to_string(),
                description: description.to_string(),
            }),
            reference_links: link.to_string(),
        };

        let threads = BTreeMap::from([
            (
                "1".to_string(),
                thread(
                    "Apple iPhone 15 Pro Max 256GB",
                    "https://source.unsplash.com/random/400x400?sig=1",
                    Some((
                        "dchain_1",
                        "根據用戶評價和專家測試，這款 iPhone 15 Pro Max 在拍照、性能和電池壽命方面表現卓越，特別適合專業用戶和攝影愛好者。",
                    )),
                    "https://www.apple.com/tw/iphone-15-pro/",
                ),
            ),
            (
                "2".to_string(),
                thread(
                    "Keychron K8 機械鍵盤",
                    "https://source.unsplash.com/random/400x400?sig=2",
                    None,
                    "https://www.keychron.com/products/keychron-k8-wireless-mechanical-keyboard",
                ),
            ),
            (
                "3".to_string(),
                thread(
                    "Sony WH-1000XM5",
                    "https://source.unsplash.com/random/400x400?sig=3",
                    Some((
                        "dchain_3",
                        "Sony WH-1000XM5 憑藉其業界領先的降噪技術和優質音質，成為商務人士和音樂愛好者的首選。電池續航力可達30小時，適合長途旅行使用。",
                    )),
                    "https://electronics.sony.com/audio/headphones/headband/p/wh1000xm5-b",
                ),
            ),
            (
                "4".to_string(),
                thread(
                    "Samsung Galaxy S24 Ultra 1TB",
                    "https://images.samsung.com/is/image/samsung/p6pim/ph/sm-s928bzgcphl/gallery/ph-galaxy-s24-ultra-s928-sm-s928bzgcphl-thumb-539711237",
                    None,
                    "https://www.samsung.com/tw/smartphones/galaxy-s24-ultra/",
                ),
            ),
            (
                "5".to_string(),
                thread(
                    "Sony WH-1000XM5 無線降噪耳機",
                    "https://m.media-amazon.com/images/I/61KPF+Zxj-L._AC_SL1500_.jpg",
                    Some((
                        "dchain_5",
                        "這款耳機搭載 V1 處理器和雙噪音感測器技術，提供卓越的降噪體驗。LDAC 技術確保高解析度音質傳輸，讓您享受更豐富的音樂細節。",
                    )),
                    "https://www.sony.com.tw/electronics/headband-headphones/wh-1000xm5",
                ),
            ),
        ]);

        Self { products, threads }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
