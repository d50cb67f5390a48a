//! Plan Catalog

use serde::Serialize;

/// A subscription plan as shown on the pricing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub name: String,
    /// Monthly price in whole US dollars
    pub price: u32,
    /// Billing provider price id
    pub price_id: String,
    pub generations: String,
    pub features: Vec<String>,
    pub is_featured: bool,
}

impl Plan {
    fn new(
        name: &str,
        price: u32,
        price_id: &str,
        generations: &str,
        features: [&str; 3],
        is_featured: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            price,
            price_id: price_id.to_string(),
            generations: generations.to_string(),
            features: features.iter().map(|f| f.to_string()).collect(),
            is_featured,
        }
    }
}

pub fn default_catalog() -> Vec<Plan> {
    vec![
        Plan::new(
            "Pilgrim",
            2,
            "price_1S9bsoF1aEX7i16QuJ86DpFA",
            "50/month",
            ["No Watermark", "Standard Queue", "Community Support"],
            false,
        ),
        Plan::new(
            "Apostle",
            5,
            "price_1S9bsoF1aEX7i16QwR9OjTLN",
            "200/month",
            ["No Watermark", "Priority Queue", "Email Support"],
            true,
        ),
        Plan::new(
            "Saint",
            10,
            "price_1S9bsoF1aEX7i16QAEGszhjT",
            "1,000/month",
            ["No Watermark", "High-Priority Queue", "Direct Support"],
            false,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog() {
        let plans = default_catalog();
        assert_eq!(plans.len(), 3);
        assert_eq!(plans.iter().filter(|p| p.is_featured).count(), 1);
        assert_eq!(plans[1].name, "Apostle");

        let json = serde_json::to_value(&plans[0]).unwrap();
        assert_eq!(json["priceId"], "price_1S9bsoF1aEX7i16QuJ86DpFA");
        assert_eq!(json["isFeatured"], false);
    }
}
