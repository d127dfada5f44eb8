//! Static catalog of tracked assets

use crate::core::error::QueryError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Category {
    Currency,
    IndexFund,
    RareMaterial,
    Crypto,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Currency,
        Category::IndexFund,
        Category::RareMaterial,
        Category::Crypto,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Currency => "Currencies",
            Category::IndexFund => "Index Funds",
            Category::RareMaterial => "Rare Materials",
            Category::Crypto => "Crypto",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Category::Currency => "Currency",
                Category::IndexFund => "IndexFund",
                Category::RareMaterial => "RareMaterial",
                Category::Crypto => "Crypto",
            }
        )
    }
}

impl FromStr for Category {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Currency" => Ok(Category::Currency),
            "IndexFund" => Ok(Category::IndexFund),
            "RareMaterial" => Ok(Category::RareMaterial),
            "Crypto" => Ok(Category::Crypto),
            _ => Err(QueryError::UnknownCategory(s.to_string())),
        }
    }
}

/// Tells the fetch layer where an asset's prices come from and the
/// normalizer how to read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SourceBinding {
    /// Alpha Vantage `TIME_SERIES_DAILY`; closes are adjusted as
    /// `close * multiplier + offset`.
    AlphaVantageDaily {
        symbol: String,
        multiplier: f64,
        offset: f64,
    },
    /// Spot quote from gold-api.com.
    SpotPrice { symbol: String },
    /// USD based conversion table, re-based onto `base`.
    ExchangeRate { base: String, quote: String },
    /// Flat list of `(date, price)` points, used for file imports.
    FlatList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetDescriptor {
    pub asset_id: String,
    pub display_name: String,
    pub category: Category,
    pub source_binding: SourceBinding,
}

impl AssetDescriptor {
    pub fn new(
        asset_id: &str,
        display_name: &str,
        category: Category,
        source_binding: SourceBinding,
    ) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            display_name: display_name.to_string(),
            category,
            source_binding,
        }
    }
}

/// Immutable registry of assets, in display order.
#[derive(Debug, Clone)]
pub struct Catalog {
    assets: Vec<AssetDescriptor>,
}

impl Catalog {
    pub fn new(assets: Vec<AssetDescriptor>) -> Self {
        Self { assets }
    }

    /// The assets collected by the daily job.
    pub fn builtin() -> Self {
        let fx = |base: &str, quote: &str| SourceBinding::ExchangeRate {
            base: base.to_string(),
            quote: quote.to_string(),
        };
        let daily = |symbol: &str, multiplier: f64, offset: f64| SourceBinding::AlphaVantageDaily {
            symbol: symbol.to_string(),
            multiplier,
            offset,
        };
        let spot = |symbol: &str| SourceBinding::SpotPrice {
            symbol: symbol.to_string(),
        };

        Self::new(vec![
            AssetDescriptor::new("EUR_USD", "EUR/USD", Category::Currency, fx("EUR", "USD")),
            AssetDescriptor::new("EUR_CNY", "EUR/CNY", Category::Currency, fx("EUR", "CNY")),
            AssetDescriptor::new("USD_CNY", "USD/CNY", Category::Currency, fx("USD", "CNY")),
            AssetDescriptor::new("SP_500", "S&P 500", Category::IndexFund, daily("SPY", 10.0, 10.0)),
            AssetDescriptor::new(
                "STOXX_600",
                "Stoxx 600",
                Category::IndexFund,
                daily("EXSA.DE", 10.0, 5.0),
            ),
            AssetDescriptor::new("CSI_300", "CSI 300", Category::IndexFund, daily("ASHR", 20.0, 0.0)),
            AssetDescriptor::new("GOLD", "Gold", Category::RareMaterial, spot("XAU")),
            AssetDescriptor::new("SILVER", "Silver", Category::RareMaterial, spot("XAG")),
            AssetDescriptor::new("BITCOIN", "Bitcoin", Category::Crypto, spot("BTC")),
            AssetDescriptor::new("ETHEREUM", "Ethereum", Category::Crypto, spot("ETH")),
        ])
    }

    pub fn get(&self, asset_id: &str) -> Option<&AssetDescriptor> {
        self.assets.iter().find(|a| a.asset_id == asset_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetDescriptor> {
        self.assets.iter()
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &AssetDescriptor> {
        self.assets.iter().filter(move |a| a.category == category)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_catalog_ids_are_unique() {
        let catalog = Catalog::builtin();
        let ids: HashSet<_> = catalog.iter().map(|a| a.asset_id.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());
        assert_eq!(catalog.len(), 10);
    }

    #[test]
    fn test_builtin_catalog_covers_every_category() {
        let catalog = Catalog::builtin();
        for category in Category::ALL {
            assert!(
                catalog.in_category(category).next().is_some(),
                "no assets for {category}"
            );
        }
        let currencies: Vec<_> = catalog
            .in_category(Category::Currency)
            .map(|a| a.asset_id.as_str())
            .collect();
        assert_eq!(currencies, vec!["EUR_USD", "EUR_CNY", "USD_CNY"]);
    }

    #[test]
    fn test_category_parsing_is_exact() {
        assert_eq!("Crypto".parse::<Category>(), Ok(Category::Crypto));
        assert_eq!("IndexFund".parse::<Category>(), Ok(Category::IndexFund));
        assert_eq!(
            "crypto".parse::<Category>(),
            Err(QueryError::UnknownCategory("crypto".to_string()))
        );
        // "All" is a selection, not a category of its own
        assert!("All".parse::<Category>().is_err());
    }

    #[test]
    fn test_lookup() {
        let catalog = Catalog::builtin();
        let gold = catalog.get("GOLD").unwrap();
        assert_eq!(gold.display_name, "Gold");
        assert_eq!(gold.category, Category::RareMaterial);
        assert!(catalog.get("PLATINUM").is_none());
    }
}
