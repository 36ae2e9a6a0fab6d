use configuration::{ConfigError, ReportSettings};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Every report the pipeline knows, in canonical run and output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportId {
    CategoryItemCounts,
    ItemTotals,
    MonthlyRevenue,
    TopCategoryPerMonth,
    MonthMostReturns,
    ItemsAboveWholesale,
    DiscountedItemsPerCategory,
    SaleVsReturnCounts,
    TopLossCategories,
    HighestWholesalePerYear,
}

impl ReportId {
    pub const ALL: [ReportId; 10] = [
        ReportId::CategoryItemCounts,
        ReportId::ItemTotals,
        ReportId::MonthlyRevenue,
        ReportId::TopCategoryPerMonth,
        ReportId::MonthMostReturns,
        ReportId::ItemsAboveWholesale,
        ReportId::DiscountedItemsPerCategory,
        ReportId::SaleVsReturnCounts,
        ReportId::TopLossCategories,
        ReportId::HighestWholesalePerYear,
    ];

    /// The id used on the command line and in `reports.enabled`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportId::CategoryItemCounts => "category-item-counts",
            ReportId::ItemTotals => "item-totals",
            ReportId::MonthlyRevenue => "monthly-revenue",
            ReportId::TopCategoryPerMonth => "top-category-per-month",
            ReportId::MonthMostReturns => "month-most-returns",
            ReportId::ItemsAboveWholesale => "items-above-wholesale",
            ReportId::DiscountedItemsPerCategory => "discounted-items-per-category",
            ReportId::SaleVsReturnCounts => "sale-vs-return-counts",
            ReportId::TopLossCategories => "top-loss-categories",
            ReportId::HighestWholesalePerYear => "highest-wholesale-per-year",
        }
    }

    /// The business question the report answers.
    pub fn title(&self) -> &'static str {
        match self {
            ReportId::CategoryItemCounts => "Total number of items in each category",
            ReportId::ItemTotals => "Total quantity sold and revenue generated for each item",
            ReportId::MonthlyRevenue => "Monthly sales per year",
            ReportId::TopCategoryPerMonth => "Top selling category in each month",
            ReportId::MonthMostReturns => "Month with the highest number of returned items",
            ReportId::ItemsAboveWholesale => "Items sold above the wholesale price in each month",
            ReportId::DiscountedItemsPerCategory => "Discounted items per category in each year",
            ReportId::SaleVsReturnCounts => "Sold and returned items in each month",
            ReportId::TopLossCategories => "Top 3 categories by average loss percentage",
            ReportId::HighestWholesalePerYear => "Item with the highest wholesale price in each year",
        }
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ReportId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "unknown report '{}'; known reports: {}",
                    wanted,
                    ReportId::ALL.map(|id| id.as_str()).join(", ")
                ))
            })
    }
}

/// Resolves the configured report selection, in canonical order and without
/// duplicates. No selection means every report.
pub fn select_reports(settings: &ReportSettings) -> Result<Vec<ReportId>, ConfigError> {
    let Some(enabled) = &settings.enabled else {
        return Ok(ReportId::ALL.to_vec());
    };
    let mut ids = enabled
        .iter()
        .map(|s| s.parse::<ReportId>())
        .collect::<Result<Vec<_>, _>>()?;
    ids.sort();
    ids.dedup();
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_text() {
        for id in ReportId::ALL {
            assert_eq!(id.as_str().parse::<ReportId>().unwrap(), id);
        }
    }

    #[test]
    fn selection_defaults_to_everything() {
        let ids = select_reports(&ReportSettings::default()).unwrap();
        assert_eq!(ids, ReportId::ALL.to_vec());
    }

    #[test]
    fn selection_is_ordered_and_deduplicated() {
        let settings = ReportSettings {
            enabled: Some(vec![
                "top-loss-categories".to_string(),
                "monthly-revenue".to_string(),
                "top-loss-categories".to_string(),
            ]),
            ..ReportSettings::default()
        };
        assert_eq!(
            select_reports(&settings).unwrap(),
            vec![ReportId::MonthlyRevenue, ReportId::TopLossCategories]
        );
    }

    #[test]
    fn unknown_id_is_a_validation_error() {
        let settings = ReportSettings {
            enabled: Some(vec!["weekly-revenue".to_string()]),
            ..ReportSettings::default()
        };
        assert!(matches!(
            select_reports(&settings),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
