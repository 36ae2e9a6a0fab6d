//! The ten report queries, each a composition of analytics primitives over the
//! prepared `Dataset`.

use crate::catalog::ReportId;
use crate::dataset::Dataset;
use analytics::{
    Aggregation, AnalyticsError, JoinSpec, Predicate, SortDirection, SortKey, dense_rank,
    distinct, filter, group_by, inner_join, limit, select, select_columns, sort,
};
use configuration::TopCutPolicy;
use core_types::columns::*;
use core_types::{Discount, SaleOrReturn, Table};

/// Output column names introduced by the reports.
pub mod output {
    pub const ITEM_COUNT: &str = "ItemCount";
    pub const TOTAL_QUANTITY_SOLD: &str = "TotalQuantitySold";
    pub const TOTAL_REVENUE: &str = "TotalRevenue";
    pub const RETURN_COUNT: &str = "ReturnCount";
    pub const ITEMS_ABOVE_WHOLESALE: &str = "ItemsAboveWholesale";
    pub const DISCOUNTED_ITEM_COUNT: &str = "DiscountedItemCount";
    pub const LOSS_PERCENTAGE: &str = "LossPercentage";
    pub const HIGHEST_WHOLESALE_PRICE: &str = "HighestWholesalePrice";
    pub const RANK: &str = "Rank";
}

use output::*;

const MONEY_DP: u32 = 2;
const MOST_RETURNS_TOP: usize = 1;
const LOSS_CATEGORIES_TOP: usize = 3;

/// Runs one report against the dataset.
pub fn run_report(
    id: ReportId,
    dataset: &Dataset,
    top_cut: TopCutPolicy,
) -> Result<Table, AnalyticsError> {
    match id {
        ReportId::CategoryItemCounts => category_item_counts(dataset),
        ReportId::ItemTotals => item_totals(dataset),
        ReportId::MonthlyRevenue => monthly_revenue(dataset),
        ReportId::TopCategoryPerMonth => top_category_per_month(dataset),
        ReportId::MonthMostReturns => month_most_returns(dataset, top_cut),
        ReportId::ItemsAboveWholesale => items_above_wholesale(dataset),
        ReportId::DiscountedItemsPerCategory => discounted_items_per_category(dataset),
        ReportId::SaleVsReturnCounts => sale_vs_return_counts(dataset),
        ReportId::TopLossCategories => top_loss_categories(dataset, top_cut),
        ReportId::HighestWholesalePerYear => highest_wholesale_per_year(dataset),
    }
}

/// Keeps the best `n` rows of a table already sorted descending on `metric`.
///
/// `Rows` takes exactly the first `n` rows. `Rank` keeps every row whose dense
/// rank on `metric` is at most `n`, so ties at the boundary survive.
pub fn top_cut(
    sorted: &Table,
    metric: &str,
    n: usize,
    policy: TopCutPolicy,
) -> Result<Table, AnalyticsError> {
    match policy {
        TopCutPolicy::Rows => Ok(limit(sorted, n)),
        TopCutPolicy::Rank => {
            let names: Vec<&str> = sorted.schema().names();
            let ranked = dense_rank(sorted, &[], metric, SortDirection::Descending, RANK)?;
            let max_rank = i64::try_from(n).map_err(|_| {
                AnalyticsError::ArithmeticOverflow(format!("top {} does not fit a rank", n))
            })?;
            let kept = filter(&ranked, &Predicate::le(RANK, max_rank))?;
            select_columns(&kept, &names)
        }
    }
}

fn category_item_counts(dataset: &Dataset) -> Result<Table, AnalyticsError> {
    group_by(dataset.items(), &[CATEGORY_CODE])?
        .aggregate(&[Aggregation::count(ITEM_CODE, ITEM_COUNT)])
}

fn item_totals(dataset: &Dataset) -> Result<Table, AnalyticsError> {
    group_by(dataset.sales(), &[ITEM_CODE])?.aggregate(&[
        Aggregation::sum(QUANTITY_SOLD_KG, TOTAL_QUANTITY_SOLD).rounded(MONEY_DP),
        Aggregation::sum(REVENUE, TOTAL_REVENUE).rounded(MONEY_DP),
    ])
}

fn monthly_revenue(dataset: &Dataset) -> Result<Table, AnalyticsError> {
    let totals = group_by(dataset.sales(), &[YEAR, MONTH])?
        .aggregate(&[Aggregation::sum(REVENUE, REVENUE).rounded(MONEY_DP)])?;
    sort(&totals, &[SortKey::asc(YEAR), SortKey::asc(MONTH)])
}

fn top_category_per_month(dataset: &Dataset) -> Result<Table, AnalyticsError> {
    let joined = inner_join(
        dataset.sales(),
        dataset.items(),
        &JoinSpec::new("s", "i").on(ITEM_CODE, ITEM_CODE),
    )?;
    let revenue = group_by(&joined, &[YEAR, MONTH, CATEGORY_NAME])?
        .aggregate(&[Aggregation::sum(REVENUE, REVENUE).rounded(MONEY_DP)])?;
    let ranked = dense_rank(
        &revenue,
        &[YEAR, MONTH],
        REVENUE,
        SortDirection::Descending,
        RANK,
    )?;
    let best = filter(&ranked, &Predicate::eq(RANK, 1i64))?;
    let ordered = sort(&best, &[SortKey::asc(YEAR), SortKey::asc(MONTH)])?;
    select_columns(&ordered, &[YEAR, MONTH, CATEGORY_NAME, REVENUE])
}

fn month_most_returns(dataset: &Dataset, top: TopCutPolicy) -> Result<Table, AnalyticsError> {
    let returns = filter(
        dataset.sales(),
        &Predicate::eq(SALE_OR_RETURN, SaleOrReturn::Return.as_str()),
    )?;
    let counts = group_by(&returns, &[MONTH])?
        .aggregate(&[Aggregation::count_distinct(ITEM_CODE, RETURN_COUNT)])?;
    let ordered = sort(&counts, &[SortKey::desc(RETURN_COUNT)])?;
    top_cut(&ordered, RETURN_COUNT, MOST_RETURNS_TOP, top)
}

fn items_above_wholesale(dataset: &Dataset) -> Result<Table, AnalyticsError> {
    let joined = inner_join(
        dataset.sales(),
        dataset.wholesale_prices(),
        &JoinSpec::new("s", "w").on(DATE, DATE).on(ITEM_CODE, ITEM_CODE),
    )?;
    let priced = select(
        &joined,
        &[
            ("s.Year", YEAR),
            (MONTH, MONTH),
            ("s.ItemCode", ITEM_CODE),
            (UNIT_PRICE, UNIT_PRICE),
            (WHOLESALE_PRICE, WHOLESALE_PRICE),
        ],
    )?;
    let above = filter(&priced, &Predicate::gt_column(UNIT_PRICE, WHOLESALE_PRICE))?;
    let counts = group_by(&above, &[YEAR, MONTH])?
        .aggregate(&[Aggregation::count_distinct(ITEM_CODE, ITEMS_ABOVE_WHOLESALE)])?;
    sort(&counts, &[SortKey::asc(YEAR), SortKey::asc(MONTH)])
}

fn discounted_items_per_category(dataset: &Dataset) -> Result<Table, AnalyticsError> {
    let joined = inner_join(
        dataset.items(),
        dataset.sales(),
        &JoinSpec::new("i", "s").on(ITEM_CODE, ITEM_CODE),
    )?;
    let lines = select(
        &joined,
        &[
            ("i.ItemCode", ITEM_CODE),
            (CATEGORY_NAME, CATEGORY_NAME),
            (YEAR, YEAR),
            (DISCOUNT, DISCOUNT),
        ],
    )?;
    let discounted = filter(&lines, &Predicate::eq(DISCOUNT, Discount::Yes.as_str()))?;
    let counts = group_by(&discounted, &[YEAR, CATEGORY_NAME])?
        .aggregate(&[Aggregation::count_distinct(ITEM_CODE, DISCOUNTED_ITEM_COUNT)])?;
    sort(&counts, &[SortKey::asc(YEAR)])
}

fn sale_vs_return_counts(dataset: &Dataset) -> Result<Table, AnalyticsError> {
    let counts = group_by(dataset.sales(), &[YEAR, MONTH, SALE_OR_RETURN])?
        .aggregate(&[Aggregation::count_distinct(ITEM_CODE, ITEM_COUNT)])?;
    sort(&counts, &[SortKey::asc(YEAR), SortKey::asc(MONTH)])
}

fn top_loss_categories(dataset: &Dataset, top: TopCutPolicy) -> Result<Table, AnalyticsError> {
    let joined = inner_join(
        dataset.items(),
        dataset.item_loss(),
        &JoinSpec::new("i", "l").on(ITEM_CODE, ITEM_CODE),
    )?;
    let rates = select_columns(&joined, &[CATEGORY_NAME, LOSS_RATE])?;
    let means = group_by(&rates, &[CATEGORY_NAME])?
        .aggregate(&[Aggregation::mean(LOSS_RATE, LOSS_PERCENTAGE).rounded(MONEY_DP)])?;
    let ordered = sort(&means, &[SortKey::desc(LOSS_PERCENTAGE)])?;
    top_cut(&ordered, LOSS_PERCENTAGE, LOSS_CATEGORIES_TOP, top)
}

fn highest_wholesale_per_year(dataset: &Dataset) -> Result<Table, AnalyticsError> {
    let wholesale = dataset.wholesale_prices();
    let highest = group_by(wholesale, &[YEAR])?
        .aggregate(&[Aggregation::max(WHOLESALE_PRICE, HIGHEST_WHOLESALE_PRICE)])?;
    let joined = inner_join(
        wholesale,
        &highest,
        &JoinSpec::new("w", "h")
            .on(YEAR, YEAR)
            .on(WHOLESALE_PRICE, HIGHEST_WHOLESALE_PRICE),
    )?;
    let items = select(
        &joined,
        &[
            ("w.Year", YEAR),
            (ITEM_CODE, ITEM_CODE),
            (HIGHEST_WHOLESALE_PRICE, HIGHEST_WHOLESALE_PRICE),
        ],
    )?;
    distinct(&items)
}
