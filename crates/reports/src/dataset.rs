use crate::error::ReportError;
use analytics::derive::{derive_sales, derive_wholesale};
use core_types::{Item, ItemLossRecord, SalesRecord, Table, Tabular, WholesalePriceRecord};

/// The four base tables, schema-checked, with derived columns added once.
///
/// Reports only ever read from a `Dataset`, so one instance is shared by every
/// report in a run, including reports running on other threads.
#[derive(Debug, Clone)]
pub struct Dataset {
    items: Table,
    sales: Table,
    wholesale_prices: Table,
    item_loss: Table,
}

impl Dataset {
    /// Checks every table against its canonical schema, then derives Revenue,
    /// Year and Month on sales and Year on wholesale prices.
    pub fn new(
        items: Table,
        daily_sales: Table,
        wholesale_prices: Table,
        item_loss: Table,
    ) -> Result<Self, ReportError> {
        items.conform(&Item::schema(), Item::TABLE)?;
        daily_sales.conform(&SalesRecord::schema(), SalesRecord::TABLE)?;
        wholesale_prices.conform(&WholesalePriceRecord::schema(), WholesalePriceRecord::TABLE)?;
        item_loss.conform(&ItemLossRecord::schema(), ItemLossRecord::TABLE)?;

        let sales = derive_sales(&daily_sales)?;
        let wholesale_prices = derive_wholesale(&wholesale_prices)?;
        tracing::info!(
            items = items.len(),
            sales = sales.len(),
            wholesale_prices = wholesale_prices.len(),
            item_loss = item_loss.len(),
            "Dataset prepared."
        );

        Ok(Self {
            items,
            sales,
            wholesale_prices,
            item_loss,
        })
    }

    /// Builds a dataset straight from records.
    pub fn from_records(
        items: Vec<Item>,
        sales: Vec<SalesRecord>,
        wholesale_prices: Vec<WholesalePriceRecord>,
        item_loss: Vec<ItemLossRecord>,
    ) -> Result<Self, ReportError> {
        Self::new(
            Item::into_table(items)?,
            SalesRecord::into_table(sales)?,
            WholesalePriceRecord::into_table(wholesale_prices)?,
            ItemLossRecord::into_table(item_loss)?,
        )
    }

    pub fn items(&self) -> &Table {
        &self.items
    }

    /// Daily sales with Revenue, Year and Month.
    pub fn sales(&self) -> &Table {
        &self.sales
    }

    /// Daily wholesale prices with Year.
    pub fn wholesale_prices(&self) -> &Table {
        &self.wholesale_prices
    }

    pub fn item_loss(&self) -> &Table {
        &self.item_loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{CoreError, DataType, Field, Schema};

    #[test]
    fn empty_inputs_are_accepted() {
        let dataset = Dataset::from_records(vec![], vec![], vec![], vec![]).unwrap();
        assert!(dataset.sales().is_empty());
        assert!(dataset.sales().schema().contains("Revenue"));
        assert!(dataset.wholesale_prices().schema().contains("Year"));
    }

    #[test]
    fn wrong_item_schema_is_rejected() {
        let schema = Schema::new(vec![Field::new("ItemCode", DataType::Text)]).unwrap();
        let err = Dataset::new(
            Table::empty(schema),
            SalesRecord::into_table(vec![]).unwrap(),
            WholesalePriceRecord::into_table(vec![]).unwrap(),
            ItemLossRecord::into_table(vec![]).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ReportError::Input(CoreError::SchemaMismatch { ref table, .. }) if table == "Items"
        ));
    }
}
