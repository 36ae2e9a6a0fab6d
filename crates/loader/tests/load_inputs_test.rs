//! Loads a complete set of input files from disk.

use configuration::DataPaths;
use loader::{LoaderError, load_inputs};
use std::fs;
use std::path::Path;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn fixture(dir: &Path) -> DataPaths {
    DataPaths {
        items: write(
            dir,
            "Items.csv",
            "Item Code,Item Name,Category Code,Category Name\n\
             102900005115168,Niushou Shengcai,1011010101,Flower/Leaf Vegetables\n\
             102900005115199,Sichuan Red Cedar,1011010101,Flower/Leaf Vegetables\n",
        ),
        daily_sales: write(
            dir,
            "Daily_Sales.csv",
            "Date,Time,Item Code,Quantity Sold(kilo),Unit Selling Price (RMB/kg),Sale or Return,Discount (Yes/No)\n\
             2020-07-01,09:15:07.924,102900005115168,0.396,7.6,sale,No\n",
        ),
        wholesale_prices: write(
            dir,
            "Daily_Wholesaleprice.csv",
            "Date,Item Code,Wholesale Price (RMB/kg)\n2020-07-01,102900005115168,3.88\n",
        ),
        item_loss: write(
            dir,
            "Item_Loss.csv",
            "Item Code,Item Name,Loss Rate (%)\n102900005115168,Niushou Shengcai,4.39\n",
        ),
    }
}

#[test]
fn loads_all_four_tables() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = load_inputs(&fixture(dir.path())).unwrap();
    assert_eq!(inputs.items.len(), 2);
    assert_eq!(inputs.daily_sales.len(), 1);
    assert_eq!(inputs.wholesale_prices.len(), 1);
    assert_eq!(inputs.item_loss.len(), 1);
}

#[test]
fn a_missing_file_names_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = fixture(dir.path());
    paths.item_loss = dir.path().join("nope.csv");
    match load_inputs(&paths).unwrap_err() {
        LoaderError::Io { path, .. } => assert!(path.ends_with("nope.csv")),
        other => panic!("unexpected: {:?}", other),
    }
}
