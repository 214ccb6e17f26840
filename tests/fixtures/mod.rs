//! Shared CSV dataset for integration tests
//!
//! Six orders, three line items, three products, three inventory rows and
//! two deliveries, chosen so every rule has at least one hit and one
//! boundary case that must not be flagged.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use leakscope::loader::{LoadReport, TableLoader};
use leakscope::store::Store;
use tempfile::TempDir;

pub const PREFIX: &str = "blinkit_";

pub const ORDERS: &str = "order_id,customer_id,order_date,order_total
1,C1,2024-01-01,100
2,C1,2024-01-01,100
3,C2,2024-01-01,100
4,C3,2024-01-02,0
5,C4,2024-01-03,-50
6,C5,2024-01-04,250
";

pub const ORDER_ITEMS: &str = "order_id,product_id,quantity,unit_price
1,P1,2,40
3,P2,1,45
6,P3,5,50
";

pub const PRODUCTS: &str = "product_id,product_name,category,brand,price,mrp,margin_percentage
P1,Milk,Dairy,XYZ Foods,80,100,20
P2,Bread,Bakery,Amul,90,90,10
P3,Chips,Snacks,bestxyz,50,100,25
";

pub const INVENTORY: &str = "product_id,date,stock_received,damaged_stock
P1,2024-01-01,100,25
P2,2024-01-01,0,5
P3,2024-01-01,100,20
";

pub const DELIVERY_PERFORMANCE: &str =
    "order_id,promised_time,actual_time,delivery_time_minutes,reasons_if_delayed
1,2024-01-01 10:00:00,2024-01-01 10:00:00,30,
2,2024-01-01 10:00:00,2024-01-01 10:15:00,45,Traffic
";

/// Sum of `order_total` in `ORDERS`
pub const TOTAL_SALES: f64 = 500.0;

/// Writes one `blinkit_<table>.csv`
pub fn write_csv(dir: &Path, table: &str, content: &str) -> PathBuf {
    let path = dir.join(format!("{}{}.csv", PREFIX, table));
    fs::write(&path, content).unwrap();
    path
}

/// Writes the full dataset plus one non-CSV file into `dir`
pub fn write_dataset(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    write_csv(dir, "orders", ORDERS);
    write_csv(dir, "order_items", ORDER_ITEMS);
    write_csv(dir, "products", PRODUCTS);
    write_csv(dir, "inventory", INVENTORY);
    write_csv(dir, "delivery_performance", DELIVERY_PERFORMANCE);
    fs::write(dir.join("README.txt"), "not a table").unwrap();
}

pub fn data_dir(tmp: &TempDir) -> PathBuf {
    tmp.path().join("data")
}

pub fn db_path(tmp: &TempDir) -> PathBuf {
    tmp.path().join("leakscope.duckdb")
}

/// Loads `data_dir(tmp)` into `db_path(tmp)` and closes the store
pub fn load(tmp: &TempDir) -> LoadReport {
    let store = Store::open_read_write(db_path(tmp)).unwrap();
    TableLoader::new(&store, PREFIX)
        .load_dir(&data_dir(tmp))
        .unwrap()
}

/// Writes and loads the full dataset, then reopens the store read-only
pub fn loaded_store() -> (TempDir, Store) {
    let tmp = TempDir::new().unwrap();
    write_dataset(&data_dir(&tmp));
    load(&tmp);
    let store = Store::open_read_only(db_path(&tmp)).unwrap();
    (tmp, store)
}
