//! Fixed listing order

use std::cmp::Ordering;

use shared::models::Product;

/// Published first, then in stock, then most recently listed
///
/// Undated products count as the oldest. Equal keys keep arrival order.
pub fn compare(a: &Product, b: &Product) -> Ordering {
    b.is_published()
        .cmp(&a.is_published())
        .then_with(|| b.has_stock().cmp(&a.has_stock()))
        .then_with(|| b.listed_at.cmp(&a.listed_at))
}

pub fn order(mut products: Vec<Product>) -> Vec<Product> {
    // sort_by is stable
    products.sort_by(compare);
    products
}
