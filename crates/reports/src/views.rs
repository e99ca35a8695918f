//! Joined report records.

use common::ProductId;
use domain::{CartLine, Product, UserSummary};
use serde::Serialize;

/// A cart line with its product and owner resolved.
///
/// `product` is absent when the product has been deleted. `user` is only
/// filled by admin listings, and is absent for users without a summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLine,
    pub product: Option<Product>,
    pub user: Option<UserSummary>,
}

impl CartLineView {
    pub fn new(line: CartLine) -> Self {
        Self {
            line,
            product: None,
            user: None,
        }
    }
}

/// The product referenced by the most purchase lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSeller {
    pub product_id: ProductId,
    /// Number of purchase lines, not units.
    pub count: u64,
    pub product: Product,
}
