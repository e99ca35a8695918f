//! Report queries over the inventory store.

use std::collections::{BTreeMap, HashMap};

use common::{CartLineId, ProductId, UserId};
use domain::{CartLine, OrderStatus, Product, UserSummary};
use inventory_store::{InventoryStore, InventoryStoreExt, LineQuery};

use crate::error::{ReportError, Result};
use crate::views::{CartLineView, TopSeller};

/// Read-only queries joining cart lines with products and users.
#[derive(Debug, Clone)]
pub struct ReportService<S: InventoryStore> {
    store: S,
}

impl<S: InventoryStore> ReportService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Pending and paid lines of one user, oldest first, with products.
    #[tracing::instrument(skip(self))]
    pub async fn user_cart(&self, user_id: UserId) -> Result<Vec<CartLineView>> {
        let lines = self.store.active_lines_for_user(user_id).await?;
        self.join(lines, false).await
    }

    /// Every cart line with product and owner summary.
    #[tracing::instrument(skip(self))]
    pub async fn all_lines(&self) -> Result<Vec<CartLineView>> {
        let lines = self.store.query_lines(LineQuery::new()).await?;
        self.join(lines, true).await
    }

    /// Lines currently at `status`. An empty result is reported as not found.
    #[tracing::instrument(skip(self))]
    pub async fn lines_by_status(&self, status: OrderStatus) -> Result<Vec<CartLineView>> {
        let lines = self
            .store
            .query_lines(LineQuery::new().order_status(status))
            .await?;
        if lines.is_empty() {
            return Err(ReportError::NoLinesWithStatus(status));
        }
        self.join(lines, true).await
    }

    /// The order status of one line, together with the joined line.
    pub async fn order_status(
        &self,
        line_id: CartLineId,
    ) -> Result<(Option<OrderStatus>, CartLineView)> {
        let line = self
            .store
            .get_line(line_id)
            .await?
            .ok_or(ReportError::CartLineNotFound(line_id))?;
        let status = line.order_status;
        let mut joined = self.join(vec![line], false).await?;
        let view = joined.pop().ok_or(ReportError::CartLineNotFound(line_id))?;
        Ok((status, view))
    }

    /// Units held by all purchase lines, whatever their payment status.
    pub async fn total_quantity(&self) -> Result<u64> {
        Ok(self.store.total_line_quantity().await?)
    }

    /// Units currently in stock across all products.
    pub async fn total_stock(&self) -> Result<u64> {
        Ok(self.store.total_stock().await?)
    }

    /// The existing product referenced by the most purchase lines.
    ///
    /// Ties go to the lowest product id. Lines pointing at deleted products
    /// are counted but their product can never win.
    #[tracing::instrument(skip(self))]
    pub async fn top_selling_product(&self) -> Result<TopSeller> {
        let lines = self.store.query_lines(LineQuery::new().purchases()).await?;

        let mut counts: BTreeMap<ProductId, u64> = BTreeMap::new();
        for line in &lines {
            *counts.entry(line.product_id).or_default() += 1;
        }

        let ids: Vec<ProductId> = counts.keys().copied().collect();
        let mut products: HashMap<ProductId, Product> = self
            .store
            .get_products(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut ranked: Vec<(ProductId, u64)> = counts.into_iter().collect();
        // Stable sort keeps ascending id order among equal counts.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        ranked
            .into_iter()
            .find_map(|(product_id, count)| {
                products.remove(&product_id).map(|product| TopSeller {
                    product_id,
                    count,
                    product,
                })
            })
            .ok_or(ReportError::NoSales)
    }

    /// Every appointment line with product and owner summary.
    #[tracing::instrument(skip(self))]
    pub async fn appointments(&self) -> Result<Vec<CartLineView>> {
        let lines = self
            .store
            .query_lines(LineQuery::new().appointments())
            .await?;
        self.join(lines, true).await
    }

    /// Resolves products (and optionally users) for a batch of lines.
    async fn join(&self, lines: Vec<CartLine>, with_users: bool) -> Result<Vec<CartLineView>> {
        let mut product_ids: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();
        product_ids.sort();
        product_ids.dedup();
        let products: HashMap<ProductId, Product> = self
            .store
            .get_products(&product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let users: HashMap<UserId, UserSummary> = if with_users {
            let mut user_ids: Vec<UserId> = lines.iter().map(|l| l.user_id).collect();
            user_ids.sort();
            user_ids.dedup();
            self.store
                .get_users(&user_ids)
                .await?
                .into_iter()
                .map(|u| (u.id, u))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(lines
            .into_iter()
            .map(|line| CartLineView {
                product: products.get(&line.product_id).cloned(),
                user: users.get(&line.user_id).cloned(),
                line,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::ErrorKind;
    use inventory_store::InMemoryInventoryStore;

    async fn seed_product(store: &InMemoryInventoryStore, name: &str) -> ProductId {
        let product = Product::new(name, 10);
        let id = product.id;
        store.insert_product(product).await.unwrap();
        id
    }

    #[tokio::test]
    async fn top_seller_counts_lines_not_units() {
        let store = InMemoryInventoryStore::new();
        let p1 = seed_product(&store, "Sedan").await;
        let p2 = seed_product(&store, "Pickup").await;
        let user = UserId::new();
        store.insert_line(CartLine::purchase(user, p1, 1).unwrap()).await.unwrap();
        store.insert_line(CartLine::purchase(user, p1, 1).unwrap()).await.unwrap();
        store.insert_line(CartLine::purchase(user, p2, 9).unwrap()).await.unwrap();

        let reports = ReportService::new(store);
        let top = reports.top_selling_product().await.unwrap();

        assert_eq!(top.product_id, p1);
        assert_eq!(top.count, 2);
        assert_eq!(top.product.name, "Sedan");
    }

    #[tokio::test]
    async fn top_seller_ties_go_to_lowest_id() {
        let store = InMemoryInventoryStore::new();
        let a = seed_product(&store, "A").await;
        let b = seed_product(&store, "B").await;
        let user = UserId::new();
        store.insert_line(CartLine::purchase(user, a, 1).unwrap()).await.unwrap();
        store.insert_line(CartLine::purchase(user, b, 1).unwrap()).await.unwrap();

        let top = ReportService::new(store).top_selling_product().await.unwrap();
        assert_eq!(top.product_id, a.min(b));
    }

    #[tokio::test]
    async fn top_seller_skips_deleted_products() {
        let store = InMemoryInventoryStore::new();
        let kept = seed_product(&store, "Kept").await;
        let user = UserId::new();
        let gone = ProductId::new();
        for _ in 0..3 {
            store.insert_line(CartLine::purchase(user, gone, 1).unwrap()).await.unwrap();
        }
        store.insert_line(CartLine::purchase(user, kept, 1).unwrap()).await.unwrap();

        let top = ReportService::new(store).top_selling_product().await.unwrap();
        assert_eq!(top.product_id, kept);
        assert_eq!(top.count, 1);
    }

    #[tokio::test]
    async fn top_seller_without_sales_is_not_found() {
        let reports = ReportService::new(InMemoryInventoryStore::new());
        let err = reports.top_selling_product().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn empty_status_listing_is_not_found() {
        let reports = ReportService::new(InMemoryInventoryStore::new());
        let err = reports
            .lines_by_status(OrderStatus::Shipped)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::NoLinesWithStatus(OrderStatus::Shipped)));
    }

    #[tokio::test]
    async fn totals_default_to_zero() {
        let reports = ReportService::new(InMemoryInventoryStore::new());
        assert_eq!(reports.total_quantity().await.unwrap(), 0);
        assert_eq!(reports.total_stock().await.unwrap(), 0);
    }
}
