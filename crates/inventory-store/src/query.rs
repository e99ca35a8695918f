use common::{ProductId, UserId};
use domain::{CartLine, LineKind, OrderStatus, PaymentStatus};

/// Restricts a query to one kind of cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKindFilter {
    Purchase,
    Appointment,
}

impl LineKindFilter {
    /// Returns the kind tag as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineKindFilter::Purchase => "purchase",
            LineKindFilter::Appointment => "appointment",
        }
    }

    pub fn matches(&self, kind: &LineKind) -> bool {
        matches!(
            (self, kind),
            (LineKindFilter::Purchase, LineKind::Purchase { .. })
                | (LineKindFilter::Appointment, LineKind::Appointment(_))
        )
    }
}

/// Builder for constructing cart line queries.
///
/// Unset filters match everything. Results are ordered by creation time,
/// then by id.
#[derive(Debug, Clone, Default)]
pub struct LineQuery {
    /// Filter by owning user.
    pub user_id: Option<UserId>,

    /// Filter by referenced product.
    pub product_id: Option<ProductId>,

    /// Filter by payment status (any of these).
    pub payment_statuses: Option<Vec<PaymentStatus>>,

    /// Filter by order status.
    pub order_status: Option<OrderStatus>,

    /// Filter by line kind.
    pub kind: Option<LineKindFilter>,

    /// Maximum number of lines to return.
    pub limit: Option<usize>,

    /// Number of lines to skip.
    pub offset: Option<usize>,
}

impl LineQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for one user's lines.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn product_id(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    /// Filters by multiple payment statuses (any of these).
    pub fn payment_statuses(mut self, statuses: Vec<PaymentStatus>) -> Self {
        self.payment_statuses = Some(statuses);
        self
    }

    pub fn payment_status(self, status: PaymentStatus) -> Self {
        self.payment_statuses(vec![status])
    }

    pub fn order_status(mut self, status: OrderStatus) -> Self {
        self.order_status = Some(status);
        self
    }

    pub fn kind(mut self, kind: LineKindFilter) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn purchases(self) -> Self {
        self.kind(LineKindFilter::Purchase)
    }

    pub fn appointments(self) -> Self {
        self.kind(LineKindFilter::Appointment)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if `line` passes every filter (limit and offset aside).
    pub fn matches(&self, line: &CartLine) -> bool {
        if let Some(user_id) = self.user_id
            && line.user_id != user_id
        {
            return false;
        }
        if let Some(product_id) = self.product_id
            && line.product_id != product_id
        {
            return false;
        }
        if let Some(ref statuses) = self.payment_statuses
            && !statuses.contains(&line.payment_status)
        {
            return false;
        }
        if let Some(status) = self.order_status
            && line.order_status != Some(status)
        {
            return false;
        }
        if let Some(kind) = self.kind
            && !kind.matches(&line.kind)
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_matches_everything() {
        let line = CartLine::purchase(UserId::new(), ProductId::new(), 1).unwrap();
        assert!(LineQuery::new().matches(&line));
    }

    #[test]
    fn user_and_status_filters() {
        let user = UserId::new();
        let mut line = CartLine::purchase(user, ProductId::new(), 1).unwrap();

        let pending_for_user = LineQuery::for_user(user).payment_status(PaymentStatus::Pending);
        assert!(pending_for_user.matches(&line));
        assert!(!LineQuery::for_user(UserId::new()).matches(&line));

        line.payment_status = PaymentStatus::Paid;
        assert!(!pending_for_user.matches(&line));
    }

    #[test]
    fn order_status_filter_excludes_unset() {
        let mut line = CartLine::purchase(UserId::new(), ProductId::new(), 1).unwrap();
        let shipped = LineQuery::new().order_status(OrderStatus::Shipped);
        assert!(!shipped.matches(&line));

        line.order_status = Some(OrderStatus::Shipped);
        assert!(shipped.matches(&line));
    }

    #[test]
    fn kind_filter() {
        let line = CartLine::purchase(UserId::new(), ProductId::new(), 1).unwrap();
        assert!(LineQuery::new().purchases().matches(&line));
        assert!(!LineQuery::new().appointments().matches(&line));
    }

    #[test]
    fn builder_chain() {
        let user = UserId::new();
        let product = ProductId::new();
        let query = LineQuery::new()
            .user_id(user)
            .product_id(product)
            .order_status(OrderStatus::Processing)
            .limit(10)
            .offset(5);

        assert_eq!(query.user_id, Some(user));
        assert_eq!(query.product_id, Some(product));
        assert_eq!(query.order_status, Some(OrderStatus::Processing));
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.offset, Some(5));
    }
}
