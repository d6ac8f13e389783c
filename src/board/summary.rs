use suds_common::Task;

/// Revenue totals over a set of orders. Orders without a price count as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceSummary {
    pub total_revenue: f64,
    pub paid_amount: f64,
    pub pending_amount: f64,
    pub order_count: usize,
    pub paid_orders: usize,
    pub unpaid_orders: usize,
}

impl PriceSummary {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut summary = Self::default();
        for task in tasks {
            let price = task.total_price.unwrap_or(0.0);
            summary.total_revenue += price;
            summary.order_count += 1;
            if task.is_paid {
                summary.paid_amount += price;
                summary.paid_orders += 1;
            } else {
                summary.unpaid_orders += 1;
            }
        }
        summary.pending_amount = summary.total_revenue - summary.paid_amount;
        summary
    }
}
