//! Dashboard figures computed from the entity stores.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{Days, NaiveDate};

use models::dashboard::{DashboardStats, ProductStats, SalesData};
use models::order::{Order, OrderStatus, PaymentStatus};

use crate::store_service::{OrderService, ProductService, UserService};

fn counts_as_revenue(order: &Order) -> bool {
    order.payment_status == PaymentStatus::Paid && order.status != OrderStatus::Cancelled
}

pub struct DashboardService {
    users: Arc<UserService>,
    products: Arc<ProductService>,
    orders: Arc<OrderService>,
}

impl DashboardService {
    pub fn new(users: Arc<UserService>, products: Arc<ProductService>, orders: Arc<OrderService>) -> Self {
        Self { users, products, orders }
    }

    pub async fn stats(&self) -> DashboardStats {
        let orders = self.orders.all().await;
        DashboardStats {
            total_users: self.users.all().await.len() as u64,
            total_products: self.products.all().await.len() as u64,
            total_orders: orders.len() as u64,
            revenue: orders.iter().filter(|o| counts_as_revenue(o)).map(|o| o.total_amount).sum(),
        }
    }

    /// Paid sales per day for the `days` days ending at `today` (inclusive), oldest first.
    /// Days without sales are reported with amount 0.
    pub async fn sales(&self, days: u32, today: NaiveDate) -> Vec<SalesData> {
        let start = today.checked_sub_days(Days::new(u64::from(days.saturating_sub(1)))).unwrap_or(today);
        let mut per_day: BTreeMap<NaiveDate, u64> = start
            .iter_days()
            .take_while(|d| *d <= today)
            .map(|d| (d, 0))
            .collect();
        for order in self.orders.all().await.iter().filter(|o| counts_as_revenue(o)) {
            if let Some(amount) = per_day.get_mut(&order.created_at.date_naive()) {
                *amount += order.total_amount;
            }
        }
        per_day.into_iter().map(|(date, amount)| SalesData { date, amount }).collect()
    }

    /// Best sellers by units across non-cancelled orders.
    pub async fn top_products(&self, limit: usize) -> Vec<ProductStats> {
        let mut by_name: HashMap<String, ProductStats> = HashMap::new();
        for order in self.orders.all().await.iter().filter(|o| o.status != OrderStatus::Cancelled) {
            for item in &order.items {
                let entry = by_name
                    .entry(item.product_name.clone())
                    .or_insert_with(|| ProductStats { name: item.product_name.clone(), sales: 0, revenue: 0 });
                entry.sales += u64::from(item.quantity);
                entry.revenue += item.subtotal;
            }
        }
        let mut ranked: Vec<ProductStats> = by_name.into_values().collect();
        ranked.sort_by(|a, b| b.sales.cmp(&a.sales).then_with(|| b.revenue.cmp(&a.revenue)).then_with(|| a.name.cmp(&b.name)));
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use chrono::{TimeZone, Utc};

    async fn dashboard() -> (DashboardService, Vec<Order>) {
        let now = Utc.with_ymd_and_hms(2025, 5, 21, 12, 0, 0).unwrap();
        let users = UserService::in_memory();
        let products = ProductService::in_memory();
        let orders = OrderService::in_memory();
        users.seed_if_empty(seed::demo_users()).await.unwrap();
        products.seed_if_empty(seed::demo_products()).await.unwrap();
        let demo = seed::demo_orders(now);
        orders.seed_if_empty(demo.clone()).await.unwrap();
        (DashboardService::new(Arc::new(users), Arc::new(products), Arc::new(orders)), demo)
    }

    #[tokio::test]
    async fn stats_count_everything_and_sum_paid_revenue() {
        let (dash, orders) = dashboard().await;
        let stats = dash.stats().await;
        assert_eq!((stats.total_users, stats.total_products, stats.total_orders), (10, 12, 20));
        let expected: u64 = orders.iter().filter(|o| counts_as_revenue(o)).map(|o| o.total_amount).sum();
        assert_eq!(stats.revenue, expected);
        assert!(stats.revenue > 0);
    }

    #[tokio::test]
    async fn sales_cover_each_day_of_the_window() {
        let (dash, _) = dashboard().await;
        let today = NaiveDate::from_ymd_opt(2025, 5, 21).unwrap();
        let sales = dash.sales(7, today).await;
        assert_eq!(sales.len(), 7);
        assert_eq!(sales.first().map(|s| s.date), NaiveDate::from_ymd_opt(2025, 5, 15));
        assert_eq!(sales.last().map(|s| s.date), Some(today));
        let total: u64 = sales.iter().map(|s| s.amount).sum();
        assert_eq!(total, dash.stats().await.revenue);
    }

    #[tokio::test]
    async fn top_products_are_ranked_and_limited() {
        let (dash, _) = dashboard().await;
        let top = dash.top_products(5).await;
        assert_eq!(top.len(), 5);
        assert!(top.windows(2).all(|w| w[0].sales >= w[1].sales));
    }
}
