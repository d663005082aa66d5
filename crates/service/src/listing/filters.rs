use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use models::notification::{Notification, NotificationCategory, NotificationType};
use models::order::{Order, OrderStatus, PaymentStatus};
use models::product::{Product, ProductStatus};
use models::user::UserData;

use super::Listable;
use crate::errors::ServiceError;

fn unknown_filter(entity: &str, name: &str) -> ServiceError {
    ServiceError::Validation(format!("unknown {entity} filter: {name}"))
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ServiceError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ServiceError::Validation(format!("{name} must be true or false"))),
    }
}

/// Lower bound of a date filter. A bare date means the start of that day (UTC).
fn parse_start(name: &str, value: &str) -> Result<DateTime<Utc>, ServiceError> {
    parse_instant(name, value, NaiveTime::MIN)
}

/// Upper bound of a date filter. A bare date covers that whole day (UTC).
fn parse_end(name: &str, value: &str) -> Result<DateTime<Utc>, ServiceError> {
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    parse_instant(name, value, end_of_day)
}

fn parse_instant(name: &str, value: &str, day_time: NaiveTime) -> Result<DateTime<Utc>, ServiceError> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.and_time(day_time).and_utc())
        .map_err(|_| ServiceError::Validation(format!("{name} must be RFC 3339 or YYYY-MM-DD")))
}

/// Users only support free-text search.
#[derive(Debug)]
pub enum UserFilter {}

impl Listable for UserData {
    type Filter = UserFilter;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.username.as_str()]
    }

    fn parse_filter(name: &str, _value: &str) -> Result<UserFilter, ServiceError> {
        Err(unknown_filter("user", name))
    }

    fn matches(&self, filter: &UserFilter) -> bool {
        match *filter {}
    }
}

#[derive(Debug)]
pub enum ProductFilter {
    Category(String),
    Status(ProductStatus),
}

impl Listable for Product {
    type Filter = ProductFilter;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str(), self.category.as_str()]
    }

    fn parse_filter(name: &str, value: &str) -> Result<ProductFilter, ServiceError> {
        match name {
            "category" => Ok(ProductFilter::Category(value.to_string())),
            "status" => Ok(ProductFilter::Status(value.parse()?)),
            _ => Err(unknown_filter("product", name)),
        }
    }

    fn matches(&self, filter: &ProductFilter) -> bool {
        match filter {
            ProductFilter::Category(c) => self.category == *c,
            ProductFilter::Status(s) => self.status == *s,
        }
    }
}

#[derive(Debug)]
pub enum OrderFilter {
    Status(OrderStatus),
    PaymentStatus(PaymentStatus),
    CreatedFrom(DateTime<Utc>),
    CreatedUntil(DateTime<Utc>),
}

impl Listable for Order {
    type Filter = OrderFilter;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.order_number.as_str(), self.customer_name.as_str(), self.customer_email.as_str()]
    }

    fn parse_filter(name: &str, value: &str) -> Result<OrderFilter, ServiceError> {
        match name {
            "status" => Ok(OrderFilter::Status(value.parse()?)),
            "payment_status" => Ok(OrderFilter::PaymentStatus(value.parse()?)),
            "start_date" => parse_start(name, value).map(OrderFilter::CreatedFrom),
            "end_date" => parse_end(name, value).map(OrderFilter::CreatedUntil),
            _ => Err(unknown_filter("order", name)),
        }
    }

    fn matches(&self, filter: &OrderFilter) -> bool {
        match filter {
            OrderFilter::Status(s) => self.status == *s,
            OrderFilter::PaymentStatus(p) => self.payment_status == *p,
            OrderFilter::CreatedFrom(from) => self.created_at >= *from,
            OrderFilter::CreatedUntil(until) => self.created_at <= *until,
        }
    }
}

#[derive(Debug)]
pub enum NotificationFilter {
    Kind(NotificationType),
    Category(NotificationCategory),
    Read(bool),
}

impl Listable for Notification {
    type Filter = NotificationFilter;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.message.as_str()]
    }

    fn parse_filter(name: &str, value: &str) -> Result<NotificationFilter, ServiceError> {
        match name {
            "type" => Ok(NotificationFilter::Kind(value.parse()?)),
            "category" => Ok(NotificationFilter::Category(value.parse()?)),
            "read" => parse_bool(name, value).map(NotificationFilter::Read),
            _ => Err(unknown_filter("notification", name)),
        }
    }

    fn matches(&self, filter: &NotificationFilter) -> bool {
        match filter {
            NotificationFilter::Kind(k) => self.kind == *k,
            NotificationFilter::Category(c) => self.category == *c,
            NotificationFilter::Read(r) => self.read == *r,
        }
    }

    /// Newest first.
    fn listing_order(a: &Self, b: &Self) -> Ordering {
        b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{run_query, ListQuery};
    use crate::seed;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 21, 1, 25, 28).unwrap()
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let products = seed::demo_products();
        let page = run_query(products, &ListQuery::new(10).with_search("lap")).unwrap();
        assert!(page.total >= 1);
        assert!(page.items.iter().any(|p| p.name == "Laptop ABC"));
        assert!(page.items.iter().all(|p| {
            let hay = format!("{} {} {}", p.name, p.description, p.category).to_lowercase();
            hay.contains("lap")
        }));
    }

    #[test]
    fn unknown_filter_is_rejected() {
        let err = run_query(seed::demo_users(), &ListQuery::new(10).with_filter("role", "admin")).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn bad_filter_value_is_rejected() {
        let err = run_query(seed::demo_orders(now()), &ListQuery::new(10).with_filter("status", "lost")).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = run_query(seed::demo_orders(now()), &ListQuery::new(10).with_filter("start_date", "yesterday")).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let orders = seed::demo_orders(now());
        let day = orders[0].created_at.date_naive().format("%Y-%m-%d").to_string();
        let q = ListQuery::new(100).with_filter("start_date", day.clone()).with_filter("end_date", day);
        let page = run_query(orders.clone(), &q).unwrap();
        let expected = orders.iter().filter(|o| o.created_at.date_naive() == orders[0].created_at.date_naive()).count();
        assert_eq!(page.total as usize, expected);
        assert!(page.items.iter().any(|o| o.id == orders[0].id));

        let exact = orders[0].created_at.to_rfc3339();
        let q = ListQuery::new(100).with_filter("start_date", exact.clone()).with_filter("end_date", exact);
        let page = run_query(orders.clone(), &q).unwrap();
        assert!(page.items.iter().any(|o| o.id == orders[0].id));
    }

    #[test]
    fn notifications_list_newest_first_and_filter_by_read() {
        let all = run_query(seed::demo_notifications(now()), &ListQuery::new(10)).unwrap();
        let ids: Vec<_> = all.items.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4"]);

        let unread = run_query(seed::demo_notifications(now()), &ListQuery::new(10).with_filter("read", "false")).unwrap();
        assert_eq!(unread.total, 2);
        let system = run_query(seed::demo_notifications(now()), &ListQuery::new(10).with_filter("category", "system")).unwrap();
        assert_eq!(system.total, 1);
        let errors = run_query(seed::demo_notifications(now()), &ListQuery::new(10).with_filter("type", "error")).unwrap();
        assert_eq!(errors.items[0].id, "4");
    }

    #[test]
    fn pagination_applies_after_filtering() {
        let products = seed::demo_products();
        let active = products.iter().filter(|p| p.status == ProductStatus::Active).count() as u64;
        let q = ListQuery::new(5).with_filter("status", "active").with_page(2);
        let page = run_query(products, &q).unwrap();
        assert_eq!(page.total, active);
        assert_eq!(page.items.len() as u64, (active - 5).min(5));
        assert!(page.items.iter().all(|p| p.status == ProductStatus::Active));
    }
}
