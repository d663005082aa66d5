//! Deterministic demo data for empty stores.
//!
//! Everything here is a pure function of its arguments so tests can rely on
//! exact counts and orderings.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde_json::json;
use tracing::info;

use models::notification::{Notification, NotificationCategory, NotificationType};
use models::order::{order_number, Order, OrderItem, OrderStatus, PaymentStatus, ShippingAddress};
use models::product::{Product, ProductStatus};
use models::profile::{ProfileAddress, ProfilePreferences, UserProfile};
use models::user::{Address, Company, UserData};

use crate::errors::ServiceError;
use crate::store_service::{NotificationService, OrderService, ProductService, UserService};

const FIRST_NAMES: [&str; 10] = ["Leanne", "Ervin", "Clementine", "Patricia", "Chelsey", "Dennis", "Kurtis", "Nicholas", "Glenna", "Clementina"];
const LAST_NAMES: [&str; 10] = ["Graham", "Howell", "Bauch", "Lebsack", "Dietrich", "Schulist", "Weissnat", "Runolfsdottir", "Reichert", "DuBuque"];
const CITIES: [&str; 5] = ["Ha Noi", "Ho Chi Minh", "Da Nang", "Hai Phong", "Can Tho"];

pub fn demo_users() -> Vec<UserData> {
    FIRST_NAMES
        .iter()
        .zip(LAST_NAMES.iter())
        .enumerate()
        .map(|(idx, (first, last))| {
            let id = idx as u64 + 1;
            let username = format!("{}{}", first.to_lowercase(), id);
            UserData {
                id,
                name: format!("{first} {last}"),
                email: format!("{username}@example.com"),
                username,
                phone: format!("090{:07}", 1_234_567 + id * 1_111),
                website: format!("{}.example.org", last.to_lowercase()),
                company: Company {
                    name: format!("{last} Group"),
                    catch_phrase: "Multi-layered client-server neural-net".into(),
                    bs: "harness real-time e-markets".into(),
                },
                address: Address {
                    street: format!("{} Le Loi", 10 + id),
                    suite: format!("Apt. {}", 100 + id),
                    city: CITIES[idx % CITIES.len()].into(),
                    zipcode: format!("{:05}", 10_000 + id),
                },
            }
        })
        .collect()
}

pub fn demo_products() -> Vec<Product> {
    let rows: [(&str, &str, f64, &str, u32, ProductStatus); 12] = [
        ("Laptop ABC", "14 inch ultrabook, 16GB RAM", 15_990_000.0, "electronics", 25, ProductStatus::Active),
        ("Wireless Mouse", "Silent clicks, 2.4GHz receiver", 250_000.0, "accessories", 120, ProductStatus::Active),
        ("Mechanical Keyboard", "Hot-swappable brown switches", 1_450_000.0, "accessories", 8, ProductStatus::Active),
        ("27 inch Monitor", "QHD IPS panel", 6_500_000.0, "electronics", 14, ProductStatus::Active),
        ("USB-C Hub", "7-in-1 adapter", 590_000.0, "accessories", 0, ProductStatus::Inactive),
        ("Noise Cancelling Headphones", "Over-ear, 30h battery", 4_200_000.0, "audio", 32, ProductStatus::Active),
        ("Smartphone XYZ", "6.5 inch OLED, 128GB", 9_990_000.0, "electronics", 5, ProductStatus::Active),
        ("Laptop Stand", "Aluminium, adjustable height", 420_000.0, "accessories", 60, ProductStatus::Active),
        ("Bluetooth Speaker", "Waterproof portable speaker", 1_150_000.0, "audio", 0, ProductStatus::Inactive),
        ("External SSD 1TB", "USB 3.2 Gen 2", 2_300_000.0, "storage", 40, ProductStatus::Active),
        ("Webcam HD", "1080p with privacy shutter", 890_000.0, "accessories", 18, ProductStatus::Active),
        ("Gaming Chair", "Ergonomic with lumbar support", 3_800_000.0, "furniture", 3, ProductStatus::Inactive),
    ];
    rows.into_iter()
        .enumerate()
        .map(|(idx, (name, description, price, category, stock, status))| {
            let id = idx as u64 + 1;
            Product {
                id,
                name: name.into(),
                description: description.into(),
                price,
                category: category.into(),
                stock,
                image: format!("/images/products/{id}.png"),
                status,
            }
        })
        .collect()
}

/// Twenty orders spread over the week before `now`, newest first by id.
/// Three of them are cancelled; the rest cycle through the other statuses.
pub fn demo_orders(now: DateTime<Utc>) -> Vec<Order> {
    let users = demo_users();
    let products = demo_products();
    (0..20usize)
        .map(|idx| {
            let id = idx as u64 + 1;
            let status = if idx % 6 == 5 { OrderStatus::Cancelled } else { OrderStatus::ALL[idx % 4] };
            let paid = matches!(status, OrderStatus::Shipped | OrderStatus::Delivered)
                || (status != OrderStatus::Cancelled && idx % 3 == 0);
            let user = &users[idx % users.len()];
            let created_at = now - Duration::hours(idx as i64 * 8);

            let picks = [idx % products.len(), (idx * 5 + 3) % products.len()];
            let line_count = 1 + idx % 2;
            let items: Vec<OrderItem> = picks[..line_count]
                .iter()
                .enumerate()
                .map(|(line, &p)| {
                    let product = &products[p];
                    let quantity = 1 + ((idx + line) % 3) as u32;
                    let price = product.price.round() as u64;
                    OrderItem {
                        id: line as u64 + 1,
                        product_id: product.id,
                        product_name: product.name.clone(),
                        product_image: product.image.clone(),
                        quantity,
                        price,
                        subtotal: price * u64::from(quantity),
                    }
                })
                .collect();
            let total_amount = items.iter().map(|i| i.subtotal).sum();

            Order {
                id,
                order_number: order_number(created_at.year(), id),
                user_id: user.id,
                customer_name: user.name.clone(),
                customer_email: user.email.clone(),
                customer_phone: user.phone.clone(),
                shipping_address: ShippingAddress {
                    street: user.address.street.clone(),
                    city: user.address.city.clone(),
                    state: user.address.city.clone(),
                    zip_code: user.address.zipcode.clone(),
                },
                items,
                status,
                total_amount,
                payment_method: if idx % 2 == 0 { "COD".into() } else { "Bank transfer".into() },
                payment_status: if paid { PaymentStatus::Paid } else { PaymentStatus::Unpaid },
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}

/// Four notifications: two unread (newest), two read.
pub fn demo_notifications(now: DateTime<Utc>) -> Vec<Notification> {
    vec![
        Notification {
            id: "1".into(),
            kind: NotificationType::Success,
            title: "New order".into(),
            message: "Order ORD-0001 has been placed".into(),
            link_to: Some("/orders/1".into()),
            read: false,
            created_at: now - Duration::minutes(5),
            category: NotificationCategory::Order,
            data: Some(json!({ "order_id": 1 })),
        },
        Notification {
            id: "2".into(),
            kind: NotificationType::Warning,
            title: "Low stock".into(),
            message: "Smartphone XYZ has only 5 units left".into(),
            link_to: Some("/products/7".into()),
            read: false,
            created_at: now - Duration::minutes(30),
            category: NotificationCategory::Product,
            data: Some(json!({ "product_id": 7, "stock": 5 })),
        },
        Notification {
            id: "3".into(),
            kind: NotificationType::Info,
            title: "New user".into(),
            message: "Clementina DuBuque signed up".into(),
            link_to: Some("/users/10".into()),
            read: true,
            created_at: now - Duration::hours(2),
            category: NotificationCategory::User,
            data: None,
        },
        Notification {
            id: "4".into(),
            kind: NotificationType::Error,
            title: "Backup failed".into(),
            message: "Nightly backup could not reach the storage bucket".into(),
            link_to: None,
            read: true,
            created_at: now - Duration::hours(24),
            category: NotificationCategory::System,
            data: None,
        },
    ]
}

pub fn demo_profile(now: DateTime<Utc>) -> UserProfile {
    UserProfile {
        id: 1,
        username: "admin".into(),
        email: "admin@example.com".into(),
        first_name: "Viet".into(),
        last_name: "Le".into(),
        avatar: None,
        phone_number: Some("0987654321".into()),
        address: Some(ProfileAddress {
            street: Some("1 Trang Tien".into()),
            city: Some("Ha Noi".into()),
            state: None,
            zip_code: Some("100000".into()),
            country: Some("Viet Nam".into()),
        }),
        biography: Some("Store administrator".into()),
        role: "Admin".into(),
        permissions: ["manage_users", "manage_products", "manage_orders", "manage_settings"]
            .into_iter()
            .map(String::from)
            .collect(),
        last_login: None,
        created_at: now - Duration::days(365),
        updated_at: now,
        preferences: ProfilePreferences::default(),
    }
}

/// Fill whichever entity stores are still empty with demo records.
pub async fn load_demo_data(
    users: &UserService,
    products: &ProductService,
    orders: &OrderService,
    notifications: &NotificationService,
    now: DateTime<Utc>,
) -> Result<(), ServiceError> {
    let seeded = [
        users.seed_if_empty(demo_users()).await?,
        products.seed_if_empty(demo_products()).await?,
        orders.seed_if_empty(demo_orders(now)).await?,
        notifications.seed_if_empty(demo_notifications(now)).await?,
    ];
    info!(
        users = seeded[0],
        products = seeded[1],
        orders = seeded[2],
        notifications = seeded[3],
        "demo data loaded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn orders_cover_every_status_with_three_cancelled() {
        let now = Utc.with_ymd_and_hms(2025, 5, 21, 1, 25, 28).unwrap();
        let orders = demo_orders(now);
        assert_eq!(orders.len(), 20);
        let cancelled = orders.iter().filter(|o| o.status == OrderStatus::Cancelled).count();
        assert_eq!(cancelled, 3);
        for status in OrderStatus::ALL {
            assert!(orders.iter().any(|o| o.status == status), "{status} missing");
        }
        assert!(orders.iter().all(|o| o.total_amount == o.items.iter().map(|i| i.subtotal).sum::<u64>()));
        assert!(orders.iter().all(|o| !(o.status == OrderStatus::Cancelled && o.payment_status == PaymentStatus::Paid)));
    }

    #[test]
    fn ids_are_unique_and_sequential() {
        let users = demo_users();
        assert_eq!(users.len(), 10);
        assert!(users.iter().enumerate().all(|(i, u)| u.id == i as u64 + 1));
        let products = demo_products();
        assert_eq!(products.len(), 12);
        assert!(products.iter().all(|p| p.status == ProductStatus::Inactive || p.stock > 0));
    }

    #[test]
    fn two_of_four_notifications_are_unread() {
        let list = demo_notifications(Utc::now());
        assert_eq!(list.len(), 4);
        assert_eq!(list.iter().filter(|n| !n.read).count(), 2);
    }
}
