use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use configs::{AppConfig, ListingConfig};
use service::auth::domain::RegisterInput;
use service::auth::repo::StoreAuthRepository;
use service::auth::{AuthConfig, AuthService};
use service::dashboard_service::DashboardService;
use service::preferences::PreferencesStore;
use service::profile_service::ProfileService;
use service::seed;
use service::settings_service::SettingsService;
use service::store_service::{NotificationService, OrderService, ProductService, UserService};
use service::ServiceError;

/// Everything the handlers reach through `State`.
pub struct AppContext {
    pub users: Arc<UserService>,
    pub products: Arc<ProductService>,
    pub orders: Arc<OrderService>,
    pub notifications: Arc<NotificationService>,
    pub auth: Arc<AuthService<StoreAuthRepository>>,
    pub profile: ProfileService<StoreAuthRepository>,
    pub settings: SettingsService,
    pub preferences: PreferencesStore,
    pub dashboard: DashboardService,
    pub listing: ListingConfig,
}

pub type AppState = Arc<AppContext>;

struct Stores {
    users: UserService,
    products: ProductService,
    orders: OrderService,
    notifications: NotificationService,
    settings: SettingsService,
    preferences: PreferencesStore,
}

fn auth_service(cfg: &AppConfig, accounts: StoreAuthRepository) -> Arc<AuthService<StoreAuthRepository>> {
    let auth_cfg = AuthConfig::new(cfg.auth.jwt_secret.clone(), cfg.auth.token_ttl_hours);
    Arc::new(AuthService::new(Arc::new(accounts), auth_cfg))
}

impl AppContext {
    /// Open every JSON store under `storage.data_dir`.
    pub async fn open(cfg: &AppConfig) -> Result<Self, ServiceError> {
        let stores = Stores {
            users: UserService::open(cfg.data_file("users.json")).await?,
            products: ProductService::open(cfg.data_file("products.json")).await?,
            orders: OrderService::open(cfg.data_file("orders.json")).await?,
            notifications: NotificationService::open(cfg.data_file("notifications.json")).await?,
            settings: SettingsService::open(cfg.data_file("settings.json")).await?,
            preferences: PreferencesStore::open(cfg.data_file("preferences.json")).await?,
        };
        let auth = auth_service(cfg, StoreAuthRepository::open(cfg.data_file("accounts.json")).await?);
        let profile = ProfileService::open(
            cfg.data_file("profile.json"),
            || seed::demo_profile(Utc::now()),
            auth.clone(),
            stores.settings.clone(),
        )
        .await?;
        Ok(Self::assemble(cfg, stores, auth, profile))
    }

    /// Same wiring with nothing written to disk.
    pub fn in_memory(cfg: &AppConfig) -> Self {
        let stores = Stores {
            users: UserService::in_memory(),
            products: ProductService::in_memory(),
            orders: OrderService::in_memory(),
            notifications: NotificationService::in_memory(),
            settings: SettingsService::in_memory(),
            preferences: PreferencesStore::in_memory(),
        };
        let auth = auth_service(cfg, StoreAuthRepository::in_memory());
        let profile = ProfileService::in_memory(seed::demo_profile(Utc::now()), auth.clone(), stores.settings.clone());
        Self::assemble(cfg, stores, auth, profile)
    }

    fn assemble(
        cfg: &AppConfig,
        stores: Stores,
        auth: Arc<AuthService<StoreAuthRepository>>,
        profile: ProfileService<StoreAuthRepository>,
    ) -> Self {
        let users = Arc::new(stores.users);
        let products = Arc::new(stores.products);
        let orders = Arc::new(stores.orders);
        let dashboard = DashboardService::new(users.clone(), products.clone(), orders.clone());
        Self {
            users,
            products,
            orders,
            notifications: Arc::new(stores.notifications),
            auth,
            profile,
            settings: stores.settings,
            preferences: stores.preferences,
            dashboard,
            listing: cfg.listing.clone(),
        }
    }

    /// Create the administrator account if missing and seed empty stores when enabled.
    pub async fn bootstrap(&self, cfg: &AppConfig) -> Result<(), ServiceError> {
        let profile = self.profile.get().await;
        let created = self
            .auth
            .ensure_user(RegisterInput {
                username: cfg.auth.admin_username.clone(),
                email: profile.email.clone(),
                name: profile.full_name(),
                password: cfg.auth.admin_password.clone(),
            })
            .await?;
        if created {
            info!(username = %cfg.auth.admin_username, "admin account created");
        }
        if cfg.storage.seed_demo_data {
            seed::load_demo_data(&self.users, &self.products, &self.orders, &self.notifications, Utc::now()).await?;
        }
        Ok(())
    }
}
