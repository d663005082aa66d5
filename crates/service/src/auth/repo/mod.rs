pub mod store;

pub use store::StoreAuthRepository;
