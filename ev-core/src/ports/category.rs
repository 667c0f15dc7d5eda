use crate::models::Category;
use std::future::Future;

/// Storage of the admin-managed category list.
///
/// The base set is implied and need not be stored.
pub trait CategoryRepository: super::Repository {
    /// The stored tags, in insertion order
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send;

    /// Store a tag; returns false if it was already present
    fn add_category(
        &self,
        category: &Category,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Forget a tag; returns false if it was not present
    fn remove_category(
        &self,
        category: &Category,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}
