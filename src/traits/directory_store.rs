use anyhow::Result;

/// Multi-valued attribute access on directory entries.
#[trait_variant::make(DirectoryStore: Send)]
pub trait UnsendDirectoryStore {
    /// An entry without the attribute yields an empty list.
    async fn read_values(&self, entry: &str, attribute: &str) -> Result<Vec<String>>;
    async fn add_value(&self, entry: &str, attribute: &str, value: &str) -> Result<()>;
    /// Removes `old` and adds `new` as one modification.
    async fn replace_value(&self, entry: &str, attribute: &str, old: &str, new: &str) -> Result<()>;
    async fn delete_value(&self, entry: &str, attribute: &str, value: &str) -> Result<bool>;
}
