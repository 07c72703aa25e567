use mailsort_core::DEFAULT_CATEGORIES;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Known category names in registration order. Grows only; there is no removal.
#[derive(Clone)]
pub struct CategoryRegistry {
    names: Arc<RwLock<Vec<String>>>,
}

impl CategoryRegistry {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !unique.contains(&name) {
                unique.push(name);
            }
        }

        Self {
            names: Arc::new(RwLock::new(unique)),
        }
    }

    pub async fn list(&self) -> Vec<String> {
        self.names.read().await.clone()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.names.read().await.iter().any(|known| known == name)
    }

    /// Appends `name` unless an identical entry exists. Returns whether it was added.
    pub async fn register(&self, name: &str) -> bool {
        let mut guard = self.names.write().await;
        if guard.iter().any(|known| known == name) {
            return false;
        }

        guard.push(name.to_string());
        tracing::debug!(category = %name, "registered category");
        true
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORIES)
    }
}
