//! Type-keyed singleton registry.

use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::provision::{ConfigurationBundle, ProvisionError, Resource};

type Instance = Arc<dyn Any + Send + Sync>;

/// One resource type's storage: empty until the first successful build.
struct Slot {
    name: &'static str,
    cell: OnceCell<Instance>,
}

/// Holds at most one instance of each [`Resource`] type.
///
/// Slots are created on demand; the `OnceCell` inside each slot guarantees a
/// single construction even when many tasks ask at once.
pub struct ServiceRegistry {
    bundle: ConfigurationBundle,
    slots: DashMap<TypeId, Arc<Slot>>,
}

impl ServiceRegistry {
    /// Create an empty registry. Nothing is constructed yet.
    pub fn new(bundle: ConfigurationBundle) -> Self {
        Self {
            bundle,
            slots: DashMap::new(),
        }
    }

    /// Get the instance of `T`, constructing it on first use.
    ///
    /// Concurrent first callers wait on a single construction and all receive
    /// the same `Arc`. A failed construction is returned to the caller that
    /// ran it and the slot stays empty; each waiting caller then retries in
    /// turn, one construction at a time.
    pub async fn get<T: Resource>(&self) -> Result<Arc<T>, ProvisionError> {
        let slot = self.slot::<T>();

        let instance = slot
            .cell
            .get_or_try_init(|| async {
                tracing::debug!(resource = T::NAME, "Constructing resource");
                let value = T::construct(&self.bundle).await.map_err(|e| {
                    tracing::error!(resource = T::NAME, error = %e, "Resource construction failed");
                    e
                })?;
                tracing::info!(resource = T::NAME, "Resource constructed");
                Ok::<Instance, ProvisionError>(Arc::new(value))
            })
            .await?;

        Arc::clone(instance)
            .downcast::<T>()
            .map_err(|_| ProvisionError::TypeMismatch(T::NAME))
    }

    /// Whether `T` has been constructed.
    pub fn is_provisioned<T: Resource>(&self) -> bool {
        self.slots
            .get(&TypeId::of::<T>())
            .is_some_and(|slot| slot.cell.initialized())
    }

    /// Names of every constructed resource, sorted.
    pub fn provisioned(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .slots
            .iter()
            .filter(|entry| entry.value().cell.initialized())
            .map(|entry| entry.value().name)
            .collect();
        names.sort_unstable();
        names
    }

    fn slot<T: Resource>(&self) -> Arc<Slot> {
        // The map guard is released before any await.
        let entry = self.slots.entry(TypeId::of::<T>()).or_insert_with(|| {
            Arc::new(Slot {
                name: T::NAME,
                cell: OnceCell::new(),
            })
        });
        Arc::clone(entry.value())
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("bundle", &self.bundle)
            .field("provisioned", &self.provisioned())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn bundle() -> ConfigurationBundle {
        ConfigurationBundle {
            images3_conf: PathBuf::from("images3.toml"),
            imageprocessor_conf: PathBuf::from("imageprocessor.toml"),
            mongodb_conf: PathBuf::from("mongodb.toml"),
        }
    }

    static SLOW_BUILDS: AtomicUsize = AtomicUsize::new(0);

    struct SlowResource {
        serial: usize,
    }

    impl Resource for SlowResource {
        const NAME: &'static str = "SlowResource";

        async fn construct(_bundle: &ConfigurationBundle) -> Result<Self, ProvisionError> {
            let serial = SLOW_BUILDS.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(Self { serial })
        }
    }

    static FLAKY_ATTEMPTS: AtomicUsize = AtomicUsize::new(0);

    struct FlakyResource;

    impl Resource for FlakyResource {
        const NAME: &'static str = "FlakyResource";

        async fn construct(_bundle: &ConfigurationBundle) -> Result<Self, ProvisionError> {
            if FLAKY_ATTEMPTS.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ProvisionError::Timeout(Duration::from_secs(1)))
            } else {
                Ok(Self)
            }
        }
    }

    static DOOMED_ATTEMPTS: AtomicUsize = AtomicUsize::new(0);

    struct DoomedResource;

    impl Resource for DoomedResource {
        const NAME: &'static str = "DoomedResource";

        async fn construct(_bundle: &ConfigurationBundle) -> Result<Self, ProvisionError> {
            DOOMED_ATTEMPTS.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err(ProvisionError::TypeMismatch("DoomedResource"))
        }
    }

    struct Marker;

    impl Resource for Marker {
        const NAME: &'static str = "Marker";

        async fn construct(_bundle: &ConfigurationBundle) -> Result<Self, ProvisionError> {
            Ok(Self)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_access_builds_once() {
        let registry = Arc::new(ServiceRegistry::new(bundle()));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..16 {
            let registry = registry.clone();
            tasks.spawn(async move { registry.get::<SlowResource>().await.unwrap() });
        }

        let mut instances = Vec::new();
        while let Some(result) = tasks.join_next().await {
            instances.push(result.unwrap());
        }

        assert_eq!(instances.len(), 16);
        assert_eq!(SLOW_BUILDS.load(Ordering::SeqCst), 1);
        for instance in &instances {
            assert!(Arc::ptr_eq(instance, &instances[0]));
            assert_eq!(instance.serial, 0);
        }
    }

    #[tokio::test]
    async fn test_failed_construction_not_cached() {
        let registry = ServiceRegistry::new(bundle());

        let first = registry.get::<FlakyResource>().await;
        assert!(matches!(first, Err(ProvisionError::Timeout(_))));
        assert!(!registry.is_provisioned::<FlakyResource>());

        let second = registry.get::<FlakyResource>().await;
        assert!(second.is_ok());
        assert!(registry.is_provisioned::<FlakyResource>());
        assert_eq!(FLAKY_ATTEMPTS.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_failures_retry_in_turn() {
        let registry = Arc::new(ServiceRegistry::new(bundle()));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let registry = registry.clone();
            tasks.spawn(async move { registry.get::<DoomedResource>().await.is_err() });
        }

        while let Some(result) = tasks.join_next().await {
            assert!(result.unwrap());
        }

        assert_eq!(DOOMED_ATTEMPTS.load(Ordering::SeqCst), 8);
        assert!(!registry.is_provisioned::<DoomedResource>());
    }

    #[tokio::test]
    async fn test_provisioned_names() {
        let registry = ServiceRegistry::new(bundle());
        assert!(registry.provisioned().is_empty());
        assert!(!registry.is_provisioned::<Marker>());

        let a = registry.get::<Marker>().await.unwrap();
        let b = registry.get::<Marker>().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.provisioned(), vec!["Marker"]);
    }
}
