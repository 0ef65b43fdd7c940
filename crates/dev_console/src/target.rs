use std::{cell::RefCell, collections::HashMap, rc::Rc};

use console_contract::TargetMode;

use crate::registry::{CommandRegistry, Instance, TypeKey};

/// Host capability that enumerates live instances of a type.
pub trait InstanceLookup {
    /// Every live instance of `ty`, in the host's order.
    fn find_all(&self, ty: &TypeKey) -> Vec<Instance>;

    /// The one instance the host selects for `ty`, if any.
    fn find_single(&self, ty: &TypeKey) -> Option<Instance> {
        self.find_all(ty).into_iter().next()
    }
}

impl<F> InstanceLookup for F
where
    F: Fn(&TypeKey) -> Vec<Instance>,
{
    fn find_all(&self, ty: &TypeKey) -> Vec<Instance> {
        self(ty)
    }
}

/// Lookup for hosts without an object universe.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInstances;

impl InstanceLookup for NoInstances {
    fn find_all(&self, _ty: &TypeKey) -> Vec<Instance> {
        Vec::new()
    }
}

/// Simple in-memory object universe keyed by type.
#[derive(Clone, Default)]
pub struct InstancePool {
    live: Rc<RefCell<HashMap<TypeKey, Vec<Instance>>>>,
}

impl InstancePool {
    /// Adds a live instance and returns it.
    pub fn spawn<T: 'static>(&self, instance: T) -> Rc<T> {
        let instance = Rc::new(instance);
        let erased: Instance = instance.clone();
        self.live
            .borrow_mut()
            .entry(TypeKey::of::<T>())
            .or_default()
            .push(erased);
        instance
    }

    /// Removes a previously spawned instance. Returns whether it was live.
    pub fn despawn<T: 'static>(&self, instance: &Rc<T>) -> bool {
        let mut live = self.live.borrow_mut();
        let Some(instances) = live.get_mut(&TypeKey::of::<T>()) else {
            return false;
        };
        let before = instances.len();
        instances.retain(|candidate| {
            !candidate
                .downcast_ref::<T>()
                .is_some_and(|candidate| std::ptr::eq(candidate, Rc::as_ptr(instance)))
        });
        before != instances.len()
    }

    /// Number of live instances of `T`.
    pub fn count<T: 'static>(&self) -> usize {
        self.live
            .borrow()
            .get(&TypeKey::of::<T>())
            .map_or(0, Vec::len)
    }
}

impl InstanceLookup for InstancePool {
    fn find_all(&self, ty: &TypeKey) -> Vec<Instance> {
        self.live.borrow().get(ty).cloned().unwrap_or_default()
    }
}

/// Turns a target mode into the receivers a call should run against.
#[derive(Clone)]
pub struct TargetResolver {
    lookup: Rc<dyn InstanceLookup>,
}

impl Default for TargetResolver {
    fn default() -> Self {
        Self::new(NoInstances)
    }
}

impl TargetResolver {
    /// Resolver over the given host lookup.
    pub fn new(lookup: impl InstanceLookup + 'static) -> Self {
        Self {
            lookup: Rc::new(lookup),
        }
    }

    /// Receivers for `ty` under `mode`. Direct mode has no receivers.
    pub fn resolve(
        &self,
        ty: &TypeKey,
        mode: TargetMode,
        registry: &CommandRegistry,
    ) -> Vec<Instance> {
        match mode {
            TargetMode::Direct => Vec::new(),
            TargetMode::Single => self.lookup.find_single(ty).into_iter().collect(),
            TargetMode::All => self.lookup.find_all(ty),
            TargetMode::Registry => registry.singleton(ty).into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Crate(u32);

    fn ids(instances: &[Instance]) -> Vec<u32> {
        instances
            .iter()
            .filter_map(|instance| instance.downcast_ref::<Crate>())
            .map(|item| item.0)
            .collect()
    }

    #[test]
    fn modes_pick_receivers_from_their_source() {
        let pool = InstancePool::default();
        pool.spawn(Crate(1));
        pool.spawn(Crate(2));
        let registry = CommandRegistry::default();
        registry.register_singleton(Rc::new(Crate(9)));

        let resolver = TargetResolver::new(pool);
        let key = TypeKey::of::<Crate>();
        let resolve = |mode| ids(&resolver.resolve(&key, mode, &registry));
        assert_eq!(resolve(TargetMode::All), vec![1, 2]);
        assert_eq!(resolve(TargetMode::Single), vec![1]);
        assert_eq!(resolve(TargetMode::Registry), vec![9]);
        assert!(resolver.resolve(&key, TargetMode::Direct, &registry).is_empty());
    }

    #[test]
    fn despawned_instances_are_no_longer_targets() {
        let pool = InstancePool::default();
        let first = pool.spawn(Crate(1));
        pool.spawn(Crate(2));
        assert!(pool.despawn(&first));
        assert!(!pool.despawn(&first));
        assert_eq!(pool.count::<Crate>(), 1);
        assert_eq!(ids(&pool.find_all(&TypeKey::of::<Crate>())), vec![2]);
    }

    #[test]
    fn closures_act_as_lookups() {
        let lookup = |_: &TypeKey| -> Vec<Instance> {
            vec![Rc::new(Crate(5)) as Instance, Rc::new(Crate(6)) as Instance]
        };
        let single = lookup
            .find_single(&TypeKey::of::<Crate>())
            .into_iter()
            .collect::<Vec<_>>();
        assert_eq!(ids(&single), vec![5]);
        assert!(NoInstances.find_all(&TypeKey::of::<Crate>()).is_empty());
    }
}
