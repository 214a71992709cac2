//! Dependency Records
//!
//! A [`Dependency`] describes how to obtain a value of some type: it pairs a
//! factory with the type that factory produces. It does not resolve anything
//! on its own; [`Dependency::provide`] is a bare call of the stored factory.
//!
//! # Identity
//!
//! Dependencies are compared by identity, not by value. Every constructed
//! record gets a fresh [`DependencyId`], so two records built from the same
//! factory are still two different graph citizens. Cloning a record copies the
//! handle and keeps its identity.
//!
//! # Type Erasure
//!
//! Graph nodes hold dependencies of many different types, so they store the
//! erased form, [`AnyDependency`]. The typed record can be recovered with
//! [`AnyDependency::downcast`].

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Runtime identity of a produced type.
///
/// Equality and hashing use the [`TypeId`]; the name is kept for display.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// The key for type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Get the underlying type ID.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Get the type's name as reported by the compiler.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Unique identifier for a dependency record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyId(u64);

impl DependencyId {
    /// Generate a new unique dependency ID.
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// A shared factory producing `T` from arguments `A`.
pub type Factory<T, A> = Arc<dyn Fn(A) -> T + Send + Sync>;

/// How to obtain a value of type `T`.
///
/// # Type Parameters
///
/// - `T`: the produced type.
/// - `A`: the argument the factory takes. Most factories are nullary, so this
///   defaults to `()`.
///
/// # Example
///
/// ```rust
/// use depgraph_core::Dependency;
///
/// let port = Dependency::new(|| 8080u16);
/// assert_eq!(port.provide(), 8080);
/// assert_eq!(port.produces().name(), "u16");
/// ```
pub struct Dependency<T, A = ()> {
    id: DependencyId,
    factory: Factory<T, A>,
    factory_name: &'static str,
    ty: TypeKey,
}

impl<T: 'static> Dependency<T> {
    /// Create a dependency from a nullary factory.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::from_shared(
            Arc::new(move |()| factory()),
            type_name::<F>(),
            TypeKey::of::<T>(),
        )
    }

    /// Invoke the factory.
    pub fn provide(&self) -> T {
        (self.factory)(())
    }
}

impl<T: Default + 'static> Dependency<T> {
    /// A dependency whose factory is the type itself, i.e. `T::default`.
    pub fn of_type() -> Self {
        Self::new(T::default)
    }
}

impl<T: 'static, A: 'static> Dependency<T, A> {
    /// Create a dependency from a factory taking arguments.
    pub fn from_fn<F>(factory: F) -> Self
    where
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        Self::with_type(factory, TypeKey::of::<T>())
    }

    /// Create a dependency with an explicitly supplied type key.
    ///
    /// The key is recorded as given. Nothing checks that it matches `T`.
    pub fn with_type<F>(factory: F, ty: TypeKey) -> Self
    where
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        Self::from_shared(Arc::new(factory), type_name::<F>(), ty)
    }

    pub(crate) fn from_shared(factory: Factory<T, A>, factory_name: &'static str, ty: TypeKey) -> Self {
        Self {
            id: DependencyId::next(),
            factory,
            factory_name,
            ty,
        }
    }

    /// A new record with its own identity that shares this record's factory
    /// but declares `ty` as its type.
    pub fn rebind(&self, ty: TypeKey) -> Self {
        Self::from_shared(self.factory.clone(), self.factory_name, ty)
    }

    /// Get the record's identity.
    pub fn id(&self) -> DependencyId {
        self.id
    }

    /// Get the declared type.
    pub fn produces(&self) -> TypeKey {
        self.ty
    }

    /// Get the factory.
    pub fn factory(&self) -> &Factory<T, A> {
        &self.factory
    }

    /// Get the factory's type name.
    pub fn factory_name(&self) -> &'static str {
        self.factory_name
    }

    /// Invoke the factory with the given arguments.
    pub fn provide_with(&self, args: A) -> T {
        (self.factory)(args)
    }

    /// Erase the produced type so the record can live on a graph node.
    pub fn erase(&self) -> AnyDependency {
        AnyDependency {
            id: self.id,
            ty: self.ty,
            factory_name: self.factory_name,
            inner: Arc::new(self.clone()),
        }
    }
}

impl<T, A> Clone for Dependency<T, A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            factory: self.factory.clone(),
            factory_name: self.factory_name,
            ty: self.ty,
        }
    }
}

impl<T, A> PartialEq for Dependency<T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T, A> Eq for Dependency<T, A> {}

impl<T, A> Hash for Dependency<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T, A> fmt::Debug for Dependency<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dependency(factory={}, type={})", self.factory_name, self.ty)
    }
}

impl<T: 'static, A: 'static> From<Dependency<T, A>> for AnyDependency {
    fn from(dependency: Dependency<T, A>) -> Self {
        dependency.erase()
    }
}

/// A dependency record with its produced type erased.
#[derive(Clone)]
pub struct AnyDependency {
    id: DependencyId,
    ty: TypeKey,
    factory_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl AnyDependency {
    /// Get the record's identity.
    pub fn id(&self) -> DependencyId {
        self.id
    }

    /// Get the declared type.
    pub fn produces(&self) -> TypeKey {
        self.ty
    }

    /// Get the factory's type name.
    pub fn factory_name(&self) -> &'static str {
        self.factory_name
    }

    /// Recover the typed record of a nullary dependency.
    pub fn downcast<T: 'static>(&self) -> Option<&Dependency<T>> {
        self.downcast_with::<T, ()>()
    }

    /// Recover the typed record of a dependency taking arguments `A`.
    pub fn downcast_with<T: 'static, A: 'static>(&self) -> Option<&Dependency<T, A>> {
        self.inner.downcast_ref::<Dependency<T, A>>()
    }
}

impl PartialEq for AnyDependency {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AnyDependency {}

impl Hash for AnyDependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for AnyDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dependency(factory={}, type={})", self.factory_name, self.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_port() -> u16 {
        8080
    }

    #[test]
    fn provide_calls_factory() {
        let dep = Dependency::new(make_port);
        assert_eq!(dep.provide(), 8080);
        assert_eq!(dep.produces(), TypeKey::of::<u16>());
    }

    #[test]
    fn provide_with_forwards_arguments() {
        let dep = Dependency::from_fn(|(a, b): (i32, i32)| a + b);
        assert_eq!(dep.provide_with((2, 3)), 5);
    }

    #[test]
    fn identical_records_are_distinct() {
        let a = Dependency::new(make_port);
        let b = Dependency::new(make_port);
        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());

        // A clone is the same record.
        let c = a.clone();
        assert_eq!(a, c);
    }

    #[test]
    fn with_type_does_not_validate() {
        let dep = Dependency::with_type(|()| 1u8, TypeKey::of::<String>());
        assert_eq!(dep.produces(), TypeKey::of::<String>());
        assert_eq!(dep.provide(), 1);
    }

    #[test]
    fn of_type_uses_default() {
        let dep = Dependency::<Vec<u8>>::of_type();
        assert!(dep.provide().is_empty());
        assert!(dep.factory_name().contains("default"));
    }

    #[test]
    fn rebind_shares_factory_with_new_identity() {
        let dep = Dependency::new(make_port);
        let rebound = dep.rebind(TypeKey::of::<u16>());
        assert_ne!(dep, rebound);
        assert!(Arc::ptr_eq(dep.factory(), rebound.factory()));
        assert_eq!(rebound.provide(), 8080);
    }

    #[test]
    fn erased_record_downcasts() {
        let dep = Dependency::new(make_port);
        let erased = dep.erase();

        assert_eq!(erased.id(), dep.id());
        assert_eq!(erased.produces(), TypeKey::of::<u16>());
        assert!(erased.downcast::<String>().is_none());
        assert_eq!(erased.downcast::<u16>().unwrap().provide(), 8080);
    }

    #[test]
    fn debug_uses_record_form() {
        let dep = Dependency::new(make_port);
        let repr = format!("{:?}", dep);
        assert!(repr.starts_with("Dependency(factory="));
        assert!(repr.ends_with("type=u16)"));
        assert_eq!(repr, format!("{:?}", dep.erase()));
    }
}
