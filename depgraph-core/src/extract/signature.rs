//! Declared Signatures
//!
//! A [`Signature`] is the formal parameter list of something constructible:
//! each parameter has a name, usually a type annotation, and optionally a
//! default that is itself a [`Dependency`].

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::dependency::{AnyDependency, Dependency, TypeKey};

/// Builds the dependency inferred for an annotated parameter.
type Infer = Arc<dyn Fn() -> AnyDependency + Send + Sync>;

/// A parameter's declared type.
#[derive(Clone)]
pub struct Annotation {
    ty: TypeKey,
    infer: Infer,
}

impl Annotation {
    pub fn ty(&self) -> TypeKey {
        self.ty
    }

    /// A fresh dependency record for this parameter.
    pub(crate) fn infer(&self) -> AnyDependency {
        (self.infer)()
    }
}

/// One formal parameter.
#[derive(Clone)]
pub struct Parameter {
    name: String,
    annotation: Option<Annotation>,
    default: Option<AnyDependency>,
}

impl Parameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    /// The default value, when it is a dependency.
    pub fn default(&self) -> Option<&AnyDependency> {
        self.default.as_ref()
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(annotation) = &self.annotation {
            write!(f, ": {}", annotation.ty)?;
        }
        if let Some(default) = &self.default {
            write!(f, " = {:?}", default)?;
        }
        Ok(())
    }
}

/// An ordered formal parameter list.
#[derive(Clone, Default)]
pub struct Signature {
    parameters: SmallVec<[Parameter; 4]>,
}

impl Signature {
    pub fn builder() -> SignatureBuilder {
        SignatureBuilder::default()
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}", parameter)?;
        }
        f.write_str(")")
    }
}

/// Builder for [`Signature`].
///
/// # Example
///
/// ```rust
/// use depgraph_core::{Dependency, Signature};
///
/// fn make_b() -> i32 {
///     7
/// }
///
/// // fn(a: i32, b: i32 = Dependency(make_b))
/// let signature = Signature::builder()
///     .param::<i32>("a")
///     .param_with("b", Dependency::new(make_b))
///     .build();
/// assert_eq!(signature.len(), 2);
/// ```
#[derive(Default)]
pub struct SignatureBuilder {
    parameters: SmallVec<[Parameter; 4]>,
}

impl SignatureBuilder {
    /// An annotated parameter without a default. Its dependency is produced
    /// by the type itself (`T::default`).
    pub fn param<T>(self, name: impl Into<String>) -> Self
    where
        T: Default + 'static,
    {
        self.push(Parameter {
            name: name.into(),
            annotation: Some(Annotation {
                ty: TypeKey::of::<T>(),
                infer: Arc::new(|| Dependency::<T>::of_type().erase()),
            }),
            default: None,
        })
    }

    /// An annotated parameter whose default is `dependency`.
    pub fn param_with<T, A>(self, name: impl Into<String>, dependency: Dependency<T, A>) -> Self
    where
        T: 'static,
        A: 'static,
    {
        let ty = TypeKey::of::<T>();
        let default = dependency.erase();
        self.push(Parameter {
            name: name.into(),
            annotation: Some(Annotation {
                ty,
                infer: Arc::new(move || dependency.rebind(ty).erase()),
            }),
            default: Some(default),
        })
    }

    /// An annotated parameter whose default dependency is built from
    /// `factory`.
    pub fn depends_on<T, F>(self, name: impl Into<String>, factory: F) -> Self
    where
        T: 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.param_with(name, Dependency::new(factory))
    }

    /// A parameter with no type annotation.
    pub fn untyped(self, name: impl Into<String>) -> Self {
        self.push(Parameter {
            name: name.into(),
            annotation: None,
            default: None,
        })
    }

    pub fn build(self) -> Signature {
        Signature {
            parameters: self.parameters,
        }
    }

    fn push(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_declaration_order() {
        let signature = Signature::builder()
            .param::<u8>("first")
            .untyped("second")
            .depends_on("third", || String::from("x"))
            .build();

        let names: Vec<_> = signature.parameters().iter().map(Parameter::name).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn parameters_record_annotation_and_default() {
        let default = Dependency::new(|| 3i32);
        let signature = Signature::builder()
            .param::<i32>("a")
            .param_with("b", default.clone())
            .untyped("c")
            .build();

        let [a, b, c] = signature.parameters() else {
            panic!("expected three parameters");
        };
        assert_eq!(a.annotation().unwrap().ty(), TypeKey::of::<i32>());
        assert!(a.default().is_none());
        assert_eq!(b.default().unwrap(), &default.erase());
        assert!(c.annotation().is_none());
    }

    #[test]
    fn debug_lists_parameters() {
        let signature = Signature::builder().param::<u8>("a").untyped("b").build();
        assert_eq!(format!("{:?}", signature), "(a: u8, b)");
    }
}
