//! Dependency Extraction
//!
//! Extraction infers a component's dependencies from its declared
//! construction parameters, so graph edges can be populated without
//! declaring them by hand.
//!
//! # Rules
//!
//! 1. A component that declares its dependencies explicitly (through
//!    [`Constructible::declared_dependencies`]) gets exactly that mapping back.
//!
//! 2. Otherwise each parameter yields one dependency:
//!    - the annotation is the dependency's type;
//!    - the factory is the default's factory when the default is a
//!      dependency, and the annotated type itself otherwise.
//!
//! 3. A parameter without an annotation is an error
//!    ([`ExtractError::MissingAnnotation`]). Nothing is guessed.
//!
//! 4. Only direct parameters are inspected. Walking further down is the job of
//!    whatever resolves the graph.

mod signature;

pub use signature::{Annotation, Parameter, Signature, SignatureBuilder};

use indexmap::IndexMap;
use tracing::trace;

use crate::dependency::AnyDependency;
use crate::error::{ExtractError, Result};
use crate::graph::{DepGraph, Node};

/// Parameter name to dependency, in declaration order.
pub type DependencyMap = IndexMap<String, AnyDependency>;

/// Something whose construction parameters can be inspected.
///
/// # Example
///
/// ```rust
/// use depgraph_core::{extract_dependencies, Constructible, Dependency, Signature};
///
/// #[derive(Default)]
/// struct Pool;
///
/// struct Repository;
///
/// impl Constructible for Repository {
///     fn signature() -> Signature {
///         Signature::builder()
///             .param::<Pool>("pool")
///             .depends_on("table", || "users")
///             .build()
///     }
/// }
///
/// let deps = extract_dependencies::<Repository>().unwrap();
/// assert_eq!(deps.len(), 2);
/// assert_eq!(deps["table"].downcast::<&str>().unwrap().provide(), "users");
/// ```
pub trait Constructible {
    /// The declared formal parameters.
    fn signature() -> Signature;

    /// Explicitly declared dependencies. When present these are returned as
    /// is and the signature is never inspected.
    fn declared_dependencies() -> Option<DependencyMap> {
        None
    }
}

/// Extract the dependencies of a constructible type.
pub fn extract_dependencies<C>() -> Result<DependencyMap, ExtractError>
where
    C: Constructible + ?Sized,
{
    if let Some(declared) = C::declared_dependencies() {
        trace!(entity = std::any::type_name::<C>(), "using declared dependencies");
        return Ok(declared);
    }
    extract_from_signature(&C::signature())
}

/// Extract dependencies from a bare signature.
pub fn extract_from_signature(signature: &Signature) -> Result<DependencyMap, ExtractError> {
    let mut dependencies = DependencyMap::with_capacity(signature.len());

    for parameter in signature.parameters() {
        let annotation = parameter
            .annotation()
            .ok_or_else(|| ExtractError::MissingAnnotation {
                parameter: parameter.name().to_string(),
            })?;

        if dependencies.contains_key(parameter.name()) {
            return Err(ExtractError::DuplicateParameter {
                parameter: parameter.name().to_string(),
            });
        }

        let dependency = annotation.infer();
        trace!(
            parameter = parameter.name(),
            produces = %dependency.produces(),
            factory = dependency.factory_name(),
            "extracted dependency"
        );
        dependencies.insert(parameter.name().to_string(), dependency);
    }

    Ok(dependencies)
}

/// Register `owner` and its extracted dependencies in `graph`.
///
/// Each dependency becomes a node named after its parameter, scoped under the
/// owner's name (`Owner.param`), and the owner is linked to all of them.
/// Returns the node registered under the owner's name.
pub fn populate(graph: &mut DepGraph, owner: Node, dependencies: &DependencyMap) -> Node {
    let nodes: Vec<Node> = dependencies
        .iter()
        .map(|(parameter, dependency)| {
            Node::from_erased(owner.name().child(parameter.as_str()), dependency.clone())
        })
        .collect();
    graph.add_node(owner, nodes)
}

/// Extract the dependencies of `C` and register them under `owner`.
pub fn register<C>(graph: &mut DepGraph, owner: Node) -> Result<Node, ExtractError>
where
    C: Constructible + ?Sized,
{
    let dependencies = extract_dependencies::<C>()?;
    Ok(populate(graph, owner, &dependencies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::{Dependency, TypeKey};
    use crate::graph::NodeName;

    fn make_b() -> i32 {
        7
    }

    #[test]
    fn annotated_and_defaulted_parameters() {
        let default = Dependency::new(make_b);
        let signature = Signature::builder()
            .param::<i32>("a")
            .param_with("b", default.clone())
            .build();

        let deps = extract_from_signature(&signature).unwrap();

        let keys: Vec<_> = deps.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b"]);

        // a: i32 -> Dependency(factory=i32, type=i32)
        assert_eq!(deps["a"].produces(), TypeKey::of::<i32>());
        assert_eq!(deps["a"].downcast::<i32>().unwrap().provide(), 0);

        // b: i32 = Dependency(make_b) -> Dependency(factory=make_b, type=i32)
        let b = deps["b"].downcast::<i32>().unwrap();
        assert_eq!(b.produces(), TypeKey::of::<i32>());
        assert_eq!(b.factory_name(), default.factory_name());
        assert_eq!(b.provide(), 7);
        assert_ne!(b, &default);
    }

    #[test]
    fn every_extraction_builds_fresh_records() {
        let signature = Signature::builder().param::<u8>("a").build();
        let first = extract_from_signature(&signature).unwrap();
        let second = extract_from_signature(&signature).unwrap();
        assert_ne!(first["a"], second["a"]);
    }

    #[test]
    fn missing_annotation_fails() {
        let signature = Signature::builder().param::<u8>("a").untyped("b").build();
        assert_eq!(
            extract_from_signature(&signature).unwrap_err(),
            ExtractError::MissingAnnotation {
                parameter: "b".to_string()
            }
        );
    }

    #[test]
    fn duplicate_parameter_fails() {
        let signature = Signature::builder().param::<u8>("a").param::<u16>("a").build();
        assert!(matches!(
            extract_from_signature(&signature),
            Err(ExtractError::DuplicateParameter { parameter }) if parameter == "a"
        ));
    }

    #[test]
    fn empty_signature_has_no_dependencies() {
        let deps = extract_from_signature(&Signature::default()).unwrap();
        assert!(deps.is_empty());
    }

    struct Declared;

    impl Constructible for Declared {
        fn signature() -> Signature {
            Signature::builder().untyped("ignored").build()
        }

        fn declared_dependencies() -> Option<DependencyMap> {
            let mut deps = DependencyMap::default();
            deps.insert("name".to_string(), Dependency::new(|| "declared").erase());
            Some(deps)
        }
    }

    #[test]
    fn declared_dependencies_take_precedence() {
        let deps = extract_dependencies::<Declared>().unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps["name"].downcast::<&str>().unwrap().provide(), "declared");
    }

    #[test]
    fn populate_scopes_under_owner() {
        let mut graph = DepGraph::new();
        let signature = Signature::builder().param::<u32>("dep1").build();
        let deps = extract_from_signature(&signature).unwrap();

        let a = Node::new("EntityA", Dependency::new(|| ()));
        let b = Node::new("EntityB", Dependency::new(|| ()));
        populate(&mut graph, a, &deps);
        populate(&mut graph, b, &deps);

        let a_dep = graph.get_by_name("EntityA.dep1").unwrap().clone();
        let b_dep = graph.get_by_name("EntityB.dep1").unwrap().clone();
        assert_ne!(a_dep, b_dep);
        assert_eq!(a_dep.name(), &NodeName::scoped("EntityA", "dep1"));
        assert!(graph.get_dependencies("EntityA").unwrap().contains(&a_dep));
        assert!(!graph.get_dependencies("EntityA").unwrap().contains(&b_dep));
        graph.check_invariants().unwrap();
    }
}
