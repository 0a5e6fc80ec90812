//! Stable type identity for requests and events.
//!
//! Every registry slot is indexed by a [`TypeKey`] derived from the concrete
//! request or event type. Identity is the `TypeId`; the type name travels
//! along purely for diagnostics and error messages.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A stable identifier for a request or event shape.
///
/// Two values of the same concrete type always resolve to the same key,
/// regardless of how the value was obtained. Use [`key_of`] to resolve the
/// key of a value through a reference, or [`TypeKey::of`] when the type is
/// known statically.
#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// The key of the type `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Human-readable type name, with reference sigils stripped.
    pub fn name(&self) -> &'static str {
        self.name.trim_start_matches('&')
    }
}

// Identity is the TypeId; the name is display-only and fully determined by it.
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

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve the key of `value`, looking through one level of reference.
///
/// Because the type parameter is inferred from the referent, a value and a
/// reference to that value produce the same key:
///
/// ```rust,ignore
/// let greet = Greet { name: "Ana".into() };
/// assert_eq!(key_of(&greet), key_of(&&greet));
/// ```
pub fn key_of<T: Any>(_value: &T) -> TypeKey {
    TypeKey::of::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Greet {
        _name: String,
    }

    #[test]
    fn same_type_same_key() {
        let a = Greet {
            _name: "a".into(),
        };
        let b = Greet {
            _name: "b".into(),
        };
        assert_eq!(key_of(&a), key_of(&b));
        assert_eq!(key_of(&a), TypeKey::of::<Greet>());
    }

    #[test]
    fn value_and_reference_agree() {
        let g = Greet {
            _name: "a".into(),
        };
        let by_ref = &g;
        assert_eq!(key_of(by_ref), key_of(&g));
    }

    #[test]
    fn distinct_types_distinct_keys() {
        assert_ne!(TypeKey::of::<Greet>(), TypeKey::of::<String>());
        assert_ne!(TypeKey::of::<u32>(), TypeKey::of::<u64>());
    }

    #[test]
    fn display_uses_type_name() {
        let key = TypeKey::of::<String>();
        assert!(key.to_string().contains("String"));
    }
}
