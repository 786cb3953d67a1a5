use crate::value::Value;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// A named record in working memory: `(name, attrs)` where `attrs` maps
/// attribute names to [`Value`]s.
///
/// Two facts are equal iff their names and attribute mappings are equal.
/// Attributes are stored in a `BTreeMap` rather than a `HashMap` so that
/// [`Fact`]'s `Hash` impl (needed for [`FactContainer`] node identity in
/// search) is deterministic regardless of insertion order.
#[derive(Clone, Debug, Default)]
pub struct Fact {
    pub name: String,
    attrs: BTreeMap<String, Value>,
}

impl Fact {
    pub fn new(name: impl Into<String>) -> Self {
        Fact {
            name: name.into(),
            attrs: BTreeMap::new(),
        }
    }

    /// Attribute access of an undefined key yields `None`, which in turn
    /// makes any condition referencing it evaluate false.
    pub fn get(&self, attr: &str) -> Option<&Value> {
        self.attrs.get(attr)
    }

    pub fn contains(&self, attr: &str) -> bool {
        self.attrs.contains_key(attr)
    }

    pub fn set(&mut self, attr: impl Into<String>, value: Value) {
        self.attrs.insert(attr.into(), value);
    }

    pub fn remove(&mut self, attr: &str) -> Option<Value> {
        self.attrs.remove(attr)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attrs.iter()
    }
}

impl PartialEq for Fact {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.attrs == other.attrs
    }
}

impl Eq for Fact {}

impl Hash for Fact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        for (k, v) in &self.attrs {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{{", self.name)?;
        for (i, (k, v)) in self.attrs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_attribute_is_none() {
        let fact = Fact::new("A");
        assert_eq!(fact.get("x"), None);
    }

    #[test]
    fn equality_is_by_name_and_attrs() {
        let mut a = Fact::new("A");
        a.set("x", Value::Int(1));
        let mut b = Fact::new("A");
        b.set("x", Value::Int(1));
        assert_eq!(a, b);

        b.set("x", Value::Int(2));
        assert_ne!(a, b);
    }

    #[test]
    fn hash_is_stable_regardless_of_insertion_order() {
        use std::collections::hash_map::DefaultHasher;

        let mut a = Fact::new("A");
        a.set("x", Value::Int(1));
        a.set("y", Value::Int(2));

        let mut b = Fact::new("A");
        b.set("y", Value::Int(2));
        b.set("x", Value::Int(1));

        let hash_of = |f: &Fact| {
            let mut h = DefaultHasher::new();
            f.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash_of(&a), hash_of(&b));
    }
}
