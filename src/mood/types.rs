//! Class-model types for MOOD metric computation.

use serde::Serialize;

/// Member access level, ordered from least to most restrictive so that
/// `max` picks the stricter of two levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    /// Whether a member at this level is visible outside the class.
    pub fn is_visible(self) -> bool {
        self == Access::Public
    }

    /// Whether a member at this level is passed down to derived classes.
    pub fn is_inheritable(self) -> bool {
        self != Access::Private
    }
}

/// A member function with enough of its signature to detect overrides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub name: String,
    /// Canonicalized parameter type spellings, in order.
    pub params: Vec<String>,
    pub is_const: bool,
    pub access: Access,
}

impl Method {
    /// Signature equality: same name, same parameter types, same
    /// const-qualification. Access does not participate.
    pub fn signature_eq(&self, other: &Method) -> bool {
        self.name == other.name && self.params == other.params && self.is_const == other.is_const
    }
}

/// A data member, or a get/set method pair folded into one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub access: Access,
}

/// One class as collected from source, before hierarchy analysis.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassModel {
    pub name: String,
    /// Direct base class names, in declaration order.
    pub bases: Vec<String>,
    pub methods: Vec<Method>,
    pub attributes: Vec<Attribute>,
    /// Named types of data members, used for coupling detection.
    pub field_types: Vec<String>,
}

/// The six MOOD factors over a set of classes.
#[derive(Debug, Clone, Serialize)]
pub struct MoodReport {
    pub classes: usize,
    /// Method hiding factor.
    pub mhf: f64,
    /// Attribute hiding factor.
    pub ahf: f64,
    /// Method inheritance factor.
    pub mif: f64,
    /// Attribute inheritance factor.
    pub aif: f64,
    /// Polymorphism factor.
    pub pof: f64,
    /// Coupling factor.
    pub cof: f64,
}
