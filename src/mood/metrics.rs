//! MOOD factor computation.
//!
//! Implements the six Abreu MOOD factors over a set of collected
//! classes: hiding (MHF, AHF), inheritance (MIF, AIF), polymorphism
//! (POF) and coupling (COF). All factors are system-wide ratios; a
//! factor whose denominator is zero reports 0.0 rather than NaN.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::mood::types::{Attribute, ClassModel, Method, MoodReport};

/// Compute the MOOD report for a set of classes.
pub fn compute(classes: &[ClassModel]) -> MoodReport {
    let index: FxHashMap<&str, &ClassModel> =
        classes.iter().map(|c| (c.name.as_str(), c)).collect();
    let descendants = descendant_counts(classes, &index);

    let mut hidden_methods = 0usize;
    let mut total_methods = 0usize;
    let mut hidden_attrs = 0usize;
    let mut total_attrs = 0usize;

    let mut inherited_kept_methods = 0usize;
    let mut available_methods = 0usize;
    let mut inherited_kept_attrs = 0usize;
    let mut available_attrs = 0usize;

    let mut overridden_total = 0usize;
    let mut override_capacity = 0usize;

    let mut references = 0usize;

    for class in classes {
        total_methods += class.methods.len();
        hidden_methods += class
            .methods
            .iter()
            .filter(|m| !m.access.is_visible())
            .count();
        total_attrs += class.attributes.len();
        hidden_attrs += class
            .attributes
            .iter()
            .filter(|a| !a.access.is_visible())
            .count();

        let (inherited_methods, inherited_attrs) = inherited_members(class, &index);

        let overridden = class
            .methods
            .iter()
            .filter(|m| inherited_methods.iter().any(|im| im.signature_eq(m)))
            .count();
        let new_methods = class.methods.len() - overridden;
        let kept = inherited_methods
            .iter()
            .filter(|im| !class.methods.iter().any(|m| m.signature_eq(im)))
            .count();
        inherited_kept_methods += kept;
        available_methods += kept + class.methods.len();

        let kept_attrs = inherited_attrs
            .iter()
            .filter(|ia| !class.attributes.iter().any(|a| a.name == ia.name))
            .count();
        inherited_kept_attrs += kept_attrs;
        available_attrs += kept_attrs + class.attributes.len();

        overridden_total += overridden;
        override_capacity += new_methods * descendants.get(class.name.as_str()).copied().unwrap_or(0);

        references += class
            .field_types
            .iter()
            .filter(|t| t.as_str() != class.name && index.contains_key(t.as_str()))
            .count();
    }

    let n = classes.len();
    debug!(
        classes = n,
        methods = total_methods,
        attributes = total_attrs,
        "computed class inventory"
    );

    MoodReport {
        classes: n,
        mhf: ratio(hidden_methods, total_methods),
        ahf: ratio(hidden_attrs, total_attrs),
        mif: ratio(inherited_kept_methods, available_methods),
        aif: ratio(inherited_kept_attrs, available_attrs),
        pof: ratio(overridden_total, override_capacity),
        cof: if n > 1 {
            references as f64 / (n * (n - 1)) as f64
        } else {
            0.0
        },
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Public and protected members reachable through the transitive base
/// classes of `class`. Bases that were never collected resolve to
/// nothing. A visited set guards against inheritance cycles.
fn inherited_members(
    class: &ClassModel,
    index: &FxHashMap<&str, &ClassModel>,
) -> (Vec<Method>, Vec<Attribute>) {
    let mut methods = Vec::new();
    let mut attrs = Vec::new();
    let mut visited = FxHashSet::default();
    visited.insert(class.name.clone());
    gather(class, index, &mut visited, &mut methods, &mut attrs);
    (methods, attrs)
}

fn gather(
    class: &ClassModel,
    index: &FxHashMap<&str, &ClassModel>,
    visited: &mut FxHashSet<String>,
    methods: &mut Vec<Method>,
    attrs: &mut Vec<Attribute>,
) {
    for base in &class.bases {
        if !visited.insert(base.clone()) {
            continue;
        }
        if let Some(&b) = index.get(base.as_str()) {
            methods.extend(
                b.methods
                    .iter()
                    .filter(|m| m.access.is_inheritable())
                    .cloned(),
            );
            attrs.extend(
                b.attributes
                    .iter()
                    .filter(|a| a.access.is_inheritable())
                    .cloned(),
            );
            gather(b, index, visited, methods, attrs);
        }
    }
}

/// Number of transitive subclasses of each class.
fn descendant_counts<'a>(
    classes: &'a [ClassModel],
    index: &FxHashMap<&str, &'a ClassModel>,
) -> FxHashMap<&'a str, usize> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for class in classes {
        let mut visited = FxHashSet::default();
        visited.insert(class.name.clone());
        count_ancestors(class, index, &mut visited, &mut counts);
    }
    counts
}

fn count_ancestors<'a>(
    class: &ClassModel,
    index: &FxHashMap<&str, &'a ClassModel>,
    visited: &mut FxHashSet<String>,
    counts: &mut FxHashMap<&'a str, usize>,
) {
    for base in &class.bases {
        if !visited.insert(base.clone()) {
            continue;
        }
        if let Some(&b) = index.get(base.as_str()) {
            *counts.entry(b.name.as_str()).or_insert(0) += 1;
            count_ancestors(b, index, visited, counts);
        }
    }
}
