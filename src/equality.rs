// ============================================================================
// ember-atoms - Equality Strategies
// Equality functions for cell values and family keys
// ============================================================================

use crate::core::types::EqualsFn;

// =============================================================================
// STRICT EQUALITY (Default)
// =============================================================================

/// Default strict equality using PartialEq.
/// This is the default for `cell()`, `derived()`, and family keys.
///
/// # Example
/// ```
/// use ember_atoms::equality::equals;
///
/// assert!(equals(&42, &42));
/// assert!(!equals(&42, &43));
/// ```
pub fn equals<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}

// =============================================================================
// SAFE FLOAT EQUALITY (Handles NaN)
// =============================================================================

/// Safe not-equal check for f64.
/// Handles NaN correctly: NaN == NaN returns true (unlike IEEE 754), so a
/// cell holding NaN does not notify forever when NaN is written again.
pub fn safe_not_equal_f64(a: &f64, b: &f64) -> bool {
    if a.is_nan() {
        return !b.is_nan();
    }
    a != b
}

/// Safe equality for f64 values.
///
/// # Example
/// ```
/// use ember_atoms::equality::safe_equals_f64;
///
/// assert!(safe_equals_f64(&1.0, &1.0));
/// assert!(!safe_equals_f64(&1.0, &2.0));
/// assert!(safe_equals_f64(&f64::NAN, &f64::NAN));
/// ```
pub fn safe_equals_f64(a: &f64, b: &f64) -> bool {
    !safe_not_equal_f64(a, b)
}

/// Safe not-equal check for f32.
pub fn safe_not_equal_f32(a: &f32, b: &f32) -> bool {
    if a.is_nan() {
        return !b.is_nan();
    }
    a != b
}

/// Safe equality for f32 values.
pub fn safe_equals_f32(a: &f32, b: &f32) -> bool {
    !safe_not_equal_f32(a, b)
}

// =============================================================================
// CONSTANT STRATEGIES
// =============================================================================

/// Never equal - always returns false, so every write notifies.
/// The family Key Set uses this: every membership write is a real change.
pub fn never_equals<T>(_a: &T, _b: &T) -> bool {
    false
}

/// Always equal - always returns true, so writes never notify.
pub fn always_equals<T>(_a: &T, _b: &T) -> bool {
    true
}

// =============================================================================
// PROJECTION EQUALITY
// =============================================================================

/// Compare two values by a projection of them.
///
/// Returns a closure, which cannot be used directly where an `EqualsFn`
/// (a plain fn pointer) is required - for family key equality write a
/// named fn instead. This helper covers ad-hoc comparisons.
///
/// # Example
/// ```
/// use ember_atoms::equality::by_field;
///
/// #[derive(Clone)]
/// struct User { id: u32, name: String }
///
/// let eq_by_id = by_field(|u: &User| u.id);
/// let a = User { id: 1, name: "Alice".to_string() };
/// let b = User { id: 1, name: "Bob".to_string() };
/// assert!(eq_by_id(&a, &b));
/// ```
pub fn by_field<T, F, R>(field_fn: F) -> impl Fn(&T, &T) -> bool
where
    F: Fn(&T) -> R,
    R: PartialEq,
{
    move |a, b| field_fn(a) == field_fn(b)
}

// =============================================================================
// EQUALITY FUNCTION CONSTRUCTORS (for EqualsFn<T>)
// =============================================================================

/// Get the default equality function for a type.
pub fn default_equals_fn<T: PartialEq + 'static>() -> EqualsFn<T> {
    equals
}

/// Get the never-equals function for a type.
pub fn never_equals_fn<T: 'static>() -> EqualsFn<T> {
    never_equals
}

/// Get the always-equals function for a type.
pub fn always_equals_fn<T: 'static>() -> EqualsFn<T> {
    always_equals
}

// =============================================================================
// TESTS
// =============================================================================
