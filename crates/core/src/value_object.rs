//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values alone
/// (an `EmailAddress` has no identity; two equal strings are the same
/// address). To "modify" one, construct a new value. This keeps them safe to
/// share across threads and predictable to compare.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
