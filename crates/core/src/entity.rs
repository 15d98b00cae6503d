//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Both catalog products and ledger movements are entities: they are
/// referenced by id and keep that id for their whole lifetime.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
