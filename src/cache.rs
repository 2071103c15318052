//! Per-thread, grow-only memoization of the pure derivations
//!
//! Populating these caches is pure but not free, so results are kept for
//! the lifetime of the thread and never invalidated. Keeping them
//! thread-local makes lookups lock-free on the hot path and sidesteps
//! cross-thread visibility questions entirely; the cost is that each
//! thread pays its own cold start. Keys are allocation identities of
//! descriptors and schemas, which are immutable once built.

use crate::{
	descriptor::Descriptor,
	project::Projector,
	read::{Coercer, UnionPlan},
	schema::{Schema, SchemaError},
};

use std::{
	cell::RefCell,
	collections::HashMap,
	hash::Hash,
	sync::Arc,
	thread::LocalKey,
};

type Slot<K, V> = RefCell<HashMap<K, V>>;

thread_local! {
	static SCHEMAS: Slot<usize, Schema> = RefCell::new(HashMap::new());
	static UNION_PLANS: Slot<usize, Arc<UnionPlan>> = RefCell::new(HashMap::new());
	static COERCERS: Slot<usize, Coercer> = RefCell::new(HashMap::new());
	static PROJECTORS: Slot<(usize, usize), Arc<Projector>> = RefCell::new(HashMap::new());
}

/// Memoize a fallible supplier; failures are not cached, so a
/// configuration error resurfaces on every use of the broken type
fn memo<K, V, E>(
	slot: &'static LocalKey<Slot<K, V>>,
	key: K,
	supply: impl FnOnce() -> Result<V, E>,
) -> Result<V, E>
where
	K: Eq + Hash + Copy,
	V: Clone,
{
	if let Some(hit) = slot.with(|cache| cache.borrow().get(&key).cloned()) {
		return Ok(hit);
	}
	let value = supply()?;
	slot.with(|cache| cache.borrow_mut().insert(key, value.clone()));
	Ok(value)
}

fn memo_infallible<K, V>(
	slot: &'static LocalKey<Slot<K, V>>,
	key: K,
	supply: impl FnOnce() -> V,
) -> V
where
	K: Eq + Hash + Copy,
	V: Clone,
{
	match memo::<K, V, std::convert::Infallible>(slot, key, || Ok(supply())) {
		Ok(value) => value,
		Err(infallible) => match infallible {},
	}
}

fn descriptor_identity(descriptor: &Arc<Descriptor>) -> usize {
	Arc::as_ptr(descriptor) as usize
}

/// Inferred schema per descriptor
pub(crate) fn schema(
	descriptor: &Arc<Descriptor>,
	supply: impl FnOnce() -> Result<Schema, SchemaError>,
) -> Result<Schema, SchemaError> {
	memo(&SCHEMAS, descriptor_identity(descriptor), supply)
}

/// Union decoding plan per descriptor
pub(crate) fn union_plan(
	descriptor: &Arc<Descriptor>,
	supply: impl FnOnce() -> Arc<UnionPlan>,
) -> Arc<UnionPlan> {
	memo_infallible(&UNION_PLANS, descriptor_identity(descriptor), supply)
}

/// Container coercer per descriptor
pub(crate) fn coercer(
	descriptor: &Arc<Descriptor>,
	supply: impl FnOnce() -> Coercer,
) -> Coercer {
	memo_infallible(&COERCERS, descriptor_identity(descriptor), supply)
}

/// Projector per `(writer, reader)` schema identity pair
pub(crate) fn projector(
	writer: &Schema,
	reader: Option<&Schema>,
	supply: impl FnOnce() -> Arc<Projector>,
) -> Arc<Projector> {
	let key = (writer.identity(), reader.map_or(0, Schema::identity));
	memo_infallible(&PROJECTORS, key, supply)
}
