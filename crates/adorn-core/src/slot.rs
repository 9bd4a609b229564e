//! Per-signature slots and the slot registry
//!
//! Every decorated method of a declaring type owns exactly one slot holding
//! its current composed callable. Slots are stored under their signature
//! key; when two different methods derive the same key, the later one is
//! moved to a disambiguated key (marker prepended) so that the two chains
//! never share storage.

use crate::callable::DecoratedCallable;
use crate::config::ComposerConfig;
use crate::errors::{CallResult, RegistryError};
use crate::method::MethodDeclaration;
use crate::signature::{MethodIdentity, SignatureKey, SignatureKeyBuilder};
use crate::types::Arguments;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Storage cell for one method's composed callable
pub struct Slot {
    key: SignatureKey,
    owner: MethodIdentity,
    current: RwLock<DecoratedCallable>,
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("key", &self.key)
            .field("owner", &self.owner)
            .field("layers", &self.current.read().layers())
            .finish()
    }
}

impl Slot {
    fn new(key: SignatureKey, owner: MethodIdentity, original: DecoratedCallable) -> Self {
        Self {
            key,
            owner,
            current: RwLock::new(original),
        }
    }

    /// Key the slot is stored under, after any disambiguation
    pub fn key(&self) -> &SignatureKey {
        &self.key
    }

    /// Method that owns the slot
    pub fn owner(&self) -> &MethodIdentity {
        &self.owner
    }

    /// Whether `method` owns this slot
    pub fn is_owned_by(&self, method: &MethodIdentity) -> bool {
        &self.owner == method
    }

    /// Snapshot of the current composed callable
    pub fn current(&self) -> DecoratedCallable {
        self.current.read().clone()
    }

    /// Invoke the current composed callable.
    ///
    /// The lock is released before the call so decorators may re-enter.
    pub fn invoke(&self, args: impl Into<Arguments>) -> CallResult {
        let current = self.current();
        current.invoke(args)
    }

    pub(crate) fn replace(&self, next: DecoratedCallable) {
        *self.current.write() = next;
    }
}

/// Receives the entry-point rewrite when a method's slot is first created
pub trait EntryPointRewriter {
    /// Route every future call of `method` through `slot`
    fn rewrite_entry_point(&mut self, method: &MethodIdentity, slot: Arc<Slot>);
}

/// Slots of one declaring type, keyed by signature key
pub struct SlotRegistry {
    declaring_type: String,
    keys: SignatureKeyBuilder,
    marker: String,
    max_probes: usize,
    slots: HashMap<SignatureKey, Arc<Slot>>,
}

impl fmt::Debug for SlotRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotRegistry")
            .field("declaring_type", &self.declaring_type)
            .field("slots", &format!("HashMap with {} entries", self.slots.len()))
            .finish()
    }
}

enum Probe {
    Found(Arc<Slot>),
    Vacant(SignatureKey),
}

impl SlotRegistry {
    /// Create a registry with default configuration
    pub fn new(declaring_type: impl Into<String>) -> Self {
        Self::with_config(declaring_type, &ComposerConfig::default())
    }

    /// Create a registry with explicit configuration
    pub fn with_config(declaring_type: impl Into<String>, config: &ComposerConfig) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            keys: SignatureKeyBuilder::from_config(config),
            marker: config.disambiguation_marker.clone(),
            max_probes: config.max_collision_probes,
            slots: HashMap::new(),
        }
    }

    /// Declaring type the registry belongs to
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// Return the method's slot, creating it on first use.
    ///
    /// Creation captures the method's original body as the slot's initial
    /// callable and hands the slot to `rewriter` so the method's entry point
    /// reads it from then on. Later calls for the same method return the
    /// same slot without touching the rewriter.
    pub fn get_or_create_slot(
        &mut self,
        method: &MethodDeclaration,
        rewriter: &mut dyn EntryPointRewriter,
    ) -> Result<Arc<Slot>, RegistryError> {
        let identity = method.identity();
        let key = match self.probe(identity)? {
            Probe::Found(slot) => {
                trace!(
                    declaring_type = %self.declaring_type,
                    method = %identity,
                    key = %slot.key(),
                    "reusing slot"
                );
                return Ok(slot);
            }
            Probe::Vacant(key) => key,
        };

        let disambiguated = key != self.keys.build_for(identity);
        let slot = Arc::new(Slot::new(key.clone(), identity.clone(), method.original()));
        self.slots.insert(key, Arc::clone(&slot));
        rewriter.rewrite_entry_point(identity, Arc::clone(&slot));

        debug!(
            declaring_type = %self.declaring_type,
            method = %identity,
            key = %slot.key(),
            disambiguated,
            "created slot"
        );
        Ok(slot)
    }

    /// The method's slot if one was created
    pub fn find_slot(&self, method: &MethodIdentity) -> Option<Arc<Slot>> {
        match self.probe(method) {
            Ok(Probe::Found(slot)) => Some(slot),
            _ => None,
        }
    }

    fn probe(&self, method: &MethodIdentity) -> Result<Probe, RegistryError> {
        let raw = self.keys.build_for(method);
        let mut key = raw.clone();
        for _ in 0..=self.max_probes {
            match self.slots.get(&key) {
                Some(slot) if slot.is_owned_by(method) => return Ok(Probe::Found(Arc::clone(slot))),
                Some(slot) => {
                    trace!(
                        declaring_type = %self.declaring_type,
                        method = %method,
                        key = %key,
                        owner = %slot.owner(),
                        "signature key taken by another method"
                    );
                    key = key.disambiguated(&self.marker);
                }
                None => return Ok(Probe::Vacant(key)),
            }
        }

        error!(
            declaring_type = %self.declaring_type,
            method = %method,
            key = %raw,
            limit = self.max_probes,
            "slot collision probing exhausted"
        );
        Err(RegistryError::CollisionExhausted {
            key: raw.to_string(),
            limit: self.max_probes,
        })
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot was created yet
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate over all slots in unspecified order
    pub fn slots(&self) -> impl Iterator<Item = &Arc<Slot>> {
        self.slots.values()
    }
}
