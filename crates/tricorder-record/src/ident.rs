// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier sequencing and canonical binding signatures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;

/// Wire identifier carried by protocol messages.
pub type MessageId = String;

/// Issues run-unique message ids.
///
/// Ids are consecutive decimal strings starting at `"1"`. Uniqueness holds
/// per sequence instance; a run owns exactly one.
#[derive(Debug, Default)]
pub struct IdSequence {
    next: AtomicU64,
}

impl IdSequence {
    /// Creates a sequence starting at `"1"`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Returns a fresh id, never reused within this sequence.
    pub fn next_id(&self) -> MessageId {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        id.to_string()
    }
}

/// Identity of a binding as declared in host code: the declaring type, the
/// member implementing it, and the parameter types in declaration order.
///
/// Two registrations with equal signatures are the same binding and must
/// resolve to the same message id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingSignature {
    /// Fully qualified name of the declaring type.
    pub declaring_type: String,
    /// Member (method/function) name.
    pub member_name: String,
    /// Parameter type names in declaration order.
    pub parameter_types: Vec<String>,
}

impl BindingSignature {
    /// Builds a signature from its parts.
    #[must_use]
    pub fn new(
        declaring_type: impl Into<String>,
        member_name: impl Into<String>,
        parameter_types: Vec<String>,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            member_name: member_name.into(),
            parameter_types,
        }
    }

    /// Canonical string form: `Type::member(Param1,Param2)`.
    ///
    /// Deterministic in the signature's parts; equal signatures produce
    /// equal keys.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        format!(
            "{}::{}({})",
            self.declaring_type,
            self.member_name,
            self.parameter_types.join(",")
        )
    }
}

/// Raised when an execution message references a binding whose definition
/// was never registered. Correlation is broken at that point, so the
/// event cannot be recorded.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("[RECORD_UNREGISTERED_BINDING] no id registered for binding `{key}`")]
pub struct CorrelationError {
    /// Canonical key of the missing binding.
    pub key: String,
}

/// Outcome of a registry registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Id the signature resolves to.
    pub id: MessageId,
    /// True when this call issued the id; the caller must emit the
    /// definition message exactly on this edge.
    pub newly_registered: bool,
}

/// Thread-safe cache mapping canonical binding keys to issued ids.
///
/// Definitions register once; execution messages resolve the cached id.
/// A resolve miss is a fatal correlation error, never a silent
/// re-registration.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    ids: Mutex<HashMap<String, MessageId>>,
}

impl BindingRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the id for `signature`, issuing a fresh one from `ids` the
    /// first time the signature is seen. Idempotent: repeat registrations
    /// return the original id with `newly_registered` false.
    pub fn register(&self, signature: &BindingSignature, ids: &IdSequence) -> Registration {
        let key = signature.canonical_key();
        let mut cache = self.ids.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(id) = cache.get(&key) {
            return Registration {
                id: id.clone(),
                newly_registered: false,
            };
        }
        let id = ids.next_id();
        cache.insert(key, id.clone());
        Registration {
            id,
            newly_registered: true,
        }
    }

    /// Looks up the id previously registered for `signature`.
    ///
    /// # Errors
    ///
    /// Returns [`CorrelationError`] when the signature was never
    /// registered.
    pub fn resolve(&self, signature: &BindingSignature) -> Result<MessageId, CorrelationError> {
        let key = signature.canonical_key();
        let cache = self.ids.lock().unwrap_or_else(|e| e.into_inner());
        cache.get(&key).cloned().ok_or(CorrelationError { key })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn hook_signature(member: &str) -> BindingSignature {
        BindingSignature::new("Calculator.Hooks", member, vec![])
    }

    #[test]
    fn sequence_ids_are_unique_and_increasing() {
        let ids = IdSequence::new();
        assert_eq!(ids.next_id(), "1");
        assert_eq!(ids.next_id(), "2");
        assert_eq!(ids.next_id(), "3");
    }

    #[test]
    fn canonical_key_is_deterministic() {
        let a = BindingSignature::new("Steps", "add", vec!["int".into(), "int".into()]);
        let b = BindingSignature::new("Steps", "add", vec!["int".into(), "int".into()]);
        assert_eq!(a.canonical_key(), b.canonical_key());
        assert_eq!(a.canonical_key(), "Steps::add(int,int)");
    }

    #[test]
    fn distinct_signatures_produce_distinct_keys() {
        let by_arity = BindingSignature::new("Steps", "add", vec!["int".into()]);
        let by_member = BindingSignature::new("Steps", "sub", vec!["int".into()]);
        let by_type = BindingSignature::new("OtherSteps", "add", vec!["int".into()]);
        let keys = [
            by_arity.canonical_key(),
            by_member.canonical_key(),
            by_type.canonical_key(),
        ];
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[0], keys[2]);
        assert_ne!(keys[1], keys[2]);
    }

    #[test]
    fn register_is_idempotent_per_signature() {
        let ids = IdSequence::new();
        let registry = BindingRegistry::new();
        let first = registry.register(&hook_signature("before"), &ids);
        let second = registry.register(&hook_signature("before"), &ids);
        assert!(first.newly_registered);
        assert!(!second.newly_registered);
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn resolve_misses_are_fatal_correlation_errors() {
        let registry = BindingRegistry::new();
        let err = registry
            .resolve(&hook_signature("after"))
            .expect_err("must miss");
        assert_eq!(err.key, "Calculator.Hooks::after()");
    }

    #[test]
    fn resolve_returns_registered_id() {
        let ids = IdSequence::new();
        let registry = BindingRegistry::new();
        let issued = registry.register(&hook_signature("before"), &ids);
        let resolved = registry.resolve(&hook_signature("before")).expect("hit");
        assert_eq!(resolved, issued.id);
    }

    #[test]
    fn concurrent_registration_issues_one_id_per_signature() {
        let ids = Arc::new(IdSequence::new());
        let registry = Arc::new(BindingRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let ids = Arc::clone(&ids);
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                registry.register(&hook_signature("before"), &ids).id
            }));
        }
        let mut seen = Vec::new();
        for handle in handles {
            seen.push(handle.join().expect("join"));
        }
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 1, "all threads must observe the same id");
    }
}
