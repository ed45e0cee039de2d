//! Lookup registry: indirect references for values that cannot travel
//! as text.
//!
//! Values that would not survive persistence (native functions, built-in
//! singletons, keyed collections, objects with unserializable members)
//! are stored here and replaced by a [`Token`]. The token is resolved
//! back to the live wrapper when it is used.
//!
//! Built-in singletons are seeded once under fixed tokens
//! (`<builtin_prefix>:<Name>`) so a token for `Math` means the same thing
//! in every session. Every other token is minted from a process-wide
//! counter plus a time salt and never reused.

use std::borrow::Borrow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::config::BridgeConfig;
use crate::realm::Realm;
use crate::serializer;
use crate::value::{Property, Value};
use crate::wrapper::Wrapper;

/// Next id to mint. Shared by every registry in the process so tokens
/// stay unique across bridges.
static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// Handle standing in for an indirected value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token(s.to_string())
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token(s)
    }
}

pub struct LookupRegistry {
    entries: FxHashMap<Token, Wrapper>,
    /// Singleton identity to its seeded token.
    builtins: FxHashMap<usize, Token>,
    token_prefix: String,
    builtin_prefix: String,
    seeded: bool,
}

impl LookupRegistry {
    pub fn new(config: &BridgeConfig) -> Self {
        LookupRegistry {
            entries: FxHashMap::default(),
            builtins: FxHashMap::default(),
            token_prefix: config.token_prefix.clone(),
            builtin_prefix: config.builtin_prefix.clone(),
            seeded: false,
        }
    }

    /// Store every singleton of `realm` under its fixed token. Runs once;
    /// later calls are no-ops.
    pub fn seed_builtins(&mut self, realm: &Realm) {
        if self.seeded {
            return;
        }
        for (name, value) in realm.singletons() {
            let Some(id) = value.identity() else {
                continue;
            };
            let token = Token(format!("{}:{}", self.builtin_prefix, name));
            self.entries
                .insert(token.clone(), Wrapper::to_type(value.clone()));
            self.builtins.insert(id, token);
        }
        self.seeded = true;
        debug!(count = self.builtins.len(), "seeded built-in singletons");
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Whether `value` must be stored here instead of persisted inline.
    ///
    /// True for seeded singletons, native functions, problematic object
    /// kinds, composites the safe serializer rejects, and composites with
    /// a callable or failing member. Script functions are not indirected;
    /// their source text is persisted instead.
    pub fn should_indirect(&self, value: &Value) -> bool {
        if self.builtin_token(value).is_some() {
            return true;
        }
        let indirect = match value {
            Value::Function(function) => function.is_native(),
            Value::Object(object) if object.kind().is_problematic() => true,
            Value::Array(_) | Value::Object(_) => {
                serializer::to_json(value).is_err() || has_unserializable_member(value)
            }
            _ => false,
        };
        trace!(indirect, kind = value.type_of(), "classified value");
        indirect
    }

    /// Seeded token of a built-in singleton.
    pub fn builtin_token(&self, value: &Value) -> Option<&Token> {
        value.identity().and_then(|id| self.builtins.get(&id))
    }

    /// Store a wrapper and return its token. Singletons always get their
    /// seeded token back; anything else gets a fresh one.
    pub fn store(&mut self, wrapper: Wrapper) -> Token {
        if let Some(token) = self.builtin_token(wrapper.inner()) {
            return token.clone();
        }
        let token = self.mint();
        trace!(%token, "stored indirect value");
        self.entries.insert(token.clone(), wrapper);
        token
    }

    pub fn resolve(&self, token: &str) -> Option<Wrapper> {
        self.entries.get(token).cloned()
    }

    /// Drop a minted entry. Seeded singletons are never released.
    /// Returns whether an entry was removed.
    pub fn release(&mut self, token: &str) -> bool {
        if self.is_builtin_token(token) {
            return false;
        }
        let removed = self.entries.remove(token).is_some();
        if removed {
            trace!(token, "released indirect value");
        }
        removed
    }

    pub fn is_builtin_token(&self, token: &str) -> bool {
        token
            .strip_prefix(self.builtin_prefix.as_str())
            .map(|rest| rest.starts_with(':'))
            .unwrap_or(false)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn mint(&self) -> Token {
        let id = NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Token(format!("{}-{}-{}", self.token_prefix, id, base36(millis)))
    }
}

/// Check own members for callables or failing accessors, stopping at the
/// first one found.
fn has_unserializable_member(value: &Value) -> bool {
    match value {
        Value::Object(object) => match object.properties() {
            Ok(props) => props.iter().any(|(_, property)| match property {
                Property::Data(member) => member.is_callable(),
                Property::Accessor(getter) => match getter() {
                    Ok(member) => member.is_callable(),
                    Err(_) => true,
                },
            }),
            Err(_) => true,
        },
        Value::Array(items) => match items.try_borrow() {
            Ok(items) => items.iter().any(Value::is_callable),
            Err(_) => true,
        },
        _ => false,
    }
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
