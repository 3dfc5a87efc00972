//! Namespace Context
//!
//! Per-parse prefix bindings on top of a shared [`NamespaceStore`].
//! Each prefix key has its own LIFO stack, so popping one element's
//! bindings never disturbs bindings made by its ancestors. The empty key
//! is the default namespace.
//!
//! The `xml` prefix is implicitly bound to the XML namespace unless a
//! document binds it explicitly.

use std::collections::HashMap;
use std::io;

use log::trace;

use super::registry::{uri, NamespaceStore, NsId};

/// Prefix bindings for one parse
pub struct NamespaceContext<'r, S: NamespaceStore + ?Sized> {
    store: &'r S,
    /// Default namespace stack
    defaults: Vec<NsId>,
    /// Prefix -> binding stack
    prefixed: HashMap<Box<[u8]>, Vec<NsId>>,
    /// Every namespace pushed in this context, first-seen order
    seen: Vec<NsId>,
}

impl<'r, S: NamespaceStore + ?Sized> NamespaceContext<'r, S> {
    /// Create an empty context backed by `store`
    pub fn new(store: &'r S) -> Self {
        NamespaceContext {
            store,
            defaults: Vec::with_capacity(4),
            prefixed: HashMap::new(),
            seen: Vec::new(),
        }
    }

    /// The store this context interns into
    pub fn store(&self) -> &'r S {
        self.store
    }

    /// Bind `key` to `uri` until the matching [`NamespaceContext::pop`].
    ///
    /// An empty `uri` binds [`NsId::UNKNOWN`], which un-declares the
    /// namespace for the key.
    pub fn push(&mut self, key: &[u8], uri: &[u8]) -> NsId {
        let id = self.store.intern(uri);

        if key.is_empty() {
            self.defaults.push(id);
        } else if let Some(stack) = self.prefixed.get_mut(key) {
            stack.push(id);
        } else {
            self.prefixed.insert(key.into(), vec![id]);
        }

        if !id.is_unknown() && !self.seen.contains(&id) {
            self.seen.push(id);
        }
        trace!(
            "namespace push: key='{}', uri='{}' ({})",
            key.escape_ascii(),
            uri.escape_ascii(),
            self.store.short_name(id)
        );
        id
    }

    /// Remove the most recent binding of `key`.
    ///
    /// Returns None when `key` has no binding left.
    pub fn pop(&mut self, key: &[u8]) -> Option<NsId> {
        let popped = if key.is_empty() {
            self.defaults.pop()
        } else {
            self.prefixed.get_mut(key).and_then(Vec::pop)
        };
        trace!(
            "namespace pop: key='{}' ({})",
            key.escape_ascii(),
            popped.map_or_else(|| "nothing bound".to_string(), |id| self.store.short_name(id))
        );
        popped
    }

    /// Resolve a prefix. The empty key resolves the default namespace.
    pub fn get(&self, key: &[u8]) -> NsId {
        let bound = if key.is_empty() {
            self.defaults.last()
        } else {
            self.prefixed.get(key).and_then(|stack| stack.last())
        };

        match bound {
            Some(&id) => id,
            None if key == b"xml" => self.store.intern(uri::XML),
            None => NsId::UNKNOWN,
        }
    }

    /// Every namespace pushed in this context, ordered by registry index
    pub fn all_namespaces(&self) -> Vec<NsId> {
        let mut all = self.seen.clone();
        all.sort();
        all
    }

    /// Short display name of an id, e.g. `ns3`
    pub fn short_name(&self, id: NsId) -> String {
        self.store.short_name(id)
    }

    /// Write one `ns<index>="<uri>"` line per namespace pushed in this context
    pub fn dump<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        for id in self.all_namespaces() {
            let Some(uri) = self.store.uri(id) else {
                continue;
            };
            writeln!(
                out,
                "{}=\"{}\"",
                self.store.short_name(id),
                String::from_utf8_lossy(&uri)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ns::registry::NamespaceRegistry;

    #[test]
    fn test_push_and_get() {
        let registry = NamespaceRegistry::new();
        let mut ctx = registry.create_context();

        let svg = ctx.push(b"svg", b"http://www.w3.org/2000/svg");
        assert_eq!(ctx.get(b"svg"), svg);
        assert_eq!(ctx.get(b"other"), NsId::UNKNOWN);
        assert_eq!(ctx.get(b""), NsId::UNKNOWN);
    }

    #[test]
    fn test_default_namespace() {
        let registry = NamespaceRegistry::new();
        let mut ctx = registry.create_context();

        let x = ctx.push(b"", b"urn:x");
        assert_eq!(ctx.get(b""), x);
        assert_eq!(ctx.pop(b""), Some(x));
        assert_eq!(ctx.get(b""), NsId::UNKNOWN);
    }

    #[test]
    fn test_shadow_binding() {
        let registry = NamespaceRegistry::new();
        let mut ctx = registry.create_context();

        let ns1 = ctx.push(b"ns", b"http://example.com/ns1");
        let ns2 = ctx.push(b"ns", b"http://example.com/ns2");
        assert_eq!(ctx.get(b"ns"), ns2);

        ctx.pop(b"ns");
        assert_eq!(ctx.get(b"ns"), ns1);
    }

    #[test]
    fn test_pop_is_per_key() {
        let registry = NamespaceRegistry::new();
        let mut ctx = registry.create_context();

        let a = ctx.push(b"a", b"urn:a");
        let b = ctx.push(b"b", b"urn:b");
        ctx.pop(b"a");
        assert_eq!(ctx.get(b"a"), NsId::UNKNOWN);
        assert_eq!(ctx.get(b"b"), b);
        assert_ne!(a, b);
    }

    #[test]
    fn test_pop_unbound() {
        let registry = NamespaceRegistry::new();
        let mut ctx = registry.create_context();
        assert_eq!(ctx.pop(b"nothing"), None);
        assert_eq!(ctx.pop(b""), None);
    }

    #[test]
    fn test_empty_uri_undeclares() {
        let registry = NamespaceRegistry::new();
        let mut ctx = registry.create_context();

        ctx.push(b"", b"urn:x");
        assert_eq!(ctx.push(b"", b""), NsId::UNKNOWN);
        assert_eq!(ctx.get(b""), NsId::UNKNOWN);
        ctx.pop(b"");
        assert!(!ctx.get(b"").is_unknown());
    }

    #[test]
    fn test_xml_prefix_is_implicit() {
        let registry = NamespaceRegistry::new();
        let ctx = registry.create_context();
        let xml = ctx.get(b"xml");
        assert_eq!(registry.uri(xml).as_deref(), Some(uri::XML));
    }

    #[test]
    fn test_all_namespaces_and_dump() {
        let registry = NamespaceRegistry::new();
        registry.intern(b"urn:earlier");
        let mut ctx = registry.create_context();

        ctx.push(b"b", b"urn:b");
        ctx.push(b"a", b"urn:a");
        ctx.push(b"", b"urn:b");
        ctx.push(b"", b"urn:earlier");

        let all = ctx.all_namespaces();
        assert_eq!(all.len(), 3);
        assert_eq!(ctx.short_name(all[0]), "ns0");

        let mut out = Vec::new();
        ctx.dump(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "ns0=\"urn:earlier\"\nns1=\"urn:b\"\nns2=\"urn:a\"\n"
        );
    }
}
