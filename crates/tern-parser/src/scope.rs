//! Variable scopes.
//!
//! Binding resolution belongs to the compiler stages after parsing. The
//! expression parser only needs to register built-in globals, record each
//! identifier reference against the scope it appears in, and ask for the
//! nearest enclosing function. [`ScopeResolver`] is that seam and
//! [`ScopeTree`] is the default implementation.

use rustc_hash::FxHashMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ScopeId(pub u32);

/// Index of a declared variable within its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Slot(pub u32);

/// Handle to a recorded reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Binding {
    /// Scope the reference appears in.
    pub scope: ScopeId,
    /// Position in that scope's reference list.
    pub index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScopeKind {
    Global,
    Function,
    /// Arrow functions share `this` and `arguments` with the enclosing function.
    Arrow,
    Block,
}

/// The nearest non-arrow function around a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionScope {
    pub id: ScopeId,
    /// An arrow function lies between the scope and the function.
    pub crossed_arrow: bool,
}

/// Scope services the parser relies on.
pub trait ScopeResolver {
    fn current(&self) -> ScopeId;

    fn global(&self) -> ScopeId;

    /// Declare `name` in `scope`, returning its slot. Declaring an existing
    /// name returns the existing slot.
    fn add_variable(&mut self, scope: ScopeId, name: &str, hash: u32) -> Slot;

    /// Record a use of `name` in `scope`.
    fn reference(&mut self, scope: ScopeId, name: &str, hash: u32) -> Binding;

    /// Nearest enclosing non-arrow function, `None` at global level.
    fn function_scope(&self, scope: ScopeId) -> Option<FunctionScope>;

    /// Note that `function` needs an `arguments` object.
    fn mark_arguments_object(&mut self, function: ScopeId);
}

#[derive(Debug)]
struct Variable {
    name: Box<str>,
    slot: Slot,
}

#[derive(Debug)]
struct Reference {
    name: Box<str>,
    hash: u32,
}

#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    /// Hash -> variables sharing it.
    variables: FxHashMap<u32, Vec<Variable>>,
    count: u32,
    references: Vec<Reference>,
    arguments: bool,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            kind,
            parent,
            variables: FxHashMap::default(),
            count: 0,
            references: Vec::new(),
            arguments: false,
        }
    }

    fn lookup(&self, name: &str, hash: u32) -> Option<Slot> {
        self.variables
            .get(&hash)?
            .iter()
            .find(|v| &*v.name == name)
            .map(|v| v.slot)
    }
}

/// Default scope store: a stack of nested scopes, never freed until the
/// compilation unit is done.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl ScopeTree {
    /// A tree holding only the global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Global, None)],
            current: ScopeId(0),
        }
    }

    /// Enter a new scope nested in the current one.
    pub fn push(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(kind, Some(self.current)));
        self.current = id;
        id
    }

    /// Leave the current scope. The global scope is never popped.
    pub fn pop(&mut self) {
        if let Some(parent) = self.scope(self.current).parent {
            self.current = parent;
        }
    }

    pub fn kind(&self, scope: ScopeId) -> ScopeKind {
        self.scope(scope).kind
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scope(scope).parent
    }

    pub fn uses_arguments(&self, scope: ScopeId) -> bool {
        self.scope(scope).arguments
    }

    /// Number of variables declared in `scope`.
    pub fn variable_count(&self, scope: ScopeId) -> u32 {
        self.scope(scope).count
    }

    /// Name of a recorded reference.
    pub fn reference_name(&self, binding: Binding) -> Option<&str> {
        self.scope(binding.scope)
            .references
            .get(binding.index as usize)
            .map(|r| &*r.name)
    }

    /// Find the declaration a reference resolves to, walking outwards from
    /// the scope it was recorded in.
    pub fn resolve(&self, binding: Binding) -> Option<(ScopeId, Slot)> {
        let reference = self
            .scope(binding.scope)
            .references
            .get(binding.index as usize)?;

        let mut id = Some(binding.scope);
        while let Some(scope) = id {
            if let Some(slot) = self.scope(scope).lookup(&reference.name, reference.hash) {
                return Some((scope, slot));
            }
            id = self.scope(scope).parent;
        }

        None
    }

    fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeResolver for ScopeTree {
    fn current(&self) -> ScopeId {
        self.current
    }

    fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    fn add_variable(&mut self, scope: ScopeId, name: &str, hash: u32) -> Slot {
        let scope = self.scope_mut(scope);

        if let Some(slot) = scope.lookup(name, hash) {
            return slot;
        }

        let slot = Slot(scope.count);
        scope.count += 1;
        scope.variables.entry(hash).or_default().push(Variable {
            name: name.into(),
            slot,
        });

        slot
    }

    fn reference(&mut self, scope: ScopeId, name: &str, hash: u32) -> Binding {
        let references = &mut self.scope_mut(scope).references;
        let index = references.len() as u32;
        references.push(Reference {
            name: name.into(),
            hash,
        });

        Binding { scope, index }
    }

    fn function_scope(&self, scope: ScopeId) -> Option<FunctionScope> {
        let mut crossed_arrow = false;
        let mut id = Some(scope);

        while let Some(current) = id {
            match self.scope(current).kind {
                ScopeKind::Function => {
                    return Some(FunctionScope {
                        id: current,
                        crossed_arrow,
                    })
                }
                ScopeKind::Arrow => crossed_arrow = true,
                ScopeKind::Global | ScopeKind::Block => {}
            }
            id = self.scope(current).parent;
        }

        None
    }

    fn mark_arguments_object(&mut self, function: ScopeId) {
        self.scope_mut(function).arguments = true;
    }
}
