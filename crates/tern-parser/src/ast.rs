//! Arena-backed syntax tree.
//!
//! Nodes live in one arena vector and refer to each other by [`NodeId`].
//! `left`/`right` are the owning edges; `dest` is a non-owning back-reference
//! to the node that consumes a node's value. It is set only after the child
//! is attached to its parent and is never used for traversal.

use crate::arena::{Arena, Vec};
use crate::scope::{Binding, ScopeId};
use crate::span::Span;
use crate::token::Builtin;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt::Write;

/// Strings longer than this many code points carry an offset map.
pub const STRING_MAP_STRIDE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct NodeId(pub u32);

/// Operation tags, as the code generator sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Operation {
    // === Binary ===
    Multiply,
    Divide,
    Remainder,
    Add,
    Subtract,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    In,
    Instanceof,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    BitwiseAnd,
    BitwiseXor,
    BitwiseOr,
    Exponent,

    // === Short-circuit ===
    /// `&&`: jump over the right side when the left is falsy.
    TestIfFalse,
    /// `||`: jump over the right side when the left is truthy.
    TestIfTrue,

    // === Assignment ===
    Move,

    // === Unary ===
    UnaryPlus,
    UnaryNegation,
    LogicalNot,
    BitwiseNot,
    Typeof,
    Void,
    Delete,

    // === Update ===
    Increment,
    Decrement,
    PostIncrement,
    PostDecrement,
}

impl Operation {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Multiply => "MULTIPLY",
            Self::Divide => "DIVIDE",
            Self::Remainder => "REMAINDER",
            Self::Add => "ADD",
            Self::Subtract => "SUBTRACT",
            Self::LeftShift => "LEFT_SHIFT",
            Self::RightShift => "RIGHT_SHIFT",
            Self::UnsignedRightShift => "UNSIGNED_RIGHT_SHIFT",
            Self::Less => "LESS",
            Self::LessOrEqual => "LESS_OR_EQUAL",
            Self::Greater => "GREATER",
            Self::GreaterOrEqual => "GREATER_OR_EQUAL",
            Self::In => "IN",
            Self::Instanceof => "INSTANCEOF",
            Self::Equal => "EQUAL",
            Self::NotEqual => "NOT_EQUAL",
            Self::StrictEqual => "STRICT_EQUAL",
            Self::StrictNotEqual => "STRICT_NOT_EQUAL",
            Self::BitwiseAnd => "BITWISE_AND",
            Self::BitwiseXor => "BITWISE_XOR",
            Self::BitwiseOr => "BITWISE_OR",
            Self::Exponent => "EXPONENT",
            Self::TestIfFalse => "AND",
            Self::TestIfTrue => "OR",
            Self::Move => "ASSIGN",
            Self::UnaryPlus => "PLUS",
            Self::UnaryNegation => "NEGATE",
            Self::LogicalNot => "NOT",
            Self::BitwiseNot => "BITWISE_NOT",
            Self::Typeof => "TYPEOF",
            Self::Void => "VOID",
            Self::Delete => "DELETE",
            Self::Increment => "INCREMENT",
            Self::Decrement => "DECREMENT",
            Self::PostIncrement => "POST_INCREMENT",
            Self::PostDecrement => "POST_DECREMENT",
        }
    }
}

/// How an identifier reference is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ReferenceKind {
    Reference,
    /// Operand of `typeof`: an unresolved name yields `"undefined"` instead
    /// of throwing.
    Typeof,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Reference<'a> {
    pub name: &'a str,
    pub hash: u32,
    pub binding: Binding,
    pub kind: ReferenceKind,
}

/// A decoded string constant.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct JsString<'a> {
    pub text: &'a str,
    /// Length in code points.
    pub length: u32,
    /// Byte offset of every `STRING_MAP_STRIDE`th code point.
    #[serde(skip)]
    pub offset_map: Option<&'a [u32]>,
}

impl<'a> JsString<'a> {
    /// Wrap arena or source text, building the offset map for long
    /// non-ASCII strings.
    pub fn new(arena: &'a Arena, text: &'a str, length: usize) -> Self {
        let offset_map = if length > STRING_MAP_STRIDE && length != text.len() {
            let mut map = arena.vec_with_capacity((length - 1) / STRING_MAP_STRIDE);
            for (n, (offset, _)) in text.char_indices().enumerate().skip(1) {
                if n % STRING_MAP_STRIDE == 0 {
                    map.push(offset as u32);
                }
            }
            Some(map.into_bump_slice())
        } else {
            None
        };

        Self {
            text,
            length: length as u32,
            offset_map,
        }
    }

    /// Byte offset of code point `index`.
    pub fn byte_offset(&self, index: usize) -> Option<usize> {
        if index > self.length as usize {
            return None;
        }

        if self.length as usize == self.text.len() {
            return Some(index);
        }

        let (base, skip) = match self.offset_map {
            Some(map) if index >= STRING_MAP_STRIDE => {
                let entry = index / STRING_MAP_STRIDE - 1;
                (map[entry] as usize, index % STRING_MAP_STRIDE)
            }
            _ => (0, index),
        };

        Some(
            self.text[base..]
                .char_indices()
                .nth(skip)
                .map_or(self.text.len(), |(offset, _)| base + offset),
        )
    }
}

/// Node kinds with their payloads.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub enum NodeKind<'a> {
    // === Literals ===
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
    String(JsString<'a>),
    RegExp { pattern: &'a str, flags: &'a str },

    // === Bindings ===
    Name(Reference<'a>),
    /// `this` of the enclosing function.
    This,
    /// `this` of an outer function, captured through an arrow function.
    NonLocalThis { function: ScopeId, binding: Binding },
    /// `this` at global level.
    GlobalThis(Binding),
    Arguments { function: ScopeId, binding: Binding },
    /// A built-in; namespaces and functions also have a global binding.
    Builtin { builtin: Builtin, binding: Option<Binding> },

    // === Aggregates ===
    /// `left`: last property statement.
    Object,
    /// `left`: last element statement. `holes` counts elisions.
    Array { length: u32, holes: u32 },
    /// The object under construction, as seen by one property statement.
    ObjectValue { object: NodeId },
    /// `left`: object, `right`: key.
    Property,
    PropertyDelete,
    /// `left`: previous statement, `right`: this statement's expression.
    Statement,
    /// `left`: array of strings and interpolated values.
    TemplateLiteral,

    // === Operators ===
    Binary(Operation),
    /// Short-circuit `&&`/`||`.
    Logical(Operation),
    Coalesce,
    /// `left`: test, `right`: the [`NodeKind::Branching`] node.
    Conditional,
    /// `left`: value when true, `right`: value when false.
    Branching,
    Assignment(Operation),
    Unary(Operation),
    Update(Operation),
    Comma,

    // === Calls ===
    /// `left`: callee, `right`: first argument.
    FunctionCall { ctor: bool },
    /// `left`: the property being called, `right`: first argument.
    MethodCall { ctor: bool },
    /// `left`: value, `right`: next argument.
    Argument { slot: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node<'a> {
    pub kind: NodeKind<'a>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    /// Consumer of this node's value.
    pub dest: Option<NodeId>,
    pub span: Span,
    pub line: u32,
    /// Written inside parentheses.
    pub parenthesized: bool,
}

impl<'a> Node<'a> {
    pub fn new(kind: NodeKind<'a>, span: Span, line: u32) -> Self {
        Self {
            kind,
            left: None,
            right: None,
            dest: None,
            span,
            line,
            parenthesized: false,
        }
    }

    /// Identifier reference or member access.
    pub fn is_lvalue(&self) -> bool {
        matches!(self.kind, NodeKind::Name(_) | NodeKind::Property)
    }
}

/// Node store for one compilation unit.
pub struct Ast<'a> {
    nodes: Vec<'a, Node<'a>>,
}

impl<'a> Ast<'a> {
    pub fn new(arena: &'a Arena) -> Self {
        Self {
            nodes: arena.vec_with_capacity(64),
        }
    }

    pub fn push(&mut self, node: Node<'a>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node<'a> {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<'a> {
        &mut self.nodes[id.0 as usize]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind<'a> {
        &self.get(id).kind
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).left
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).right
    }

    /// Record that `consumer` uses `child`'s value.
    pub fn set_dest(&mut self, child: NodeId, consumer: NodeId) {
        self.get_mut(child).dest = Some(consumer);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walk a `left`-linked statement chain and return it in source order.
    pub fn statements(&self, last: Option<NodeId>) -> std::vec::Vec<NodeId> {
        let mut chain = std::vec::Vec::new();
        let mut id = last;

        while let Some(stmt) = id {
            if !matches!(self.kind(stmt), NodeKind::Statement) {
                break;
            }
            chain.push(stmt);
            id = self.left(stmt);
        }

        chain.reverse();
        chain
    }

    /// Values of a call's argument chain, in slot order.
    pub fn arguments(&self, call: NodeId) -> std::vec::Vec<NodeId> {
        let mut args = std::vec::Vec::new();
        let mut id = self.right(call);

        while let Some(arg) = id {
            if let Some(value) = self.left(arg) {
                args.push(value);
            }
            id = self.right(arg);
        }

        args
    }

    /// Compact functional rendering, e.g. `ADD(1, MULTIPLY(2, 3))`.
    ///
    /// Runs on an explicit work stack, so left-deep chains of any length
    /// render without recursion.
    pub fn display(&self, root: NodeId) -> std::string::String {
        let mut out = std::string::String::new();
        let mut work = vec![Step::Node(root)];

        while let Some(step) = work.pop() {
            match step {
                Step::Text(text) => out.push_str(text),
                Step::Owned(text) => out.push_str(&text),
                Step::Node(id) => self.write_node(id, &mut out, &mut work),
            }
        }

        out
    }

    /// Serializable view of the subtree at `root`: the root id plus a flat
    /// table of every node under it.
    pub fn serialize(&self, root: NodeId) -> NodeView<'_, 'a> {
        NodeView { ast: self, id: root }
    }

    /// Ids of every node reachable from `root` through `left`/`right`, in
    /// arena order.
    pub fn subtree(&self, root: NodeId) -> std::vec::Vec<NodeId> {
        let mut ids = std::vec::Vec::new();
        let mut pending = vec![root];

        while let Some(id) = pending.pop() {
            ids.push(id);
            let node = self.get(id);
            pending.extend(node.right);
            pending.extend(node.left);
        }

        ids.sort_unstable_by_key(|id| id.0);
        ids
    }

    /// Leaves go straight to `out`; anything with children is queued on
    /// `work` in reverse so it pops in reading order.
    fn write_node(&self, id: NodeId, out: &mut std::string::String, work: &mut std::vec::Vec<Step>) {
        let node = self.get(id);
        let mut steps = std::vec::Vec::new();

        match node.kind {
            NodeKind::Number(n) => write_number(n, out),
            NodeKind::Boolean(b) => {
                let _ = write!(out, "{b}");
            }
            NodeKind::Null => out.push_str("null"),
            NodeKind::Undefined => out.push_str("undefined"),
            NodeKind::String(s) => {
                let _ = write!(out, "{:?}", s.text);
            }
            NodeKind::RegExp { pattern, flags } => {
                let _ = write!(out, "/{pattern}/{flags}");
            }
            NodeKind::Name(reference) => out.push_str(reference.name),
            NodeKind::This => out.push_str("this"),
            NodeKind::NonLocalThis { .. } => out.push_str("NON_LOCAL_THIS"),
            NodeKind::GlobalThis(_) => out.push_str("GLOBAL_THIS"),
            NodeKind::Arguments { .. } => out.push_str("arguments"),
            NodeKind::Builtin { builtin, .. } => out.push_str(builtin.name()),
            NodeKind::ObjectValue { .. } => out.push_str("OBJECT_VALUE"),
            NodeKind::Object => {
                steps.push(Step::Text("{"));
                for (i, stmt) in self.statements(node.left).into_iter().enumerate() {
                    if i > 0 {
                        steps.push(Step::Text(", "));
                    }
                    self.init_steps(stmt, true, &mut steps);
                }
                steps.push(Step::Text("}"));
            }
            NodeKind::Array { length, .. } => self.array_steps(node.left, length, &mut steps),
            NodeKind::Property => call_steps("PROPERTY", node, &mut steps),
            NodeKind::PropertyDelete => call_steps("PROPERTY_DELETE", node, &mut steps),
            NodeKind::Statement => {
                for (i, stmt) in self.statements(Some(id)).into_iter().enumerate() {
                    if i > 0 {
                        steps.push(Step::Text("; "));
                    }
                    steps.extend(self.right(stmt).map(Step::Node));
                }
            }
            NodeKind::TemplateLiteral => call_steps("TEMPLATE", node, &mut steps),
            NodeKind::Binary(op)
            | NodeKind::Logical(op)
            | NodeKind::Unary(op)
            | NodeKind::Update(op) => call_steps(op.name(), node, &mut steps),
            NodeKind::Coalesce => call_steps("COALESCE", node, &mut steps),
            NodeKind::Conditional => {
                steps.push(Step::Text("CONDITIONAL("));
                steps.extend(node.left.map(Step::Node));
                if let Some(branching) = node.right {
                    let branches = self.get(branching);
                    for branch in [branches.left, branches.right].into_iter().flatten() {
                        steps.push(Step::Text(", "));
                        steps.push(Step::Node(branch));
                    }
                }
                steps.push(Step::Text(")"));
            }
            NodeKind::Branching => call_steps("BRANCHING", node, &mut steps),
            NodeKind::Assignment(Operation::Move) => call_steps("ASSIGN", node, &mut steps),
            NodeKind::Assignment(op) => {
                steps.push(Step::Owned(format!("{}_ASSIGN", op.name())));
                operand_steps(node, &mut steps);
            }
            NodeKind::Comma => call_steps("COMMA", node, &mut steps),
            NodeKind::FunctionCall { ctor } | NodeKind::MethodCall { ctor } => {
                steps.push(Step::Text(if ctor { "NEW(" } else { "CALL(" }));
                steps.extend(node.left.map(Step::Node));
                for arg in self.arguments(id) {
                    steps.push(Step::Text(", "));
                    steps.push(Step::Node(arg));
                }
                steps.push(Step::Text(")"));
            }
            NodeKind::Argument { slot } => {
                steps.push(Step::Owned(format!("ARGUMENT{slot}(")));
                steps.extend(node.left.map(Step::Node));
                steps.push(Step::Text(")"));
            }
        }

        work.extend(steps.into_iter().rev());
    }

    /// One `key: value` property statement of an object or array literal.
    fn init_steps(&self, stmt: NodeId, with_key: bool, steps: &mut std::vec::Vec<Step>) {
        let Some(assign) = self.right(stmt) else {
            return;
        };

        if with_key {
            if let Some(key) = self.left(assign).and_then(|property| self.right(property)) {
                steps.push(Step::Node(key));
                steps.push(Step::Text(": "));
            }
        }

        steps.extend(self.right(assign).map(Step::Node));
    }

    fn array_steps(&self, last: Option<NodeId>, length: u32, steps: &mut std::vec::Vec<Step>) {
        let mut slots: std::vec::Vec<Option<NodeId>> = vec![None; length as usize];

        for stmt in self.statements(last) {
            let index = self
                .right(stmt)
                .and_then(|assign| self.left(assign))
                .and_then(|property| self.right(property))
                .and_then(|key| match self.kind(key) {
                    NodeKind::Number(n) => Some(*n as usize),
                    _ => None,
                });

            if let Some(slot) = index.and_then(|i| slots.get_mut(i)) {
                *slot = Some(stmt);
            }
        }

        steps.push(Step::Text("["));
        for (i, slot) in slots.into_iter().enumerate() {
            if i > 0 {
                steps.push(Step::Text(", "));
            }
            match slot {
                Some(stmt) => self.init_steps(stmt, false, steps),
                None => steps.push(Step::Text("<hole>")),
            }
        }
        steps.push(Step::Text("]"));
    }
}

/// Pending output of [`Ast::display`].
enum Step {
    Node(NodeId),
    Text(&'static str),
    Owned(std::string::String),
}

/// `NAME(left, right)`.
fn call_steps(name: &'static str, node: &Node<'_>, steps: &mut std::vec::Vec<Step>) {
    steps.push(Step::Text(name));
    operand_steps(node, steps);
}

/// `(left, right)`.
fn operand_steps(node: &Node<'_>, steps: &mut std::vec::Vec<Step>) {
    steps.push(Step::Text("("));
    steps.extend(node.left.map(Step::Node));
    if let Some(right) = node.right {
        steps.push(Step::Text(", "));
        steps.push(Step::Node(right));
    }
    steps.push(Step::Text(")"));
}

fn write_number(n: f64, out: &mut std::string::String) {
    if n == f64::INFINITY {
        out.push_str("Infinity");
    } else if n == f64::NEG_INFINITY {
        out.push_str("-Infinity");
    } else {
        let _ = write!(out, "{n}");
    }
}

/// Serializable view of one subtree.
///
/// Children are referenced by id inside a flat `nodes` table, so the JSON
/// nesting stays constant however deep the tree is.
pub struct NodeView<'t, 'a> {
    ast: &'t Ast<'a>,
    id: NodeId,
}

/// One row of the `nodes` table.
#[derive(serde::Serialize)]
struct NodeRecord<'t, 'a> {
    id: u32,
    kind: &'t NodeKind<'a>,
    span: Span,
    line: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    parenthesized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    dest: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    left: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    right: Option<u32>,
}

impl Serialize for NodeView<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let records: std::vec::Vec<NodeRecord<'_, '_>> = self
            .ast
            .subtree(self.id)
            .into_iter()
            .map(|id| {
                let node = self.ast.get(id);
                NodeRecord {
                    id: id.0,
                    kind: &node.kind,
                    span: node.span,
                    line: node.line,
                    parenthesized: node.parenthesized,
                    dest: node.dest.map(|dest| dest.0),
                    left: node.left.map(|left| left.0),
                    right: node.right.map(|right| right.0),
                }
            })
            .collect();

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("root", &self.id.0)?;
        map.serialize_entry("nodes", &records)?;
        map.end()
    }
}
