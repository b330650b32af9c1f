//! Statement lowering.
//!
//! Walks a function body statement tree and emits flow nodes into a
//! [`FlowGraph`]. Sequencing is single-pass: `break` targets are not known
//! while the loop is being lowered, so the affected nodes are parked as
//! pending subjects (split by branch polarity) and resolved against the
//! loop's next sibling once sequencing reaches it. `continue` resolves
//! immediately against the innermost loop's increment node.

use tracing::debug;
use tree_sitter::Node;

use crate::cfg::graph::{FlowGraph, NodeId};
use crate::error::{FlowError, Result};
use crate::lang::traits::node_text;

/// Which branch of the nearest enclosing condition a statement hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchRole {
    Then,
    Else,
}

/// Nodes whose jump target is a statement that has not been lowered yet,
/// keyed by the successor slot the target belongs in.
#[derive(Debug, Default)]
struct PendingBreaks {
    true_subjects: Vec<NodeId>,
    false_subjects: Vec<NodeId>,
}

impl PendingBreaks {
    fn is_empty(&self) -> bool {
        self.true_subjects.is_empty() && self.false_subjects.is_empty()
    }

    fn extend(&mut self, other: PendingBreaks) {
        self.true_subjects.extend(other.true_subjects);
        self.false_subjects.extend(other.false_subjects);
    }

    /// Point every parked subject at `target` and clear the lists.
    fn resolve(&mut self, graph: &mut FlowGraph, target: NodeId) -> Result<()> {
        for s in self.true_subjects.drain(..) {
            graph.assign_true(s, target)?;
        }
        for s in self.false_subjects.drain(..) {
            graph.assign_false(s, target)?;
        }
        Ok(())
    }
}

/// Lowering state threaded through the recursion.
#[derive(Debug, Default)]
struct LowerCtx {
    /// Increment node of each enclosing loop, innermost last.
    continue_targets: Vec<NodeId>,
    /// Condition node of each enclosing branch (`if` or loop), innermost last.
    branch_anchors: Vec<NodeId>,
    /// One pending-break scope per enclosing loop.
    loop_scopes: Vec<PendingBreaks>,
}

impl LowerCtx {
    fn continue_target(&self) -> Result<NodeId> {
        self.continue_targets
            .last()
            .copied()
            .ok_or_else(|| FlowError::Invariant("continue outside of any loop".into()))
    }

    fn branch_anchor(&self) -> Result<NodeId> {
        self.branch_anchors
            .last()
            .copied()
            .ok_or_else(|| FlowError::Invariant("control transfer without an enclosing branch".into()))
    }

    fn loop_scope_mut(&mut self) -> Result<&mut PendingBreaks> {
        self.loop_scopes
            .last_mut()
            .ok_or_else(|| FlowError::Invariant("break outside of any loop".into()))
    }
}

/// Statement classification. Anything outside this set is skipped with a
/// log line rather than failing the whole function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StmtClass {
    Compound,
    If,
    For,
    Break,
    Continue,
    Return,
    Decl,
    Expr,
    Unsupported,
}

fn classify(node: Node) -> StmtClass {
    match node.kind() {
        "compound_statement" => StmtClass::Compound,
        "if_statement" => StmtClass::If,
        "for_statement" => StmtClass::For,
        "break_statement" => StmtClass::Break,
        "continue_statement" => StmtClass::Continue,
        "return_statement" => StmtClass::Return,
        "declaration" => StmtClass::Decl,
        "expression_statement" => StmtClass::Expr,
        _ => StmtClass::Unsupported,
    }
}

/// Marker for the statement shape a [`Lowering`] came from, where the
/// enclosing sequencer needs to tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StmtTag {
    Plain,
    For { increment: NodeId },
}

/// Result of lowering one statement.
///
/// `entry` is `None` for statements that own no node of their own
/// (empty blocks, skipped constructs). `exits` lists the nodes whose next
/// free slot should receive the following statement; it is empty after a
/// terminator. `pending` carries break subjects that escaped a completed
/// loop and await the next sibling.
#[derive(Debug)]
struct Lowering {
    entry: Option<NodeId>,
    exits: Vec<NodeId>,
    tag: StmtTag,
    pending: PendingBreaks,
}

impl Lowering {
    fn node(id: NodeId) -> Self {
        Lowering {
            entry: Some(id),
            exits: vec![id],
            tag: StmtTag::Plain,
            pending: PendingBreaks::default(),
        }
    }

    fn terminator(id: NodeId) -> Self {
        Lowering {
            entry: Some(id),
            exits: vec![],
            tag: StmtTag::Plain,
            pending: PendingBreaks::default(),
        }
    }

    fn empty() -> Self {
        Lowering {
            entry: None,
            exits: vec![],
            tag: StmtTag::Plain,
            pending: PendingBreaks::default(),
        }
    }
}

/// Lower the body of `function` into `graph`, prepending an entry node
/// labeled from `name` and `params`. Returns the entry node id.
pub fn lower_function(
    graph: &mut FlowGraph,
    function: Node,
    source: &[u8],
    name: &str,
    params: Vec<String>,
) -> Result<NodeId> {
    let body = function
        .child_by_field_name("body")
        .ok_or_else(|| FlowError::MalformedStatement(format!("function {name} has no body")))?;

    let entry = graph.add_entry(name, params);
    let mut ctx = LowerCtx::default();
    let lowered = lower_compound(graph, &mut ctx, body, source, BranchRole::Then)?;
    if let Some(start) = lowered.entry {
        graph.assign(entry, start);
    }
    // Break subjects that survive to the end of the function body have no
    // following statement; their slots stay open.
    Ok(entry)
}

fn lower_stmt(
    graph: &mut FlowGraph,
    ctx: &mut LowerCtx,
    node: Node,
    source: &[u8],
    role: BranchRole,
) -> Result<Lowering> {
    match classify(node) {
        StmtClass::Compound => lower_compound(graph, ctx, node, source, role),
        StmtClass::If => lower_if(graph, ctx, node, source),
        StmtClass::For => lower_for(graph, ctx, node, source),
        StmtClass::Return => {
            let id = graph.add_statement(trimmed_text(node, source));
            Ok(Lowering::terminator(id))
        }
        StmtClass::Decl => {
            let id = graph.add_statement(declaration_label(node, source));
            Ok(Lowering::node(id))
        }
        StmtClass::Expr => {
            let id = graph.add_statement(trimmed_text(node, source));
            Ok(Lowering::node(id))
        }
        StmtClass::Break | StmtClass::Continue => Err(FlowError::Invariant(format!(
            "unplaced control transfer at {:?}",
            node.start_position()
        ))),
        StmtClass::Unsupported => {
            debug!(kind = node.kind(), "skipping unsupported statement");
            Ok(Lowering::empty())
        }
    }
}

/// Lower a statement sitting directly on a branch of a condition, i.e. an
/// unbraced `if`/`else`/`for` body. Bare `break` and `continue` wire or
/// park the branch's own condition instead of creating a node.
fn lower_branch(
    graph: &mut FlowGraph,
    ctx: &mut LowerCtx,
    node: Node,
    source: &[u8],
    role: BranchRole,
) -> Result<Lowering> {
    match classify(node) {
        StmtClass::Continue => {
            let target = ctx.continue_target()?;
            let anchor = ctx.branch_anchor()?;
            match role {
                BranchRole::Then => graph.assign_true(anchor, target)?,
                BranchRole::Else => graph.assign_false(anchor, target)?,
            }
            Ok(Lowering::empty())
        }
        StmtClass::Break => {
            let anchor = ctx.branch_anchor()?;
            match role {
                BranchRole::Then => {
                    graph.reserve_true(anchor);
                    ctx.loop_scope_mut()?.true_subjects.push(anchor);
                }
                BranchRole::Else => {
                    graph.reserve_false(anchor);
                    ctx.loop_scope_mut()?.false_subjects.push(anchor);
                }
            }
            Ok(Lowering::empty())
        }
        _ => lower_stmt(graph, ctx, node, source, role),
    }
}

/// Sequence the children of a compound statement.
fn lower_compound(
    graph: &mut FlowGraph,
    ctx: &mut LowerCtx,
    node: Node,
    source: &[u8],
    role: BranchRole,
) -> Result<Lowering> {
    let mut start: Option<NodeId> = None;
    let mut last: Option<Lowering> = None;
    let mut pending = PendingBreaks::default();

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "comment" {
            continue;
        }
        match classify(child) {
            StmtClass::Continue => {
                let target = ctx.continue_target()?;
                match &last {
                    Some(prev) => {
                        for &e in &prev.exits {
                            graph.assign(e, target);
                        }
                    }
                    None => {
                        let anchor = ctx.branch_anchor()?;
                        match role {
                            BranchRole::Then => graph.assign_true(anchor, target)?,
                            BranchRole::Else => graph.assign_false(anchor, target)?,
                        }
                    }
                }
                last = None;
                break;
            }
            StmtClass::Break => {
                match &last {
                    Some(prev) => {
                        // The preceding statement jumps past the loop on
                        // its open slots; the target is known only once
                        // the loop's next sibling is lowered. A slot that
                        // sequencing already wired keeps its target.
                        let subject = prev.entry.ok_or_else(|| {
                            FlowError::Invariant("break after a nodeless statement".into())
                        })?;
                        let true_open = graph.node(subject).true_edge.is_none();
                        let false_open = graph.node(subject).false_edge.is_none();
                        if true_open {
                            graph.reserve_true(subject);
                        }
                        if false_open {
                            graph.reserve_false(subject);
                        }
                        let scope = ctx.loop_scope_mut()?;
                        if true_open {
                            scope.true_subjects.push(subject);
                        }
                        if false_open {
                            scope.false_subjects.push(subject);
                        }
                    }
                    None => {
                        let anchor = ctx.branch_anchor()?;
                        match role {
                            BranchRole::Then => {
                                graph.reserve_true(anchor);
                                ctx.loop_scope_mut()?.true_subjects.push(anchor);
                            }
                            BranchRole::Else => {
                                graph.reserve_false(anchor);
                                ctx.loop_scope_mut()?.false_subjects.push(anchor);
                            }
                        }
                    }
                }
                last = None;
                break;
            }
            _ => {
                let mut low = lower_stmt(graph, ctx, child, source, role)?;
                let child_pending = std::mem::take(&mut low.pending);
                let Some(entry) = low.entry else {
                    pending.extend(child_pending);
                    continue;
                };
                if !pending.is_empty() {
                    // A loop earlier in this block left break subjects
                    // behind; they jump here. When this child is itself a
                    // loop the jump lands on its increment, skipping the
                    // initializer.
                    let target = match low.tag {
                        StmtTag::For { increment } => increment,
                        StmtTag::Plain => entry,
                    };
                    pending.resolve(graph, target)?;
                }
                if let Some(prev) = &last {
                    for &e in &prev.exits {
                        graph.assign(e, entry);
                    }
                }
                if start.is_none() {
                    start = Some(entry);
                }
                pending.extend(child_pending);
                last = Some(low);
            }
        }
    }

    let exits = last.map(|l| l.exits).unwrap_or_default();
    Ok(Lowering {
        entry: start,
        exits,
        tag: StmtTag::Plain,
        pending,
    })
}

fn lower_if(
    graph: &mut FlowGraph,
    ctx: &mut LowerCtx,
    node: Node,
    source: &[u8],
) -> Result<Lowering> {
    let cond_node = node.child_by_field_name("condition").ok_or_else(|| {
        FlowError::MalformedStatement(format!("if without condition at {:?}", node.start_position()))
    })?;
    let consequence = node.child_by_field_name("consequence").ok_or_else(|| {
        FlowError::MalformedStatement(format!("if without body at {:?}", node.start_position()))
    })?;

    let cond = graph.add_condition(condition_label(cond_node, source));
    ctx.branch_anchors.push(cond);
    let result = (|| -> Result<Lowering> {
        let mut exits = Vec::new();
        let mut pending = PendingBreaks::default();

        let then = lower_branch(graph, ctx, consequence, source, BranchRole::Then)?;
        if let Some(t) = then.entry {
            graph.assign_true(cond, t)?;
        }
        exits.extend(then.exits);
        pending.extend(then.pending);

        match node.child_by_field_name("alternative") {
            Some(alt) => match alt.named_child(0) {
                Some(else_body) => {
                    let els = lower_branch(graph, ctx, else_body, source, BranchRole::Else)?;
                    if let Some(e) = els.entry {
                        graph.assign_false(cond, e)?;
                    }
                    exits.extend(els.exits);
                    pending.extend(els.pending);
                }
                None => exits.push(cond),
            },
            // No else: the false slot falls through to whatever follows.
            None => exits.push(cond),
        }

        Ok(Lowering {
            entry: Some(cond),
            exits,
            tag: StmtTag::Plain,
            pending,
        })
    })();
    ctx.branch_anchors.pop();
    result
}

fn lower_for(
    graph: &mut FlowGraph,
    ctx: &mut LowerCtx,
    node: Node,
    source: &[u8],
) -> Result<Lowering> {
    let pos = node.start_position();
    let init_node = node
        .child_by_field_name("initializer")
        .ok_or_else(|| FlowError::MalformedStatement(format!("for without initializer at {pos:?}")))?;
    let cond_node = node
        .child_by_field_name("condition")
        .ok_or_else(|| FlowError::MalformedStatement(format!("for without condition at {pos:?}")))?;
    let update_node = node
        .child_by_field_name("update")
        .ok_or_else(|| FlowError::MalformedStatement(format!("for without increment at {pos:?}")))?;
    let body_node = node
        .child_by_field_name("body")
        .ok_or_else(|| FlowError::MalformedStatement(format!("for without body at {pos:?}")))?;

    let init_label = if init_node.kind() == "declaration" {
        declaration_label(init_node, source)
    } else {
        trimmed_text(init_node, source)
    };
    let init = graph.add_statement(init_label);
    let cond = graph.add_condition(trimmed_text(cond_node, source));
    let increment = graph.add_statement(trimmed_text(update_node, source));

    ctx.loop_scopes.push(PendingBreaks::default());
    ctx.continue_targets.push(increment);
    ctx.branch_anchors.push(cond);
    let body = lower_branch(graph, ctx, body_node, source, BranchRole::Then);
    ctx.branch_anchors.pop();
    ctx.continue_targets.pop();
    let escaped = ctx.loop_scopes.pop().unwrap_or_default();
    let mut body = body?;

    match body.entry {
        Some(b) => graph.assign_true(cond, b)?,
        // A body that emitted no node of its own (empty, or a lone
        // continue that already wired the condition) loops straight to
        // the increment.
        None => {
            if graph.true_slot_open(cond) {
                graph.assign_true(cond, increment)?;
            }
        }
    }
    for &e in &body.exits {
        graph.assign(e, increment);
    }
    // Break subjects of a nested loop that ran out of siblings inside the
    // body land where the body itself lands: the increment.
    body.pending.resolve(graph, increment)?;

    graph.assign(init, cond);
    graph.assign(increment, cond);

    if !escaped.is_empty() {
        debug!(
            count = escaped.true_subjects.len() + escaped.false_subjects.len(),
            "loop finished with unresolved break targets"
        );
    }

    Ok(Lowering {
        entry: Some(init),
        exits: vec![cond],
        tag: StmtTag::For { increment },
        pending: escaped,
    })
}

/// Statement text with the trailing semicolon removed.
fn trimmed_text(node: Node, source: &[u8]) -> String {
    node_text(node, source)
        .trim()
        .trim_end_matches(';')
        .trim_end()
        .to_string()
}

/// Condition text with the grouping parentheses removed.
fn condition_label(node: Node, source: &[u8]) -> String {
    let inner = if node.kind() == "parenthesized_expression" {
        node.named_child(0).unwrap_or(node)
    } else {
        node
    };
    trimmed_text(inner, source)
}

/// One `name = value` line per initialized declarator. Declarators
/// without an initializer contribute nothing, so `int x;` yields an
/// empty label.
fn declaration_label(node: Node, source: &[u8]) -> String {
    let mut lines = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "init_declarator" {
            continue;
        }
        let (Some(decl), Some(value)) = (
            child.child_by_field_name("declarator"),
            child.child_by_field_name("value"),
        ) else {
            continue;
        };
        let name = declarator_identifier(decl, source).unwrap_or_default();
        lines.push(format!("{} = {}", name, node_text(value, source)));
    }
    lines.join("\n")
}

/// Unwrap pointer/array/parenthesized declarators down to the identifier.
fn declarator_identifier(node: Node, source: &[u8]) -> Option<String> {
    if node.kind() == "identifier" {
        return Some(node_text(node, source).to_string());
    }
    if let Some(inner) = node.child_by_field_name("declarator") {
        return declarator_identifier(inner, source);
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if let Some(name) = declarator_identifier(child, source) {
            return Some(name);
        }
    }
    None
}
