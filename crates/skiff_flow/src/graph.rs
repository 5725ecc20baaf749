//! Basic blocks, branches and the control flow graph builder.
//!
//! The input is a lowered body: a flat list of labels, jumps, returns
//! and plain statements. Blocks are cut at labels and after jumps,
//! wired together with guarded branches, and unreachable blocks are
//! pruned iteratively since removing one block can strand another.

use std::fmt;
use std::io;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use skiff_binder::node::{
    BoundBlockStatement, BoundExpression, BoundLabel, BoundStatement, BoundUnaryExpression,
};
use skiff_binder::operators::BoundUnaryOperator;
use skiff_binder::printer;
use skiff_symbols::TypeSymbol;
use skiff_syntax::SyntaxKind;

// ============================================================================
// Blocks and branches
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BasicBlockKind {
    Start,
    End,
    Code,
}

/// A run of statements with no internal control transfer. The start
/// and end blocks are synthetic and carry no statements.
#[derive(Debug)]
pub struct BasicBlock {
    kind: BasicBlockKind,
    statements: Vec<Arc<BoundStatement>>,
}

impl BasicBlock {
    fn code(statements: Vec<Arc<BoundStatement>>) -> Self {
        Self {
            kind: BasicBlockKind::Code,
            statements,
        }
    }

    #[inline]
    pub fn is_start(&self) -> bool {
        self.kind == BasicBlockKind::Start
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.kind == BasicBlockKind::End
    }

    #[inline]
    pub fn statements(&self) -> &[Arc<BoundStatement>] {
        &self.statements
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BasicBlockKind::Start => f.write_str("<Start>"),
            BasicBlockKind::End => f.write_str("<End>"),
            BasicBlockKind::Code => {
                for (index, statement) in self.statements.iter().enumerate() {
                    if index > 0 {
                        f.write_str("\n")?;
                    }
                    f.write_str(&printer::statement_line(statement))?;
                }
                Ok(())
            }
        }
    }
}

/// A directed edge between two blocks, optionally guarded.
#[derive(Debug)]
pub struct Branch {
    from: usize,
    to: usize,
    condition: Option<Arc<BoundExpression>>,
}

impl Branch {
    #[inline]
    pub fn from(&self) -> usize {
        self.from
    }

    #[inline]
    pub fn to(&self) -> usize {
        self.to
    }

    #[inline]
    pub fn condition(&self) -> Option<&Arc<BoundExpression>> {
        self.condition.as_ref()
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.condition {
            Some(condition) => f.write_str(&printer::expression_to_string(condition)),
            None => Ok(()),
        }
    }
}

// ============================================================================
// The graph
// ============================================================================

/// A control flow graph over a lowered body. Blocks are indexed; the
/// first block is the synthetic start and the last the synthetic end.
#[derive(Debug)]
pub struct ControlFlowGraph {
    blocks: Vec<BasicBlock>,
    branches: Vec<Branch>,
    start: usize,
    end: usize,
}

impl ControlFlowGraph {
    /// Builds the graph for a lowered body. The body must be flat:
    /// structured statements have already been rewritten away.
    pub fn create(body: &BoundBlockStatement) -> ControlFlowGraph {
        GraphBuilder::new(body).build()
    }

    /// True when every path through `body` ends in a return statement.
    ///
    /// The check is syntactic: each direct predecessor of the end block
    /// must have a return as its last statement. A body whose end block
    /// is unreachable passes vacuously.
    pub fn all_paths_return(body: &BoundBlockStatement) -> bool {
        let graph = ControlFlowGraph::create(body);
        graph
            .branches
            .iter()
            .filter(|branch| branch.to == graph.end)
            .all(|branch| {
                let last = graph.blocks[branch.from].statements.last();
                matches!(last.map(|s| s.as_ref()), Some(BoundStatement::Return(_)))
            })
    }

    #[inline]
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    #[inline]
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Writes the graph in Graphviz dot format.
    pub fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "digraph G {{")?;
        for (index, block) in self.blocks.iter().enumerate() {
            writeln!(
                writer,
                "    N{} [label = {}, shape = box]",
                index,
                quote(&block.to_string())
            )?;
        }
        for branch in &self.branches {
            writeln!(
                writer,
                "    N{} -> N{} [label = {}]",
                branch.from,
                branch.to,
                quote(&branch.to_string())
            )?;
        }
        writeln!(writer, "}}")
    }
}

fn quote(text: &str) -> String {
    let escaped = text
        .trim_end()
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\l");
    format!("\"{}\"", escaped)
}

// ============================================================================
// Construction
// ============================================================================

struct GraphBuilder {
    blocks: Vec<BasicBlock>,
    branches: Vec<Branch>,
    incoming: Vec<Vec<usize>>,
    outgoing: Vec<Vec<usize>>,
    end: usize,
}

impl GraphBuilder {
    fn new(body: &BoundBlockStatement) -> Self {
        let mut blocks = Vec::new();
        blocks.push(BasicBlock {
            kind: BasicBlockKind::Start,
            statements: Vec::new(),
        });
        blocks.extend(partition(body).into_iter().map(BasicBlock::code));
        blocks.push(BasicBlock {
            kind: BasicBlockKind::End,
            statements: Vec::new(),
        });
        let end = blocks.len() - 1;
        GraphBuilder {
            incoming: vec![Vec::new(); blocks.len()],
            outgoing: vec![Vec::new(); blocks.len()],
            branches: Vec::new(),
            blocks,
            end,
        }
    }

    fn build(mut self) -> ControlFlowGraph {
        for (from, to, condition) in self.edges() {
            self.connect(from, to, condition);
        }
        self.prune()
    }

    /// Every edge the statement lists imply, before constant folding.
    fn edges(&self) -> Vec<(usize, usize, Option<Arc<BoundExpression>>)> {
        let mut block_from_label: FxHashMap<BoundLabel, usize> = FxHashMap::default();
        for (index, block) in self.blocks.iter().enumerate() {
            if let Some(BoundStatement::Label(statement)) =
                block.statements.first().map(|s| s.as_ref())
            {
                block_from_label.insert(statement.label.clone(), index);
            }
        }

        let mut edges = Vec::new();
        if self.end == 1 {
            // No code blocks: the start falls straight through.
            edges.push((0, self.end, None));
            return edges;
        }
        edges.push((0, 1, None));

        for (index, block) in self.blocks.iter().enumerate().take(self.end).skip(1) {
            let next = index + 1;
            for (position, statement) in block.statements.iter().enumerate() {
                let is_last = position + 1 == block.statements.len();
                match statement.as_ref() {
                    BoundStatement::Goto(s) => {
                        edges.push((index, block_from_label[&s.label], None));
                    }
                    BoundStatement::ConditionalGoto(s) => {
                        let target = block_from_label[&s.label];
                        let negated = negated(&s.condition);
                        let (jump_guard, fall_guard) = if s.jump_if_true {
                            (Arc::clone(&s.condition), negated)
                        } else {
                            (negated, Arc::clone(&s.condition))
                        };
                        edges.push((index, target, Some(jump_guard)));
                        edges.push((index, next, Some(fall_guard)));
                    }
                    BoundStatement::Return(_) => {
                        edges.push((index, self.end, None));
                    }
                    BoundStatement::Label(_)
                    | BoundStatement::VariableDeclaration(_)
                    | BoundStatement::Expression(_) => {
                        if is_last {
                            edges.push((index, next, None));
                        }
                    }
                    other => {
                        unreachable!("partitioned statement {} in flow graph", other.kind_name())
                    }
                }
            }
        }
        edges
    }

    fn connect(&mut self, from: usize, to: usize, condition: Option<Arc<BoundExpression>>) {
        // A literal guard is folded here: a true guard makes the edge
        // unconditional and a false guard drops the edge entirely.
        let condition = match condition {
            Some(condition) => match literal_bool(&condition) {
                Some(true) => None,
                Some(false) => return,
                None => Some(condition),
            },
            None => None,
        };
        let branch = self.branches.len();
        self.incoming[to].push(branch);
        self.outgoing[from].push(branch);
        self.branches.push(Branch {
            from,
            to,
            condition,
        });
    }

    /// Removes code blocks no branch reaches, to a fixed point. The
    /// synthetic start and end blocks are never removed.
    fn prune(mut self) -> ControlFlowGraph {
        let mut alive_blocks = vec![true; self.blocks.len()];
        let mut alive_branches = vec![true; self.branches.len()];

        let mut worklist: Vec<usize> = (1..self.end)
            .filter(|&block| self.incoming[block].is_empty())
            .collect();
        while let Some(block) = worklist.pop() {
            if !alive_blocks[block] {
                continue;
            }
            alive_blocks[block] = false;
            for &branch in &self.outgoing[block] {
                if !alive_branches[branch] {
                    continue;
                }
                alive_branches[branch] = false;
                let to = self.branches[branch].to;
                self.incoming[to].retain(|&other| other != branch);
                if to != self.end && alive_blocks[to] && self.incoming[to].is_empty() {
                    worklist.push(to);
                }
            }
        }

        // Compact the survivors, renumbering branch endpoints.
        let mut remap = vec![usize::MAX; self.blocks.len()];
        let mut blocks = Vec::new();
        for (index, block) in self.blocks.into_iter().enumerate() {
            if alive_blocks[index] {
                remap[index] = blocks.len();
                blocks.push(block);
            }
        }
        let branches = self
            .branches
            .into_iter()
            .zip(alive_branches)
            .filter(|(_, alive)| *alive)
            .map(|(branch, _)| Branch {
                from: remap[branch.from],
                to: remap[branch.to],
                condition: branch.condition,
            })
            .collect();
        let end = remap[self.end];
        ControlFlowGraph {
            blocks,
            branches,
            start: 0,
            end,
        }
    }
}

/// Cuts a flat statement list into block bodies: a label starts a new
/// block, a jump or return ends the current one.
fn partition(body: &BoundBlockStatement) -> Vec<Vec<Arc<BoundStatement>>> {
    let mut blocks = Vec::new();
    let mut current: Vec<Arc<BoundStatement>> = Vec::new();
    for statement in &body.statements {
        match statement.as_ref() {
            BoundStatement::Label(_) => {
                if !current.is_empty() {
                    blocks.push(std::mem::take(&mut current));
                }
                current.push(Arc::clone(statement));
            }
            BoundStatement::Goto(_)
            | BoundStatement::ConditionalGoto(_)
            | BoundStatement::Return(_) => {
                current.push(Arc::clone(statement));
                blocks.push(std::mem::take(&mut current));
            }
            BoundStatement::VariableDeclaration(_) | BoundStatement::Expression(_) => {
                current.push(Arc::clone(statement));
            }
            other => panic!("unexpected statement in lowered body: {}", other.kind_name()),
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// The logical complement of a guard. The complement is built as an
/// expression rather than folded, so a literal guard still shows up as
/// a guarded edge on the opposite branch.
fn negated(condition: &Arc<BoundExpression>) -> Arc<BoundExpression> {
    let operator = BoundUnaryOperator::bind(SyntaxKind::BangToken, TypeSymbol::Bool)
        .expect("logical negation is defined for bool");
    Arc::new(BoundExpression::Unary(BoundUnaryExpression {
        operator,
        operand: Arc::clone(condition),
    }))
}

fn literal_bool(expression: &BoundExpression) -> Option<bool> {
    match expression {
        BoundExpression::Literal(literal) => literal.value.as_bool(),
        _ => None,
    }
}
