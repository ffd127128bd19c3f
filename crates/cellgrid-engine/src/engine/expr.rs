//! Expression nodes and the arena that owns them.
//!
//! Every formula parsed for a table is allocated into that table's
//! [`ExprArena`]. Nodes refer to their children by [`ExprId`], are never
//! mutated after parsing and are never freed individually, so any number of
//! cells can hold the same root id. Clone cells rely on this: they share the
//! parsed tree and carry their own shift offset instead of rewriting it.

use super::position::{CellPosition, Range};

/// Index of a node inside an [`ExprArena`].
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct ExprId(u32);

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Number(f64),
    /// Relative reference: the evaluator adds the cell's shift offset.
    CellRef(CellPosition),
    /// Absolute (`$`) reference: the shift offset is ignored.
    ConstantRef(CellPosition),
    /// Only valid as a whole function argument.
    Range(Range),
    Add(ExprId, ExprId),
    Function {
        /// Lowercased at parse time.
        name: String,
        args: Vec<ExprId>,
    },
}

/// Append-only storage for expression nodes.
#[derive(Debug, Default)]
pub struct ExprArena {
    nodes: Vec<Expression>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, expression: Expression) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(expression);
        id
    }

    pub fn get(&self, id: ExprId) -> &Expression {
        &self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_returns_stable_ids() {
        let mut arena = ExprArena::new();
        let one = arena.alloc(Expression::Number(1.0));
        let a1 = arena.alloc(Expression::CellRef(CellPosition::ORIGIN));
        let sum = arena.alloc(Expression::Add(one, a1));

        assert_eq!(arena.len(), 3);
        assert_eq!(arena.get(one), &Expression::Number(1.0));
        assert_eq!(arena.get(sum), &Expression::Add(one, a1));
    }
}
