//! Hygienic renaming of identifiers within a subtree.

use crate::common::Id;
use crate::parse::ast::*;
use crate::stack::ensure_sufficient_stack;
use std::collections::HashMap;

pub type Renames = HashMap<Id, Id>;

fn rename_id(id: Id, renames: &Renames) -> Id {
    renames.get(&id).copied().unwrap_or(id)
}

impl Variable {
    fn renamed(&self, renames: &Renames) -> Self {
        Self {
            name: self.name.clone(),
            id: rename_id(self.id, renames),
        }
    }
}

impl Assignment {
    pub(crate) fn renamed(&self, renames: &Renames) -> Self {
        Self {
            name: self.name.clone(),
            value: self.value.renamed(renames),
            id: rename_id(self.id, renames),
        }
    }
}

impl Node {
    /// A copy of this node with every binder and variable whose id is a key
    /// of `renames` carrying the mapped id instead.
    pub(crate) fn renamed(&self, renames: &Renames) -> Self {
        ensure_sufficient_stack(|| self.renamed_node(renames))
    }

    fn renamed_node(&self, renames: &Renames) -> Self {
        let boxed = |node: &Node| Box::new(node.renamed(renames));

        match self {
            Self::Int(_) | Self::Float(_) | Self::Str(_) => self.clone(),
            Self::Variable(v) => Self::Variable(v.renamed(renames)),
            Self::Roll(count, sides) => Self::Roll(boxed(count), boxed(sides)),
            Self::Let(decls, body) => {
                Self::Let(decls.mapped_ref(|d| d.renamed(renames)), boxed(body))
            }
            Self::Function(f) => Self::Function(Function {
                param: f.param.renamed(renames),
                body: boxed(&f.body),
            }),
            Self::Application(callee, args) => {
                Self::Application(boxed(callee), args.mapped_ref(|a| a.renamed(renames)))
            }
            Self::Operator(op, args) => {
                Self::Operator(*op, args.iter().map(|a| a.renamed(renames)).collect())
            }
            Self::Ternary(cond, if_true, if_false) => {
                Self::Ternary(boxed(cond), boxed(if_true), boxed(if_false))
            }
            Self::Case(scrutinee, arms) => Self::Case(
                boxed(scrutinee),
                arms.mapped_ref(|arm| CaseArm {
                    pattern: arm.pattern.renamed(renames),
                    result: arm.result.renamed(renames),
                }),
            ),
        }
    }
}
