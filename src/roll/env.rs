use crate::common::Id;
use crate::parse::ast::Node;
use std::collections::HashMap;
use std::rc::Rc;

/// Maps resolved identifiers to the unevaluated expressions bound to them.
///
/// Entering a scope copies the environment, so bindings made for a child
/// scope are never visible to its parent or siblings.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: HashMap<Id, Rc<Node>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Id) -> Option<&Rc<Node>> {
        self.bindings.get(&id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// A copy of this environment with `bindings` added.
    pub fn extended(&self, bindings: impl IntoIterator<Item = (Id, Node)>) -> Self {
        let mut ret = self.clone();
        for (id, node) in bindings {
            ret.bind(id, node);
        }
        ret
    }

    pub(crate) fn bind(&mut self, id: Id, node: Node) {
        self.bindings.insert(id, Rc::new(node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_leaves_parent_untouched() {
        let parent = Environment::new().extended([(1, Node::Int(5))]);
        let child = parent.extended([(1, Node::Int(6)), (2, Node::Int(7))]);

        assert_eq!(parent.len(), 1);
        assert_eq!(**parent.get(1).unwrap(), Node::Int(5));
        assert_eq!(**child.get(1).unwrap(), Node::Int(6));
        assert!(parent.get(2).is_none());
    }
}
