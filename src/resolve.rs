//! Binds every variable to the declaration or parameter it refers to.

use crate::common::*;
use crate::counter::HashCounter;
use crate::parse::ast::*;
use crate::roll::{RollError, RollErrorKind};
use crate::stack::ensure_sufficient_stack;
use std::collections::HashMap;

type Scope = HashMap<String, Id>;
type RResult<T = ()> = Result<T, RollError>;

/// Assigns binder ids and rewrites each [`Variable`] to carry the id of its
/// nearest enclosing binder of the same name.
#[derive(Debug, Default)]
pub struct Resolver {
    counter: HashCounter,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a whole program. Top-level declarations are all in scope
    /// everywhere, including inside each other and before their position.
    pub fn resolve_program(
        &mut self,
        declarations: &mut [Assignment],
        expressions: &mut [Node],
    ) -> RResult {
        let mut globals = Scope::new();
        for decl in declarations.iter_mut() {
            if globals.contains_key(&decl.name) {
                return Err(RollErrorKind::DuplicateDeclaration(decl.name.clone()).into());
            }
            decl.id = self.counter.next_binder();
            globals.insert(decl.name.clone(), decl.id);
        }
        tracing::debug!(declarations = globals.len(), "registered top-level names");

        for decl in declarations.iter_mut() {
            self.resolve(&mut decl.value, &globals)?;
        }
        for expr in expressions.iter_mut() {
            self.resolve(expr, &globals)?;
        }
        Ok(())
    }

    pub fn resolve(&mut self, node: &mut Node, scope: &Scope) -> RResult {
        ensure_sufficient_stack(|| self.resolve_node(node, scope))
            .map_err(|e| e.traced(node))
    }

    fn resolve_node(&mut self, node: &mut Node, scope: &Scope) -> RResult {
        match node {
            Node::Int(_) | Node::Float(_) | Node::Str(_) => Ok(()),
            Node::Variable(var) => match scope.get(&var.name) {
                Some(&id) => {
                    var.id = id;
                    Ok(())
                }
                None => Err(RollErrorKind::UndefinedIdentifier(var.name.clone()).into()),
            },
            Node::Roll(count, sides) => {
                self.resolve(count, scope)?;
                self.resolve(sides, scope)
            }
            Node::Let(decls, body) => {
                let mut inner = scope.clone();
                for decl in decls.iter_mut() {
                    self.resolve(&mut decl.value, &inner)?;
                    decl.id = self.counter.next_binder();
                    inner.insert(decl.name.clone(), decl.id);
                }
                self.resolve(body, &inner)
            }
            Node::Function(func) => {
                func.param.id = self.counter.next_binder();
                let mut inner = scope.clone();
                inner.insert(func.param.name.clone(), func.param.id);
                self.resolve(&mut func.body, &inner)
            }
            Node::Application(callee, args) => {
                self.resolve(callee, scope)?;
                args.iter_mut().try_for_each(|arg| self.resolve(arg, scope))
            }
            Node::Operator(_, args) => args.iter_mut().try_for_each(|arg| self.resolve(arg, scope)),
            Node::Ternary(cond, if_true, if_false) => {
                self.resolve(cond, scope)?;
                self.resolve(if_true, scope)?;
                self.resolve(if_false, scope)
            }
            Node::Case(scrutinee, arms) => {
                self.resolve(scrutinee, scope)?;
                arms.iter_mut().try_for_each(|arm| {
                    self.resolve(&mut arm.pattern, scope)?;
                    self.resolve(&mut arm.result, scope)
                })
            }
        }
    }
}
