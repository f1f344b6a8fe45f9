use crate::common::*;

/// A top-level item of a program: `@name = expr` or a plain expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Declaration(Assignment),
    Expression(Node),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Int(Int),
    Float(Float),
    Str(String),
    Roll(Box<Node>, Box<Node>),
    Variable(Variable),
    Let(NonEmpty<Assignment>, Box<Node>),
    Function(Function),
    Application(Box<Node>, NonEmpty<Node>),
    Operator(Operator, Vec<Node>),
    Ternary(Box<Node>, Box<Node>, Box<Node>),
    Case(Box<Node>, NonEmpty<CaseArm>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub id: Id,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: UNRESOLVED,
        }
    }
}

/// A name bound to an unevaluated expression, either by `let` or at the top level.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub value: Node,
    pub id: Id,
}

impl Assignment {
    pub fn new(name: impl Into<String>, value: Node) -> Self {
        Self {
            name: name.into(),
            value,
            id: UNRESOLVED,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub param: Variable,
    pub body: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseArm {
    pub pattern: Node,
    pub result: Node,
}

impl CaseArm {
    pub fn new(pattern: Node, result: Node) -> Self {
        Self { pattern, result }
    }
}

impl Node {
    pub fn new_str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    pub fn new_variable(name: impl Into<String>) -> Self {
        Self::Variable(Variable::new(name))
    }

    pub fn new_roll(count: Node, sides: Node) -> Self {
        Self::Roll(Box::new(count), Box::new(sides))
    }

    pub fn new_unary(op: Operator, value: Node) -> Self {
        Self::Operator(op, vec![value])
    }

    pub fn new_binary(op: Operator, lhs: Node, rhs: Node) -> Self {
        Self::Operator(op, vec![lhs, rhs])
    }

    pub fn new_let(declarations: NonEmpty<Assignment>, body: Node) -> Self {
        Self::Let(declarations, Box::new(body))
    }

    pub fn new_function(param: impl Into<String>, body: Node) -> Self {
        Self::Function(Function {
            param: Variable::new(param),
            body: Box::new(body),
        })
    }

    /// Builds `\a b c -> body` as nested single-parameter functions.
    pub fn new_curried(params: NonEmpty<String>, body: Node) -> Self {
        params
            .into_vec()
            .into_iter()
            .rev()
            .fold(body, |body, param| Self::new_function(param, body))
    }

    pub fn new_application(callee: Node, args: NonEmpty<Node>) -> Self {
        Self::Application(Box::new(callee), args)
    }

    pub fn new_ternary(cond: Node, if_true: Node, if_false: Node) -> Self {
        Self::Ternary(Box::new(cond), Box::new(if_true), Box::new(if_false))
    }

    pub fn new_case(scrutinee: Node, arms: NonEmpty<CaseArm>) -> Self {
        Self::Case(Box::new(scrutinee), arms)
    }

    /// Literals and unapplied functions need no further reduction.
    pub fn is_normal(&self) -> bool {
        matches!(
            self,
            Self::Int(_) | Self::Float(_) | Self::Str(_) | Self::Function(_)
        )
    }
}

impl From<Int> for Node {
    fn from(x: Int) -> Self {
        Self::Int(x)
    }
}

impl From<Float> for Node {
    fn from(x: Float) -> Self {
        Self::Float(x)
    }
}
