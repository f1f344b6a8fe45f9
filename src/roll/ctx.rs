use super::{
    env::Environment,
    error::RollErrorKind,
    num::Primitive,
    rename::Renames,
    roller::Roller,
    RResult,
};
use crate::common::*;
use crate::config::Config;
use crate::counter::HashCounter;
use crate::parse::ast::*;
use crate::stack::ensure_sufficient_stack;
use std::num::NonZeroU64;

pub type DefaultRoller = rand::rngs::ThreadRng;

/// State for one reduction run: the limits, the runtime id counter and the
/// source of dice rolls.
pub struct RollContext<R = DefaultRoller> {
    config: Config,
    counter: HashCounter,
    roller: R,
    depth: usize,
    steps: usize,
}

impl<R: Roller> RollContext<R> {
    pub fn new(config: Config, roller: R) -> Self {
        Self {
            config,
            counter: HashCounter::new(),
            roller,
            depth: 0,
            steps: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn roller(&self) -> &R {
        &self.roller
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Reduces `node` to normal form in `env`.
    ///
    /// Bound names are reduced afresh each time they are referenced, so a
    /// name bound to a roll rerolls on every use.
    pub fn reduce(&mut self, node: &Node, env: &Environment) -> RResult<Node> {
        self.enter()?;
        let result = ensure_sufficient_stack(|| self.reduce_node(node, env));
        self.depth -= 1;
        result.map_err(|e| e.traced(node))
    }

    /// Reduces `node` and extracts its primitive value.
    pub fn reduce_pure(&mut self, node: &Node, env: &Environment) -> RResult<Primitive> {
        let reduced = self.reduce(node, env)?;
        Ok(reduced.pure()?)
    }

    fn enter(&mut self) -> RResult<()> {
        self.steps += 1;
        if self.steps > self.config.max_steps {
            return Err(RollErrorKind::RunTime(format!(
                "evaluation took more than {} steps",
                self.config.max_steps
            ))
            .into());
        }
        if self.depth >= self.config.max_depth {
            return Err(RollErrorKind::RunTime(format!(
                "maximum recursion depth of {} exceeded",
                self.config.max_depth
            ))
            .into());
        }
        self.depth += 1;
        Ok(())
    }

    fn reduce_node(&mut self, node: &Node, env: &Environment) -> RResult<Node> {
        match node {
            Node::Int(_) | Node::Float(_) | Node::Str(_) | Node::Function(_) => Ok(node.clone()),
            Node::Variable(v) => self.reduce_variable(v, env),
            Node::Roll(count, sides) => self.reduce_roll(count, sides, env),
            Node::Let(decls, body) => self.reduce_let(decls, body, env),
            Node::Application(callee, args) => self.reduce_application(callee, args, env),
            Node::Operator(op, args) => self.reduce_operator(*op, args, env),
            Node::Ternary(cond, if_true, if_false) => {
                if self.reduce_pure(cond, env)?.is_truthy() {
                    self.reduce(if_true, env)
                } else {
                    self.reduce(if_false, env)
                }
            }
            Node::Case(scrutinee, arms) => self.reduce_case(scrutinee, arms, env),
        }
    }

    fn reduce_variable(&mut self, var: &Variable, env: &Environment) -> RResult<Node> {
        match env.get(var.id) {
            Some(bound) if bound.is_normal() => Ok((**bound).clone()),
            Some(bound) => {
                let bound = bound.clone();
                self.reduce(&bound, env)
            }
            None => Err(RollErrorKind::internal(format!(
                "variable `{}` (id {}) reached reduction without a binding",
                var.name, var.id
            ))
            .into()),
        }
    }

    fn reduce_roll(&mut self, count: &Node, sides: &Node, env: &Environment) -> RResult<Node> {
        let count = self.reduce_pure(count, env)?;
        let sides = self.reduce_pure(sides, env)?;

        let count = dice_count(&count)?;
        let sides = dice_sides(&sides)?;

        if sides.get() == 1 {
            return Ok(Node::Int(count.get() as Int));
        }
        if count.get() > self.config.max_dice {
            return Err(RollErrorKind::ExcessiveDiceRolls {
                count: count.get(),
                max: self.config.max_dice,
            }
            .into());
        }

        // `count` is bounded by `max_dice`, so the sum of faces fits in an i128.
        let total: i128 = self
            .roller
            .roll_iter(count.get() as usize, sides)
            .map(i128::from)
            .sum();
        tracing::trace!(count = count.get(), sides = sides.get(), total, "rolled dice");

        Int::try_from(total)
            .map(Node::Int)
            .map_err(|_| RollErrorKind::Overflow.into())
    }

    fn reduce_let(
        &mut self,
        decls: &NonEmpty<Assignment>,
        body: &Node,
        env: &Environment,
    ) -> RResult<Node> {
        let renames: Renames = decls
            .iter()
            .map(|d| (d.id, self.counter.next_runtime()))
            .collect();
        let decls = decls.mapped_ref(|d| d.renamed(&renames));
        let body = body.renamed(&renames);

        let inner = env.extended(decls.iter().map(|d| (d.id, d.value.clone())));
        let result = self.reduce(&body, &inner)?;
        Ok(close_over(result, decls.into_vec()))
    }

    fn reduce_application(
        &mut self,
        callee: &Node,
        args: &NonEmpty<Node>,
        env: &Environment,
    ) -> RResult<Node> {
        let mut current = self.reduce(callee, env)?;
        let mut inner = env.clone();
        let mut bound = Vec::with_capacity(args.len());

        for arg in args.iter() {
            if !matches!(current, Node::Function(_)) {
                current = self.reduce(&current, &inner)?;
            }
            let func = match current {
                Node::Function(func) => func,
                other => return Err(RollErrorKind::NotAFunction(other.to_string()).into()),
            };

            let fresh = self.counter.next_runtime();
            tracing::trace!(param = %func.param.name, id = fresh, "binding argument");
            current = func.body.renamed(&Renames::from([(func.param.id, fresh)]));
            inner.bind(fresh, arg.clone());
            bound.push(Assignment {
                name: func.param.name,
                value: arg.clone(),
                id: fresh,
            });
        }

        let result = self.reduce(&current, &inner)?;
        Ok(close_over(result, bound))
    }

    fn reduce_operator(&mut self, op: Operator, args: &[Node], env: &Environment) -> RResult<Node> {
        let values = args
            .iter()
            .map(|arg| self.reduce_pure(arg, env))
            .collect::<RResult<Vec<_>>>()?;

        let result = match (op.arity(), values.as_slice()) {
            (1, [x]) => Primitive::unary(op, x),
            (2, [lhs, rhs]) => Primitive::binary(op, lhs, rhs),
            _ => Err(RollErrorKind::internal(format!(
                "operator '{}' applied to {} operands",
                op,
                values.len()
            ))),
        }?;
        Ok(result.into())
    }

    fn reduce_case(
        &mut self,
        scrutinee: &Node,
        arms: &NonEmpty<CaseArm>,
        env: &Environment,
    ) -> RResult<Node> {
        let value = self.reduce_pure(scrutinee, env)?;
        for arm in arms.iter() {
            if self.reduce_pure(&arm.pattern, env)? == value {
                return self.reduce(&arm.result, env);
            }
        }
        Err(RollErrorKind::CaseFailure(Node::from(value).to_string()).into())
    }
}

impl Default for RollContext {
    fn default() -> Self {
        Self::new(Config::default(), rand::thread_rng())
    }
}

/// Keeps a function that escapes a scope applicable elsewhere by moving the
/// scope's bindings into its body.
fn close_over(result: Node, bindings: Vec<Assignment>) -> Node {
    match (result, NonEmpty::try_from_vec(bindings)) {
        (Node::Function(func), Ok(bindings)) => Node::Function(Function {
            param: func.param,
            body: Box::new(Node::new_let(bindings, *func.body)),
        }),
        (result, _) => result,
    }
}

fn dice_count(value: &Primitive) -> Result<NonZeroU64, RollErrorKind> {
    match integral(value)? {
        None => Err(RollErrorKind::FloatingPointDiceCount(value.to_string())),
        Some(x) if x < 0 => Err(RollErrorKind::NegativeDiceCount(value.to_string())),
        Some(x) => NonZeroU64::new(x as u64).ok_or(RollErrorKind::ZeroDiceCount),
    }
}

fn dice_sides(value: &Primitive) -> Result<NonZeroU64, RollErrorKind> {
    match integral(value)? {
        None => Err(RollErrorKind::FloatingPointDiceSides(value.to_string())),
        Some(x) if x < 0 => Err(RollErrorKind::NegativeDiceSides(value.to_string())),
        Some(x) => NonZeroU64::new(x as u64).ok_or(RollErrorKind::ZeroDiceSides),
    }
}

/// The integer a dice operand denotes, or `None` when it has a fractional part.
fn integral(value: &Primitive) -> Result<Option<Int>, RollErrorKind> {
    match value {
        Primitive::Int(x) => Ok(Some(*x)),
        Primitive::Float(x) if x.fract() == 0.0 && *x >= Int::MAX as Float => {
            Err(RollErrorKind::Overflow)
        }
        // `as` saturates, so huge negative values still read as negative.
        Primitive::Float(x) if x.fract() == 0.0 => Ok(Some(*x as Int)),
        Primitive::Float(_) => Ok(None),
        Primitive::Str(_) => Err(RollErrorKind::OperandType {
            op: "d",
            operands: "a string".into(),
        }),
    }
}

impl From<Primitive> for Node {
    fn from(value: Primitive) -> Self {
        match value {
            Primitive::Int(x) => Node::Int(x),
            Primitive::Float(x) => Node::Float(x),
            Primitive::Str(s) => Node::Str(s),
        }
    }
}

impl Node {
    /// The primitive value of a reduced node.
    pub fn pure(&self) -> Result<Primitive, RollErrorKind> {
        match self {
            Self::Int(x) => Ok(Primitive::Int(*x)),
            Self::Float(x) => Ok(Primitive::Float(*x)),
            Self::Str(s) => Ok(Primitive::Str(s.clone())),
            Self::Function(_) => Err(RollErrorKind::FunctionValue(self.to_string())),
            _ => Err(RollErrorKind::internal(format!(
                "node reached reduction stage without a value: {}",
                self
            ))),
        }
    }
}
