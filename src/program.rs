use crate::config::Config;
use crate::error::Error;
use crate::parse::{self, ast::*};
use crate::resolve::Resolver;
use crate::roll::{Environment, Primitive, RollContext, RollError, Roller};

/// A parsed and resolved program, ready to be rolled any number of times.
#[derive(Debug, Clone)]
pub struct Program {
    declarations: Vec<Assignment>,
    expressions: Vec<Node>,
}

impl Program {
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn new(source: &str) -> Result<Self, Error> {
        let mut declarations = Vec::new();
        let mut expressions = Vec::new();
        for item in parse::parse(source)? {
            match item {
                Item::Declaration(decl) => declarations.push(decl),
                Item::Expression(expr) => expressions.push(expr),
            }
        }
        tracing::debug!(
            declarations = declarations.len(),
            expressions = expressions.len(),
            "parsed program"
        );

        Resolver::new().resolve_program(&mut declarations, &mut expressions)?;
        Ok(Self {
            declarations,
            expressions,
        })
    }

    pub fn declarations(&self) -> &[Assignment] {
        &self.declarations
    }

    pub fn expressions(&self) -> &[Node] {
        &self.expressions
    }

    /// The environment binding every top-level declaration.
    pub fn environment(&self) -> Environment {
        Environment::new().extended(
            self.declarations
                .iter()
                .map(|decl| (decl.id, decl.value.clone())),
        )
    }

    /// Rolls every expression with the default limits and the thread-local RNG.
    pub fn roll(&self) -> Result<Vec<Primitive>, RollError> {
        self.roll_with(Config::default(), rand::thread_rng())
    }

    pub fn roll_with<R: Roller>(&self, config: Config, roller: R) -> Result<Vec<Primitive>, RollError> {
        self.reduce_in(&mut RollContext::new(config, roller))
    }

    /// Reduces each expression in order, sharing `ctx` between them.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn reduce_in<R: Roller>(&self, ctx: &mut RollContext<R>) -> Result<Vec<Primitive>, RollError> {
        let env = self.environment();
        let results = self
            .expressions
            .iter()
            .map(|expr| ctx.reduce_pure(expr, &env))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(steps = ctx.steps(), "rolled program");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::{RollErrorKind, StepRoller};

    fn roll_mocked(s: &str) -> Result<Vec<Primitive>, Error> {
        Ok(Program::new(s)?.roll_with(Config::default(), StepRoller::new(1, 1))?)
    }

    fn check(s: &str, expected: impl Into<Primitive>) {
        assert_eq!(roll_mocked(s).unwrap(), [expected.into()]);
    }

    fn check_err(s: &str, expected: RollErrorKind) {
        match roll_mocked(s) {
            Err(Error::Roll(err)) => assert_eq!(err.kind, expected),
            other => panic!("expected {:?}, got {:?}", expected, other),
        }
    }

    #[test]
    fn test_precedence() {
        check("1+2*3", 7i64);
        check("(1+2)*3", 9i64);
        check("4^3^2^1", 262_144i64);
        check("2*3^2", 18i64);
        check("10-4-3", 3i64);
        check("7/2", 3.5);
        check("--1", 1i64);
        check("---1", -1i64);
        check("1 < 2 == 1", 1i64);
        check("!0 & 1", 1i64);
    }

    #[test]
    fn test_strings() {
        check(r#""abc" + 'def'"#, "abcdef");
        check(r#"'it\'s'"#, "it's");
        check(r#""a\nb""#, r"a\nb");
        check(r#""a" == "a""#, 1i64);
    }

    #[test]
    fn test_case() {
        check(r#"2$(1->"Foo";2->"Bar")"#, "Bar");
        check_err(r#"3$(1->"Foo";2->"Bar")"#, RollErrorKind::CaseFailure("3".into()));
    }

    #[test]
    fn test_let() {
        check("^x=5$^y=x$x+y", 10i64);
        check("^x=1$(^x=2$x)+x", 3i64);
        check("^x=1$^x=x+1;y=x$y", 2i64);
        check("^a=1;b=a+1;c=b*2$a+b+c", 7i64);
    }

    #[test]
    fn test_declarations() {
        check(r"@fact = \x -> x ? x*(fact x-1) : 1 ; fact 10", 3_628_800i64);
        check("fwd;@fwd = 1984", 1984i64);
        check("@a = b + 1; @b = 2; a", 3i64);
    }

    #[test]
    fn test_items_are_split() {
        let program = Program::new("1; @x = 2; x + 1; @y = x").unwrap();
        let names: Vec<_> = program.declarations().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["x", "y"]);
        assert_eq!(program.expressions().len(), 2);
        assert_eq!(program.environment().len(), 2);
    }

    #[test]
    fn test_deeply_nested_brackets() {
        let depth = 3000;
        let source = format!("{}1d1{}", "(".repeat(depth), ")".repeat(depth));
        check(&source, 1i64);
        assert_eq!(crate::roll(&source).unwrap(), [Primitive::Int(1)]);
    }

    #[test]
    fn test_results_in_order() {
        let results = roll_mocked("1; @x = 2; x + 1; 'z'").unwrap();
        assert_eq!(results, [Primitive::Int(1), Primitive::Int(3), Primitive::from("z")]);
        assert!(roll_mocked("@x = 2").unwrap().is_empty());
    }

    #[test]
    fn test_dice_bounds() {
        let program = Program::new("1d6").unwrap();
        for _ in 0..100 {
            match program.roll().unwrap().as_slice() {
                [Primitive::Int(x)] => assert!((1..=6).contains(x)),
                other => panic!("unexpected result {:?}", other),
            }
        }
        check("1d1", 1i64);
        check_err("0d6", RollErrorKind::ZeroDiceCount);
        check_err("1d0", RollErrorKind::ZeroDiceSides);
        check_err("0.5d20", RollErrorKind::FloatingPointDiceCount("0.5".into()));
        check_err(
            "1d20 + 1001d6",
            RollErrorKind::ExcessiveDiceRolls {
                count: 1001,
                max: 1000,
            },
        );
        check_err("1/0", RollErrorKind::ZeroDivision);
    }

    #[test]
    fn test_undefined() {
        check_err("x", RollErrorKind::UndefinedIdentifier("x".into()));
        check_err(r"\x->y", RollErrorKind::UndefinedIdentifier("y".into()));
    }

    #[test]
    fn test_parse_errors() {
        for source in ["'abc", "(1 + 2", "```1d6", "1 +", "@ = 2"] {
            assert!(
                matches!(Program::new(source), Err(Error::Parse(_))),
                "{:?} should not parse",
                source
            );
        }
    }

    #[test]
    fn test_fenced_source() {
        check("```1d1 + 1```", 2i64);
        check("`4^3^2^1`", 262_144i64);
    }

    #[test]
    fn test_rerolling_draws_again() {
        let program = Program::new("1d20").unwrap();
        let mut ctx = RollContext::new(Config::default(), StepRoller::new(3, 2));
        assert_eq!(program.reduce_in(&mut ctx).unwrap(), [Primitive::Int(3)]);
        assert_eq!(program.reduce_in(&mut ctx).unwrap(), [Primitive::Int(5)]);
    }
}
