use super::ast::*;
use crate::stack::ensure_sufficient_stack;
use std::fmt::{self, Write};

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| fmt_node(self, f))
    }
}

fn fmt_node(node: &Node, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match node {
        Node::Int(x) => fmt::Display::fmt(x, f),
        Node::Float(x) => fmt::Debug::fmt(x, f),
        Node::Str(s) => fmt_str(s, f),
        Node::Variable(v) => f.write_str(&v.name),
        Node::Roll(count, sides) => {
            fmt_operand(count, f)?;
            f.write_char('d')?;
            fmt_operand(sides, f)
        }
        Node::Let(decls, body) => {
            f.write_char('^')?;
            for (i, decl) in decls.iter().enumerate() {
                if i > 0 {
                    f.write_str("; ")?;
                }
                write!(f, "{} = {}", decl.name, decl.value)?;
            }
            write!(f, " $ {}", body)
        }
        Node::Function(func) => write!(f, "\\{} -> {}", func.param.name, func.body),
        Node::Application(callee, args) => {
            fmt_operand(callee, f)?;
            for arg in args.iter() {
                f.write_char(' ')?;
                fmt_operand(arg, f)?;
            }
            Ok(())
        }
        Node::Operator(op, args) => match args.as_slice() {
            [value] => {
                write!(f, "{}", op)?;
                fmt_operand(value, f)
            }
            [lhs, rhs] => {
                fmt_operand(lhs, f)?;
                write!(f, " {} ", op)?;
                fmt_operand(rhs, f)
            }
            _ => write!(f, "<{} with {} operands>", op, args.len()),
        },
        Node::Ternary(cond, if_true, if_false) => {
            fmt_operand(cond, f)?;
            write!(f, " ? {} : ", if_true)?;
            fmt_operand(if_false, f)
        }
        Node::Case(scrutinee, arms) => {
            fmt_operand(scrutinee, f)?;
            f.write_str(" $ (")?;
            for (i, arm) in arms.iter().enumerate() {
                if i > 0 {
                    f.write_str("; ")?;
                }
                write!(f, "{} -> {}", arm.pattern, arm.result)?;
            }
            f.write_char(')')
        }
    }
}

fn fmt_operand(node: &Node, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match node {
        Node::Int(x) if *x >= 0 => write!(f, "{}", node),
        Node::Float(x) if *x >= 0.0 => write!(f, "{}", node),
        Node::Str(_) | Node::Variable(_) => write!(f, "{}", node),
        _ => write!(f, "({})", node),
    }
}

fn fmt_str(s: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        if c == '"' {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char('"')
}

#[cfg(test)]
mod tests {
    use crate::parse::parse;

    fn check(s: &str, expected: &str) {
        let items = parse(s).unwrap();
        let rendered: Vec<_> = items
            .iter()
            .map(|item| match item {
                crate::parse::ast::Item::Expression(e) => e.to_string(),
                crate::parse::ast::Item::Declaration(d) => format!("@{} = {}", d.name, d.value),
            })
            .collect();
        assert_eq!(rendered.join("; "), expected);
    }

    #[test]
    fn test_stringify_arithmetic() {
        check("1+2*3", "1 + (2 * 3)");
        check("--2", "-(-2)");
        check("2d6+3", "(2d6) + 3");
    }

    #[test]
    fn test_stringify_binders() {
        check(r"\x y -> x", r"\x -> \y -> x");
        check("^a=1;b=a$a+b", "^a = 1; b = a $ a + b");
        check(r#"@f = \x -> x; f "a\"b""#, r#"@f = \x -> x; f "a\"b""#);
    }

    #[test]
    fn test_stringify_branches() {
        check("x ? 1 : 2", "x ? 1 : 2");
        check("2$(1->\"Foo\";2->\"Bar\")", "2 $ (1 -> \"Foo\"; 2 -> \"Bar\")");
    }
}
