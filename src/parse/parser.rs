use super::ast::*;
use super::error::{ParseError, ParseErrorKind};
use super::fence;
use super::lexer::{tokenize, Lexeme, TokenKind};
use crate::common::*;
use crate::stack::ensure_sufficient_stack;
use std::ops::Range;

type PResult<T = Node> = Result<T, ParseError>;

pub struct Parser<'a> {
    source: &'a str,
    text: &'a str,
    offset: usize,
    tokens: Vec<Lexeme>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Deepest nesting of expressions and prefix operators accepted.
    pub const MAX_NESTING: usize = 4096;

    const EQUALITY_OPS: &'static [TokenKind] = &[TokenKind::EqualEqual, TokenKind::BangEqual];

    const COMPARISON_OPS: &'static [TokenKind] = &[
        TokenKind::GreaterThan,
        TokenKind::GreaterEqual,
        TokenKind::LessThan,
        TokenKind::LessEqual,
    ];

    const LOGIC_OPS: &'static [TokenKind] = &[TokenKind::Ampersand, TokenKind::Pipe];

    const TERM_OPS: &'static [TokenKind] = &[TokenKind::Plus, TokenKind::Minus];

    const FACTOR_OPS: &'static [TokenKind] = &[TokenKind::Star, TokenKind::Slash];

    const UNARY_PREFIX_OPS: &'static [TokenKind] = &[TokenKind::Minus, TokenKind::Bang];

    const DICE_OPS: &'static [TokenKind] = &[TokenKind::Dice, TokenKind::DiceSides];

    /// Tokens that can begin an argument of an application.
    const ARGUMENT_START: &'static [TokenKind] = &[
        TokenKind::Integer,
        TokenKind::Decimal,
        TokenKind::String,
        TokenKind::Identifier,
        TokenKind::LeftParen,
        TokenKind::Backslash,
        TokenKind::Caret,
        TokenKind::Bang,
    ];

    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            text: source,
            offset: 0,
            tokens: Vec::new(),
            pos: 0,
            depth: 0,
        }
    }

    pub fn parse(mut self) -> PResult<Vec<Item>> {
        let unfenced = fence::strip(self.source).map_err(|fence::UnclosedFence(at)| {
            let end = (at + 1).min(self.source.len());
            ParseError::new(ParseErrorKind::UnclosedCodeBlock, at..end, self.source)
        })?;
        self.text = unfenced.text;
        self.offset = unfenced.offset;
        self.tokens = tokenize(unfenced.text);
        self.parse_program()
    }

    fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|l| l.kind)
    }

    fn peek_nth(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|l| l.kind)
    }

    fn advance(&mut self) -> Option<&Lexeme> {
        let lexeme = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(lexeme)
    }

    fn matches(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn matches_any(&self, options: &[TokenKind]) -> bool {
        self.peek().map_or(false, |peeked| options.contains(&peeked))
    }

    fn slice(&self, span: &Range<usize>) -> &'a str {
        &self.text[span.clone()]
    }

    fn consume(&mut self, expected: TokenKind) -> PResult<Range<usize>> {
        if self.matches(expected) {
            let span = self.tokens[self.pos].span.clone();
            self.pos += 1;
            Ok(span)
        } else {
            self.unexpected_token(vec![expected])
        }
    }

    /// Consumes an identifier, rejecting the names the dice operator reserves.
    fn consume_identifier(&mut self) -> PResult<(&'a str, Range<usize>)> {
        match self.tokens.get(self.pos) {
            Some(lexeme) if Self::DICE_OPS.contains(&lexeme.kind) => {
                self.error(ParseErrorKind::ReservedIdentifier, lexeme.span.clone())
            }
            _ => self.consume_slice(TokenKind::Identifier),
        }
    }

    /// Runs `parse` one level deeper, failing once input nests past
    /// [`Self::MAX_NESTING`].
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= Self::MAX_NESTING {
            let span = match self.tokens.get(self.pos) {
                Some(lexeme) => lexeme.span.clone(),
                None => self.text.len()..self.text.len(),
            };
            return self.error(ParseErrorKind::TooDeep, span);
        }
        self.depth += 1;
        let result = ensure_sufficient_stack(|| parse(self));
        self.depth -= 1;
        result
    }

    fn consume_slice(&mut self, expected: TokenKind) -> PResult<(&'a str, Range<usize>)> {
        let span = self.consume(expected)?;
        Ok((self.slice(&span), span))
    }

    fn error_at(&self, kind: ParseErrorKind, span: Range<usize>) -> ParseError {
        let span = span.start + self.offset..span.end + self.offset;
        ParseError::new(kind, span, self.source)
    }

    fn error<T>(&self, kind: ParseErrorKind, span: Range<usize>) -> PResult<T> {
        Err(self.error_at(kind, span))
    }

    fn unexpected(&self, expected: Option<Vec<TokenKind>>) -> ParseError {
        let lexeme = match self.tokens.get(self.pos) {
            Some(lexeme) => lexeme,
            None => {
                let end = self.text.len()..self.text.len();
                let expected = expected.unwrap_or_default();
                return self.error_at(ParseErrorKind::UnexpectedEnd { expected }, end);
            }
        };
        let kind = match (lexeme.kind, expected) {
            (TokenKind::ErrUnterminatedString, _) => ParseErrorKind::UnterminatedString,
            (TokenKind::Error, _) => ParseErrorKind::UnexpectedCharacter,
            (found, Some(expected)) => ParseErrorKind::UnexpectedToken { found, expected },
            (found, None) => ParseErrorKind::ExpectedExpression { found },
        };
        self.error_at(kind, lexeme.span.clone())
    }

    fn unexpected_token<T>(&self, expected: Vec<TokenKind>) -> PResult<T> {
        Err(self.unexpected(Some(expected)))
    }

    fn expected_expression<T>(&self) -> PResult<T> {
        Err(self.unexpected(None))
    }

    fn parse_program(&mut self) -> PResult<Vec<Item>> {
        let mut items = vec![self.parse_item()?];

        while self.matches(TokenKind::Semicolon) {
            self.advance();
            if self.peek().is_none() {
                break;
            }
            items.push(self.parse_item()?);
        }

        if self.peek().is_some() {
            return self.unexpected_token(vec![TokenKind::Semicolon]);
        }
        Ok(items)
    }

    fn parse_item(&mut self) -> PResult<Item> {
        if self.matches(TokenKind::At) {
            self.advance();
            Ok(Item::Declaration(self.parse_assignment()?))
        } else {
            Ok(Item::Expression(self.parse_expression()?))
        }
    }

    fn parse_assignment(&mut self) -> PResult<Assignment> {
        let (name, _) = self.consume_identifier()?;
        self.consume(TokenKind::Equal)?;
        let value = self.parse_expression()?;
        Ok(Assignment::new(name, value))
    }

    fn parse_expression(&mut self) -> PResult {
        self.nested(Self::parse_application)
    }

    fn parse_application(&mut self) -> PResult {
        let callee = self.parse_equality()?;

        if !self.matches_any(Self::ARGUMENT_START) {
            return Ok(callee);
        }

        let mut args = NonEmpty::new(self.parse_equality()?);
        while self.matches_any(Self::ARGUMENT_START) {
            args.push(self.parse_equality()?);
        }
        Ok(Node::new_application(callee, args))
    }

    fn parse_binary_level(
        &mut self,
        ops: &[TokenKind],
        mut next: impl FnMut(&mut Self) -> PResult,
    ) -> PResult {
        let mut lhs = next(self)?;

        while self.matches_any(ops) {
            let op = self.advance().map(|l| l.kind).and_then(binary_operator);
            let rhs = next(self)?;
            match op {
                Some(op) => lhs = Node::new_binary(op, lhs, rhs),
                None => unreachable!("operator tables only hold binary operators"),
            }
        }

        Ok(lhs)
    }

    fn parse_equality(&mut self) -> PResult {
        self.parse_binary_level(Self::EQUALITY_OPS, Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> PResult {
        self.parse_binary_level(Self::COMPARISON_OPS, Self::parse_logic)
    }

    fn parse_logic(&mut self) -> PResult {
        self.parse_binary_level(Self::LOGIC_OPS, Self::parse_term)
    }

    fn parse_term(&mut self) -> PResult {
        self.parse_binary_level(Self::TERM_OPS, Self::parse_factor)
    }

    fn parse_factor(&mut self) -> PResult {
        self.parse_binary_level(Self::FACTOR_OPS, Self::parse_power)
    }

    fn parse_power(&mut self) -> PResult {
        let base = self.parse_ternary()?;

        if self.matches(TokenKind::Caret) {
            self.advance();
            let exponent = self.parse_power()?;
            Ok(Node::new_binary(Operator::Pow, base, exponent))
        } else {
            Ok(base)
        }
    }

    fn parse_ternary(&mut self) -> PResult {
        let cond = self.parse_case()?;

        if self.matches(TokenKind::Question) {
            self.advance();
            let if_true = self.parse_expression()?;
            self.consume(TokenKind::Colon)?;
            let if_false = self.parse_ternary()?;
            Ok(Node::new_ternary(cond, if_true, if_false))
        } else {
            Ok(cond)
        }
    }

    fn parse_case(&mut self) -> PResult {
        let mut scrutinee = self.parse_dice()?;

        while self.case_ahead() {
            self.consume(TokenKind::Dollar)?;
            self.consume(TokenKind::LeftParen)?;

            let mut arms = NonEmpty::new(self.parse_case_arm()?);
            while self.matches(TokenKind::Semicolon) {
                self.advance();
                if self.matches(TokenKind::RightParen) {
                    break;
                }
                arms.push(self.parse_case_arm()?);
            }
            self.consume(TokenKind::RightParen)?;

            scrutinee = Node::new_case(scrutinee, arms);
        }

        Ok(scrutinee)
    }

    /// Whether the next tokens are `$ (` followed by a pattern arrow at the
    /// outer level of the bracket. Anything else after `$` belongs to a `let`.
    fn case_ahead(&self) -> bool {
        if self.peek() != Some(TokenKind::Dollar) || self.peek_nth(1) != Some(TokenKind::LeftParen)
        {
            return false;
        }

        let mut depth = 0usize;
        let mut lambda_arrows = 0usize;
        for lexeme in &self.tokens[self.pos + 2..] {
            match lexeme.kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen if depth == 0 => return false,
                TokenKind::RightParen => depth -= 1,
                TokenKind::Semicolon if depth == 0 => return false,
                TokenKind::Backslash if depth == 0 => lambda_arrows += 1,
                TokenKind::Arrow if depth == 0 && lambda_arrows > 0 => lambda_arrows -= 1,
                TokenKind::Arrow if depth == 0 => return true,
                _ => {}
            }
        }
        false
    }

    fn parse_case_arm(&mut self) -> PResult<CaseArm> {
        let pattern = self.parse_expression()?;
        self.consume(TokenKind::Arrow)?;
        let result = self.parse_expression()?;
        Ok(CaseArm::new(pattern, result))
    }

    fn parse_dice(&mut self) -> PResult {
        let mut count = self.parse_unary_prefix()?;

        while self.matches_any(Self::DICE_OPS) {
            let sides = if self.matches(TokenKind::DiceSides) {
                self.parse_dice_sides()?
            } else {
                self.advance();
                self.parse_unary_prefix()?
            };
            count = Node::new_roll(count, sides);
        }

        Ok(count)
    }

    /// Parses the `d6` of `2d6` as the literal sides `6`.
    fn parse_dice_sides(&mut self) -> PResult {
        let (slice, span) = self.consume_slice(TokenKind::DiceSides)?;
        match slice[1..].parse::<Int>() {
            Ok(sides) => Ok(Node::Int(sides)),
            Err(_) => self.error(ParseErrorKind::InvalidNumber, span),
        }
    }

    fn parse_unary_prefix(&mut self) -> PResult {
        if self.matches_any(Self::UNARY_PREFIX_OPS) {
            let op = match self.advance().map(|l| l.kind) {
                Some(TokenKind::Bang) => Operator::Not,
                _ => Operator::Neg,
            };
            let value = self.nested(Self::parse_unary_prefix)?;
            Ok(Node::new_unary(op, value))
        } else {
            self.parse_atom()
        }
    }

    fn parse_atom(&mut self) -> PResult {
        match self.peek() {
            Some(TokenKind::Integer) => self.parse_integer(),
            Some(TokenKind::Decimal) => self.parse_decimal(),
            Some(TokenKind::String) => self.parse_string(),
            Some(TokenKind::Identifier) => {
                let (name, _) = self.consume_slice(TokenKind::Identifier)?;
                Ok(Node::new_variable(name))
            }
            Some(TokenKind::DiceSides) => {
                let sides = self.parse_dice_sides()?;
                Ok(Node::new_roll(Node::Int(1), sides))
            }
            Some(TokenKind::LeftParen) => {
                self.advance();
                let inner = self.parse_expression()?;
                self.consume(TokenKind::RightParen)?;
                Ok(inner)
            }
            Some(TokenKind::Caret) => self.parse_let(),
            Some(TokenKind::Backslash) => self.parse_function(),
            _ => self.expected_expression(),
        }
    }

    fn parse_integer(&mut self) -> PResult {
        let (slice, span) = self.consume_slice(TokenKind::Integer)?;
        match slice.parse() {
            Ok(x) => Ok(Node::Int(x)),
            Err(_) => self.error(ParseErrorKind::InvalidNumber, span),
        }
    }

    fn parse_decimal(&mut self) -> PResult {
        let (slice, span) = self.consume_slice(TokenKind::Decimal)?;
        match slice.parse() {
            Ok(x) => Ok(Node::Float(x)),
            Err(_) => self.error(ParseErrorKind::InvalidNumber, span),
        }
    }

    fn parse_string(&mut self) -> PResult {
        let (slice, _) = self.consume_slice(TokenKind::String)?;
        let quote = &slice[..1];
        let inner = &slice[1..slice.len() - 1];
        Ok(Node::new_str(inner.replace(&format!("\\{}", quote), quote)))
    }

    fn parse_let(&mut self) -> PResult {
        self.consume(TokenKind::Caret)?;

        let mut declarations = NonEmpty::new(self.parse_assignment()?);
        while self.matches(TokenKind::Semicolon) {
            self.advance();
            declarations.push(self.parse_assignment()?);
        }
        self.consume(TokenKind::Dollar)?;

        let body = self.parse_expression()?;
        Ok(Node::new_let(declarations, body))
    }

    fn parse_function(&mut self) -> PResult {
        self.consume(TokenKind::Backslash)?;

        let (first, _) = self.consume_identifier()?;
        let mut params = NonEmpty::new(first.to_string());
        while self.matches(TokenKind::Identifier) || self.matches_any(Self::DICE_OPS) {
            let (param, _) = self.consume_identifier()?;
            params.push(param.to_string());
        }
        if !self.matches(TokenKind::Arrow) {
            return self.unexpected_token(vec![TokenKind::Identifier, TokenKind::Arrow]);
        }
        self.advance();

        let body = self.parse_expression()?;
        Ok(Node::new_curried(params, body))
    }
}

fn binary_operator(kind: TokenKind) -> Option<Operator> {
    use Operator::*;
    Some(match kind {
        TokenKind::Star => Mul,
        TokenKind::Slash => Div,
        TokenKind::Plus => Add,
        TokenKind::Minus => Sub,
        TokenKind::Ampersand => And,
        TokenKind::Pipe => Or,
        TokenKind::GreaterThan => Gt,
        TokenKind::GreaterEqual => Ge,
        TokenKind::LessThan => Lt,
        TokenKind::LessEqual => Le,
        TokenKind::EqualEqual => Eq,
        TokenKind::BangEqual => Ne,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(s: &str) -> PResult<Vec<Item>> {
        Parser::new(s).parse()
    }

    fn check(s: &str, expected: Node) {
        let items = parse(s).unwrap();
        assert_eq!(items, vec![Item::Expression(expected)]);
    }

    fn check_err(s: &str, expected: ParseErrorKind) {
        assert_eq!(parse(s).unwrap_err().kind, expected);
    }

    fn int(x: Int) -> Node {
        Node::Int(x)
    }

    fn var(name: &str) -> Node {
        Node::new_variable(name)
    }

    fn bin(op: Operator, lhs: Node, rhs: Node) -> Node {
        Node::new_binary(op, lhs, rhs)
    }

    fn apply(callee: Node, args: Vec<Node>) -> Node {
        Node::new_application(callee, NonEmpty::try_from_vec(args).unwrap())
    }

    #[test]
    fn test_parse_literals() {
        check("32", int(32));
        check("3.25", Node::Float(3.25));
        check(".5", Node::Float(0.5));
        check(r#""say \"hi\"""#, Node::new_str(r#"say "hi""#));
        check(r#"'it\'s'"#, Node::new_str("it's"));
        check(r#"'a\"b'"#, Node::new_str(r#"a\"b"#));
    }

    #[test]
    fn test_parse_negation_is_not_folded() {
        check("-2", Node::new_unary(Operator::Neg, int(2)));
        check(
            "--2",
            Node::new_unary(Operator::Neg, Node::new_unary(Operator::Neg, int(2))),
        );
        check(
            "!-x",
            Node::new_unary(Operator::Not, Node::new_unary(Operator::Neg, var("x"))),
        );
    }

    #[test]
    fn test_parse_precedence() {
        check(
            "1+2*3",
            bin(Operator::Add, int(1), bin(Operator::Mul, int(2), int(3))),
        );
        check(
            "(1+2)*3",
            bin(Operator::Mul, bin(Operator::Add, int(1), int(2)), int(3)),
        );
        check(
            "8/2/2",
            bin(Operator::Div, bin(Operator::Div, int(8), int(2)), int(2)),
        );
        check(
            "1 < 2 == 3 > 4",
            bin(
                Operator::Eq,
                bin(Operator::Lt, int(1), int(2)),
                bin(Operator::Gt, int(3), int(4)),
            ),
        );
        check(
            "1 + 2 & 3 >= 4",
            bin(
                Operator::Ge,
                bin(Operator::And, bin(Operator::Add, int(1), int(2)), int(3)),
                int(4),
            ),
        );
    }

    #[test]
    fn test_parse_power_is_right_associative() {
        check(
            "4^3^2",
            bin(Operator::Pow, int(4), bin(Operator::Pow, int(3), int(2))),
        );
        check(
            "2*3^2",
            bin(Operator::Mul, int(2), bin(Operator::Pow, int(3), int(2))),
        );
    }

    #[test]
    fn test_parse_dice() {
        check("2d6", Node::new_roll(int(2), int(6)));
        check("d20", Node::new_roll(int(1), int(20)));
        check("x d y", Node::new_roll(var("x"), var("y")));
        check("(1+1)d(2)", Node::new_roll(bin(Operator::Add, int(1), int(1)), int(2)));
        check(
            "-1d6",
            Node::new_roll(Node::new_unary(Operator::Neg, int(1)), int(6)),
        );
        check(
            "2d6+3",
            bin(Operator::Add, Node::new_roll(int(2), int(6)), int(3)),
        );
    }

    #[test]
    fn test_parse_application() {
        check("f x-1", apply(var("f"), vec![bin(Operator::Sub, var("x"), int(1))]));
        check("f 1 2", apply(var("f"), vec![int(1), int(2)]));
        check(
            "f (g 1) !x",
            apply(
                var("f"),
                vec![
                    apply(var("g"), vec![int(1)]),
                    Node::new_unary(Operator::Not, var("x")),
                ],
            ),
        );
    }

    #[test]
    fn test_parse_function() {
        check(
            r"\x y -> x + y",
            Node::new_function(
                "x",
                Node::new_function("y", bin(Operator::Add, var("x"), var("y"))),
            ),
        );
    }

    #[test]
    fn test_parse_ternary() {
        check(
            "0?1d20:5",
            Node::new_ternary(int(0), Node::new_roll(int(1), int(20)), int(5)),
        );
        check(
            "x ? x*y : 1",
            Node::new_ternary(var("x"), bin(Operator::Mul, var("x"), var("y")), int(1)),
        );
        check(
            "a ? 1 : b ? 2 : 3",
            Node::new_ternary(var("a"), int(1), Node::new_ternary(var("b"), int(2), int(3))),
        );
    }

    #[test]
    fn test_parse_case() {
        check(
            r#"2$(1->"Foo";2->"Bar")"#,
            Node::new_case(
                int(2),
                vec1![
                    CaseArm::new(int(1), Node::new_str("Foo")),
                    CaseArm::new(int(2), Node::new_str("Bar")),
                ],
            ),
        );
    }

    #[test]
    fn test_parse_let() {
        check(
            "^x=5$^y=x$x+y",
            Node::new_let(
                vec1![Assignment::new("x", int(5))],
                Node::new_let(
                    vec1![Assignment::new("y", var("x"))],
                    bin(Operator::Add, var("x"), var("y")),
                ),
            ),
        );
        check(
            "^a=1;b=2$(a+b)",
            Node::new_let(
                vec1![Assignment::new("a", int(1)), Assignment::new("b", int(2))],
                bin(Operator::Add, var("a"), var("b")),
            ),
        );
        check(
            r"^f=\x->x$(f 2)",
            Node::new_let(
                vec1![Assignment::new("f", Node::new_function("x", var("x")))],
                apply(var("f"), vec![int(2)]),
            ),
        );
    }

    #[test]
    fn test_parse_program() {
        let items = parse("fwd;@fwd = 1984;").unwrap();
        assert_eq!(
            items,
            vec![
                Item::Expression(var("fwd")),
                Item::Declaration(Assignment::new("fwd", int(1984))),
            ]
        );
    }

    #[test]
    fn test_parse_fenced() {
        check("```1+1```", bin(Operator::Add, int(1), int(1)));
        check("`1+1`", bin(Operator::Add, int(1), int(1)));
    }

    #[test]
    fn test_parse_errors() {
        check_err(r#""abc"#, ParseErrorKind::UnterminatedString);
        check_err("(1+2", ParseErrorKind::UnexpectedEnd {
            expected: vec![TokenKind::RightParen],
        });
        check_err("```1+2", ParseErrorKind::UnclosedCodeBlock);
        check_err("1 + )", ParseErrorKind::ExpectedExpression {
            found: TokenKind::RightParen,
        });
        check_err("", ParseErrorKind::UnexpectedEnd { expected: vec![] });
        check_err("1 # 2", ParseErrorKind::UnexpectedCharacter);
        check_err("99999999999999999999", ParseErrorKind::InvalidNumber);
        check_err("1 2)", ParseErrorKind::UnexpectedToken {
            found: TokenKind::RightParen,
            expected: vec![TokenKind::Semicolon],
        });
    }

    #[test]
    fn test_dice_names_are_reserved() {
        check_err("@d = 3; d", ParseErrorKind::ReservedIdentifier);
        check_err(r"\d6 -> d6", ParseErrorKind::ReservedIdentifier);
        check_err(r"\x d -> x", ParseErrorKind::ReservedIdentifier);
        check_err("^d20 = 1 $ 2", ParseErrorKind::ReservedIdentifier);

        let err = parse("@x = 1; @d4 = 2").unwrap_err();
        assert_eq!(err.slice, "d4");
        assert_eq!(err.column, 10);
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 3000;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        check(&source, int(1));

        let source = format!("{}1", "-".repeat(depth));
        assert!(parse(&source).is_ok());

        let depth = Parser::MAX_NESTING + 1;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        check_err(&source, ParseErrorKind::TooDeep);
    }

    #[test]
    fn test_parse_error_position() {
        let err = parse("1;\n  2 + )").unwrap_err();
        assert_eq!((err.line, err.column), (2, 7));
        assert_eq!(err.slice, ")");

        let err = parse("`1 + )`").unwrap_err();
        assert_eq!(err.span, 5..6);
        assert_eq!(err.column, 6);
    }
}
